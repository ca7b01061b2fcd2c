//! Per-model attribute table.
//!
//! The table is passed explicitly to every stage that needs it. Ids missing
//! from the table behave exactly like a record with every field unknown.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::pricing::PriceBlend;

/// Known facts about one model. `None` always means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Blended price per million tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(
        default,
        alias = "isOpen",
        alias = "is_open",
        skip_serializing_if = "Option::is_none"
    )]
    pub open_source: Option<bool>,
    #[serde(default, alias = "deprecated", skip_serializing_if = "Option::is_none")]
    pub retired: Option<bool>,
}

impl ModelAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the price from separate input/output costs.
    pub fn with_costs(mut self, input: f64, output: f64, blend: &PriceBlend) -> Self {
        self.price = Some(blend.blend(input, output));
        self
    }

    pub fn with_open_source(mut self, open: bool) -> Self {
        self.open_source = Some(open);
        self
    }

    pub fn with_retired(mut self, retired: bool) -> Self {
        self.retired = Some(retired);
        self
    }

    pub fn is_retired(&self) -> bool {
        self.retired == Some(true)
    }

    pub fn is_open_source(&self) -> bool {
        self.open_source == Some(true)
    }
}

static UNKNOWN: ModelAttributes = ModelAttributes {
    organization: None,
    price: None,
    open_source: None,
    retired: None,
};

/// Read-only lookup from model id to attributes.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    records: HashMap<String, ModelAttributes>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, attrs: ModelAttributes) {
        self.records.insert(id.into(), attrs);
    }

    /// Attributes for `id`, or an all-unknown record.
    pub fn get(&self, id: &str) -> &ModelAttributes {
        self.records.get(id).unwrap_or(&UNKNOWN)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by id.
    pub fn sorted_records(&self) -> Vec<(&String, &ModelAttributes)> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by(|a, b| a.0.cmp(b.0));
        records
    }
}

impl FromIterator<(String, ModelAttributes)> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = (String, ModelAttributes)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// On-disk record; accepts either a blended `price` or separate costs.
#[derive(Debug, Deserialize)]
struct AttributeRecord {
    #[serde(flatten)]
    attrs: ModelAttributes,
    #[serde(default)]
    input_price: Option<f64>,
    #[serde(default)]
    output_price: Option<f64>,
}

impl AttributeRecord {
    fn resolve(self, blend: &PriceBlend) -> ModelAttributes {
        let mut attrs = self.attrs;
        if attrs.price.is_none() {
            if let (Some(input), Some(output)) = (self.input_price, self.output_price) {
                attrs.price = Some(blend.blend(input, output));
            }
        }
        attrs
    }
}

/// Parse an attribute table from JSON (`{ "<id>": { ... }, ... }`).
pub fn parse_attribute_table(raw: &str, blend: &PriceBlend) -> Result<AttributeTable, BoardError> {
    let records: HashMap<String, AttributeRecord> = serde_json::from_str(raw)?;
    Ok(records
        .into_iter()
        .map(|(id, record)| (id, record.resolve(blend)))
        .collect())
}

pub fn load_attribute_table(
    path: impl AsRef<Path>,
    blend: &PriceBlend,
) -> Result<AttributeTable, BoardError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    parse_attribute_table(&raw, blend)
}
