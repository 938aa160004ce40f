//! Normalized record: one (entity, year) quantity.

use crate::dataset::LabelKind;
use serde::{Deserialize, Serialize};

/// Primary label of a record, serialized under its own field name
/// (`produto`, `cultivar` or `pais`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Produto(String),
    Cultivar(String),
    Pais(String),
}

impl Label {
    pub fn new(kind: LabelKind, value: impl Into<String>) -> Self {
        let value = value.into();
        match kind {
            LabelKind::Produto => Label::Produto(value),
            LabelKind::Cultivar => Label::Cultivar(value),
            LabelKind::Pais => Label::Pais(value),
        }
    }

    pub fn kind(&self) -> LabelKind {
        match self {
            Label::Produto(_) => LabelKind::Produto,
            Label::Cultivar(_) => LabelKind::Cultivar,
            Label::Pais(_) => LabelKind::Pais,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Produto(v) | Label::Cultivar(v) | Label::Pais(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub ano: i32,
    #[serde(flatten)]
    pub label: Label,
    pub quantidade: i64,
    pub unidade: String,
    /// Trade direction, present only for import/export records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_label_under_its_field_name() {
        let record = Record {
            ano: 2020,
            label: Label::Produto("Tinto".to_string()),
            quantidade: 1,
            unidade: "litros".to_string(),
            tipo: None,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"ano": 2020, "produto": "Tinto", "quantidade": 1, "unidade": "litros"})
        );
    }

    #[test]
    fn test_trade_record_carries_tipo() {
        let value = json!({
            "ano": 2023,
            "pais": "Chile",
            "quantidade": 2000000,
            "unidade": "kg",
            "tipo": "importacao"
        });
        let record: Record = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.label, Label::Pais("Chile".to_string()));
        assert_eq!(record.tipo.as_deref(), Some("importacao"));
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_label_accessors() {
        let label = Label::new(LabelKind::Cultivar, "Isabel");
        assert_eq!(label.kind(), LabelKind::Cultivar);
        assert_eq!(label.as_str(), "Isabel");
        assert_eq!(label.kind().field_name(), "cultivar");
    }
}
