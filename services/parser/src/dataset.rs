//! Dataset identifiers and the column semantics of each source file.
//!
//! Every source published by the viticulture portal stores one row per
//! entity (product, cultivar or country) and one column per year. The files
//! differ only in which column holds the entity label, which unit the
//! quantities are in, how far the year columns go and which delimiter is
//! used. Those differences live in a [`ColumnSemantics`] table indexed by
//! [`Dataset`], so a single unpivot routine serves all five sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// One of the five statistics published by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dataset {
    #[serde(rename = "producao")]
    Production,
    #[serde(rename = "processamento")]
    Processing,
    #[serde(rename = "comercializacao")]
    Trade,
    #[serde(rename = "importacao")]
    Imports,
    #[serde(rename = "exportacao")]
    Exports,
}

/// Record field that carries the row's primary label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Produto,
    Cultivar,
    Pais,
}

impl LabelKind {
    /// JSON field name used for this label in normalized records.
    pub fn field_name(self) -> &'static str {
        match self {
            LabelKind::Produto => "produto",
            LabelKind::Cultivar => "cultivar",
            LabelKind::Pais => "pais",
        }
    }
}

/// Column semantics descriptor for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSemantics {
    /// Header of the label column, exactly as the source spells it.
    pub label_column: &'static str,
    pub label_kind: LabelKind,
    /// Upper-cased labels that mark header or control rows.
    pub header_sentinels: &'static [&'static str],
    pub unit: &'static str,
    pub first_year: i32,
    pub last_year: i32,
    /// `tipo` tag attached to every record of a trade-direction file.
    pub direction: Option<&'static str>,
    pub delimiter: u8,
}

impl ColumnSemantics {
    /// Inclusive range of year columns that are read.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// True when `label` names a header/control row rather than data.
    pub fn is_header_sentinel(&self, label: &str) -> bool {
        let upper = label.to_uppercase();
        self.header_sentinels.iter().any(|s| *s == upper)
    }
}

const PRODUCTION: ColumnSemantics = ColumnSemantics {
    label_column: "produto",
    label_kind: LabelKind::Produto,
    header_sentinels: &["PRODUTO", "CONTROL"],
    unit: "litros",
    first_year: 1970,
    last_year: 2024,
    direction: None,
    delimiter: b';',
};

const PROCESSING: ColumnSemantics = ColumnSemantics {
    label_column: "cultivar",
    label_kind: LabelKind::Cultivar,
    header_sentinels: &["CULTIVAR", "CONTROL"],
    unit: "kg",
    first_year: 1970,
    last_year: 2024,
    direction: None,
    delimiter: b';',
};

const TRADE: ColumnSemantics = ColumnSemantics {
    label_column: "Produto",
    label_kind: LabelKind::Produto,
    header_sentinels: &["PRODUTO", "CONTROL"],
    unit: "litros",
    first_year: 1970,
    last_year: 2024,
    direction: None,
    delimiter: b';',
};

const IMPORTS: ColumnSemantics = ColumnSemantics {
    label_column: "País",
    label_kind: LabelKind::Pais,
    header_sentinels: &["PAÍS", "CONTROL"],
    unit: "kg",
    first_year: 1970,
    last_year: 2025,
    direction: Some("importacao"),
    delimiter: b'\t',
};

const EXPORTS: ColumnSemantics = ColumnSemantics {
    label_column: "País",
    label_kind: LabelKind::Pais,
    header_sentinels: &["PAÍS", "CONTROL"],
    unit: "kg",
    first_year: 1970,
    last_year: 2025,
    direction: Some("exportacao"),
    delimiter: b'\t',
};

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Production,
        Dataset::Processing,
        Dataset::Trade,
        Dataset::Imports,
        Dataset::Exports,
    ];

    /// Stable key used in URLs, cache file names and logs.
    pub fn key(self) -> &'static str {
        match self {
            Dataset::Production => "producao",
            Dataset::Processing => "processamento",
            Dataset::Trade => "comercializacao",
            Dataset::Imports => "importacao",
            Dataset::Exports => "exportacao",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Dataset::Production => "Produção",
            Dataset::Processing => "Processamento",
            Dataset::Trade => "Comercialização",
            Dataset::Imports => "Importação",
            Dataset::Exports => "Exportação",
        }
    }

    /// Download path of the source file, relative to the portal base URL.
    pub fn source_path(self) -> &'static str {
        match self {
            Dataset::Production => "download/Producao.csv",
            Dataset::Processing => "download/ProcessaViniferas.csv",
            Dataset::Trade => "download/Comercio.csv",
            Dataset::Imports => "download/ImpVinhos.csv",
            Dataset::Exports => "download/ExpVinho.csv",
        }
    }

    /// Portal page that renders the same statistic as HTML.
    pub fn page_path(self) -> &'static str {
        match self {
            Dataset::Production => "index.php?opcao=opt_02",
            Dataset::Processing => "index.php?opcao=opt_03",
            Dataset::Trade => "index.php?opcao=opt_04",
            Dataset::Imports => "index.php?opcao=opt_05",
            Dataset::Exports => "index.php?opcao=opt_06",
        }
    }

    pub fn semantics(self) -> &'static ColumnSemantics {
        match self {
            Dataset::Production => &PRODUCTION,
            Dataset::Processing => &PROCESSING,
            Dataset::Trade => &TRADE,
            Dataset::Imports => &IMPORTS,
            Dataset::Exports => &EXPORTS,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dataset '{0}'")]
pub struct UnknownDataset(pub String);

impl FromStr for Dataset {
    type Err = UnknownDataset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.key() == s)
            .ok_or_else(|| UnknownDataset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip_through_from_str() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.key().parse::<Dataset>().unwrap(), dataset);
        }
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = "vinhos".parse::<Dataset>().unwrap_err();
        assert_eq!(err, UnknownDataset("vinhos".to_string()));
        assert!("Producao".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(Dataset::Production.semantics().delimiter, b';');
        assert_eq!(Dataset::Processing.semantics().delimiter, b';');
        assert_eq!(Dataset::Trade.semantics().delimiter, b';');
        assert_eq!(Dataset::Imports.semantics().delimiter, b'\t');
        assert_eq!(Dataset::Exports.semantics().delimiter, b'\t');
    }

    #[test]
    fn test_year_ranges() {
        assert_eq!(Dataset::Production.semantics().years(), 1970..=2024);
        assert_eq!(Dataset::Exports.semantics().years(), 1970..=2025);
    }

    #[test]
    fn test_header_sentinels_are_case_insensitive() {
        let semantics = Dataset::Imports.semantics();
        assert!(semantics.is_header_sentinel("País"));
        assert!(semantics.is_header_sentinel("país"));
        assert!(semantics.is_header_sentinel("control"));
        assert!(!semantics.is_header_sentinel("Argentina"));
    }

    #[test]
    fn test_serde_uses_portuguese_keys() {
        let json = serde_json::to_string(&Dataset::Trade).unwrap();
        assert_eq!(json, "\"comercializacao\"");
        let back: Dataset = serde_json::from_str("\"exportacao\"").unwrap();
        assert_eq!(back, Dataset::Exports);
    }
}
