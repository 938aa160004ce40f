//! Fallback catalog: fixed illustrative records served when neither the
//! source nor the cache can provide data.

use vitibrasil_parser::{Dataset, Label, Record};

fn record(ano: i32, label: Label, quantidade: i64, unidade: &str, tipo: Option<&str>) -> Record {
    Record {
        ano,
        label,
        quantidade,
        unidade: unidade.to_string(),
        tipo: tipo.map(str::to_string),
    }
}

fn produto(name: &str) -> Label {
    Label::Produto(name.to_string())
}

fn cultivar(name: &str) -> Label {
    Label::Cultivar(name.to_string())
}

fn pais(name: &str) -> Label {
    Label::Pais(name.to_string())
}

pub fn fallback_records(dataset: Dataset) -> Vec<Record> {
    match dataset {
        Dataset::Production => vec![
            record(2023, produto("Vinho de mesa"), 250_000_000, "litros", None),
            record(2023, produto("Vinho fino"), 45_000_000, "litros", None),
            record(2022, produto("Vinho de mesa"), 240_000_000, "litros", None),
        ],
        Dataset::Processing => vec![
            record(2023, cultivar("Viníferas"), 180_000_000, "kg", None),
            record(2023, cultivar("Americanas e híbridas"), 320_000_000, "kg", None),
        ],
        Dataset::Trade => vec![
            record(2023, produto("Vinho de mesa"), 200_000_000, "litros", None),
            record(2023, produto("Espumante"), 15_000_000, "litros", None),
        ],
        Dataset::Imports => vec![
            record(2023, pais("Argentina"), 5_000_000, "kg", Some("importacao")),
            record(2023, pais("Chile"), 2_000_000, "kg", Some("importacao")),
        ],
        Dataset::Exports => vec![
            record(2023, pais("Paraguai"), 3_000_000, "kg", Some("exportacao")),
            record(2023, pais("Estados Unidos"), 8_000_000, "kg", Some("exportacao")),
        ],
    }
}
