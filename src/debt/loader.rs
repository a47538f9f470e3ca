//! Load debt lists from CSV or JSON
//!
//! Expected CSV header: `id,name,kind,balance,interest_rate,minimum_payment`.
//! JSON input is an array of serialized [`Debt`] records.

use super::{Debt, DebtKind};
use crate::error::{PlanError, Result};
use csv::Reader;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    #[serde(default)]
    name: String,
    kind: String,
    balance: f64,
    interest_rate: f64,
    minimum_payment: f64,
}

impl CsvRow {
    fn into_debt(self) -> Result<Debt> {
        let kind: DebtKind = self.kind.parse()?;
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(PlanError::InvalidInput("debt id must not be empty".into()));
        }
        let name = if self.name.trim().is_empty() { id.clone() } else { self.name };

        Ok(Debt::new(id, name, kind, self.balance, self.interest_rate, self.minimum_payment))
    }
}

/// Load all debts from a file; `.json` files are read as JSON, anything else as CSV
pub fn load_debts<P: AsRef<Path>>(path: P) -> Result<Vec<Debt>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let file = File::open(path)?;
        return load_debts_json(BufReader::new(file));
    }
    collect_debts(Reader::from_path(path)?)
}

/// Load debts from a JSON array
pub fn load_debts_json<R: std::io::Read>(reader: R) -> Result<Vec<Debt>> {
    let debts: Vec<Debt> = serde_json::from_reader(reader)?;
    check_unique_ids(&debts)?;
    log::debug!("loaded {} debts from json", debts.len());
    Ok(debts)
}

/// Load debts from any reader (e.g., string buffer, stdin)
pub fn load_debts_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Debt>> {
    collect_debts(Reader::from_reader(reader))
}

fn collect_debts<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Debt>> {
    let mut debts = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        debts.push(row.into_debt()?);
    }

    check_unique_ids(&debts)?;
    log::debug!("loaded {} debts", debts.len());
    Ok(debts)
}

fn check_unique_ids(debts: &[Debt]) -> Result<()> {
    let mut seen = HashSet::new();
    for debt in debts {
        if debt.id.trim().is_empty() {
            return Err(PlanError::InvalidInput("debt id must not be empty".into()));
        }
        if !seen.insert(debt.id.as_str()) {
            return Err(PlanError::InvalidInput(format!("duplicate debt id: {}", debt.id)));
        }
    }
    Ok(())
}
