//! Load plans, debts, goals and scenarios from JSON or CSV files

use super::{Debt, DebtKind, DebtStatus, Goal, NamedScenario, RetirementPlan};
use crate::money::to_money;
use csv::Reader;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Raw CSV row for a debt file
///
/// Columns: Name, Kind, Balance, OriginalBalance, APR, MinimumPayment, DueDay, Status
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Kind", default)]
    kind: String,
    #[serde(rename = "Balance")]
    balance: f64,
    #[serde(rename = "OriginalBalance", default)]
    original_balance: Option<f64>,
    #[serde(rename = "APR")]
    apr: f64,
    #[serde(rename = "MinimumPayment")]
    minimum_payment: f64,
    #[serde(rename = "DueDay", default)]
    due_day: Option<u32>,
    #[serde(rename = "Status", default)]
    status: String,
}

impl CsvRow {
    fn to_debt(self, row: usize) -> Result<Debt, Box<dyn Error>> {
        let kind = DebtKind::from_label(&self.kind)
            .ok_or_else(|| format!("Unknown debt Kind: {}", self.kind))?;

        let status = match self.status.trim().to_ascii_uppercase().as_str() {
            "" | "ACTIVE" => DebtStatus::Active,
            "PAID_OFF" => DebtStatus::PaidOff,
            other => return Err(format!("Unknown debt Status: {}", other).into()),
        };

        let interest_rate = Decimal::from_f64(self.apr)
            .map(|r| r.round_dp(4))
            .ok_or_else(|| format!("Invalid APR: {}", self.apr))?;

        Ok(Debt {
            id: Some(row as u64 + 1),
            name: self.name,
            kind,
            current_balance: to_money(self.balance),
            original_balance: self.original_balance.map(to_money),
            interest_rate,
            minimum_payment: to_money(self.minimum_payment),
            due_day: self.due_day,
            status,
        })
    }
}

/// Read debts from any CSV source
pub fn read_debts_csv<R: Read>(source: R) -> Result<Vec<Debt>, Box<dyn Error>> {
    let mut reader = Reader::from_reader(source);
    let mut debts = Vec::new();

    for (row, result) in reader.deserialize().enumerate() {
        let raw: CsvRow = result?;
        debts.push(raw.to_debt(row)?);
    }

    Ok(debts)
}

/// Load debts from a `.csv` file or a JSON array
pub fn load_debts<P: AsRef<Path>>(path: P) -> Result<Vec<Debt>, Box<dyn Error>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        read_debts_csv(File::open(path)?)
    } else {
        load_json(path)
    }
}

/// Load a single plan from a JSON object
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<RetirementPlan, Box<dyn Error>> {
    load_json(path)
}

/// Load a JSON array of plans
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<RetirementPlan>, Box<dyn Error>> {
    load_json(path)
}

pub fn load_goals<P: AsRef<Path>>(path: P) -> Result<Vec<Goal>, Box<dyn Error>> {
    load_json(path)
}

pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<NamedScenario>, Box<dyn Error>> {
    load_json(path)
}

fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
