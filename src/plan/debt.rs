//! Debt record

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::money::round_currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtKind {
    CreditCard,
    PersonalLoan,
    StudentLoan,
    Mortgage,
    AutoLoan,
    HomeEquityLoan,
    BusinessLoan,
    #[default]
    Other,
}

impl DebtKind {
    /// Parse the upper-case label used in files ("CREDIT_CARD")
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "CREDIT_CARD" => Some(DebtKind::CreditCard),
            "PERSONAL_LOAN" => Some(DebtKind::PersonalLoan),
            "STUDENT_LOAN" => Some(DebtKind::StudentLoan),
            "MORTGAGE" => Some(DebtKind::Mortgage),
            "AUTO_LOAN" => Some(DebtKind::AutoLoan),
            "HOME_EQUITY_LOAN" => Some(DebtKind::HomeEquityLoan),
            "BUSINESS_LOAN" => Some(DebtKind::BusinessLoan),
            "OTHER" | "" => Some(DebtKind::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStatus {
    #[default]
    Active,
    PaidOff,
}

/// A single debt
///
/// `interest_rate` is an annual percentage (18 = 18% APR), unlike the
/// fractional rates on `RetirementPlan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    #[serde(default)]
    pub id: Option<u64>,

    pub name: String,

    #[serde(default)]
    pub kind: DebtKind,

    pub current_balance: Decimal,

    /// Balance when the debt was opened; defaults to the current balance
    #[serde(default)]
    pub original_balance: Option<Decimal>,

    pub interest_rate: Decimal,

    pub minimum_payment: Decimal,

    /// Day of month the payment is due (1-31)
    #[serde(default)]
    pub due_day: Option<u32>,

    #[serde(default)]
    pub status: DebtStatus,
}

impl Debt {
    pub fn new(
        name: impl Into<String>,
        current_balance: Decimal,
        interest_rate: Decimal,
        minimum_payment: Decimal,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: DebtKind::Other,
            current_balance,
            original_balance: None,
            interest_rate,
            minimum_payment,
            due_day: None,
            status: DebtStatus::Active,
        }
    }

    pub fn with_kind(mut self, kind: DebtKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_original_balance(mut self, original: Decimal) -> Self {
        self.original_balance = Some(original);
        self
    }

    pub fn with_due_day(mut self, day: u32) -> Self {
        self.due_day = Some(day);
        self
    }

    pub fn is_paid_off(&self) -> bool {
        self.status == DebtStatus::PaidOff || self.current_balance <= Decimal::ZERO
    }

    /// Active with something left to pay
    pub fn is_open(&self) -> bool {
        self.status == DebtStatus::Active && self.current_balance > Decimal::ZERO
    }

    /// Share of the original balance already repaid, 0-100
    pub fn progress_percent(&self) -> Decimal {
        let original = self.original_balance.unwrap_or(self.current_balance);
        if original <= Decimal::ZERO {
            return if self.is_paid_off() { dec!(100) } else { Decimal::ZERO };
        }
        let paid = (original - self.current_balance).max(Decimal::ZERO);
        round_currency((paid / original * dec!(100)).min(dec!(100)))
    }

    /// First due date on or after `from`
    ///
    /// A due day past the end of a short month falls on that month's last day.
    pub fn next_due_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        let day = self.due_day?;
        let this_month = clamp_day(from.year(), from.month(), day)?;
        if this_month >= from {
            return Some(this_month);
        }
        let (year, month) = if from.month() == 12 {
            (from.year() + 1, 1)
        } else {
            (from.year(), from.month() + 1)
        };
        clamp_day(year, month, day)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.current_balance < Decimal::ZERO {
            return Err(EngineError::invalid(
                "current_balance",
                format!("{}: balance {} is negative", self.name, self.current_balance),
            ));
        }
        if let Some(original) = self.original_balance {
            if original < Decimal::ZERO {
                return Err(EngineError::invalid(
                    "original_balance",
                    format!("{}: original balance {} is negative", self.name, original),
                ));
            }
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate > dec!(100) {
            return Err(EngineError::invalid(
                "interest_rate",
                format!("{}: rate {}% is outside [0, 100]", self.name, self.interest_rate),
            ));
        }
        if self.is_open() && self.minimum_payment <= Decimal::ZERO {
            return Err(EngineError::invalid(
                "minimum_payment",
                format!("{}: minimum payment must be positive", self.name),
            ));
        }
        if let Some(day) = self.due_day {
            if !(1..=31).contains(&day) {
                return Err(EngineError::invalid(
                    "due_day",
                    format!("{}: due day {} is outside 1-31", self.name, day),
                ));
            }
        }
        Ok(())
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

fn clamp_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(first + Duration::days(i64::from(day.min(last)) - 1))
}
