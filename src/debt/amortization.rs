//! Month-by-month amortization of a set of debts
//!
//! Runs entirely in `Decimal`, with each month's interest rounded to cents.
//! The loop is bounded by `max_months`; running out of months, or a balance
//! compounding past `Decimal` range, yields [`Amortization::NonConverging`]
//! instead of a truncated result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{monthly_rate_from_apr, round_currency};
use crate::plan::Debt;

/// One row of a debt's amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    pub opening_balance: Decimal,
    pub interest: Decimal,
    pub payment: Decimal,
    pub closing_balance: Decimal,
}

/// How money moves between debts each month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// Extra payment, freed minimums and leftovers go to the priority debt
    Rollover,
    /// Each debt only ever gets its own minimum
    MinimumsOnly,
}

/// Result of amortizing one debt
#[derive(Debug, Clone)]
pub struct DebtRun {
    pub months_to_payoff: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub schedule: Vec<ScheduleEntry>,
}

/// Result of amortizing the whole set, in input order
#[derive(Debug, Clone)]
pub struct Simulation {
    pub runs: Vec<DebtRun>,
    pub total_months: u32,
}

impl Simulation {
    pub fn total_interest(&self) -> Decimal {
        self.runs.iter().map(|r| r.total_interest).sum()
    }

    pub fn total_paid(&self) -> Decimal {
        self.runs.iter().map(|r| r.total_paid).sum()
    }

    /// Month in which the first debt closed
    pub fn first_payoff_month(&self) -> u32 {
        self.runs.iter().map(|r| r.months_to_payoff).min().unwrap_or(0)
    }
}

/// Outcome of a bounded amortization loop
#[derive(Debug, Clone)]
pub enum Amortization {
    Converged(Simulation),
    /// Some balance was still open after `months`, or grew past `Decimal` range
    NonConverging { months: u32 },
}

/// Per-debt running state
struct Track<'a> {
    debt: &'a Debt,
    balance: Decimal,
    monthly_rate: Decimal,
    interest: Decimal,
    paid: Decimal,
    payoff_month: Option<u32>,
    opening: Option<Decimal>,
    month_interest: Decimal,
    month_payment: Decimal,
    schedule: Vec<ScheduleEntry>,
}

impl<'a> Track<'a> {
    fn new(debt: &'a Debt) -> Self {
        Self {
            debt,
            balance: debt.current_balance,
            monthly_rate: monthly_rate_from_apr(debt.interest_rate),
            interest: Decimal::ZERO,
            paid: Decimal::ZERO,
            payoff_month: None,
            opening: None,
            month_interest: Decimal::ZERO,
            month_payment: Decimal::ZERO,
            schedule: Vec::new(),
        }
    }

    fn is_open(&self) -> bool {
        self.payoff_month.is_none()
    }

    /// Add a month of interest; `None` once the balance leaves `Decimal` range
    fn accrue(&mut self) -> Option<()> {
        let interest = round_currency(self.balance.checked_mul(self.monthly_rate)?);
        let balance = self.balance.checked_add(interest)?;
        let total = self.interest.checked_add(interest)?;

        self.opening = Some(self.balance);
        self.month_interest = interest;
        self.month_payment = Decimal::ZERO;
        self.balance = balance;
        self.interest = total;
        Some(())
    }

    /// Pay up to `amount`, returning what was actually applied
    fn pay(&mut self, amount: Decimal) -> Decimal {
        let applied = amount.min(self.balance).max(Decimal::ZERO);
        self.balance -= applied;
        self.paid += applied;
        self.month_payment += applied;
        applied
    }

    /// Pay the minimum, returning the part of it the debt did not need
    fn pay_minimum(&mut self) -> Decimal {
        let minimum = self.debt.minimum_payment;
        minimum - self.pay(minimum)
    }

    fn close_month(&mut self, month: u32, record: bool) {
        if let Some(opening) = self.opening.take() {
            if record {
                self.schedule.push(ScheduleEntry {
                    month,
                    opening_balance: opening,
                    interest: self.month_interest,
                    payment: self.month_payment,
                    closing_balance: self.balance,
                });
            }
        }
    }
}

/// Bounded monthly amortization loop
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    pub max_months: u32,
    pub record_schedule: bool,
}

impl Simulator {
    pub fn new(max_months: u32) -> Self {
        Self {
            max_months,
            record_schedule: true,
        }
    }

    /// Amortize `debts`, directing surplus money by `priority`
    ///
    /// `priority` holds indices into `debts`. All debts must have a positive
    /// balance.
    pub fn run(
        &self,
        debts: &[&Debt],
        priority: &[usize],
        extra_payment: Decimal,
        mode: PaymentMode,
    ) -> Amortization {
        let rollover = mode == PaymentMode::Rollover;
        let mut tracks: Vec<Track> = debts.iter().map(|d| Track::new(d)).collect();
        let mut freed = Decimal::ZERO;
        let mut month = 0u32;

        while tracks.iter().any(Track::is_open) {
            if month >= self.max_months {
                return Amortization::NonConverging { months: month };
            }
            month += 1;

            let mut pool = if rollover {
                extra_payment + freed
            } else {
                Decimal::ZERO
            };

            for track in tracks.iter_mut().filter(|t| t.is_open()) {
                if track.accrue().is_none() {
                    // A balance this large cannot close before the guard
                    return Amortization::NonConverging {
                        months: self.max_months,
                    };
                }
            }
            for track in tracks.iter_mut().filter(|t| t.is_open()) {
                let unused = track.pay_minimum();
                if rollover {
                    pool += unused;
                }
            }
            for &i in priority {
                if pool <= Decimal::ZERO {
                    break;
                }
                let track = &mut tracks[i];
                if track.is_open() && track.balance > Decimal::ZERO {
                    pool -= track.pay(pool);
                }
            }

            for track in tracks.iter_mut() {
                if track.is_open() && track.balance <= Decimal::ZERO {
                    track.payoff_month = Some(month);
                    if rollover {
                        freed += track.debt.minimum_payment;
                    }
                }
                track.close_month(month, self.record_schedule);
            }
        }

        let runs = tracks
            .into_iter()
            .map(|t| DebtRun {
                months_to_payoff: t.payoff_month.unwrap_or(0),
                total_interest: t.interest,
                total_paid: t.paid,
                schedule: t.schedule,
            })
            .collect();

        Amortization::Converged(Simulation {
            runs,
            total_months: month,
        })
    }
}
