use super::NetCashFlowSeries;
use crate::alias::Date;

pub const DEFAULT_GUESS: f64 = 0.1;
const MAX_ITERATIONS: usize = 50;
const TOLERANCE: f64 = 1.48e-8;
const DAYS_IN_YEAR: f64 = 365.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CashFlow {
    pub date: Date,
    pub amount: f64,
}

impl CashFlow {
    #[inline]
    pub fn new(date: Date, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Why a series has no internal rate of return.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Unsolvable {
    NotEnoughDates,
    NoSignChange,
    ZeroDerivative,
    Diverged,
    NoConvergence,
}

impl Unsolvable {
    /// True when the series itself cannot carry a rate, whatever the root finder does.
    pub fn is_structural(&self) -> bool {
        matches!(self, Unsolvable::NotEnoughDates | Unsolvable::NoSignChange)
    }
}

impl std::fmt::Display for Unsolvable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Unsolvable::NotEnoughDates => "less than two distinct dates",
            Unsolvable::NoSignChange => "missing positive or negative cash flow",
            Unsolvable::ZeroDerivative => "npv derivative vanished",
            Unsolvable::Diverged => "root finder diverged",
            Unsolvable::NoConvergence => "root finder did not converge",
        };
        f.write_str(reason)
    }
}

fn year_fraction(date: Date, t0: Date) -> f64 {
    (date - t0).num_days() as f64 / DAYS_IN_YEAR
}

fn xnpv(rate: f64, cashflows: &[CashFlow], t0: Date) -> f64 {
    cashflows
        .iter()
        .map(|cf| cf.amount / (1.0 + rate).powf(year_fraction(cf.date, t0)))
        .sum()
}

fn dxnpv(rate: f64, cashflows: &[CashFlow], t0: Date) -> f64 {
    cashflows
        .iter()
        .map(|cf| {
            let frac = year_fraction(cf.date, t0);
            -cf.amount * frac / (1.0 + rate).powf(frac + 1.0)
        })
        .sum()
}

/// Annualized rate (as a fraction) zeroing the actual/365 net present value of `series`.
///
/// Newton-Raphson from a fixed 10% seed, no fallback: the same series always
/// gives the same answer or the same failure.
pub fn xirr(series: &NetCashFlowSeries) -> Result<f64, Unsolvable> {
    xirr_with_guess(series, DEFAULT_GUESS)
}

pub fn xirr_with_guess(series: &NetCashFlowSeries, guess: f64) -> Result<f64, Unsolvable> {
    let cashflows = series.flows();
    let t0 = match series.first_date() {
        Some(date) if cashflows.len() >= 2 => date,
        _ => return Err(Unsolvable::NotEnoughDates),
    };
    if !series.has_sign_change() {
        return Err(Unsolvable::NoSignChange);
    }

    let mut rate = guess;
    for _ in 0..MAX_ITERATIONS {
        let f_value = xnpv(rate, cashflows, t0);
        let f_derivative = dxnpv(rate, cashflows, t0);

        if !f_value.is_finite() || !f_derivative.is_finite() {
            return Err(Unsolvable::Diverged);
        }
        if f_derivative.abs() < f64::EPSILON {
            return Err(Unsolvable::ZeroDerivative);
        }

        let new_rate = rate - f_value / f_derivative;

        // (1 + rate) must stay positive for the fractional powers
        if !new_rate.is_finite() || new_rate <= -1.0 {
            return Err(Unsolvable::Diverged);
        }
        if (new_rate - rate).abs() < TOLERANCE {
            return Ok(new_rate);
        }

        rate = new_rate;
    }

    Err(Unsolvable::NoConvergence)
}

/// Same as [`xirr`] but expressed in percent, rounded to 2 decimals.
pub fn xirr_percent(series: &NetCashFlowSeries) -> Result<f64, Unsolvable> {
    xirr(series).map(to_rounded_percent)
}

pub fn to_rounded_percent(rate: f64) -> f64 {
    // + 0.0 turns -0.0 into 0.0
    (rate * 100.0 * 100.0).round() / 100.0 + 0.0
}
