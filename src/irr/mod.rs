mod deal;
mod grouping;
mod primitive;
mod series;

pub use deal::*;
pub use grouping::*;
pub use primitive::*;
pub use series::*;

use crate::cashflow::{JoinedRecord, Schema};
use crate::error::Error;
use log::info;

/// Nets the records of one partition by date and solves it, irr in percent.
fn solve<'r, 'a: 'r, I>(records: I) -> Result<f64, Unsolvable>
where
    I: IntoIterator<Item = &'r JoinedRecord<'a>>,
{
    let series: NetCashFlowSeries = records
        .into_iter()
        .map(|record| CashFlow::new(record.date(), record.amount()))
        .collect();
    xirr_percent(&series)
}

pub struct IrrReport {
    pub categories: GroupedIrrs,
    pub deals: DealIrrs,
}

impl IrrReport {
    pub fn compute<S: AsRef<str>>(
        records: &[JoinedRecord],
        keys: &[S],
        schema: &Schema,
    ) -> Result<IrrReport, Error> {
        info!(
            "compute irr of {} cash flows grouped by [{}]",
            records.len(),
            keys.iter()
                .map(|key| key.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let categories = group_by(records, keys, schema)?;
        info!(
            "{} groups computed, {} skipped",
            categories.results.len(),
            categories.skipped.len()
        );

        let deals = by_deal(records);
        info!(
            "{} deals computed, {} skipped",
            deals.results.len(),
            deals.skipped.len()
        );

        Ok(IrrReport { categories, deals })
    }

    /// Mean irr over the category groups, the deal level is not part of it.
    pub fn average_irr(&self) -> Option<f64> {
        self.categories.average_irr()
    }
}
