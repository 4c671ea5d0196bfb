use super::CashFlow;
use crate::alias::Date;
use std::collections::BTreeMap;

/// Cash flows netted by date, strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetCashFlowSeries {
    flows: Vec<CashFlow>,
}

impl NetCashFlowSeries {
    pub fn from_flows<I>(flows: I) -> Self
    where
        I: IntoIterator<Item = CashFlow>,
    {
        let mut buckets: BTreeMap<Date, Vec<f64>> = BTreeMap::new();
        for flow in flows {
            buckets.entry(flow.date).or_default().push(flow.amount);
        }

        // amounts are summed in a fixed order so the input order never leaks in the result
        let flows = buckets
            .into_iter()
            .map(|(date, mut amounts)| {
                amounts.sort_by(f64::total_cmp);
                CashFlow::new(date, amounts.iter().sum())
            })
            .collect();
        Self { flows }
    }

    #[inline]
    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.flows.first().map(|flow| flow.date)
    }

    pub fn has_sign_change(&self) -> bool {
        self.flows.iter().any(|flow| flow.amount > 0.0)
            && self.flows.iter().any(|flow| flow.amount < 0.0)
    }
}

impl FromIterator<CashFlow> for NetCashFlowSeries {
    fn from_iter<I: IntoIterator<Item = CashFlow>>(iter: I) -> Self {
        NetCashFlowSeries::from_flows(iter)
    }
}
