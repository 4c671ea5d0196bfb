use super::{solve, Unsolvable};
use crate::cashflow::JoinedRecord;
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DealResult {
    pub deal: String,
    pub irr: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealIrrs {
    pub results: Vec<DealResult>,
    pub skipped: Vec<String>,
}

impl DealIrrs {
    #[cfg(test)]
    pub fn get(&self, deal: &str) -> Option<&DealResult> {
        self.results.iter().find(|result| result.deal == deal)
    }
}

/// One irr per deal, deals kept in the order they first appear in `records`.
pub fn by_deal(records: &[JoinedRecord]) -> DealIrrs {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut deals: Vec<(&str, Vec<&JoinedRecord>)> = Vec::new();
    for record in records {
        let deal = record.deal_code();
        let position = *positions.entry(deal).or_insert_with(|| {
            deals.push((deal, Vec::new()));
            deals.len() - 1
        });
        deals[position].1.push(record);
    }

    let mut result = DealIrrs::default();
    for (deal, group) in deals {
        let irr = match solve(group) {
            Ok(irr) => {
                debug!("deal {} irr {:.2}%", deal, irr);
                Some(irr)
            }
            Err(reason) => {
                log_skipped_deal(deal, reason);
                result.skipped.push(deal.to_string());
                None
            }
        };
        result.results.push(DealResult {
            deal: deal.to_string(),
            irr,
        });
    }
    result
}

fn log_skipped_deal(deal: &str, reason: Unsolvable) {
    if reason.is_structural() {
        warn!("deal {} skipped: {}", deal, reason);
    } else {
        warn!("deal {} skipped, no rate found: {}", deal, reason);
    }
}
