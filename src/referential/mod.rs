mod filter;
mod serialize;

pub use filter::Filter;

use crate::cashflow::{CashFlowRecord, EntityMetadata, JoinedRecord, Schema};
use crate::error::Error;

use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new_referential(error.to_string())
    }
}

/// Cash flow table and entity metadata table, as loaded.
pub struct Referential {
    cash_flows: Vec<CashFlowRecord>,
    metadata: Vec<EntityMetadata>,
    schema: Schema,
}

impl Referential {
    pub fn new(
        cash_flows: Vec<CashFlowRecord>,
        metadata: Vec<EntityMetadata>,
    ) -> Result<Self, Error> {
        let duplicate = {
            let mut deals = HashSet::new();
            metadata
                .iter()
                .find(|item| !deals.insert(item.deal.as_str()))
                .map(|item| item.deal.clone())
        };
        if let Some(deal) = duplicate {
            return Err(Error::new_referential(format!(
                "deal {deal} is described more than once"
            )));
        }

        let schema = Schema::from_metadata(&metadata);
        Ok(Self {
            cash_flows,
            metadata,
            schema,
        })
    }

    pub fn load(cash_flows_filename: &str, metadata_filename: &str) -> Result<Self, Error> {
        let cash_flows = File::open(cash_flows_filename).map_err(|err| {
            Error::new_referential(format!("unable to open {cash_flows_filename} : {err}"))
        })?;
        let metadata = File::open(metadata_filename).map_err(|err| {
            Error::new_referential(format!("unable to open {metadata_filename} : {err}"))
        })?;
        let referential = Self::from_readers(BufReader::new(cash_flows), BufReader::new(metadata))?;
        info!(
            "loading {} cash flows and {} deals done",
            referential.cash_flows().len(),
            referential.metadata().len()
        );
        Ok(referential)
    }

    pub fn from_readers<C: Read, M: Read>(cash_flows: C, metadata: M) -> Result<Self, Error> {
        Self::new(
            serialize::read_cash_flows(cash_flows)?,
            serialize::read_metadata(metadata)?,
        )
    }

    pub fn cash_flows(&self) -> &[CashFlowRecord] {
        &self.cash_flows
    }

    pub fn metadata(&self) -> &[EntityMetadata] {
        &self.metadata
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Pairs every cash flow with the metadata of its deal, in cash flow order.
    ///
    /// Cash flows of undescribed deals are dropped.
    pub fn join(&self) -> Vec<JoinedRecord<'_>> {
        let by_deal: HashMap<&str, &EntityMetadata> = self
            .metadata
            .iter()
            .map(|item| (item.deal.as_str(), item))
            .collect();

        let mut unknown_deals = HashSet::new();
        let records = self
            .cash_flows
            .iter()
            .filter_map(|cash_flow| match by_deal.get(cash_flow.deal_code.as_str()) {
                Some(metadata) => Some(JoinedRecord::new(cash_flow, metadata)),
                None => {
                    unknown_deals.insert(cash_flow.deal_code.as_str());
                    None
                }
            })
            .collect::<Vec<_>>();

        if !unknown_deals.is_empty() {
            let mut unknown_deals = unknown_deals.into_iter().collect::<Vec<_>>();
            unknown_deals.sort();
            warn!(
                "cash flows of deals without metadata are ignored : {}",
                unknown_deals.join(", ")
            );
        }
        records
    }
}
