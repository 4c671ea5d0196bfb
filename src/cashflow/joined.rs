use super::{CashFlowRecord, EntityMetadata, Schema};
use crate::alias::Date;
use chrono::Datelike;

pub const YEAR_FIELD: &str = "Year";
pub const FUND_FIELD: &str = "Fund";
pub const DEAL_CODE_FIELD: &str = "Deal Code";

/// Column a joined record can be projected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Year,
    Fund,
    DealCode,
    Attribute(String),
}

impl Field {
    /// Record columns and the derived year win over metadata attributes of the same name.
    pub fn resolve(name: &str, schema: &Schema) -> Option<Field> {
        match name {
            YEAR_FIELD => Some(Field::Year),
            FUND_FIELD => Some(Field::Fund),
            DEAL_CODE_FIELD => Some(Field::DealCode),
            _ if schema.contains(name) => Some(Field::Attribute(name.to_string())),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Year => YEAR_FIELD,
            Field::Fund => FUND_FIELD,
            Field::DealCode => DEAL_CODE_FIELD,
            Field::Attribute(name) => name.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Missing,
    Year(i32),
    Text(String),
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::Missing => Ok(()),
            KeyValue::Year(year) => write!(f, "{year}"),
            KeyValue::Text(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JoinedRecord<'a> {
    pub cash_flow: &'a CashFlowRecord,
    pub metadata: &'a EntityMetadata,
}

impl<'a> JoinedRecord<'a> {
    pub fn new(cash_flow: &'a CashFlowRecord, metadata: &'a EntityMetadata) -> Self {
        Self {
            cash_flow,
            metadata,
        }
    }

    #[inline]
    pub fn date(&self) -> Date {
        self.cash_flow.date
    }

    #[inline]
    pub fn amount(&self) -> f64 {
        self.cash_flow.amount
    }

    #[inline]
    pub fn deal_code(&self) -> &'a str {
        &self.cash_flow.deal_code
    }

    pub fn year(&self) -> i32 {
        self.cash_flow.date.year()
    }

    pub fn project(&self, field: &Field) -> KeyValue {
        match field {
            Field::Year => KeyValue::Year(self.year()),
            Field::Fund => KeyValue::Text(self.cash_flow.fund.clone()),
            Field::DealCode => KeyValue::Text(self.cash_flow.deal_code.clone()),
            Field::Attribute(name) => self
                .metadata
                .attribute(name)
                .map(|value| KeyValue::Text(value.to_string()))
                .unwrap_or(KeyValue::Missing),
        }
    }
}
