use crate::alias::Date;
use crate::cashflow::{Field, JoinedRecord, KeyValue, Schema};
use crate::error::Error;
use std::collections::HashSet;

/// Record selection applied before grouping.
///
/// Each field filter keeps the records whose value is one of the accepted
/// values, records without a value never match. Dates are inclusive.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, HashSet<String>)>,
    begin: Option<Date>,
    end: Option<Date>,
}

impl Filter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_field<N, I, V>(mut self, name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.fields.push((
            name.into(),
            values.into_iter().map(|value| value.into()).collect(),
        ));
        self
    }

    pub fn with_begin(mut self, begin: Option<Date>) -> Self {
        self.begin = begin;
        self
    }

    pub fn with_end(mut self, end: Option<Date>) -> Self {
        self.end = end;
        self
    }

    /// Parses `Name=value1,value2`.
    pub fn parse_field(input: &str) -> Result<(String, Vec<String>), Error> {
        let (name, values) = input.split_once('=').ok_or_else(|| {
            Error::new_referential(format!("filter '{input}' must be like Name=value1,value2"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::new_referential(format!(
                "filter '{input}' has no field name"
            )));
        }
        let values = values
            .split(',')
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        Ok((name.to_string(), values))
    }

    pub fn apply<'a>(
        &self,
        records: Vec<JoinedRecord<'a>>,
        schema: &Schema,
    ) -> Result<Vec<JoinedRecord<'a>>, Error> {
        let fields = self
            .fields
            .iter()
            .map(|(name, values)| {
                Field::resolve(name, schema)
                    .map(|field| (field, values))
                    .ok_or_else(|| Error::new_referential(format!("unknown filter field {name}")))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(records
            .into_iter()
            .filter(|record| self.begin.is_none_or(|begin| record.date() >= begin))
            .filter(|record| self.end.is_none_or(|end| record.date() <= end))
            .filter(|record| {
                fields.iter().all(|(field, values)| {
                    let value = record.project(field);
                    value != KeyValue::Missing
                        && values.contains(&value.to_string())
                })
            })
            .collect())
    }
}
