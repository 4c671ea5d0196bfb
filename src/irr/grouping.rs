use super::{solve, Unsolvable};
use crate::cashflow::{Field, JoinedRecord, KeyValue, Schema};
use crate::error::Error;
use log::{debug, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    values: Vec<(String, KeyValue)>,
}

impl GroupKey {
    pub fn new(values: Vec<(String, KeyValue)>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[(String, KeyValue)] {
        &self.values
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&KeyValue> {
        self.values
            .iter()
            .find(|(key_name, _)| key_name == name)
            .map(|(_, value)| value)
    }

    /// Human readable form, `Tech | EU | Fund I`.
    pub fn label(&self) -> String {
        if self.values.is_empty() {
            return "All".to_string();
        }
        self.values
            .iter()
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    pub key: GroupKey,
    pub irr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGroup {
    pub key: GroupKey,
    pub reason: Unsolvable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedIrrs {
    key_names: Vec<String>,
    pub results: Vec<GroupResult>,
    pub skipped: Vec<SkippedGroup>,
}

impl GroupedIrrs {
    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    pub fn solved(&self) -> impl Iterator<Item = (&GroupKey, f64)> {
        self.results
            .iter()
            .filter_map(|result| result.irr.map(|irr| (&result.key, irr)))
    }

    /// Mean of the solved groups, `None` when no group could be solved.
    pub fn average_irr(&self) -> Option<f64> {
        let (count, sum) = self
            .solved()
            .fold((0usize, 0.0), |(count, sum), (_, irr)| (count + 1, sum + irr));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

pub fn resolve_fields<S: AsRef<str>>(keys: &[S], schema: &Schema) -> Result<Vec<Field>, Error> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            Field::resolve(key, schema).ok_or_else(|| {
                Error::new_grouping(format!(
                    "unknown grouping key '{}', available keys are Year, Fund, Deal Code, {}",
                    key,
                    schema.attributes().collect::<Vec<_>>().join(", ")
                ))
            })
        })
        .collect()
}

/// Splits `records` by their projection on `fields`, partitions ordered by key.
pub fn partition<'r, 'a>(
    records: &'r [JoinedRecord<'a>],
    fields: &[Field],
) -> BTreeMap<Vec<KeyValue>, Vec<&'r JoinedRecord<'a>>> {
    let mut partitions: BTreeMap<Vec<KeyValue>, Vec<&'r JoinedRecord<'a>>> = BTreeMap::new();
    for record in records {
        let key = fields.iter().map(|field| record.project(field)).collect();
        partitions.entry(key).or_default().push(record);
    }
    partitions
}

pub fn group_by<S: AsRef<str>>(
    records: &[JoinedRecord],
    keys: &[S],
    schema: &Schema,
) -> Result<GroupedIrrs, Error> {
    let fields = resolve_fields(keys, schema)?;
    let key_names: Vec<String> = fields.iter().map(|field| field.name().to_string()).collect();

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for (values, group) in partition(records, &fields) {
        let key = GroupKey::new(key_names.iter().cloned().zip(values).collect());
        match solve(group.iter().copied()) {
            Ok(irr) => {
                debug!("group {} irr {:.2}%", key.label(), irr);
                results.push(GroupResult {
                    key,
                    irr: Some(irr),
                });
            }
            Err(reason) => {
                warn!("group {} skipped: {}", key.label(), reason);
                results.push(GroupResult {
                    key: key.clone(),
                    irr: None,
                });
                skipped.push(SkippedGroup { key, reason });
            }
        }
    }

    Ok(GroupedIrrs {
        key_names,
        results,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::Date;
    use crate::cashflow::{CashFlowRecord, EntityMetadata};
    use crate::error::ErrorKind;
    use assert_float_eq::*;

    fn make_date_(year: i32, month: u32, day: u32) -> Date {
        Date::from_ymd_opt(year, month, day).unwrap()
    }

    fn make_flow_(date: Date, amount: f64, deal: &str, fund: &str) -> CashFlowRecord {
        CashFlowRecord {
            date,
            amount,
            deal_code: deal.to_string(),
            fund: fund.to_string(),
        }
    }

    fn make_metadata_() -> Vec<EntityMetadata> {
        let mut unknown_region = EntityMetadata::new("D3").with_attribute("Industry", "Tech");
        unknown_region.attributes.insert("Region".to_string(), None);
        vec![
            EntityMetadata::new("D1")
                .with_attribute("Industry", "Tech")
                .with_attribute("Region", "EU"),
            EntityMetadata::new("D2")
                .with_attribute("Industry", "Health")
                .with_attribute("Region", "US"),
            unknown_region,
        ]
    }

    fn make_flows_() -> Vec<CashFlowRecord> {
        vec![
            make_flow_(make_date_(2020, 1, 1), -1000.0, "D1", "F1"),
            make_flow_(make_date_(2021, 1, 1), 1100.0, "D1", "F1"),
            make_flow_(make_date_(2020, 1, 1), -500.0, "D2", "F2"),
            make_flow_(make_date_(2020, 1, 1), -500.0, "D2", "F2"),
            make_flow_(make_date_(2022, 1, 1), 1500.0, "D2", "F2"),
            make_flow_(make_date_(2021, 6, 1), 200.0, "D3", "F1"),
            make_flow_(make_date_(2022, 6, 1), 300.0, "D3", "F1"),
        ]
    }

    fn join_<'a>(
        flows: &'a [CashFlowRecord],
        metadata: &'a [EntityMetadata],
    ) -> Vec<JoinedRecord<'a>> {
        flows
            .iter()
            .map(|flow| {
                let entity = metadata
                    .iter()
                    .find(|item| item.deal == flow.deal_code)
                    .unwrap();
                JoinedRecord::new(flow, entity)
            })
            .collect()
    }

    #[test]
    fn group_by_industry() {
        let metadata = make_metadata_();
        let flows = make_flows_();
        let records = join_(&flows, &metadata);
        let schema = Schema::from_metadata(&metadata);

        let grouped = group_by(&records, &["Industry"], &schema).unwrap();
        assert_eq!(grouped.key_names(), &["Industry".to_string()]);
        assert_eq!(grouped.results.len(), 2);

        // sorted by key: Health before Tech
        let health = &grouped.results[0];
        assert_eq!(
            health.key.get("Industry"),
            Some(&KeyValue::Text("Health".to_string()))
        );
        assert!(health.irr.unwrap() > 0.0);

        let tech = &grouped.results[1];
        assert_eq!(tech.key.label(), "Tech");
        assert!(tech.irr.is_some());
        assert!(grouped.skipped.is_empty());
    }

    #[test]
    fn group_by_skips_unsolvable() {
        let metadata = make_metadata_();
        let flows = make_flows_();
        let records = join_(&flows, &metadata);
        let schema = Schema::from_metadata(&metadata);

        let grouped = group_by(&records, &["Region", "Fund"], &schema).unwrap();
        let labels = grouped
            .results
            .iter()
            .map(|result| result.key.label())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec![" | F1", "EU | F1", "US | F2"]);

        // D3 only has inflows and no region
        assert_eq!(grouped.results[0].irr, None);
        assert_eq!(grouped.skipped.len(), 1);
        assert_eq!(grouped.skipped[0].key, grouped.results[0].key);
        assert_eq!(grouped.skipped[0].reason, Unsolvable::NoSignChange);
        assert_eq!(
            grouped.skipped[0].key.get("Region"),
            Some(&KeyValue::Missing)
        );

        assert_float_absolute_eq!(grouped.results[1].irr.unwrap(), 9.97, 1e-9);
    }

    #[test]
    fn group_by_year() {
        let metadata = make_metadata_();
        let flows = make_flows_();
        let records = join_(&flows, &metadata);
        let schema = Schema::from_metadata(&metadata);

        let grouped = group_by(&records, &["Year"], &schema).unwrap();
        let keys = grouped
            .results
            .iter()
            .map(|result| result.key.get("Year").cloned().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                KeyValue::Year(2020),
                KeyValue::Year(2021),
                KeyValue::Year(2022)
            ]
        );
        // no calendar year holds both an outflow and an inflow
        assert_eq!(grouped.skipped.len(), 3);
        assert_eq!(grouped.average_irr(), None);
    }

    #[test]
    fn group_by_no_key() {
        let metadata = make_metadata_();
        let flows = make_flows_();
        let records = join_(&flows, &metadata);
        let schema = Schema::from_metadata(&metadata);

        let grouped = group_by::<&str>(&records, &[], &schema).unwrap();
        assert!(grouped.key_names().is_empty());
        assert_eq!(grouped.results.len(), 1);
        assert_eq!(grouped.results[0].key.label(), "All");
        assert!(grouped.results[0].irr.is_some());

        let grouped = group_by::<&str>(&[], &[], &schema).unwrap();
        assert!(grouped.results.is_empty());
        assert!(grouped.skipped.is_empty());
    }

    #[test]
    fn group_by_unknown_key() {
        let metadata = make_metadata_();
        let flows = make_flows_();
        let records = join_(&flows, &metadata);
        let schema = Schema::from_metadata(&metadata);

        let error = group_by(&records, &["Industry", "Liquidation Status"], &schema).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Grouping);
        assert!(error.message.contains("Liquidation Status"));
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let metadata = make_metadata_();
        let flows = make_flows_();
        let records = join_(&flows, &metadata);
        let schema = Schema::from_metadata(&metadata);

        for keys in [
            vec![],
            vec!["Industry"],
            vec!["Region", "Year"],
            vec!["Deal Code", "Fund", "Industry"],
        ] {
            let fields = resolve_fields(keys.as_slice(), &schema).unwrap();
            let partitions = partition(&records, &fields);

            let mut seen = partitions
                .values()
                .flat_map(|group| group.iter().map(|record| *record as *const JoinedRecord))
                .collect::<Vec<_>>();
            assert_eq!(seen.len(), records.len());
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), records.len());
            assert!(partitions.values().all(|group| !group.is_empty()));
        }
    }

    #[test]
    fn average_irr() {
        let key = GroupKey::new(vec![(
            "Industry".to_string(),
            KeyValue::Text("Tech".to_string()),
        )]);
        let grouped = GroupedIrrs {
            key_names: vec!["Industry".to_string()],
            results: vec![
                GroupResult {
                    key: key.clone(),
                    irr: Some(10.0),
                },
                GroupResult {
                    key: key.clone(),
                    irr: None,
                },
                GroupResult {
                    key: key.clone(),
                    irr: Some(-4.0),
                },
            ],
            skipped: vec![SkippedGroup {
                key,
                reason: Unsolvable::NoConvergence,
            }],
        };
        assert_float_absolute_eq!(grouped.average_irr().unwrap(), 3.0, 1e-9);
        assert_eq!(GroupedIrrs::default().average_irr(), None);
    }
}
