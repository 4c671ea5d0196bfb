use crate::cashflow::{CashFlowRecord, EntityMetadata};
use crate::error::Error;

use serde_json::Value;
use std::io::Read;

pub const DEAL_FIELD: &str = "Deal";

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::new_referential(format!("not json format : {error}"))
    }
}

pub fn read_cash_flows<R: Read>(reader: R) -> Result<Vec<CashFlowRecord>, Error> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_metadata<R: Read>(reader: R) -> Result<Vec<EntityMetadata>, Error> {
    let value: Value = serde_json::from_reader(reader)?;
    value
        .as_array()
        .ok_or_else(|| Error::new_referential("metadata must be an array"))?
        .iter()
        .map(read_entity)
        .collect()
}

fn read_entity(value: &Value) -> Result<EntityMetadata, Error> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::new_referential("metadata entry must be an object"))?;

    let deal = object
        .get(DEAL_FIELD)
        .map(|value| read_categorical(DEAL_FIELD, value))
        .transpose()?
        .flatten()
        .ok_or_else(|| Error::new_referential(format!("field {DEAL_FIELD} is mandatory")))?;

    let mut metadata = EntityMetadata::new(deal);
    for (name, value) in object.iter().filter(|(name, _)| *name != DEAL_FIELD) {
        let value = read_categorical(name, value)?;
        metadata.attributes.insert(name.clone(), value);
    }
    Ok(metadata)
}

fn read_categorical(name: &str, value: &Value) -> Result<Option<String>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value.clone())),
        Value::Number(value) => Ok(Some(value.to_string())),
        Value::Bool(value) => Ok(Some(value.to_string())),
        _ => Err(Error::new_referential(format!(
            "field {name} must be a string, a number or a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    #[test]
    fn read_metadata() {
        let metadata = super::read_metadata(
            r#"[
                {"Deal": "D1", "Industry": "Tech", "Region": null, "Vintage": 2019},
                {"Deal": 7, "Industry": "Health", "Listed": true}
            ]"#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].deal, "D1");
        assert_eq!(metadata[0].attribute("Industry"), Some("Tech"));
        assert_eq!(metadata[0].attribute("Region"), None);
        assert!(metadata[0].attributes.contains_key("Region"));
        assert_eq!(metadata[0].attribute("Vintage"), Some("2019"));
        assert_eq!(metadata[1].deal, "7");
        assert_eq!(metadata[1].attribute("Listed"), Some("true"));
        assert!(!metadata[1].attributes.contains_key("Deal"));
    }

    #[test]
    fn read_metadata_errors() {
        for input in [
            r#"{"Deal": "D1"}"#,
            r#"[{"Industry": "Tech"}]"#,
            r#"[{"Deal": null}]"#,
            r#"[{"Deal": "D1", "Industry": ["Tech"]}]"#,
            r#"[1]"#,
            "not json",
        ] {
            let error = super::read_metadata(input.as_bytes()).unwrap_err();
            assert_eq!(error.kind, ErrorKind::Referential, "{input}");
        }
    }

    #[test]
    fn read_cash_flows() {
        let flows = super::read_cash_flows(
            r#"[{"Date": "2020-01-01", "Amount": -10, "Deal Code": "D1", "Fund": "F"}]"#
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].amount, -10.0);

        let error = super::read_cash_flows(r#"[{"Date": "2020-13-01"}]"#.as_bytes()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Referential);
    }
}
