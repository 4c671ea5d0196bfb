use crate::alias::Date;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CashFlowRecord {
    #[serde(rename = "Date")]
    pub date: Date,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Deal Code", deserialize_with = "categorical")]
    pub deal_code: String,
    #[serde(rename = "Fund", deserialize_with = "categorical")]
    pub fund: String,
}

//
// identifiers are exported either as text or as plain numbers
fn categorical<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Ok(value),
        serde_json::Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::CashFlowRecord;
    use crate::alias::Date;

    #[test]
    fn deserialize() {
        let records: Vec<CashFlowRecord> = serde_json::from_str(
            r#"[
                {"Date": "2020-01-01", "Amount": -1000.5, "Deal Code": "D1", "Fund": "Fund I"},
                {"Date": "2021-03-15", "Amount": 250, "Deal Code": 42, "Fund": 2}
            ]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, Date::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(records[0].amount, -1000.5);
        assert_eq!(records[0].deal_code, "D1");
        assert_eq!(records[1].deal_code, "42");
        assert_eq!(records[1].fund, "2");
    }

    #[test]
    fn deserialize_invalid_deal_code() {
        let result: Result<Vec<CashFlowRecord>, _> = serde_json::from_str(
            r#"[{"Date": "2020-01-01", "Amount": 1.0, "Deal Code": null, "Fund": "F"}]"#,
        );
        assert!(result.is_err());
    }
}
