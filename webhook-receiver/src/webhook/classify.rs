//! Discriminator peek.
//!
//! Looks only at `data_type`. The rest of the body may be any JSON; schema
//! problems there surface later, during decoding.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::PayloadError;
use super::types::DataType;

/// Classify a (verified) raw body by its `data_type` field.
///
/// A missing or null `data_type` (and a `null` body) is `Unknown`. Invalid
/// JSON, a body that is neither an object nor `null`, and a `data_type` that
/// is not a string fail with [`PayloadError::MalformedJson`].
pub fn classify(body: &[u8]) -> Result<DataType, PayloadError> {
    let value: Value = serde_json::from_slice(body).map_err(PayloadError::MalformedJson)?;
    if value.is_null() {
        return Ok(DataType::Unknown(String::new()));
    }

    let object = Map::<String, Value>::deserialize(value).map_err(PayloadError::MalformedJson)?;

    let data_type = match object.get("data_type") {
        Some(raw) => Option::<String>::deserialize(raw).map_err(PayloadError::MalformedJson)?,
        None => None,
    };

    Ok(match data_type {
        Some(raw) => DataType::from(raw.as_str()),
        None => DataType::Unknown(String::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_consumption() {
        let body = br#"{"data_type":"consumption","group_by":"hour"}"#;
        assert_eq!(classify(body).unwrap(), DataType::Consumption);
    }

    #[test]
    fn test_classify_bills() {
        let body = br#"{"data_type":"bills","trigger_type":"paid"}"#;
        assert_eq!(classify(body).unwrap(), DataType::Bills);
    }

    #[test]
    fn test_classify_unknown_value() {
        assert_eq!(
            classify(br#"{"data_type":"xyz"}"#).unwrap(),
            DataType::Unknown("xyz".to_string())
        );
    }

    #[test]
    fn test_classify_missing_data_type() {
        assert_eq!(
            classify(br#"{"webhook_id": 1}"#).unwrap(),
            DataType::Unknown(String::new())
        );
    }

    #[test]
    fn test_classify_tolerates_mismatched_remainder() {
        // webhook_id should be a number, but only data_type matters here
        let body = br#"{"data_type":"bills","webhook_id":"not-a-number","bill":[]}"#;
        assert_eq!(classify(body).unwrap(), DataType::Bills);
    }

    #[test]
    fn test_classify_non_string_data_type() {
        for body in [
            br#"{"data_type": 7}"#.as_slice(),
            br#"{"data_type": ["bills"]}"#.as_slice(),
            br#"{"data_type": {"kind": "bills"}}"#.as_slice(),
        ] {
            assert!(matches!(classify(body), Err(PayloadError::MalformedJson(_))));
        }
    }

    #[test]
    fn test_classify_null_data_type() {
        assert_eq!(
            classify(br#"{"data_type": null}"#).unwrap(),
            DataType::Unknown(String::new())
        );
    }

    #[test]
    fn test_classify_null_body() {
        assert_eq!(classify(b"null").unwrap(), DataType::Unknown(String::new()));
        assert_eq!(classify(b" null\n").unwrap(), DataType::Unknown(String::new()));
    }

    #[test]
    fn test_classify_malformed_json() {
        assert!(matches!(
            classify(br#"{"data_type":"consumption""#),
            Err(PayloadError::MalformedJson(_))
        ));
        assert!(matches!(classify(b""), Err(PayloadError::MalformedJson(_))));
    }

    #[test]
    fn test_classify_rejects_non_object() {
        assert!(matches!(
            classify(br#"["consumption"]"#),
            Err(PayloadError::MalformedJson(_))
        ));
    }
}
