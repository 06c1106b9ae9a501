use serde_json::Value;
use solana_sdk::transaction::TransactionError;
use std::{fmt, sync::Arc};

/// A value that is not one of the known error shapes.
pub trait OpaqueError: fmt::Debug + Send + Sync {
    /// Structured serialization of the value.
    ///
    /// `None` when the value is not object-like and should be rendered with
    /// [`OpaqueError::describe`] instead.
    fn to_json(&self) -> Option<serde_json::Result<String>>;

    /// Default string form
    fn describe(&self) -> String;
}

impl OpaqueError for Value {
    fn to_json(&self) -> Option<serde_json::Result<String>> {
        match self {
            Value::Object(_) | Value::Array(_) => Some(serde_json::to_string(self)),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Error value reported by the sign-and-confirm primitive
#[derive(Debug, Clone)]
pub enum ErrorValue {
    Structured {
        error: Option<String>,
        message: Option<String>,
    },
    Opaque(Arc<dyn OpaqueError>),
}

impl ErrorValue {
    pub fn error(error: impl Into<String>) -> Self {
        Self::Structured {
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Structured {
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn opaque(value: impl OpaqueError + 'static) -> Self {
        Self::Opaque(Arc::new(value))
    }

    /// Classify an untyped JSON error payload.
    ///
    /// Objects carrying a truthy `error` or `message` are structured,
    /// everything else stays opaque. Non-string fields keep their JSON form.
    pub fn classify(value: Value) -> Self {
        if let Value::Object(map) = &value {
            let field = |key: &str| map.get(key).filter(|v| is_truthy(v)).map(field_text);
            let error = field("error");
            let message = field("message");
            if error.is_some() || message.is_some() {
                return Self::Structured { error, message };
            }
        }
        Self::Opaque(Arc::new(value))
    }
}

/// `null`, `false`, `0` and `""` do not count as a present field
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<&str> for ErrorValue {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<String> for ErrorValue {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

impl From<Value> for ErrorValue {
    fn from(value: Value) -> Self {
        Self::classify(value)
    }
}

impl From<TransactionError> for ErrorValue {
    fn from(err: TransactionError) -> Self {
        Self::message(err.to_string())
    }
}

impl From<solana_client::client_error::ClientError> for ErrorValue {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::message(err.to_string())
    }
}

/// Map an error value to the message shown in the error panel.
///
/// Prefers `error`, then `message`, then a JSON rendering of object-like
/// values, then the default string form. A failed serialization yields `None`.
pub fn error_message(value: &ErrorValue) -> Option<String> {
    match value {
        ErrorValue::Structured { error, message } => error
            .iter()
            .chain(message.iter())
            .find(|s| !s.is_empty())
            .cloned(),
        ErrorValue::Opaque(value) => match value.to_json() {
            Some(serialized) => serialized.ok(),
            None => Some(value.describe()),
        },
    }
}

pub(crate) fn display_message(value: &ErrorValue) -> String {
    error_message(value).unwrap_or_else(|| "unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serialize, Serializer};
    use serde_json::json;

    /// Stands in for a self-referencing object that cannot be serialized
    #[derive(Debug)]
    struct Cyclic;

    impl Serialize for Cyclic {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic structure"))
        }
    }

    impl OpaqueError for Cyclic {
        fn to_json(&self) -> Option<serde_json::Result<String>> {
            Some(serde_json::to_string(self))
        }

        fn describe(&self) -> String {
            "[object Object]".to_string()
        }
    }

    #[test]
    fn test_error_field_wins() {
        let value = ErrorValue::classify(json!({ "error": "x", "message": "y" }));
        assert_eq!(error_message(&value).as_deref(), Some("x"));
    }

    #[test]
    fn test_message_field() {
        let value = ErrorValue::classify(json!({ "message": "y" }));
        assert_eq!(error_message(&value).as_deref(), Some("y"));
    }

    #[test]
    fn test_empty_error_falls_through_to_message() {
        let value = ErrorValue::classify(json!({ "error": "", "message": "y" }));
        assert_eq!(error_message(&value).as_deref(), Some("y"));
    }

    #[test]
    fn test_object_error_field_wins_over_payload() {
        let value = ErrorValue::classify(json!({
            "error": { "InstructionError": [0, { "Custom": 1 }] },
            "txid": "abc",
        }));
        assert!(matches!(value, ErrorValue::Structured { .. }));
        assert_eq!(
            error_message(&value).as_deref(),
            Some(r#"{"InstructionError":[0,{"Custom":1}]}"#)
        );
    }

    #[test]
    fn test_numeric_error_field() {
        let value = ErrorValue::classify(json!({ "error": 6001 }));
        assert_eq!(error_message(&value).as_deref(), Some("6001"));
    }

    #[test]
    fn test_falsy_fields_fall_through() {
        let value = ErrorValue::classify(json!({ "error": null, "message": false, "code": 0 }));
        assert!(matches!(value, ErrorValue::Opaque(_)));

        let value = ErrorValue::classify(json!({ "error": 0, "message": "y" }));
        assert_eq!(error_message(&value).as_deref(), Some("y"));
    }

    #[test]
    fn test_plain_object_is_serialized() {
        let value = ErrorValue::classify(json!({ "code": 7 }));
        assert!(matches!(value, ErrorValue::Opaque(_)));
        assert_eq!(error_message(&value).as_deref(), Some(r#"{"code":7}"#));
    }

    #[test]
    fn test_unserializable_object_yields_none() {
        let value = ErrorValue::opaque(Cyclic);
        assert_eq!(error_message(&value), None);
    }

    #[test]
    fn test_primitives_use_string_form() {
        assert_eq!(
            error_message(&ErrorValue::classify(json!(42))).as_deref(),
            Some("42")
        );
        assert_eq!(
            error_message(&ErrorValue::classify(json!("boom"))).as_deref(),
            Some("boom")
        );
        assert_eq!(
            error_message(&ErrorValue::classify(Value::Null)).as_deref(),
            Some("null")
        );
    }

    #[test]
    fn test_transaction_error_conversion() {
        let value = ErrorValue::from(TransactionError::BlockhashNotFound);
        assert_eq!(
            error_message(&value),
            Some(TransactionError::BlockhashNotFound.to_string())
        );
    }
}
