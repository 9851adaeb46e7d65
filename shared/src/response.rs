//! Autoscaling response envelope
//!
//! The console endpoints answer with a JSON object; success is signaled by
//! a truthy `results` field. Anything else counts as an application-level
//! failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body of an autoscaling console action
///
/// ```json
/// { "results": true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingResponse {
    /// Action result; truthy on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
}

impl AutoscalingResponse {
    /// Successful response with `results: true`
    pub fn ok() -> Self {
        Self {
            results: Some(Value::Bool(true)),
        }
    }

    /// Read the envelope from any decoded body
    ///
    /// Non-object bodies have no `results` and therefore never succeed.
    pub fn from_value(body: &Value) -> Self {
        Self {
            results: body.get("results").cloned(),
        }
    }

    /// Whether the remote side reported success
    pub fn is_success(&self) -> bool {
        self.results.as_ref().is_some_and(is_truthy)
    }
}

/// JavaScript truthiness of a JSON value
///
/// `null`, `false`, `0`, `NaN` and `""` are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-0.5)));
        assert!(is_truthy(&json!("ok")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));

        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
    }

    #[test]
    fn test_success_detection() {
        assert!(AutoscalingResponse::from_value(&json!({ "results": true })).is_success());
        assert!(AutoscalingResponse::from_value(&json!({ "results": [{"name": "lc"}] })).is_success());
        assert!(AutoscalingResponse::ok().is_success());

        assert!(!AutoscalingResponse::from_value(&json!({ "results": false })).is_success());
        assert!(!AutoscalingResponse::from_value(&json!({ "message": "denied" })).is_success());
        assert!(!AutoscalingResponse::from_value(&json!([true])).is_success());
        assert!(!AutoscalingResponse::from_value(&json!("results")).is_success());
    }

    #[test]
    fn test_deserialize_missing_results() {
        let resp: AutoscalingResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.results, None);
        assert!(!resp.is_success());
    }
}
