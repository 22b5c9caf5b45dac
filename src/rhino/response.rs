//! Uniform error payload returned by tools.
//!
//! Successful tools answer with plain text (or the host's JSON), so only
//! failures have a fixed shape.

use serde::Serialize;
use serde_json::Value;

/// A failed result: `{success: false, message, code?, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// What went wrong.
    pub message: String,
    /// Machine-readable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Extra context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Builds an error body.
#[must_use]
pub fn error(message: impl Into<String>, code: Option<&str>, data: Option<Value>) -> ErrorBody {
    ErrorBody {
        success: false,
        message: message.into(),
        code: code.map(str::to_string),
        data,
    }
}

/// Builds an error body whose message is the error's `Display` text.
#[must_use]
pub fn from_error(err: &dyn std::error::Error, code: Option<&str>) -> ErrorBody {
    error(err.to_string(), code, None)
}

impl ErrorBody {
    /// Serialises the body as compact JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A struct of strings and `Value`s always serialises.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"success":false,"message":{:?}}}"#, self.message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_omits_absent_fields() {
        let body = error("boom", None, None);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": false, "message": "boom"})
        );
    }

    #[test]
    fn error_with_code_and_data() {
        let body = error("boom", Some("DOC_INFO_ERROR"), Some(json!({"attempt": 1})));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": false,
                "message": "boom",
                "code": "DOC_INFO_ERROR",
                "data": {"attempt": 1}
            })
        );
    }

    #[test]
    fn from_error_uses_display_text() {
        let io = std::io::Error::other("socket gone");
        let body = from_error(&io, Some("X"));
        assert_eq!(body.message, "socket gone");
        assert!(body.to_json().contains(r#""code":"X""#));
    }
}
