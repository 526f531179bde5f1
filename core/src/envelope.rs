//! The `{success, result, errors, messages, result_info}` wrapper shared by
//! every CIS response.

use serde::{Deserialize, Serialize};

/// Response envelope around an operation's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<Vec<String>>,
    #[serde(default)]
    pub messages: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_info: Option<ResultInfo>,
}

/// Pagination details attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursors: Option<Cursors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_range: Option<ScannedRange>,
}

impl ResultInfo {
    /// Cursor of the following page, if the server reported one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.cursors
            .as_ref()
            .and_then(|c| c.after.as_deref())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

/// Envelope fields that remain meaningful on error responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<Vec<String>>,
    #[serde(default)]
    pub messages: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_result_is_none() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success":true,"result":null,"errors":[],"messages":[]}"#)
                .unwrap();
        assert!(env.success);
        assert!(env.result.is_none());
        assert!(env.result_info.is_none());
    }

    #[test]
    fn missing_success_is_rejected() {
        let parsed: Result<Envelope<serde_json::Value>, _> =
            serde_json::from_str(r#"{"result":{}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn errors_are_lists_of_strings() {
        let env: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"success":false,"errors":[["1003","Invalid zone"],["extra"]],"messages":[["hint"]]}"#,
        )
        .unwrap();
        assert_eq!(env.errors.len(), 2);
        assert_eq!(env.errors[0], vec!["1003", "Invalid zone"]);
        assert_eq!(env.messages, vec![vec!["hint".to_string()]]);
    }

    #[test]
    fn next_cursor_ignores_empty_cursor() {
        let info: ResultInfo =
            serde_json::from_str(r#"{"cursors":{"after":"","before":"b1"}}"#).unwrap();
        assert_eq!(info.next_cursor(), None);

        let info: ResultInfo = serde_json::from_str(
            r#"{"cursors":{"after":"a2"},"scanned_range":{"since":"s","until":"u"}}"#,
        )
        .unwrap();
        assert_eq!(info.next_cursor(), Some("a2"));
        assert_eq!(info.scanned_range.unwrap().until.as_deref(), Some("u"));
    }
}
