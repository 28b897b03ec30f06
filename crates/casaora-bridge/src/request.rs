//! Inbound chat turn extraction and validation.
//!
//! The chat client posts either a flat `message` or the whole `messages`
//! history (role + content, or role + parts). Payloads are read as loose JSON
//! so that a mistyped optional field never rejects an otherwise usable turn.

use serde_json::Value;

use crate::error::ApiError;

/// Optional flags controlling mutating tool actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteFlags {
    pub allow_mutations: Option<bool>,
    pub confirm_write: Option<bool>,
}

/// One validated chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub conversation_id: String,
    pub org_scope: String,
    pub user_message: String,
    pub write_flags: WriteFlags,
}

impl TurnRequest {
    /// Build a turn from the route parameter, the `org_id` query parameter and
    /// the raw request body.
    pub fn from_parts(
        conversation_id: &str,
        query_org: Option<&str>,
        body: &[u8],
    ) -> Result<Self, ApiError> {
        let payload: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;

        let conversation_id = conversation_id.trim();
        let org_scope = resolve_org_scope(query_org, &payload);
        let user_message = extract_user_message(&payload);

        if conversation_id.is_empty() || org_scope.is_empty() || user_message.is_empty() {
            return Err(ApiError::MissingFields);
        }

        Ok(Self {
            conversation_id: conversation_id.to_string(),
            org_scope,
            user_message,
            write_flags: resolve_write_flags(&payload),
        })
    }
}

/// Organization scope: the query parameter when present, else the body field.
pub fn resolve_org_scope(query_org: Option<&str>, payload: &Value) -> String {
    query_org
        .map(str::trim)
        .or_else(|| {
            payload
                .get("org_id")
                .and_then(Value::as_str)
                .map(str::trim)
        })
        .unwrap_or("")
        .to_string()
}

/// Text of the latest user turn, or an empty string if there is none.
pub fn extract_user_message(payload: &Value) -> String {
    if let Some(message) = non_blank(payload.get("message")) {
        return message.to_string();
    }

    let Some(messages) = payload.get("messages").and_then(Value::as_array) else {
        return String::new();
    };

    messages
        .iter()
        .rev()
        .filter(|row| row.get("role").and_then(Value::as_str) == Some("user"))
        .find_map(user_row_text)
        .unwrap_or_default()
}

fn user_row_text(row: &Value) -> Option<String> {
    if let Some(content) = non_blank(row.get("content")) {
        return Some(content.to_string());
    }

    let text = row
        .get("parts")?
        .as_array()?
        .iter()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Write flags, copied only when sent as JSON booleans.
pub fn resolve_write_flags(payload: &Value) -> WriteFlags {
    WriteFlags {
        allow_mutations: payload.get("allow_mutations").and_then(Value::as_bool),
        confirm_write: payload.get("confirm_write").and_then(Value::as_bool),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_message_wins_and_is_trimmed() {
        let payload = json!({
            "message": "  hello  ",
            "messages": [{"role":"user","content":"ignored"}]
        });
        assert_eq!(extract_user_message(&payload), "hello");
    }

    #[test]
    fn latest_user_message_is_used() {
        let payload = json!({
            "messages": [
                {"role":"user","content":"first"},
                {"role":"assistant","content":"reply"},
                {"role":"user","content":" second "},
                {"role":"assistant","content":"later reply"}
            ]
        });
        assert_eq!(extract_user_message(&payload), "second");
    }

    #[test]
    fn parts_are_joined_by_newline() {
        let payload = json!({
            "messages": [{
                "role": "user",
                "parts": [
                    {"type":"text","text":" line one "},
                    {"type":"file","url":"https://example.com/a.png"},
                    {"type":"text","text":"   "},
                    {"type":"text","text":"line two"}
                ]
            }]
        });
        assert_eq!(extract_user_message(&payload), "line one\nline two");
    }

    #[test]
    fn blank_user_rows_fall_back_to_earlier_ones() {
        let payload = json!({
            "message": "   ",
            "messages": [
                {"role":"user","content":"earlier"},
                {"role":"user","content":"  ","parts":[{"type":"text","text":""}]}
            ]
        });
        assert_eq!(extract_user_message(&payload), "earlier");
    }

    #[test]
    fn no_user_text_yields_empty() {
        assert_eq!(extract_user_message(&json!({})), "");
        assert_eq!(extract_user_message(&json!({"messages": "nope"})), "");
        assert_eq!(extract_user_message(&json!({"message": 42})), "");
    }

    #[test]
    fn query_org_takes_precedence_over_body() {
        let payload = json!({"org_id": " body-org "});
        assert_eq!(resolve_org_scope(Some(" q-org "), &payload), "q-org");
        assert_eq!(resolve_org_scope(Some("  "), &payload), "");
        assert_eq!(resolve_org_scope(None, &payload), "body-org");
        assert_eq!(resolve_org_scope(None, &json!({"org_id": 7})), "");
    }

    #[test]
    fn blank_query_org_does_not_fall_back_to_body() {
        let body = br#"{"message":"hi","org_id":"body-org"}"#;
        let err = TurnRequest::from_parts("c1", Some(""), body).unwrap_err();
        assert!(matches!(err, ApiError::MissingFields));
    }

    #[test]
    fn write_flags_require_booleans() {
        let flags = resolve_write_flags(&json!({"allow_mutations": true, "confirm_write": "yes"}));
        assert_eq!(
            flags,
            WriteFlags {
                allow_mutations: Some(true),
                confirm_write: None
            }
        );
    }

    #[test]
    fn from_parts_builds_turn() {
        let body = br#"{"message":"hi","confirm_write":false}"#;
        let turn = TurnRequest::from_parts(" c1 ", Some("org1"), body).unwrap();
        assert_eq!(turn.conversation_id, "c1");
        assert_eq!(turn.org_scope, "org1");
        assert_eq!(turn.user_message, "hi");
        assert_eq!(turn.write_flags.confirm_write, Some(false));
    }

    #[test]
    fn from_parts_rejects_invalid_json() {
        let err = TurnRequest::from_parts("c1", Some("org1"), b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson));
    }

    #[test]
    fn from_parts_requires_all_fields() {
        for (chat, org, body) in [
            ("", Some("org1"), r#"{"message":"hi"}"#),
            ("c1", None, r#"{"message":"hi"}"#),
            ("c1", Some("org1"), r#"{"message":"  "}"#),
        ] {
            let err = TurnRequest::from_parts(chat, org, body.as_bytes()).unwrap_err();
            assert!(matches!(err, ApiError::MissingFields), "case: {chat:?} {org:?} {body}");
        }
    }
}
