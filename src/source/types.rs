//! Wire types returned by the message listing endpoint.

use serde::{Deserialize, Serialize};

/// One message as listed by the source.
///
/// Only `kind`, `conversation_id` and `timestamp` are inspected by the
/// filter. Everything else is carried through to the processor untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Direction as reported by the source (e.g. "outgoing").
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub direction: String,
    /// Source-assigned identifier.
    #[serde(rename = "idMessage")]
    pub message_id: String,
    /// Unix epoch seconds. Not unique, not ordered across a batch.
    pub timestamp: i64,
    /// Message category: "imageMessage", "textMessage", ...
    #[serde(rename = "typeMessage")]
    pub kind: String,
    /// Conversation the message belongs to.
    #[serde(rename = "chatId")]
    pub conversation_id: String,

    // ── Payload ─────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text_message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_animated: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_forwarded: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_message: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MessageRecord {
    /// Minimal record with empty payload.
    pub fn new(
        message_id: impl Into<String>,
        conversation_id: impl Into<String>,
        kind: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            direction: String::new(),
            message_id: message_id.into(),
            timestamp,
            kind: kind.into(),
            conversation_id: conversation_id.into(),
            download_url: String::new(),
            caption: String::new(),
            text_message: String::new(),
            file_name: String::new(),
            mime_type: String::new(),
            is_animated: false,
            is_forwarded: false,
            status_message: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_image_message() {
        let json = r#"[{
            "type": "outgoing",
            "idMessage": "BAE5F4886F6F2D05",
            "timestamp": 1700000123,
            "typeMessage": "imageMessage",
            "chatId": "15550001111@c.us",
            "downloadUrl": "https://files.example.com/BAE5F4886F6F2D05.jpg",
            "caption": "receipt",
            "fileName": "BAE5F4886F6F2D05.jpg",
            "mimeType": "image/jpeg",
            "isForwarded": true,
            "statusMessage": "read",
            "sendByApi": false
        }]"#;

        let records: Vec<MessageRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.direction, "outgoing");
        assert_eq!(record.message_id, "BAE5F4886F6F2D05");
        assert_eq!(record.timestamp, 1700000123);
        assert_eq!(record.kind, "imageMessage");
        assert_eq!(record.conversation_id, "15550001111@c.us");
        assert_eq!(record.mime_type, "image/jpeg");
        assert!(record.is_forwarded);
        assert!(!record.is_animated);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "idMessage": "m1",
            "timestamp": 1,
            "typeMessage": "textMessage",
            "chatId": "c1"
        }"#;

        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, MessageRecord::new("m1", "c1", "textMessage", 1));
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let json = r#"{"idMessage": "m1", "typeMessage": "textMessage", "chatId": "c1"}"#;
        assert!(serde_json::from_str::<MessageRecord>(json).is_err());
    }

    #[test]
    fn empty_payload_omitted_when_serialized() {
        let record = MessageRecord::new("m1", "c1", "imageMessage", 42);
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj["idMessage"], "m1");
        assert_eq!(obj["chatId"], "c1");
        assert_eq!(obj["typeMessage"], "imageMessage");
        assert!(!obj.contains_key("caption"));
        assert!(!obj.contains_key("isAnimated"));
        assert!(!obj.contains_key("type"));
    }
}
