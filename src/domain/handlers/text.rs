use serde_json::{Map as JsonMap, Value as JsonValue};

use super::MessageHandler;
use crate::data::types::RawMessage;

/// Plain chat text. Matches the default rich-text variants once no more
/// specific handler has claimed the message.
pub struct TextHandler;

const EMOTICON_MARKERS: &[&str] = &["<ss ", "(emoticon)"];

impl MessageHandler for TextHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        matches!(message_type, "RichText" | "RichText/HTML" | "Text")
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        let mut data = JsonMap::new();
        data.insert("has_mentions".into(), JsonValue::Bool(message.content.contains("<at ")));
        data.insert(
            "has_emotions".into(),
            JsonValue::Bool(EMOTICON_MARKERS.iter().any(|m| message.content.contains(m))),
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> RawMessage {
        RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: content.into(),
            messagetype: "RichText".into(),
            edittime: None,
            properties: JsonValue::Null,
            display_name: None,
        }
    }

    #[test]
    fn detects_mention() {
        let data = TextHandler.extract(&message(r#"<at id="u2">Bob</at> hi"#)).unwrap();
        assert_eq!(data["has_mentions"], JsonValue::Bool(true));
    }

    #[test]
    fn no_mention_no_emoticon() {
        let data = TextHandler.extract(&message("just text")).unwrap();
        assert_eq!(data["has_mentions"], JsonValue::Bool(false));
        assert_eq!(data["has_emotions"], JsonValue::Bool(false));
    }
}
