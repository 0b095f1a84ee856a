use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct MediaCardHandler;

impl MessageHandler for MediaCardHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "RichText/Media_Card"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut data = JsonMap::new();
        data.insert("card_title".into(), prop_str(message, "title").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("card_description".into(), prop_str(message, "description").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("card_url".into(), prop_str(message, "url").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("card_thumbnail_url".into(), prop_str(message, "thumbnail_url").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("card_provider".into(), prop_str(message, "provider").map(JsonValue::String).unwrap_or(JsonValue::Null));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_card_fields() {
        let props = serde_json::json!({"title": "Article", "provider": "news.example"});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "RichText/Media_Card".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = MediaCardHandler.extract(&message).unwrap();
        assert_eq!(data["card_title"], JsonValue::String("Article".into()));
        assert_eq!(data["card_provider"], JsonValue::String("news.example".into()));
    }
}
