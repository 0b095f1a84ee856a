use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct TranslationHandler;

impl MessageHandler for TranslationHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "Translation"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut data = JsonMap::new();
        data.insert("translation_from_language".into(), prop_str(message, "from_language").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("translation_to_language".into(), prop_str(message, "to_language").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("translation_text".into(), prop_str(message, "text").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("translation_original_text".into(), prop_str(message, "original_text").map(JsonValue::String).unwrap_or(JsonValue::Null));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_translation_fields() {
        let props = serde_json::json!({"from_language": "es", "to_language": "en", "text": "hello", "original_text": "hola"});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "Translation".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = TranslationHandler.extract(&message).unwrap();
        assert_eq!(data["translation_from_language"], JsonValue::String("es".into()));
        assert_eq!(data["translation_original_text"], JsonValue::String("hola".into()));
    }
}
