use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct PopCardHandler;

impl MessageHandler for PopCardHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "PopCard"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut data = JsonMap::new();
        data.insert("popcard_title".into(), prop_str(message, "title").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("popcard_type".into(), prop_str(message, "type").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("popcard_action".into(), prop_str(message, "action").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("popcard_content".into(), prop_str(message, "content").map(JsonValue::String).unwrap_or(JsonValue::Null));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_popcard_fields() {
        let props = serde_json::json!({"title": "Reminder", "type": "info"});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "PopCard".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = PopCardHandler.extract(&message).unwrap();
        assert_eq!(data["popcard_title"], JsonValue::String("Reminder".into()));
        assert_eq!(data["popcard_type"], JsonValue::String("info".into()));
    }
}
