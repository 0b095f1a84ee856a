use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct CallHandler;

impl MessageHandler for CallHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "Event/Call"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let participants: Vec<JsonValue> = message
            .properties
            .get("participants")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|p| {
                let mut entry = JsonMap::new();
                entry.insert("id".into(), p.get("id").cloned().unwrap_or(JsonValue::Null));
                entry.insert("name".into(), p.get("name").cloned().unwrap_or(JsonValue::Null));
                JsonValue::Object(entry)
            })
            .collect();

        let mut call_data = JsonMap::new();
        call_data.insert("duration".into(), message.properties.get("duration").cloned().unwrap_or(JsonValue::Null));
        call_data.insert("start_time".into(), prop_str(message, "start_time").map(JsonValue::String).unwrap_or(JsonValue::Null));
        call_data.insert("end_time".into(), prop_str(message, "end_time").map(JsonValue::String).unwrap_or(JsonValue::Null));
        call_data.insert("call_type".into(), prop_str(message, "call_type").map(JsonValue::String).unwrap_or(JsonValue::Null));
        call_data.insert("participants".into(), JsonValue::Array(participants));

        let mut data = JsonMap::new();
        data.insert("call_data".into(), JsonValue::Object(call_data));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_participants() {
        let props = serde_json::json!({
            "duration": 120,
            "call_type": "video",
            "participants": [{"id": "u1", "name": "Alice"}],
        });
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "Event/Call".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = CallHandler.extract(&message).unwrap();
        let call_data = &data["call_data"];
        assert_eq!(call_data["duration"], JsonValue::Number(120.into()));
        assert_eq!(call_data["participants"].as_array().unwrap().len(), 1);
    }
}
