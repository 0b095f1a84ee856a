use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_array, prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct ThreadActivityHandler;

impl MessageHandler for ThreadActivityHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type.starts_with("ThreadActivity/")
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut data = JsonMap::new();
        data.insert(
            "activity_type".into(),
            JsonValue::String(message.messagetype.strip_prefix("ThreadActivity/").unwrap_or(&message.messagetype).to_string()),
        );

        let members: Vec<JsonValue> = prop_array(message, "members")
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|m| match m {
                JsonValue::String(s) => {
                    let mut entry = JsonMap::new();
                    entry.insert("id".into(), JsonValue::String(s));
                    entry.insert("name".into(), JsonValue::Null);
                    JsonValue::Object(entry)
                }
                other => other,
            })
            .collect();
        data.insert("activity_members".into(), JsonValue::Array(members));
        data.insert("activity_value".into(), prop_str(message, "value").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("activity_initiator".into(), JsonValue::String(message.from.clone()));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_collects_members() {
        let props = serde_json::json!({"members": ["u2", "u3"], "value": "Team Chat"});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "ThreadActivity/AddMember".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = ThreadActivityHandler.extract(&message).unwrap();
        assert_eq!(data["activity_type"], JsonValue::String("AddMember".into()));
        assert_eq!(data["activity_members"].as_array().unwrap().len(), 2);
        assert_eq!(data["activity_initiator"], JsonValue::String("u1".into()));
    }
}
