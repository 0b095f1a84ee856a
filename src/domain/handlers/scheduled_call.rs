use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_i64, prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct ScheduledCallHandler;

impl MessageHandler for ScheduledCallHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "RichText/ScheduledCallInvite"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let participants: Vec<JsonValue> = message
            .properties
            .get("participants")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut scheduled_call = JsonMap::new();
        scheduled_call.insert("title".into(), prop_str(message, "title").map(JsonValue::String).unwrap_or(JsonValue::Null));
        scheduled_call.insert("start_time".into(), prop_str(message, "start_time").map(JsonValue::String).unwrap_or(JsonValue::Null));
        scheduled_call.insert("end_time".into(), prop_str(message, "end_time").map(JsonValue::String).unwrap_or(JsonValue::Null));
        scheduled_call.insert(
            "duration_minutes".into(),
            prop_i64(message, "duration_minutes").map(|v| v.into()).unwrap_or(JsonValue::Null),
        );
        scheduled_call.insert("organizer".into(), prop_str(message, "organizer").map(JsonValue::String).unwrap_or(JsonValue::Null));
        scheduled_call.insert("participants".into(), JsonValue::Array(participants));
        scheduled_call.insert("description".into(), prop_str(message, "description").map(JsonValue::String).unwrap_or(JsonValue::Null));
        scheduled_call.insert("meeting_link".into(), prop_str(message, "meeting_link").map(JsonValue::String).unwrap_or(JsonValue::Null));
        scheduled_call.insert("call_id".into(), prop_str(message, "call_id").map(JsonValue::String).unwrap_or(JsonValue::Null));

        let mut data = JsonMap::new();
        data.insert("scheduled_call".into(), JsonValue::Object(scheduled_call));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_schedule_fields() {
        let props = serde_json::json!({"title": "Standup", "duration_minutes": 30});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "RichText/ScheduledCallInvite".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = ScheduledCallHandler.extract(&message).unwrap();
        assert_eq!(data["scheduled_call"]["title"], JsonValue::String("Standup".into()));
        assert_eq!(data["scheduled_call"]["duration_minutes"], JsonValue::Number(30.into()));
    }
}
