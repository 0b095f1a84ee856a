use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_f64, prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct LocationHandler;

impl MessageHandler for LocationHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        matches!(message_type, "Location" | "RichText/Location")
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut location_data = JsonMap::new();
        location_data.insert(
            "latitude".into(),
            prop_f64(message, "latitude").and_then(serde_json::Number::from_f64).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        );
        location_data.insert(
            "longitude".into(),
            prop_f64(message, "longitude").and_then(serde_json::Number::from_f64).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        );
        location_data.insert("address".into(), prop_str(message, "address").map(JsonValue::String).unwrap_or(JsonValue::Null));
        location_data.insert("name".into(), prop_str(message, "name").map(JsonValue::String).unwrap_or(JsonValue::Null));

        let mut data = JsonMap::new();
        data.insert("location_data".into(), JsonValue::Object(location_data));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_coordinates() {
        let props = serde_json::json!({"latitude": 1.5, "longitude": -2.25, "name": "Office"});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "Location".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = LocationHandler.extract(&message).unwrap();
        assert_eq!(data["location_data"]["latitude"], serde_json::json!(1.5));
        assert_eq!(data["location_data"]["name"], JsonValue::String("Office".into()));
    }
}
