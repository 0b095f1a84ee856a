use serde_json::{Map as JsonMap, Value as JsonValue};

use super::MessageHandler;
use crate::data::types::RawMessage;

/// Fallback handler. Must stay registered last: it accepts every type and
/// passes the raw properties bag through untouched, guaranteeing total
/// dispatch for variants the registry has no dedicated handler for.
pub struct UnknownHandler;

impl MessageHandler for UnknownHandler {
    fn can_handle(&self, _message_type: &str) -> bool {
        true
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        let mut data = JsonMap::new();
        data.insert("properties".into(), message.properties.clone());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_any_type() {
        assert!(UnknownHandler.can_handle("anything"));
        assert!(UnknownHandler.can_handle(""));
    }

    #[test]
    fn passes_properties_through() {
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "Weird/Type".into(),
            edittime: None,
            properties: serde_json::json!({"foo": "bar"}),
            display_name: None,
        };
        let data = UnknownHandler.extract(&message).unwrap();
        assert_eq!(data["properties"]["foo"], JsonValue::String("bar".into()));
    }
}
