use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_array, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct ContactsHandler;

impl MessageHandler for ContactsHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "RichText/Contacts"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let contacts: Vec<JsonValue> = prop_array(message, "contacts")
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|c| {
                let mut entry = JsonMap::new();
                entry.insert("name".into(), c.get("name").cloned().unwrap_or(JsonValue::Null));
                entry.insert("phone".into(), c.get("phone").cloned().unwrap_or(JsonValue::Null));
                entry.insert("email".into(), c.get("email").cloned().unwrap_or(JsonValue::Null));
                entry.insert("mri".into(), c.get("mri").cloned().unwrap_or(JsonValue::Null));
                JsonValue::Object(entry)
            })
            .collect();

        let mut data = JsonMap::new();
        data.insert("contacts".into(), JsonValue::Array(contacts));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_contact_list() {
        let props = serde_json::json!({"contacts": [{"name": "Bob", "phone": "555"}]});
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "RichText/Contacts".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = ContactsHandler.extract(&message).unwrap();
        let contacts = data["contacts"].as_array().unwrap();
        assert_eq!(contacts[0]["name"], JsonValue::String("Bob".into()));
    }

    #[test]
    fn missing_contacts_yields_empty_array() {
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "RichText/Contacts".into(),
            edittime: None,
            properties: JsonValue::Null,
            display_name: None,
        };
        let data = ContactsHandler.extract(&message).unwrap();
        assert_eq!(data["contacts"], JsonValue::Array(vec![]));
    }
}
