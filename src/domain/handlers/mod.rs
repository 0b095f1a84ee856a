//! Message Handler Registry (C1): polymorphic dispatch from a
//! `messagetype` tag to the handler that knows how to pull a
//! variant-specific payload out of a message body/properties bag.
//!
//! The registry is an ordered list; the first handler whose `can_handle`
//! returns true wins. `UnknownHandler` is registered last and accepts
//! everything, making dispatch total.

mod call;
mod contacts;
mod location;
mod media;
mod media_card;
mod poll;
mod popcard;
mod scheduled_call;
mod text;
mod thread_activity;
mod translation;
mod unknown;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::data::types::RawMessage;

/// A handler extracts the variant-specific fields of `structured_data`
/// from a raw message. Handlers are stateless and shared read-only
/// across transform workers. A handler may reject a message whose body
/// is too malformed to extract from; the registry turns that into an
/// `extraction_error` entry rather than failing the whole phase.
pub trait MessageHandler: Send + Sync {
    fn can_handle(&self, message_type: &str) -> bool;
    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String>;
}

pub struct HandlerRegistry {
    handlers: Vec<Box<dyn MessageHandler>>,
}

impl HandlerRegistry {
    /// Builds the registry with every known variant, `UnknownHandler` last.
    pub fn new() -> Self {
        let handlers: Vec<Box<dyn MessageHandler>> = vec![
            Box::new(media::MediaHandler),
            Box::new(poll::PollHandler),
            Box::new(call::CallHandler),
            Box::new(scheduled_call::ScheduledCallHandler),
            Box::new(location::LocationHandler),
            Box::new(contacts::ContactsHandler),
            Box::new(media_card::MediaCardHandler),
            Box::new(popcard::PopCardHandler),
            Box::new(translation::TranslationHandler),
            Box::new(thread_activity::ThreadActivityHandler),
            Box::new(text::TextHandler),
            Box::new(unknown::UnknownHandler),
        ];
        Self { handlers }
    }

    /// Total: always returns a handler, falling through to `UnknownHandler`.
    pub fn resolve(&self, message_type: &str) -> &dyn MessageHandler {
        self.handlers
            .iter()
            .find(|h| h.can_handle(message_type))
            .expect("UnknownHandler accepts every type")
            .as_ref()
    }

    /// Runs the resolved handler, falling back to the raw properties plus
    /// an `extraction_error` entry if it rejects the message. The second
    /// element carries that error message so the caller can record it as
    /// a non-fatal phase error.
    pub fn extract(&self, message: &RawMessage) -> (JsonMap<String, JsonValue>, Option<String>) {
        match self.resolve(&message.messagetype).extract(message) {
            Ok(data) => (data, None),
            Err(reason) => {
                let mut data = JsonMap::new();
                data.insert("properties".into(), message.properties.clone());
                data.insert("extraction_error".into(), JsonValue::String(reason.clone()));
                (data, Some(reason))
            }
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads `message.properties.<key>` as a string, tolerating absence.
pub(crate) fn prop_str(message: &RawMessage, key: &str) -> Option<String> {
    message.properties.get(key).and_then(|v| match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn prop_i64(message: &RawMessage, key: &str) -> Option<i64> {
    message.properties.get(key).and_then(|v| v.as_i64())
}

pub(crate) fn prop_f64(message: &RawMessage, key: &str) -> Option<f64> {
    message.properties.get(key).and_then(|v| v.as_f64())
}

pub(crate) fn prop_array<'a>(message: &'a RawMessage, key: &str) -> Option<&'a Vec<JsonValue>> {
    message.properties.get(key).and_then(|v| v.as_array())
}

/// Rejects a message whose `properties` bag is present but not an object —
/// every per-key accessor above silently returns `None` for such a value,
/// which would otherwise hide a corrupted body behind empty defaults.
pub(crate) fn reject_malformed_properties(message: &RawMessage) -> Result<(), String> {
    if !message.properties.is_null() && !message.properties.is_object() {
        return Err(format!(
            "{} message {} has non-object properties",
            message.messagetype, message.id
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::RawMessage;

    fn message(message_type: &str, content: &str) -> RawMessage {
        RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: content.into(),
            messagetype: message_type.into(),
            edittime: None,
            properties: JsonValue::Null,
            display_name: None,
        }
    }

    #[test]
    fn registry_is_total() {
        let registry = HandlerRegistry::new();
        for ty in ["RichText", "Poll", "Event/Call", "made-up-type", ""] {
            let _ = registry.extract(&message(ty, ""));
        }
    }

    #[test]
    fn unknown_type_falls_through_to_unknown_handler() {
        let registry = HandlerRegistry::new();
        let (result, error) = registry.extract(&message("SomethingWeird", "hi"));
        assert!(result.contains_key("properties"));
        assert!(error.is_none());
    }

    #[test]
    fn text_handler_matches_richtext() {
        let registry = HandlerRegistry::new();
        let handler = registry.resolve("RichText");
        assert!(handler.can_handle("RichText"));
        assert!(handler.can_handle("Text"));
    }

    #[test]
    fn malformed_body_is_recorded_not_fatal() {
        let registry = HandlerRegistry::new();
        let mut malformed = message("Event/Call", "");
        malformed.properties = JsonValue::String("not an object".into());

        let (data, error) = registry.extract(&malformed);
        assert_eq!(data["extraction_error"], JsonValue::String(error.clone().unwrap()));
        assert!(data.contains_key("properties"));
        assert!(error.is_some());
    }
}
