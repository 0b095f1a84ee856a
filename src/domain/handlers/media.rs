use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_f64, prop_i64, prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct MediaHandler;

impl MessageHandler for MediaHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type.starts_with("RichText/Media_") || message_type == "RichText/UriObject"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut data = JsonMap::new();

        let filename = prop_str(message, "filename").unwrap_or_default();
        let filesize = prop_i64(message, "filesize").unwrap_or(0);
        data.insert("media_filename".into(), JsonValue::String(filename.clone()));
        data.insert("media_filesize".into(), JsonValue::Number(filesize.into()));
        data.insert("media_filesize_formatted".into(), JsonValue::String(format_bytes(filesize)));
        data.insert(
            "media_filetype".into(),
            JsonValue::String(filename.rsplit('.').next().unwrap_or_default().to_lowercase()),
        );
        data.insert("media_url".into(), JsonValue::String(prop_str(message, "uri").unwrap_or_default()));
        data.insert("media_width".into(), prop_i64(message, "original_file_width").map(|v| v.into()).unwrap_or(JsonValue::Null));
        data.insert("media_height".into(), prop_i64(message, "original_file_height").map(|v| v.into()).unwrap_or(JsonValue::Null));
        data.insert(
            "media_duration".into(),
            prop_f64(message, "duration").map(serde_json::Number::from_f64).flatten().map(JsonValue::Number).unwrap_or(JsonValue::Null),
        );
        data.insert("media_description".into(), JsonValue::String(prop_str(message, "description").unwrap_or_default()));

        if message.messagetype == "RichText/Media_Album" {
            let items: Vec<JsonValue> = message
                .properties
                .get("albumitems")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|item| {
                    let mut entry = JsonMap::new();
                    entry.insert("url".into(), item.get("uri").cloned().unwrap_or(JsonValue::Null));
                    entry.insert("thumbnail".into(), item.get("thumbnail").cloned().unwrap_or(JsonValue::Null));
                    entry.insert("width".into(), item.get("original_file_width").cloned().unwrap_or(JsonValue::Null));
                    entry.insert("height".into(), item.get("original_file_height").cloned().unwrap_or(JsonValue::Null));
                    JsonValue::Object(entry)
                })
                .collect();
            data.insert("media_album_count".into(), JsonValue::Number(items.len().into()));
            data.insert("media_album_items".into(), JsonValue::Array(items));
        }

        Ok(data)
    }
}

fn format_bytes(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    if bytes <= 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with_properties(message_type: &str, properties: JsonValue) -> RawMessage {
        RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: message_type.into(),
            edittime: None,
            properties,
            display_name: None,
        }
    }

    #[test]
    fn matches_media_variants() {
        let handler = MediaHandler;
        assert!(handler.can_handle("RichText/Media_Photo"));
        assert!(handler.can_handle("RichText/Media_Video"));
        assert!(handler.can_handle("RichText/UriObject"));
        assert!(!handler.can_handle("RichText"));
    }

    #[test]
    fn extracts_filesize_and_formats_it() {
        let props = serde_json::json!({"filename": "cat.png", "filesize": 2048});
        let data = MediaHandler.extract(&message_with_properties("RichText/Media_Photo", props)).unwrap();
        assert_eq!(data["media_filesize"], JsonValue::Number(2048.into()));
        assert_eq!(data["media_filesize_formatted"], JsonValue::String("2.0 KB".into()));
        assert_eq!(data["media_filetype"], JsonValue::String("png".into()));
    }

    #[test]
    fn missing_properties_default_gracefully() {
        let data = MediaHandler.extract(&message_with_properties("RichText/Media_Photo", JsonValue::Null)).unwrap();
        assert_eq!(data["media_filename"], JsonValue::String(String::new()));
        assert_eq!(data["media_filesize"], JsonValue::Number(0.into()));
    }

    #[test]
    fn album_items_collected() {
        let props = serde_json::json!({"albumitems": [{"uri": "u1"}, {"uri": "u2"}]});
        let data = MediaHandler.extract(&message_with_properties("RichText/Media_Album", props)).unwrap();
        assert_eq!(data["media_album_count"], JsonValue::Number(2.into()));
    }
}
