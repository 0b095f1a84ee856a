//! JSON utility functions

use serde_json::Value as JsonValue;
use std::hash::{Hash, Hasher};

/// Converts a JsonValue to Option<String>, returning None for null values.
///
/// This prevents serializing `JsonValue::Null` as the string `"null"`,
/// which would be stored as a VARCHAR instead of a database NULL.
pub fn json_to_opt_string(value: &JsonValue) -> Option<String> {
    if value.is_null() {
        None
    } else {
        serde_json::to_string(value).ok()
    }
}

/// Hash a JSON value into a hasher, with fallback for serialization failures.
///
/// Serializes the JSON value to a string and hashes it. If serialization fails
/// (extremely rare), hashes a fallback marker plus the JSON type discriminant
/// to maintain some differentiation and avoid silent collisions.
///
/// # Example
///
/// ```
/// use std::collections::hash_map::DefaultHasher;
/// use std::hash::Hasher;
/// use serde_json::json;
/// use sideseat_server::utils::json::hash_json_value;
///
/// let mut hasher = DefaultHasher::new();
/// hash_json_value(&mut hasher, &json!({"key": "value"}));
/// let hash = hasher.finish();
/// assert!(hash != 0);
/// ```
#[inline]
pub fn hash_json_value<H: Hasher>(hasher: &mut H, value: &JsonValue) {
    match serde_json::to_string(value) {
        Ok(s) => s.hash(hasher),
        Err(_) => {
            // Fallback: hash the JSON type to maintain some differentiation
            // This is extremely rare - serde_json::to_string rarely fails
            "__json_serialization_failed__".hash(hasher);
            // Hash the type discriminant for minimal differentiation
            std::mem::discriminant(value).hash(hasher);
        }
    }
}
