use serde::{Deserialize, Deserializer};

/// Backend identifiers are opaque strings (`id` or `_id` on the wire).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier as text when `value` is a non-empty string or a number.
pub fn id_from_value(value: &serde_json::Value) -> Option<EntityId> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserialize an identifier that may arrive as a string or a number.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| serde::de::Error::custom("expected a string or numeric id"))
}

/// Like [`deserialize_id`], mapping null, empty strings and objects without an
/// id to `None`. Populated references (`{"_id": ...}`) yield their id.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match &value {
        serde_json::Value::Object(map) => ["id", "_id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(id_from_value)),
        other => id_from_value(other),
    })
}
