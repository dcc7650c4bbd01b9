use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn parse_via_optional_string<'de, D, T, F>(deserializer: D, parser: F) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    F: FnOnce(&str) -> T,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(parser(&raw))
}
