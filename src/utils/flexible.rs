use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    Int(i64),
    Float(f64),
    String(String),
    Other(serde_json::Value),
}

/// Accepts ids sent either as JSON strings or numbers.
pub fn deserialize_id_flexible<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::Int(i) => Ok(i.to_string()),
        StringOrInt::String(s) => Ok(s),
        StringOrInt::Float(f) => Err(serde::de::Error::custom(format!("Invalid id: {}", f))),
        StringOrInt::Other(v) => Err(serde::de::Error::custom(format!("Invalid id: {}", v))),
    }
}

pub fn deserialize_optional_id<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrInt>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrInt::Int(i)) => Ok(Some(i.to_string())),
        Some(StringOrInt::String(s)) => Ok(Some(s)),
        Some(_) => Ok(None),
    }
}

/// Lenient integer: numbers and numeric strings parse, anything else
/// (null, garbage text, fractions) becomes `None` so the caller can treat
/// it as missing configuration.
pub fn deserialize_int_lenient<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrInt>::deserialize(deserializer)? {
        Some(StringOrInt::Int(i)) => Some(i),
        Some(StringOrInt::Float(f)) if f.fract() == 0.0 => Some(f as i64),
        Some(StringOrInt::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
