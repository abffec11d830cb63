use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

/// Trims whitespace and trailing slashes; only http(s) URLs are accepted.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let parsed = reqwest::Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    let mut normalized = trimmed.to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    Some(normalized)
}

pub fn text_or_na(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn json_or_na(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn parse_positive_u32(value: &str, what: &str) -> Result<u32, String> {
    let raw = value.trim();
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("invalid {what} '{raw}', expected positive integer")),
        Ok(n) => Ok(n),
    }
}

pub fn parse_record_id(value: &str) -> Result<u64, String> {
    let raw = value.trim();
    raw.parse::<u64>()
        .map_err(|_| format!("invalid record id '{raw}'"))
}
