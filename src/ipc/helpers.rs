use crate::ipc::error::HandlerErr;
use crate::model::AttendanceStatus;
use chrono::NaiveDate;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Required non-empty name field, trimmed.
pub fn get_required_name(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let value = get_required_str(params, key)?;
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(HandlerErr::bad_params(format!("{} must not be empty", key)));
    }
    Ok(trimmed)
}

/// dateKey params must be calendar dates in YYYY-MM-DD form.
pub fn get_date_key(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let raw = get_required_str(params, key)?;
    parse_date(&raw, key)?;
    Ok(raw)
}

pub fn parse_date(raw: &str, key: &str) -> Result<NaiveDate, HandlerErr> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

pub fn get_status(params: &serde_json::Value, key: &str) -> Result<AttendanceStatus, HandlerErr> {
    match get_required_str(params, key)?.as_str() {
        "present" => Ok(AttendanceStatus::Present),
        "absent" => Ok(AttendanceStatus::Absent),
        other => Err(HandlerErr::bad_params(format!(
            "{} must be present or absent, got {}",
            key, other
        ))),
    }
}
