use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// 开启 rotate 时后端会一并下发新的 refresh
    #[serde(default)]
    pub refresh: Option<String>,
}

/// 列表接口有分页与不分页两种返回
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Paged { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Paged { results } => results,
            ListEnvelope::Bare(items) => items,
        }
    }
}

/// 从 DRF 错误体里挑出一条可读信息
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().chars().take(200).collect();
    };
    for key in ["non_field_errors", "message", "detail", "error"] {
        if let Some(msg) = first_text(value.get(key)) {
            return msg;
        }
    }
    if let Value::Object(map) = &value {
        for (field, v) in map {
            if let Some(msg) = first_text(Some(v)) {
                return format!("{}: {}", field, msg);
            }
        }
    }
    value.to_string()
}

fn first_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_accepts_both_shapes() {
        let paged: ListEnvelope<i32> =
            serde_json::from_value(json!({"count": 2, "results": [1, 2]})).unwrap();
        let bare: ListEnvelope<i32> = serde_json::from_value(json!([3])).unwrap();
        assert_eq!(paged.into_vec(), vec![1, 2]);
        assert_eq!(bare.into_vec(), vec![3]);
    }

    #[test]
    fn error_message_prefers_known_keys() {
        assert_eq!(
            error_message(r#"{"non_field_errors": ["Invalid credentials"]}"#),
            "Invalid credentials"
        );
        assert_eq!(
            error_message(r#"{"detail": "Not found."}"#),
            "Not found."
        );
        assert_eq!(
            error_message(r#"{"code": ["department with this code already exists."]}"#),
            "code: department with this code already exists."
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
