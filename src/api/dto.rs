use serde::{Deserialize, Serialize};

use crate::models::Course;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CourseListResponse {
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub items: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Error bodies come as `{"detail": "..."}`, as a list of field errors
/// (`{"detail": [{"loc": [...], "msg": "..."}]}`), or as `{"message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Detail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Detail {
    Text(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    #[serde(default)]
    pub msg: String,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        match self.detail {
            Some(Detail::Text(text)) => Some(text),
            Some(Detail::Fields(fields)) if !fields.is_empty() => Some(
                fields
                    .iter()
                    .map(|field| {
                        let loc = field
                            .loc
                            .iter()
                            .map(|part| match part {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".");
                        format!("{}: {}", loc, field.msg)
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => self.message,
        }
    }
}
