use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Fetch,
    Parse,
    Validation,
    Storage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorError {
    pub code: ErrorCode,
    pub message: String,
}

impl AdvisorError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
