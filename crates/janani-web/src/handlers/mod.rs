//! API 핸들러 모듈.

pub mod ai;
pub mod appointments;
pub mod call;
pub mod health;
pub mod history;
pub mod medications;

use serde::Serialize;

/// 단순 메시지 응답
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
