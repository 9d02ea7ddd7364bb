use shared::error::ErrorCode;
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with status {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },
    #[error("request rejected: {message}")]
    Rejected { message: String },
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl ClientError {
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "request was not accepted".to_string()),
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Status { status, .. } => Some(ErrorCode::from_status(*status)),
            ClientError::Validation(_) => Some(ErrorCode::Validation),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(ErrorCode::Unauthorized)
    }

    /// Message the server put in its response, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            ClientError::Rejected { message } => Some(message.as_str()),
            _ => None,
        }
    }
}
