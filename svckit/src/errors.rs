use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Backend { status: u16, message: Option<String> },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type BankResult<T> = Result<T, BankError>;

impl BankError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BankError::Validation(msg.into())
    }

    pub fn missing_field(label: &str) -> Self {
        BankError::Validation(format!("{} is required", label))
    }

    /// Text shown to the operator. Backend-reported messages and validation
    /// failures are surfaced verbatim, everything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            BankError::Backend { message: Some(msg), .. } if !msg.trim().is_empty() => msg.clone(),
            BankError::Validation(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, BankError::Network(_))
    }
}

impl From<reqwest::Error> for BankError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BankError::Decode(err.to_string())
        } else {
            BankError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BankError {
    fn from(err: serde_json::Error) -> Self {
        BankError::Decode(err.to_string())
    }
}

impl From<anyhow::Error> for BankError {
    fn from(err: anyhow::Error) -> Self {
        BankError::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_verbatim() {
        let err = BankError::Backend {
            status: 400,
            message: Some("Missing required field: contact".to_string()),
        };
        assert_eq!(err.user_message("Error registering donor"), "Missing required field: contact");
    }

    #[test]
    fn test_fallback_for_transport_and_empty_backend_errors() {
        let err = BankError::Network("connection refused".to_string());
        assert_eq!(err.user_message("Error loading stock data"), "Error loading stock data");

        let err = BankError::Backend { status: 500, message: None };
        assert_eq!(err.user_message("Error recording donation"), "Error recording donation");

        let err = BankError::Backend { status: 500, message: Some("  ".to_string()) };
        assert_eq!(err.user_message("Error recording donation"), "Error recording donation");
    }

    #[test]
    fn test_validation_message_is_shown() {
        let err = BankError::missing_field("Donor");
        assert_eq!(err.user_message("ignored"), "Donor is required");
    }
}
