use std::error::Error as StdError;

/// The only way a call fails: a human-readable message. Transport errors,
/// error statuses and bodies of the wrong shape all end up here.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    message: String,
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        // reqwest keeps the useful part (e.g. "relative URL without a base")
        // in the source chain.
        let mut message = error.to_string();
        let mut source = error.source();

        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_bare_message() {
        let error = ApiError::new("invalid credentials");
        assert_eq!(error.to_string(), "invalid credentials");
        assert_eq!(error.message(), "invalid credentials");
    }
}
