//! Error types for the driver.
//!
//! SDK errors are mapped once, here, into [`Error::Remote`]. Operations
//! never return an `Error` to callers directly: they fold it into a
//! [`Failure`] carried by the response envelope.

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use serde::Serialize;
use thiserror::Error;

/// Result alias used inside the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while serving one driver call.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote call failed: service error, dispatch failure, timeout.
    #[error("{message}")]
    Remote {
        code: Option<String>,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The caller's arguments cannot form a valid request.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("cannot unmarshal attribute '{attribute}': {reason}")]
    Unmarshal { attribute: String, reason: String },
}

impl Error {
    pub(crate) fn unmarshal(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Unmarshal {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable code for the error.
    ///
    /// Remote errors report the service's code when it sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Remote { code, .. } => code.as_deref(),
            Error::Config(_) => Some("ConfigError"),
            Error::Validation(_) => Some("ValidationError"),
            Error::Unmarshal { .. } => Some("UnmarshalError"),
        }
    }
}

/// Structured failure description carried by a failed response.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct Failure {
    pub code: Option<String>,
    pub message: String,
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Failure {
            code: err.code().map(str::to_string),
            message: err.to_string(),
        }
    }
}

/// Map any AWS SDK error to [`Error::Remote`].
///
/// Service errors keep the code and message the service sent back. Every
/// other kind (construction, dispatch, timeout, unparseable response) is
/// described with its full source chain since the top-level display is
/// only a category name.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if let Some(service_err) = err.as_service_error() {
        let code = service_err.code().map(str::to_string);
        let message = match (service_err.code(), service_err.message()) {
            (Some(code), Some(msg)) => Some(format!("{}: {}", code, msg)),
            (None, Some(msg)) => Some(msg.to_string()),
            (Some(code), None) => Some(code.to_string()),
            (None, None) => None,
        };
        if let Some(message) = message {
            return Error::Remote { code, message };
        }
    }

    let err_display = DisplayErrorContext(&err).to_string();
    let err_debug = format!("{:?}", err);

    Error::Remote {
        code: extract_error_code(&err_debug),
        message: err_display,
    }
}

/// Extract an error code from an AWS SDK error debug string.
fn extract_error_code(err_str: &str) -> Option<String> {
    // Look for patterns like: code: Some("ResourceNotFoundException")
    if let Some(start) = err_str.find("code: Some(\"") {
        let rest = &err_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::error::ErrorMetadata;
    use aws_sdk_dynamodb::operation::create_table::CreateTableError;
    use aws_sdk_dynamodb::operation::get_item::GetItemError;

    #[test]
    fn service_error_keeps_code_and_message() {
        let meta = ErrorMetadata::builder()
            .code("ResourceInUseException")
            .message("Table already exists: Users")
            .build();
        let err: SdkError<CreateTableError, ()> =
            SdkError::service_error(CreateTableError::generic(meta), ());

        match map_sdk_error(err) {
            Error::Remote { code, message } => {
                assert_eq!(code.as_deref(), Some("ResourceInUseException"));
                assert_eq!(
                    message,
                    "ResourceInUseException: Table already exists: Users"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn construction_failure_describes_source() {
        let err: SdkError<GetItemError, ()> = SdkError::construction_failure("no region set");

        let mapped = map_sdk_error(err);
        assert!(matches!(mapped, Error::Remote { .. }));
        assert!(mapped.to_string().contains("no region set"));
    }

    #[test]
    fn failure_from_local_error_has_code() {
        let failure = Failure::from(Error::Validation("empty values".into()));
        assert_eq!(failure.code.as_deref(), Some("ValidationError"));
        assert_eq!(failure.message, "validation error: empty values");
    }

    #[test]
    fn extracts_code_from_debug_output() {
        let debug = r#"ServiceError { source: Unhandled { meta: ErrorMetadata { code: Some("ThrottlingException"), message: None } } }"#;
        assert_eq!(
            extract_error_code(debug).as_deref(),
            Some("ThrottlingException")
        );
        assert_eq!(extract_error_code("dispatch failure"), None);
    }
}
