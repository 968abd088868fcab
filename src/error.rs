//! Notifier error types.

use thiserror::Error;

/// Result type for notifier operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Notifier errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Template rendering or syntax error.
    #[error("Template error: {0}")]
    Template(String),

    /// Template file not found under the templates directory.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A local image referenced by the rendered HTML cannot be read.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// HTML rewriting error.
    #[error("HTML error: {0}")]
    Html(String),

    /// Attachment error.
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Smtp(err.to_string())
    }
}

impl From<lettre::address::AddressError> for NotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Smtp(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotifyError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for NotifyError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}
