//! Notification and per-notification configuration types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{NotifyError, Result};

/// Template rendering context, supplied by the caller per send.
pub type Parameters = HashMap<String, serde_json::Value>;

/// Parameter consulted when the configuration carries no subject.
pub const DEFAULT_SUBJECT_PARAMETER: &str = "_email_default_subject";

/// Parameter consulted when the configuration carries no body template.
pub const DEFAULT_TEMPLATE_PARAMETER: &str = "_email_default_template_name";

/// A notification event handed over by the host framework.
///
/// The configuration blob is an opaque JSON string; this channel deserializes
/// it into an [`EmailNotifierConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Channel type, e.g. `"email"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination string (comma/semicolon/whitespace separated addresses).
    pub destination: String,
    /// Channel-specific configuration blob.
    pub configuration: String,
}

/// Per-notification email configuration, deserialized from the notification
/// blob. Immutable for the duration of a send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailNotifierConfig {
    /// Sender address. May itself be a template.
    pub from: String,
    /// Recipient list override. Rendered against the parameters before
    /// splitting; when absent the notification destination is used.
    pub to: Option<String>,
    /// Subject template. Falls back to the `_email_default_subject`
    /// parameter, then to an empty string.
    pub subject: Option<String>,
    /// Body template file, relative to the templates directory. Falls back
    /// to the `_email_default_template_name` parameter, then to an empty
    /// string.
    pub body: Option<String>,
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Username for authentication.
    pub username: Option<String>,
    /// Password for authentication.
    pub password: Option<String>,
    /// Skip server certificate validation.
    pub ssl_trust_all: bool,
    /// PEM root certificate bundle for custom CA trust.
    pub ssl_key_store: Option<String>,
    /// Legacy keystore password, accepted but unused with PEM trust roots.
    pub ssl_key_store_password: Option<String>,
    /// Require STARTTLS negotiation; a plaintext session is a failure.
    #[serde(alias = "startTLSEnabled")]
    pub start_tls_enabled: bool,
}

impl EmailNotifierConfig {
    /// Deserialize a configuration blob, failing fast on malformed input.
    pub fn from_json(blob: &str) -> Result<Self> {
        serde_json::from_str(blob)
            .map_err(|e| NotifyError::Config(format!("invalid email configuration: {e}")))
    }
}

/// Split a destination string on commas, semicolons, and whitespace runs,
/// discarding empty tokens.
pub fn split_recipients(destination: &str) -> Vec<String> {
    destination
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
