//! # Notifier Email
//!
//! Email notification channel: templated HTML bodies, inline image
//! attachments, and pooled SMTP dispatch.
//!
//! The send pipeline runs render, inline, load, dispatch, in that order:
//!
//! - **Template rendering**: subject and body resolved with Handlebars,
//!   either from inline sources or from files under a configured templates
//!   directory (with path-traversal protection).
//! - **Image inlining**: local `<img src>` references in the rendered HTML
//!   are rewritten to `cid:` tokens; remote (`http`) sources are left alone
//!   by default.
//! - **Attachment loading**: each referenced image is read from the
//!   templates directory and attached as an inline MIME part whose
//!   content-id matches the `cid:` token.
//! - **SMTP dispatch**: messages go out over `lettre`, with STARTTLS,
//!   trust-all or custom CA trust, and clients pooled by a fingerprint of
//!   the transport configuration.
//!
//! Failure at any stage aborts the send; errors from every stage surface
//! through the returned future, never synchronously.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use notifier_email::{EmailNotifier, Notification, Notifier, Parameters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let notifier = EmailNotifier::new("/opt/notifier/templates");
//!
//!     let notification = Notification {
//!         kind: "email".into(),
//!         destination: "to@mail.com".into(),
//!         configuration: r#"{
//!             "from": "from@mail.com",
//!             "subject": "Deployment finished",
//!             "body": "deployment.html",
//!             "host": "smtp.example.com",
//!             "port": 587,
//!             "username": "user",
//!             "password": "password",
//!             "startTLSEnabled": true
//!         }"#.into(),
//!     };
//!
//!     notifier.send(&notification, &Parameters::new()).await?;
//!     Ok(())
//! }
//! ```

mod attachment;
mod config;
mod error;
mod inline;
mod message;
mod notifier;
mod template;
mod transport;

pub use attachment::{AttachmentLoader, InlineAttachment, content_type_for};
pub use config::{
    DEFAULT_SUBJECT_PARAMETER, DEFAULT_TEMPLATE_PARAMETER, EmailNotifierConfig, Notification,
    Parameters, split_recipients,
};
pub use error::{NotifyError, Result};
pub use inline::{ImageInliner, RemoteImagePolicy};
pub use message::MailMessage;
pub use notifier::{Dispatch, EmailNotifier, Notifier};
pub use template::TemplateRenderer;
pub use transport::{SmtpSettings, TransportPool};

/// Prelude for common imports.
///
/// ```
/// use notifier_email::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attachment::{AttachmentLoader, InlineAttachment};
    pub use crate::config::{EmailNotifierConfig, Notification, Parameters};
    pub use crate::error::{NotifyError, Result};
    pub use crate::inline::{ImageInliner, RemoteImagePolicy};
    pub use crate::message::MailMessage;
    pub use crate::notifier::{Dispatch, EmailNotifier, Notifier};
    pub use crate::template::TemplateRenderer;
    pub use crate::transport::{SmtpSettings, TransportPool};
}
