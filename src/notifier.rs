//! The email notification channel.

use async_trait::async_trait;
use lettre::AsyncTransport;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::{DEFAULT_SUBJECT_PARAMETER, DEFAULT_TEMPLATE_PARAMETER, split_recipients};
use crate::{
    AttachmentLoader, EmailNotifierConfig, ImageInliner, MailMessage, Notification, NotifyError,
    Parameters, RemoteImagePolicy, Result, SmtpSettings, TemplateRenderer, TransportPool,
};

/// Outcome of a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The message was accepted by the server; carries the opaque server
    /// acknowledgment, suitable only for logging.
    Sent(String),
    /// The notification is not addressed to this channel; nothing was
    /// rendered or dispatched.
    Skipped,
}

/// A notification channel.
///
/// `send` resolves once per invocation: `Ok` on success or skip, `Err` with
/// the causing stage error otherwise. Nothing runs until the returned future
/// is polled, so rendering and attachment failures surface through the same
/// channel as transport failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The notification type this channel handles.
    fn notification_type(&self) -> &'static str;

    /// Dispatch a notification with the given template parameters.
    async fn send(&self, notification: &Notification, parameters: &Parameters)
    -> Result<Dispatch>;
}

/// Email channel: renders subject and HTML body from templates, inlines
/// local images as `cid:` attachments, and dispatches over SMTP.
pub struct EmailNotifier {
    templates_path: PathBuf,
    renderer: TemplateRenderer,
    inliner: ImageInliner,
    pool: TransportPool,
}

impl EmailNotifier {
    /// Notification type handled by this channel.
    pub const TYPE: &'static str = "email";

    /// Create a notifier resolving templates and image resources under the
    /// given directory.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        let templates_path = templates_path.into();
        Self {
            renderer: TemplateRenderer::new(&templates_path),
            inliner: ImageInliner::new(),
            pool: TransportPool::new(),
            templates_path,
        }
    }

    /// Set the policy for remote (`http`-prefixed) image sources. The
    /// default leaves them as external references.
    pub fn remote_image_policy(mut self, policy: RemoteImagePolicy) -> Self {
        self.inliner = self.inliner.remote_policy(policy);
        self
    }

    /// The templates directory.
    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Run every pre-dispatch stage: resolve recipients, render subject and
    /// body, rewrite image references, and load the attachments. No network
    /// I/O happens here.
    pub async fn prepare_message(
        &self,
        config: &EmailNotifierConfig,
        destination: &str,
        parameters: &Parameters,
    ) -> Result<MailMessage> {
        let from = self.renderer.render_inline(&config.from, parameters)?;

        let destination = match &config.to {
            Some(to) => self.renderer.render_inline(to, parameters)?,
            None => destination.to_string(),
        };
        let to = split_recipients(&destination);
        if to.is_empty() {
            return Err(NotifyError::Config(format!(
                "no recipients in destination {destination:?}"
            )));
        }

        let subject_source = resolve_or_default(&config.subject, parameters, DEFAULT_SUBJECT_PARAMETER);
        let subject = self.renderer.render_inline(&subject_source, parameters)?;

        let template_name =
            resolve_or_default(&config.body, parameters, DEFAULT_TEMPLATE_PARAMETER);
        let html = self.renderer.render_file(&template_name, parameters).await?;

        let (html, resources) = self.inliner.inline(&html)?;
        let attachments = AttachmentLoader::new(&self.templates_path)
            .load(&resources)
            .await?;

        Ok(MailMessage {
            from,
            to,
            subject,
            html,
            attachments,
        })
    }

    async fn dispatch(&self, config: &EmailNotifierConfig, message: MailMessage) -> Result<String> {
        let settings = SmtpSettings::from(config);
        let client = self.pool.get(&settings).await?;
        let mail = message.to_lettre()?;

        debug!(
            host = %settings.host,
            to = ?message.to,
            subject = %message.subject,
            "dispatching email"
        );

        let response = client.send(mail).await?;
        Ok(format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        ))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn notification_type(&self) -> &'static str {
        Self::TYPE
    }

    async fn send(
        &self,
        notification: &Notification,
        parameters: &Parameters,
    ) -> Result<Dispatch> {
        if notification.kind != Self::TYPE {
            debug!(kind = %notification.kind, "notification is not for the email channel");
            return Ok(Dispatch::Skipped);
        }

        let config = EmailNotifierConfig::from_json(&notification.configuration)?;
        let message = self
            .prepare_message(&config, &notification.destination, parameters)
            .await?;

        match self.dispatch(&config, message).await {
            Ok(ack) => {
                info!(ack = %ack, "email sent");
                Ok(Dispatch::Sent(ack))
            }
            Err(e) => {
                error!(error = %e, "email failed");
                Err(e)
            }
        }
    }
}

/// Fallback policy for subject and body: configured value, then the
/// caller-supplied default parameter, then an empty string.
fn resolve_or_default(
    configured: &Option<String>,
    parameters: &Parameters,
    default_parameter: &str,
) -> String {
    match configured {
        Some(value) => value.clone(),
        None => parameters
            .get(default_parameter)
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default(),
    }
}
