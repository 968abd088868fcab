//! Mail message assembly.

use lettre::Message;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType};

use crate::{InlineAttachment, NotifyError, Result};

/// A fully prepared mail message: everything resolved, nothing sent yet.
#[derive(Debug, Clone)]
pub struct MailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Resolved subject.
    pub subject: String,
    /// Resolved HTML body, with `cid:` references already in place.
    pub html: String,
    /// Inline attachments, one per `cid:` reference.
    pub attachments: Vec<InlineAttachment>,
}

impl MailMessage {
    /// Build the lettre message: a plain HTML part when there are no
    /// attachments, otherwise `multipart/related` with one inline part per
    /// attachment, content-id matching the `cid:` token in the body.
    pub fn to_lettre(&self) -> Result<Message> {
        if self.to.is_empty() {
            return Err(NotifyError::Config("no recipients".to_string()));
        }

        let from: Mailbox = self.from.parse()?;
        let mut builder = Message::builder().from(from).subject(self.subject.clone());
        for recipient in &self.to {
            builder = builder.to(recipient.parse()?);
        }

        if self.attachments.is_empty() {
            return Ok(builder.singlepart(SinglePart::html(self.html.clone()))?);
        }

        let mut related = MultiPart::related().singlepart(SinglePart::html(self.html.clone()));
        for attachment in &self.attachments {
            let content_type = attachment
                .content_type
                .parse::<ContentType>()
                .or_else(|_| ContentType::parse("application/octet-stream"))
                .map_err(|e| NotifyError::Attachment(e.to_string()))?;

            related = related.singlepart(
                Attachment::new_inline(attachment.resource.clone())
                    .body(attachment.data.clone(), content_type),
            );
        }

        Ok(builder.multipart(related)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MailMessage {
        MailMessage {
            from: "from@mail.com".to_string(),
            to: vec!["to@mail.com".to_string()],
            subject: "subject of email".to_string(),
            html: "<html><body>test</body></html>".to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_plain_html_message() {
        let formatted = String::from_utf8(message().to_lettre().unwrap().formatted()).unwrap();

        assert!(formatted.contains("Subject: subject of email"));
        assert!(formatted.contains("To: to@mail.com"));
        assert!(formatted.contains("<html><body>test</body></html>"));
        assert!(!formatted.contains("multipart/related"));
    }

    #[test]
    fn test_inline_attachments_carry_content_ids() {
        let mut msg = message();
        msg.html = r#"<img src="cid:images/logo.png">"#.to_string();
        msg.attachments = vec![InlineAttachment {
            resource: "images/logo.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }];

        let formatted = String::from_utf8(msg.to_lettre().unwrap().formatted()).unwrap();

        assert!(formatted.contains("multipart/related"));
        assert!(formatted.contains("Content-ID: <images/logo.png>"));
        assert!(formatted.contains("Content-Type: image/png"));
        assert!(formatted.contains("Content-Disposition: inline"));
    }

    #[test]
    fn test_multiple_recipients() {
        let mut msg = message();
        msg.to = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        let formatted = String::from_utf8(msg.to_lettre().unwrap().formatted()).unwrap();

        assert!(formatted.contains("a@x.com"));
        assert!(formatted.contains("b@x.com"));
    }

    #[test]
    fn test_no_recipients_is_config_error() {
        let mut msg = message();
        msg.to.clear();
        assert!(matches!(msg.to_lettre(), Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let mut msg = message();
        msg.from = "not-an-address".to_string();
        assert!(matches!(
            msg.to_lettre(),
            Err(NotifyError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_empty_content_type_falls_back() {
        let mut msg = message();
        msg.attachments = vec![InlineAttachment {
            resource: "blob".to_string(),
            content_type: String::new(),
            data: vec![1],
        }];

        let formatted = String::from_utf8(msg.to_lettre().unwrap().formatted()).unwrap();
        assert!(formatted.contains("application/octet-stream"));
    }
}
