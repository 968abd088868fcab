//! Inline attachments for images referenced by the rendered HTML.

use std::path::PathBuf;
use tracing::debug;

use crate::template::resolve_under;
use crate::{NotifyError, Result};

/// A MIME part embedded in the message body via a `cid:` reference.
#[derive(Debug, Clone)]
pub struct InlineAttachment {
    /// Original resource identifier from the `<img src>` attribute, before
    /// the `cid:` rewrite.
    pub resource: String,
    /// Resolved MIME type.
    pub content_type: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl InlineAttachment {
    /// The content-id bound to this part: `<resource>`, matching the
    /// `cid:resource` token the inliner wrote into the HTML.
    pub fn content_id(&self) -> String {
        format!("<{}>", self.resource)
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Resolve the MIME type for a resource file name.
///
/// `.png` is mapped explicitly; other extensions go through the generic
/// filename lookup, defaulting to `application/octet-stream`. An empty name
/// yields an empty content type rather than an error.
pub fn content_type_for(filename: &str) -> String {
    if filename.is_empty() {
        String::new()
    } else if filename.ends_with(".png") {
        "image/png".to_string()
    } else {
        mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Reads image resources from the templates directory and builds one inline
/// attachment per resource.
pub struct AttachmentLoader {
    base_dir: PathBuf,
}

impl AttachmentLoader {
    /// Create a loader rooted at the templates directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Load every resource in order. Attachments are not optional: a
    /// missing or unreadable resource fails the whole send.
    pub async fn load(&self, resources: &[String]) -> Result<Vec<InlineAttachment>> {
        let mut attachments = Vec::with_capacity(resources.len());

        for resource in resources {
            let path = resolve_under(&self.base_dir, resource)
                .map_err(|_| NotifyError::ResourceNotFound(resource.clone()))?;
            let data = tokio::fs::read(&path)
                .await
                .map_err(|_| NotifyError::ResourceNotFound(resource.clone()))?;

            debug!(resource = %resource, bytes = data.len(), "loaded inline attachment");
            attachments.push(InlineAttachment {
                resource: resource.clone(),
                content_type: content_type_for(resource),
                data,
            });
        }

        Ok(attachments)
    }
}
