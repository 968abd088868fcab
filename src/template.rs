//! Subject and body rendering on top of Handlebars.

use handlebars::Handlebars;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::{NotifyError, Parameters, Result};

/// Resolve `name` as a relative path under `base`, rejecting absolute paths
/// and parent-directory components. Template bodies may originate from
/// untrusted configuration, so lookups must never escape the base directory.
pub(crate) fn resolve_under(base: &Path, name: &str) -> Result<PathBuf> {
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(NotifyError::TemplateNotFound(name.to_string()));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(NotifyError::TemplateNotFound(name.to_string())),
        }
    }
    Ok(base.join(candidate))
}

/// Template renderer over a read-only templates directory.
///
/// Handlebars templates are logic-less: no scripting or reflection builtins
/// exist to restrict, so an untrusted template body can at worst interpolate
/// the parameters it is given. Named lookups are additionally confined to the
/// templates directory by [`resolve_under`].
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
    base_dir: PathBuf,
}

impl TemplateRenderer {
    /// Create a renderer rooted at the given templates directory.
    ///
    /// Interpolation is raw: subjects and address lists are not HTML, and
    /// the body templates are authored as complete HTML already.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self {
            registry,
            base_dir: base_dir.into(),
        }
    }

    /// The templates directory this renderer resolves names against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Render an inline template source against the parameters.
    pub fn render_inline(&self, source: &str, parameters: &Parameters) -> Result<String> {
        self.registry
            .render_template(source, parameters)
            .map_err(NotifyError::from)
    }

    /// Render a named template file, resolved relative to the templates
    /// directory. The file is loaded per call.
    pub async fn render_file(&self, name: &str, parameters: &Parameters) -> Result<String> {
        let path = resolve_under(&self.base_dir, name)?;
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|_| NotifyError::TemplateNotFound(name.to_string()))?;

        debug!(template = name, "rendering template file");
        self.render_inline(&source, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, serde_json::Value)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_render_inline() {
        let renderer = TemplateRenderer::new("/tmp/templates");
        let rendered = renderer
            .render_inline("Hello, {{name}}!", &params(&[("name", json!("World"))]))
            .unwrap();
        assert_eq!(rendered, "Hello, World!");
    }

    #[test]
    fn test_render_inline_is_raw() {
        let renderer = TemplateRenderer::new("/tmp/templates");

        let subject = renderer
            .render_inline("{{s}}", &params(&[("s", json!("Alerts & Reports"))]))
            .unwrap();
        assert_eq!(subject, "Alerts & Reports");

        let emails = renderer
            .render_inline(
                "{{emails}}",
                &params(&[("emails", json!("john.o'neil@x.com,jane@x.com"))]),
            )
            .unwrap();
        assert_eq!(emails, "john.o'neil@x.com,jane@x.com");
    }

    #[test]
    fn test_render_inline_syntax_error() {
        let renderer = TemplateRenderer::new("/tmp/templates");
        assert!(matches!(
            renderer.render_inline("{{#if}}", &Parameters::new()),
            Err(NotifyError::Template(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let base = Path::new("/opt/templates");
        assert!(resolve_under(base, "../etc/passwd").is_err());
        assert!(resolve_under(base, "/etc/passwd").is_err());
        assert!(resolve_under(base, "sub/../../escape.html").is_err());
        assert!(resolve_under(base, "sub/body.html").is_ok());
    }

    #[tokio::test]
    async fn test_render_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TemplateRenderer::new(dir.path());
        assert!(matches!(
            renderer.render_file("nope.html", &Parameters::new()).await,
            Err(NotifyError::TemplateNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("body.html"), "<div>{{title}}</div>").unwrap();

        let renderer = TemplateRenderer::new(dir.path());
        let rendered = renderer
            .render_file("body.html", &params(&[("title", json!("test"))]))
            .await
            .unwrap();
        assert_eq!(rendered, "<div>test</div>");
    }
}
