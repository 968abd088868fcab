//! HTML post-processing: rewrite local `<img>` sources to `cid:` references.

use lol_html::{HtmlRewriter, Settings, element};

use crate::{NotifyError, Result};

/// What to do with `<img>` sources that start with a remote scheme prefix
/// (`http`/`https`, case-insensitive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteImagePolicy {
    /// Leave remote images untouched as external references.
    #[default]
    Keep,
    /// Rewrite remote sources too, treating them as resources relative to
    /// the templates directory. This reproduces the historical behavior of
    /// inlining every `src` value; the load stage will fail unless a file of
    /// that name exists.
    Rewrite,
}

/// Rewrites `<img src>` attributes to `cid:` references and collects the
/// original values as the ordered list of resources to attach.
///
/// This stage only manipulates markup; it performs no I/O. Markup outside the
/// rewritten attributes passes through byte-identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageInliner {
    policy: RemoteImagePolicy,
}

impl ImageInliner {
    /// Create an inliner that keeps remote images as external references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the remote image policy.
    pub fn remote_policy(mut self, policy: RemoteImagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rewrite the document and return it together with the resource list,
    /// in document order. Images without a `src`, and remote images under
    /// [`RemoteImagePolicy::Keep`], are left untouched and excluded from the
    /// list.
    pub fn inline(&self, html: &str) -> Result<(String, Vec<String>)> {
        let mut output = Vec::with_capacity(html.len());
        let mut resources = Vec::new();
        let policy = self.policy;

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("img[src]", |el| {
                    if let Some(src) = el.get_attribute("src") {
                        if policy == RemoteImagePolicy::Keep && is_remote(&src) {
                            return Ok(());
                        }
                        el.set_attribute("src", &format!("cid:{src}"))?;
                        resources.push(src);
                    }
                    Ok(())
                })],
                ..Settings::new()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| NotifyError::Html(e.to_string()))?;
        rewriter
            .end()
            .map_err(|e| NotifyError::Html(e.to_string()))?;

        let rewritten =
            String::from_utf8(output).map_err(|e| NotifyError::Html(e.to_string()))?;
        Ok((rewritten, resources))
    }
}

/// A source is remote iff it starts with the `http` scheme prefix, which
/// also covers `https`.
fn is_remote(src: &str) -> bool {
    src.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("http"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_images_rewritten_in_order() {
        let html = r#"<p><img src="a.png"><img src="sub/b.png"></p>"#;
        let (rewritten, resources) = ImageInliner::new().inline(html).unwrap();

        assert_eq!(
            rewritten,
            r#"<p><img src="cid:a.png"><img src="cid:sub/b.png"></p>"#
        );
        assert_eq!(resources, vec!["a.png", "sub/b.png"]);
    }

    #[test]
    fn test_remote_images_kept() {
        let html = r#"<img src="https://cdn.example.com/a.png"><img src="HTTP://x/b.png">"#;
        let (rewritten, resources) = ImageInliner::new().inline(html).unwrap();

        assert_eq!(rewritten, html);
        assert!(resources.is_empty());
    }

    #[test]
    fn test_remote_images_rewritten_when_policy_says_so() {
        let html = r#"<img src="http://x/a.png">"#;
        let (rewritten, resources) = ImageInliner::new()
            .remote_policy(RemoteImagePolicy::Rewrite)
            .inline(html)
            .unwrap();

        assert_eq!(rewritten, r#"<img src="cid:http://x/a.png">"#);
        assert_eq!(resources, vec!["http://x/a.png"]);
    }

    #[test]
    fn test_img_without_src_untouched() {
        let html = r#"<img alt="no source"><img src="logo.png">"#;
        let (rewritten, resources) = ImageInliner::new().inline(html).unwrap();

        assert_eq!(
            rewritten,
            r#"<img alt="no source"><img src="cid:logo.png">"#
        );
        assert_eq!(resources, vec!["logo.png"]);
    }

    #[test]
    fn test_surrounding_markup_untouched() {
        let html = "<html><body><div>\n  test\n</div></body></html>";
        let (rewritten, resources) = ImageInliner::new().inline(html).unwrap();

        assert_eq!(rewritten, html);
        assert!(resources.is_empty());
    }
}
