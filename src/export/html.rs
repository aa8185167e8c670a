//! Standalone HTML exporter.

use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex_lite::{Captures, Regex};

use crate::attachments::AttachmentResolver;
use crate::error::Result;

use super::{ExportArtifact, ExportFormat, ExportRequest, Exporter, RenderedInput};

/// `src="attachment:id"` in either quote style and token spelling.
static ATTACHMENT_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\bsrc\s*=\s*["'])attachment:(?://)?([a-zA-Z0-9-]+)(["'])"#).unwrap()
});

const STYLESHEET: &str = r#"body {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
  line-height: 1.6;
  max-width: 800px;
  margin: 0 auto;
  padding: 2rem;
  color: #24292e;
}
img { max-width: 100%; }
pre { background: #f6f8fa; padding: 16px; border-radius: 6px; overflow: auto; }
code { font-family: SFMono-Regular, Consolas, "Liberation Mono", Menlo, monospace; font-size: 85%; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #dfe2e5; padding: 6px 13px; }
th { background-color: #f6f8fa; }
blockquote { border-left: 0.25em solid #dfe2e5; color: #6a737d; padding: 0 1em; margin: 0; }
a { color: #0366d6; text-decoration: none; }
a:hover { text-decoration: underline; }"#;

/// Configuration for HTML export.
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Replace attachment image sources with their data payloads.
    pub inline_attachments: bool,
    /// Extra CSS appended after the built-in stylesheet.
    pub extra_css: Option<String>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            inline_attachments: true,
            extra_css: None,
        }
    }
}

/// Exports the rendered preview as one self-contained page.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    config: HtmlConfig,
}

impl HtmlExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: HtmlConfig) -> Self {
        self.config = config;
        self
    }

    fn page(&self, title: &str, body: &str) -> String {
        let mut css = String::from(STYLESHEET);
        if let Some(extra) = &self.config.extra_css {
            css.push('\n');
            css.push_str(extra);
        }
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{}</title>
<style>
{}
</style>
</head>
<body>
{}
</body>
</html>
"#,
            escape(title),
            css,
            body
        )
    }
}

impl Exporter for HtmlExporter {
    fn export(&self, request: &ExportRequest<'_>) -> Result<ExportArtifact> {
        let body = match request.rendered_for(ExportFormat::Html)? {
            RenderedInput::Html(html) => html.to_string(),
            RenderedInput::Tree(tree) => tree.inner_html(tree.body()),
        };
        let body = if self.config.inline_attachments {
            inline_sources(&body, request.attachments)
        } else {
            body
        };

        let page = self.page(&request.document.title, &body);
        Ok(ExportArtifact::new(
            request.document,
            ExportFormat::Html,
            page.into_bytes(),
        ))
    }
}

/// Swap resolvable attachment sources for their payloads.
fn inline_sources(html: &str, resolver: &dyn AttachmentResolver) -> String {
    ATTACHMENT_SRC_RE
        .replace_all(html, |caps: &Captures| {
            match resolver.resolve_attachment(&caps[2]) {
                Some(payload) => format!("{}{}{}", &caps[1], escape(payload), &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
