//! Attachment handling on Markdown source text.
//!
//! Source text refers to stored images with `![alt](attachment:<id>)`.
//! These helpers rewrite those tokens for the places the text leaves the
//! editor: plain-markup export, preview rendering, and image insertion.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use crate::attachments::{AttachmentId, AttachmentResolver, DocumentAttachments};

/// Longest derived title, in characters.
pub const TITLE_LIMIT: usize = 30;

/// `![alt](attachment:id)` as written by the editor, or the `attachment://id` spelling.
static IMAGE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[(.*?)\]\(attachment:(?://)?([a-zA-Z0-9-]+)\)").unwrap()
});

/// Image targets in either token spelling, keeping the surrounding syntax.
static IMAGE_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!\[[^\]]*\]\()attachment:(?://)?([a-zA-Z0-9-]+)(\))").unwrap()
});

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
static FIRST_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(.+)$").unwrap());

/// Make exported Markdown self-contained.
///
/// Each resolvable `![alt](attachment:id)` becomes the reference-style
/// `![alt][id]`, and a `[id]: <payload>` definition is appended after a
/// blank line. Dangling tokens are left exactly as written. Text without
/// resolvable tokens is returned unchanged.
///
/// ```
/// use std::collections::HashMap;
/// use prosedoc::markdown::hydrate_references;
///
/// let mut store = HashMap::new();
/// store.insert("img-1".to_string(), "data:image/png;base64,AA==".to_string());
///
/// let out = hydrate_references("![cat](attachment:img-1) ![dog](attachment:img-2)", &store);
/// assert_eq!(
///     out,
///     "![cat][img-1] ![dog](attachment:img-2)\n\n[img-1]: data:image/png;base64,AA==\n"
/// );
/// ```
pub fn hydrate_references(content: &str, resolver: &dyn AttachmentResolver) -> String {
    let mut definitions = String::new();
    let mut defined = HashSet::new();

    let rewritten = IMAGE_TOKEN_RE.replace_all(content, |caps: &Captures| {
        let alt = &caps[1];
        let id = &caps[2];
        match resolver.resolve_attachment(id) {
            Some(payload) => {
                if defined.insert(id.to_string()) {
                    definitions.push_str(&format!("[{}]: {}\n", id, payload));
                }
                format!("![{}][{}]", alt, id)
            }
            None => {
                log::debug!("leaving dangling attachment reference {} in place", id);
                caps[0].to_string()
            }
        }
    });

    let mut out = rewritten.into_owned();
    if !definitions.is_empty() {
        out.push_str("\n\n");
        out.push_str(&definitions);
    }
    out
}

/// Substitute payloads for attachment image targets before rendering.
///
/// Dangling references stay as tokens so the renderer shows a broken image.
pub fn inline_attachments(content: &str, resolver: &dyn AttachmentResolver) -> String {
    IMAGE_TARGET_RE
        .replace_all(content, |caps: &Captures| {
            match resolver.resolve_attachment(&caps[2]) {
                Some(payload) => format!("{}{}{}", &caps[1], payload, &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Result of splicing an image reference into source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInsertion {
    pub content: String,
    /// Byte offset just past the inserted text.
    pub caret: usize,
    pub id: AttachmentId,
}

/// Store `payload` and replace `selection` with a reference to it.
///
/// The selection is in byte offsets; it is clamped to the text and widened
/// outwards to character boundaries.
pub fn insert_image(
    content: &str,
    selection: Range<usize>,
    payload: impl Into<String>,
    attachments: &mut DocumentAttachments,
) -> ImageInsertion {
    let id = attachments.register(payload);
    let snippet = format!("\n![Image]({})\n", id.token());

    let (start, end) = if selection.start <= selection.end {
        (selection.start, selection.end)
    } else {
        (selection.end, selection.start)
    };
    let start = floor_boundary(content, start);
    let end = ceil_boundary(content, end);

    let mut out = String::with_capacity(content.len() + snippet.len());
    out.push_str(&content[..start]);
    out.push_str(&snippet);
    out.push_str(&content[end..]);

    ImageInsertion {
        content: out,
        caret: start + snippet.len(),
        id,
    }
}

/// Title for a document: its first `# ` heading, else its first non-empty
/// line, trimmed and cut to [`TITLE_LIMIT`] characters.
///
/// ```
/// use prosedoc::markdown::derive_title;
///
/// assert_eq!(derive_title("intro\n# Meeting notes\n"), "Meeting notes");
/// assert_eq!(derive_title("\n\njust text"), "just text");
/// assert_eq!(derive_title(""), "Untitled");
/// ```
pub fn derive_title(content: &str) -> String {
    let line = HEADING_RE
        .captures(content)
        .or_else(|| FIRST_LINE_RE.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_default();

    let title: String = line.chars().take(TITLE_LIMIT).collect();
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}

fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
