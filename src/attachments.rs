//! Attachment storage and image-reference tokens.
//!
//! Document text never embeds image payloads. Inserted images are stored
//! here under an opaque id, and the text refers to them with an
//! `attachment:<id>` token. Every export boundary resolves tokens through
//! [`AttachmentResolver`].

use std::borrow::Borrow;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::util::{lcg_next, time_now_millis, time_seed_nanos};

/// Scheme prefix of an in-text image reference.
pub const ATTACHMENT_SCHEME: &str = "attachment:";

const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque identifier of one attachment within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn new(id: impl Into<String>) -> Self {
        AttachmentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The in-text token referring to this attachment.
    pub fn token(&self) -> String {
        format!("{}{}", ATTACHMENT_SCHEME, self.0)
    }
}

impl Borrow<str> for AttachmentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference token found in an image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRef<'a> {
    pub id: &'a str,
}

impl<'a> AttachmentRef<'a> {
    /// Recognize `attachment:<id>` and `attachment://<id>`.
    pub fn parse(src: &'a str) -> Option<Self> {
        let rest = src.trim().strip_prefix(ATTACHMENT_SCHEME)?;
        let id = rest.strip_prefix("//").unwrap_or(rest);
        if id.is_empty() {
            return None;
        }
        Some(AttachmentRef { id })
    }
}

/// Lookup seam between converters and whatever holds the payloads.
///
/// Lookups are pure and report `None` for dangling references.
pub trait AttachmentResolver {
    fn resolve_attachment(&self, id: &str) -> Option<&str>;
}

/// Resolver that knows no attachments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttachments;

impl AttachmentResolver for NoAttachments {
    fn resolve_attachment(&self, _id: &str) -> Option<&str> {
        None
    }
}

impl AttachmentResolver for HashMap<String, String> {
    fn resolve_attachment(&self, id: &str) -> Option<&str> {
        self.get(id).map(String::as_str)
    }
}

impl AttachmentResolver for BTreeMap<String, String> {
    fn resolve_attachment(&self, id: &str) -> Option<&str> {
        self.get(id).map(String::as_str)
    }
}

/// The attachments owned by a single document.
///
/// Append-only: entries are never updated or removed individually.
#[derive(Debug, Clone, Default)]
pub struct DocumentAttachments {
    entries: BTreeMap<AttachmentId, String>,
    rng: u64,
}

impl DocumentAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a document's attachments from a persisted id→payload map.
    pub fn from_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (AttachmentId(k.into()), v.into()))
                .collect(),
            rng: 0,
        }
    }

    /// Store a payload and return its freshly generated id.
    pub fn register(&mut self, payload: impl Into<String>) -> AttachmentId {
        let millis = time_now_millis();
        let id = loop {
            let candidate = AttachmentId(format!("img-{}-{}", millis, self.next_suffix()));
            if !self.entries.contains_key(&candidate) {
                break candidate;
            }
        };
        self.entries.insert(id.clone(), payload.into());
        log::debug!("registered attachment {}", id);
        id
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttachmentId, &str)> {
        self.entries.iter().map(|(id, payload)| (id, payload.as_str()))
    }

    /// Snapshot as a plain map, the shape hosts persist.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(id, payload)| (id.0.clone(), payload.clone()))
            .collect()
    }

    fn next_suffix(&mut self) -> String {
        if self.rng == 0 {
            self.rng = time_seed_nanos() | 1;
        }
        let mut suffix = String::with_capacity(SUFFIX_LEN);
        for _ in 0..SUFFIX_LEN {
            self.rng = lcg_next(self.rng);
            let index = (self.rng >> 33) as usize % SUFFIX_ALPHABET.len();
            suffix.push(SUFFIX_ALPHABET[index] as char);
        }
        suffix
    }
}

impl AttachmentResolver for DocumentAttachments {
    fn resolve_attachment(&self, id: &str) -> Option<&str> {
        self.resolve(id)
    }
}

/// Attachments for every open document, keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct AttachmentStore {
    documents: HashMap<String, DocumentAttachments>,
}

impl AttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, document_id: &str, payload: impl Into<String>) -> AttachmentId {
        self.documents
            .entry(document_id.to_string())
            .or_default()
            .register(payload)
    }

    pub fn resolve(&self, document_id: &str, id: &str) -> Option<&str> {
        self.documents.get(document_id)?.resolve(id)
    }

    pub fn document(&self, document_id: &str) -> Option<&DocumentAttachments> {
        self.documents.get(document_id)
    }

    /// Attach a previously persisted attachment set to a document.
    ///
    /// Merges into whatever the document already holds. Existing ids keep
    /// their payloads; only ids not yet present are added. Returns how many
    /// entries were added.
    pub fn insert_document(
        &mut self,
        document_id: &str,
        attachments: DocumentAttachments,
    ) -> usize {
        let current = self.documents.entry(document_id.to_string()).or_default();
        let mut added = 0;
        for (id, payload) in attachments.entries {
            if let Entry::Vacant(slot) = current.entries.entry(id) {
                slot.insert(payload);
                added += 1;
            }
        }
        if added > 0 {
            log::debug!("restored {} attachments for document {}", added, document_id);
        }
        added
    }

    /// Drop a document together with all of its attachments.
    pub fn remove_document(&mut self, document_id: &str) -> Option<DocumentAttachments> {
        self.documents.remove(document_id)
    }
}
