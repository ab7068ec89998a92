//! Attachment preview resolution
//!
//! Classifies an attachment into the way it can be previewed inline (iframe,
//! image, audio) and computes the canonical embeddable URL. Classification is
//! an ordered chain of [`EmbedRule`]s; the first rule that matches decides.
//!
//! Resolution is pure pattern matching over the URL, title and declared type.
//! Nothing is fetched.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::types::{Attachment, AttachmentType};

/// Not anchored to a host: any URL with a `v/` or `embed/` segment followed
/// by an 11 character id matches too.
pub static VIDEO_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").unwrap()
});

pub static CLOUD_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"drive\.google\.com/(?:file/d/|open\?id=)([a-zA-Z0-9_-]+)").unwrap()
});

pub static CLOUD_DOCUMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"docs\.google\.com/(?:document|presentation|spreadsheets)/d/([a-zA-Z0-9_-]+)")
        .unwrap()
});

static IMAGE_EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(png|jpg|jpeg|gif|webp|svg)$").unwrap());

static AUDIO_EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.mp3$").unwrap());

/// Video identifiers on the video host are always this many characters.
pub const VIDEO_ID_LEN: usize = 11;

pub const VIDEO_EMBED_BASE: &str = "https://www.youtube.com/embed/";
pub const CLOUD_FILE_BASE: &str = "https://drive.google.com/file/d/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    Iframe,
    Image,
    Audio,
    /// No inline preview. Callers offer an "open externally" link instead.
    Unsupported,
}

impl EmbedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedKind::Iframe => "iframe",
            EmbedKind::Image => "image",
            EmbedKind::Audio => "audio",
            EmbedKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to preview an attachment and which URL to point the preview at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDecision {
    pub kind: EmbedKind,
    pub resolved_url: String,
}

impl EmbedDecision {
    pub fn new(kind: EmbedKind, resolved_url: impl Into<String>) -> Self {
        Self {
            kind,
            resolved_url: resolved_url.into(),
        }
    }

    pub fn unsupported(url: impl Into<String>) -> Self {
        Self::new(EmbedKind::Unsupported, url)
    }

    pub fn is_previewable(&self) -> bool {
        self.kind != EmbedKind::Unsupported
    }
}

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedRule {
    /// Watch, embed and short-link video URLs with an 11 character id.
    VideoHost,
    /// `drive.google.com/file/d/<id>` and `drive.google.com/open?id=<id>`.
    /// Matches whatever the declared type is: the file service previews
    /// video, images and PDFs through the same surface.
    CloudFile,
    /// Document, presentation and spreadsheet edit links.
    CloudDocument,
    /// URL or title ends in a known image extension.
    ImageExtension,
    /// URL or title ends in `.mp3`. Ahead of [`EmbedRule::DeclaredImage`] so
    /// mis-tagged audio still plays.
    AudioExtension,
    DeclaredImage,
    /// Declared video that matched nothing above gets iframed as-is. This is
    /// a guess and the target may refuse to be framed.
    DeclaredVideo,
}

impl EmbedRule {
    pub fn apply(&self, attachment: &Attachment) -> Option<EmbedDecision> {
        let url = attachment.url.as_str();
        let title = attachment.title.as_str();
        match self {
            EmbedRule::VideoHost => {
                let caps = VIDEO_HOST_RE.captures(url)?;
                let id = caps.get(2)?.as_str();
                (id.chars().count() == VIDEO_ID_LEN).then(|| {
                    EmbedDecision::new(EmbedKind::Iframe, format!("{VIDEO_EMBED_BASE}{id}"))
                })
            }
            EmbedRule::CloudFile => {
                let id = CLOUD_FILE_RE.captures(url)?.get(1)?.as_str();
                Some(EmbedDecision::new(
                    EmbedKind::Iframe,
                    format!("{CLOUD_FILE_BASE}{id}/preview"),
                ))
            }
            EmbedRule::CloudDocument => CLOUD_DOCUMENT_RE
                .is_match(url)
                .then(|| EmbedDecision::new(EmbedKind::Iframe, canonical_document_url(url))),
            EmbedRule::ImageExtension => (IMAGE_EXTENSION_RE.is_match(url)
                || IMAGE_EXTENSION_RE.is_match(title))
            .then(|| EmbedDecision::new(EmbedKind::Image, url)),
            EmbedRule::AudioExtension => (AUDIO_EXTENSION_RE.is_match(url)
                || AUDIO_EXTENSION_RE.is_match(title))
            .then(|| EmbedDecision::new(EmbedKind::Audio, url)),
            EmbedRule::DeclaredImage => (attachment.kind == AttachmentType::Image)
                .then(|| EmbedDecision::new(EmbedKind::Image, url)),
            EmbedRule::DeclaredVideo => (attachment.kind == AttachmentType::Video)
                .then(|| EmbedDecision::new(EmbedKind::Iframe, url)),
        }
    }
}

/// Strip the `/edit` segment and anything from the query or fragment on,
/// then point at the preview surface.
fn canonical_document_url(url: &str) -> String {
    let without_edit = url.replacen("/edit", "", 1);
    let end = without_edit.find(['?', '#']).unwrap_or(without_edit.len());
    format!("{}/preview", &without_edit[..end])
}

pub const DEFAULT_RULES: &[EmbedRule] = &[
    EmbedRule::VideoHost,
    EmbedRule::CloudFile,
    EmbedRule::CloudDocument,
    EmbedRule::ImageExtension,
    EmbedRule::AudioExtension,
    EmbedRule::DeclaredImage,
    EmbedRule::DeclaredVideo,
];

/// Same as [`DEFAULT_RULES`] without the declared-video guess.
pub const STRICT_RULES: &[EmbedRule] = &[
    EmbedRule::VideoHost,
    EmbedRule::CloudFile,
    EmbedRule::CloudDocument,
    EmbedRule::ImageExtension,
    EmbedRule::AudioExtension,
    EmbedRule::DeclaredImage,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    rules: &'static [EmbedRule],
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }
}

impl Resolver {
    pub fn strict() -> Self {
        Self {
            rules: STRICT_RULES,
        }
    }

    pub fn with_rules(rules: &'static [EmbedRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [EmbedRule] {
        self.rules
    }

    /// Total: every attachment gets a decision, unsupported being the
    /// fallback with the original URL kept.
    pub fn resolve(&self, attachment: &Attachment) -> EmbedDecision {
        for rule in self.rules {
            if let Some(decision) = rule.apply(attachment) {
                tracing::debug!(
                    ?rule,
                    url = %attachment.url,
                    kind = %decision.kind,
                    "resolved attachment embed"
                );
                return decision;
            }
        }
        tracing::debug!(url = %attachment.url, "no inline preview for attachment");
        EmbedDecision::unsupported(attachment.url.as_str())
    }
}

/// Resolve with the default rule chain.
pub fn resolve(attachment: &Attachment) -> EmbedDecision {
    Resolver::default().resolve(attachment)
}

/// Whether an attachment chip opens the inline viewer rather than linking
/// out. Keyed on the declared type only; mis-tagged mp3s are declared
/// `IMAGE` and so still land in the viewer.
pub fn is_embeddable(kind: AttachmentType) -> bool {
    matches!(
        kind,
        AttachmentType::Pdf | AttachmentType::Docs | AttachmentType::Video | AttachmentType::Image
    )
}

/// Icon shown on an attachment chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttachmentIcon {
    Youtube,
    Zoom,
    Mp3,
    Declared(AttachmentType),
}

impl AttachmentIcon {
    pub fn for_attachment(attachment: &Attachment) -> Self {
        let url = attachment.url.as_str();
        if url.contains("youtube.com") || url.contains("youtu.be") {
            AttachmentIcon::Youtube
        } else if url.contains("zoom.us") {
            AttachmentIcon::Zoom
        } else if attachment.title.to_lowercase().ends_with(".mp3") {
            AttachmentIcon::Mp3
        } else {
            AttachmentIcon::Declared(attachment.kind)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentIcon::Youtube => "YOUTUBE",
            AttachmentIcon::Zoom => "ZOOM",
            AttachmentIcon::Mp3 => "MP3",
            AttachmentIcon::Declared(kind) => kind.as_str(),
        }
    }
}
