use serde::{Deserialize, Serialize};

/// Declared kind of an attachment, as tagged in the exported dataset.
///
/// The tag is not always trustworthy: the exporter is known to mark audio
/// files as `IMAGE`, so preview decisions look at the URL and title too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttachmentType {
    Docs,
    Video,
    Pdf,
    Link,
    Image,
    Drive,
}

impl AttachmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentType::Docs => "DOCS",
            AttachmentType::Video => "VIDEO",
            AttachmentType::Pdf => "PDF",
            AttachmentType::Link => "LINK",
            AttachmentType::Image => "IMAGE",
            AttachmentType::Drive => "DRIVE",
        }
    }
}

impl std::fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttachmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DOCS" => Ok(AttachmentType::Docs),
            "VIDEO" => Ok(AttachmentType::Video),
            "PDF" => Ok(AttachmentType::Pdf),
            "LINK" => Ok(AttachmentType::Link),
            "IMAGE" => Ok(AttachmentType::Image),
            "DRIVE" => Ok(AttachmentType::Drive),
            other => Err(format!("unknown attachment type: {other}")),
        }
    }
}

/// A linked external resource on a stream item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub title: String,
    pub url: String,
}

impl Attachment {
    pub fn new(kind: AttachmentType, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamItemType {
    Announcement,
    Assignment,
}

/// One announcement or assignment post in the archived feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamItem {
    /// Externally sourced, unique across the whole dataset. Used as the
    /// anchor for deep links.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StreamItemType,
    pub author: String,
    pub date: String,
    #[serde(default)]
    pub deleted: bool,
    /// Raw markup, rendered with [`crate::markup::render`].
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl StreamItem {
    pub fn is_assignment(&self) -> bool {
        self.kind == StreamItemType::Assignment
    }
}

/// All items for one week, keyed in the dataset by the week's start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyData {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub items: Vec<StreamItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAssignment {
    pub title: String,
    pub due_date: String,
}

/// Weekly digest produced by the summary service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub title: String,
    pub key_points: Vec<String>,
    pub upcoming_assignments: Vec<UpcomingAssignment>,
}

/// Explanation of a single topic. `explanation` is markdown and goes through
/// the assistant markup flavor before display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnMore {
    pub title: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum AiContent {
    Summary(Summary),
    LearnMore(LearnMore),
}

/// How stream item cards are laid out on a week page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardViewMode {
    #[default]
    Grid,
    List,
}

impl std::str::FromStr for CardViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(CardViewMode::Grid),
            "list" => Ok(CardViewMode::List),
            other => Err(format!("expected `grid` or `list`, got `{other}`")),
        }
    }
}
