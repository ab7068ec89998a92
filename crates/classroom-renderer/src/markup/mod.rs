//! Lightweight markup to HTML
//!
//! Item content and assistant output use a small markdown-like syntax. Text
//! goes through a fixed pipeline of [`Stage`]s, each a plain string rewrite
//! of the previous stage's output:
//!
//! - content: emoticons, bold (may span lines), bullet lists, paragraphs
//! - assistant: bold, italic, inline code, bullet lists (`+` allowed),
//!   paragraphs
//!
//! Rendering never fails. Markup that does not match (an unclosed `**`, a
//! stray `-` mid-sentence) comes out as literal text. Input is trusted
//! course material and is not sanitized.

pub mod block;
pub mod emoticon;
pub mod inline;


pub use block::ListMarkers;

/// One rewrite step of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Emoticons,
    Bold { span_lines: bool },
    Italic,
    InlineCode,
    BulletLists(ListMarkers),
    Paragraphs,
}

impl Stage {
    pub fn apply(&self, input: &str, classes: &MarkupClasses) -> String {
        match self {
            Stage::Emoticons => emoticon::substitute(input),
            Stage::Bold { span_lines } => inline::bold(input, *span_lines),
            Stage::Italic => inline::italic(input),
            Stage::InlineCode => inline::code(input, &classes.code),
            Stage::BulletLists(markers) => block::bullet_lists(input, *markers, &classes.list),
            Stage::Paragraphs => block::paragraphs(input),
        }
    }
}

const CONTENT_STAGES: &[Stage] = &[
    Stage::Emoticons,
    Stage::Bold { span_lines: true },
    Stage::BulletLists(ListMarkers::StarDash),
    Stage::Paragraphs,
];

const ASSISTANT_STAGES: &[Stage] = &[
    Stage::Bold { span_lines: false },
    Stage::Italic,
    Stage::InlineCode,
    Stage::BulletLists(ListMarkers::StarDashPlus),
    Stage::Paragraphs,
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// Course-authored stream item content.
    #[default]
    Content,
    /// Markdown returned by the summary service.
    Assistant,
}

impl Flavor {
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Flavor::Content => CONTENT_STAGES,
            Flavor::Assistant => ASSISTANT_STAGES,
        }
    }
}

/// CSS classes put on generated elements. Empty strings omit the attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupClasses {
    pub list: String,
    pub code: String,
}

impl MarkupClasses {
    pub fn for_flavor(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Content => Self {
                list: "list-disc list-inside space-y-1 my-2".to_string(),
                code: String::new(),
            },
            Flavor::Assistant => Self {
                list: "list-disc list-inside space-y-1".to_string(),
                code: "bg-gray-200 text-red-600 font-mono text-sm px-1 py-0.5 rounded"
                    .to_string(),
            },
        }
    }

    pub fn bare() -> Self {
        Self {
            list: String::new(),
            code: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    flavor: Flavor,
    classes: MarkupClasses,
}

impl Renderer {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            classes: MarkupClasses::for_flavor(flavor),
        }
    }

    pub fn with_classes(mut self, classes: MarkupClasses) -> Self {
        self.classes = classes;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn render(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let mut html = text.to_string();
        for stage in self.flavor.stages() {
            html = stage.apply(&html, &self.classes);
        }
        html
    }
}

/// Render stream item content with default classes.
pub fn render(text: &str) -> String {
    Renderer::new(Flavor::Content).render(text)
}

/// Render assistant markdown with default classes.
pub fn render_assistant(text: &str) -> String {
    Renderer::new(Flavor::Assistant).render(text)
}
