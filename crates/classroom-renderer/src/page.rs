//! Static HTML output for a week of the stream.
//!
//! Writes into any [`std::fmt::Write`]. Item content and assistant markdown
//! are rendered with [`crate::markup`] and injected as-is; everything else
//! placed in markup (authors, dates, titles, URLs) is escaped.

use std::fmt::{self, Write};

use crate::assistant::AssistantPanel;
use crate::config::ViewerConfig;
use crate::embed::{AttachmentIcon, EmbedDecision, EmbedKind, Resolver, is_embeddable};
use crate::feed::Week;
use crate::markup::Renderer;
use crate::types::{AiContent, Attachment, CardViewMode, LearnMore, StreamItem, Summary};

pub const IFRAME_ALLOW: &str = "autoplay; encrypted-media; picture-in-picture";
pub const IFRAME_SANDBOX: &str = "allow-scripts allow-same-origin allow-presentation";

pub fn escape_html<W: Write>(writer: &mut W, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '>' => writer.write_str("&gt;")?,
            '"' => writer.write_str("&quot;")?,
            _ => writer.write_char(c)?,
        }
    }
    Ok(())
}

/// Anchor of an attachment's preview inside its item card.
pub fn preview_anchor(item: &StreamItem, index: usize) -> String {
    format!("{}-attachment-{}", item.id, index)
}

pub struct PageWriter<W: Write> {
    writer: W,
    card_view: CardViewMode,
    resolver: Resolver,
    content: Renderer,
    assistant: Renderer,
}

impl<W: Write> PageWriter<W> {
    pub fn new(writer: W, config: &ViewerConfig) -> Self {
        Self {
            writer,
            card_view: config.card_view,
            resolver: config.resolver(),
            content: config.content_renderer(),
            assistant: config.assistant_renderer(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn text(&mut self, text: &str) -> fmt::Result {
        escape_html(&mut self.writer, text)
    }

    pub fn write_document(&mut self, week: &Week<'_>, panel: Option<&AssistantPanel>) -> fmt::Result {
        let title = week.title();
        self.writer.write_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n")?;
        self.writer.write_str("  <meta charset=\"utf-8\">\n")?;
        self.writer.write_str(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        )?;
        self.writer.write_str("  <title>")?;
        self.text(title)?;
        self.writer.write_str("</title>\n</head>\n<body>\n")?;

        self.writer.write_str("<main data-week=\"")?;
        self.text(week.key)?;
        self.writer.write_str("\">\n<h1>")?;
        self.text(title)?;
        self.writer.write_str("</h1>\n")?;

        let layout = match self.card_view {
            CardViewMode::Grid => "stream stream-grid",
            CardViewMode::List => "stream stream-list",
        };
        writeln!(self.writer, "<div class=\"{layout}\">")?;
        if week.items.is_empty() {
            self.writer.write_str("<p class=\"empty\">No posts this week.</p>\n")?;
        }
        for item in &week.items {
            self.write_item(item)?;
        }
        self.writer.write_str("</div>\n")?;

        if let Some(panel) = panel {
            self.write_assistant_panel(panel)?;
        }

        self.writer.write_str("</main>\n</body>\n</html>\n")
    }

    pub fn write_item(&mut self, item: &StreamItem) -> fmt::Result {
        let kind = if item.is_assignment() {
            "assignment"
        } else {
            "announcement"
        };
        self.writer.write_str("<article id=\"")?;
        self.text(&item.id)?;
        write!(self.writer, "\" class=\"stream-item {kind}")?;
        if item.deleted {
            self.writer.write_str(" deleted")?;
        }
        self.writer.write_str("\">\n<header><span class=\"author\">")?;
        self.text(&item.author)?;
        self.writer.write_str("</span> <time>")?;
        self.text(&item.date)?;
        self.writer.write_str("</time>")?;
        if item.deleted {
            self.writer.write_str(" <span class=\"deleted\">(Deleted)</span>")?;
        }
        self.writer.write_str("</header>\n<div class=\"content\">")?;
        let html = self.content.render(&item.content);
        self.writer.write_str(&html)?;
        self.writer.write_str("</div>\n")?;

        if !item.attachments.is_empty() {
            self.writer
                .write_str("<footer class=\"attachments\">\n<h4>Attachments</h4>\n")?;
            for (index, attachment) in item.attachments.iter().enumerate() {
                self.write_attachment_chip(item, index, attachment)?;
            }
            self.writer.write_str("</footer>\n")?;

            let mut previews = item
                .attachments
                .iter()
                .enumerate()
                .filter(|(_, attachment)| is_embeddable(attachment.kind))
                .peekable();
            if previews.peek().is_some() {
                self.writer.write_str("<section class=\"previews\">\n")?;
                for (index, attachment) in previews {
                    let decision = self.resolver.resolve(attachment);
                    self.writer.write_str("<figure id=\"")?;
                    self.text(&preview_anchor(item, index))?;
                    self.writer.write_str("\">")?;
                    self.write_preview(attachment, &decision)?;
                    self.writer.write_str("<figcaption>")?;
                    self.text(&attachment.title)?;
                    self.writer.write_str("</figcaption></figure>\n")?;
                }
                self.writer.write_str("</section>\n")?;
            }
        }

        self.writer.write_str("</article>\n")
    }

    /// Embeddable attachments link to their preview on the page, the rest
    /// open externally.
    pub fn write_attachment_chip(
        &mut self,
        item: &StreamItem,
        index: usize,
        attachment: &Attachment,
    ) -> fmt::Result {
        let icon = AttachmentIcon::for_attachment(attachment);
        write!(
            self.writer,
            "<a class=\"attachment-chip\" data-icon=\"{}\" href=\"",
            icon.as_str()
        )?;
        if is_embeddable(attachment.kind) {
            self.writer.write_char('#')?;
            self.text(&preview_anchor(item, index))?;
            self.writer.write_str("\">")?;
        } else {
            self.text(&attachment.url)?;
            self.writer
                .write_str("\" target=\"_blank\" rel=\"noopener noreferrer\">")?;
        }
        self.text(&attachment.title)?;
        self.writer.write_str("</a>\n")
    }

    pub fn write_preview(&mut self, attachment: &Attachment, decision: &EmbedDecision) -> fmt::Result {
        match decision.kind {
            EmbedKind::Iframe => {
                self.writer.write_str("<iframe src=\"")?;
                self.text(&decision.resolved_url)?;
                self.writer.write_str("\" title=\"")?;
                self.text(&attachment.title)?;
                write!(
                    self.writer,
                    "\" allow=\"{IFRAME_ALLOW}\" allowfullscreen sandbox=\"{IFRAME_SANDBOX}\"></iframe>"
                )
            }
            EmbedKind::Image => {
                self.writer.write_str("<img src=\"")?;
                self.text(&decision.resolved_url)?;
                self.writer.write_str("\" alt=\"")?;
                self.text(&attachment.title)?;
                self.writer.write_str("\">")
            }
            EmbedKind::Audio => {
                self.writer.write_str("<audio controls src=\"")?;
                self.text(&decision.resolved_url)?;
                self.writer
                    .write_str("\">Your browser does not support the audio element.</audio>")
            }
            EmbedKind::Unsupported => {
                self.writer.write_str(
                    "<div class=\"preview-unavailable\"><h3>Preview not available</h3>\
                     <p>This content can't be shown here, but you can open it in a new tab.</p>\
                     <a href=\"",
                )?;
                self.text(&decision.resolved_url)?;
                self.writer.write_str(
                    "\" target=\"_blank\" rel=\"noopener noreferrer\">Open in New Tab</a></div>",
                )
            }
        }
    }

    pub fn write_assistant_panel(&mut self, panel: &AssistantPanel) -> fmt::Result {
        self.writer.write_str("<aside class=\"assistant\">\n")?;
        match panel {
            AssistantPanel::Idle => {}
            AssistantPanel::Loading(_) => {
                self.writer.write_str("<p class=\"loading\">Thinking…</p>\n")?;
            }
            AssistantPanel::Ready(content) => self.write_ai_content(content)?,
            AssistantPanel::Failed(message) => {
                self.writer.write_str("<p class=\"error\">")?;
                self.text(message)?;
                self.writer.write_str("</p>\n")?;
            }
        }
        self.writer.write_str("</aside>\n")
    }

    pub fn write_ai_content(&mut self, content: &AiContent) -> fmt::Result {
        match content {
            AiContent::Summary(summary) => self.write_summary(summary),
            AiContent::LearnMore(learn_more) => self.write_learn_more(learn_more),
        }
    }

    fn write_summary(&mut self, summary: &Summary) -> fmt::Result {
        self.writer.write_str("<section class=\"summary\">\n<h3>")?;
        self.text(&summary.title)?;
        self.writer.write_str("</h3>\n<h4>Key Points</h4>\n<ul>")?;
        for point in &summary.key_points {
            self.writer.write_str("<li>")?;
            self.text(point)?;
            self.writer.write_str("</li>")?;
        }
        self.writer.write_str("</ul>\n")?;
        if !summary.upcoming_assignments.is_empty() {
            self.writer.write_str("<h4>Upcoming Assignments</h4>\n")?;
            for assignment in &summary.upcoming_assignments {
                self.writer.write_str("<div class=\"assignment\"><p>")?;
                self.text(&assignment.title)?;
                self.writer.write_str("</p><span class=\"due\">")?;
                self.text(&assignment.due_date)?;
                self.writer.write_str("</span></div>\n")?;
            }
        }
        self.writer.write_str("</section>\n")
    }

    fn write_learn_more(&mut self, learn_more: &LearnMore) -> fmt::Result {
        self.writer.write_str("<section class=\"learn-more\">\n<h3>")?;
        self.text(&learn_more.title)?;
        self.writer.write_str("</h3>\n<div class=\"explanation\">")?;
        let html = self.assistant.render(&learn_more.explanation);
        self.writer.write_str(&html)?;
        self.writer.write_str("</div>\n</section>\n")
    }
}

pub fn render_week_page(
    week: &Week<'_>,
    panel: Option<&AssistantPanel>,
    config: &ViewerConfig,
) -> Result<String, fmt::Error> {
    let mut output = PageWriter::new(String::new(), config);
    output.write_document(week, panel)?;
    Ok(output.into_inner())
}

pub fn render_ai_content(content: &AiContent, config: &ViewerConfig) -> Result<String, fmt::Error> {
    let mut output = PageWriter::new(String::new(), config);
    output.write_ai_content(content)?;
    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;
    use crate::types::{AttachmentType, UpcomingAssignment};

    const FEED: &str = r#"{
        "2023-09-18": {
            "display_name": "Week 38 <draft>",
            "items": [
                {"id": "post-1", "type": "ASSIGNMENT", "author": "Ope & co", "date": "18 Sept 2023",
                 "deleted": true, "content": "**Essee**\n* kohta", "attachments": [
                    {"type": "VIDEO", "title": "Luento", "url": "https://youtu.be/dQw4w9WgXcQ"},
                    {"type": "LINK", "title": "Sanakirja", "url": "https://example.com/?a=1&b=2"},
                    {"type": "IMAGE", "title": "lecture.mp3", "url": "https://files.example.com/9"}
                 ]}
            ]
        }
    }"#;

    fn page(config: &ViewerConfig) -> String {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        render_week_page(&week, None, config).unwrap()
    }

    #[test]
    fn test_escape_html() {
        let mut out = String::new();
        escape_html(&mut out, "<a href=\"x\">&</a>").unwrap();
        assert_eq!(out, "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_week_page() {
        let html = page(&ViewerConfig::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Week 38 &lt;draft&gt;</title>"));
        assert!(html.contains("<article id=\"post-1\" class=\"stream-item assignment deleted\">"));
        assert!(html.contains("<span class=\"author\">Ope &amp; co</span>"));
        assert!(html.contains("(Deleted)"));
        assert!(html.contains("<strong>Essee</strong>"));
        assert!(html.contains("<li>kohta</li>"));
        assert!(html.contains("class=\"stream stream-grid\""));
    }

    #[test]
    fn test_attachment_chips() {
        let html = page(&ViewerConfig::default());
        assert!(html.contains(
            "<a class=\"attachment-chip\" data-icon=\"YOUTUBE\" href=\"#post-1-attachment-0\">Luento</a>"
        ));
        assert!(html.contains(
            "href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\">Sanakirja</a>"
        ));
        assert!(html.contains("data-icon=\"MP3\" href=\"#post-1-attachment-2\""));
    }

    #[test]
    fn test_previews() {
        let html = page(&ViewerConfig::default());
        assert!(html.contains("<iframe src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\""));
        assert!(html.contains("<audio controls src=\"https://files.example.com/9\">"));
        assert!(!html.contains("id=\"post-1-attachment-1\""));
    }

    #[test]
    fn test_list_view() {
        let config = ViewerConfig {
            card_view: CardViewMode::List,
            ..ViewerConfig::default()
        };
        assert!(page(&config).contains("class=\"stream stream-list\""));
    }

    #[test]
    fn test_unsupported_preview() {
        let attachment = Attachment::new(AttachmentType::Pdf, "Monisteet", "https://example.com/m");
        let decision = EmbedDecision::unsupported(attachment.url.as_str());
        let mut writer = PageWriter::new(String::new(), &ViewerConfig::default());
        writer.write_preview(&attachment, &decision).unwrap();
        let html = writer.into_inner();
        assert!(html.contains("Preview not available"));
        assert!(html.contains("<a href=\"https://example.com/m\" target=\"_blank\""));
    }

    #[test]
    fn test_summary_panel() {
        let content = AiContent::Summary(Summary {
            title: "Viikko".into(),
            key_points: vec!["Koe <perjantaina>".into()],
            upcoming_assignments: vec![UpcomingAssignment {
                title: "Essee".into(),
                due_date: "No due date mentioned".into(),
            }],
        });
        let html = render_ai_content(&content, &ViewerConfig::default()).unwrap();
        insta::assert_snapshot!(html, @r#"
        <section class="summary">
        <h3>Viikko</h3>
        <h4>Key Points</h4>
        <ul><li>Koe &lt;perjantaina&gt;</li></ul>
        <h4>Upcoming Assignments</h4>
        <div class="assignment"><p>Essee</p><span class="due">No due date mentioned</span></div>
        </section>
        "#);
    }

    #[test]
    fn test_learn_more_panel() {
        let content = AiContent::LearnMore(LearnMore {
            title: "Learn More: verbit".into(),
            explanation: "Use `olla`.".into(),
        });
        let html = render_ai_content(&content, &ViewerConfig::default()).unwrap();
        assert!(html.contains("<h3>Learn More: verbit</h3>"));
        assert!(html.contains("<p>Use <code class="));
    }

    #[test]
    fn test_failed_panel() {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        let panel = AssistantPanel::Failed("Failed to generate summary. Please try again.".into());
        let html = render_week_page(&week, Some(&panel), &ViewerConfig::default()).unwrap();
        assert!(html.contains(
            "<aside class=\"assistant\">\n<p class=\"error\">Failed to generate summary. Please try again.</p>"
        ));
    }
}
