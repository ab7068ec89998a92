//! Contract with the generative summary service
//!
//! The service itself lives outside this crate. This module builds what gets
//! sent to it (a prompt plus, for summaries, the JSON schema the answer must
//! follow), parses what comes back, and tracks the panel state shown next to
//! a week. Failures are reported to the reader as a single message and are
//! not retried.

use regex::Regex;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::LazyLock;

use crate::error::AssistantError;
use crate::feed::Week;
use crate::types::{AiContent, LearnMore, StreamItem, Summary};

pub const SUMMARY_CONTENT_LIMIT: usize = 300;
pub const LEARN_MORE_CONTENT_LIMIT: usize = 200;
pub const LEARN_MORE_CONTEXT_ITEMS: usize = 5;
pub const DEFAULT_COURSE_LANGUAGE: &str = "Finnish";
pub const NO_DUE_DATE: &str = "No due date mentioned";
pub const NO_EXPLANATION: &str = "No explanation available";

static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*|\*").unwrap());
static JSON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$").unwrap());

/// Drop emphasis markers and cut to `limit` characters.
pub fn condense_content(content: &str, limit: usize) -> String {
    EMPHASIS_RE
        .replace_all(content, "")
        .chars()
        .take(limit)
        .collect()
}

fn attachment_titles(item: &StreamItem) -> Vec<&str> {
    item.attachments.iter().map(|a| a.title.as_str()).collect()
}

/// Request for a weekly summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub week_title: String,
    pub course_language: String,
    pub items: Vec<Value>,
}

impl SummaryRequest {
    pub fn new<'a>(items: impl IntoIterator<Item = &'a StreamItem>, week_title: &str) -> Self {
        let items = items
            .into_iter()
            .map(|item| {
                json!({
                    "type": item.kind,
                    "author": item.author,
                    "date": item.date,
                    "content": condense_content(&item.content, SUMMARY_CONTENT_LIMIT),
                    "attachments": attachment_titles(item),
                })
            })
            .collect();
        Self {
            week_title: week_title.to_string(),
            course_language: DEFAULT_COURSE_LANGUAGE.to_string(),
            items,
        }
    }

    pub fn for_week(week: &Week<'_>) -> Self {
        Self::new(week.items.iter().copied(), week.title())
    }

    pub fn with_course_language(mut self, language: impl Into<String>) -> Self {
        self.course_language = language.into();
        self
    }

    pub fn prompt(&self) -> String {
        format!(
            "Analyze the following JSON data representing posts from a classroom course for {title}. \
             The course materials are mostly in {language}.\n\n\
             Write a concise summary in English containing:\n\
             1. A main title for the week's summary.\n\
             2. A few key points covering the most important topics or announcements.\n\
             3. Every assignment posted this week with its title and due date. \
             If no due date is given, use \"{NO_DUE_DATE}\".\n\n\
             Respond only with JSON in the requested format.\n\n\
             Stream data for the week:\n{items:#}\n",
            title = self.week_title,
            language = self.course_language,
            items = Value::Array(self.items.clone()),
        )
    }

    /// JSON schema the service must answer with.
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "A short title summarizing the week's content."
                },
                "keyPoints": {
                    "type": "ARRAY",
                    "description": "Key takeaways or important announcements from the week.",
                    "items": { "type": "STRING" }
                },
                "upcomingAssignments": {
                    "type": "ARRAY",
                    "description": "Every ASSIGNMENT item in the week.",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": { "type": "STRING", "description": "Assignment title." },
                            "dueDate": {
                                "type": "STRING",
                                "description": format!("Due date, or '{NO_DUE_DATE}'.")
                            }
                        },
                        "required": ["title", "dueDate"]
                    }
                }
            },
            "required": ["title", "keyPoints", "upcomingAssignments"]
        })
    }
}

/// Request for an explanation of one topic, with the week as context.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnMoreRequest {
    pub topic: String,
    pub course_language: String,
    pub context: Vec<Value>,
}

impl LearnMoreRequest {
    pub fn new<'a>(
        topic: &str,
        items: impl IntoIterator<Item = &'a StreamItem>,
    ) -> Result<Self, AssistantError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AssistantError::EmptyTopic);
        }
        let context = items
            .into_iter()
            .take(LEARN_MORE_CONTEXT_ITEMS)
            .map(|item| {
                json!({
                    "content": condense_content(&item.content, LEARN_MORE_CONTENT_LIMIT),
                    "attachments": attachment_titles(item),
                })
            })
            .collect();
        Ok(Self {
            topic: topic.to_string(),
            course_language: DEFAULT_COURSE_LANGUAGE.to_string(),
            context,
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "A student taking a {language} language course wants to learn more about \"{topic}\".\n\
             This week's course items for context:\n{context:#}\n\n\
             Explain \"{topic}\" in English, clearly and concisely, for a language learner.\n\
             - Start with a clear definition.\n\
             - Use bullet points for key aspects or rules where they help.\n\
             - Give simple examples in {language} with English translations.\n\
             - Stay focused and easy to follow.\n\
             - Format the whole answer as Markdown.\n",
            language = self.course_language,
            topic = self.topic,
            context = Value::Array(self.context.clone()),
        )
    }
}

/// Parse the service's JSON answer to a [`SummaryRequest`].
pub fn parse_summary(text: &str) -> Result<Summary, AssistantError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AssistantError::EmptyResponse);
    }
    let body = JSON_FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str());
    serde_json::from_str(body).map_err(AssistantError::MalformedSummary)
}

impl LearnMore {
    pub fn from_response(topic: &str, text: Option<&str>) -> Self {
        let explanation = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_EXPLANATION);
        Self {
            title: format!("Learn More: {}", topic.trim()),
            explanation: explanation.to_string(),
        }
    }
}

/// The generative summary service.
pub trait SummaryService {
    fn summarize_week(
        &self,
        request: &SummaryRequest,
    ) -> impl Future<Output = Result<Summary, AssistantError>> + Send;

    fn learn_more(
        &self,
        request: &LearnMoreRequest,
    ) -> impl Future<Output = Result<LearnMore, AssistantError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantAction {
    Summarize,
    LearnMore { topic: String },
}

impl AssistantAction {
    /// What the reader sees when the action fails.
    pub fn failure_message(&self) -> String {
        match self {
            AssistantAction::Summarize => {
                "Failed to generate summary. Please try again.".to_string()
            }
            AssistantAction::LearnMore { topic } => {
                format!("Failed to get details for \"{topic}\". Please try again.")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssistantPanel {
    #[default]
    Idle,
    Loading(AssistantAction),
    Ready(AiContent),
    Failed(String),
}

impl AssistantPanel {
    pub fn is_loading(&self) -> bool {
        matches!(self, AssistantPanel::Loading(_))
    }

    /// Run `action` for `week`, returning the panel's next state.
    ///
    /// A blank learn-more topic leaves the panel as it was without calling
    /// the service.
    pub async fn run<S: SummaryService>(
        self,
        service: &S,
        week: &Week<'_>,
        action: AssistantAction,
    ) -> AssistantPanel {
        let result = match &action {
            AssistantAction::Summarize => {
                let request = SummaryRequest::for_week(week);
                service
                    .summarize_week(&request)
                    .await
                    .map(AiContent::Summary)
            }
            AssistantAction::LearnMore { topic } => {
                let request = match LearnMoreRequest::new(topic, week.items.iter().copied()) {
                    Ok(request) => request,
                    Err(AssistantError::EmptyTopic) => return self,
                    Err(err) => return AssistantPanel::fail(&action, err),
                };
                service.learn_more(&request).await.map(AiContent::LearnMore)
            }
        };

        match result {
            Ok(content) => AssistantPanel::Ready(content),
            Err(err) => AssistantPanel::fail(&action, err),
        }
    }

    fn fail(action: &AssistantAction, err: AssistantError) -> AssistantPanel {
        tracing::error!(error = %err, ?action, "summary service call failed");
        AssistantPanel::Failed(action.failure_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;
    use crate::types::UpcomingAssignment;

    const FEED: &str = r#"{
        "2023-09-18": {
            "display_name": "Week 38",
            "items": [
                {"id": "1", "type": "ASSIGNMENT", "author": "Opettaja", "date": "18 Sept 2023",
                 "content": "**Essee** palautetaan *perjantaina*", "attachments": [
                    {"type": "DOCS", "title": "Ohjeet", "url": "https://docs.google.com/document/d/a/edit"}
                 ]},
                {"id": "2", "type": "ANNOUNCEMENT", "author": "Opettaja", "date": "19 Sept 2023",
                 "content": "Hei!", "attachments": []}
            ]
        }
    }"#;

    struct Canned {
        summary: Option<Summary>,
    }

    impl SummaryService for Canned {
        async fn summarize_week(&self, request: &SummaryRequest) -> Result<Summary, AssistantError> {
            assert_eq!(request.week_title, "Week 38");
            self.summary
                .clone()
                .ok_or_else(|| AssistantError::Service("quota exceeded".into()))
        }

        async fn learn_more(&self, request: &LearnMoreRequest) -> Result<LearnMore, AssistantError> {
            Ok(LearnMore::from_response(
                &request.topic,
                Some("**Partitiivi** is a case."),
            ))
        }
    }

    fn summary() -> Summary {
        Summary {
            title: "Essays".into(),
            key_points: vec!["Essay due Friday".into()],
            upcoming_assignments: vec![UpcomingAssignment {
                title: "Essee".into(),
                due_date: "22.9.".into(),
            }],
        }
    }

    #[test]
    fn test_condense_content() {
        assert_eq!(condense_content("**bold** and *em*", 300), "bold and em");
        assert_eq!(condense_content("äöåäöå", 3), "äöå");
    }

    #[test]
    fn test_summary_request() {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        let request = SummaryRequest::for_week(&week);
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0]["type"], "ASSIGNMENT");
        assert_eq!(request.items[0]["content"], "Essee palautetaan perjantaina");
        assert_eq!(request.items[0]["attachments"][0], "Ohjeet");

        let prompt = request.prompt();
        assert!(prompt.contains("Week 38"));
        assert!(prompt.contains("Finnish"));
        assert!(prompt.contains("\"author\": \"Opettaja\""));
    }

    #[test]
    fn test_response_schema_requires_fields() {
        let schema = SummaryRequest::response_schema();
        assert_eq!(
            schema["required"],
            json!(["title", "keyPoints", "upcomingAssignments"])
        );
    }

    #[test]
    fn test_learn_more_request() {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        let request = LearnMoreRequest::new("  partitiivi ", week.items.iter().copied()).unwrap();
        assert_eq!(request.topic, "partitiivi");
        assert_eq!(request.context.len(), 2);
        assert!(request.prompt().contains("\"partitiivi\""));

        assert!(matches!(
            LearnMoreRequest::new("   ", week.items.iter().copied()),
            Err(AssistantError::EmptyTopic)
        ));
    }

    #[test]
    fn test_learn_more_context_is_capped() {
        let item: StreamItem = serde_json::from_str(
            r#"{"id": "x", "type": "ANNOUNCEMENT", "author": "T", "date": "", "content": "c"}"#,
        )
        .unwrap();
        let items = vec![item; 8];
        let request = LearnMoreRequest::new("topic", &items).unwrap();
        assert_eq!(request.context.len(), LEARN_MORE_CONTEXT_ITEMS);
    }

    #[test]
    fn test_parse_summary() {
        let text = r#"
            {"title": "Essays", "keyPoints": ["Essay due Friday"],
             "upcomingAssignments": [{"title": "Essee", "dueDate": "22.9."}]}
        "#;
        assert_eq!(parse_summary(text).unwrap(), summary());

        let fenced = "```json\n{\"title\": \"T\", \"keyPoints\": [], \"upcomingAssignments\": []}\n```";
        assert_eq!(parse_summary(fenced).unwrap().title, "T");
    }

    #[test]
    fn test_parse_summary_errors() {
        assert!(matches!(parse_summary("  "), Err(AssistantError::EmptyResponse)));
        assert!(matches!(
            parse_summary("{\"title\": 3}"),
            Err(AssistantError::MalformedSummary(_))
        ));
    }

    #[test]
    fn test_learn_more_from_response() {
        let lm = LearnMore::from_response("Partitiivi", None);
        assert_eq!(lm.title, "Learn More: Partitiivi");
        assert_eq!(lm.explanation, NO_EXPLANATION);
        assert_eq!(
            LearnMore::from_response("x", Some("  ")).explanation,
            NO_EXPLANATION
        );
    }

    #[tokio::test]
    async fn test_panel_summarize() {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        let service = Canned {
            summary: Some(summary()),
        };
        let panel = AssistantPanel::Idle
            .run(&service, &week, AssistantAction::Summarize)
            .await;
        assert_eq!(panel, AssistantPanel::Ready(AiContent::Summary(summary())));
    }

    #[tokio::test]
    async fn test_panel_failure_is_opaque() {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        let service = Canned { summary: None };
        let panel = AssistantPanel::Idle
            .run(&service, &week, AssistantAction::Summarize)
            .await;
        assert_eq!(
            panel,
            AssistantPanel::Failed("Failed to generate summary. Please try again.".into())
        );
    }

    #[tokio::test]
    async fn test_panel_learn_more() {
        let feed = Feed::from_json(FEED).unwrap();
        let week = feed.week("2023-09-18").unwrap();
        let service = Canned { summary: None };

        let panel = AssistantPanel::Idle
            .run(
                &service,
                &week,
                AssistantAction::LearnMore {
                    topic: "Partitiivi".into(),
                },
            )
            .await;
        match panel {
            AssistantPanel::Ready(AiContent::LearnMore(lm)) => {
                assert_eq!(lm.title, "Learn More: Partitiivi");
            }
            other => panic!("unexpected panel state {other:?}"),
        }

        let unchanged = AssistantPanel::Idle
            .run(
                &service,
                &week,
                AssistantAction::LearnMore { topic: " ".into() },
            )
            .await;
        assert_eq!(unchanged, AssistantPanel::Idle);
    }

    #[test]
    fn test_failure_messages() {
        let action = AssistantAction::LearnMore {
            topic: "verbit".into(),
        };
        assert_eq!(
            action.failure_message(),
            "Failed to get details for \"verbit\". Please try again."
        );
    }
}
