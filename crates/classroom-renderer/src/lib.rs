//! Classroom renderer
//!
//! Turns an exported classroom stream (weekly posts, assignments and their
//! attachments) into readable HTML: attachment preview decisions, the
//! lightweight markup used in posts and assistant replies, week pages, and
//! the request/response contract of the week summary assistant.

pub mod assistant;
pub mod config;
pub mod embed;
pub mod error;
pub mod feed;
pub mod markup;
pub mod page;
pub mod types;

pub use config::ViewerConfig;
pub use embed::{EmbedDecision, EmbedKind, Resolver, resolve};
pub use error::{AssistantError, ClassroomError, ConfigError, FeedError};
pub use feed::{Feed, Week};
pub use markup::{render, render_assistant};
pub use page::{render_ai_content, render_week_page};
