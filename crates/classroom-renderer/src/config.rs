use crate::embed::Resolver;
use crate::error::ConfigError;
use crate::markup::{Flavor, MarkupClasses, Renderer};
use crate::types::CardViewMode;

/// Viewer settings passed explicitly to everything that renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub card_view: CardViewMode,
    /// Drop the declared-video iframe guess and link out instead.
    pub strict_embeds: bool,
    pub content_classes: MarkupClasses,
    pub assistant_classes: MarkupClasses,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            card_view: CardViewMode::default(),
            strict_embeds: false,
            content_classes: MarkupClasses::for_flavor(Flavor::Content),
            assistant_classes: MarkupClasses::for_flavor(Flavor::Assistant),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `CLASSROOM_CARD_VIEW`: `grid` or `list` (default: grid)
    /// - `CLASSROOM_STRICT_EMBEDS`: `true`/`false`, `1`/`0` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ViewerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("CLASSROOM_CARD_VIEW") {
            config.card_view = value
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    var: "CLASSROOM_CARD_VIEW",
                    message,
                })?;
        }

        if let Some(value) = lookup("CLASSROOM_STRICT_EMBEDS") {
            config.strict_embeds = parse_flag(&value).ok_or_else(|| ConfigError::InvalidValue {
                var: "CLASSROOM_STRICT_EMBEDS",
                message: format!("expected a boolean, got `{value}`"),
            })?;
        }

        Ok(config)
    }

    pub fn resolver(&self) -> Resolver {
        if self.strict_embeds {
            Resolver::strict()
        } else {
            Resolver::default()
        }
    }

    pub fn content_renderer(&self) -> Renderer {
        Renderer::new(Flavor::Content).with_classes(self.content_classes.clone())
    }

    pub fn assistant_renderer(&self) -> Renderer {
        Renderer::new(Flavor::Assistant).with_classes(self.assistant_classes.clone())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
