use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `**...**` where the span may cross line breaks.
static BOLD_MULTILINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*(.*?)\*\*").unwrap());

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Single-asterisk emphasis. The opening star must be followed by a
/// non-space so a `* ` list marker never opens a span.
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*\n]*?)\*").unwrap());

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

pub fn bold(input: &str, span_lines: bool) -> String {
    let re = if span_lines { &BOLD_MULTILINE_RE } else { &BOLD_RE };
    re.replace_all(input, |caps: &Captures| format!("<strong>{}</strong>", &caps[1]))
        .into_owned()
}

pub fn italic(input: &str) -> String {
    ITALIC_RE
        .replace_all(input, |caps: &Captures| format!("<em>{}</em>", &caps[1]))
        .into_owned()
}

pub fn code(input: &str, class: &str) -> String {
    CODE_RE
        .replace_all(input, |caps: &Captures| {
            if class.is_empty() {
                format!("<code>{}</code>", &caps[1])
            } else {
                format!("<code class=\"{class}\">{}</code>", &caps[1])
            }
        })
        .into_owned()
}
