use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Runs of lines starting with `*` or `-` and a space or tab. Whitespace
/// never crosses a line break, so blank lines end a run.
static LIST_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:[ \t]*([*-])[ \t].*(?:\r?\n|$))+").unwrap());

/// Same as [`LIST_RUN_RE`] with `+` accepted as a marker too.
static LIST_RUN_PLUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:[ \t]*([*+-])[ \t].*(?:\r?\n|$))+").unwrap());

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[*-][ \t]").unwrap());
static LIST_MARKER_PLUS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[*+-][ \t]").unwrap());

static LIST_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ul\b[^>]*>.*?</ul>").unwrap());
static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());
static NEWLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").unwrap());

/// Which characters open a bullet line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListMarkers {
    /// `*` and `-`
    StarDash,
    /// `*`, `-` and `+`
    StarDashPlus,
}

impl ListMarkers {
    fn run_re(&self) -> &'static Regex {
        match self {
            ListMarkers::StarDash => &LIST_RUN_RE,
            ListMarkers::StarDashPlus => &LIST_RUN_PLUS_RE,
        }
    }

    fn marker_re(&self) -> &'static Regex {
        match self {
            ListMarkers::StarDash => &LIST_MARKER_RE,
            ListMarkers::StarDashPlus => &LIST_MARKER_PLUS_RE,
        }
    }
}

fn open_list(out: &mut String, class: &str) {
    if class.is_empty() {
        out.push_str("<ul>");
    } else {
        out.push_str("<ul class=\"");
        out.push_str(class);
        out.push_str("\">");
    }
}

/// Group bullet runs into `<ul>` blocks. Lines outside a run are left as
/// they are.
pub fn bullet_lists(input: &str, markers: ListMarkers, class: &str) -> String {
    let marker_re = markers.marker_re();
    markers
        .run_re()
        .replace_all(input, |caps: &Captures| {
            let mut out = String::new();
            open_list(&mut out, class);
            for line in NEWLINE_RE.split(caps[0].trim()) {
                let content = marker_re.replace(line.trim(), "");
                out.push_str("<li>");
                out.push_str(&content);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
            out
        })
        .into_owned()
}

/// Wrap everything that is not already a `<ul>` block into paragraphs.
///
/// Text is split on blank lines. Each block becomes a `<p>` with its line
/// breaks turned into `<br />`. Extra blank lines produce a bare `<br />`.
pub fn paragraphs(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut last = 0;
    for list in LIST_BLOCK_RE.find_iter(input) {
        wrap_segment(&input[last..list.start()], &mut out);
        out.push_str(list.as_str());
        last = list.end();
    }
    wrap_segment(&input[last..], &mut out);
    out
}

fn wrap_segment(segment: &str, out: &mut String) {
    let segment = segment.trim();
    if segment.is_empty() {
        return;
    }
    for block in BLANK_LINE_RE.split(segment) {
        let block = block.trim();
        if block.is_empty() {
            out.push_str("<br />");
            continue;
        }
        out.push_str("<p>");
        out.push_str(&NEWLINE_RE.replace_all(block, "<br />"));
        out.push_str("</p>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_run() {
        assert_eq!(
            bullet_lists("* one\n- two", ListMarkers::StarDash, ""),
            "<ul><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn test_run_keeps_surrounding_text() {
        assert_eq!(
            bullet_lists("Intro\n* a\n* b\nOutro", ListMarkers::StarDash, "l"),
            "Intro\n<ul class=\"l\"><li>a</li><li>b</li></ul>Outro"
        );
    }

    #[test]
    fn test_plus_marker_per_flavor() {
        assert_eq!(bullet_lists("+ a", ListMarkers::StarDash, ""), "+ a");
        assert_eq!(
            bullet_lists("+ a", ListMarkers::StarDashPlus, ""),
            "<ul><li>a</li></ul>"
        );
    }

    #[test]
    fn test_blank_line_ends_run() {
        assert_eq!(
            bullet_lists("* a\n\n* b", ListMarkers::StarDash, ""),
            "<ul><li>a</li></ul>\n<ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_bare_marker_line_is_not_a_list() {
        let text = "Price list\n-\nWelcome everyone";
        assert_eq!(bullet_lists(text, ListMarkers::StarDash, ""), text);
    }

    #[test]
    fn test_marker_mid_line_is_literal() {
        let text = "minus - sign and * star";
        assert_eq!(bullet_lists(text, ListMarkers::StarDash, ""), text);
    }

    #[test]
    fn test_paragraph_split_on_blank_lines() {
        assert_eq!(
            paragraphs("first\nline\n\nsecond"),
            "<p>first<br />line</p><p>second</p>"
        );
    }

    #[test]
    fn test_extra_blank_lines_become_break() {
        assert_eq!(paragraphs("a\n\n\n\nb"), "<p>a</p><br /><p>b</p>");
    }

    #[test]
    fn test_list_blocks_pass_through() {
        assert_eq!(
            paragraphs("<ul><li>x</li></ul>\ntail\n\n<ul><li>y</li></ul>"),
            "<ul><li>x</li></ul><p>tail</p><ul><li>y</li></ul>"
        );
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(paragraphs(""), "");
        assert_eq!(paragraphs(" \n\n \t"), "");
    }
}
