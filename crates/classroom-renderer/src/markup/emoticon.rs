/// ASCII emoticons and their emoji. Replacement runs top to bottom, each
/// token literally and globally.
pub const EMOTICONS: &[(&str, &str)] = &[
    (":D", "😀"),
    (":)", "🙂"),
    (":-)", "🙂"),
    (":(", "🙁"),
    (":-(", "🙁"),
    (";)", "😉"),
    (";-)", "😉"),
    (":o", "😮"),
    (":O", "😮"),
    (":p", "😛"),
    (":P", "😛"),
    ("<3", "❤️"),
    (":/", "😕"),
    (":\\", "😕"),
    ("xD", "😆"),
    ("XD", "😆"),
    // house emoticon used by the course instructor
    ("=db=)", "👍"),
];

pub fn substitute(input: &str) -> String {
    let mut out = input.to_string();
    for (token, emoji) in EMOTICONS {
        if out.contains(token) {
            out = out.replace(token, emoji);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_faces() {
        assert_eq!(substitute("hi :) bye :("), "hi 🙂 bye 🙁");
        assert_eq!(substitute(":-) ;-) <3"), "🙂 😉 ❤️");
    }

    #[test]
    fn test_custom_token() {
        assert_eq!(substitute("great work =db=)"), "great work 👍");
    }

    #[test]
    fn test_backslash_token() {
        assert_eq!(substitute("hmm :\\"), "hmm 😕");
    }

    #[test]
    fn test_every_occurrence_replaced() {
        assert_eq!(substitute(":D:D :D"), "😀😀 😀");
    }

    #[test]
    fn test_no_tokens_untouched() {
        let text = "Nothing to see here.";
        assert_eq!(substitute(text), text);
    }
}
