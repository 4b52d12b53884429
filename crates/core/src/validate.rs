use std::sync::LazyLock;

use regex::Regex;

static ARTICLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // title excludes every line terminator, not only '\n'
    Regex::new(r"^https?://(www\.)?([a-z]{2})\.wikipedia\.org/wiki/([^\r\n\x{2028}\x{2029}]+)$")
        .expect("article pattern is a valid regex")
});

const FORBIDDEN_CHARS: [char; 8] = ['#', '<', '>', '[', ']', '|', '{', '}'];

/// A Wikipedia article reference pulled out of a valid URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiArticle {
    /// Two-letter language subdomain, e.g. "en".
    pub lang: String,
    /// Article title with underscores shown as spaces.
    pub title: String,
}

/// Check whether `text` is a Wikipedia article URL the backend accepts.
///
/// Only `http(s)://[www.]<xx>.wikipedia.org/wiki/<title>` passes, and the whole
/// string must not contain any of `# < > [ ] | { }`.
pub fn is_valid_url(text: &str) -> bool {
    ARTICLE_PATTERN.is_match(text) && !text.contains(FORBIDDEN_CHARS)
}

/// Split a valid article URL into language and title.
pub fn parse_article(text: &str) -> Option<WikiArticle> {
    if !is_valid_url(text) {
        return None;
    }
    let caps = ARTICLE_PATTERN.captures(text)?;
    let raw_title = caps.get(3)?.as_str();
    let title = raw_title.rsplit('/').next().unwrap_or(raw_title);

    Some(WikiArticle {
        lang: caps[2].to_string(),
        title: title.replace('_', " "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_article_url() {
        assert!(is_valid_url("https://en.wikipedia.org/wiki/Cat"));
        assert!(is_valid_url("http://de.wikipedia.org/wiki/Katze"));
        assert!(is_valid_url("https://www.fr.wikipedia.org/wiki/Chat_domestique"));
    }

    #[test]
    fn rejects_forbidden_characters() {
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/Cat#History"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/<script>"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/List[1]"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/A|B"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/{x}"));
    }

    #[test]
    fn rejects_bad_scheme_host_or_path() {
        assert!(!is_valid_url("ftp://en.wikipedia.org/wiki/Cat"));
        assert!(!is_valid_url("https://en.wikipedia.org/notwiki/Cat"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/"));
        assert!(!is_valid_url("https://english.wikipedia.org/wiki/Cat"));
        assert!(!is_valid_url("https://EN.wikipedia.org/wiki/Cat"));
        assert!(!is_valid_url("https://en.wikipedia.com/wiki/Cat"));
        assert!(!is_valid_url(" https://en.wikipedia.org/wiki/Cat"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn query_strings_pass_the_pattern() {
        // only the listed characters are forbidden; '?' is not one of them
        assert!(is_valid_url("https://en.wikipedia.org/wiki/Cat?action=raw"));
    }

    #[test]
    fn newline_in_title_is_rejected() {
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/Cat\nDog"));
    }

    #[test]
    fn other_line_terminators_are_rejected() {
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/Cat\rDog"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/\r"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/Cat\u{2028}"));
        assert!(!is_valid_url("https://en.wikipedia.org/wiki/Cat\u{2029}Dog"));
    }

    #[test]
    fn non_ascii_titles_are_accepted() {
        assert!(is_valid_url("https://ru.wikipedia.org/wiki/Кошка"));
    }

    #[test]
    fn parse_article_extracts_lang_and_title() {
        let article = parse_article("https://www.en.wikipedia.org/wiki/Rust_(programming_language)")
            .expect("valid article");
        assert_eq!(article.lang, "en");
        assert_eq!(article.title, "Rust (programming language)");
    }

    #[test]
    fn parse_article_rejects_invalid_url() {
        assert_eq!(parse_article("https://en.wikipedia.org/wiki/Cat#History"), None);
    }
}
