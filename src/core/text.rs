//! Text helpers shared by command handlers and dispatch
//!
//! Mention cleaning, snowflake validation, ad scrubbing and permission name
//! formatting. These are pure functions; cache-dependent helpers like emote
//! replacement live on the command context.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Strip Discord mention wrappers from a query, leaving the bare id (or the
/// trimmed input when it was not a mention).
///
/// Handles user (`<@123>`, `<@!123>`), channel (`<#123>`), role (`<@&123>`)
/// and emoji (`<a:name:123>`) forms.
pub fn clean_mention_id(input: &str) -> &str {
    let s = input.trim();
    let s = match s.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        Some(inner) => inner,
        None => s,
    };
    let s = s.trim_start_matches(['@', '!', '#', '&']);
    match s.rfind(':') {
        Some(idx) => &s[idx + 1..],
        None => s,
    }
}

/// Parse a snowflake id out of a raw string or mention.
///
/// Ids are 18-20 decimal digits; anything else is rejected.
pub fn parse_snowflake(input: &str) -> Option<u64> {
    let s = clean_mention_id(input);
    if (18..=20).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn invite_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:https?://)?(?:www\.)?(?:discord\.gg|discord(?:app)?\.com/invite)/[\w-]+")
            .expect("invite pattern is valid")
    })
}

/// Scrub server invite links out of outgoing text.
pub fn ad_check(content: &str) -> String {
    invite_regex().replace_all(content, "`[AD]`").into_owned()
}

/// Build a literal-match regex for cache queries.
///
/// The query is escaped, so user input can never change the match semantics;
/// the only supported flag is `i` for case-insensitive matching.
pub fn query_regex(query: &str, flags: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(flags.contains('i'))
        .build()
}

/// Format a permission name the way the role embed displays it:
/// `Manage Messages` -> `'MANAGE_MESSAGES'`.
pub fn emphasize_perm(name: &str) -> String {
    format!("'{}'", name.to_uppercase().replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_mention_id_user() {
        assert_eq!(clean_mention_id("<@123456789012345678>"), "123456789012345678");
        assert_eq!(clean_mention_id("<@!123456789012345678>"), "123456789012345678");
    }

    #[test]
    fn test_clean_mention_id_role_and_channel() {
        assert_eq!(clean_mention_id("<@&123456789012345678>"), "123456789012345678");
        assert_eq!(clean_mention_id("<#123456789012345678>"), "123456789012345678");
    }

    #[test]
    fn test_clean_mention_id_emoji() {
        assert_eq!(clean_mention_id("<a:blob:123456789012345678>"), "123456789012345678");
        assert_eq!(clean_mention_id("<:blob:123456789012345678>"), "123456789012345678");
    }

    #[test]
    fn test_clean_mention_id_passthrough() {
        assert_eq!(clean_mention_id("  hello world "), "hello world");
        assert_eq!(clean_mention_id("123456789012345678"), "123456789012345678");
    }

    #[test]
    fn test_parse_snowflake_valid() {
        assert_eq!(parse_snowflake("123456789012345678"), Some(123456789012345678));
        assert_eq!(parse_snowflake("<@123456789012345678>"), Some(123456789012345678));
    }

    #[test]
    fn test_parse_snowflake_rejects_short_and_junk() {
        assert_eq!(parse_snowflake("12345"), None);
        assert_eq!(parse_snowflake("not an id"), None);
        assert_eq!(parse_snowflake(""), None);
        // 21 digits is one too many
        assert_eq!(parse_snowflake("123456789012345678901"), None);
    }

    #[test]
    fn test_ad_check_scrubs_invites() {
        let scrubbed = ad_check("join discord.gg/abc123 now");
        assert!(!scrubbed.contains("discord.gg"));
        assert!(scrubbed.contains("`[AD]`"));

        let scrubbed = ad_check("https://discord.com/invite/xyz");
        assert!(!scrubbed.contains("invite/xyz"));
    }

    #[test]
    fn test_ad_check_leaves_normal_text() {
        let text = "we talked about discord bots today";
        assert_eq!(ad_check(text), text);
    }

    #[test]
    fn test_query_regex_escapes_metacharacters() {
        let re = query_regex("a.b*c", "").unwrap();
        assert!(re.is_match("a.b*c"));
        assert!(!re.is_match("axbbc"));
    }

    #[test]
    fn test_query_regex_case_insensitive_flag() {
        let re = query_regex("Sha", "i").unwrap();
        assert!(re.is_match("SHABOT"));
        let re = query_regex("Sha", "").unwrap();
        assert!(!re.is_match("shabot"));
    }

    #[test]
    fn test_emphasize_perm() {
        assert_eq!(emphasize_perm("Manage Messages"), "'MANAGE_MESSAGES'");
        assert_eq!(emphasize_perm("Administrator"), "'ADMINISTRATOR'");
    }
}
