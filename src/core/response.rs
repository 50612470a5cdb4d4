//! Discord message-size utilities
//!
//! Chunking and truncation against the platform limits, plus the code block
//! wrapper used for error and list replies.

/// Discord embed description limit
pub const EMBED_LIMIT: usize = 4096;
/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Split text into chunks of at most `max_size` bytes, preferring line
/// boundaries and never splitting inside a UTF-8 character.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        // +1 for the newline that joins lines inside a chunk
        if !current.is_empty() && current.len() + line.len() + 1 > max_size {
            chunks.push(std::mem::take(&mut current));
        }
        if line.len() > max_size {
            // A single oversized line gets split on character boundaries.
            chunks.extend(split_oversized_line(line, max_size));
            continue;
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_oversized_line(line: &str, max_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Truncate text to the embed description limit on a UTF-8 boundary, with an
/// ellipsis when anything was cut.
pub fn truncate_for_embed(text: &str) -> String {
    truncate(text, EMBED_LIMIT)
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit - 3;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Wrap text in a fenced code block, truncating the body so the whole block
/// fits in one message.
pub fn code_block(lang: &str, body: &str) -> String {
    let overhead = lang.len() + 8; // ```lang\n ... \n```
    let body = truncate(body, MESSAGE_LIMIT.saturating_sub(overhead));
    format!("```{lang}\n{body}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(chunk_text("hello", 100), vec!["hello"]);
    }

    #[test]
    fn test_chunks_split_on_lines() {
        let text = "first\nsecond\nthird";
        let chunks = chunk_text(text, 13);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 13);
            assert!(!chunk.ends_with('\n'));
        }
    }

    #[test]
    fn test_oversized_line_is_split() {
        let chunks = chunk_text(&"x".repeat(90), 40);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 40));
    }

    #[test]
    fn test_chunk_utf8_boundaries() {
        let text = "héllo wörld ".repeat(300);
        for chunk in chunk_text(&text, MESSAGE_LIMIT) {
            assert!(chunk.len() <= MESSAGE_LIMIT);
            assert!(std::str::from_utf8(chunk.as_bytes()).is_ok());
        }
    }

    #[test]
    fn test_truncate_for_embed_short_passthrough() {
        assert_eq!(truncate_for_embed("short"), "short");
    }

    #[test]
    fn test_truncate_for_embed_cuts_with_ellipsis() {
        let out = truncate_for_embed(&"a".repeat(5000));
        assert!(out.len() <= EMBED_LIMIT);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_code_block_wraps() {
        let block = code_block("js", "boom");
        assert_eq!(block, "```js\nboom\n```");
    }

    #[test]
    fn test_code_block_fits_message_limit() {
        let block = code_block("", &"e".repeat(5000));
        assert!(block.len() <= MESSAGE_LIMIT);
        assert!(block.starts_with("```\n"));
        assert!(block.ends_with("\n```"));
    }
}
