//! Shared utilities for channel implementations.

/// Hard ceiling on a single Discord message, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Target size of a chunk produced by [`split_message`].
pub const CHUNK_LEN: usize = 1900;

/// Length of `text` in characters (Unicode scalar values).
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split a long message into chunks of at most `max_len` characters.
///
/// Lines are packed greedily and joined with `\n`. A line that would overflow
/// the current chunk starts a new one; a line longer than `max_len` is cut
/// into `max_len`-character slices, each its own chunk. An empty line that
/// lands on a chunk boundary is dropped.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = char_len(line);

        if current_len + line_len + 1 > max_len {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if line_len > max_len {
                chunks.extend(hard_split(line, max_len));
            } else {
                current.push_str(line);
                current_len = line_len;
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Cut `line` into consecutive slices of `max_len` characters.
fn hard_split(line: &str, max_len: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let head = truncate_chars(rest, max_len.max(1));
        out.push(head.to_string());
        rest = &rest[head.len()..];
    }
    out
}
