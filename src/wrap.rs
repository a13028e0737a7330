//! Text wrapping: prompt to bounded-width lines.

use crate::params::{MAX_CHARS_IN_LINE, MAX_LINES};
use crate::{Error, Result};

/// Lower-case and trim a raw prompt.
pub fn sanitize_prompt(prompt: &str) -> String {
    prompt.to_lowercase().trim().to_string()
}

/// Split a sanitized prompt into lines of at most [`MAX_CHARS_IN_LINE`]
/// characters.
///
/// Words are packed greedily: a word joins the current line only if
/// `len(line) + 1 + len(word) < MAX_CHARS_IN_LINE`. Words longer than a line
/// are hard-split into full-width chunks; the last chunk stays open so the
/// next word may still be packed after it. Lengths count `char`s.
///
/// Fails with [`Error::PromptTooLong`] when the result exceeds [`MAX_LINES`]
/// and with [`Error::EmptyPrompt`] when there is no word at all.
pub fn wrap_lines(prompt: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for word in prompt.split_whitespace() {
        current = Some(match current.take() {
            None => wrap_word(word, &mut lines),
            Some(mut line) => {
                let width = char_len(&line) + 1 + char_len(word);
                if width < MAX_CHARS_IN_LINE {
                    line.push(' ');
                    line.push_str(word);
                    line
                } else {
                    lines.push(line);
                    wrap_word(word, &mut lines)
                }
            }
        });
    }

    match current {
        Some(line) => lines.push(line),
        None => return Err(Error::EmptyPrompt),
    }

    if lines.len() > MAX_LINES {
        return Err(Error::PromptTooLong {
            lines: lines.len(),
            max: MAX_LINES,
        });
    }

    Ok(lines)
}

/// Push every full chunk of `word` to `lines` and return the final chunk,
/// which becomes the open line.
fn wrap_word(word: &str, lines: &mut Vec<String>) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut chunks = chars.chunks(MAX_CHARS_IN_LINE).peekable();
    while let Some(chunk) = chunks.next() {
        let chunk: String = chunk.iter().collect();
        if chunks.peek().is_none() {
            return chunk;
        }
        lines.push(chunk);
    }
    String::new()
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
