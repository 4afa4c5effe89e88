//! Markup stripping and text cleanup for rendered post content.
//!
//! WordPress returns titles and bodies as rendered HTML fragments with
//! character references for typographic punctuation (`&#8211;` for an en
//! dash, `&#8212;` for an em dash, and so on). This module turns those
//! fragments into clean text:
//!
//! 1. Character references (decimal, hex, and common named forms) decode to
//!    their Unicode code points.
//! 2. Tags are stripped, well-formed or not; in line-break mode block-level
//!    tag boundaries become newlines, otherwise plain separators.
//! 3. Control characters and invisible Unicode (zero-width spaces, BOM,
//!    soft hyphens) are removed and whitespace runs collapse to a single
//!    space (or at most one blank line in line-break mode).
//!
//! Decoding and stripping happen in a single pass: a decoded `<` or `>` is
//! emitted as literal text and never re-read as tag syntax. Stripping first
//! and decoding afterwards - the obvious two-pass layout - silently corrupts
//! content such as `&lt;b&gt;` and is exactly the bug this module replaces.
//!
//! Everything here is pure; no I/O, no state.

mod entities;

use entities::decode_reference;
use tracing::instrument;

/// Tags whose boundaries break the flow of text.
///
/// The usual block-element set, plus the row/list containers that commonly
/// wrap them.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "br",
    "div",
    "li",
    "ul",
    "ol",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "tr",
    "blockquote",
];

/// How a stripped tag separates the text around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagBoundary {
    /// Inline tag (`<em>`, `<a>`, ...): plain separator.
    Inline,
    /// Block-level tag (`<p>`, `<br>`, `<h2>`, ...): line break when
    /// line breaks are preserved.
    Block,
}

/// Normalizes rendered markup into single-line text.
///
/// All whitespace (including newlines) collapses to single spaces and the
/// result is trimmed. Used for titles.
#[must_use]
#[instrument(level = "trace", skip(raw), fields(len = raw.len()))]
pub fn clean_html(raw: &str) -> String {
    normalize(raw, false)
}

/// Normalizes rendered markup while preserving paragraph structure.
///
/// Block-level tag boundaries and literal newlines survive as line breaks,
/// capped at one blank line between paragraphs. Used for post bodies.
#[must_use]
#[instrument(level = "trace", skip(raw), fields(len = raw.len()))]
pub fn clean_html_with_line_breaks(raw: &str) -> String {
    normalize(raw, true)
}

fn normalize(raw: &str, preserve_line_breaks: bool) -> String {
    let stripped = strip_markup(raw, preserve_line_breaks);
    collapse_whitespace(&stripped, preserve_line_breaks)
}

/// Single pass over the input: strips tags and decodes character
/// references in text positions.
fn strip_markup(raw: &str, preserve_line_breaks: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => {
                let (boundary, consumed) = skip_tag(rest);
                if preserve_line_breaks && boundary == TagBoundary::Block {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
                rest = &rest[consumed..];
            }
            '&' => {
                if let Some((decoded, consumed)) = decode_reference(rest) {
                    out.push(decoded);
                    rest = &rest[consumed..];
                } else {
                    out.push('&');
                    rest = &rest[1..];
                }
            }
            _ => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

/// Consumes one tag starting at `<`, returning its boundary kind and the
/// number of bytes consumed.
///
/// An unterminated tag or comment consumes the remainder of the input, so
/// malformed markup can never leak `<`/`>` into the output.
fn skip_tag(rest: &str) -> (TagBoundary, usize) {
    debug_assert!(rest.starts_with('<'));

    if let Some(after) = rest.strip_prefix("<!--") {
        let consumed = after
            .find("-->")
            .map_or(rest.len(), |i| 4 + i + "-->".len());
        return (TagBoundary::Inline, consumed);
    }

    let body = rest[1..].strip_prefix('/').unwrap_or(&rest[1..]);
    let name: String = body
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    let boundary = if BLOCK_TAGS.contains(&name.to_ascii_lowercase().as_str()) {
        TagBoundary::Block
    } else {
        TagBoundary::Inline
    };

    let consumed = rest.find('>').map_or(rest.len(), |i| i + 1);
    (boundary, consumed)
}

/// Removes invisible characters and collapses whitespace runs.
///
/// In line-break mode newline runs are capped at two (one blank line) and
/// win over surrounding spaces; otherwise every run becomes one space.
/// Leading and trailing whitespace never reaches the output.
fn collapse_whitespace(text: &str, preserve_line_breaks: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut pending_newlines: u8 = 0;

    for ch in text.chars() {
        if is_invisible(ch) {
            continue;
        }
        if ch == '\n' && preserve_line_breaks {
            pending_newlines = (pending_newlines + 1).min(2);
        } else if ch.is_whitespace() {
            pending_space = true;
        } else {
            if !out.is_empty() {
                if pending_newlines > 0 {
                    for _ in 0..pending_newlines {
                        out.push('\n');
                    }
                } else if pending_space {
                    out.push(' ');
                }
            }
            pending_space = false;
            pending_newlines = 0;
            out.push(ch);
        }
    }

    out
}

/// ASCII control characters (tab/newline/carriage-return excepted) and
/// invisible Unicode that causes display issues downstream.
fn is_invisible(ch: char) -> bool {
    matches!(ch,
        '\u{0000}'..='\u{0008}'
        | '\u{000B}'
        | '\u{000C}'
        | '\u{000E}'..='\u{001F}'
        | '\u{007F}'
        | '\u{00AD}'
        | '\u{200B}'..='\u{200F}'
        | '\u{2028}'
        | '\u{2029}'
        | '\u{FEFF}')
}
