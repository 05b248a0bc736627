//! Greedy word wrapping.
//!
//! Input is tokenized first (see [`super::token`]), so hyperlink spans are never broken and no
//! width decision ever sees partial markup. Tokens are never split: a token wider than the budget
//! gets a line to itself and overflows.

use super::{TextMeasurer, TextStyle, Token, tokenize};
use crate::Result;
use crate::config::require_positive;
use crate::model::Line;

/// Wraps `text` into lines no wider than `max_width_px`.
///
/// Always returns at least one line: empty or whitespace-only input yields a single empty line.
pub fn wrap_text(
    text: &str,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    max_width_px: f64,
) -> Result<Vec<Line>> {
    let lines = wrap_tokens(tokenize(text), measurer, style, max_width_px)?;
    tracing::debug!(
        chars = text.chars().count(),
        max_width_px,
        lines = lines.len(),
        "wrapped text"
    );
    Ok(lines)
}

/// Greedy accumulation over pre-tokenized input.
pub fn wrap_tokens(
    tokens: Vec<Token>,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    max_width_px: f64,
) -> Result<Vec<Line>> {
    let max_width_px = require_positive("wrap.maxWidth", max_width_px)?;
    require_positive("font.sizePx", style.size_px)?;

    let separator = measurer.measure_width(" ", style);

    let mut lines: Vec<Line> = Vec::new();
    let mut cur: Vec<Token> = Vec::new();
    let mut cur_width = 0.0;

    for token in tokens {
        let token_width = measurer.measure_width(&token.visible, style);

        if !cur.is_empty() {
            let candidate = cur_width + separator + token_width;
            if candidate <= max_width_px {
                cur_width = candidate;
                cur.push(token);
                continue;
            }
            tracing::trace!(
                line = lines.len(),
                width = cur_width,
                next = %token.source,
                "line break"
            );
            lines.push(Line::new(std::mem::take(&mut cur), cur_width));
        }

        if token_width > max_width_px {
            tracing::warn!(
                token = %token.source,
                token_width,
                max_width_px,
                "token wider than line budget; placing it on its own line"
            );
        }
        cur_width = token_width;
        cur.push(token);
    }

    // An all-whitespace input still produces exactly one (empty) line.
    if !cur.is_empty() || lines.is_empty() {
        lines.push(Line::new(cur, cur_width));
    }
    Ok(lines)
}

/// Wraps and returns only the line texts (with link markup intact).
pub fn wrap_text_lines(
    text: &str,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    max_width_px: f64,
) -> Result<Vec<String>> {
    Ok(wrap_text(text, measurer, style, max_width_px)?
        .into_iter()
        .map(|l| l.text)
        .collect())
}

/// Width of the widest line, or `0.0` for no lines.
pub fn max_line_width(lines: &[Line]) -> f64 {
    lines.iter().map(|l| l.width).fold(0.0, f64::max)
}
