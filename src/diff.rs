//! Semantic diff rendering for long mismatches.
//!
//! When colored output is enabled and either text is long, a failure shows one merged
//! diff instead of two full renderings. Text present only in the actual value is red,
//! text the expected value has but the actual lacks is green. Whitespace inside changed
//! segments is replaced with visible glyphs so a stray tab or line break can be seen.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::config::{Config, OutputMode};

// ============================================================================
// GLYPHS
// ============================================================================

const SPACE_GLYPH: char = '․';
const TAB_GLYPH: char = '↦';
const CR_GLYPH: char = '␍';
const LF_GLYPH: char = '↵';

/// Makes whitespace visible. Line feeds keep their line break after the glyph.
pub fn visible_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' ' => out.push(SPACE_GLYPH),
            '\t' => out.push(TAB_GLYPH),
            '\r' => out.push(CR_GLYPH),
            '\n' => {
                out.push(LF_GLYPH);
                out.push('\n');
            }
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// DIFF COMPUTATION
// ============================================================================

/// One run of the merged diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Same(String),
    /// `removed` exists only in the actual text, `added` only in the expected text.
    Edit { removed: String, added: String },
}

impl Chunk {
    fn edit_size(&self) -> usize {
        match self {
            Chunk::Same(_) => 0,
            Chunk::Edit { removed, added } => removed.chars().count() + added.chars().count(),
        }
    }
}

/// True when a mismatch between these texts should be shown as a diff.
pub fn wants_diff(config: &Config, expected: &str, actual: &str) -> bool {
    config.output == OutputMode::ColoredDiff
        && (expected.chars().count() > config.diff_threshold
            || actual.chars().count() > config.diff_threshold)
}

/// Computes a diff from `actual` to `expected`.
///
/// Multi-line texts are compared line by line. Anything else is compared character by
/// character, then short equalities stranded between two edits are folded into them so
/// the result reads as whole replaced words instead of scattered letters.
pub fn semantic_diff(expected: &str, actual: &str) -> Vec<Chunk> {
    if expected.contains('\n') && actual.contains('\n') {
        let changeset = Changeset::new(actual, expected, "\n");
        let mut chunks = Vec::new();
        let last = changeset.diffs.len().saturating_sub(1);
        for (i, d) in changeset.diffs.into_iter().enumerate() {
            let d = if i < last { with_line_break(d) } else { d };
            push_difference(&mut chunks, d);
        }
        return chunks;
    }

    let changeset = Changeset::new(actual, expected, "");
    let mut chunks = Vec::new();
    for d in changeset.diffs {
        push_difference(&mut chunks, d);
    }
    cleanup_semantic(chunks)
}

fn with_line_break(d: Difference) -> Difference {
    match d {
        Difference::Same(s) => Difference::Same(s + "\n"),
        Difference::Rem(s) => Difference::Rem(s + "\n"),
        Difference::Add(s) => Difference::Add(s + "\n"),
    }
}

fn push_difference(chunks: &mut Vec<Chunk>, d: Difference) {
    match d {
        Difference::Same(s) => match chunks.last_mut() {
            Some(Chunk::Same(prev)) => prev.push_str(&s),
            _ => chunks.push(Chunk::Same(s)),
        },
        Difference::Rem(s) => match chunks.last_mut() {
            Some(Chunk::Edit { removed, .. }) => removed.push_str(&s),
            _ => chunks.push(Chunk::Edit {
                removed: s,
                added: String::new(),
            }),
        },
        Difference::Add(s) => match chunks.last_mut() {
            Some(Chunk::Edit { added, .. }) => added.push_str(&s),
            _ => chunks.push(Chunk::Edit {
                removed: String::new(),
                added: s,
            }),
        },
    }
}

/// Folds every equality that is no longer than the edits on both of its sides into a
/// single surrounding edit.
fn cleanup_semantic(mut chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut i = 1;
    while i + 1 < chunks.len() {
        let fold = match &chunks[i] {
            Chunk::Same(same) => {
                let len = same.chars().count();
                let before = chunks[i - 1].edit_size();
                let after = chunks[i + 1].edit_size();
                before > 0 && after > 0 && len <= before.min(after)
            }
            Chunk::Edit { .. } => false,
        };

        if !fold {
            i += 1;
            continue;
        }

        let next = chunks.remove(i + 1);
        let same = chunks.remove(i);
        if let (
            Chunk::Edit { removed, added },
            Chunk::Same(same),
            Chunk::Edit {
                removed: next_removed,
                added: next_added,
            },
        ) = (&mut chunks[i - 1], same, next)
        {
            removed.push_str(&same);
            removed.push_str(&next_removed);
            added.push_str(&same);
            added.push_str(&next_added);
        }
        // Step back: the grown edit may now swallow the equality before it.
        i = i.saturating_sub(2).max(1);
    }
    chunks
}

// ============================================================================
// RENDERING
// ============================================================================

/// Renders chunks with ANSI colors.
pub fn render_colored(chunks: &[Chunk]) -> String {
    let mut buffer = Buffer::ansi();
    for chunk in chunks {
        match chunk {
            Chunk::Same(text) => {
                let _ = buffer.write_all(text.as_bytes());
            }
            Chunk::Edit { removed, added } => {
                write_colored(&mut buffer, Color::Red, removed);
                write_colored(&mut buffer, Color::Green, added);
            }
        }
    }
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}

fn write_colored(buffer: &mut Buffer, color: Color, text: &str) {
    if text.is_empty() {
        return;
    }
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_reset(false);
    let _ = buffer.set_color(&spec);
    let _ = buffer.write_all(visible_whitespace(text).as_bytes());
    let _ = buffer.reset();
}

/// Diff of two texts, ready for a failure message.
pub fn colored_diff(expected: &str, actual: &str) -> String {
    render_colored(&semantic_diff(expected, actual))
}
