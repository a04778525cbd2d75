// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Separator strategies: how repeated watermark copies are framed inside a
//! cover so the extractor can re-segment the char stream.
//!
//! Three framings are supported:
//!
//! - `SkipInsertPosition`: no extra chars; each copy is terminated by
//!   leaving one insert position blank (still a plain space).
//! - `SingleSeparatorChar(c)`: each copy is prefixed with `c`; a copy is
//!   only complete once the *next* copy's separator closes it.
//! - `StartEndSeparatorChars(s, e)`: each copy is wrapped in `s` ... `e`
//!   and is self-terminating.

use crate::text::transcode::Alphabet;

/// How watermark copies are delimited in the cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorStrategy {
    /// Leave one insert position unwritten after each copy.
    SkipInsertPosition,
    /// Prefix each copy with a single separator char.
    SingleSeparatorChar(char),
    /// Wrap each copy in a start char and an end char.
    StartEndSeparatorChars(char, char),
}

impl SeparatorStrategy {
    /// The separator chars this strategy inserts into the cover.
    pub fn separator_chars(&self) -> Vec<char> {
        match *self {
            Self::SkipInsertPosition => Vec::new(),
            Self::SingleSeparatorChar(c) => vec![c],
            Self::StartEndSeparatorChars(s, e) => vec![s, e],
        }
    }

    /// Build the separated char sequence for one watermark copy.
    pub fn separate(&self, encoded: Vec<char>) -> Vec<char> {
        match *self {
            Self::SkipInsertPosition => encoded,
            Self::SingleSeparatorChar(c) => {
                let mut out = Vec::with_capacity(encoded.len() + 1);
                out.push(c);
                out.extend(encoded);
                out
            }
            Self::StartEndSeparatorChars(s, e) => {
                let mut out = Vec::with_capacity(encoded.len() + 2);
                out.push(s);
                out.extend(encoded);
                out.push(e);
                out
            }
        }
    }

    /// Insert positions consumed per copy: the separated length, plus the
    /// reserved blank position for `SkipInsertPosition`.
    pub fn chunk_len(&self, separated_len: usize) -> usize {
        match self {
            Self::SkipInsertPosition => separated_len + 1,
            Self::SingleSeparatorChar(_) | Self::StartEndSeparatorChars(..) => separated_len,
        }
    }

    /// Insert positions a cover must offer for one copy to be recoverable.
    ///
    /// `SkipInsertPosition` needs its trailing blank, and a
    /// `SingleSeparatorChar` copy is only closed by the next copy's
    /// separator; both need one position beyond the separated length.
    /// `StartEndSeparatorChars` copies are self-terminating.
    pub fn minimum_insert_positions(&self, separated_len: usize) -> usize {
        match self {
            Self::SkipInsertPosition | Self::SingleSeparatorChar(_) => separated_len + 1,
            Self::StartEndSeparatorChars(..) => separated_len,
        }
    }

    /// The first separator char that is also an alphabet member, if any.
    /// Such a configuration is rejected at watermarker construction.
    pub(crate) fn clash_with(&self, alphabet: &Alphabet) -> Option<char> {
        self.separator_chars()
            .into_iter()
            .find(|&c| alphabet.contains(c))
    }
}

/// Derive the candidate watermark ranges (inclusive char index pairs) of a
/// watermarked cover.
///
/// Ranges that contain no alphabet char are discarded; they arise from
/// adjacent separators or from leftover insert positions past the last
/// written copy, and carry nothing to decode. An empty result means no
/// framing was recognised.
pub(crate) fn watermark_ranges(
    strategy: &SeparatorStrategy,
    chars: &[char],
    alphabet: &Alphabet,
    insert_positions: &[usize],
) -> Vec<(usize, usize)> {
    let raw = match *strategy {
        SeparatorStrategy::SingleSeparatorChar(c) => single_separator_ranges(chars, c),
        SeparatorStrategy::StartEndSeparatorChars(s, e) => start_end_ranges(chars, s, e),
        SeparatorStrategy::SkipInsertPosition => {
            skip_position_ranges(chars, alphabet, insert_positions)
        }
    };

    raw.into_iter()
        .filter(|&(start, end)| chars[start..=end].iter().any(|&c| alphabet.contains(c)))
        .collect()
}

/// Ranges between consecutive separator chars. A lone separator yields no
/// range: a copy is only trusted once the next separator closes it.
fn single_separator_ranges(chars: &[char], separator: char) -> Vec<(usize, usize)> {
    let positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == separator)
        .map(|(i, _)| i)
        .collect();

    positions
        .windows(2)
        .filter(|w| w[0] + 1 <= w[1].wrapping_sub(1))
        .map(|w| (w[0] + 1, w[1] - 1))
        .collect()
}

/// Ranges between start/end char pairs. An end char without a matching
/// start opens just past the previous end char.
fn start_end_ranges(chars: &[char], start: char, end: char) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;
    let mut last_end: Option<usize> = None;

    for (i, &c) in chars.iter().enumerate() {
        if c == start {
            if open.is_none() {
                open = Some(i + 1);
            }
        } else if c == end {
            let from = open.take().unwrap_or_else(|| last_end.map_or(0, |e| e + 1));
            if from <= i.wrapping_sub(1) && i > 0 {
                ranges.push((from, i - 1));
            }
            last_end = Some(i);
        }
    }
    // A start char that never closes is a partial copy and is dropped.
    ranges
}

/// Ranges between frame boundaries: insert positions (of the watermarked
/// cover) whose immediately preceding char is not an alphabet member. The
/// tail past the last boundary is an unterminated copy and is dropped.
fn skip_position_ranges(
    chars: &[char],
    alphabet: &Alphabet,
    insert_positions: &[usize],
) -> Vec<(usize, usize)> {
    let boundaries: Vec<usize> = insert_positions
        .iter()
        .copied()
        .filter(|&pos| pos == 0 || !alphabet.contains(chars[pos - 1]))
        .collect();

    let mut ranges = Vec::with_capacity(boundaries.len());
    let mut last = 0;
    for &boundary in &boundaries {
        if last <= boundary {
            ranges.push((last, boundary));
        }
        last = boundary;
    }
    ranges
}
