// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! The watermark value type and the selection filters shared by the text and
//! ZIP codecs.
//!
//! A [`Watermark`] is an opaque, immutable byte payload. Equality and hashing
//! are byte-exact, so watermarks can be counted, deduplicated and compared
//! regardless of how they were embedded.

use std::collections::HashSet;

use crate::status::{Event, Status};
use crate::tag::InnamarkTag;

/// Maximum watermark payload size in bytes.
///
/// The tag format's length prefix and the ZIP extra-field length are both
/// 16-bit bounded, so payloads are capped at `u16::MAX`.
pub const MAX_WATERMARK_BYTES: usize = u16::MAX as usize;

/// An opaque byte payload to hide in a cover.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Watermark {
    bytes: Vec<u8>,
}

impl Watermark {
    /// Wrap raw bytes as a watermark.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Build a watermark from the UTF-8 bytes of a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the payload as UTF-8, substituting U+FFFD for invalid bytes.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<&str> for Watermark {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<Vec<u8>> for Watermark {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&InnamarkTag> for Watermark {
    fn from(tag: &InnamarkTag) -> Self {
        Self::new(tag.to_bytes())
    }
}

/// Keep only the watermarks tied for the maximum frequency.
///
/// A single winner with frequency `k` yields `k` copies of it. `n >= 2` tied
/// values yield `k` copies of each, in first-occurrence order, plus a
/// [`Event::MultipleMostFrequent`] warning. An empty input is an empty
/// success.
pub(crate) fn most_frequent(watermarks: Vec<Watermark>) -> (Status, Vec<Watermark>) {
    let mut status = Status::success();
    if watermarks.is_empty() {
        return (status, watermarks);
    }

    // Count frequencies, remembering first-occurrence order.
    let mut counts: Vec<(Watermark, usize)> = Vec::new();
    for watermark in watermarks {
        match counts.iter_mut().find(|(w, _)| *w == watermark) {
            Some((_, n)) => *n += 1,
            None => counts.push((watermark, 1)),
        }
    }

    let k = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let tied: Vec<Watermark> = counts
        .into_iter()
        .filter(|(_, n)| *n == k)
        .map(|(w, _)| w)
        .collect();

    if tied.len() > 1 {
        status.add_event(Event::MultipleMostFrequent(tied.len()));
    }

    let mut result = Vec::with_capacity(tied.len() * k);
    for watermark in tied {
        for _ in 0..k {
            result.push(watermark.clone());
        }
    }
    (status, result)
}

/// Deduplicate watermarks, preserving the first occurrence of each value.
pub(crate) fn squash(watermarks: Vec<Watermark>) -> Vec<Watermark> {
    let mut seen = HashSet::new();
    watermarks
        .into_iter()
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Replace the watermarks with their tag payloads when every one of them
/// parses as a valid [`InnamarkTag`]; otherwise hand the raw watermarks back.
pub(crate) fn unwrap_tags(watermarks: Vec<Watermark>) -> Vec<Watermark> {
    let mut contents = Vec::with_capacity(watermarks.len());
    for watermark in &watermarks {
        match InnamarkTag::parse(watermark.bytes()) {
            Ok(tag) => contents.push(Watermark::new(tag.into_content())),
            Err(_) => return watermarks,
        }
    }
    contents
}
