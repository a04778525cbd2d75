// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Whitespace-substitution watermarking for plain text.
//!
//! A watermark is transcoded into a sequence of visually-identical Unicode
//! space chars (the alphabet) and laid out over the cover's *insert
//! positions*, by default the positions of ASCII spaces. The visible char
//! count of the cover never changes; each insert position is overwritten in
//! place. Repeated copies are framed by a [`SeparatorStrategy`] so the
//! extractor can re-segment the stream.
//!
//! The alphabet, the strategy and the placement function are captured at
//! construction and immutable afterwards.

pub mod separator;
pub mod transcode;

use core::fmt;

use crate::status::{Event, Outcome, Status};
use crate::watermark::{self, Watermark};

pub use separator::SeparatorStrategy;
pub use transcode::{Alphabet, AlphabetError, DEFAULT_ALPHABET};

/// Default separator char for `SingleSeparatorChar` configurations: a
/// three-per-em space, visually identical to the alphabet spaces but not a
/// member of the default alphabet.
pub const DEFAULT_SEPARATOR_CHAR: char = '\u{2004}';

/// Default end char for `StartEndSeparatorChars` configurations.
pub const DEFAULT_END_SEPARATOR_CHAR: char = '\u{2005}';

/// Maps a cover to its insert positions (char indices, strictly increasing).
pub type Placement = fn(&str) -> Vec<usize>;

/// The default placement: every position holding an ASCII space.
pub fn space_placement(cover: &str) -> Vec<usize> {
    cover
        .chars()
        .enumerate()
        .filter(|&(_, c)| c == ' ')
        .map(|(i, _)| i)
        .collect()
}

/// Configuration errors caught at watermarker construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextConfigError {
    /// A separator char is also an alphabet member; extraction could not
    /// tell framing from payload.
    SeparatorInAlphabet(char),
    /// Start and end separator chars are the same char.
    IdenticalSeparators(char),
}

impl fmt::Display for TextConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeparatorInAlphabet(c) => write!(
                f,
                "separator char U+{:04X} is a member of the transcoding alphabet",
                *c as u32
            ),
            Self::IdenticalSeparators(c) => write!(
                f,
                "start and end separators are both U+{:04X}",
                *c as u32
            ),
        }
    }
}

impl std::error::Error for TextConfigError {}

/// Embeds and recovers watermarks in plain-text covers.
#[derive(Debug)]
pub struct TextWatermarker {
    alphabet: Alphabet,
    strategy: SeparatorStrategy,
    placement: Placement,
}

impl Default for TextWatermarker {
    /// Default alphabet, `SkipInsertPosition` framing, space placement.
    fn default() -> Self {
        Self::new(
            Alphabet::default(),
            SeparatorStrategy::SkipInsertPosition,
            space_placement,
        )
        .expect("default configuration is valid")
    }
}

impl TextWatermarker {
    /// Build a watermarker, validating that the separator chars stay
    /// disjoint from the alphabet.
    pub fn new(
        alphabet: Alphabet,
        strategy: SeparatorStrategy,
        placement: Placement,
    ) -> Result<Self, TextConfigError> {
        if let Some(c) = strategy.clash_with(&alphabet) {
            return Err(TextConfigError::SeparatorInAlphabet(c));
        }
        if let SeparatorStrategy::StartEndSeparatorChars(s, e) = strategy {
            if s == e {
                return Err(TextConfigError::IdenticalSeparators(s));
            }
        }
        Ok(Self {
            alphabet,
            strategy,
            placement,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn strategy(&self) -> &SeparatorStrategy {
        &self.strategy
    }

    /// True for chars of the *full alphabet*: transcoding alphabet plus the
    /// strategy's separator chars.
    fn in_full_alphabet(&self, c: char) -> bool {
        self.alphabet.contains(c) || self.strategy.separator_chars().contains(&c)
    }

    /// Insert positions a cover must offer for one copy of `watermark` to be
    /// recoverable.
    pub fn minimum_insert_positions(&self, watermark: &Watermark) -> usize {
        let encoded_len = watermark.len() * self.alphabet.digits_per_byte();
        let separated_len = encoded_len + self.strategy.separator_chars().len();
        self.strategy.minimum_insert_positions(separated_len)
    }

    /// Maximum payload size (in bytes) embeddable at least once in `cover`.
    pub fn capacity(&self, cover: &str) -> usize {
        let positions = (self.placement)(cover).len();
        let overhead = self.minimum_insert_positions(&Watermark::new(Vec::new()));
        positions.saturating_sub(overhead) / self.alphabet.digits_per_byte()
    }

    /// Lay copies of `watermark` over the cover's insert positions.
    ///
    /// Fails without touching the cover when it already contains chars of
    /// the full alphabet (a second embedding would make the first
    /// unrecoverable). When the cover offers fewer positions than
    /// [`minimum_insert_positions`](Self::minimum_insert_positions), an
    /// [`Event::OversizedWatermark`] warning is recorded but the partially
    /// written cover is still returned.
    pub fn add_watermark(&self, cover: &str, watermark: &Watermark) -> Outcome<String> {
        let mut offending: Vec<char> = Vec::new();
        for c in cover.chars() {
            if self.in_full_alphabet(c) && !offending.contains(&c) {
                offending.push(c);
            }
        }
        if !offending.is_empty() {
            return Status::with(Event::ContainsAlphabetChars(offending)).into_empty();
        }

        let positions = (self.placement)(cover);
        let encoded = transcode::encode(&self.alphabet, watermark.bytes());
        let separated = self.strategy.separate(encoded);
        let chunk_len = self.strategy.chunk_len(separated.len());

        let mut chars: Vec<char> = cover.chars().collect();
        let mut complete = 0;
        let mut incomplete = false;
        for chunk in positions.chunks(chunk_len.max(1)) {
            for (&pos, &c) in chunk.iter().zip(separated.iter()) {
                if let Some(slot) = chars.get_mut(pos) {
                    *slot = c;
                }
            }
            if chunk.len() == chunk_len {
                complete += 1;
            } else {
                incomplete = true;
            }
        }

        let mut status = Status::with(Event::WatermarkEmbedded {
            copies: complete,
            incomplete,
        });
        let required = self.minimum_insert_positions(watermark);
        if positions.len() < required {
            status.add_event(Event::OversizedWatermark {
                required,
                actual: positions.len(),
            });
        }
        status.into_outcome(chars.into_iter().collect())
    }

    /// True iff the cover holds at least one char of the full alphabet.
    pub fn contains_watermark(&self, cover: &str) -> bool {
        cover.chars().any(|c| self.in_full_alphabet(c))
    }

    /// Recover the watermark copies embedded in `cover`.
    ///
    /// `single_watermark` keeps only the copies tied for maximum frequency
    /// (with a warning on ties); `squash` deduplicates the result. When
    /// every recovered copy parses as a valid watermark tag, the tag
    /// payloads are returned instead of the raw copies.
    pub fn get_watermarks(
        &self,
        cover: &str,
        squash: bool,
        single_watermark: bool,
    ) -> Outcome<Vec<Watermark>> {
        let chars: Vec<char> = cover.chars().collect();
        let positions = (self.placement)(cover);
        let mut status = Status::success();

        let mut ranges =
            separator::watermark_ranges(&self.strategy, &chars, &self.alphabet, &positions);
        if ranges.is_empty() {
            if !chars.iter().any(|&c| self.alphabet.contains(c)) {
                // Nothing embedded at all.
                status.add_event(Event::WatermarksExtracted { count: 0 });
                return status.into_outcome(Vec::new());
            }
            // Watermark chars exist but no framing closed; decode the whole
            // cover as one truncated copy.
            status.add_event(Event::IncompleteWatermark);
            ranges = vec![(0, chars.len() - 1)];
        }

        let mut watermarks = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            let sequence: Vec<char> = chars[start..=end]
                .iter()
                .copied()
                .filter(|&c| self.alphabet.contains(c))
                .collect();
            let (decode_status, bytes) =
                transcode::decode(&self.alphabet, &sequence).into_parts();
            status.append(decode_status);
            if let Some(bytes) = bytes {
                watermarks.push(Watermark::new(bytes));
            }
        }

        if single_watermark {
            let (selection_status, selected) = watermark::most_frequent(watermarks);
            status.append(selection_status);
            watermarks = selected;
        }
        if squash {
            watermarks = watermark::squash(watermarks);
        }
        watermarks = watermark::unwrap_tags(watermarks);

        status.add_event(Event::WatermarksExtracted {
            count: watermarks.len(),
        });
        if status.is_error() {
            status.into_empty()
        } else {
            status.into_outcome(watermarks)
        }
    }

    /// Replace every char of the full alphabet with a plain space.
    ///
    /// The visible char count is preserved and the operation is idempotent;
    /// it does not attempt to reconstruct the cover beyond the substitution.
    pub fn remove_watermarks(&self, cover: &str) -> Outcome<String> {
        let mut replaced = 0;
        let cleaned: String = cover
            .chars()
            .map(|c| {
                if self.in_full_alphabet(c) {
                    replaced += 1;
                    ' '
                } else {
                    c
                }
            })
            .collect();
        Status::with(Event::CoverCleaned { replaced }).into_outcome(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::InnamarkTag;

    fn skip() -> TextWatermarker {
        TextWatermarker::default()
    }

    fn single_separator() -> TextWatermarker {
        TextWatermarker::new(
            Alphabet::default(),
            SeparatorStrategy::SingleSeparatorChar(DEFAULT_SEPARATOR_CHAR),
            space_placement,
        )
        .unwrap()
    }

    #[test]
    fn construction_rejects_overlapping_separator() {
        let err = TextWatermarker::new(
            Alphabet::default(),
            SeparatorStrategy::SingleSeparatorChar('\u{2009}'),
            space_placement,
        )
        .unwrap_err();
        assert_eq!(err, TextConfigError::SeparatorInAlphabet('\u{2009}'));

        let err = TextWatermarker::new(
            Alphabet::default(),
            SeparatorStrategy::StartEndSeparatorChars('\u{2004}', '\u{2004}'),
            space_placement,
        )
        .unwrap_err();
        assert_eq!(err, TextConfigError::IdenticalSeparators('\u{2004}'));
    }

    #[test]
    fn add_rejects_cover_with_alphabet_chars() {
        let cover = "already\u{2008}marked text";
        let outcome = skip().add_watermark(cover, &Watermark::from_text("x"));
        assert!(outcome.is_error());
        assert!(!outcome.has_value());
        assert_eq!(
            outcome.status().events(),
            &[Event::ContainsAlphabetChars(vec!['\u{2008}'])]
        );
    }

    #[test]
    fn add_preserves_visible_char_count() {
        let cover = "word ".repeat(100);
        let outcome = skip().add_watermark(&cover, &Watermark::from_text("Hello World"));
        let marked = outcome.into_value().unwrap();
        assert_eq!(marked.chars().count(), cover.chars().count());
    }

    #[test]
    fn roundtrip_with_skip_framing() {
        // 100 spaces, 44 encoded chars per copy, 45-position chunks:
        // two complete copies plus a partial third.
        let cover = "word ".repeat(100);
        let watermarker = skip();
        let watermark = Watermark::from_text("Hello World");

        let outcome = watermarker.add_watermark(&cover, &watermark);
        assert!(outcome.is_success());
        assert_eq!(
            outcome.status().events(),
            &[Event::WatermarkEmbedded {
                copies: 2,
                incomplete: true,
            }]
        );
        let marked = outcome.into_value().unwrap();
        assert!(watermarker.contains_watermark(&marked));

        let extracted = watermarker.get_watermarks(&marked, true, true);
        assert!(extracted.is_success());
        assert_eq!(extracted.into_value().unwrap(), vec![watermark]);
    }

    #[test]
    fn roundtrip_with_single_separator_framing() {
        // "Hi" -> 8 encoded chars, 9 per separated copy; 27 spaces hold
        // exactly three copies, of which the first two are closed by a
        // following separator.
        let cover = "word ".repeat(27);
        let watermarker = single_separator();
        let watermark = Watermark::from_text("Hi");

        let marked = watermarker
            .add_watermark(&cover, &watermark)
            .into_value()
            .unwrap();
        let extracted = watermarker.get_watermarks(&marked, true, true);
        assert!(extracted.is_success());
        assert_eq!(extracted.into_value().unwrap(), vec![watermark]);
    }

    #[test]
    fn roundtrip_with_start_end_framing() {
        // "Hi" -> 8 encoded chars + 2 separators = 10; one exact copy.
        let cover = "word ".repeat(10);
        let watermarker = TextWatermarker::new(
            Alphabet::default(),
            SeparatorStrategy::StartEndSeparatorChars(
                DEFAULT_SEPARATOR_CHAR,
                DEFAULT_END_SEPARATOR_CHAR,
            ),
            space_placement,
        )
        .unwrap();
        let watermark = Watermark::from_text("Hi");

        let marked = watermarker
            .add_watermark(&cover, &watermark)
            .into_value()
            .unwrap();
        let extracted = watermarker.get_watermarks(&marked, true, true);
        assert!(extracted.is_success());
        assert_eq!(extracted.into_value().unwrap(), vec![watermark]);
    }

    #[test]
    fn truncated_embedding_recovers_prefix() {
        // Five insert positions cannot hold one copy of "Test" (16 chars).
        // The five written digits decode to 0x54 and the partial 0x01.
        let cover = "Loremipsum dolor sit amet, consetetur ";
        let watermarker = skip();
        let outcome = watermarker.add_watermark(cover, &Watermark::from_text("Test"));
        assert!(outcome.is_warning());
        let marked = outcome.into_value().unwrap();

        let extracted = watermarker.get_watermarks(&marked, true, true);
        assert!(extracted.is_warning());
        assert!(extracted
            .status()
            .events()
            .contains(&Event::IncompleteWatermark));
        assert_eq!(
            extracted.into_value().unwrap(),
            vec![Watermark::new(vec![0x54, 0x01])]
        );
    }

    #[test]
    fn oversized_watermark_warns_with_requirements() {
        // A wrapped "Test" is 5 bytes -> 20 encoded chars -> separated 21
        // -> 22 required positions; the cover offers 4.
        let cover = "Lorem ipsum dolor sit amet";
        let watermarker = single_separator();
        let wrapped = Watermark::new(InnamarkTag::raw(b"Test".to_vec()).to_bytes());

        let outcome = watermarker.add_watermark(cover, &wrapped);
        assert!(outcome.is_warning());
        assert!(outcome.has_value());
        assert!(outcome.status().events().contains(&Event::OversizedWatermark {
            required: 22,
            actual: 4,
        }));
    }

    #[test]
    fn get_on_clean_cover_is_empty_success() {
        let outcome = skip().get_watermarks("no watermark here", true, true);
        assert!(outcome.is_success());
        assert!(outcome.into_value().unwrap().is_empty());
    }

    #[test]
    fn tied_watermarks_are_all_returned_with_warning() {
        // Two covers, each holding exactly one complete copy; concatenated
        // they tie at frequency one.
        let watermarker = skip();
        let first = watermarker
            .add_watermark(&"word ".repeat(9), &Watermark::from_text("AB"))
            .into_value()
            .unwrap();
        let second = watermarker
            .add_watermark(&"word ".repeat(9), &Watermark::from_text("CD"))
            .into_value()
            .unwrap();
        let combined = format!("{first}{second}");

        let extracted = watermarker.get_watermarks(&combined, true, true);
        assert!(extracted.is_warning());
        assert!(extracted
            .status()
            .events()
            .contains(&Event::MultipleMostFrequent(2)));
        assert_eq!(
            extracted.into_value().unwrap(),
            vec![Watermark::from_text("AB"), Watermark::from_text("CD")]
        );
    }

    #[test]
    fn wrapped_copies_unwrap_to_payload() {
        let cover = "word ".repeat(110);
        let watermarker = skip();
        let wrapped = Watermark::new(InnamarkTag::raw(b"Hello World".to_vec()).to_bytes());

        let marked = watermarker
            .add_watermark(&cover, &wrapped)
            .into_value()
            .unwrap();
        let extracted = watermarker.get_watermarks(&marked, true, true);
        assert!(extracted.is_success());
        assert_eq!(
            extracted.into_value().unwrap(),
            vec![Watermark::from_text("Hello World")]
        );
    }

    #[test]
    fn remove_restores_space_only_covers() {
        let cover = "word ".repeat(50);
        let watermarker = skip();
        let marked = watermarker
            .add_watermark(&cover, &Watermark::from_text("secret"))
            .into_value()
            .unwrap();
        assert_ne!(marked, cover);

        let cleaned = watermarker.remove_watermarks(&marked).into_value().unwrap();
        assert_eq!(cleaned, cover);
        assert!(!watermarker.contains_watermark(&cleaned));

        // Removing again changes nothing.
        let again = watermarker.remove_watermarks(&cleaned).into_value().unwrap();
        assert_eq!(again, cleaned);
    }

    #[test]
    fn capacity_matches_minimum_positions() {
        let watermarker = skip();
        let cover = "word ".repeat(45);
        // 45 positions, skip framing: (45 - 1) / 4 = 11 payload bytes.
        assert_eq!(watermarker.capacity(&cover), 11);
        let payload = Watermark::new(vec![0u8; 11]);
        assert!(watermarker.minimum_insert_positions(&payload) <= 45);
        let too_big = Watermark::new(vec![0u8; 12]);
        assert!(watermarker.minimum_insert_positions(&too_big) > 45);
    }
}
