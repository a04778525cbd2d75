// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Status and result plumbing shared by all codecs.
//!
//! Codec operations never panic or throw on malformed input. Instead they
//! collect [`Event`]s into a [`Status`] and hand it back next to an optional
//! value as an [`Outcome`]. A single operation can report several events at
//! once (e.g. a successful embedding plus a capacity warning), so the status
//! is an append-only list rather than a single error value.
//!
//! Kind precedence is Error > Warning > Success: a status is only as good as
//! its worst event.

use core::fmt;

use crate::file::SupportedFileType;
use crate::tag::TagError;
use crate::zip::archive::ZipError;

/// Severity of a single [`Event`].
///
/// The derived ordering is the precedence used when combining events:
/// `Success < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    Success,
    Warning,
    Error,
}

/// A single diagnostic reported by a codec operation.
///
/// Events are typed so callers (and tests) can match on them structurally;
/// the human-readable message is derived via [`fmt::Display`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A watermark was laid out over the cover. `copies` counts the complete
    /// copies placed; `incomplete` is set when a trailing partial copy was
    /// written because the insert positions ran out mid-copy.
    WatermarkEmbedded { copies: usize, incomplete: bool },
    /// Watermarks were read out of a cover.
    WatermarksExtracted { count: usize },
    /// Watermark extra fields were deleted from an archive.
    WatermarksRemoved { count: usize },
    /// Alphabet and separator chars were blanked out of a text cover.
    CoverCleaned { replaced: usize },

    /// A char fed to the transcoder is not part of the alphabet.
    CharNotInAlphabet(char),
    /// A decoded digit group reconstructs a value outside 0..=255; the byte
    /// is skipped. Only possible when `base^digits_per_byte > 256`.
    DecodingInvalidByte(u32),

    /// The cover already contains chars of the full alphabet; embedding
    /// would make earlier watermarks unrecoverable.
    ContainsAlphabetChars(Vec<char>),
    /// The cover has fewer insert positions than a single separated copy
    /// needs. The partially written cover is still returned.
    OversizedWatermark { required: usize, actual: usize },
    /// Watermark chars are present but no complete framing was found; the
    /// whole cover was decoded as one (likely truncated) watermark.
    IncompleteWatermark,
    /// Most-frequent selection found `n >= 2` values tied for the maximum
    /// frequency; all tied values are returned.
    MultipleMostFrequent(usize),
    /// The extracted payload was not valid UTF-8 and was decoded with
    /// U+FFFD replacement chars.
    StringDecode(String),

    /// A watermark tag failed to parse or validate.
    Tag(TagError),
    /// A ZIP archive failed to parse or could not hold the watermark.
    Zip(ZipError),

    /// The path has no extension and no explicit file type was given.
    NoFileType(String),
    /// No codec is registered for the extension.
    UnsupportedType(String),
    /// The caller's explicit file type disagrees with the registered codec
    /// for the extension.
    WrongType {
        requested: SupportedFileType,
        extension: String,
    },
    /// Reading or writing the file at the facade boundary failed.
    Io(String),
}

impl Event {
    /// Severity of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::WatermarkEmbedded { .. }
            | Self::WatermarksExtracted { .. }
            | Self::WatermarksRemoved { .. }
            | Self::CoverCleaned { .. } => EventKind::Success,

            Self::DecodingInvalidByte(_)
            | Self::OversizedWatermark { .. }
            | Self::IncompleteWatermark
            | Self::MultipleMostFrequent(_)
            | Self::StringDecode(_) => EventKind::Warning,

            Self::CharNotInAlphabet(_)
            | Self::ContainsAlphabetChars(_)
            | Self::Tag(_)
            | Self::Zip(_)
            | Self::NoFileType(_)
            | Self::UnsupportedType(_)
            | Self::WrongType { .. }
            | Self::Io(_) => EventKind::Error,
        }
    }

    /// Short tag naming the component that produced the event.
    pub fn source(&self) -> &'static str {
        match self {
            Self::CharNotInAlphabet(_) | Self::DecodingInvalidByte(_) => "transcode",
            Self::ContainsAlphabetChars(_)
            | Self::OversizedWatermark { .. }
            | Self::IncompleteWatermark
            | Self::CoverCleaned { .. } => "text",
            Self::MultipleMostFrequent(_) | Self::StringDecode(_) => "watermark",
            Self::Tag(_) => "tag",
            Self::Zip(_) => "zip",
            Self::NoFileType(_)
            | Self::UnsupportedType(_)
            | Self::WrongType { .. }
            | Self::Io(_) => "file",
            Self::WatermarkEmbedded { .. }
            | Self::WatermarksExtracted { .. }
            | Self::WatermarksRemoved { .. } => "watermark",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WatermarkEmbedded { copies, incomplete } => {
                if *incomplete {
                    write!(f, "embedded {copies} complete copies plus a partial copy")
                } else {
                    write!(f, "embedded {copies} complete copies")
                }
            }
            Self::WatermarksExtracted { count } => write!(f, "extracted {count} watermarks"),
            Self::WatermarksRemoved { count } => write!(f, "removed {count} watermarks"),
            Self::CoverCleaned { replaced } => {
                write!(f, "replaced {replaced} watermark chars with spaces")
            }
            Self::CharNotInAlphabet(c) => {
                write!(f, "char U+{:04X} is not in the transcoding alphabet", *c as u32)
            }
            Self::DecodingInvalidByte(v) => {
                write!(f, "decoded value {v} is not a byte; skipping")
            }
            Self::ContainsAlphabetChars(chars) => {
                write!(f, "cover already contains alphabet chars:")?;
                for c in chars {
                    write!(f, " U+{:04X}", *c as u32)?;
                }
                Ok(())
            }
            Self::OversizedWatermark { required, actual } => write!(
                f,
                "watermark needs {required} insert positions but the cover has {actual}"
            ),
            Self::IncompleteWatermark => {
                write!(f, "watermark chars present but no complete copy was framed")
            }
            Self::MultipleMostFrequent(n) => {
                write!(f, "{n} watermarks are tied for most frequent")
            }
            Self::StringDecode(s) => {
                write!(f, "watermark is not valid UTF-8; decoded lossily as {s:?}")
            }
            Self::Tag(e) => write!(f, "invalid watermark tag: {e}"),
            Self::Zip(e) => write!(f, "ZIP error: {e}"),
            Self::NoFileType(path) => {
                write!(f, "cannot derive a file type for {path} (no extension)")
            }
            Self::UnsupportedType(ext) => write!(f, "no codec registered for extension {ext:?}"),
            Self::WrongType { requested, extension } => write!(
                f,
                "requested type {requested} but extension {extension:?} maps to a different codec"
            ),
            Self::Io(msg) => write!(f, "file I/O failed: {msg}"),
        }
    }
}

/// Accumulated diagnostics of one operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Status {
    events: Vec<Event>,
}

impl Status {
    /// An empty status. With no events recorded the status counts as success.
    pub fn success() -> Self {
        Self { events: Vec::new() }
    }

    /// A status holding a single event.
    pub fn with(event: Event) -> Self {
        Self { events: vec![event] }
    }

    /// Append one event.
    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Concatenate another status onto this one, preserving event order.
    pub fn append(&mut self, other: Status) {
        self.events.extend(other.events);
    }

    /// All events in the order they were recorded.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The combined kind: the maximum precedence over all events.
    pub fn kind(&self) -> EventKind {
        self.events
            .iter()
            .map(Event::kind)
            .max()
            .unwrap_or(EventKind::Success)
    }

    pub fn is_success(&self) -> bool {
        self.kind() == EventKind::Success
    }

    pub fn is_warning(&self) -> bool {
        self.kind() == EventKind::Warning
    }

    pub fn is_error(&self) -> bool {
        self.kind() == EventKind::Error
    }

    /// Couple this status with a value.
    pub fn into_outcome<T>(self, value: T) -> Outcome<T> {
        Outcome {
            status: self,
            value: Some(value),
        }
    }

    /// Couple this status with no value (typically after an error).
    pub fn into_empty<T>(self) -> Outcome<T> {
        Outcome {
            status: self,
            value: None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.events.is_empty() {
            return write!(f, "success");
        }
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{:?}] {}: {}", event.kind(), event.source(), event)?;
        }
        Ok(())
    }
}

/// A status together with the operation's optional value.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    status: Status,
    value: Option<T>,
}

impl<T> Outcome<T> {
    pub fn new(status: Status, value: Option<T>) -> Self {
        Self { status, value }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Split into the status and the value.
    pub fn into_parts(self) -> (Status, Option<T>) {
        (self.status, self.value)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_warning(&self) -> bool {
        self.status.is_warning()
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    /// Map the carried value, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            value: self.value.map(f),
        }
    }
}
