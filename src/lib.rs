// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! # innamark
//!
//! Pure-Rust watermarking library for hiding short byte payloads in plain
//! text and ZIP archives. Two codecs share one surface:
//!
//! - **Text** (`text` module): payloads are transcoded into visually
//!   identical Unicode space chars and substituted at the cover's space
//!   positions. The visible char count never changes and the result
//!   survives copy-and-paste between common editors.
//! - **ZIP** (`zip` module): payloads travel in local-file-header extra
//!   fields under the reserved ID `0x8777`; the rest of the archive is
//!   preserved bit-exactly.
//!
//! Payloads can optionally be wrapped in the Innamark tag format (`tag`
//! module) adding a length prefix, CRC-32 or SHA3-256 integrity check, and
//! deflate compression. Operations report diagnostics as [`Status`] events
//! next to their values instead of failing hard.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use innamark::{Watermark, Watermarker};
//!
//! let watermarker = Watermarker::default();
//! let marked = watermarker
//!     .text_add(&cover, &Watermark::from_text("Hello World"), true)
//!     .into_value()
//!     .unwrap();
//! let found = watermarker.text_get_string(&marked);
//! assert_eq!(found.into_value().unwrap(), "Hello World");
//! ```

pub mod file;
pub mod status;
pub mod tag;
pub mod text;
pub mod watermark;
pub mod zip;

pub use file::{from_extension, register_extension, SupportedFileType, Watermarker};
pub use status::{Event, EventKind, Outcome, Status};
pub use tag::{InnamarkTag, InnamarkTagBuilder, TagError};
pub use text::{
    Alphabet, AlphabetError, SeparatorStrategy, TextConfigError, TextWatermarker,
    DEFAULT_ALPHABET,
};
pub use watermark::{Watermark, MAX_WATERMARK_BYTES};
pub use zip::archive::{ZipArchive, ZipError, WATERMARK_EXTRA_ID};
pub use zip::ZipWatermarker;
