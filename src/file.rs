// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! File-type dispatch and the file-level facade.
//!
//! A process-wide registry maps file extensions to codecs (`txt`, `md` ->
//! text; `zip`, `jar` -> ZIP). The [`Watermarker`] facade resolves the codec
//! from a path's extension (or an explicit override) and performs all file
//! I/O; the codecs themselves never touch the filesystem. Registry mutation
//! is meant as a startup configuration step, not a concurrent operation.

use core::fmt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::status::{Event, Outcome, Status};
use crate::tag::InnamarkTag;
use crate::text::TextWatermarker;
use crate::watermark::Watermark;
use crate::zip::ZipWatermarker;

/// The codecs a file can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedFileType {
    Text,
    Zip,
}

impl fmt::Display for SupportedFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Zip => write!(f, "zip"),
        }
    }
}

static REGISTRY: LazyLock<RwLock<HashMap<String, SupportedFileType>>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("txt".to_string(), SupportedFileType::Text);
    map.insert("md".to_string(), SupportedFileType::Text);
    map.insert("zip".to_string(), SupportedFileType::Zip);
    map.insert("jar".to_string(), SupportedFileType::Zip);
    RwLock::new(map)
});

/// Look up the codec registered for an extension (case-insensitive).
pub fn from_extension(extension: &str) -> Option<SupportedFileType> {
    REGISTRY
        .read()
        .get(&extension.to_ascii_lowercase())
        .copied()
}

/// Register (or override) the codec for an extension.
pub fn register_extension(extension: &str, file_type: SupportedFileType) {
    debug!(extension, %file_type, "registering extension");
    REGISTRY
        .write()
        .insert(extension.to_ascii_lowercase(), file_type);
}

/// Resolve the codec for a path, honouring an explicit override.
fn resolve_file_type(
    path: &Path,
    explicit: Option<SupportedFileType>,
) -> Result<SupportedFileType, Event> {
    let extension = path.extension().and_then(|e| e.to_str());
    match (extension, explicit) {
        (None, None) => Err(Event::NoFileType(path.display().to_string())),
        (None, Some(requested)) => Ok(requested),
        (Some(ext), None) => {
            from_extension(ext).ok_or_else(|| Event::UnsupportedType(ext.to_string()))
        }
        (Some(ext), Some(requested)) => match from_extension(ext) {
            Some(registered) if registered != requested => Err(Event::WrongType {
                requested,
                extension: ext.to_string(),
            }),
            _ => Ok(requested),
        },
    }
}

/// The top-level facade: buffer-level operations per codec plus file-level
/// operations that dispatch on the extension registry.
#[derive(Default)]
pub struct Watermarker {
    text: TextWatermarker,
    zip: ZipWatermarker,
}

impl Watermarker {
    pub fn new(text: TextWatermarker, zip: ZipWatermarker) -> Self {
        Self { text, zip }
    }

    pub fn text_watermarker(&self) -> &TextWatermarker {
        &self.text
    }

    /// Wrap the payload in a `Raw` tag when asked to.
    fn prepare(watermark: &Watermark, wrap: bool) -> Watermark {
        if wrap {
            Watermark::new(InnamarkTag::raw(watermark.bytes().to_vec()).to_bytes())
        } else {
            watermark.clone()
        }
    }

    // --- text covers ---

    pub fn text_add(&self, cover: &str, watermark: &Watermark, wrap: bool) -> Outcome<String> {
        self.text.add_watermark(cover, &Self::prepare(watermark, wrap))
    }

    pub fn text_contains(&self, cover: &str) -> bool {
        self.text.contains_watermark(cover)
    }

    pub fn text_get(&self, cover: &str, squash: bool, single_watermark: bool) -> Outcome<Vec<Watermark>> {
        self.text.get_watermarks(cover, squash, single_watermark)
    }

    /// The most frequent watermark, decoded as UTF-8.
    ///
    /// Decoding is lossy; when U+FFFD replacement chars appear a
    /// [`Event::StringDecode`] warning is recorded alongside the value.
    pub fn text_get_string(&self, cover: &str) -> Outcome<String> {
        decode_first_as_string(self.text.get_watermarks(cover, true, true))
    }

    /// The most frequent watermark as raw bytes.
    pub fn text_get_bytes(&self, cover: &str) -> Outcome<Vec<u8>> {
        let (status, watermarks) = self.text.get_watermarks(cover, true, true).into_parts();
        match watermarks.and_then(|w| w.into_iter().next()) {
            Some(first) => status.into_outcome(first.into_bytes()),
            None => status.into_empty(),
        }
    }

    pub fn text_remove(&self, cover: &str) -> Outcome<String> {
        self.text.remove_watermarks(cover)
    }

    // --- ZIP covers ---

    pub fn zip_add(&self, zip: &[u8], watermark: &Watermark, wrap: bool) -> Outcome<Vec<u8>> {
        self.zip.add_watermark(zip, &Self::prepare(watermark, wrap))
    }

    pub fn zip_contains(&self, zip: &[u8]) -> Outcome<bool> {
        self.zip.contains_watermark(zip)
    }

    pub fn zip_get(&self, zip: &[u8], squash: bool, single_watermark: bool) -> Outcome<Vec<Watermark>> {
        self.zip.get_watermarks(zip, squash, single_watermark)
    }

    /// The most frequent ZIP watermark, decoded as UTF-8 (lossy, warning on
    /// replacement chars).
    pub fn zip_get_string(&self, zip: &[u8]) -> Outcome<String> {
        decode_first_as_string(self.zip.get_watermarks(zip, true, true))
    }

    pub fn zip_remove(&self, zip: &[u8]) -> Outcome<(Vec<u8>, Vec<Watermark>)> {
        self.zip.remove_watermarks(zip)
    }

    // --- file-level dispatch ---

    /// Watermark the file at `path` in place.
    pub fn add_file(
        &self,
        path: &Path,
        watermark: &Watermark,
        wrap: bool,
        file_type: Option<SupportedFileType>,
    ) -> Status {
        let file_type = match resolve_file_type(path, file_type) {
            Ok(t) => t,
            Err(event) => return dispatch_failure(path, event),
        };
        debug!(path = %path.display(), %file_type, "adding watermark");

        let (status, output) = match file_type {
            SupportedFileType::Text => match read_text(path) {
                Ok(cover) => self
                    .text_add(&cover, watermark, wrap)
                    .map(String::into_bytes)
                    .into_parts(),
                Err(event) => return Status::with(event),
            },
            SupportedFileType::Zip => match read_bytes(path) {
                Ok(data) => self.zip_add(&data, watermark, wrap).into_parts(),
                Err(event) => return Status::with(event),
            },
        };

        match output {
            Some(bytes) => write_back(path, &bytes, status),
            None => status,
        }
    }

    /// True iff the file at `path` carries a watermark.
    pub fn contains_file(
        &self,
        path: &Path,
        file_type: Option<SupportedFileType>,
    ) -> Outcome<bool> {
        let file_type = match resolve_file_type(path, file_type) {
            Ok(t) => t,
            Err(event) => return dispatch_failure(path, event).into_empty(),
        };
        match file_type {
            SupportedFileType::Text => match read_text(path) {
                Ok(cover) => Status::success().into_outcome(self.text_contains(&cover)),
                Err(event) => Status::with(event).into_empty(),
            },
            SupportedFileType::Zip => match read_bytes(path) {
                Ok(data) => self.zip_contains(&data),
                Err(event) => Status::with(event).into_empty(),
            },
        }
    }

    /// List the watermarks of the file at `path` (squashed, most frequent).
    pub fn list_file(
        &self,
        path: &Path,
        file_type: Option<SupportedFileType>,
    ) -> Outcome<Vec<Watermark>> {
        let file_type = match resolve_file_type(path, file_type) {
            Ok(t) => t,
            Err(event) => return dispatch_failure(path, event).into_empty(),
        };
        debug!(path = %path.display(), %file_type, "listing watermarks");
        match file_type {
            SupportedFileType::Text => match read_text(path) {
                Ok(cover) => self.text_get(&cover, true, true),
                Err(event) => Status::with(event).into_empty(),
            },
            SupportedFileType::Zip => match read_bytes(path) {
                Ok(data) => self.zip_get(&data, true, true),
                Err(event) => Status::with(event).into_empty(),
            },
        }
    }

    /// Strip all watermarks from the file at `path` in place.
    pub fn remove_file(&self, path: &Path, file_type: Option<SupportedFileType>) -> Status {
        let file_type = match resolve_file_type(path, file_type) {
            Ok(t) => t,
            Err(event) => return dispatch_failure(path, event),
        };
        debug!(path = %path.display(), %file_type, "removing watermarks");

        let (status, output) = match file_type {
            SupportedFileType::Text => match read_text(path) {
                Ok(cover) => self
                    .text_remove(&cover)
                    .map(String::into_bytes)
                    .into_parts(),
                Err(event) => return Status::with(event),
            },
            SupportedFileType::Zip => match read_bytes(path) {
                Ok(data) => self
                    .zip_remove(&data)
                    .map(|(bytes, _removed)| bytes)
                    .into_parts(),
                Err(event) => return Status::with(event),
            },
        };

        match output {
            Some(bytes) => write_back(path, &bytes, status),
            None => status,
        }
    }
}

/// Shared tail of the `*_get_string` accessors.
fn decode_first_as_string(outcome: Outcome<Vec<Watermark>>) -> Outcome<String> {
    let (mut status, watermarks) = outcome.into_parts();
    match watermarks.and_then(|w| w.into_iter().next()) {
        Some(first) => {
            let text = first.text_lossy();
            if text.contains('\u{FFFD}') {
                status.add_event(Event::StringDecode(text.clone()));
            }
            status.into_outcome(text)
        }
        None => status.into_empty(),
    }
}

fn dispatch_failure(path: &Path, event: Event) -> Status {
    warn!(path = %path.display(), %event, "file type dispatch failed");
    Status::with(event)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, Event> {
    std::fs::read(path).map_err(|e| Event::Io(format!("{}: {e}", path.display())))
}

fn read_text(path: &Path) -> Result<String, Event> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes)
        .map_err(|_| Event::Io(format!("{}: cover is not valid UTF-8", path.display())))
}

fn write_back(path: &Path, bytes: &[u8], mut status: Status) -> Status {
    if let Err(e) = std::fs::write(path, bytes) {
        status.add_event(Event::Io(format!("{}: {e}", path.display())));
    }
    status
}
