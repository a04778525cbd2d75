// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Watermarking ZIP archives through local-file-header extra fields.
//!
//! Payloads are stored in extra fields with the reserved ID `0x8777`. The
//! archive is parsed, the extra-field lists are edited, and everything is
//! re-emitted with consistent offsets; no other byte of the archive changes.

pub mod archive;

use crate::status::{Event, Outcome, Status};
use crate::watermark::{self, Watermark};

use archive::{ExtraField, ZipArchive, ZipError, MAX_EXTRA_FIELD_BYTES, WATERMARK_EXTRA_ID};

/// Embeds and recovers watermarks in ZIP archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipWatermarker;

impl ZipWatermarker {
    pub fn new() -> Self {
        Self
    }

    /// Append the watermark as an extra field of the first local file header.
    ///
    /// Fails with [`ZipError::OversizedHeader`], leaving the archive
    /// untouched, when the header's extra-field area would exceed the
    /// 16-bit length limit.
    pub fn add_watermark(&self, zip: &[u8], watermark: &Watermark) -> Outcome<Vec<u8>> {
        let mut archive = match ZipArchive::from_bytes(zip) {
            Ok(archive) => archive,
            Err(e) => return Status::with(Event::Zip(e)).into_empty(),
        };
        let Some(first) = archive.local_files_mut().first_mut() else {
            return Status::with(Event::Zip(ZipError::NoLocalFiles)).into_empty();
        };

        let total = first.extra_len() + 4 + watermark.len();
        if total > MAX_EXTRA_FIELD_BYTES {
            return Status::with(Event::Zip(ZipError::OversizedHeader(total))).into_empty();
        }

        first.extra_fields.push(ExtraField {
            id: WATERMARK_EXTRA_ID,
            data: watermark.bytes().to_vec(),
        });
        Status::with(Event::WatermarkEmbedded {
            copies: 1,
            incomplete: false,
        })
        .into_outcome(archive.to_bytes())
    }

    /// True iff any local file header carries a watermark extra field.
    pub fn contains_watermark(&self, zip: &[u8]) -> Outcome<bool> {
        match ZipArchive::from_bytes(zip) {
            Ok(archive) => {
                let found = archive.local_files().iter().any(|file| {
                    file.extra_fields
                        .iter()
                        .any(|field| field.id == WATERMARK_EXTRA_ID)
                });
                Status::success().into_outcome(found)
            }
            Err(e) => Status::with(Event::Zip(e)).into_empty(),
        }
    }

    /// Collect the watermark payloads of all headers, in stream order.
    ///
    /// `single_watermark` and `squash` apply the same selection policy as
    /// the text codec, and copies that all parse as valid watermark tags
    /// are unwrapped to their payloads.
    pub fn get_watermarks(
        &self,
        zip: &[u8],
        squash: bool,
        single_watermark: bool,
    ) -> Outcome<Vec<Watermark>> {
        let archive = match ZipArchive::from_bytes(zip) {
            Ok(archive) => archive,
            Err(e) => return Status::with(Event::Zip(e)).into_empty(),
        };

        let mut status = Status::success();
        let mut watermarks: Vec<Watermark> = archive
            .local_files()
            .iter()
            .flat_map(|file| &file.extra_fields)
            .filter(|field| field.id == WATERMARK_EXTRA_ID)
            .map(|field| Watermark::new(field.data.clone()))
            .collect();

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
        status.into_outcome(watermarks)
    }

    /// Delete every watermark extra field, returning the cleaned archive
    /// bytes and the removed payloads.
    pub fn remove_watermarks(&self, zip: &[u8]) -> Outcome<(Vec<u8>, Vec<Watermark>)> {
        let mut archive = match ZipArchive::from_bytes(zip) {
            Ok(archive) => archive,
            Err(e) => return Status::with(Event::Zip(e)).into_empty(),
        };

        let mut removed = Vec::new();
        for file in archive.local_files_mut() {
            let mut kept = Vec::with_capacity(file.extra_fields.len());
            for field in file.extra_fields.drain(..) {
                if field.id == WATERMARK_EXTRA_ID {
                    removed.push(Watermark::new(field.data));
                } else {
                    kept.push(field);
                }
            }
            file.extra_fields = kept;
        }

        Status::with(Event::WatermarksRemoved {
            count: removed.len(),
        })
        .into_outcome((archive.to_bytes(), removed))
    }
}
