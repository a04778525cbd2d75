// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Flag-driven construction of watermark tags.
//!
//! The builder carries a text payload and four flags; `finish()` maps the
//! flag combination onto the matching [`InnamarkTag`] variant. CRC-32 and
//! SHA3-256 are mutually exclusive.

use crate::tag::{InnamarkTag, TagError};

/// Builds an [`InnamarkTag`] from a text payload and feature flags.
///
/// ```rust,ignore
/// let tag = InnamarkTagBuilder::new("Hello World")
///     .sized()
///     .crc32()
///     .finish()?;
/// ```
#[derive(Debug, Clone)]
pub struct InnamarkTagBuilder {
    text: String,
    sized: bool,
    compressed: bool,
    crc32: bool,
    sha3_256: bool,
}

impl InnamarkTagBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sized: false,
            compressed: false,
            crc32: false,
            sha3_256: false,
        }
    }

    /// Prefix the content with its length.
    pub fn sized(mut self) -> Self {
        self.sized = true;
        self
    }

    /// Deflate-compress the content on the wire.
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Add a CRC-32 checksum over the content.
    pub fn crc32(mut self) -> Self {
        self.crc32 = true;
        self
    }

    /// Add a SHA3-256 digest over the content.
    pub fn sha3_256(mut self) -> Self {
        self.sha3_256 = true;
        self
    }

    /// Pick the variant selected by the flags.
    ///
    /// Fails with [`TagError::ConflictingChecksums`] when both checksum
    /// flags are set.
    pub fn finish(self) -> Result<InnamarkTag, TagError> {
        if self.crc32 && self.sha3_256 {
            return Err(TagError::ConflictingChecksums);
        }
        let content = self.text.into_bytes();
        let tag = match (self.compressed, self.sized, self.crc32, self.sha3_256) {
            (false, false, false, false) => InnamarkTag::raw(content),
            (true, false, false, false) => InnamarkTag::compressed_raw(content),
            (false, true, false, false) => InnamarkTag::sized(content),
            (true, true, false, false) => InnamarkTag::compressed_sized(content),
            (false, false, true, false) => InnamarkTag::crc32(content),
            (true, false, true, false) => InnamarkTag::compressed_crc32(content),
            (false, true, true, false) => InnamarkTag::sized_crc32(content),
            (true, true, true, false) => InnamarkTag::compressed_sized_crc32(content),
            (false, false, false, true) => InnamarkTag::sha3_256(content),
            (true, false, false, true) => InnamarkTag::compressed_sha3_256(content),
            (false, true, false, true) => InnamarkTag::sized_sha3_256(content),
            (true, true, false, true) => InnamarkTag::compressed_sized_sha3_256(content),
            // Both checksum flags were rejected above.
            (_, _, true, true) => unreachable!(),
        };
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;

    #[test]
    fn plain_builder_yields_raw() {
        let built = InnamarkTagBuilder::new("hi").finish().unwrap();
        assert_eq!(built, InnamarkTag::raw(b"hi".to_vec()));
    }

    #[test]
    fn every_flag_combination_maps_to_its_variant() {
        let cases: Vec<(InnamarkTagBuilder, u8)> = vec![
            (InnamarkTagBuilder::new("x"), tag::TAG_RAW),
            (InnamarkTagBuilder::new("x").compressed(), tag::TAG_COMPRESSED_RAW),
            (InnamarkTagBuilder::new("x").sized(), tag::TAG_SIZED),
            (
                InnamarkTagBuilder::new("x").sized().compressed(),
                tag::TAG_COMPRESSED_SIZED,
            ),
            (InnamarkTagBuilder::new("x").crc32(), tag::TAG_CRC32),
            (
                InnamarkTagBuilder::new("x").crc32().compressed(),
                tag::TAG_COMPRESSED_CRC32,
            ),
            (
                InnamarkTagBuilder::new("x").sized().crc32(),
                tag::TAG_SIZED_CRC32,
            ),
            (
                InnamarkTagBuilder::new("x").sized().crc32().compressed(),
                tag::TAG_COMPRESSED_SIZED_CRC32,
            ),
            (InnamarkTagBuilder::new("x").sha3_256(), tag::TAG_SHA3_256),
            (
                InnamarkTagBuilder::new("x").sha3_256().compressed(),
                tag::TAG_COMPRESSED_SHA3_256,
            ),
            (
                InnamarkTagBuilder::new("x").sized().sha3_256(),
                tag::TAG_SIZED_SHA3_256,
            ),
            (
                InnamarkTagBuilder::new("x").sized().sha3_256().compressed(),
                tag::TAG_COMPRESSED_SIZED_SHA3_256,
            ),
        ];
        for (builder, expected) in cases {
            let built = builder.finish().unwrap();
            assert_eq!(built.tag_byte(), expected, "{}", built.variant_name());
            assert_eq!(built.content(), b"x");
        }
    }

    #[test]
    fn conflicting_checksums_rejected() {
        let result = InnamarkTagBuilder::new("x").crc32().sha3_256().finish();
        assert_eq!(result, Err(TagError::ConflictingChecksums));
    }

    #[test]
    fn built_tags_roundtrip_through_the_wire() {
        let built = InnamarkTagBuilder::new("Hello World")
            .sized()
            .sha3_256()
            .compressed()
            .finish()
            .unwrap();
        let parsed = InnamarkTag::parse(&built.to_bytes()).unwrap();
        assert_eq!(parsed, built);
        assert_eq!(parsed.content(), b"Hello World");
    }
}
