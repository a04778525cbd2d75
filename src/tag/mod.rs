// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! The Innamark tag format: a tag-byte-prefixed watermark container with
//! optional length prefix, integrity check and compression.
//!
//! Wire layout (all multi-byte fields little-endian):
//!
//! ```text
//! [1 byte ] tag byte, unique per variant
//! [4 bytes] content length           (sized variants)
//! [4 bytes] CRC-32 of content        (CRC variants)
//! [32 bytes] SHA3-256 of content     (SHA3 variants)
//! [N bytes] content, raw deflate-compressed in the compressed variants
//! ```
//!
//! The checksum and the declared length always refer to the *uncompressed*
//! content; deflate is raw (no zlib wrapper) at level 9. The tag byte doubles
//! as a flag set: bit 0 = compressed, bit 1 = sized, bit 2 = CRC-32,
//! bit 3 = SHA3-256.

pub mod builder;

use core::fmt;
use std::io::{Read, Write};

use sha3::{Digest, Sha3_256};

pub use builder::InnamarkTagBuilder;

/// Tag bytes of the twelve variants.
pub const TAG_RAW: u8 = 0x00;
pub const TAG_COMPRESSED_RAW: u8 = 0x01;
pub const TAG_SIZED: u8 = 0x02;
pub const TAG_COMPRESSED_SIZED: u8 = 0x03;
pub const TAG_CRC32: u8 = 0x04;
pub const TAG_COMPRESSED_CRC32: u8 = 0x05;
pub const TAG_SIZED_CRC32: u8 = 0x06;
pub const TAG_COMPRESSED_SIZED_CRC32: u8 = 0x07;
pub const TAG_SHA3_256: u8 = 0x08;
pub const TAG_COMPRESSED_SHA3_256: u8 = 0x09;
pub const TAG_SIZED_SHA3_256: u8 = 0x0A;
pub const TAG_COMPRESSED_SIZED_SHA3_256: u8 = 0x0B;

/// Deflate compression level for compressed variants.
const DEFLATE_LEVEL: u32 = 9;

/// Upper bound for inflated content; stops decompression bombs. Content is
/// 16-bit length bounded, so anything above this is malformed anyway.
const MAX_INFLATED_BYTES: usize = 64 * 1024;

/// Errors from parsing or validating a watermark tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The watermark is empty; there is no tag byte to dispatch on.
    Empty,
    /// The tag byte does not name a known variant.
    UnknownTag(u8),
    /// The body is shorter than the variant's fixed fields.
    Truncated { expected: usize, actual: usize },
    /// The declared length does not match the content length.
    SizeMismatch { declared: u32, actual: usize },
    /// The stored digest does not match the recomputed one.
    ChecksumMismatch(&'static str),
    /// The compressed body could not be inflated.
    Inflation(String),
    /// The builder was asked for both a CRC-32 and a SHA3-256 variant.
    ConflictingChecksums,
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty watermark has no tag byte"),
            Self::UnknownTag(t) => write!(f, "unknown tag byte 0x{t:02X}"),
            Self::Truncated { expected, actual } => {
                write!(f, "tag body truncated: need {expected} bytes, got {actual}")
            }
            Self::SizeMismatch { declared, actual } => {
                write!(f, "declared size {declared} but content is {actual} bytes")
            }
            Self::ChecksumMismatch(kind) => write!(f, "{kind} mismatch"),
            Self::Inflation(reason) => write!(f, "inflation failed: {reason}"),
            Self::ConflictingChecksums => {
                write!(f, "at most one of CRC-32 and SHA3-256 may be selected")
            }
        }
    }
}

impl std::error::Error for TagError {}

/// A watermark wrapped in the Innamark tag format.
///
/// Constructors compute the integrity fields; [`InnamarkTag::parse`]
/// validates them. Compressed variants store their content *uncompressed*
/// and re-deflate on [`InnamarkTag::to_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnamarkTag {
    Raw { content: Vec<u8> },
    CompressedRaw { content: Vec<u8> },
    Sized { size: u32, content: Vec<u8> },
    CompressedSized { size: u32, content: Vec<u8> },
    Crc32 { checksum: u32, content: Vec<u8> },
    CompressedCrc32 { checksum: u32, content: Vec<u8> },
    SizedCrc32 { size: u32, checksum: u32, content: Vec<u8> },
    CompressedSizedCrc32 { size: u32, checksum: u32, content: Vec<u8> },
    Sha3256 { hash: [u8; 32], content: Vec<u8> },
    CompressedSha3256 { hash: [u8; 32], content: Vec<u8> },
    SizedSha3256 { size: u32, hash: [u8; 32], content: Vec<u8> },
    CompressedSizedSha3256 { size: u32, hash: [u8; 32], content: Vec<u8> },
}

impl InnamarkTag {
    pub fn raw(content: Vec<u8>) -> Self {
        Self::Raw { content }
    }

    pub fn compressed_raw(content: Vec<u8>) -> Self {
        Self::CompressedRaw { content }
    }

    pub fn sized(content: Vec<u8>) -> Self {
        Self::Sized {
            size: content.len() as u32,
            content,
        }
    }

    pub fn compressed_sized(content: Vec<u8>) -> Self {
        Self::CompressedSized {
            size: content.len() as u32,
            content,
        }
    }

    pub fn crc32(content: Vec<u8>) -> Self {
        Self::Crc32 {
            checksum: crc32fast::hash(&content),
            content,
        }
    }

    pub fn compressed_crc32(content: Vec<u8>) -> Self {
        Self::CompressedCrc32 {
            checksum: crc32fast::hash(&content),
            content,
        }
    }

    pub fn sized_crc32(content: Vec<u8>) -> Self {
        Self::SizedCrc32 {
            size: content.len() as u32,
            checksum: crc32fast::hash(&content),
            content,
        }
    }

    pub fn compressed_sized_crc32(content: Vec<u8>) -> Self {
        Self::CompressedSizedCrc32 {
            size: content.len() as u32,
            checksum: crc32fast::hash(&content),
            content,
        }
    }

    pub fn sha3_256(content: Vec<u8>) -> Self {
        Self::Sha3256 {
            hash: sha3_digest(&content),
            content,
        }
    }

    pub fn compressed_sha3_256(content: Vec<u8>) -> Self {
        Self::CompressedSha3256 {
            hash: sha3_digest(&content),
            content,
        }
    }

    pub fn sized_sha3_256(content: Vec<u8>) -> Self {
        Self::SizedSha3256 {
            size: content.len() as u32,
            hash: sha3_digest(&content),
            content,
        }
    }

    pub fn compressed_sized_sha3_256(content: Vec<u8>) -> Self {
        Self::CompressedSizedSha3256 {
            size: content.len() as u32,
            hash: sha3_digest(&content),
            content,
        }
    }

    /// Wrap text compactly: compressed only when deflate actually shrinks it.
    pub fn small(text: &str) -> Self {
        let bytes = text.as_bytes();
        if deflate(bytes).len() < bytes.len() {
            Self::compressed_raw(bytes.to_vec())
        } else {
            Self::raw(bytes.to_vec())
        }
    }

    /// The on-wire tag byte of this variant.
    pub fn tag_byte(&self) -> u8 {
        match self {
            Self::Raw { .. } => TAG_RAW,
            Self::CompressedRaw { .. } => TAG_COMPRESSED_RAW,
            Self::Sized { .. } => TAG_SIZED,
            Self::CompressedSized { .. } => TAG_COMPRESSED_SIZED,
            Self::Crc32 { .. } => TAG_CRC32,
            Self::CompressedCrc32 { .. } => TAG_COMPRESSED_CRC32,
            Self::SizedCrc32 { .. } => TAG_SIZED_CRC32,
            Self::CompressedSizedCrc32 { .. } => TAG_COMPRESSED_SIZED_CRC32,
            Self::Sha3256 { .. } => TAG_SHA3_256,
            Self::CompressedSha3256 { .. } => TAG_COMPRESSED_SHA3_256,
            Self::SizedSha3256 { .. } => TAG_SIZED_SHA3_256,
            Self::CompressedSizedSha3256 { .. } => TAG_COMPRESSED_SIZED_SHA3_256,
        }
    }

    /// Human-readable variant name.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Raw { .. } => "Raw",
            Self::CompressedRaw { .. } => "CompressedRaw",
            Self::Sized { .. } => "Sized",
            Self::CompressedSized { .. } => "CompressedSized",
            Self::Crc32 { .. } => "CRC32",
            Self::CompressedCrc32 { .. } => "CompressedCRC32",
            Self::SizedCrc32 { .. } => "SizedCRC32",
            Self::CompressedSizedCrc32 { .. } => "CompressedSizedCRC32",
            Self::Sha3256 { .. } => "SHA3256",
            Self::CompressedSha3256 { .. } => "CompressedSHA3256",
            Self::SizedSha3256 { .. } => "SizedSHA3256",
            Self::CompressedSizedSha3256 { .. } => "CompressedSizedSHA3256",
        }
    }

    /// Whether the variant stores its content deflate-compressed on the wire.
    pub fn is_compressed(&self) -> bool {
        self.tag_byte() & 0x01 != 0
    }

    /// The wrapped payload (uncompressed).
    pub fn content(&self) -> &[u8] {
        match self {
            Self::Raw { content }
            | Self::CompressedRaw { content }
            | Self::Sized { content, .. }
            | Self::CompressedSized { content, .. }
            | Self::Crc32 { content, .. }
            | Self::CompressedCrc32 { content, .. }
            | Self::SizedCrc32 { content, .. }
            | Self::CompressedSizedCrc32 { content, .. }
            | Self::Sha3256 { content, .. }
            | Self::CompressedSha3256 { content, .. }
            | Self::SizedSha3256 { content, .. }
            | Self::CompressedSizedSha3256 { content, .. } => content,
        }
    }

    /// Consume the tag, yielding the wrapped payload.
    pub fn into_content(self) -> Vec<u8> {
        match self {
            Self::Raw { content }
            | Self::CompressedRaw { content }
            | Self::Sized { content, .. }
            | Self::CompressedSized { content, .. }
            | Self::Crc32 { content, .. }
            | Self::CompressedCrc32 { content, .. }
            | Self::SizedCrc32 { content, .. }
            | Self::CompressedSizedCrc32 { content, .. }
            | Self::Sha3256 { content, .. }
            | Self::CompressedSha3256 { content, .. }
            | Self::SizedSha3256 { content, .. }
            | Self::CompressedSizedSha3256 { content, .. } => content,
        }
    }

    /// Serialize to the wire format, compressing where the variant asks.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.tag_byte()];
        match self {
            Self::Raw { content } => out.extend_from_slice(content),
            Self::CompressedRaw { content } => out.extend(deflate(content)),
            Self::Sized { size, content } => {
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(content);
            }
            Self::CompressedSized { size, content } => {
                out.extend_from_slice(&size.to_le_bytes());
                out.extend(deflate(content));
            }
            Self::Crc32 { checksum, content } => {
                out.extend_from_slice(&checksum.to_le_bytes());
                out.extend_from_slice(content);
            }
            Self::CompressedCrc32 { checksum, content } => {
                out.extend_from_slice(&checksum.to_le_bytes());
                out.extend(deflate(content));
            }
            Self::SizedCrc32 {
                size,
                checksum,
                content,
            } => {
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(&checksum.to_le_bytes());
                out.extend_from_slice(content);
            }
            Self::CompressedSizedCrc32 {
                size,
                checksum,
                content,
            } => {
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(&checksum.to_le_bytes());
                out.extend(deflate(content));
            }
            Self::Sha3256 { hash, content } => {
                out.extend_from_slice(hash);
                out.extend_from_slice(content);
            }
            Self::CompressedSha3256 { hash, content } => {
                out.extend_from_slice(hash);
                out.extend(deflate(content));
            }
            Self::SizedSha3256 {
                size,
                hash,
                content,
            } => {
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(hash);
                out.extend_from_slice(content);
            }
            Self::CompressedSizedSha3256 {
                size,
                hash,
                content,
            } => {
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(hash);
                out.extend(deflate(content));
            }
        }
        out
    }

    /// Parse and validate a tag from its wire bytes.
    pub fn parse(data: &[u8]) -> Result<Self, TagError> {
        let (&tag, body) = data.split_first().ok_or(TagError::Empty)?;
        match tag {
            TAG_RAW => Ok(Self::Raw {
                content: body.to_vec(),
            }),
            TAG_COMPRESSED_RAW => Ok(Self::CompressedRaw {
                content: inflate(body)?,
            }),
            TAG_SIZED => {
                let (size, content) = split_u32(body)?;
                check_size(size, content)?;
                Ok(Self::Sized {
                    size,
                    content: content.to_vec(),
                })
            }
            TAG_COMPRESSED_SIZED => {
                let (size, rest) = split_u32(body)?;
                let content = inflate(rest)?;
                check_size(size, &content)?;
                Ok(Self::CompressedSized { size, content })
            }
            TAG_CRC32 => {
                let (checksum, content) = split_u32(body)?;
                check_crc32(checksum, content)?;
                Ok(Self::Crc32 {
                    checksum,
                    content: content.to_vec(),
                })
            }
            TAG_COMPRESSED_CRC32 => {
                let (checksum, rest) = split_u32(body)?;
                let content = inflate(rest)?;
                check_crc32(checksum, &content)?;
                Ok(Self::CompressedCrc32 { checksum, content })
            }
            TAG_SIZED_CRC32 => {
                let (size, rest) = split_u32(body)?;
                let (checksum, content) = split_u32(rest)?;
                check_size(size, content)?;
                check_crc32(checksum, content)?;
                Ok(Self::SizedCrc32 {
                    size,
                    checksum,
                    content: content.to_vec(),
                })
            }
            TAG_COMPRESSED_SIZED_CRC32 => {
                let (size, rest) = split_u32(body)?;
                let (checksum, rest) = split_u32(rest)?;
                let content = inflate(rest)?;
                check_size(size, &content)?;
                check_crc32(checksum, &content)?;
                Ok(Self::CompressedSizedCrc32 {
                    size,
                    checksum,
                    content,
                })
            }
            TAG_SHA3_256 => {
                let (hash, content) = split_hash(body)?;
                check_sha3(hash, content)?;
                Ok(Self::Sha3256 {
                    hash,
                    content: content.to_vec(),
                })
            }
            TAG_COMPRESSED_SHA3_256 => {
                let (hash, rest) = split_hash(body)?;
                let content = inflate(rest)?;
                check_sha3(hash, &content)?;
                Ok(Self::CompressedSha3256 { hash, content })
            }
            TAG_SIZED_SHA3_256 => {
                let (size, rest) = split_u32(body)?;
                let (hash, content) = split_hash(rest)?;
                check_size(size, content)?;
                check_sha3(hash, content)?;
                Ok(Self::SizedSha3256 {
                    size,
                    hash,
                    content: content.to_vec(),
                })
            }
            TAG_COMPRESSED_SIZED_SHA3_256 => {
                let (size, rest) = split_u32(body)?;
                let (hash, rest) = split_hash(rest)?;
                let content = inflate(rest)?;
                check_size(size, &content)?;
                check_sha3(hash, &content)?;
                Ok(Self::CompressedSizedSha3256 {
                    size,
                    hash,
                    content,
                })
            }
            unknown => Err(TagError::UnknownTag(unknown)),
        }
    }

    /// Recompute the integrity fields against the stored ones.
    pub fn validate(&self) -> Result<(), TagError> {
        match self {
            Self::Raw { .. } | Self::CompressedRaw { .. } => Ok(()),
            Self::Sized { size, content } | Self::CompressedSized { size, content } => {
                check_size(*size, content)
            }
            Self::Crc32 { checksum, content }
            | Self::CompressedCrc32 { checksum, content } => check_crc32(*checksum, content),
            Self::SizedCrc32 {
                size,
                checksum,
                content,
            }
            | Self::CompressedSizedCrc32 {
                size,
                checksum,
                content,
            } => {
                check_size(*size, content)?;
                check_crc32(*checksum, content)
            }
            Self::Sha3256 { hash, content } | Self::CompressedSha3256 { hash, content } => {
                check_sha3(*hash, content)
            }
            Self::SizedSha3256 {
                size,
                hash,
                content,
            }
            | Self::CompressedSizedSha3256 {
                size,
                hash,
                content,
            } => {
                check_size(*size, content)?;
                check_sha3(*hash, content)
            }
        }
    }
}

fn sha3_digest(content: &[u8]) -> [u8; 32] {
    Sha3_256::digest(content).into()
}

fn split_u32(body: &[u8]) -> Result<(u32, &[u8]), TagError> {
    if body.len() < 4 {
        return Err(TagError::Truncated {
            expected: 4,
            actual: body.len(),
        });
    }
    let value = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
    Ok((value, &body[4..]))
}

fn split_hash(body: &[u8]) -> Result<([u8; 32], &[u8]), TagError> {
    if body.len() < 32 {
        return Err(TagError::Truncated {
            expected: 32,
            actual: body.len(),
        });
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&body[..32]);
    Ok((hash, &body[32..]))
}

fn check_size(declared: u32, content: &[u8]) -> Result<(), TagError> {
    if declared as usize != content.len() {
        return Err(TagError::SizeMismatch {
            declared,
            actual: content.len(),
        });
    }
    Ok(())
}

fn check_crc32(stored: u32, content: &[u8]) -> Result<(), TagError> {
    if crc32fast::hash(content) != stored {
        return Err(TagError::ChecksumMismatch("CRC-32"));
    }
    Ok(())
}

fn check_sha3(stored: [u8; 32], content: &[u8]) -> Result<(), TagError> {
    if sha3_digest(content) != stored {
        return Err(TagError::ChecksumMismatch("SHA3-256"));
    }
    Ok(())
}

/// Raw deflate at level 9.
pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::DeflateEncoder::new(
        Vec::new(),
        flate2::Compression::new(DEFLATE_LEVEL),
    );
    encoder
        .write_all(data)
        .expect("deflate into a Vec cannot fail");
    encoder.finish().expect("deflate into a Vec cannot fail")
}

/// Raw inflate, bounded to stop decompression bombs.
pub(crate) fn inflate(data: &[u8]) -> Result<Vec<u8>, TagError> {
    let mut out = Vec::new();
    let decoder = flate2::read::DeflateDecoder::new(data);
    decoder
        .take(MAX_INFLATED_BYTES as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| TagError::Inflation(e.to_string()))?;
    if out.len() > MAX_INFLATED_BYTES {
        return Err(TagError::Inflation(format!(
            "decompressed data exceeds {MAX_INFLATED_BYTES} bytes"
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants(content: &[u8]) -> Vec<InnamarkTag> {
        let c = content.to_vec();
        vec![
            InnamarkTag::raw(c.clone()),
            InnamarkTag::compressed_raw(c.clone()),
            InnamarkTag::sized(c.clone()),
            InnamarkTag::compressed_sized(c.clone()),
            InnamarkTag::crc32(c.clone()),
            InnamarkTag::compressed_crc32(c.clone()),
            InnamarkTag::sized_crc32(c.clone()),
            InnamarkTag::compressed_sized_crc32(c.clone()),
            InnamarkTag::sha3_256(c.clone()),
            InnamarkTag::compressed_sha3_256(c.clone()),
            InnamarkTag::sized_sha3_256(c.clone()),
            InnamarkTag::compressed_sized_sha3_256(c),
        ]
    }

    #[test]
    fn tag_bytes_are_unique() {
        let tags: Vec<u8> = all_variants(b"x").iter().map(InnamarkTag::tag_byte).collect();
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b, "two variants share tag byte 0x{a:02X}");
            }
        }
        assert_eq!(tags.len(), 12);
    }

    #[test]
    fn every_variant_roundtrips() {
        let payload = b"Lorem ipsum dolor sit amet, consetetur sadipscing elitr";
        for tag in all_variants(payload) {
            let bytes = tag.to_bytes();
            let parsed = InnamarkTag::parse(&bytes)
                .unwrap_or_else(|e| panic!("{} failed to parse: {e}", tag.variant_name()));
            assert_eq!(parsed, tag);
            assert_eq!(parsed.content(), payload);
            assert!(parsed.validate().is_ok());
        }
    }

    #[test]
    fn empty_content_roundtrips() {
        for tag in all_variants(b"") {
            let parsed = InnamarkTag::parse(&tag.to_bytes()).unwrap();
            assert!(parsed.content().is_empty());
        }
    }

    #[test]
    fn raw_wire_layout() {
        let tag = InnamarkTag::raw(b"abc".to_vec());
        assert_eq!(tag.to_bytes(), vec![0x00, b'a', b'b', b'c']);
    }

    #[test]
    fn sized_wire_layout_is_little_endian() {
        let tag = InnamarkTag::sized(vec![0xAA; 3]);
        assert_eq!(
            tag.to_bytes(),
            vec![0x02, 0x03, 0x00, 0x00, 0x00, 0xAA, 0xAA, 0xAA]
        );
    }

    #[test]
    fn crc32_uses_the_standard_polynomial() {
        // CRC-32 check value: crc32("123456789") == 0xCBF43926.
        let tag = InnamarkTag::crc32(b"123456789".to_vec());
        let bytes = tag.to_bytes();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(&bytes[1..5], &0xCBF4_3926u32.to_le_bytes());
    }

    #[test]
    fn sized_crc32_field_order() {
        let tag = InnamarkTag::sized_crc32(b"123456789".to_vec());
        let bytes = tag.to_bytes();
        assert_eq!(bytes[0], 0x06);
        assert_eq!(&bytes[1..5], &9u32.to_le_bytes());
        assert_eq!(&bytes[5..9], &0xCBF4_3926u32.to_le_bytes());
        assert_eq!(&bytes[9..], b"123456789");
    }

    #[test]
    fn sha3_hash_is_over_content() {
        let tag = InnamarkTag::sha3_256(b"hello".to_vec());
        let bytes = tag.to_bytes();
        assert_eq!(bytes[0], 0x08);
        let expected: [u8; 32] = Sha3_256::digest(b"hello").into();
        assert_eq!(&bytes[1..33], &expected);
        assert_eq!(&bytes[33..], b"hello");
    }

    #[test]
    fn unknown_tag_byte_rejected() {
        assert_eq!(
            InnamarkTag::parse(&[0x0C, 1, 2, 3]),
            Err(TagError::UnknownTag(0x0C))
        );
        assert_eq!(
            InnamarkTag::parse(&[0xFF]),
            Err(TagError::UnknownTag(0xFF))
        );
    }

    #[test]
    fn empty_watermark_rejected() {
        assert_eq!(InnamarkTag::parse(&[]), Err(TagError::Empty));
    }

    #[test]
    fn truncated_fixed_fields_rejected() {
        assert_eq!(
            InnamarkTag::parse(&[TAG_SIZED, 0x01, 0x00]),
            Err(TagError::Truncated {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(
            InnamarkTag::parse(&[TAG_SHA3_256, 0x00]),
            Err(TagError::Truncated {
                expected: 32,
                actual: 1
            })
        );
    }

    #[test]
    fn size_mismatch_detected() {
        let mut bytes = InnamarkTag::sized(b"abcd".to_vec()).to_bytes();
        bytes[1] = 0x09; // claim 9 bytes
        assert_eq!(
            InnamarkTag::parse(&bytes),
            Err(TagError::SizeMismatch {
                declared: 9,
                actual: 4
            })
        );
    }

    #[test]
    fn corrupted_content_fails_crc() {
        let mut bytes = InnamarkTag::crc32(b"payload".to_vec()).to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(
            InnamarkTag::parse(&bytes),
            Err(TagError::ChecksumMismatch("CRC-32"))
        );
    }

    #[test]
    fn corrupted_content_fails_sha3() {
        let mut bytes = InnamarkTag::sha3_256(b"payload".to_vec()).to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(
            InnamarkTag::parse(&bytes),
            Err(TagError::ChecksumMismatch("SHA3-256"))
        );
    }

    #[test]
    fn garbage_compressed_body_is_an_inflation_error() {
        // 0x07 starts a final block with the reserved block type 3.
        let bytes = [TAG_COMPRESSED_RAW, 0x07, 0x00];
        assert!(matches!(
            InnamarkTag::parse(&bytes),
            Err(TagError::Inflation(_))
        ));
    }

    #[test]
    fn compression_shrinks_repetitive_content() {
        let content = b"ha".repeat(500);
        let tag = InnamarkTag::compressed_raw(content.clone());
        let bytes = tag.to_bytes();
        assert!(bytes.len() < content.len());
        assert_eq!(InnamarkTag::parse(&bytes).unwrap().content(), &content[..]);
    }

    #[test]
    fn small_picks_the_smaller_encoding() {
        assert_eq!(InnamarkTag::small("hi").tag_byte(), TAG_RAW);
        let repetitive = "lorem ipsum ".repeat(50);
        assert_eq!(
            InnamarkTag::small(&repetitive).tag_byte(),
            TAG_COMPRESSED_RAW
        );
    }

    #[test]
    fn validate_catches_tampered_fields() {
        let mut tag = InnamarkTag::sized_crc32(b"data".to_vec());
        assert!(tag.validate().is_ok());
        if let InnamarkTag::SizedCrc32 { size, .. } = &mut tag {
            *size = 99;
        }
        assert_eq!(
            tag.validate(),
            Err(TagError::SizeMismatch {
                declared: 99,
                actual: 4
            })
        );
    }
}
