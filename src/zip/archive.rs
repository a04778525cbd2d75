// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! ZIP container parsing and re-emission.
//!
//! Walks the archive as a flat sequence of magic-delimited records:
//!
//! ```text
//! [local file header]*      magic 0x04034B50, LE
//! [central directory]*      magic 0x02014B50
//! [end of central directory] magic 0x06054B50
//! ```
//!
//! Every parsed field is preserved verbatim; only the extra-field list of
//! local file headers may be changed by the watermarking layer. Re-emission
//! recomputes the local-header offsets in the central directory and the
//! central-directory size/offset in the end record, so an archive whose
//! extra fields changed stays internally consistent, and an untouched
//! archive round-trips byte for byte.
//!
//! Compressed data is carried as an opaque blob of the declared size;
//! archives relying on data descriptors (undeclared sizes) desynchronise
//! the walk and are reported as invalid magic bytes.

use core::fmt;
use std::collections::HashMap;

/// Local file header magic, little-endian ("PK\x03\x04").
pub const LOCAL_FILE_MAGIC: u32 = 0x0403_4B50;
/// Central directory entry magic ("PK\x01\x02").
pub const CENTRAL_DIRECTORY_MAGIC: u32 = 0x0201_4B50;
/// End-of-central-directory magic ("PK\x05\x06").
pub const END_OF_CENTRAL_DIRECTORY_MAGIC: u32 = 0x0605_4B50;

/// Reserved extra-field ID for Innamark watermark payloads.
pub const WATERMARK_EXTRA_ID: u16 = 0x8777;

/// Hard cap on a header's extra-field area; the length field is 16-bit.
pub const MAX_EXTRA_FIELD_BYTES: usize = u16::MAX as usize;

/// Errors that can occur while parsing or watermarking a ZIP archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipError {
    /// The data ended inside a record.
    UnexpectedEof,
    /// A record started with an unknown magic number.
    InvalidMagicBytes(u32),
    /// Bytes remained after the end-of-central-directory record.
    TrailingData(usize),
    /// Adding the watermark would push a header's extra-field area past
    /// the 16-bit length limit; carries the would-be total.
    OversizedHeader(usize),
    /// The archive has no local file header to attach a watermark to.
    NoLocalFiles,
}

impl fmt::Display for ZipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of ZIP data"),
            Self::InvalidMagicBytes(m) => write!(f, "invalid magic bytes 0x{m:08X}"),
            Self::TrailingData(n) => {
                write!(f, "{n} trailing bytes after end of central directory")
            }
            Self::OversizedHeader(total) => write!(
                f,
                "extra fields would total {total} bytes, exceeding the 65535-byte limit"
            ),
            Self::NoLocalFiles => write!(f, "archive has no local file headers"),
        }
    }
}

impl std::error::Error for ZipError {}

pub type Result<T> = std::result::Result<T, ZipError>;

/// One extra field of a local file header: a 16-bit ID plus opaque data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraField {
    pub id: u16,
    pub data: Vec<u8>,
}

impl ExtraField {
    /// On-wire size: ID (2) + length (2) + data.
    pub fn encoded_len(&self) -> usize {
        4 + self.data.len()
    }
}

/// A local file header with its compressed data blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name: Vec<u8>,
    pub extra_fields: Vec<ExtraField>,
    /// Undeclared bytes at the tail of the extra-field area, kept verbatim.
    pub extra_trailing: Vec<u8>,
    /// The compressed data blob, exactly `compressed_size` bytes.
    pub data: Vec<u8>,
    /// Offset of this header's magic in the parsed stream; keys the
    /// central-directory offset rewrite.
    original_offset: u32,
}

impl LocalFile {
    /// Current total size of the extra-field area in bytes.
    pub fn extra_len(&self) -> usize {
        self.extra_fields
            .iter()
            .map(ExtraField::encoded_len)
            .sum::<usize>()
            + self.extra_trailing.len()
    }

    fn emit(&self, out: &mut Vec<u8>) {
        push_u32(out, LOCAL_FILE_MAGIC);
        push_u16(out, self.version_needed);
        push_u16(out, self.flags);
        push_u16(out, self.method);
        push_u16(out, self.mod_time);
        push_u16(out, self.mod_date);
        push_u32(out, self.crc32);
        push_u32(out, self.compressed_size);
        push_u32(out, self.uncompressed_size);
        push_u16(out, self.file_name.len() as u16);
        push_u16(out, self.extra_len() as u16);
        out.extend_from_slice(&self.file_name);
        for field in &self.extra_fields {
            push_u16(out, field.id);
            push_u16(out, field.data.len() as u16);
            out.extend_from_slice(&field.data);
        }
        out.extend_from_slice(&self.extra_trailing);
        out.extend_from_slice(&self.data);
    }
}

/// A central directory entry; name, extra and comment are opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryEntry {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub disk_number_start: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    /// Offset of the referenced local file header in the original stream.
    pub local_header_offset: u32,
    pub file_name: Vec<u8>,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl CentralDirectoryEntry {
    fn emit(&self, out: &mut Vec<u8>, local_header_offset: u32) {
        push_u32(out, CENTRAL_DIRECTORY_MAGIC);
        push_u16(out, self.version_made_by);
        push_u16(out, self.version_needed);
        push_u16(out, self.flags);
        push_u16(out, self.method);
        push_u16(out, self.mod_time);
        push_u16(out, self.mod_date);
        push_u32(out, self.crc32);
        push_u32(out, self.compressed_size);
        push_u32(out, self.uncompressed_size);
        push_u16(out, self.file_name.len() as u16);
        push_u16(out, self.extra.len() as u16);
        push_u16(out, self.comment.len() as u16);
        push_u16(out, self.disk_number_start);
        push_u16(out, self.internal_attributes);
        push_u32(out, self.external_attributes);
        push_u32(out, local_header_offset);
        out.extend_from_slice(&self.file_name);
        out.extend_from_slice(&self.extra);
        out.extend_from_slice(&self.comment);
    }
}

/// The end-of-central-directory record. Size and offset of the central
/// directory are recomputed at emission, the rest is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub central_directory_disk: u16,
    pub entries_on_disk: u16,
    pub entries_total: u16,
    pub comment: Vec<u8>,
}

/// A parsed ZIP archive, re-emittable bit-exactly modulo extra-field edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipArchive {
    local_files: Vec<LocalFile>,
    central_directory: Vec<CentralDirectoryEntry>,
    end_record: EndOfCentralDirectory,
}

impl ZipArchive {
    /// Parse an archive from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let mut local_files = Vec::new();
        let mut central_directory = Vec::new();

        let end_record = loop {
            let offset = reader.pos as u32;
            let magic = reader.u32_le()?;
            match magic {
                LOCAL_FILE_MAGIC => local_files.push(parse_local_file(&mut reader, offset)?),
                CENTRAL_DIRECTORY_MAGIC => {
                    central_directory.push(parse_central_entry(&mut reader)?)
                }
                END_OF_CENTRAL_DIRECTORY_MAGIC => break parse_end_record(&mut reader)?,
                other => return Err(ZipError::InvalidMagicBytes(other)),
            }
        };

        if reader.remaining() > 0 {
            return Err(ZipError::TrailingData(reader.remaining()));
        }

        Ok(Self {
            local_files,
            central_directory,
            end_record,
        })
    }

    /// Re-emit the archive, recomputing local-header offsets and the
    /// central-directory size/offset.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        let mut offsets: HashMap<u32, u32> = HashMap::with_capacity(self.local_files.len());
        for file in &self.local_files {
            offsets.insert(file.original_offset, out.len() as u32);
            file.emit(&mut out);
        }

        let central_start = out.len() as u32;
        for entry in &self.central_directory {
            // An offset that matches no header means the archive was already
            // inconsistent; keep it verbatim.
            let offset = offsets
                .get(&entry.local_header_offset)
                .copied()
                .unwrap_or(entry.local_header_offset);
            entry.emit(&mut out, offset);
        }
        let central_size = out.len() as u32 - central_start;

        push_u32(&mut out, END_OF_CENTRAL_DIRECTORY_MAGIC);
        push_u16(&mut out, self.end_record.disk_number);
        push_u16(&mut out, self.end_record.central_directory_disk);
        push_u16(&mut out, self.end_record.entries_on_disk);
        push_u16(&mut out, self.end_record.entries_total);
        push_u32(&mut out, central_size);
        push_u32(&mut out, central_start);
        push_u16(&mut out, self.end_record.comment.len() as u16);
        out.extend_from_slice(&self.end_record.comment);

        out
    }

    pub fn local_files(&self) -> &[LocalFile] {
        &self.local_files
    }

    pub(crate) fn local_files_mut(&mut self) -> &mut Vec<LocalFile> {
        &mut self.local_files
    }
}

fn parse_local_file(reader: &mut Reader<'_>, offset: u32) -> Result<LocalFile> {
    let version_needed = reader.u16_le()?;
    let flags = reader.u16_le()?;
    let method = reader.u16_le()?;
    let mod_time = reader.u16_le()?;
    let mod_date = reader.u16_le()?;
    let crc32 = reader.u32_le()?;
    let compressed_size = reader.u32_le()?;
    let uncompressed_size = reader.u32_le()?;
    let name_len = reader.u16_le()? as usize;
    let extra_len = reader.u16_le()? as usize;
    let file_name = reader.take(name_len)?.to_vec();
    let extra_area = reader.take(extra_len)?;
    let (extra_fields, extra_trailing) = parse_extra_fields(extra_area);
    let data = reader.take(compressed_size as usize)?.to_vec();

    Ok(LocalFile {
        version_needed,
        flags,
        method,
        mod_time,
        mod_date,
        crc32,
        compressed_size,
        uncompressed_size,
        file_name,
        extra_fields,
        extra_trailing,
        data,
        original_offset: offset,
    })
}

/// Split an extra-field area into declared fields plus any undeclared tail.
fn parse_extra_fields(area: &[u8]) -> (Vec<ExtraField>, Vec<u8>) {
    let mut fields = Vec::new();
    let mut pos = 0;
    while area.len() - pos >= 4 {
        let id = u16::from_le_bytes([area[pos], area[pos + 1]]);
        let len = u16::from_le_bytes([area[pos + 2], area[pos + 3]]) as usize;
        if pos + 4 + len > area.len() {
            break;
        }
        fields.push(ExtraField {
            id,
            data: area[pos + 4..pos + 4 + len].to_vec(),
        });
        pos += 4 + len;
    }
    (fields, area[pos..].to_vec())
}

fn parse_central_entry(reader: &mut Reader<'_>) -> Result<CentralDirectoryEntry> {
    let version_made_by = reader.u16_le()?;
    let version_needed = reader.u16_le()?;
    let flags = reader.u16_le()?;
    let method = reader.u16_le()?;
    let mod_time = reader.u16_le()?;
    let mod_date = reader.u16_le()?;
    let crc32 = reader.u32_le()?;
    let compressed_size = reader.u32_le()?;
    let uncompressed_size = reader.u32_le()?;
    let name_len = reader.u16_le()? as usize;
    let extra_len = reader.u16_le()? as usize;
    let comment_len = reader.u16_le()? as usize;
    let disk_number_start = reader.u16_le()?;
    let internal_attributes = reader.u16_le()?;
    let external_attributes = reader.u32_le()?;
    let local_header_offset = reader.u32_le()?;
    let file_name = reader.take(name_len)?.to_vec();
    let extra = reader.take(extra_len)?.to_vec();
    let comment = reader.take(comment_len)?.to_vec();

    Ok(CentralDirectoryEntry {
        version_made_by,
        version_needed,
        flags,
        method,
        mod_time,
        mod_date,
        crc32,
        compressed_size,
        uncompressed_size,
        disk_number_start,
        internal_attributes,
        external_attributes,
        local_header_offset,
        file_name,
        extra,
        comment,
    })
}

fn parse_end_record(reader: &mut Reader<'_>) -> Result<EndOfCentralDirectory> {
    let disk_number = reader.u16_le()?;
    let central_directory_disk = reader.u16_le()?;
    let entries_on_disk = reader.u16_le()?;
    let entries_total = reader.u16_le()?;
    let _central_size = reader.u32_le()?;
    let _central_offset = reader.u32_le()?;
    let comment_len = reader.u16_le()? as usize;
    let comment = reader.take(comment_len)?.to_vec();

    Ok(EndOfCentralDirectory {
        disk_number,
        central_directory_disk,
        entries_on_disk,
        entries_total,
        comment,
    })
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Bounds-checked little-endian cursor over the input bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ZipError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16_le(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32_le(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Build a stored (method 0) archive for tests.
#[cfg(test)]
pub(crate) fn build_stored_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut offsets = Vec::new();

    for (name, data) in entries {
        offsets.push(out.len() as u32);
        push_u32(&mut out, LOCAL_FILE_MAGIC);
        push_u16(&mut out, 20); // version needed
        push_u16(&mut out, 0); // flags
        push_u16(&mut out, 0); // method: stored
        push_u16(&mut out, 0x6C40); // mod time
        push_u16(&mut out, 0x5A21); // mod date
        push_u32(&mut out, crc32fast::hash(data));
        push_u32(&mut out, data.len() as u32);
        push_u32(&mut out, data.len() as u32);
        push_u16(&mut out, name.len() as u16);
        push_u16(&mut out, 0); // extra len
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);
    }

    let central_start = out.len() as u32;
    for ((name, data), offset) in entries.iter().zip(&offsets) {
        push_u32(&mut out, CENTRAL_DIRECTORY_MAGIC);
        push_u16(&mut out, 20); // version made by
        push_u16(&mut out, 20); // version needed
        push_u16(&mut out, 0);
        push_u16(&mut out, 0);
        push_u16(&mut out, 0x6C40);
        push_u16(&mut out, 0x5A21);
        push_u32(&mut out, crc32fast::hash(data));
        push_u32(&mut out, data.len() as u32);
        push_u32(&mut out, data.len() as u32);
        push_u16(&mut out, name.len() as u16);
        push_u16(&mut out, 0); // extra len
        push_u16(&mut out, 0); // comment len
        push_u16(&mut out, 0); // disk start
        push_u16(&mut out, 0); // internal attrs
        push_u32(&mut out, 0); // external attrs
        push_u32(&mut out, *offset);
        out.extend_from_slice(name.as_bytes());
    }
    let central_size = out.len() as u32 - central_start;

    push_u32(&mut out, END_OF_CENTRAL_DIRECTORY_MAGIC);
    push_u16(&mut out, 0);
    push_u16(&mut out, 0);
    push_u16(&mut out, entries.len() as u16);
    push_u16(&mut out, entries.len() as u16);
    push_u32(&mut out, central_size);
    push_u32(&mut out, central_start);
    push_u16(&mut out, 0); // comment len
    out
}
