// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Shared fixtures for the integration suites.
#![allow(dead_code)]

/// A lorem-ipsum cover with one double space near the start and well over a
/// hundred insert positions.
pub fn lorem_cover() -> String {
    format!(
        "Lorem  ipsum {}",
        "dolor sit amet consetetur sadipscing elitr sed diam nonumy eirmod \
         tempor invidunt ut labore et dolore magna aliquyam erat "
            .repeat(6)
    )
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Build a stored (method 0) ZIP archive from (name, contents) pairs.
pub fn build_stored_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut offsets = Vec::new();

    for (name, data) in entries {
        offsets.push(out.len() as u32);
        push_u32(&mut out, 0x0403_4B50);
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
        push_u32(&mut out, 0x0201_4B50);
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

    push_u32(&mut out, 0x0605_4B50);
    push_u16(&mut out, 0);
    push_u16(&mut out, 0);
    push_u16(&mut out, entries.len() as u16);
    push_u16(&mut out, entries.len() as u16);
    push_u32(&mut out, central_size);
    push_u32(&mut out, central_start);
    push_u16(&mut out, 0); // comment len
    out
}
