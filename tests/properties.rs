// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/innamark

//! Property tests for the library's round-trip invariants.

mod common;

use innamark::text::transcode::{self, Alphabet};
use innamark::{InnamarkTag, TextWatermarker, Watermark, ZipWatermarker};
use proptest::collection::vec;
use proptest::prelude::*;

fn variant(index: usize, content: Vec<u8>) -> InnamarkTag {
    match index % 12 {
        0 => InnamarkTag::raw(content),
        1 => InnamarkTag::compressed_raw(content),
        2 => InnamarkTag::sized(content),
        3 => InnamarkTag::compressed_sized(content),
        4 => InnamarkTag::crc32(content),
        5 => InnamarkTag::compressed_crc32(content),
        6 => InnamarkTag::sized_crc32(content),
        7 => InnamarkTag::compressed_sized_crc32(content),
        8 => InnamarkTag::sha3_256(content),
        9 => InnamarkTag::compressed_sha3_256(content),
        10 => InnamarkTag::sized_sha3_256(content),
        _ => InnamarkTag::compressed_sized_sha3_256(content),
    }
}

proptest! {
    #[test]
    fn transcoding_roundtrips_default_alphabet(bytes in vec(any::<u8>(), 0..256)) {
        let alphabet = Alphabet::default();
        let chars = transcode::encode(&alphabet, &bytes);
        prop_assert_eq!(chars.len(), bytes.len() * alphabet.digits_per_byte());
        let decoded = transcode::decode(&alphabet, &chars);
        prop_assert!(decoded.is_success());
        prop_assert_eq!(decoded.into_value().unwrap(), bytes);
    }

    #[test]
    fn transcoding_roundtrips_any_base(bytes in vec(any::<u8>(), 0..64), base in 2usize..9) {
        let chars: Vec<char> = "abcdefgh".chars().take(base).collect();
        let alphabet = Alphabet::new(chars).unwrap();
        let encoded = transcode::encode(&alphabet, &bytes);
        let decoded = transcode::decode(&alphabet, &encoded);
        prop_assert!(decoded.is_success());
        prop_assert_eq!(decoded.into_value().unwrap(), bytes);
    }

    #[test]
    fn tags_roundtrip_bit_exactly(index in 0usize..12, content in vec(any::<u8>(), 0..300)) {
        let tag = variant(index, content.clone());
        let parsed = InnamarkTag::parse(&tag.to_bytes()).unwrap();
        prop_assert_eq!(parsed.content(), &content[..]);
        prop_assert!(parsed.validate().is_ok());
        prop_assert_eq!(parsed, tag);
    }

    #[test]
    fn text_add_then_remove_restores_the_cover(
        cover in "[a-z]{1,8}( [a-z]{1,8}){0,60}",
        payload in vec(any::<u8>(), 0..12),
    ) {
        let watermarker = TextWatermarker::default();
        let marked = watermarker
            .add_watermark(&cover, &Watermark::new(payload))
            .into_value()
            .unwrap();
        let cleaned = watermarker.remove_watermarks(&marked).into_value().unwrap();
        prop_assert_eq!(cleaned, cover);
    }

    #[test]
    fn text_remove_is_idempotent(cover in "[a-z ]{0,80}") {
        let watermarker = TextWatermarker::default();
        let once = watermarker.remove_watermarks(&cover).into_value().unwrap();
        let twice = watermarker.remove_watermarks(&once).into_value().unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn zip_add_then_remove_restores_the_archive(
        entries in vec(("[a-z]{1,8}\\.txt", vec(any::<u8>(), 0..50)), 1..4),
        payload in vec(any::<u8>(), 1..80),
    ) {
        let refs: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
            .collect();
        let original = common::build_stored_archive(&refs);

        let watermarker = ZipWatermarker::new();
        let watermark = Watermark::new(payload);
        let marked = watermarker
            .add_watermark(&original, &watermark)
            .into_value()
            .unwrap();
        let (cleaned, removed) = watermarker
            .remove_watermarks(&marked)
            .into_value()
            .unwrap();
        prop_assert_eq!(cleaned, original);
        prop_assert_eq!(removed, vec![watermark]);
    }
}
