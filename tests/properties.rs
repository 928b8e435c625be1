//! Property-based tests: chunking and decoding invariants.

use fadestream::chunk::join_units;
use fadestream::{chunk, Chunker, LineDecoder, RenderUnit};
use proptest::prelude::*;

/// Words separated by single spaces, lines by single newlines.
fn arb_normalized_text() -> impl Strategy<Value = String> {
    let word = "[a-zA-Z0-9é字!?,.]{1,8}";
    let line = proptest::collection::vec(word, 0..6).prop_map(|words| words.join(" "));
    proptest::collection::vec(line, 1..5).prop_map(|lines| lines.join("\n"))
}

/// Anything, including runs of separators and multi-byte characters.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zé字 \n\t]{0,40}"
}

/// `next` keeps every unit of `prev`; only the last one may have grown.
fn is_growth(prev: &[RenderUnit], next: &[RenderUnit]) -> bool {
    let Some((last, rest)) = prev.split_last() else {
        return true;
    };
    next.len() >= prev.len() && next[..rest.len()] == *rest && next[rest.len()].extends(last)
}

/// Decode `bytes` split at `cuts`, flushing at the end.
fn decode_split(bytes: &[u8], cuts: &[usize]) -> Vec<String> {
    let mut decoder = LineDecoder::new();
    let mut lines = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.clamp(start, bytes.len());
        decoder.feed_into(&bytes[start..cut], &mut lines);
        start = cut;
    }
    decoder.feed_into(&bytes[start..], &mut lines);
    lines.extend(decoder.finish());
    lines
}

proptest! {
    #[test]
    fn round_trip_normalized_text(text in arb_normalized_text()) {
        prop_assert_eq!(join_units(&chunk(&text)), text);
    }

    #[test]
    fn growth_never_rewrites_units(prefix in arb_text(), extra in arb_text()) {
        let before = chunk(&prefix);
        let after = chunk(&format!("{prefix}{extra}"));
        prop_assert!(is_growth(&before, &after), "{:?} -> {:?}", before, after);
    }

    #[test]
    fn separator_ended_prefix_is_strict(prefix in arb_text(), sep in "[ \n]", extra in arb_text()) {
        let prefix = format!("{prefix}{sep}");
        let before = chunk(&prefix);
        let after = chunk(&format!("{prefix}{extra}"));
        prop_assert!(after.starts_with(&before), "{:?} -> {:?}", before, after);
    }

    #[test]
    fn chunker_matches_chunk(pieces in proptest::collection::vec(arb_text(), 1..8)) {
        let mut chunker = Chunker::new();
        let mut text = String::new();
        for piece in &pieces {
            text.push_str(piece);
            chunker.update(&text);
            let expected = chunk(&text);
            prop_assert_eq!(chunker.units(), expected.as_slice());
        }
    }

    #[test]
    fn decoder_ignores_chunk_boundaries(
        text in "(data: [a-zé字€ ]{0,12}\n){0,6}[a-z€]{0,4}",
        mut cuts in proptest::collection::vec(0usize..200, 0..12),
    ) {
        let bytes = text.as_bytes();
        cuts.sort_unstable();
        prop_assert_eq!(decode_split(bytes, &cuts), decode_split(bytes, &[]));
    }

    #[test]
    fn decoder_lines_never_contain_newlines(text in "[a-z\n€]{0,60}", size in 1usize..7) {
        let mut decoder = LineDecoder::new();
        for piece in text.as_bytes().chunks(size) {
            for line in decoder.feed(piece) {
                prop_assert!(!line.contains('\n'));
            }
        }
    }
}
