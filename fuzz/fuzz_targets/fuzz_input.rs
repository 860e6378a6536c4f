// SPDX-License-Identifier: PMPL-1.0
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use captionsai::analyzer::parse_analysis;
use captionsai::caption::{parse_caption, score_caption};
use captionsai::categorizer::categorize;
use captionsai::hashtag::normalize_hashtag;
use captionsai::platform::{truncate_caption, Platform};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    reply: &'a str,
    max_chars: u16,
}

// Provider replies are untrusted text; none of these may panic.
fuzz_target!(|input: Input<'_>| {
    if let Ok(analysis) = parse_analysis(input.reply) {
        let _ = categorize(&analysis);
    }
    if let Ok(caption) = parse_caption(input.reply) {
        let _ = score_caption(&caption.text, Platform::Instagram);
    }
    let _ = normalize_hashtag(input.reply);

    let max = input.max_chars as usize;
    let cut = truncate_caption(input.reply, max);
    assert!(cut.chars().count() <= max);
});
