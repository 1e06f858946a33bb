//! Property-based tests for status cycling, product validation and prompt parsing

use proptest::prelude::*;
use reelsmith::generation::prompts::parse_prompts;
use reelsmith::studio::{phrase_at, VIDEO_STATUS_PHRASES};
use reelsmith::types::ProductDetails;

proptest! {
    /// The status ticker wraps around the phrase list with period six.
    #[test]
    fn test_phrase_cycle_is_periodic(n in 0usize..10_000) {
        prop_assert_eq!(phrase_at(n), phrase_at(n + VIDEO_STATUS_PHRASES.len()));
        prop_assert_eq!(phrase_at(n), VIDEO_STATUS_PHRASES[n % 6]);
    }

    /// A product is valid exactly when both fields carry non-whitespace text.
    #[test]
    fn test_product_validation_matches_trimmed_content(
        name in "[ \\ta-z]{0,8}",
        description in "[ \\ta-z]{0,8}",
    ) {
        let expected = !name.trim().is_empty() && !description.trim().is_empty();
        let product = ProductDetails::new(name, description);
        prop_assert_eq!(product.validate().is_ok(), expected);
    }

    /// Any object with two non-blank string fields parses, whatever the surrounding whitespace.
    #[test]
    fn test_prompt_pair_parses(
        image in "[A-Za-z][A-Za-z0-9 ,.]{0,40}",
        video in "[A-Za-z][A-Za-z0-9 ,.]{0,40}",
        pad in "[ \\n]{0,3}",
    ) {
        let raw = format!(
            "{pad}{}{pad}",
            serde_json::json!({ "imagePrompt": image, "videoPrompt": video })
        );
        let prompts = parse_prompts(&raw).unwrap();
        prop_assert_eq!(prompts.image_prompt, image);
        prop_assert_eq!(prompts.video_prompt, video);
    }
}
