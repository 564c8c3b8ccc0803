use kbase_core::chunker::chunk_text;
use proptest::prelude::*;

fn non_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

proptest! {
    #[test]
    fn chunking_loses_no_content(text in "[a-zA-Z0-9 .!?\n\r,]{0,600}", size in 1usize..200) {
        let chunks = chunk_text(&text, size);
        let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
        prop_assert_eq!(non_whitespace(&joined), non_whitespace(&text));
    }

    #[test]
    fn positions_are_contiguous_from_zero(text in "\\PC{0,400}", size in 1usize..120) {
        let chunks = chunk_text(&text, size);
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.position, i);
            prop_assert!(!chunk.content.is_empty());
            prop_assert_eq!(chunk.content.trim(), chunk.content.as_str());
        }
    }

    #[test]
    fn single_unit_never_split(word in "[a-z]{1,1000}", size in 1usize..500) {
        let chunks = chunk_text(&word, size);
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(&chunks[0].content, &word);
    }
}
