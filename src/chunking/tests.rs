use super::{group_into_subtitles, SubtitleConfig};
use crate::types::Word;

fn spaced_words(count: usize, spacing: f64) -> Vec<Word> {
    (0..count)
        .map(|i| {
            let start = i as f64 * spacing;
            Word::new(format!("w{i}"), start, start + spacing * 0.8)
        })
        .collect()
}

#[test]
fn test_count_limit_closes_chunk() {
    let words = spaced_words(10, 0.1);
    let chunks = group_into_subtitles(&words, SubtitleConfig::default());

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].words.len(), 8);
    assert_eq!(chunks[0].text, "w0 w1 w2 w3 w4 w5 w6 w7");
    assert_eq!(chunks[1].words.len(), 2);
    assert_eq!(chunks[1].text, "w8 w9");
    assert!((chunks[1].start - 0.8).abs() < 1e-9);
}

#[test]
fn test_duration_limit_closes_chunk() {
    let words = vec![
        Word::new("slow", 0.0, 1.5),
        Word::new("words", 1.6, 3.0),
        Word::new("here", 3.1, 4.0),
        Word::new("next", 4.2, 4.5),
    ];
    let chunks = group_into_subtitles(&words, SubtitleConfig::default());

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "slow words here");
    assert_eq!(chunks[0].end, 4.0);
    assert_eq!(chunks[1].text, "next");
}

#[test]
fn test_punctuation_closes_chunk() {
    let words = vec![
        Word::new("Hello,", 0.0, 0.3),
        Word::new("world ", 0.3, 0.6),
        Word::new("again. ", 0.6, 0.9),
        Word::new("Then", 1.0, 1.2),
        Word::new("more", 1.2, 1.4),
    ];
    let chunks = group_into_subtitles(&words, SubtitleConfig::default());

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello,", "world  again. ", "Then more"]);
}

#[test]
fn test_interior_punctuation_does_not_split() {
    let words = vec![Word::new("e.g", 0.0, 0.2), Word::new("this", 0.2, 0.4)];
    let chunks = group_into_subtitles(&words, SubtitleConfig::default());
    assert_eq!(chunks.len(), 1);
}

#[test]
fn test_custom_limits() {
    let words = spaced_words(5, 1.0);
    let chunks = group_into_subtitles(&words, SubtitleConfig::new(3, 10.0));
    let sizes: Vec<usize> = chunks.iter().map(|c| c.words.len()).collect();
    assert_eq!(sizes, vec![3, 2]);
}

#[test]
fn test_chunks_cover_every_word_in_order() {
    let mut words = spaced_words(23, 0.7);
    words[4].text.push('?');
    words[11].text.push(';');
    let chunks = group_into_subtitles(&words, SubtitleConfig::default());

    let rejoined: Vec<Word> = chunks.iter().flat_map(|c| c.words.clone()).collect();
    assert_eq!(rejoined, words);
    for pair in chunks.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }
    for chunk in &chunks {
        assert_eq!(chunk.start, chunk.words[0].start);
        assert_eq!(chunk.end, chunk.words[chunk.words.len() - 1].end);
    }
}

#[test]
fn test_empty_input() {
    assert!(group_into_subtitles(&[], SubtitleConfig::default()).is_empty());
}
