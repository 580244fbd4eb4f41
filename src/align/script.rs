//! Script model and sentence segmentation

/// One sentence of the prepared script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Position in the script, contiguous from 0
    pub index: usize,
    /// Sentence text, trimmed, terminal punctuation retained
    pub text: String,
}

/// Split script text into sentences.
///
/// A sentence ends at a run of `.`, `!`, or `?` followed by whitespace or
/// the end of the text; the punctuation stays with its sentence. A trailing
/// fragment without terminal punctuation still counts as a sentence.
pub fn segment(text: &str) -> Vec<Sentence> {
    let mut pieces: Vec<&str> = Vec::new();
    let mut start = 0;

    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        // Swallow the whole punctuation run ("..." or "?!")
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?') {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };

        if at_boundary {
            pieces.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(index, text)| Sentence {
            index,
            text: text.to_string(),
        })
        .collect()
}

/// The prepared script: raw text plus its segmented sentence list
///
/// The sentence list is rebuilt in full whenever the text changes; there is
/// no incremental diffing.
#[derive(Debug, Clone, Default)]
pub struct Script {
    text: String,
    sentences: Vec<Sentence>,
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let sentences = segment(&text);
        Self { text, sentences }
    }

    /// Replace the script text, re-segmenting from scratch.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.sentences = segment(&self.text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[Sentence]) -> Vec<&str> {
        sentences.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_segment_basic() {
        let sentences = segment("Hello there. How are you today?");
        assert_eq!(texts(&sentences), vec!["Hello there.", "How are you today?"]);
        assert_eq!(sentences[0].index, 0);
        assert_eq!(sentences[1].index, 1);
    }

    #[test]
    fn test_segment_keeps_punctuation_runs() {
        let sentences = segment("Wait... really?! Yes.");
        assert_eq!(texts(&sentences), vec!["Wait...", "really?!", "Yes."]);
    }

    #[test]
    fn test_segment_trailing_fragment_without_punctuation() {
        let sentences = segment("First sentence. and then a trailing thought");
        assert_eq!(
            texts(&sentences),
            vec!["First sentence.", "and then a trailing thought"]
        );
    }

    #[test]
    fn test_segment_across_blank_lines() {
        let sentences = segment("Welcome to the show!\n\nThis is the second line.");
        assert_eq!(
            texts(&sentences),
            vec!["Welcome to the show!", "This is the second line."]
        );
    }

    #[test]
    fn test_segment_empty_and_whitespace() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t  ").is_empty());
    }

    #[test]
    fn test_segment_abbreviation_mid_word_not_split() {
        // Punctuation not followed by whitespace does not end a sentence
        let sentences = segment("Visit example.com for details. Thanks.");
        assert_eq!(
            texts(&sentences),
            vec!["Visit example.com for details.", "Thanks."]
        );
    }

    #[test]
    fn test_script_rebuild_on_set_text() {
        let mut script = Script::new("One. Two.");
        assert_eq!(script.len(), 2);

        script.set_text("Only one now");
        assert_eq!(script.len(), 1);
        assert_eq!(script.get(0).unwrap().text, "Only one now");
        assert!(script.get(1).is_none());
    }

    #[test]
    fn test_script_indexes_contiguous() {
        let script = Script::new("A. B! C? D.");
        let indexes: Vec<usize> = script.sentences().iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }
}
