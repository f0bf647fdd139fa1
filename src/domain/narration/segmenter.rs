use super::error::NarrationError;
use serde::Serialize;

/// A word-preserving slice of the source text with a fixed position in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub index: usize,
    pub text: String,
}

impl Segment {
    /// Length in characters, the unit providers count their input limit in
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split text into segments of at most `max_length` characters.
///
/// Words are packed greedily and never split: a word longer than
/// `max_length` becomes its own over-length segment. Whitespace runs collapse
/// to a single space. Blank input yields no segments.
pub fn segment(text: &str, max_length: usize) -> Result<Vec<Segment>, NarrationError> {
    if max_length == 0 {
        return Err(NarrationError::InvalidConfiguration(
            "max segment length must be positive".to_string(),
        ));
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_length {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            segments.push(Segment {
                index: segments.len(),
                text: std::mem::replace(&mut current, word.to_string()),
            });
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        segments.push(Segment {
            index: segments.len(),
            text: current,
        });
    }

    Ok(segments)
}
