//! Word pattern parser.
//!
//! A pattern is a word with inline blanks, e.g. `м[ао|о]л[ао|о]ко`. Each
//! `[options|correct]` token becomes an orthogram: a single-letter slot with
//! 2 to 4 candidate letters, one of which is correct.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest number of distinct letters an orthogram may offer.
pub const MIN_OPTIONS: usize = 2;
/// Largest number of distinct letters an orthogram may offer.
pub const MAX_OPTIONS: usize = 4;

/// A single fill-in-the-blank slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orthogram {
    /// Position of this orthogram among all orthograms of the word.
    pub index: usize,
    /// Candidate letters in first-seen order, de-duplicated.
    pub options: Vec<char>,
    /// The correct letter, always a member of `options`.
    pub correct: char,
}

/// One piece of a parsed word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Orthogram { index: usize },
}

/// The parsed form of a word pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPattern {
    pub segments: Vec<Segment>,
    pub orthograms: Vec<Orthogram>,
    /// The word with every orthogram replaced by its correct letter.
    pub correct_word: String,
}

impl ParsedPattern {
    pub fn orth_count(&self) -> usize {
        self.orthograms.len()
    }

    /// Rebuild the word with `letters[i]` substituted for orthogram `i`.
    ///
    /// Orthograms without a letter yet are rendered as `_`.
    pub fn fill(&self, letters: &[char]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { text } => out.push_str(text),
                Segment::Orthogram { index } => out.push(letters.get(*index).copied().unwrap_or('_')),
            }
        }
        out
    }

    /// The word with blanks shown as `..`, for display before answering.
    pub fn masked(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { text } => out.push_str(text),
                Segment::Orthogram { .. } => out.push_str(".."),
            }
        }
        out
    }
}

/// Reasons a word pattern can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `[` at this character offset has no closing `]`.
    #[error("unclosed '[' at position {offset}")]
    Unclosed { offset: usize },

    /// A `[` appears inside another token.
    #[error("nested '[' at position {offset}")]
    Nested { offset: usize },

    /// The token does not split into exactly `options|correct`.
    #[error("token [{token}] must have the form [options|correct]")]
    MalformedToken { token: String },

    /// The option set has fewer than 2 or more than 4 letters.
    #[error(
        "token [{token}] has {count} option(s), expected {min} to {max}",
        min = MIN_OPTIONS,
        max = MAX_OPTIONS
    )]
    OptionCount { token: String, count: usize },

    /// The correct answer is not exactly one character.
    #[error("token [{token}]: correct answer must be a single letter")]
    CorrectNotSingle { token: String },

    /// The correct letter is not among the options.
    #[error("token [{token}]: correct letter is not among the options")]
    CorrectNotInOptions { token: String },

    /// The word has no `[..|..]` token at all.
    #[error("word contains no [options|correct] token")]
    NoOrthograms,
}

/// Parse an inline-annotated word into segments and orthograms.
pub fn parse(word: &str) -> Result<ParsedPattern, PatternError> {
    let chars: Vec<char> = word.chars().collect();
    let mut segments = Vec::new();
    let mut orthograms: Vec<Orthogram> = Vec::new();
    let mut correct_word = String::new();
    let mut literal = String::new();

    let mut pos = 0;
    while pos < chars.len() {
        let ch = chars[pos];
        if ch != '[' {
            literal.push(ch);
            correct_word.push(ch);
            pos += 1;
            continue;
        }

        let open = pos;
        let mut close = None;
        for (offset, &c) in chars.iter().enumerate().skip(open + 1) {
            match c {
                ']' => {
                    close = Some(offset);
                    break;
                }
                '[' => return Err(PatternError::Nested { offset }),
                _ => {}
            }
        }
        let close = close.ok_or(PatternError::Unclosed { offset: open })?;
        let token: String = chars[open + 1..close].iter().collect();

        let orthogram = parse_token(&token, orthograms.len())?;
        if !literal.is_empty() {
            segments.push(Segment::Text {
                text: std::mem::take(&mut literal),
            });
        }
        segments.push(Segment::Orthogram {
            index: orthogram.index,
        });
        correct_word.push(orthogram.correct);
        orthograms.push(orthogram);

        pos = close + 1;
    }

    if !literal.is_empty() {
        segments.push(Segment::Text { text: literal });
    }
    if orthograms.is_empty() {
        return Err(PatternError::NoOrthograms);
    }

    Ok(ParsedPattern {
        segments,
        orthograms,
        correct_word,
    })
}

fn parse_token(token: &str, index: usize) -> Result<Orthogram, PatternError> {
    let parts: Vec<&str> = token.split('|').collect();
    let [options_part, correct_part] = parts.as_slice() else {
        return Err(PatternError::MalformedToken {
            token: token.to_string(),
        });
    };

    let mut options: Vec<char> = Vec::new();
    for c in options_part.trim().chars().filter(|c| !c.is_whitespace()) {
        if !options.contains(&c) {
            options.push(c);
        }
    }
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
        return Err(PatternError::OptionCount {
            token: token.to_string(),
            count: options.len(),
        });
    }

    let mut correct_chars = correct_part.trim().chars();
    let correct = match (correct_chars.next(), correct_chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(PatternError::CorrectNotSingle {
                token: token.to_string(),
            })
        }
    };
    if !options.contains(&correct) {
        return Err(PatternError::CorrectNotInOptions {
            token: token.to_string(),
        });
    }

    Ok(Orthogram {
        index,
        options,
        correct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_orthograms() {
        let parsed = parse("м[ао|о]л[ао|о]ко").unwrap();
        assert_eq!(parsed.orth_count(), 2);
        assert_eq!(parsed.correct_word, "молоко");
        assert_eq!(parsed.orthograms[0].options, vec!['а', 'о']);
        assert_eq!(parsed.orthograms[1].index, 1);
        assert_eq!(
            parsed.segments,
            vec![
                Segment::Text { text: "м".into() },
                Segment::Orthogram { index: 0 },
                Segment::Text { text: "л".into() },
                Segment::Orthogram { index: 1 },
                Segment::Text { text: "ко".into() },
            ]
        );
    }

    #[test]
    fn orthogram_count_matches_token_count() {
        for (word, k) in [
            ("[ео|е]ж", 1),
            ("в[ао|о]р[ао|о]на", 2),
            ("[ао|а]п[ео|е]льс[ие|и]н", 3),
        ] {
            assert_eq!(parse(word).unwrap().orth_count(), k, "{word}");
        }
    }

    #[test]
    fn options_are_trimmed_and_deduplicated() {
        let parsed = parse("д[ т т д |д ]ом").unwrap();
        assert_eq!(parsed.orthograms[0].options, vec!['т', 'д']);
        assert_eq!(parsed.correct_word, "ддом");
    }

    #[test]
    fn masked_and_fill() {
        let parsed = parse("м[ао|о]л[ао|о]ко").unwrap();
        assert_eq!(parsed.masked(), "м..л..ко");
        assert_eq!(parsed.fill(&['а', 'о']), "малоко");
        assert_eq!(parsed.fill(&['а']), "мал_ко");
    }

    #[test]
    fn rejects_unclosed_token() {
        assert_eq!(parse("м[ао|о"), Err(PatternError::Unclosed { offset: 1 }));
    }

    #[test]
    fn rejects_nested_token() {
        assert!(matches!(parse("м[а[о|о]"), Err(PatternError::Nested { .. })));
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(matches!(
            parse("м[ао]ло"),
            Err(PatternError::MalformedToken { .. })
        ));
        assert!(matches!(
            parse("м[а|о|о]ло"),
            Err(PatternError::MalformedToken { .. })
        ));
    }

    #[test]
    fn rejects_bad_option_counts() {
        assert!(matches!(
            parse("м[о|о]ло"),
            Err(PatternError::OptionCount { count: 1, .. })
        ));
        assert!(matches!(
            parse("м[аоеиу|о]ло"),
            Err(PatternError::OptionCount { count: 5, .. })
        ));
    }

    #[test]
    fn rejects_bad_correct_letter() {
        assert!(matches!(
            parse("м[ао|оо]ло"),
            Err(PatternError::CorrectNotSingle { .. })
        ));
        assert!(matches!(
            parse("м[ао|]ло"),
            Err(PatternError::CorrectNotSingle { .. })
        ));
        assert!(matches!(
            parse("м[ао|е]ло"),
            Err(PatternError::CorrectNotInOptions { .. })
        ));
    }

    #[test]
    fn rejects_plain_word() {
        assert_eq!(parse("молоко"), Err(PatternError::NoOrthograms));
    }

    #[test]
    fn error_messages_name_the_token() {
        let err = parse("м[аоеиу|о]ло").unwrap_err();
        assert_eq!(
            err.to_string(),
            "token [аоеиу|о] has 5 option(s), expected 2 to 4"
        );
        assert_eq!(
            parse("м[ао|о").unwrap_err().to_string(),
            "unclosed '[' at position 1"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(PatternError::NoOrthograms);
        assert_eq!(boxed.to_string(), "word contains no [options|correct] token");
    }
}
