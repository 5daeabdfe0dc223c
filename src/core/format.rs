//! Sentence format codes and the output word count.
//!
//! A format is a string of single-letter codes applied left to right to
//! every written sentence. The output is markdown, so several codes add
//! markdown markers that the word count then ignores.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static ARTICLE_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^| )a( [aeiou])").unwrap());
static ARTICLE_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^| )A( [AEIOU])").unwrap());

/// Markdown markers that do not count as words.
const MARKERS: [&str; 5] = ["# ", "> ", "\n\n--- ", " \n# ", " \n "];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid letter codes: {0}")]
    UnknownCodes(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCode {
    /// `A`: "a" becomes "an" before a vowel.
    Article,
    /// `B`
    Bold,
    /// `C`: uppercase the first letter.
    Capitalize,
    /// `D`
    Heading,
    /// `E`
    Exclaim,
    /// `F`
    Subheading,
    /// `G`: bare newline after.
    Newline,
    /// `H`: horizontal rule after.
    RuleAfter,
    /// `I`
    Italic,
    /// `J`: horizontal rule before.
    RuleBefore,
    /// `K`
    Question,
    /// `L`: start on a new line.
    LineBefore,
    /// `M`
    Comma,
    /// `N`: start a new paragraph.
    ParagraphBefore,
    /// `P`
    Period,
    /// `Q`
    Quote,
    /// `S`: trailing space.
    Space,
    /// `T`
    Blockquote,
    /// `X`: leave the sentence alone.
    Plain,
    /// `Y`: line break after.
    LineAfter,
    /// `Z`: paragraph break after.
    ParagraphAfter,
}

impl FormatCode {
    pub fn from_letter(letter: char) -> Option<Self> {
        let code = match letter.to_ascii_uppercase() {
            'A' => Self::Article,
            'B' => Self::Bold,
            'C' => Self::Capitalize,
            'D' => Self::Heading,
            'E' => Self::Exclaim,
            'F' => Self::Subheading,
            'G' => Self::Newline,
            'H' => Self::RuleAfter,
            'I' => Self::Italic,
            'J' => Self::RuleBefore,
            'K' => Self::Question,
            'L' => Self::LineBefore,
            'M' => Self::Comma,
            'N' => Self::ParagraphBefore,
            'P' => Self::Period,
            'Q' => Self::Quote,
            'S' => Self::Space,
            'T' => Self::Blockquote,
            'X' => Self::Plain,
            'Y' => Self::LineAfter,
            'Z' => Self::ParagraphAfter,
            _ => return None,
        };
        Some(code)
    }

    pub fn letter(&self) -> char {
        match self {
            Self::Article => 'A',
            Self::Bold => 'B',
            Self::Capitalize => 'C',
            Self::Heading => 'D',
            Self::Exclaim => 'E',
            Self::Subheading => 'F',
            Self::Newline => 'G',
            Self::RuleAfter => 'H',
            Self::Italic => 'I',
            Self::RuleBefore => 'J',
            Self::Question => 'K',
            Self::LineBefore => 'L',
            Self::Comma => 'M',
            Self::ParagraphBefore => 'N',
            Self::Period => 'P',
            Self::Quote => 'Q',
            Self::Space => 'S',
            Self::Blockquote => 'T',
            Self::Plain => 'X',
            Self::LineAfter => 'Y',
            Self::ParagraphAfter => 'Z',
        }
    }

    pub fn apply(&self, sentence: &str) -> String {
        match self {
            Self::Plain => sentence.to_string(),
            Self::Period => format!("{}.", sentence),
            Self::Space => format!("{} ", sentence),
            Self::Question => format!("{}?", sentence),
            Self::Exclaim => format!("{}!", sentence),
            Self::Comma => format!("{},", sentence),
            Self::Capitalize => capitalize_first_letter(sentence),
            Self::Newline => format!("{}\n", sentence),
            Self::Article => a_to_an(sentence),
            Self::Quote => format!("\"{}\"", sentence),
            Self::Bold => format!(" **{}** ", sentence),
            Self::Italic => format!(" *{}* ", sentence),
            Self::LineBefore => format!("  \n{}", sentence),
            Self::RuleAfter => format!("{}  \n\n---   \n", sentence),
            Self::RuleBefore => format!("  \n\n---   \n{}", sentence),
            Self::LineAfter => format!("{}  \n", sentence),
            Self::ParagraphBefore => format!("\n\n{}", sentence),
            Self::ParagraphAfter => format!("{}\n\n", sentence),
            Self::Blockquote => format!("  \n> {}", sentence),
            Self::Heading => format!("  \n# {}  \n", sentence),
            Self::Subheading => format!("  \n## {}  \n", sentence),
        }
    }
}

fn capitalize_first_letter(sentence: &str) -> String {
    match sentence.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((idx, c)) => {
            let mut out = String::with_capacity(sentence.len());
            out.push_str(&sentence[..idx]);
            out.extend(c.to_uppercase());
            out.push_str(&sentence[idx + c.len_utf8()..]);
            out
        }
        None => sentence.to_string(),
    }
}

/// Matches do not overlap: in "a a apple" the first article consumes the
/// second, which is left as it is.
fn a_to_an(sentence: &str) -> String {
    let lower = ARTICLE_LOWER.replace_all(sentence, "${1}an${2}");
    ARTICLE_UPPER.replace_all(&lower, "${1}AN${2}").into_owned()
}

/// An ordered sequence of format codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    codes: Vec<FormatCode>,
}

impl Default for Format {
    /// `ACPS`: a/an, capitalise, period, trailing space.
    fn default() -> Self {
        Self {
            codes: vec![
                FormatCode::Article,
                FormatCode::Capitalize,
                FormatCode::Period,
                FormatCode::Space,
            ],
        }
    }
}

impl Format {
    /// Parse a code string, case-insensitively. Every invalid letter is
    /// reported, each once.
    pub fn parse(codes: &str) -> Result<Format, FormatError> {
        let mut parsed = Vec::with_capacity(codes.len());
        let mut invalid = String::new();
        for letter in codes.chars().map(|c| c.to_ascii_uppercase()) {
            match FormatCode::from_letter(letter) {
                Some(code) => parsed.push(code),
                None if !invalid.contains(letter) => invalid.push(letter),
                None => {}
            }
        }
        if !invalid.is_empty() {
            return Err(FormatError::UnknownCodes(invalid));
        }
        Ok(Self { codes: parsed })
    }

    pub fn apply(&self, sentence: &str) -> String {
        self.codes
            .iter()
            .fold(sentence.to_string(), |acc, code| code.apply(&acc))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.codes {
            write!(f, "{}", code.letter())?;
        }
        Ok(())
    }
}

/// Words in one output sentence. Runs of spaces count once and markdown
/// markers are not words.
pub fn word_count(sentence: &str) -> usize {
    let trimmed = sentence.trim();
    if trimmed.is_empty() {
        return 0;
    }
    let mut count: usize = 1;
    let mut previous_space = false;
    for c in trimmed.chars() {
        let is_space = c == ' ';
        if is_space && !previous_space {
            count += 1;
        }
        previous_space = is_space;
    }
    let markers = MARKERS.iter().filter(|m| sentence.contains(*m)).count();
    count.saturating_sub(markers)
}

/// Words across the whole output so far.
pub fn output_word_count<S: AsRef<str>>(output: &[S]) -> usize {
    output.iter().map(|s| word_count(s.as_ref())).sum()
}
