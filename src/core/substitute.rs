//! Placeholder substitution inside sentences.
//!
//! A placeholder is `_token_` where the token is alphanumeric with at most
//! one period. `_noun_` draws from the `noun` list of the word catalog given
//! to `WRITE`; `_hero.name_` draws from the active entity of group `hero`.

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::store::{Namespace, Store};
use crate::schema::value::Catalog;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_[[:alnum:]]+\.?[[:alnum:]]*_").unwrap());

/// Inserted when a placeholder has nothing to draw from.
pub const FALLBACK: &str = "SOMETHING";

/// A placeholder that could not be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miss {
    pub placeholder: String,
    /// True when the set exists but is empty, false when it is missing.
    pub empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub misses: Vec<Miss>,
    /// Number of placeholders replaced.
    pub passes: usize,
}

/// Replace every placeholder in `sentence`, left to right.
///
/// Scanning resumes after each inserted replacement, so inserted words are
/// never rescanned and a sentence with `n` placeholders takes exactly `n`
/// passes.
pub fn substitute_all<R: Rng + ?Sized>(
    sentence: &str,
    words: &Catalog,
    store: &Store,
    rng: &mut R,
) -> Substitution {
    let mut text = sentence.to_string();
    let mut misses = Vec::new();
    let mut passes = 0;
    let mut cursor = 0;

    while let Some(found) = PLACEHOLDER.find_at(&text, cursor) {
        let range = found.range();
        let placeholder = found.as_str().to_string();
        let token = placeholder[1..placeholder.len() - 1].to_lowercase();
        let source = if token.contains('.') {
            store
                .lookup(&token, Namespace::EntityGroup)
                .and_then(|v| v.as_list())
        } else {
            words.get(&token)
        };

        let replacement = match source.and_then(|list| list.choose(rng)) {
            Some(word) => word.clone(),
            None => {
                misses.push(Miss {
                    placeholder,
                    empty: source.is_some(),
                });
                FALLBACK.to_string()
            }
        };

        cursor = range.start + replacement.len();
        text.replace_range(range, &replacement);
        passes += 1;
    }

    Substitution {
        text,
        misses,
        passes,
    }
}

/// Count the placeholders in `text`.
pub fn placeholder_count(text: &str) -> usize {
    PLACEHOLDER.find_iter(text).count()
}
