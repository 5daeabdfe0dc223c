//! Numeric command parameters: counts, ranges, word targets and offsets.
//!
//! Counts are non-negative integers only. A range `lo--hi` requires
//! `hi > lo` and resolves to one uniform draw from `lo..=hi`. Word targets
//! are written `500W` or `400W--600W` (the `W` is case-insensitive).

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

static COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static COUNT_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)--([0-9]+)$").unwrap());
static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?i)([0-9]+)W$").unwrap());
static WORD_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([0-9]+)W--([0-9]+)W$").unwrap());
static OFFSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

/// What a repeat or write target counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counting {
    /// Full passes (or sentences, for `WRITE`).
    Cycles,
    /// Cumulative output word count.
    Words,
}

/// A parsed, not yet resolved, amount parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    Count(usize),
    CountRange(usize, usize),
    Words(usize),
    WordRange(usize, usize),
}

impl Amount {
    /// Parse any of the four amount forms.
    pub fn parse(s: &str) -> Option<Amount> {
        if let Some(count) = Self::parse_count(s) {
            return Some(count);
        }
        if let Some(caps) = WORD_RANGE.captures(s) {
            let lo = caps[1].parse().ok()?;
            let hi = caps[2].parse().ok()?;
            return (hi > lo).then_some(Amount::WordRange(lo, hi));
        }
        if let Some(caps) = WORDS.captures(s) {
            return caps[1].parse().ok().map(Amount::Words);
        }
        None
    }

    /// Parse only the cycle-count forms: an integer or `lo--hi`.
    pub fn parse_count(s: &str) -> Option<Amount> {
        if COUNT.is_match(s) {
            return s.parse().ok().map(Amount::Count);
        }
        if let Some(caps) = COUNT_RANGE.captures(s) {
            let lo = caps[1].parse().ok()?;
            let hi = caps[2].parse().ok()?;
            return (hi > lo).then_some(Amount::CountRange(lo, hi));
        }
        None
    }

    pub fn counting(&self) -> Counting {
        match self {
            Self::Count(_) | Self::CountRange(..) => Counting::Cycles,
            Self::Words(_) | Self::WordRange(..) => Counting::Words,
        }
    }

    /// Draw the final quantity. Ranges are inclusive on both ends.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            Self::Count(n) | Self::Words(n) => n,
            Self::CountRange(lo, hi) | Self::WordRange(lo, hi) => rng.gen_range(lo..=hi),
        }
    }
}

/// A signed, non-zero integer such as a `SHIFT` offset.
pub fn parse_offset(s: &str) -> Option<i64> {
    if !OFFSET.is_match(s) {
        return None;
    }
    s.parse::<i64>().ok().filter(|n| *n != 0)
}

/// A double-quoted string literal, returned without its quotes.
pub fn string_literal(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}
