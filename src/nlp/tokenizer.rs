//! Regex tokenizer with singularizing lemmatizer.

use inflector::Inflector;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Token;

/// Words, numbers, and dotted/hyphenated compounds ("ec2", "1,000", "x-ray").
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:[-'.,][\p{L}\p{N}]+)*").expect("token pattern is valid")
});

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:[.,]\d+)*$").expect("numeric pattern is valid"));

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "hundred", "thousand", "dozen",
];

/// Split `text` into tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| {
            let surface = m.as_str();
            Token {
                text: surface.to_string(),
                lemma: lemmatize(surface),
                like_num: like_num(surface),
                start: m.start(),
                end: m.end(),
            }
        })
        .collect()
}

/// Whether a token reads as a numeral.
pub fn like_num(word: &str) -> bool {
    NUMERIC_RE.is_match(word) || NUMBER_WORDS.contains(&word.to_lowercase().as_str())
}

/// Base form of a word: lowercased, singularized for alphabetic words.
///
/// Words of three letters or fewer are left alone; they are mostly
/// acronyms ("aws", "s3") that singularization would mangle.
pub fn lemmatize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.chars().count() <= 3 || !lower.chars().all(char::is_alphabetic) {
        return lower;
    }
    lower.to_singular()
}
