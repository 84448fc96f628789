// ### Token constants and lexing library. ###

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::FormError;

// Any run of digits is a single token; every other non-space character stands alone.
const TOKEN_PATTERN: &str = r"[0-9]+|\S";

static TOKEN_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn token_regex() -> Result<&'static Regex, FormError> {
    match TOKEN_REGEX.get_or_init(|| Regex::new(TOKEN_PATTERN)) {
        Ok(pattern) => Ok(pattern),
        Err(e) => Err(FormError::Pattern(e.clone())),
    }
}

// The tokens of one text dialect.  The outer connective joins phrases, the inner one joins
// the propositions of a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connectives {
    pub wrapper: Option<(&'static str, &'static str)>,
    pub phrase_open: &'static str,
    pub phrase_close: &'static str,
    pub outer: &'static str,
    pub inner: &'static str,
}

pub const CONJUNCTIVE_STD: Connectives = Connectives {
    wrapper: Some(("<", ">")),
    phrase_open: "(",
    phrase_close: ")",
    outer: "&",
    inner: "|",
};

pub const DISJUNCTIVE_STD: Connectives = Connectives {
    wrapper: Some(("<", ">")),
    phrase_open: "(",
    phrase_close: ")",
    outer: "|",
    inner: "&",
};

// The CSV dialect is shared by both orientations.
pub const CSV: Connectives = Connectives {
    wrapper: None,
    phrase_open: "[",
    phrase_close: "]",
    outer: ",",
    inner: ";",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    WrapOpen,
    WrapClose,
    PhraseOpen,
    PhraseClose,
    Outer,
    Inner,
    Element(&'a str),
    Unknown(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    // Byte offset of the token in the lexed input.
    pub offset: usize,
}

fn classify<'a>(text: &'a str, connectives: &Connectives) -> Token<'a> {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return Token::Element(text);
    }
    match connectives.wrapper {
        Some((open, _)) if text == open => return Token::WrapOpen,
        Some((_, close)) if text == close => return Token::WrapClose,
        _ => {}
    }
    if text == connectives.phrase_open {
        Token::PhraseOpen
    } else if text == connectives.phrase_close {
        Token::PhraseClose
    } else if text == connectives.outer {
        Token::Outer
    } else if text == connectives.inner {
        Token::Inner
    } else {
        Token::Unknown(text)
    }
}

pub fn lex<'a>(input: &'a str, connectives: &Connectives) -> Result<Vec<Lexeme<'a>>, FormError> {
    let pattern = token_regex()?;
    let lexemes = pattern
        .find_iter(input)
        .map(|m| Lexeme {
            token: classify(m.as_str(), connectives),
            offset: m.start(),
        })
        .collect();
    Ok(lexemes)
}
