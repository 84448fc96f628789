// Parsing and printing of normal forms.
//
// The grammar is a flat sequence of phrases:
//
//   form   := [wrap_open] { outer } [ phrase { outer { outer } phrase } { outer } ] [wrap_close]
//   phrase := phrase_open { inner } [ element { inner { inner } element } { inner } ] phrase_close
//
// ie. repeated or trailing connectives are skipped, but two phrases (or two elements)
// must be separated by a connective.  The outer wrapper is optional.

use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, warn};

use crate::errors::FormError;
use crate::normal_form::{insert_with_absorption, NormalForm, Orientation};
use crate::proven_set::{Prop, ProvenSet};
use crate::token::{lex, Connectives, Lexeme, Token, CSV};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // Between phrases, before the first one, or after an outer connective.
    ExpectPhrase,
    // After an opening bracket or an inner connective.
    InPhrase,
    // After a proposition.
    AfterElement,
    // After a closing bracket.
    AfterPhrase,
}

fn strip_wrapper<'a, 'b>(lexemes: &'b [Lexeme<'a>]) -> &'b [Lexeme<'a>] {
    let opened = matches!(lexemes.first(), Some(l) if l.token == Token::WrapOpen);
    let rest = if opened { &lexemes[1..] } else { lexemes };
    let closed = matches!(rest.last(), Some(l) if l.token == Token::WrapClose);
    let rest = if closed { &rest[..rest.len() - 1] } else { rest };
    if opened != closed {
        warn!("Mismatched outer wrapper (opened: {opened}, closed: {closed}), ignoring.");
    }
    rest
}

pub fn parse_phrases(input: &str, connectives: &Connectives) -> Result<Vec<ProvenSet>, FormError> {
    debug!("parse_phrases called on input {input:?}");
    let lexed = lex(input, connectives)?;
    let lexemes = if connectives.wrapper.is_some() {
        strip_wrapper(&lexed)
    } else {
        &lexed[..]
    };

    let mut phrases = Vec::new();
    let mut current = ProvenSet::new();
    let mut state = State::ExpectPhrase;
    for lexeme in lexemes {
        let fail = |message| Err(FormError::parse(message, input, lexeme.offset));
        state = match (state, lexeme.token) {
            (_, Token::Unknown(_)) => return fail("Unrecognized connective"),
            (_, Token::WrapOpen | Token::WrapClose) => return fail("Unexpected outer wrapper"),

            (State::ExpectPhrase, Token::Outer) => State::ExpectPhrase,
            (State::ExpectPhrase, Token::PhraseOpen) => State::InPhrase,
            (State::ExpectPhrase, _) => return fail("Phrase expected"),

            (State::InPhrase, Token::Inner) => State::InPhrase,
            (State::InPhrase, Token::Element(text)) => {
                let prop: Prop = match text.parse() {
                    Ok(prop) => prop,
                    Err(_) => return fail("Proposition out of range"),
                };
                current.insert(prop);
                State::AfterElement
            }
            (State::InPhrase | State::AfterElement, Token::PhraseClose) => {
                phrases.push(std::mem::take(&mut current));
                State::AfterPhrase
            }
            (State::InPhrase, _) => return fail("Proposition or closing bracket expected"),

            (State::AfterElement, Token::Inner) => State::InPhrase,
            (State::AfterElement, _) => return fail("Inner connective expected"),

            (State::AfterPhrase, Token::Outer) => State::ExpectPhrase,
            (State::AfterPhrase, _) => return fail("Outer connective expected"),
        };
    }

    match state {
        State::ExpectPhrase | State::AfterPhrase => Ok(phrases),
        State::InPhrase | State::AfterElement => Err(FormError::parse(
            "Closing bracket expected",
            input,
            input.len(),
        )),
    }
}

fn print_phrase(phrase: &ProvenSet, connectives: &Connectives) -> String {
    format!(
        "{}{}{}",
        connectives.phrase_open,
        phrase.iter().join(connectives.inner),
        connectives.phrase_close
    )
}

pub fn print_phrases<'a>(
    phrases: impl Iterator<Item = &'a ProvenSet>,
    connectives: &Connectives,
    sorted: bool,
) -> String {
    // Propositions are always printed in ascending order.  With `sorted`, phrases are
    // ordered by size and then lexicographically so that output is reproducible.
    let body = if sorted {
        phrases
            .sorted_by_key(|phrase| (phrase.cardinality(), phrase.iter().collect_vec()))
            .map(|phrase| print_phrase(phrase, connectives))
            .join(connectives.outer)
    } else {
        phrases
            .map(|phrase| print_phrase(phrase, connectives))
            .join(connectives.outer)
    };
    match connectives.wrapper {
        Some((open, close)) => format!("{open}{body}{close}"),
        None => body,
    }
}

impl<O: Orientation> NormalForm<O> {
    pub fn parse_with(input: &str, connectives: &Connectives) -> Result<NormalForm<O>, FormError> {
        let mut phrases = HashSet::new();
        for phrase in parse_phrases(input, connectives)? {
            insert_with_absorption(&mut phrases, phrase);
        }
        let mut result = NormalForm::new();
        result.phrases = phrases;
        Ok(result)
    }

    pub fn print_with(&self, connectives: &Connectives, sorted: bool) -> String {
        print_phrases(self.phrases(), connectives, sorted)
    }

    pub fn from_string(input: &str) -> Result<NormalForm<O>, FormError> {
        NormalForm::parse_with(input, &O::STD)
    }

    pub fn to_string_sorted(&self, sorted: bool) -> String {
        self.print_with(&O::STD, sorted)
    }

    pub fn from_csv_string(input: &str) -> Result<NormalForm<O>, FormError> {
        NormalForm::parse_with(input, &CSV)
    }

    pub fn to_csv_string(&self, sorted: bool) -> String {
        self.print_with(&CSV, sorted)
    }
}

#[cfg(test)]
mod parse_tests {
    use super::*;
    use crate::normal_form::{Cnf, Dnf};
    use crate::utils::prop_set;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn roundtrip_cnf(input: &str) -> String {
        Cnf::from_string(input).unwrap().to_string_sorted(true)
    }

    fn assert_parse_error(input: &str) {
        let result = Cnf::from_string(input);
        assert!(
            matches!(result, Err(FormError::Parse { .. })),
            "{input:?} parsed to {result:?}"
        );
    }

    #[test]
    fn test_parse_phrases() {
        init();
        let result = parse_phrases("<(2|5)&()&(7)>", &crate::token::CONJUNCTIVE_STD).unwrap();
        let desired = vec![prop_set(&[2, 5]), ProvenSet::new(), prop_set(&[7])];
        assert_eq!(result, desired);
    }

    #[test]
    fn test_constants_roundtrip() {
        init();
        for form in [Cnf::get_true(), Cnf::get_false()] {
            let printed = form.to_string_sorted(true);
            let parsed = Cnf::from_string(&printed).unwrap();
            assert_eq!(parsed.to_string_sorted(true), printed);
            assert_eq!(parsed.is_true(), form.is_true());
            assert_eq!(parsed.is_false(), form.is_false());
        }
        assert_eq!(Cnf::get_true().to_string_sorted(true), "<>");
        assert_eq!(Cnf::get_false().to_string_sorted(true), "<()>");
        assert_eq!(Dnf::get_true().to_string_sorted(true), "<()>");
        assert_eq!(Dnf::get_false().to_string_sorted(true), "<>");
        assert!(Dnf::from_string("<()>").unwrap().is_true());
    }

    #[test]
    fn test_sorted_output_is_canonical() {
        init();
        let input = "<(19766|57990)&(19938|57990)&(53437|57990)&(53500|57990)&(56892|57990)&(56914|57990)&(57990|58949)&(57990|59043)&(57990|59118)&(57990|60847)&(57990|120810)>";
        assert_eq!(roundtrip_cnf(input), input);
    }

    #[test]
    fn test_absorption_while_parsing() {
        init();
        assert_eq!(roundtrip_cnf("<(2|5)&(4|7|7)&(5)>"), "<(5)&(4|7)>");
        assert_eq!(roundtrip_cnf("<(2|5)&(4|7)&(5)&()>"), "<()>");
    }

    #[test]
    fn test_lenient_separators() {
        init();
        assert_eq!(roundtrip_cnf("<(2|5)&(4|7)&(5|7)&>"), "<(2|5)&(4|7)&(5|7)>");
        assert_eq!(roundtrip_cnf("<(2|5)&&(4|7)>"), "<(2|5)&(4|7)>");
        assert_eq!(roundtrip_cnf("<(2|5)&(4|7)&(5|)>"), "<(5)&(4|7)>");
        assert_eq!(roundtrip_cnf("<(|2||5)&(4||||||7)&(5|)>"), "<(5)&(4|7)>");
        assert_eq!(roundtrip_cnf("< ( 2 | 5 ) & ( 4 | 7 ) >"), "<(2|5)&(4|7)>");
    }

    #[test]
    fn test_lenient_wrapper() {
        init();
        assert_eq!(roundtrip_cnf("(2|5)&(4|7)&(5)"), "<(5)&(4|7)>");
        assert_eq!(roundtrip_cnf("<(2|5)&(4|7)&(5)"), "<(5)&(4|7)>");
        assert_eq!(roundtrip_cnf("(2|5)&(4|7)&(5)>"), "<(5)&(4|7)>");
        assert_eq!(roundtrip_cnf(""), "<>");
    }

    #[test]
    fn test_missing_connective_between_phrases() {
        init();
        assert_parse_error("<(2|5)&(4|7)(5)>");
    }

    #[test]
    fn test_unrecognized_connectives() {
        init();
        assert_parse_error("<(2|5)+(4|7)+(5)>");
        assert_parse_error("<2|5 4|7 5>");
        assert_parse_error("<(-2|5)>");
        assert_parse_error("<(2|5)&<(4)>");
    }

    #[test]
    fn test_bad_phrase_wrappers() {
        init();
        assert_parse_error("<)2|5(&(4|7)&(5)>");
        assert_parse_error("<2|5&4|7&5>");
        assert_parse_error("<(2|5)&(4|7>");
        assert_parse_error("<(2|(5))>");
        assert_parse_error("<(2 5)>");
    }

    #[test]
    fn test_parse_error_carries_context() {
        init();
        match Cnf::from_string("<(2|5)&(4|7)(5)>") {
            Err(FormError::Parse {
                fragment, offset, ..
            }) => {
                assert_eq!(offset, 12);
                assert_eq!(fragment, "(5)>");
            }
            other => panic!("Expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_proposition_overflow() {
        init();
        assert_parse_error("<(99999999999999999999999999)>");
    }

    #[test]
    fn test_dnf_dialect() {
        init();
        let form = Dnf::from_string("<(1&2)|(3)|(1&2&4)>").unwrap();
        assert_eq!(form.to_string_sorted(true), "<(3)|(1&2)>");
        // CNF connectives are swapped for a DNF.
        assert!(matches!(
            Dnf::from_string("<(1|2)&(3)>"),
            Err(FormError::Parse { .. })
        ));
    }

    #[test]
    fn test_csv() {
        init();
        let form = Cnf::from_string("<(2|5)&(4|7)&(9)>").unwrap();
        let csv = form.to_csv_string(true);
        assert_eq!(csv, "[9],[2;5],[4;7]");
        assert_eq!(Cnf::from_csv_string(&csv).unwrap(), form);
        // An inner connective outside a phrase.
        assert!(Dnf::from_csv_string("[1;2],,[3];").is_err());
        assert!(Cnf::from_csv_string("<[1]>").is_err());
        assert_eq!(Cnf::from_csv_string("").unwrap(), Cnf::get_true());
    }

    #[test]
    fn test_display_and_from_str() {
        init();
        let form: Dnf = "<(1&2)|(3)>".parse().unwrap();
        let printed = form.to_string();
        assert!(printed == "<(1&2)|(3)>" || printed == "<(3)|(1&2)>");
        assert_eq!(printed.parse::<Dnf>().unwrap(), form);
    }

    #[test]
    fn test_roundtrip_of_composed_forms() {
        init();
        let mut form = Dnf::or_props(1, 70);
        form.and(&Dnf::or_props(2, 130)).unwrap();
        form.or_prop(5).unwrap();
        let printed = form.to_string_sorted(true);
        assert_eq!(printed, "<(5)|(1&2)|(1&130)|(2&70)|(70&130)>");
        assert_eq!(Dnf::from_string(&printed).unwrap(), form);
    }
}
