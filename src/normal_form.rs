// ### NORMAL FORMS ###
// A `NormalForm` is a set of phrases (each a `ProvenSet`) joined by the outer connective,
// where every phrase joins its propositions with the opposite, inner connective.  The same
// engine serves both orientations: `Cnf` (AND of ORs) and `Dnf` (OR of ANDs).  The only
// difference between them is the `FormRules` value selected by the orientation type.
//
// Invariant: the phrases form an antichain under inclusion.  A phrase that is a superset
// of another is implied by it (under the inner connective) and is never kept.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use log::debug;

use crate::errors::FormError;
use crate::proven_set::{Prop, ProvenSet};
use crate::token::{Connectives, CONJUNCTIVE_STD, DISJUNCTIVE_STD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    // Union of the two phrase sets, re-establishing absorption.
    Append,
    // Pairwise union of phrases (the distribution law), re-establishing absorption.
    Distribute,
}

// How a constant is represented as a phrase set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantShape {
    NoPhrases,
    EmptyPhrase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormRules {
    pub and: Composition,
    pub or: Composition,
    pub true_shape: ConstantShape,
    pub false_shape: ConstantShape,
}

impl FormRules {
    // AND of OR-phrases: the vacuous AND is true, an empty OR-phrase is false.
    pub const CONJUNCTIVE: FormRules = FormRules {
        and: Composition::Append,
        or: Composition::Distribute,
        true_shape: ConstantShape::NoPhrases,
        false_shape: ConstantShape::EmptyPhrase,
    };

    // OR of AND-phrases: the vacuous OR is false, an empty AND-phrase is true.
    pub const DISJUNCTIVE: FormRules = FormRules {
        and: Composition::Distribute,
        or: Composition::Append,
        true_shape: ConstantShape::EmptyPhrase,
        false_shape: ConstantShape::NoPhrases,
    };

    pub fn outer_is_and(&self) -> bool {
        self.and == Composition::Append
    }
}

pub trait Orientation: fmt::Debug + Clone + Copy + PartialEq + Eq + Default {
    const RULES: FormRules;
    const NAME: &'static str;
    // Standard (human readable) dialect for this orientation.
    const STD: Connectives;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conjunctive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disjunctive;

impl Orientation for Conjunctive {
    const RULES: FormRules = FormRules::CONJUNCTIVE;
    const NAME: &'static str = "CNF";
    const STD: Connectives = CONJUNCTIVE_STD;
}

impl Orientation for Disjunctive {
    const RULES: FormRules = FormRules::DISJUNCTIVE;
    const NAME: &'static str = "DNF";
    const STD: Connectives = DISJUNCTIVE_STD;
}

pub type Cnf = NormalForm<Conjunctive>;
pub type Dnf = NormalForm<Disjunctive>;

#[derive(Debug)]
pub struct NormalForm<O: Orientation> {
    pub(crate) phrases: HashSet<ProvenSet>,
    unmodifiable: bool,
    orientation: PhantomData<O>,
}

pub(crate) fn insert_with_absorption(phrases: &mut HashSet<ProvenSet>, phrase: ProvenSet) -> bool {
    // Returns whether `phrase` was kept.  A rejected phrase leaves `phrases` untouched.
    if phrases.iter().any(|existing| existing.is_subset(&phrase)) {
        return false;
    }
    phrases.retain(|existing| !phrase.is_subset(existing));
    phrases.insert(phrase)
}

// General builders and accessors.
impl<O: Orientation> NormalForm<O> {
    fn from_phrases(phrases: HashSet<ProvenSet>) -> NormalForm<O> {
        NormalForm {
            phrases,
            unmodifiable: false,
            orientation: PhantomData,
        }
    }

    /// An empty phrase set: `true` for a `Cnf`, `false` for a `Dnf`.
    pub fn new() -> NormalForm<O> {
        NormalForm::from_phrases(HashSet::new())
    }

    pub fn from_prop(prop: Prop) -> NormalForm<O> {
        NormalForm::from_phrase(Some(ProvenSet::singleton(prop)))
    }

    /// `None` yields the empty phrase set, `Some(phrase)` a form holding just `phrase`
    /// (so an empty phrase is `false` for a `Cnf` and `true` for a `Dnf`).
    pub fn from_phrase(first: Option<ProvenSet>) -> NormalForm<O> {
        NormalForm::from_phrases(first.into_iter().collect())
    }

    fn with_shape(shape: ConstantShape) -> NormalForm<O> {
        match shape {
            ConstantShape::NoPhrases => NormalForm::from_phrase(None),
            ConstantShape::EmptyPhrase => NormalForm::from_phrase(Some(ProvenSet::new())),
        }
    }

    fn has_shape(&self, shape: ConstantShape) -> bool {
        match shape {
            ConstantShape::NoPhrases => self.phrases.is_empty(),
            ConstantShape::EmptyPhrase => {
                self.phrases.len() == 1 && self.phrases.contains(&ProvenSet::new())
            }
        }
    }

    pub fn get_true() -> NormalForm<O> {
        NormalForm::with_shape(O::RULES.true_shape)
    }

    pub fn get_false() -> NormalForm<O> {
        NormalForm::with_shape(O::RULES.false_shape)
    }

    pub fn is_true(&self) -> bool {
        self.has_shape(O::RULES.true_shape)
    }

    pub fn is_false(&self) -> bool {
        self.has_shape(O::RULES.false_shape)
    }

    /// Deep copy of every phrase.  The flag of the copy is independent of `self`'s.
    pub fn clone_form(&self, unmodifiable: bool) -> NormalForm<O> {
        NormalForm {
            phrases: self.phrases.clone(),
            unmodifiable,
            orientation: PhantomData,
        }
    }

    pub fn is_unmodifiable(&self) -> bool {
        self.unmodifiable
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn phrases(&self) -> impl Iterator<Item = &ProvenSet> {
        self.phrases.iter()
    }

    pub fn contains_phrase(&self, phrase: &ProvenSet) -> bool {
        self.phrases.contains(phrase)
    }

    // Every proposition mentioned anywhere in the form.
    pub fn props(&self) -> ProvenSet {
        self.phrases
            .iter()
            .fold(ProvenSet::new(), |acc, phrase| &acc | phrase)
    }

    pub(crate) fn check_modifiability(&self) -> Result<(), FormError> {
        if self.unmodifiable {
            return Err(FormError::Unmodifiable);
        }
        Ok(())
    }

    /// Adds `phrase` unless an existing phrase absorbs it, dropping every existing
    /// superset of it.  Returns whether the phrase was kept.
    pub fn insert_with_absorption(&mut self, phrase: ProvenSet) -> Result<bool, FormError> {
        self.check_modifiability()?;
        Ok(insert_with_absorption(&mut self.phrases, phrase))
    }

    /// Evaluates the formula when exactly the propositions in `assignment` are true.
    pub fn eval(&self, assignment: &ProvenSet) -> bool {
        if O::RULES.outer_is_and() {
            self.phrases.iter().all(|phrase| phrase.intersects(assignment))
        } else {
            self.phrases.iter().any(|phrase| phrase.is_subset(assignment))
        }
    }
}

// Composition.
impl<O: Orientation> NormalForm<O> {
    fn compose_same_connective(&mut self, other: &NormalForm<O>) {
        for phrase in &other.phrases {
            insert_with_absorption(&mut self.phrases, phrase.clone());
        }
    }

    fn compose_opposite_connective(&mut self, other: &NormalForm<O>) {
        // Absorption keeps the result well below the full cross product.
        let mut result = HashSet::with_capacity(self.phrases.len().max(other.phrases.len()));
        for p in &self.phrases {
            for q in &other.phrases {
                insert_with_absorption(&mut result, p | q);
            }
        }
        self.phrases = result;
    }

    fn compose(&mut self, composition: Composition, other: &NormalForm<O>) {
        let before = self.phrases.len();
        match composition {
            Composition::Append => self.compose_same_connective(other),
            Composition::Distribute => self.compose_opposite_connective(other),
        }
        debug!(
            "{} {composition:?}: {before} x {} phrases -> {}",
            O::NAME,
            other.phrases.len(),
            self.phrases.len()
        );
    }

    pub fn and(&mut self, other: &NormalForm<O>) -> Result<&mut NormalForm<O>, FormError> {
        self.check_modifiability()?;
        self.compose(O::RULES.and, other);
        Ok(self)
    }

    pub fn or(&mut self, other: &NormalForm<O>) -> Result<&mut NormalForm<O>, FormError> {
        self.check_modifiability()?;
        self.compose(O::RULES.or, other);
        Ok(self)
    }

    pub fn and_prop(&mut self, prop: Prop) -> Result<&mut NormalForm<O>, FormError> {
        self.and(&NormalForm::from_prop(prop))
    }

    pub fn or_prop(&mut self, prop: Prop) -> Result<&mut NormalForm<O>, FormError> {
        self.or(&NormalForm::from_prop(prop))
    }

    // The following build a new form and leave both operands untouched.

    pub fn conjoin(in1: &NormalForm<O>, in2: &NormalForm<O>) -> NormalForm<O> {
        let mut result = in1.clone();
        result.compose(O::RULES.and, in2);
        result
    }

    pub fn disjoin(in1: &NormalForm<O>, in2: &NormalForm<O>) -> NormalForm<O> {
        let mut result = in1.clone();
        result.compose(O::RULES.or, in2);
        result
    }

    pub fn and_props(in1: Prop, in2: Prop) -> NormalForm<O> {
        NormalForm::conjoin(&NormalForm::from_prop(in1), &NormalForm::from_prop(in2))
    }

    pub fn or_props(in1: Prop, in2: Prop) -> NormalForm<O> {
        NormalForm::disjoin(&NormalForm::from_prop(in1), &NormalForm::from_prop(in2))
    }
}

impl<O: Orientation> Default for NormalForm<O> {
    fn default() -> NormalForm<O> {
        NormalForm::new()
    }
}

// A plain clone is always modifiable; use `clone_form` to choose.
impl<O: Orientation> Clone for NormalForm<O> {
    fn clone(&self) -> NormalForm<O> {
        self.clone_form(false)
    }
}

impl<O: Orientation> PartialEq for NormalForm<O> {
    fn eq(&self, other: &NormalForm<O>) -> bool {
        self.phrases == other.phrases
    }
}

impl<O: Orientation> Eq for NormalForm<O> {}

impl<O: Orientation> fmt::Display for NormalForm<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_sorted(false))
    }
}

impl<O: Orientation> FromStr for NormalForm<O> {
    type Err = FormError;

    fn from_str(input: &str) -> Result<NormalForm<O>, FormError> {
        NormalForm::from_string(input)
    }
}
