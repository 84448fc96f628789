// ### MUTEX SIMPLIFICATION ###
// Size reduction for OR-of-AND forms given a pair of mutually exclusive propositions
// <A, B> (never both true) and the join points where the alternatives meet again.
// Two phrases X & A and X & B collapse into X & J for every join point J.
//
// Only pairs are supported.  A mutex group of any other size is left alone.

use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, trace};

use crate::errors::FormError;
use crate::normal_form::{insert_with_absorption, Dnf};
use crate::proven_set::ProvenSet;

// Whether `phrase` holds two or more of the mutually exclusive `forbidden_siblings`,
// ie. whether it can never be satisfied.
pub fn contains_forbidden_siblings(phrase: &ProvenSet, forbidden_siblings: &ProvenSet) -> bool {
    ProvenSet::intersects_more_than_once(phrase, forbidden_siblings)
}

pub fn assert_no_forbidden_siblings(phrase: &ProvenSet, forbidden_siblings: &ProvenSet) {
    debug_assert!(
        !contains_forbidden_siblings(phrase, forbidden_siblings),
        "Phrase {phrase} contains more than one mutex element from {forbidden_siblings}"
    );
}

impl Dnf {
    pub fn simplify_with_mutex_nodes(
        &mut self,
        mutex_nodes: &ProvenSet,
        join_points: &ProvenSet,
    ) -> Result<(), FormError> {
        self.check_modifiability()?;
        if mutex_nodes.cardinality() != 2 {
            debug!("Skipping mutex group {mutex_nodes}: only pairs are supported.");
            return Ok(());
        }

        // Two phrases can only merge if their symmetric difference is exactly the mutex
        // pair, which needs equal cardinality.  Grouping by cardinality cuts down the
        // quadratic comparison below.
        let mut grouped_by_cardinality: HashMap<usize, Vec<ProvenSet>> = HashMap::new();
        for phrase in &self.phrases {
            if mutex_nodes.intersects(phrase) {
                grouped_by_cardinality
                    .entry(phrase.cardinality())
                    .or_default()
                    .push(phrase.clone());
            }
        }
        debug!(
            "Cardinality groups ({}): {{{}}}",
            grouped_by_cardinality.len(),
            grouped_by_cardinality
                .iter()
                .map(|(card, group)| format!("#{card}={}", group.len()))
                .join(",")
        );

        // TODO: pairs could be compared in parallel if removal from and absorption into
        // `self.phrases` were queued.
        for mut phrases in grouped_by_cardinality.into_values() {
            let mut i = 0;
            while i < phrases.len() {
                assert_no_forbidden_siblings(&phrases[i], mutex_nodes);
                let partner = (i + 1..phrases.len()).find(|&j| {
                    trace!("Checking {} and {}", phrases[i], phrases[j]);
                    &(&phrases[i] ^ &phrases[j]) == mutex_nodes
                });
                if let Some(j) = partner {
                    // A phrase holds at most one of the pair and no two phrases are equal,
                    // so neither phrase can match anything else.  Drop the partner from the
                    // group; the outer loop moves past `i`.
                    let phrase_j = phrases.remove(j);
                    let phrase_i = &phrases[i];
                    trace!(
                        "Mutex pair {mutex_nodes} found in {phrase_i} and {phrase_j} (joins {join_points})"
                    );
                    trace!("before: {self}");

                    self.phrases.remove(phrase_i);
                    self.phrases.remove(&phrase_j);
                    let intersection = phrase_i & &phrase_j;
                    for join in join_points {
                        let mut replacement = intersection.clone();
                        replacement.insert(join);
                        insert_with_absorption(&mut self.phrases, replacement);
                    }

                    trace!("after: {self}");
                }
                i += 1;
            }
        }
        Ok(())
    }

    /// Removes every phrase holding more than one of `forbidden_siblings`.
    pub fn remove_forbidden_phrases(&mut self, forbidden_siblings: &ProvenSet) -> Result<(), FormError> {
        self.check_modifiability()?;
        let before = self.phrases.len();
        self.phrases
            .retain(|phrase| !contains_forbidden_siblings(phrase, forbidden_siblings));
        debug!(
            "Removed {} phrases with forbidden siblings {forbidden_siblings}",
            before - self.phrases.len()
        );
        Ok(())
    }

    pub fn contains_forbidden_siblings(&self, forbidden_siblings: &ProvenSet) -> bool {
        self.phrases
            .iter()
            .any(|phrase| contains_forbidden_siblings(phrase, forbidden_siblings))
    }

    pub fn assert_no_forbidden_siblings(&self, forbidden_siblings: &ProvenSet) {
        for phrase in &self.phrases {
            assert_no_forbidden_siblings(phrase, forbidden_siblings);
        }
    }
}
