// ### PROVEN SETS ###
// A sparse, ordered set of propositions.  Propositions are plain non-negative integers;
// the set stores only the 64-bit words that actually hold a member, so large but scattered
// proposition ids (eg. node ids coming out of a control flow graph) stay cheap.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};

// An atomic boolean variable.
pub type Prop = usize;

const BITS_PER_WORD: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ProvenSet {
    // (word index, word) pairs sorted by word index.  A zero word is never stored, so the
    // derived equality and hash coincide with set equality.
    words: Vec<(usize, u64)>,
}

#[inline]
fn word_and_bit(prop: Prop) -> (usize, usize) {
    (prop / BITS_PER_WORD, prop % BITS_PER_WORD)
}

impl ProvenSet {
    pub fn new() -> ProvenSet {
        ProvenSet { words: Vec::new() }
    }

    pub fn singleton(prop: Prop) -> ProvenSet {
        let mut set = ProvenSet::new();
        set.insert(prop);
        set
    }

    fn position(&self, word_idx: usize) -> Result<usize, usize> {
        self.words.binary_search_by_key(&word_idx, |&(idx, _)| idx)
    }

    /// Adds `prop`, returning true if it was not already present.
    pub fn insert(&mut self, prop: Prop) -> bool {
        let (word_idx, bit_idx) = word_and_bit(prop);
        let mask = 1u64 << bit_idx;
        match self.position(word_idx) {
            Ok(pos) => {
                let word = &mut self.words[pos].1;
                let was_clear = *word & mask == 0;
                *word |= mask;
                was_clear
            }
            Err(pos) => {
                self.words.insert(pos, (word_idx, mask));
                true
            }
        }
    }

    /// Removes `prop`, returning true if it was present.
    pub fn remove(&mut self, prop: Prop) -> bool {
        let (word_idx, bit_idx) = word_and_bit(prop);
        let mask = 1u64 << bit_idx;
        match self.position(word_idx) {
            Ok(pos) => {
                let word = &mut self.words[pos].1;
                let was_set = *word & mask != 0;
                *word &= !mask;
                if *word == 0 {
                    self.words.remove(pos);
                }
                was_set
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, prop: Prop) -> bool {
        let (word_idx, bit_idx) = word_and_bit(prop);
        match self.position(word_idx) {
            Ok(pos) => self.words[pos].1 & (1u64 << bit_idx) != 0,
            Err(_) => false,
        }
    }

    pub fn cardinality(&self) -> usize {
        self.words
            .iter()
            .map(|&(_, word)| word.count_ones() as usize)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn min_element(&self) -> Option<Prop> {
        self.words
            .first()
            .map(|&(idx, word)| idx * BITS_PER_WORD + word.trailing_zeros() as usize)
    }

    /// The smallest member that is `> prop`, if any.
    pub fn next_element_after(&self, prop: Prop) -> Option<Prop> {
        self.next_element(prop.checked_add(1)?)
    }

    /// The smallest member that is `>= from`, if any.
    pub fn next_element(&self, from: Prop) -> Option<Prop> {
        let (word_idx, bit_idx) = word_and_bit(from);
        let pos = self.words.partition_point(|&(idx, _)| idx < word_idx);
        let (idx, word) = *self.words.get(pos)?;
        if idx == word_idx {
            let masked = word & (!0u64 << bit_idx);
            if masked != 0 {
                return Some(idx * BITS_PER_WORD + masked.trailing_zeros() as usize);
            }
            // Nothing left in this word; the next stored word is non-zero by construction.
            return self
                .words
                .get(pos + 1)
                .map(|&(next, word)| next * BITS_PER_WORD + word.trailing_zeros() as usize);
        }
        Some(idx * BITS_PER_WORD + word.trailing_zeros() as usize)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            pos: 0,
            current: self.words.first().map(|&(_, word)| word).unwrap_or(0),
        }
    }

    fn merge(a: &ProvenSet, b: &ProvenSet, op: impl Fn(u64, u64) -> u64) -> ProvenSet {
        // Co-walk the two word lists in index order, combining words with `op`
        // (a missing word counts as zero) and dropping zero results.
        let mut words = Vec::with_capacity(a.words.len().max(b.words.len()));
        let (mut i, mut j) = (0, 0);
        loop {
            let (idx, word) = match (a.words.get(i), b.words.get(j)) {
                (Some(&(ia, wa)), Some(&(ib, wb))) => match ia.cmp(&ib) {
                    Ordering::Less => {
                        i += 1;
                        (ia, op(wa, 0))
                    }
                    Ordering::Greater => {
                        j += 1;
                        (ib, op(0, wb))
                    }
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                        (ia, op(wa, wb))
                    }
                },
                (Some(&(ia, wa)), None) => {
                    i += 1;
                    (ia, op(wa, 0))
                }
                (None, Some(&(ib, wb))) => {
                    j += 1;
                    (ib, op(0, wb))
                }
                (None, None) => break,
            };
            if word != 0 {
                words.push((idx, word));
            }
        }
        ProvenSet { words }
    }

    pub fn union(a: &ProvenSet, b: &ProvenSet) -> ProvenSet {
        ProvenSet::merge(a, b, |x, y| x | y)
    }

    pub fn intersect(a: &ProvenSet, b: &ProvenSet) -> ProvenSet {
        ProvenSet::merge(a, b, |x, y| x & y)
    }

    pub fn xor(a: &ProvenSet, b: &ProvenSet) -> ProvenSet {
        ProvenSet::merge(a, b, |x, y| x ^ y)
    }

    pub fn is_subset(&self, other: &ProvenSet) -> bool {
        let mut others = other.words.iter().peekable();
        for &(idx, word) in &self.words {
            while others.next_if(|&&(other_idx, _)| other_idx < idx).is_some() {}
            match others.peek() {
                Some(&&(other_idx, other_word)) if other_idx == idx => {
                    if word & !other_word != 0 {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    pub fn intersects(&self, other: &ProvenSet) -> bool {
        let mut others = other.words.iter().peekable();
        for &(idx, word) in &self.words {
            while others.next_if(|&&(other_idx, _)| other_idx < idx).is_some() {}
            if let Some(&&(other_idx, other_word)) = others.peek() {
                if other_idx == idx && word & other_word != 0 {
                    return true;
                }
            }
        }
        false
    }

    pub fn intersects_more_than_once(a: &ProvenSet, b: &ProvenSet) -> bool {
        // Ascending co-walk over both sets; stops on the second shared element and never
        // builds the intersection.
        let mut found = false;
        let mut i = a.min_element();
        let mut j = i.and_then(|start| b.next_element(start));
        while let (Some(x), Some(y)) = (i, j) {
            match x.cmp(&y) {
                Ordering::Less => i = a.next_element_after(x),
                Ordering::Greater => j = b.next_element_after(y),
                Ordering::Equal => {
                    if found {
                        return true;
                    }
                    found = true;
                    i = a.next_element_after(x);
                    j = b.next_element_after(y);
                }
            }
        }
        false
    }
}

pub struct Iter<'a> {
    words: &'a [(usize, u64)],
    pos: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = Prop;

    fn next(&mut self) -> Option<Prop> {
        loop {
            if self.current != 0 {
                let bit_idx = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.words[self.pos].0 * BITS_PER_WORD + bit_idx);
            }
            self.pos += 1;
            self.current = self.words.get(self.pos)?.1;
        }
    }
}

impl<'a> IntoIterator for &'a ProvenSet {
    type Item = Prop;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<Prop> for ProvenSet {
    fn from_iter<I: IntoIterator<Item = Prop>>(iter: I) -> ProvenSet {
        let mut set = ProvenSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Prop> for ProvenSet {
    fn extend<I: IntoIterator<Item = Prop>>(&mut self, iter: I) {
        for prop in iter {
            self.insert(prop);
        }
    }
}

impl BitOr for &ProvenSet {
    type Output = ProvenSet;

    fn bitor(self, rhs: Self) -> ProvenSet {
        ProvenSet::union(self, rhs)
    }
}

impl BitAnd for &ProvenSet {
    type Output = ProvenSet;

    fn bitand(self, rhs: Self) -> ProvenSet {
        ProvenSet::intersect(self, rhs)
    }
}

impl BitXor for &ProvenSet {
    type Output = ProvenSet;

    fn bitxor(self, rhs: Self) -> ProvenSet {
        ProvenSet::xor(self, rhs)
    }
}

impl fmt::Debug for ProvenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ProvenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
