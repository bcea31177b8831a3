//! Mating pairs.

use super::individual::Individual;
use std::ptr;

/// An unordered pair of survivors chosen for mating.
///
/// Both members are borrowed from the population; a pair never owns
/// individuals. Two pairs are equal when they reference the same two
/// individuals, in either order.
#[derive(Debug, Clone, Copy)]
pub struct Parents<'a> {
    dad: &'a Individual,
    mom: &'a Individual,
}

impl<'a> Parents<'a> {
    pub fn new(dad: &'a Individual, mom: &'a Individual) -> Self {
        Self { dad, mom }
    }

    pub fn dad(&self) -> &'a Individual {
        self.dad
    }

    pub fn mom(&self) -> &'a Individual {
        self.mom
    }

    /// Whether `individual` is one of the two parents (by identity).
    pub fn contains(&self, individual: &Individual) -> bool {
        ptr::eq(self.dad, individual) || ptr::eq(self.mom, individual)
    }
}

impl PartialEq for Parents<'_> {
    fn eq(&self, other: &Self) -> bool {
        (ptr::eq(self.dad, other.dad) && ptr::eq(self.mom, other.mom))
            || (ptr::eq(self.dad, other.mom) && ptr::eq(self.mom, other.dad))
    }
}

impl Eq for Parents<'_> {}
