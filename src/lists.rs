// In-memory collections of dresses and loans.
//
// Both lists keep insertion order, refuse exact duplicates and never hold
// more than their capacity. Nothing here is sent back to the server.

use tracing::debug;

use crate::domain::{Dress, DressLoan};
use crate::error::{DomainError, DomainResult};

/// A record that can be stored in a [`RecordList`].
pub trait Record: Clone + PartialEq {
    /// Maximum number of items a list of this record may hold.
    const CAPACITY: usize;
    /// Name used in log events.
    const KIND: &'static str;
}

impl Record for Dress {
    const CAPACITY: usize = 10_000;
    const KIND: &'static str = "dress";
}

impl Record for DressLoan {
    const CAPACITY: usize = 100_000;
    const KIND: &'static str = "dress loan";
}

/// Ordered, bounded list without structural duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordList<T: Record> {
    items: Vec<T>,
}

pub type DressList = RecordList<Dress>;
pub type DressLoanList = RecordList<DressLoan>;

impl<T: Record> Default for RecordList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn capacity(&self) -> usize {
        T::CAPACITY
    }

    pub fn length(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends `item` unless the list is full or already holds an equal one.
    pub fn add(&mut self, item: T) -> DomainResult<()> {
        if self.items.len() >= T::CAPACITY {
            return Err(DomainError::CapacityExceeded { max: T::CAPACITY });
        }
        if self.contains(&item) {
            debug!(kind = T::KIND, "rejected duplicate");
            return Err(DomainError::Duplicate);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    pub fn item(&self, index: usize) -> DomainResult<&T> {
        self.items.get(index).ok_or(DomainError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Removes the item at `index`, shifting later items down.
    pub fn remove_by_index(&mut self, index: usize) -> DomainResult<T> {
        if index >= self.items.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl RecordList<Dress> {
    /// Stable ascending sort by price.
    pub fn sort_by_price(&mut self) {
        self.items.sort_by_key(|dress| dress.price);
    }
}

impl RecordList<DressLoan> {
    /// Stable ascending sort by total price.
    pub fn sort_by_total_price(&mut self) {
        self.items.sort_by_key(|loan| loan.total_price);
    }
}
