//! One page of a listing together with the total row count.

/// Page of items plus the number of rows across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> Paged<T> {
    pub fn new(count: usize, items: Vec<T>) -> Self {
        Self { count, items }
    }
}
