//! Dense ordering primitive.
//!
//! Every ordered collection in a tier list stores an explicit position that
//! must equal the element's index in its list. After any structural change the
//! caller runs [`reindex`] over the affected list.

use super::{Item, Section};

/// An element with an explicit integer position.
pub trait Ordered {
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
}

impl Ordered for Item {
    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

impl Ordered for Section {
    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

/// Rewrite each element's order to its zero-based index, in one pass.
///
/// Returns the number of elements whose order actually changed.
pub fn reindex<T: Ordered>(list: &mut [T]) -> usize {
    let mut changed = 0;
    for (idx, element) in list.iter_mut().enumerate() {
        let idx = idx as i32;
        if element.order() != idx {
            element.set_order(idx);
            changed += 1;
        }
    }
    changed
}

/// `true` when every element's order equals its index.
pub fn is_dense<T: Ordered>(list: &[T]) -> bool {
    list.iter()
        .enumerate()
        .all(|(idx, element)| element.order() == idx as i32)
}

/// Resolve a requested insertion position against a list of length `len`.
///
/// `None`, negative, and past-the-end requests all append at the end.
pub fn insertion_index(requested: Option<i32>, len: usize) -> usize {
    match requested {
        Some(order) if order >= 0 && (order as usize) <= len => order as usize,
        _ => len,
    }
}
