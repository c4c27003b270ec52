use core::cmp::Ordering;
use core::fmt;

cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::boxed::Box;
    } else {
        use std::boxed::Box;
    }
}

pub type SequenceResult<T> = Result<T, SequenceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// `index` fell outside the range accepted by `op` for a sequence of
    /// length `len`
    IndexOutOfBounds {
        op: &'static str,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::IndexOutOfBounds { op, index, len } => {
                write!(f, "{}: invalid index = {} (len {})", op, index, len)
            }
        }
    }
}

#[cfg(not(feature = "no-std"))]
impl std::error::Error for SequenceError {}

/// a position-indexed sequence of values
///
/// positions run from 0 (the first element) to `len() - 1` (the last one).
/// value queries use `T`'s `PartialEq`, never identity.
pub trait Sequence<T> {
    /// the number of elements currently held
    fn len(&self) -> usize;

    /// returns true if the sequence holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// remove every element, leaving an empty sequence
    fn clear(&mut self);

    /// borrow the element at `index`, failing if `index >= len()`
    fn get(&self, index: usize) -> SequenceResult<&T>;

    /// overwrite the element at `index` with `value` and return the newly
    /// stored value, failing if `index >= len()`
    fn set(&mut self, index: usize, value: T) -> SequenceResult<&T>;

    /// append `value` after the current last element
    fn add(&mut self, value: T) {
        let len = self.len();
        if self.insert(len, value).is_err() {
            unreachable!("inserting at len() is always in range");
        }
    }

    /// insert `value` so that it ends up at `index`, shifting later elements
    /// back by one. `index == len()` appends. fails if `index > len()`
    fn insert(&mut self, index: usize, value: T) -> SequenceResult<()>;

    /// remove the element at `index`. returns false, leaving the sequence
    /// untouched, if there is no such element
    fn remove(&mut self, index: usize) -> bool;

    /// remove every element equal to `value`, returning how many went
    fn remove_all(&mut self, value: &T) -> usize
    where
        T: PartialEq;

    fn first(&self) -> Option<&T>;

    fn last(&self) -> Option<&T>;

    /// position of the first element equal to `value`
    fn first_index(&self, value: &T) -> Option<usize>
    where
        T: PartialEq;

    /// position of the last element equal to `value`
    fn last_index(&self, value: &T) -> Option<usize>
    where
        T: PartialEq;

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.first_index(value).is_some()
    }

    /// copy the elements, in order, into a freshly allocated slice
    fn to_array(&self) -> Box<[T]>
    where
        T: Clone;

    /// reorder the elements into non-decreasing order under `cmp`
    fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering;
}
