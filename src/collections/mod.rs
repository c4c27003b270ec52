pub mod recursive_linked_list;
pub mod sequence;

pub use recursive_linked_list::RecursiveLinkedList;
pub use sequence::{Sequence, SequenceError, SequenceResult};
