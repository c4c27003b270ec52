use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use super::sequence::{Sequence, SequenceError, SequenceResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::boxed::Box;
    } else {
        use std::boxed::Box;
    }
}

/// an owning link to the rest of a chain, `None` marks the end
type Link<T> = Option<Box<Node<T>>>;

/// a singly-linked, position-indexed list whose structural operations walk
/// the chain recursively
///
/// every mutator is written as a function from (sublist, remaining hops) to
/// the new head of that sublist: the edit happens once the hop count reaches
/// zero, and each level above reattaches whatever its callee returned as its
/// own successor. no node ever needs to know its predecessor.
///
/// recursion depth is proportional to the index being touched (and to the
/// length of the list for `sort_by`), so very long lists can exhaust the
/// stack.
pub struct RecursiveLinkedList<T> {
    /// the first node, or None if the list is empty
    head: Link<T>,
    /// the number of nodes reachable from `head`, kept in step by every
    /// insert and remove
    len: usize,
}

struct Node<T> {
    value: T,
    next: Link<T>,
}

impl<T> Node<T> {
    const fn new(value: T) -> Self {
        Self::linked(value, None)
    }

    const fn linked(value: T, next: Link<T>) -> Self {
        Self { value, next }
    }

    /// detach and return everything after this node
    fn take_next(&mut self) -> Link<T> {
        self.next.take()
    }

    fn set_next(&mut self, next: Link<T>) {
        self.next = next;
    }

    fn successor(&self) -> &Node<T> {
        match self.next.as_deref() {
            Some(next) => next,
            None => unreachable!("walked past the end of the chain"),
        }
    }

    fn successor_mut(&mut self) -> &mut Node<T> {
        match self.next.as_deref_mut() {
            Some(next) => next,
            None => unreachable!("walked past the end of the chain"),
        }
    }
}

/// unwrap a link the cached length guarantees to be present
fn present<T>(link: Link<T>) -> Box<Node<T>> {
    match link {
        Some(node) => node,
        None => unreachable!("chain is shorter than the cached length"),
    }
}

impl<T> RecursiveLinkedList<T> {
    /// create an empty list
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// remove the head until nothing is left
    pub fn clear(&mut self) {
        let dropped = self.len;
        while !self.is_empty() {
            self.remove(0);
        }
        log::trace!("clear: dropped {} nodes", dropped);
    }

    /// borrow the value at `index`
    pub fn get(&self, index: usize) -> SequenceResult<&T> {
        if index >= self.len {
            return Err(self.out_of_bounds("get", index));
        }

        let head = match self.head.as_deref() {
            Some(head) => head,
            None => unreachable!("non-empty list has no head"),
        };
        Ok(Self::rec_get(head, index))
    }

    /// overwrite the value at `index`, returning the value now stored there
    pub fn set(&mut self, index: usize, value: T) -> SequenceResult<&T> {
        if index >= self.len {
            return Err(self.out_of_bounds("set", index));
        }

        let head = match self.head.as_deref_mut() {
            Some(head) => head,
            None => unreachable!("non-empty list has no head"),
        };
        Ok(Self::rec_set(head, index, value))
    }

    /// append `value` after the last element
    pub fn add(&mut self, value: T) {
        self.splice_in(self.len, value);
    }

    /// insert `value` so that it ends up at `index`. `index == len()` is
    /// accepted and appends
    pub fn insert(&mut self, index: usize, value: T) -> SequenceResult<()> {
        if index > self.len {
            return Err(self.out_of_bounds("insert", index));
        }

        self.splice_in(index, value);
        Ok(())
    }

    /// remove the element at `index`, returning false if there is none
    pub fn remove(&mut self, index: usize) -> bool {
        self.take(index).is_some()
    }

    /// remove the element at `index` and hand its value back, or None if
    /// `index` is out of range
    pub fn take(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }

        let (rest, value) = Self::rec_remove(present(self.head.take()), index);
        self.head = rest;
        self.len -= 1;
        log::trace!("remove at {}: len now {}", index, self.len);
        Some(value)
    }

    /// unlink every node whose value equals `value`, returning how many were
    /// removed
    pub fn remove_all(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        let mut removed = 0;
        let mut rest = self.head.take();
        let mut tail = &mut self.head;

        // relink the survivors one at a time; a matching node is dropped
        // with its successor already detached
        while let Some(mut node) = rest {
            rest = node.take_next();
            if node.value == *value {
                removed += 1;
            } else {
                tail = &mut tail.insert(node).next;
            }
        }

        self.len -= removed;
        log::trace!("remove_all: {} removed, len now {}", removed, self.len);
        removed
    }

    pub fn first(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.value)
    }

    /// the value in the final node. there is no tail reference so this
    /// walks the whole chain
    pub fn last(&self) -> Option<&T> {
        self.iter().last()
    }

    pub fn first_index(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|v| v == value)
    }

    pub fn last_index(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter()
            .enumerate()
            .fold(None, |found, (i, v)| if v == value { Some(i) } else { found })
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.first_index(value).is_some()
    }

    /// copy the values, in chain order, into a new boxed slice
    pub fn to_array(&self) -> Box<[T]>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// sort into non-decreasing order under `cmp` using a recursive
    /// insertion sort
    ///
    /// a node is placed in front of the first node it does not compare
    /// greater than, so elements that compare equal keep their original
    /// relative order.
    pub fn sort_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.len <= 1 {
            return;
        }

        self.head = Some(Self::rec_insertion_sort(present(self.head.take()), &mut cmp));
        log::trace!("sort: reordered {} nodes", self.len);
    }

    /// sort into non-decreasing order under `T`'s own ordering
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(Ord::cmp);
    }

    /// return an immutable iterator for this list
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }

    fn splice_in(&mut self, index: usize, value: T) {
        self.head = Some(Self::rec_add(self.head.take(), index, value));
        self.len += 1;
        log::trace!("insert at {}: len now {}", index, self.len);
    }

    fn out_of_bounds(&self, op: &'static str, index: usize) -> SequenceError {
        SequenceError::IndexOutOfBounds {
            op,
            index,
            len: self.len,
        }
    }

    // the recursive helpers below presume the chain starting at their first
    // argument is long enough for `hops`; callers check bounds beforehand

    fn rec_get(node: &Node<T>, hops: usize) -> &T {
        if hops == 0 {
            &node.value
        } else {
            Self::rec_get(node.successor(), hops - 1)
        }
    }

    fn rec_set(node: &mut Node<T>, hops: usize, value: T) -> &T {
        if hops == 0 {
            node.value = value;
            &node.value
        } else {
            Self::rec_set(node.successor_mut(), hops - 1, value)
        }
    }

    /// returns the new head of the sublist `link` after placing `value`
    /// `hops` positions into it
    fn rec_add(link: Link<T>, hops: usize, value: T) -> Box<Node<T>> {
        if hops == 0 {
            return Box::new(Node::linked(value, link));
        }

        let mut node = present(link);
        let rest = node.take_next();
        node.set_next(Some(Self::rec_add(rest, hops - 1, value)));
        node
    }

    /// returns the new head of the sublist starting at `node` after removing
    /// the node `hops` positions in, along with that node's value
    fn rec_remove(mut node: Box<Node<T>>, hops: usize) -> (Link<T>, T) {
        let rest = node.take_next();
        if hops == 0 {
            let Node { value, .. } = *node;
            return (rest, value);
        }

        let (rest, value) = Self::rec_remove(present(rest), hops - 1);
        node.set_next(rest);
        (Some(node), value)
    }

    /// sort the sublist after `first`, then slot `first` into it
    fn rec_insertion_sort<F>(mut first: Box<Node<T>>, cmp: &mut F) -> Box<Node<T>>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        match first.take_next() {
            None => first,
            Some(rest) => {
                let sorted = Self::rec_insertion_sort(rest, cmp);
                Self::rec_insert_by_order(first, Some(sorted), cmp)
            }
        }
    }

    /// insert the detached node `to_insert` into the sorted sublist `link`,
    /// returning the sublist's new head
    fn rec_insert_by_order<F>(
        mut to_insert: Box<Node<T>>,
        link: Link<T>,
        cmp: &mut F,
    ) -> Box<Node<T>>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        match link {
            None => {
                to_insert.set_next(None);
                to_insert
            }
            Some(mut first) => {
                if cmp(&to_insert.value, &first.value) != Ordering::Greater {
                    to_insert.set_next(Some(first));
                    to_insert
                } else {
                    let rest = first.take_next();
                    first.set_next(Some(Self::rec_insert_by_order(to_insert, rest, cmp)));
                    first
                }
            }
        }
    }
}

impl<T> Drop for RecursiveLinkedList<T> {
    fn drop(&mut self) {
        // unlink node by node so a long chain doesn't recurse through
        // nested Box destructors
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.take_next();
        }
    }
}

impl<T> Default for RecursiveLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RecursiveLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> Clone for RecursiveLinkedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for RecursiveLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RecursiveLinkedList<T> {}

impl<T> Extend<T> for RecursiveLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        // find the end once instead of descending from the head per value
        let mut tail = &mut self.head;
        while let Some(node) = tail {
            tail = &mut node.next;
        }

        let mut added = 0;
        for value in iter {
            tail = &mut tail.insert(Box::new(Node::new(value))).next;
            added += 1;
        }
        self.len += added;
    }
}

impl<T> FromIterator<T> for RecursiveLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a, T> IntoIterator for &'a RecursiveLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Sequence<T> for RecursiveLinkedList<T> {
    fn len(&self) -> usize {
        RecursiveLinkedList::len(self)
    }

    fn clear(&mut self) {
        RecursiveLinkedList::clear(self)
    }

    fn get(&self, index: usize) -> SequenceResult<&T> {
        RecursiveLinkedList::get(self, index)
    }

    fn set(&mut self, index: usize, value: T) -> SequenceResult<&T> {
        RecursiveLinkedList::set(self, index, value)
    }

    fn add(&mut self, value: T) {
        RecursiveLinkedList::add(self, value)
    }

    fn insert(&mut self, index: usize, value: T) -> SequenceResult<()> {
        RecursiveLinkedList::insert(self, index, value)
    }

    fn remove(&mut self, index: usize) -> bool {
        RecursiveLinkedList::remove(self, index)
    }

    fn remove_all(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        RecursiveLinkedList::remove_all(self, value)
    }

    fn first(&self) -> Option<&T> {
        RecursiveLinkedList::first(self)
    }

    fn last(&self) -> Option<&T> {
        RecursiveLinkedList::last(self)
    }

    fn first_index(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        RecursiveLinkedList::first_index(self, value)
    }

    fn last_index(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        RecursiveLinkedList::last_index(self, value)
    }

    fn to_array(&self) -> Box<[T]>
    where
        T: Clone,
    {
        RecursiveLinkedList::to_array(self)
    }

    fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        RecursiveLinkedList::sort_by(self, cmp)
    }
}

/// an iterator over the values of a `RecursiveLinkedList`, head first
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// count nodes by following links from the head, ignoring the cached length
#[cfg(test)]
fn chain_len<T>(list: &RecursiveLinkedList<T>) -> usize {
    let mut count = 0;
    let mut link = list.head.as_deref();
    while let Some(node) = link {
        count += 1;
        link = node.next.as_deref();
    }
    count
}

#[cfg(test)]
mod test {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn list_of(values: &[u32]) -> RecursiveLinkedList<u32> {
        values.iter().copied().collect()
    }

    fn values_of(list: &RecursiveLinkedList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    /// bumps a shared counter when dropped
    struct DropCounter {
        id: u32,
        drops: Rc<Cell<usize>>,
    }

    impl PartialEq for DropCounter {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn recursive_linked_lists_are_sendable() {
        fn send<S: Send>(_: S) {}
        send(RecursiveLinkedList::<u32>::new());
    }

    #[test]
    fn new_list_is_empty() {
        let ll = RecursiveLinkedList::<u32>::new();
        assert_eq!(ll.len(), 0);
        assert!(ll.is_empty());
        assert!(ll.head.is_none());
    }

    #[test]
    fn first_and_last_on_empty_list_return_none() {
        let ll = RecursiveLinkedList::<u32>::new();
        assert_eq!(ll.first(), None);
        assert_eq!(ll.last(), None);
    }

    #[test]
    fn get_on_empty_list_is_out_of_bounds() {
        let ll = RecursiveLinkedList::<u32>::new();
        assert_eq!(
            ll.get(0),
            Err(SequenceError::IndexOutOfBounds {
                op: "get",
                index: 0,
                len: 0
            })
        );
    }

    #[test]
    fn remove_on_empty_list_returns_false() {
        init_logger();
        let mut ll = RecursiveLinkedList::<u32>::new();
        assert!(!ll.remove(0));
        assert!(ll.is_empty());
    }

    #[test]
    fn add_appends_in_order() {
        init_logger();
        let mut ll = RecursiveLinkedList::new();
        ll.add(5);
        ll.add(3);
        ll.add(8);
        assert_eq!(values_of(&ll), [5, 3, 8]);
        assert_eq!(ll.len(), 3);
        assert_eq!(chain_len(&ll), 3);
    }

    #[test]
    fn insert_at_front_middle_and_end() {
        init_logger();
        let mut ll = list_of(&[1, 2, 3]);
        ll.insert(0, 10).expect("insert at head");
        assert_eq!(values_of(&ll), [10, 1, 2, 3]);
        ll.insert(2, 20).expect("insert in the middle");
        assert_eq!(values_of(&ll), [10, 1, 20, 2, 3]);
        ll.insert(5, 30).expect("insert at len");
        assert_eq!(values_of(&ll), [10, 1, 20, 2, 3, 30]);
        assert_eq!(ll.len(), 6);
        assert_eq!(chain_len(&ll), 6);
    }

    #[test]
    fn insert_past_len_is_rejected_and_leaves_list_untouched() {
        let mut ll = list_of(&[1, 2]);
        assert_eq!(
            ll.insert(3, 9),
            Err(SequenceError::IndexOutOfBounds {
                op: "insert",
                index: 3,
                len: 2
            })
        );
        assert_eq!(values_of(&ll), [1, 2]);
        assert_eq!(ll.len(), 2);
    }

    #[test]
    fn insert_into_empty_list_at_zero() {
        let mut ll = RecursiveLinkedList::new();
        ll.insert(0, 7).expect("insert at 0 of empty list");
        assert_eq!(ll.first(), Some(&7));
        assert_eq!(ll.last(), Some(&7));
    }

    #[test]
    fn get_walks_to_each_position() {
        let ll = list_of(&[4, 5, 6, 7]);
        for (i, expected) in [4, 5, 6, 7].iter().enumerate() {
            assert_eq!(ll.get(i), Ok(expected));
        }
        assert!(ll.get(4).is_err());
    }

    #[test]
    fn set_overwrites_and_returns_new_value() {
        let mut ll = list_of(&[1, 2, 3]);
        assert_eq!(ll.set(1, 42), Ok(&42));
        assert_eq!(ll.get(1), Ok(&42));
        assert_eq!(values_of(&ll), [1, 42, 3]);
        assert_eq!(ll.len(), 3);
    }

    #[test]
    fn set_out_of_bounds_is_rejected() {
        let mut ll = list_of(&[1]);
        assert_eq!(
            ll.set(1, 5),
            Err(SequenceError::IndexOutOfBounds {
                op: "set",
                index: 1,
                len: 1
            })
        );
        assert_eq!(values_of(&ll), [1]);
    }

    #[test]
    fn remove_head_interior_and_tail() {
        init_logger();
        let mut ll = list_of(&[1, 2, 3, 4, 5]);
        assert!(ll.remove(0));
        assert_eq!(values_of(&ll), [2, 3, 4, 5]);
        assert!(ll.remove(1));
        assert_eq!(values_of(&ll), [2, 4, 5]);
        assert!(ll.remove(2));
        assert_eq!(values_of(&ll), [2, 4]);
        assert!(!ll.remove(2));
        assert_eq!(ll.len(), 2);
        assert_eq!(chain_len(&ll), 2);
    }

    #[test]
    fn take_returns_the_removed_value() {
        let mut ll = list_of(&[7, 8, 9]);
        assert_eq!(ll.take(1), Some(8));
        assert_eq!(ll.take(5), None);
        assert_eq!(values_of(&ll), [7, 9]);
    }

    #[test]
    fn removed_values_are_dropped_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let mut ll: RecursiveLinkedList<DropCounter> = (0..4)
            .map(|id| DropCounter {
                id,
                drops: drops.clone(),
            })
            .collect();

        assert!(ll.remove(2));
        assert_eq!(drops.get(), 1);
        assert_eq!(ll.len(), 3);

        drop(ll);
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn remove_all_handles_head_interior_adjacent_and_trailing_matches() {
        init_logger();
        let mut ll = list_of(&[8, 8, 1, 8, 8, 2, 3, 8]);
        assert_eq!(ll.remove_all(&8), 5);
        assert_eq!(values_of(&ll), [1, 2, 3]);
        assert_eq!(ll.len(), 3);
        assert_eq!(chain_len(&ll), 3);
        assert!(!ll.contains(&8));
    }

    #[test]
    fn remove_all_on_single_element_list() {
        let mut ll = list_of(&[3]);
        assert_eq!(ll.remove_all(&4), 0);
        assert_eq!(ll.remove_all(&3), 1);
        assert!(ll.is_empty());
        assert_eq!(ll.first(), None);
    }

    #[test]
    fn remove_all_of_every_element_empties_the_list() {
        let mut ll = list_of(&[6, 6, 6]);
        assert_eq!(ll.remove_all(&6), 3);
        assert!(ll.is_empty());
        assert!(ll.head.is_none());
    }

    #[test]
    fn remove_all_on_empty_list_removes_nothing() {
        let mut ll = RecursiveLinkedList::<u32>::new();
        assert_eq!(ll.remove_all(&1), 0);
    }

    #[test]
    fn remove_all_drops_each_match() {
        let drops = Rc::new(Cell::new(0));
        let mut ll: RecursiveLinkedList<DropCounter> = [1, 0, 1, 1, 2]
            .iter()
            .map(|&id| DropCounter {
                id,
                drops: drops.clone(),
            })
            .collect();

        let probe = DropCounter {
            id: 1,
            drops: Rc::new(Cell::new(0)),
        };
        assert_eq!(ll.remove_all(&probe), 3);
        assert_eq!(drops.get(), 3);
        assert_eq!(ll.len(), 2);
    }

    #[test]
    fn clear_empties_and_drops_everything() {
        init_logger();
        let drops = Rc::new(Cell::new(0));
        let mut ll: RecursiveLinkedList<DropCounter> = (0..5)
            .map(|id| DropCounter {
                id,
                drops: drops.clone(),
            })
            .collect();

        ll.clear();
        assert!(ll.is_empty());
        assert!(ll.head.is_none());
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn first_and_last_on_populated_list() {
        let ll = list_of(&[2, 4, 6]);
        assert_eq!(ll.first(), Some(&2));
        assert_eq!(ll.last(), Some(&6));
    }

    #[test]
    fn index_queries_on_single_element_list() {
        let ll = list_of(&[9]);
        assert_eq!(ll.first_index(&9), Some(0));
        assert_eq!(ll.last_index(&9), Some(0));
        assert!(ll.contains(&9));
        assert!(!ll.contains(&1));
    }

    #[test]
    fn index_queries_see_the_final_node() {
        let ll = list_of(&[1, 2, 3]);
        assert_eq!(ll.first_index(&3), Some(2));
        assert_eq!(ll.last_index(&3), Some(2));
    }

    #[test]
    fn last_index_keeps_scanning_past_first_match() {
        let ll = list_of(&[5, 1, 5, 2, 5, 3]);
        assert_eq!(ll.first_index(&5), Some(0));
        assert_eq!(ll.last_index(&5), Some(4));
        assert_eq!(ll.first_index(&7), None);
        assert_eq!(ll.last_index(&7), None);
    }

    #[test]
    fn to_array_copies_in_order() {
        let mut ll = list_of(&[3, 1, 2]);
        let array = ll.to_array();
        assert_eq!(&*array, &[3, 1, 2]);

        ll.set(0, 100).expect("set head");
        assert_eq!(&*array, &[3, 1, 2]);
        assert_eq!(RecursiveLinkedList::<u32>::new().to_array().len(), 0);
    }

    #[test]
    fn sort_orders_ascending() {
        init_logger();
        let mut ll = list_of(&[9, 3, 7, 1, 8, 2]);
        ll.sort();
        assert_eq!(values_of(&ll), [1, 2, 3, 7, 8, 9]);
        assert_eq!(ll.len(), 6);
        assert_eq!(chain_len(&ll), 6);
    }

    #[test]
    fn sort_by_reversed_comparator_orders_descending() {
        let mut ll = list_of(&[2, 5, 1, 4]);
        ll.sort_by(|a, b| b.cmp(a));
        assert_eq!(values_of(&ll), [5, 4, 2, 1]);
    }

    #[test]
    fn sort_on_empty_and_singleton_lists_is_a_no_op() {
        let mut empty = RecursiveLinkedList::<u32>::new();
        empty.sort();
        assert!(empty.is_empty());

        let mut single = list_of(&[1]);
        single.sort_by(|_, _| panic!("a single element is never compared"));
        assert_eq!(values_of(&single), [1]);
    }

    #[test]
    fn sort_keeps_equal_keys_in_original_order() {
        let mut ll: RecursiveLinkedList<(u32, char)> =
            [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (2, 'e')]
                .iter()
                .copied()
                .collect();
        ll.sort_by(|a, b| a.0.cmp(&b.0));
        let sorted: Vec<_> = ll.iter().copied().collect();
        assert_eq!(sorted, [(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c'), (2, 'e')]);
    }

    #[test]
    fn sorting_a_sorted_list_leaves_it_unchanged() {
        let mut ll = list_of(&[1, 1, 2, 3, 5, 8]);
        let before = ll.clone();
        ll.sort();
        assert_eq!(ll, before);
    }

    #[test]
    fn dropping_a_long_list_does_not_overflow_the_stack() {
        let ll: RecursiveLinkedList<u32> = (0..200_000).collect();
        assert_eq!(ll.len(), 200_000);
        drop(ll);
    }

    #[test]
    fn extend_appends_after_existing_elements() {
        let mut ll = list_of(&[1, 2]);
        ll.extend(vec![3, 4]);
        assert_eq!(values_of(&ll), [1, 2, 3, 4]);
        assert_eq!(ll.len(), 4);
        assert_eq!(chain_len(&ll), 4);
    }

    #[test]
    fn debug_renders_as_a_list() {
        let ll = list_of(&[1, 2, 3]);
        assert_eq!(format!("{:?}", ll), "[1, 2, 3]");
    }

    #[test]
    fn lists_with_the_same_values_are_equal() {
        assert_eq!(list_of(&[1, 2]), list_of(&[1, 2]));
        assert_ne!(list_of(&[1, 2]), list_of(&[2, 1]));
        assert_ne!(list_of(&[1, 2]), list_of(&[1, 2, 3]));
    }

    /// drives a sequence through nothing but the `Sequence` contract
    fn add_remove_sort_walkthrough<S: Sequence<u32>>(seq: &mut S) {
        seq.add(5);
        seq.add(3);
        seq.add(8);
        seq.insert(1, 9).expect("insert within bounds");
        assert_eq!(&*seq.to_array(), &[5, 9, 3, 8]);

        assert!(seq.remove(0));
        assert_eq!(&*seq.to_array(), &[9, 3, 8]);

        seq.sort_by(|a, b| a.cmp(b));
        assert_eq!(&*seq.to_array(), &[3, 8, 9]);

        assert_eq!(seq.first_index(&8), Some(1));
        assert_eq!(seq.remove_all(&8), 1);
        assert_eq!(&*seq.to_array(), &[3, 9]);
        assert!(!seq.contains(&8));
        assert_eq!(seq.len(), 2);

        seq.clear();
        assert!(seq.is_empty());
        assert!(seq.get(0).is_err());
        assert!(!seq.remove(0));
    }

    #[test]
    fn walkthrough_through_the_sequence_contract() {
        init_logger();
        let mut ll = RecursiveLinkedList::new();
        add_remove_sort_walkthrough(&mut ll);
    }
}


// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test))]
mod proptests {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::test_runner::Config;
    use proptest_derive::Arbitrary;
    use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};
    use rand::Rng;

    use super::*;

    /// values are drawn from a small range so value queries and
    /// `remove_all` regularly find matches
    const VALUES: core::ops::Range<u32> = 0..8;

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(Config {
            failure_persistence: None,
            .. Config::default()
        })]

        #[test]
        fn recursive_linked_list_state_machine_test(
            sequential
            1..200
            =>
            RecursiveLinkedList<u32>
        );
    }

    /// The possible transitions of the state machine. indices may point one
    /// past the valid range so the rejection paths get exercised too.
    #[derive(Clone, Debug)]
    pub enum Transition {
        Add(u32),
        Insert(usize, u32),
        Set(usize, u32),
        Remove(usize),
        RemoveAll(u32),
        Sort,
        Clear,
    }

    pub struct RecursiveLinkedListStateMachine;

    impl ReferenceStateMachine for RecursiveLinkedListStateMachine {
        type State = Vec<u32>;
        type Transition = Transition;

        fn init_state() -> BoxedStrategy<Self::State> {
            Just(Vec::new()).boxed()
        }

        fn transitions(state: &Self::State) -> BoxedStrategy<Self::Transition> {
            let len = state.len();
            prop_oneof![
                4 => VALUES.prop_map(Transition::Add),
                3 => (0..=len + 1, VALUES).prop_map(|(i, v)| Transition::Insert(i, v)),
                2 => (0..=len, VALUES).prop_map(|(i, v)| Transition::Set(i, v)),
                3 => (0..=len).prop_map(Transition::Remove),
                1 => VALUES.prop_map(Transition::RemoveAll),
                1 => Just(Transition::Sort),
                1 => Just(Transition::Clear),
            ]
            .boxed()
        }

        fn apply(mut state: Self::State, transition: &Self::Transition) -> Self::State {
            match *transition {
                Transition::Add(value) => state.push(value),
                Transition::Insert(index, value) => {
                    if index <= state.len() {
                        state.insert(index, value);
                    }
                }
                Transition::Set(index, value) => {
                    if let Some(slot) = state.get_mut(index) {
                        *slot = value;
                    }
                }
                Transition::Remove(index) => {
                    if index < state.len() {
                        state.remove(index);
                    }
                }
                Transition::RemoveAll(value) => state.retain(|v| *v != value),
                Transition::Sort => state.sort(),
                Transition::Clear => state.clear(),
            }
            state
        }
    }

    impl StateMachineTest for RecursiveLinkedList<u32> {
        type SystemUnderTest = Self;
        type Reference = RecursiveLinkedListStateMachine;

        fn init_test(
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) -> Self::SystemUnderTest {
            Self::new()
        }

        fn apply(
            mut state: Self::SystemUnderTest,
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
            transition: Transition,
        ) -> Self::SystemUnderTest {
            let len = state.len();
            match transition {
                Transition::Add(value) => {
                    state.add(value);
                    assert_eq!(state.last(), Some(&value));
                }
                Transition::Insert(index, value) => match state.insert(index, value) {
                    Ok(()) => {
                        assert!(index <= len);
                        assert_eq!(state.get(index), Ok(&value));
                    }
                    Err(SequenceError::IndexOutOfBounds { op, .. }) => {
                        assert!(index > len);
                        assert_eq!(op, "insert");
                    }
                },
                Transition::Set(index, value) => match state.set(index, value).map(|v| *v) {
                    Ok(stored) => {
                        assert_eq!(stored, value);
                        assert_eq!(state.get(index), Ok(&value));
                    }
                    Err(_) => assert!(index >= len),
                },
                Transition::Remove(index) => {
                    assert_eq!(state.remove(index), index < len);
                }
                Transition::RemoveAll(value) => {
                    let expected = state.iter().filter(|v| **v == value).count();
                    assert_eq!(state.remove_all(&value), expected);
                    assert!(!state.contains(&value));
                }
                Transition::Sort => state.sort(),
                Transition::Clear => state.clear(),
            }
            state
        }

        fn check_invariants(
            state: &Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) {
            assert_eq!(state.len(), ref_state.len());
            assert_eq!(chain_len(state), ref_state.len());
            assert_eq!(&*state.to_array(), ref_state.as_slice());
            assert_eq!(state.first(), ref_state.first());
            assert_eq!(state.last(), ref_state.last());

            for value in VALUES {
                assert_eq!(
                    state.first_index(&value),
                    ref_state.iter().position(|v| *v == value)
                );
                assert_eq!(
                    state.last_index(&value),
                    ref_state.iter().rposition(|v| *v == value)
                );
            }
        }
    }

    #[derive(Arbitrary, Clone, Copy, Debug)]
    struct Keyed {
        #[proptest(strategy = "0u8..4")]
        key: u8,
        tag: u16,
    }

    #[derive(Arbitrary, Debug)]
    enum Operation {
        Add(u8),
        PushFront(u8),
        RemoveRandom,
        RemoveAll(u8),
        Sort,
    }

    proptest! {
        #[test]
        fn sort_by_matches_a_stable_sort(items in vec(any::<Keyed>(), 0..64)) {
            let mut ll: RecursiveLinkedList<Keyed> = items.iter().copied().collect();
            ll.sort_by(|a, b| a.key.cmp(&b.key));

            let mut expected = items;
            expected.sort_by_key(|k| k.key);

            let sorted: Vec<(u8, u16)> = ll.iter().map(|k| (k.key, k.tag)).collect();
            let expected: Vec<(u8, u16)> = expected.iter().map(|k| (k.key, k.tag)).collect();
            prop_assert_eq!(sorted, expected);

            for (a, b) in ll.iter().zip(ll.iter().skip(1)) {
                prop_assert!(a.key <= b.key);
            }
        }

        #[test]
        fn add_and_get_agree_with_vec(values in vec(any::<u32>(), 0..64)) {
            let mut ll = RecursiveLinkedList::new();
            for value in values.iter() {
                ll.add(*value);
            }

            prop_assert_eq!(ll.len(), values.len());
            for (i, value) in values.iter().enumerate() {
                prop_assert_eq!(ll.get(i), Ok(value));
            }
            prop_assert!(ll.get(values.len()).is_err());
        }

        #[test]
        fn random_operations_agree_with_vec(ops in vec(any::<Operation>(), 0..256)) {
            init_logger();
            let mut reference: Vec<u8> = Vec::new();
            let mut ll = RecursiveLinkedList::new();

            for op in ops.iter() {
                match *op {
                    Operation::Add(value) => {
                        let value = value % 8;
                        reference.push(value);
                        ll.add(value);
                    }
                    Operation::PushFront(value) => {
                        let value = value % 8;
                        reference.insert(0, value);
                        prop_assert!(ll.insert(0, value).is_ok());
                    }
                    Operation::RemoveRandom => {
                        if reference.is_empty() {
                            prop_assert!(!ll.remove(0));
                        } else {
                            let index = rand::thread_rng().gen_range(0..reference.len());
                            prop_assert_eq!(ll.take(index), Some(reference.remove(index)));
                        }
                    }
                    Operation::RemoveAll(value) => {
                        let value = value % 8;
                        let before = reference.len();
                        reference.retain(|v| *v != value);
                        prop_assert_eq!(ll.remove_all(&value), before - reference.len());
                    }
                    Operation::Sort => {
                        reference.sort();
                        ll.sort();
                    }
                }

                prop_assert_eq!(ll.len(), reference.len());
                prop_assert_eq!(chain_len(&ll), reference.len());
            }

            let collected: Vec<u8> = ll.iter().copied().collect();
            prop_assert_eq!(collected, reference);
        }
    }
}
