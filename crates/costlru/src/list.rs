//! Ordered list with O(1) append, removal and pop-from-head
//!
//! Nodes live in an arena of slots and link to each other by slot index.
//! Callers hold [`Handle`]s, which carry a generation so that a handle to a
//! freed (or reused) slot is rejected instead of touching the wrong node.

use crate::error::{Error, Result};

/// Stable reference to a node in an [`OrderedList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u64,
}

/// Node in the doubly-linked list
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Arena slot; the generation is bumped every time the slot is freed
struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// Sequence of values in strict order, oldest at the head
pub struct OrderedList<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> OrderedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of nodes in the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        if self.head.is_some() {
            return false;
        }
        debug_assert!(self.tail.is_none(), "tail set on a list without head");
        true
    }

    /// Add a value at the tail
    ///
    /// # Returns
    /// * `Handle` - Reference to the new node, valid until it is removed
    pub fn append(&mut self, value: T) -> Handle {
        let index = self.alloc_node(value);
        self.link_tail(index);
        self.len += 1;
        self.handle_at(index)
    }

    /// Detach the node named by `handle` and return its value
    ///
    /// Head and tail move past the node if it sat at either end, and its
    /// neighbours are relinked to skip it. The slot is freed for reuse.
    ///
    /// # Returns
    /// * `Result<T>` - The stored value, or `Error::NodeNotFound` if the
    ///   handle is stale or belongs to another list
    pub fn remove(&mut self, handle: Handle) -> Result<T> {
        self.check(handle)?;
        self.unlink(handle.index);
        let node = self.slots[handle.index]
            .node
            .take()
            .ok_or(Error::NodeNotFound)?;
        self.free_node(handle.index);
        self.len -= 1;
        Ok(node.value)
    }

    /// Remove and return the head (least recent) value
    pub fn pop_head(&mut self) -> Option<T> {
        let index = self.head?;
        self.remove(self.handle_at(index)).ok()
    }

    /// Detach the node and re-append it at the tail, keeping its handle
    pub fn move_to_tail(&mut self, handle: Handle) -> Result<()> {
        self.check(handle)?;
        if self.tail == Some(handle.index) {
            return Ok(()); // Already at the back
        }

        self.unlink(handle.index);
        self.link_tail(handle.index);
        Ok(())
    }

    /// Check if `handle` names a live node of this list
    pub fn contains(&self, handle: Handle) -> bool {
        self.check(handle).is_ok()
    }

    /// Borrow the value behind `handle`
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.check(handle).ok()?;
        self.slots[handle.index].node.as_ref().map(|node| &node.value)
    }

    /// Mutably borrow the value behind `handle`
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.check(handle).ok()?;
        self.slots[handle.index].node.as_mut().map(|node| &mut node.value)
    }

    /// Oldest value
    pub fn head(&self) -> Option<&T> {
        self.value_at(self.head?)
    }

    /// Newest value
    pub fn tail(&self) -> Option<&T> {
        self.value_at(self.tail?)
    }

    /// Handle of the oldest node
    pub fn head_handle(&self) -> Option<Handle> {
        self.head.map(|index| self.handle_at(index))
    }

    /// Handle of the newest node
    pub fn tail_handle(&self) -> Option<Handle> {
        self.tail.map(|index| self.handle_at(index))
    }

    /// Iterate values from head to tail
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.indices().filter_map(move |index| self.value_at(index))
    }

    /// Iterate handles from head to tail
    pub fn handles(&self) -> impl DoubleEndedIterator<Item = Handle> + '_ {
        self.indices().map(move |index| self.handle_at(index))
    }

    /// Drop every node
    ///
    /// Handles issued before the call no longer resolve.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation += 1;
            }
            self.free_list.push(index);
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn indices(&self) -> Indices<'_, T> {
        Indices {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn check(&self, handle: Handle) -> Result<()> {
        match self.slots.get(handle.index) {
            Some(slot) if slot.generation == handle.generation && slot.node.is_some() => Ok(()),
            _ => Err(Error::NodeNotFound),
        }
    }

    fn handle_at(&self, index: usize) -> Handle {
        Handle {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn value_at(&self, index: usize) -> Option<&T> {
        self.slots[index].node.as_ref().map(|node| &node.value)
    }

    fn link_tail(&mut self, index: usize) {
        let old_tail = self.tail;

        if let Some(node) = &mut self.slots[index].node {
            node.prev = old_tail;
            node.next = None;
        }

        match old_tail {
            Some(tail_idx) => {
                if let Some(tail) = &mut self.slots[tail_idx].node {
                    tail.next = Some(index);
                }
            }
            None => {
                self.head = Some(index);
            }
        }

        self.tail = Some(index);
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = if let Some(node) = &self.slots[index].node {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.slots[prev_idx].node {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.slots[next_idx].node {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }

        if let Some(node) = &mut self.slots[index].node {
            node.prev = None;
            node.next = None;
        }
    }

    fn alloc_node(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: None,
        };

        if let Some(index) = self.free_list.pop() {
            self.slots[index].node = Some(node);
            index
        } else {
            let index = self.slots.len();
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            index
        }
    }

    fn free_node(&mut self, index: usize) {
        self.slots[index].generation += 1;
        self.free_list.push(index);
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Slot indices from head to tail, walkable from both ends
struct Indices<'a, T> {
    list: &'a OrderedList<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<T> Iterator for Indices<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        self.front = self.list.slots[index].node.as_ref().and_then(|node| node.next);
        self.remaining -= 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Indices<'_, T> {
    fn next_back(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = self.list.slots[index].node.as_ref().and_then(|node| node.prev);
        self.remaining -= 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[i32]) -> (OrderedList<i32>, Vec<Handle>) {
        let mut list = OrderedList::new();
        let handles = values.iter().map(|&v| list.append(v)).collect();
        (list, handles)
    }

    fn values(list: &OrderedList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    /// Walk both directions and compare against the length
    fn assert_linked(list: &OrderedList<i32>) {
        let forward = values(list);
        let mut backward: Vec<i32> = list.iter().rev().copied().collect();
        backward.reverse();

        assert_eq!(forward.len(), list.len());
        assert_eq!(forward, backward);
        assert_eq!(list.head(), forward.first());
        assert_eq!(list.tail(), forward.last());
        assert_eq!(list.is_empty(), forward.is_empty());
    }

    #[test]
    fn test_append_first_item() {
        let mut list = OrderedList::new();
        assert!(list.is_empty());
        assert!(list.head().is_none());
        assert!(list.tail().is_none());

        let handle = list.append(24);

        assert!(!list.is_empty());
        assert_eq!(list.head_handle(), Some(handle));
        assert_eq!(list.tail_handle(), Some(handle));
    }

    #[test]
    fn test_append() {
        let (list, _) = list_of(&[12, 24, 12, 12]);

        assert_eq!(values(&list), vec![12, 24, 12, 12]);
        assert_linked(&list);
    }

    #[test]
    fn test_remove() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        assert_eq!(list.remove(handles[1]), Ok(2));
        assert_eq!(values(&list), vec![1, 3]);
        assert_eq!(list.head_handle(), Some(handles[0]));
        assert_eq!(list.tail_handle(), Some(handles[2]));
        assert_linked(&list);

        assert_eq!(list.remove(handles[0]), Ok(1));
        assert_eq!(values(&list), vec![3]);
        assert_eq!(list.head_handle(), Some(handles[2]));
        assert_eq!(list.tail_handle(), Some(handles[2]));

        assert_eq!(list.remove(handles[2]), Ok(3));
        assert!(list.is_empty());
        assert!(list.head_handle().is_none());
        assert!(list.tail_handle().is_none());
    }

    #[test]
    fn test_remove_tail() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        assert_eq!(list.remove(handles[2]), Ok(3));
        assert_eq!(list.tail(), Some(&2));
        assert_linked(&list);
    }

    #[test]
    fn test_remove_stale_handle() {
        let (mut list, handles) = list_of(&[1, 2]);

        list.remove(handles[0]).unwrap();
        assert_eq!(list.remove(handles[0]), Err(Error::NodeNotFound));
        assert!(!list.contains(handles[0]));

        // Slot is reused, old handle must not alias the new node
        let fresh = list.append(7);
        assert_eq!(fresh.index, handles[0].index);
        assert_eq!(list.get(handles[0]), None);
        assert_eq!(list.get(fresh), Some(&7));
        assert_eq!(values(&list), vec![2, 7]);
    }

    #[test]
    fn test_remove_foreign_handle() {
        let (mut list, _) = list_of(&[1]);
        let (_, other) = list_of(&[1, 2, 3, 4]);

        assert_eq!(list.remove(other[3]), Err(Error::NodeNotFound));
        assert_eq!(values(&list), vec![1]);
    }

    #[test]
    fn test_pop_head() {
        let (mut list, _) = list_of(&[5, 4, 2, 1]);

        assert_eq!(list.pop_head(), Some(5));
        assert_eq!(values(&list), vec![4, 2, 1]);
        assert_eq!(list.head(), Some(&4));
        assert_eq!(list.tail(), Some(&1));

        assert_eq!(list.pop_head(), Some(4));
        assert_eq!(values(&list), vec![2, 1]);

        assert_eq!(list.pop_head(), Some(2));
        assert_eq!(list.head(), Some(&1));
        assert_eq!(list.tail(), Some(&1));

        assert_eq!(list.pop_head(), Some(1));
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
        assert_eq!(list.pop_head(), None);
    }

    #[test]
    fn test_move_to_tail() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        list.move_to_tail(handles[0]).unwrap();
        assert_eq!(values(&list), vec![2, 3, 1]);
        assert_linked(&list);

        list.move_to_tail(handles[2]).unwrap();
        assert_eq!(values(&list), vec![2, 1, 3]);

        // Tail stays put
        list.move_to_tail(handles[2]).unwrap();
        assert_eq!(values(&list), vec![2, 1, 3]);
        assert_eq!(list.get(handles[0]), Some(&1));
        assert_linked(&list);
    }

    #[test]
    fn test_get_mut() {
        let (mut list, handles) = list_of(&[1, 2]);

        if let Some(value) = list.get_mut(handles[1]) {
            *value = 20;
        }
        assert_eq!(values(&list), vec![1, 20]);
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let (mut list, handles) = list_of(&[1, 2, 3]);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(handles.iter().all(|&h| !list.contains(h)));

        list.append(9);
        list.append(10);
        assert_eq!(values(&list), vec![9, 10]);
        assert!(handles.iter().all(|&h| list.get(h).is_none()));
        assert_linked(&list);
    }

    #[test]
    fn test_iter_both_ends() {
        let (list, handles) = list_of(&[1, 2, 3, 4]);

        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), None);

        assert_eq!(list.handles().collect::<Vec<_>>(), handles);
    }
}
