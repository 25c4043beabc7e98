//! Doubly-linked chain with fixed ends.
//!
//! [`OpenChain`] keeps its links in an arena and addresses them by
//! generation-checked [`LinkId`]s. Two permanent sentinel links mark the ends,
//! so pushing, shifting and unlinking a link from anywhere in the chain are all
//! O(1) and never special-case the edges.
//!
//! A link is created detached, connected with [`OpenChain::push_link`] (or one
//! of its siblings), disconnected with [`OpenChain::unlink`] and finally
//! returned to the arena with [`OpenChain::release`]. Connecting a link that is
//! already connected is an error.

use crate::error::ChainError;
use std::ops::ControlFlow;

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Handle to a link in an [`OpenChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<T> {
    prev: usize,
    next: usize,
    linked: bool,
    generation: u64,
    value: Option<T>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Self {
            prev: HEAD,
            next: TAIL,
            linked: true,
            generation: 0,
            value: None,
        }
    }
}

/// A chain with two fixed ends and value-carrying links in between.
///
/// Behaves like a deque (`push`/`pop` at the end, `unshift`/`shift` at the
/// start) that additionally supports removing any link by id.
#[derive(Debug)]
pub struct OpenChain<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for OpenChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OpenChain<T> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel(), Node::sentinel()],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of connected links.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no links are connected.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocates a detached link carrying `value`.
    pub fn create_link(&mut self, value: T) -> LinkId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.nodes.push(Node {
                    prev: HEAD,
                    next: HEAD,
                    linked: false,
                    generation: 0,
                    value: None,
                });
                self.nodes.len() - 1
            }
        };
        let node = &mut self.nodes[index];
        node.value = Some(value);
        node.linked = false;
        LinkId {
            index,
            generation: node.generation,
        }
    }

    fn check(&self, id: LinkId) -> Result<&Node<T>, ChainError> {
        match self.nodes.get(id.index) {
            Some(node)
                if id.index > TAIL && node.generation == id.generation && node.value.is_some() =>
            {
                Ok(node)
            }
            _ => Err(ChainError::StaleLink),
        }
    }

    fn check_detached(&self, id: LinkId) -> Result<(), ChainError> {
        if self.check(id)?.linked {
            return Err(ChainError::AlreadyLinked);
        }
        Ok(())
    }

    fn connect(&mut self, index: usize, prev: usize, next: usize) {
        let node = &mut self.nodes[index];
        node.prev = prev;
        node.next = next;
        node.linked = true;
        self.nodes[prev].next = index;
        self.nodes[next].prev = index;
        self.len += 1;
    }

    fn disconnect(&mut self, index: usize) {
        let (prev, next) = {
            let node = &mut self.nodes[index];
            node.linked = false;
            (node.prev, node.next)
        };
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.len -= 1;
    }

    fn id_at(&self, index: usize) -> LinkId {
        LinkId {
            index,
            generation: self.nodes[index].generation,
        }
    }

    /// Connects a detached link at the end of the chain.
    pub fn push_link(&mut self, id: LinkId) -> Result<&mut Self, ChainError> {
        self.check_detached(id)?;
        let last = self.nodes[TAIL].prev;
        self.connect(id.index, last, TAIL);
        Ok(self)
    }

    /// Connects a detached link at the start of the chain.
    pub fn unshift_link(&mut self, id: LinkId) -> Result<&mut Self, ChainError> {
        self.check_detached(id)?;
        let first = self.nodes[HEAD].next;
        self.connect(id.index, HEAD, first);
        Ok(self)
    }

    /// Connects a detached link right after `anchor`.
    pub fn insert_after(&mut self, id: LinkId, anchor: LinkId) -> Result<&mut Self, ChainError> {
        self.check_detached(id)?;
        if !self.check(anchor)?.linked {
            return Err(ChainError::StaleLink);
        }
        let next = self.nodes[anchor.index].next;
        self.connect(id.index, anchor.index, next);
        Ok(self)
    }

    /// Connects a detached link right before `anchor`.
    pub fn insert_before(&mut self, id: LinkId, anchor: LinkId) -> Result<&mut Self, ChainError> {
        self.check_detached(id)?;
        if !self.check(anchor)?.linked {
            return Err(ChainError::StaleLink);
        }
        let prev = self.nodes[anchor.index].prev;
        self.connect(id.index, prev, anchor.index);
        Ok(self)
    }

    /// Adds a new link carrying `value` at the end of the chain.
    pub fn push_value(&mut self, value: T) -> LinkId {
        let id = self.create_link(value);
        let last = self.nodes[TAIL].prev;
        self.connect(id.index, last, TAIL);
        id
    }

    /// Adds a new link carrying `value` at the start of the chain.
    pub fn unshift_value(&mut self, value: T) -> LinkId {
        let id = self.create_link(value);
        let first = self.nodes[HEAD].next;
        self.connect(id.index, HEAD, first);
        id
    }

    /// Disconnects the last link and returns its id. The link keeps its value.
    pub fn pop_link(&mut self) -> Option<LinkId> {
        let last = self.nodes[TAIL].prev;
        if last == HEAD {
            return None;
        }
        self.disconnect(last);
        Some(self.id_at(last))
    }

    /// Disconnects the first link and returns its id. The link keeps its value.
    pub fn shift_link(&mut self) -> Option<LinkId> {
        let first = self.nodes[HEAD].next;
        if first == TAIL {
            return None;
        }
        self.disconnect(first);
        Some(self.id_at(first))
    }

    /// Disconnects a link wherever it sits.
    ///
    /// Returns `false` if the link was already detached.
    pub fn unlink(&mut self, id: LinkId) -> Result<bool, ChainError> {
        if !self.check(id)?.linked {
            return Ok(false);
        }
        self.disconnect(id.index);
        Ok(true)
    }

    /// Disconnects (if needed) and frees a link, returning its value.
    ///
    /// The id becomes stale.
    pub fn release(&mut self, id: LinkId) -> Result<T, ChainError> {
        self.unlink(id)?;
        let node = &mut self.nodes[id.index];
        node.generation += 1;
        let value = node.value.take().ok_or(ChainError::StaleLink)?;
        self.free.push(id.index);
        Ok(value)
    }

    /// Whether the link is currently connected.
    pub fn is_linked(&self, id: LinkId) -> bool {
        self.check(id).is_ok_and(|node| node.linked)
    }

    /// The value carried by a link, connected or not.
    pub fn value(&self, id: LinkId) -> Option<&T> {
        self.check(id).ok().and_then(|node| node.value.as_ref())
    }

    /// Value of the first connected link.
    pub fn first_value(&self) -> Option<&T> {
        self.nodes[self.nodes[HEAD].next].value.as_ref()
    }

    /// Value of the last connected link.
    pub fn last_value(&self) -> Option<&T> {
        self.nodes[self.nodes[TAIL].prev].value.as_ref()
    }

    /// Iterates connected values from first to last.
    pub fn iter(&self) -> ChainIter<'_, T> {
        ChainIter {
            chain: self,
            cursor: self.nodes[HEAD].next,
        }
    }

    /// Ids of connected links from first to last. O(n).
    pub fn links(&self) -> Vec<LinkId> {
        let mut links = Vec::with_capacity(self.len);
        let mut cursor = self.nodes[HEAD].next;
        while cursor != TAIL {
            links.push(self.id_at(cursor));
            cursor = self.nodes[cursor].next;
        }
        links
    }

    /// Connected values from first to last. O(n).
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Visits links from first to last until the visitor breaks.
    pub fn for_each_link<F>(&self, mut visitor: F)
    where
        F: FnMut(LinkId, &T, usize) -> ControlFlow<()>,
    {
        let mut cursor = self.nodes[HEAD].next;
        let mut index = 0;
        while cursor != TAIL {
            if let Some(value) = self.nodes[cursor].value.as_ref() {
                if visitor(self.id_at(cursor), value, index).is_break() {
                    break;
                }
            }
            index += 1;
            cursor = self.nodes[cursor].next;
        }
    }
}

/// Iterator over the values of an [`OpenChain`].
pub struct ChainIter<'a, T> {
    chain: &'a OpenChain<T>,
    cursor: usize,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != TAIL {
            let node = &self.chain.nodes[self.cursor];
            self.cursor = node.next;
            if let Some(value) = node.value.as_ref() {
                return Some(value);
            }
        }
        None
    }
}

impl<'a, T> IntoIterator for &'a OpenChain<T> {
    type Item = &'a T;
    type IntoIter = ChainIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
