use std::hash::Hash;

use ahash::{HashMap, HashMapExt};
use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node<K, T> {
  key: K,
  value: T,
  next: Option<Index>,
  prev: Option<Index>,
}

/// A recency-ordered map. Head is the most recently used key, tail the least.
///
/// Every operation is O(1): nodes live in an arena and are linked by index,
/// with a hash map from key to node index.
#[derive(Debug)]
pub(crate) struct LruList<K, T> {
  nodes: Arena<Node<K, T>>,
  lookup: HashMap<K, Index>,
  head: Option<Index>,
  tail: Option<Index>,
}

impl<K: Eq + Hash + Clone, T> LruList<K, T> {
  pub(crate) fn new() -> Self {
    Self {
      nodes: Arena::new(),
      lookup: HashMap::new(),
      head: None,
      tail: None,
    }
  }

  // Detaches a node from its neighbours. Leaves the arena and map untouched.
  fn unlink(&mut self, index: Index) {
    let (prev, next) = {
      let node = &self.nodes[index];
      (node.prev, node.next)
    };

    match prev {
      Some(prev_idx) => self.nodes[prev_idx].next = next,
      None => self.head = next,
    }
    match next {
      Some(next_idx) => self.nodes[next_idx].prev = prev,
      None => self.tail = prev,
    }
  }

  // Links an arena node in as the new head.
  fn link_front(&mut self, index: Index) {
    let old_head = self.head;
    self.nodes[index].next = old_head;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old_head) = old_head {
      self.nodes[old_head].prev = Some(index);
    }
    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.lookup.len()
  }

  pub(crate) fn contains(&self, key: &K) -> bool {
    self.lookup.contains_key(key)
  }

  /// Returns the value for `key` without touching recency.
  pub(crate) fn peek(&self, key: &K) -> Option<&T> {
    self.lookup.get(key).map(|&index| &self.nodes[index].value)
  }

  /// Inserts `key` at the head. An existing value is replaced and returned.
  pub(crate) fn push_front(&mut self, key: K, value: T) -> Option<T> {
    if let Some(&index) = self.lookup.get(&key) {
      let old = std::mem::replace(&mut self.nodes[index].value, value);
      self.move_to_front(&key);
      return Some(old);
    }

    let index = self.nodes.insert(Node {
      key: key.clone(),
      value,
      next: None,
      prev: None,
    });
    self.lookup.insert(key, index);
    self.link_front(index);
    None
  }

  /// Marks `key` as most recently used. Returns `false` if it is absent.
  pub(crate) fn move_to_front(&mut self, key: &K) -> bool {
    match self.lookup.get(key) {
      Some(&index) => {
        if self.head != Some(index) {
          self.unlink(index);
          self.link_front(index);
        }
        true
      }
      None => false,
    }
  }

  pub(crate) fn pop_back(&mut self) -> Option<(K, T)> {
    let tail = self.tail?;
    self.unlink(tail);
    let node = self.nodes.remove(tail)?;
    self.lookup.remove(&node.key);
    Some((node.key, node.value))
  }

  pub(crate) fn remove(&mut self, key: &K) -> Option<T> {
    let index = self.lookup.remove(key)?;
    self.unlink(index);
    self.nodes.remove(index).map(|node| node.value)
  }

  /// Removes every entry for which `pred` returns true, returning them.
  pub(crate) fn drain_where<F>(&mut self, mut pred: F) -> Vec<(K, T)>
  where
    F: FnMut(&T) -> bool,
  {
    let victims: Vec<K> = self
      .nodes
      .iter()
      .filter(|(_, node)| pred(&node.value))
      .map(|(_, node)| node.key.clone())
      .collect();

    victims
      .into_iter()
      .filter_map(|key| self.remove(&key).map(|value| (key, value)))
      .collect()
  }

  /// Empties the list, returning all entries from most to least recently used.
  pub(crate) fn drain_all(&mut self) -> Vec<(K, T)> {
    let mut drained = Vec::with_capacity(self.len());
    let mut current = self.head;
    while let Some(index) = current {
      current = self.nodes[index].next;
      if let Some(node) = self.nodes.remove(index) {
        drained.push((node.key, node.value));
      }
    }
    self.lookup.clear();
    self.head = None;
    self.tail = None;
    drained
  }

  // Keys from head to tail.
  #[cfg(test)]
  pub(crate) fn keys_as_vec(&self) -> Vec<K> {
    let mut keys = Vec::new();
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].next;
    }
    keys
  }
}
