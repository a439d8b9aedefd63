// This file is part of rwchring-rs.
//
// Copyright 2021 Christos Katsakioris
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::{
    iter::Iter,
    state::HashRingState,
    types::{Crc32Hasher, HashRingError, Hasher, Node, Position, Result, Vnid},
    vnode::VirtualNode,
    DEFAULT_VNODES_PER_NODE,
};

/// The consistent hashing ring data structure.
///
/// Users will probably interact with this crate mostly through this type, as it is central to its
/// API.
///
/// All of its state is guarded by a single reader/writer lock: lookups share it, whereas updates
/// hold it exclusively. Lookups take the lock recursively, so that a thread which already holds
/// it (e.g., through an [`Iter`]) never blocks behind a waiting update.
///
/// In multi-threaded contexts, it needs to be wrapped in [`Arc`].
///
/// To find out more general information regarding its use, refer to the crate-level documentation.
#[derive(Debug)]
pub struct HashRing<N, H>
where
    N: Node + ?Sized,
    H: Hasher,
{
    hasher: H,
    inner: RwLock<HashRingState<N>>,
}

impl<N, H> Clone for HashRing<N, H>
where
    N: Node + ?Sized,
    H: Hasher + Clone,
{
    /// Returns an independent copy of the ring, as it stands at the time of the call, which keeps
    /// routing keys with a clone of the same [`Hasher`].
    fn clone(&self) -> Self {
        let inner = self.inner.read_recursive().clone();
        Self {
            hasher: self.hasher.clone(),
            inner: RwLock::new(inner),
        }
    }
}

impl<N> Default for HashRing<N, Crc32Hasher>
where
    N: Node + ?Sized,
{
    /// Create a new, empty [`HashRing<N, H>`] with [`DEFAULT_VNODES_PER_NODE`] virtual nodes per
    /// ring node, employing the built-in [`Crc32Hasher`].
    fn default() -> Self {
        Self {
            hasher: Crc32Hasher::default(),
            inner: RwLock::new(HashRingState::with_capacity(0, DEFAULT_VNODES_PER_NODE)),
        }
    }
}

impl<N> HashRing<N, Crc32Hasher>
where
    N: Node + ?Sized,
{
    /// Create a new [`HashRing<N, H>`] configured with the given number of *virtual nodes* per
    /// ring node and initialize it with the provided `Node`s (the ring will be populated by their
    /// [`VirtualNode`]s automatically).
    ///
    /// The new [`HashRing<N, H>`] will employ the built-in [`Crc32Hasher`].
    ///
    /// # Errors
    ///
    /// - Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per
    /// distinct ring node is `0`.
    ///
    /// - Returns [`HashRingError::DuplicateNode`] if the output of [`Node::hashring_node_id`] for
    /// two (or more) of the [`Node`]s provided is equal.
    #[inline]
    pub fn with_nodes(vnodes_per_node: Vnid, nodes: &[Arc<N>]) -> Result<Self> {
        Self::with_hasher_and_nodes(Crc32Hasher::default(), vnodes_per_node, nodes)
    }

    /// Create a new [`HashRing<N, H>`] configured with the given number of *virtual nodes* per
    /// ring node, which is initially empty of `Node`s (and, of course, empty of [`VirtualNode`]s
    /// too).
    ///
    /// The new [`HashRing<N, H>`] will employ the built-in [`Crc32Hasher`].
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per distinct
    /// ring node is `0`.
    #[inline]
    pub fn new(vnodes_per_node: Vnid) -> Result<Self> {
        Self::with_hasher_and_nodes(Crc32Hasher::default(), vnodes_per_node, &[])
    }
}

impl<N, H> HashRing<N, H>
where
    N: Node + ?Sized,
    H: Hasher,
{
    /// Create a new [`HashRing<N, H>`] configured with the given number of *virtual nodes* per
    /// ring node and initialize it with the provided `Node`s.
    ///
    /// The new [`HashRing<N, H>`] will employ the provided [`Hasher`] both for placing the
    /// [`VirtualNode`]s on the consistent hashing ring and for hashing the lookup keys.
    ///
    /// # Errors
    ///
    /// - Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per
    /// distinct ring node is `0`.
    ///
    /// - Returns [`HashRingError::DuplicateNode`] if the output of [`Node::hashring_node_id`] for
    /// two (or more) of the [`Node`]s provided is equal.
    pub fn with_hasher_and_nodes(
        hasher: H,
        vnodes_per_node: Vnid,
        nodes: &[Arc<N>],
    ) -> Result<Self> {
        if vnodes_per_node == 0 {
            return Err(HashRingError::InvalidConfiguration(vnodes_per_node));
        }
        let mut inner = HashRingState::with_capacity(nodes.len(), vnodes_per_node);
        inner.insert(&hasher, nodes)?;
        Ok(Self {
            hasher,
            inner: RwLock::new(inner),
        })
    }

    /// Create a new [`HashRing<N, H>`] configured with the given number of *virtual nodes* per
    /// ring node, which is initially empty of `Node`s.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per distinct
    /// ring node is `0`.
    #[inline]
    pub fn with_hasher(hasher: H, vnodes_per_node: Vnid) -> Result<Self> {
        Self::with_hasher_and_nodes(hasher, vnodes_per_node, &[])
    }

    /// Returns the number of *virtual nodes* that every distinct ring node is mapped to.
    pub fn vnodes_per_node(&self) -> Vnid {
        self.inner.read_recursive().vnodes_per_node()
    }

    /// Returns the number of distinct ring nodes that are currently registered in the consistent
    /// hashing ring.
    pub fn len_nodes(&self) -> usize {
        self.inner.read_recursive().len_nodes()
    }

    /// Returns the number of *virtual nodes* that currently populate the consistent hashing ring.
    ///
    /// This is equal to the result of [`HashRing::len_nodes`] multiplied by the `vnodes_per_node`
    /// for a particular [`HashRing<N, H>`], unless some virtual nodes have collided.
    pub fn len_virtual_nodes(&self) -> usize {
        self.inner.read_recursive().len_virtual_nodes()
    }

    /// Returns `true` if no [`Node`] is currently registered in the consistent hashing ring.
    pub fn is_empty(&self) -> bool {
        self.inner.read_recursive().len_nodes() == 0
    }

    /// Returns `true` if the given [`Node`] is currently registered in the consistent hashing
    /// ring.
    pub fn contains(&self, node: &N) -> bool {
        self.inner.read_recursive().contains(&node.hashring_node_id())
    }

    /// Returns all [`Node`]s currently registered in the consistent hashing ring, ordered by the
    /// output of [`Node::hashring_node_id`].
    pub fn nodes(&self) -> Vec<Arc<N>> {
        self.inner.read_recursive().nodes()
    }

    /// Insert the given [`Node`] to the consistent hashing ring, thereby expanding it by
    /// `vnodes_per_node` [`VirtualNode`]s.
    ///
    /// Should a [`VirtualNode`] of the new [`Node`] land on a position that is already occupied,
    /// the new one takes it over.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::DuplicateNode`] if the [`Node`] is already registered in the ring,
    /// which is then left untouched.
    #[inline]
    pub fn add(&self, node: Arc<N>) -> Result<()> {
        self.add_nodes(&[node])
    }

    /// Insert all the given [`Node`]s to the consistent hashing ring at once.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::DuplicateNode`] if any of the [`Node`]s is already registered in
    /// the ring, or is provided more than once. In that case, none of them is inserted.
    pub fn add_nodes(&self, nodes: &[Arc<N>]) -> Result<()> {
        let mut inner = self.inner.write();
        inner.insert(&self.hasher, nodes)?;
        debug!(
            "added {} node(s); ring now has {} nodes over {} positions",
            nodes.len(),
            inner.len_nodes(),
            inner.len_virtual_nodes()
        );
        Ok(())
    }

    /// Remove the given [`Node`] from the consistent hashing ring, thereby shrinking it.
    ///
    /// All the positions of the [`Node`]'s [`VirtualNode`]s are taken off the ring, even those that
    /// have been taken over by some [`Node`] inserted later.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::NodeNotFound`] if the [`Node`] is not currently registered in the
    /// ring.
    pub fn remove(&self, node: &N) -> Result<()> {
        let name = node.hashring_node_id();
        let mut inner = self.inner.write();
        inner.remove_names(&self.hasher, &[name])?;
        debug!(
            "removed 1 node; ring now has {} nodes over {} positions",
            inner.len_nodes(),
            inner.len_virtual_nodes()
        );
        Ok(())
    }

    /// Remove all the given [`Node`]s from the consistent hashing ring at once.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::NodeNotFound`] if any of the [`Node`]s is not currently registered
    /// in the ring, or is provided more than once. In that case, none of them is removed.
    pub fn remove_nodes(&self, nodes: &[Arc<N>]) -> Result<()> {
        let names: Vec<_> = nodes.iter().map(|node| node.hashring_node_id()).collect();
        let mut inner = self.inner.write();
        inner.remove_names(&self.hasher, &names)?;
        debug!(
            "removed {} node(s); ring now has {} nodes over {} positions",
            names.len(),
            inner.len_nodes(),
            inner.len_virtual_nodes()
        );
        Ok(())
    }

    #[inline]
    fn position_for_key<K>(&self, key: &K) -> Position
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.hasher.digest(key.as_ref())
    }

    /// Look up in the consistent hashing ring and return the [`Node`] that the given `key` should
    /// be assigned on, i.e., the owner of the first [`VirtualNode`] found clockwise from the
    /// position of the `key`.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::EmptyRing`] if the consistent hashing ring is currently empty of
    /// [`Node`]s and therefore the given `key` cannot be assigned to any of them.
    pub fn get<K>(&self, key: &K) -> Result<Arc<N>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let position = self.position_for_key(key);
        let inner = self.inner.read_recursive();
        let vn = inner.virtual_node_for_position(position)?;
        Ok(Arc::clone(&vn.node))
    }

    /// Look up in the consistent hashing ring and return a **clone** of the [`VirtualNode`] that
    /// the given `key` should be assigned on.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::EmptyRing`] if the consistent hashing ring is currently empty of
    /// [`Node`]s and therefore the given `key` cannot be assigned to any [`VirtualNode`] (as none
    /// exists).
    pub fn virtual_node_for_key<K>(&self, key: &K) -> Result<VirtualNode<N>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let position = self.position_for_key(key);
        let inner = self.inner.read_recursive();
        inner.virtual_node_for_position(position).map(Clone::clone)
    }

    /// Look up in the consistent hashing ring and return up to `count` distinct [`Node`]s, each
    /// wrapped in an [`Arc`], found clockwise from the position of the given `key`.
    ///
    /// The first one is always the [`Node`] returned by [`HashRing::get`] for the same `key`; the
    /// rest are fit to hold replicas of it. Fewer than `count` are returned if fewer distinct
    /// [`Node`]s populate the ring.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::EmptyRing`] if the consistent hashing ring is currently empty of
    /// [`Node`]s.
    pub fn nodes_for_key<K>(&self, key: &K, count: usize) -> Result<Vec<Arc<N>>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let position = self.position_for_key(key);
        self.inner.read_recursive().nodes_for_position(position, count)
    }

    /// Returns an [`Iter`], i.e., an iterator to loop through all [`VirtualNode`]s that populate
    /// the consistent hashing ring, in ascending order of position.
    ///
    /// See the documentation of [`Iter`] for more information regarding its use.
    #[inline]
    pub fn iter(&self) -> Iter<'_, N> {
        Iter::new(self.inner.read_recursive())
    }
}

impl<N, H> Display for HashRing<N, H>
where
    N: Node + ?Sized,
    H: Hasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self.inner.read_recursive())
    }
}
