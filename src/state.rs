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

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::trace;

use crate::{
    types::{HashRingError, Hasher, Node, Position, Result, Vnid},
    vnode::{virtual_position, VirtualNode},
};

#[derive(Debug)]
pub(crate) struct HashRingState<N>
where
    N: Node + ?Sized,
{
    vnodes_per_node: Vnid,
    // Position -> owner. Later insertions overwrite earlier ones on collision.
    circle: HashMap<Position, VirtualNode<N>>,
    // The values of `circle`, sorted by position; rebuilt from scratch on every update.
    // `crate::iter::Iter` requires access to this field, hence the `pub(crate)`.
    pub(crate) vnodes: Vec<VirtualNode<N>>,
    nodes: BTreeMap<String, Arc<N>>,
}

impl<N> Clone for HashRingState<N>
where
    N: Node + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            vnodes_per_node: self.vnodes_per_node,
            circle: self.circle.clone(),
            vnodes: self.vnodes.clone(),
            nodes: self.nodes.clone(),
        }
    }
}

impl<N> HashRingState<N>
where
    N: Node + ?Sized,
{
    #[inline]
    pub(crate) fn with_capacity(capacity: usize, vnodes_per_node: Vnid) -> Self {
        let vnodes_capacity = capacity * vnodes_per_node as usize;
        Self {
            vnodes_per_node,
            circle: HashMap::with_capacity(vnodes_capacity),
            vnodes: Vec::with_capacity(vnodes_capacity),
            nodes: BTreeMap::new(),
        }
    }

    /// First, make sure that none of the given nodes is already registered and that none of them
    /// is given twice. Then, place all of their vnodes on the ring and rebuild the sorted vnodes.
    ///
    /// NOTE: If any of the given `nodes` is rejected, none of them is inserted in the ring.
    pub(crate) fn insert<H: Hasher>(&mut self, hasher: &H, nodes: &[Arc<N>]) -> Result<()> {
        let mut new = HashSet::with_capacity(nodes.len());
        for node in nodes {
            let name = node.hashring_node_id();
            if self.nodes.contains_key(&*name) || !new.insert(name.clone()) {
                return Err(HashRingError::DuplicateNode(name.into_owned()));
            }
        }

        for node in nodes {
            for vnid in 0..self.vnodes_per_node {
                let vn = VirtualNode::new(hasher, Arc::clone(node), vnid);
                trace!("placing vnode '{}'", vn);
                if let Some(prev) = self.circle.insert(vn.position, vn) {
                    trace!("vnode '{}' has been overwritten", prev);
                }
            }
            self.nodes
                .insert(node.hashring_node_id().into_owned(), Arc::clone(node));
        }
        self.rebuild();
        Ok(())
    }

    /// First, make sure that all of the given nodes are registered and that none of them is given
    /// twice. Then, regenerate the positions of their vnodes to take them off the ring and rebuild
    /// the sorted vnodes.
    ///
    /// Positions that have been overwritten by some other node are taken off the ring too.
    ///
    /// NOTE: If any of the given `names` is rejected, none of them is removed from the ring.
    pub(crate) fn remove_names<H: Hasher>(
        &mut self,
        hasher: &H,
        names: &[Cow<'_, str>],
    ) -> Result<()> {
        let mut old = HashSet::with_capacity(names.len());
        for name in names {
            if !self.nodes.contains_key(&**name) || !old.insert(name) {
                return Err(HashRingError::NodeNotFound(name.to_string()));
            }
        }

        for name in names {
            for vnid in 0..self.vnodes_per_node {
                let position = virtual_position(hasher, name, vnid);
                if let Some(vn) = self.circle.remove(&position) {
                    trace!("removed vnode '{}'", vn);
                }
            }
            self.nodes.remove(&**name);
        }
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.vnodes.clear();
        self.vnodes.extend(self.circle.values().cloned());
        self.vnodes.sort_unstable();
    }

    #[inline]
    pub(crate) fn vnodes_per_node(&self) -> Vnid {
        self.vnodes_per_node
    }

    #[inline]
    pub(crate) fn len_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn len_virtual_nodes(&self) -> usize {
        self.vnodes.len()
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub(crate) fn nodes(&self) -> Vec<Arc<N>> {
        self.nodes.values().cloned().collect()
    }

    /// Returns the index in `self.vnodes` of the first vnode at or after `position`, wrapping
    /// around to `0` past the last one.
    fn index_for(&self, position: Position) -> Result<usize> {
        if self.nodes.is_empty() || self.vnodes.is_empty() {
            return Err(HashRingError::EmptyRing);
        }
        Ok(self
            .vnodes
            .binary_search_by(|vn| vn.position.cmp(&position))
            .unwrap_or_else(|index| index)
            % self.vnodes.len())
    }

    // returns a reference to the actual `VirtualNode` in `HashRingState.vnodes`
    pub(crate) fn virtual_node_for_position(&self, position: Position) -> Result<&VirtualNode<N>> {
        let index = self.index_for(position)?;
        Ok(&self.vnodes[index])
    }

    /// Walks the ring clockwise, starting from the vnode that `position` is assigned on, and
    /// collects up to `count` distinct nodes.
    pub(crate) fn nodes_for_position(
        &self,
        position: Position,
        count: usize,
    ) -> Result<Vec<Arc<N>>> {
        let start = self.index_for(position)?;

        let mut owners: Vec<Arc<N>> = Vec::with_capacity(count.min(self.nodes.len()));
        for vn in self
            .vnodes
            .iter()
            .cycle()
            .skip(start)
            .take(self.vnodes.len())
        {
            if owners.len() == count {
                break;
            }
            let id = vn.node.hashring_node_id();
            if !owners.iter().any(|owner| owner.hashring_node_id() == id) {
                owners.push(Arc::clone(&vn.node));
            }
        }
        Ok(owners)
    }
}

impl<N> Display for HashRingState<N>
where
    N: Node + ?Sized,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "HashRingState ({} nodes X {} virtual, {} positions) {{",
            self.len_nodes(),
            self.vnodes_per_node,
            self.len_virtual_nodes()
        )?;
        for (i, vn) in self.vnodes.iter().enumerate() {
            writeln!(f, "\t- ({:0>6})  {}", i, vn)?
        }
        writeln!(f, "}}")
    }
}
