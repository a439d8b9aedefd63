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
use std::hash::{Hash, Hasher as StdHasher};
use std::sync::Arc;

use crate::types::{Hasher, Node, Position, Vnid};

/// Separates the node's name from the replica index in the key that places a virtual node.
const VIRTUAL_KEY_SEPARATOR: char = '#';

/// Returns the ring position of the virtual node `vnid` of the node named `node_name`.
///
/// The position is the digest of `"{node_name}#{vnid}"`, hence it can always be regenerated from
/// the name and the index alone.
pub(crate) fn virtual_position<H: Hasher>(hasher: &H, node_name: &str, vnid: Vnid) -> Position {
    let key = format!("{}{}{}", node_name, VIRTUAL_KEY_SEPARATOR, vnid);
    hasher.digest(key.as_bytes())
}

/// VirtualNode represents a single virtual node in the ring.
#[derive(Debug)]
pub struct VirtualNode<N>
where
    N: Node + ?Sized,
{
    pub(crate) position: Position,
    pub(crate) node: Arc<N>,
    vnid: Vnid,
}

impl<N> VirtualNode<N>
where
    N: Node + ?Sized,
{
    pub(crate) fn new<H: Hasher>(hasher: &H, node: Arc<N>, vnid: Vnid) -> Self {
        let position = virtual_position(hasher, &node.hashring_node_id(), vnid);
        VirtualNode {
            position,
            node,
            vnid,
        }
    }

    /// Returns the position of the virtual node on the ring.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the distinct [`Node`] that owns the virtual node.
    #[inline]
    pub fn node(&self) -> &Arc<N> {
        &self.node
    }

    /// Returns the replica index of the virtual node among those of its [`Node`].
    #[inline]
    pub fn vnid(&self) -> Vnid {
        self.vnid
    }
}

impl<N> Clone for VirtualNode<N>
where
    N: Node + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            node: Arc::clone(&self.node),
            vnid: self.vnid,
        }
    }
}

// Required for `Eq`.
impl<N> PartialEq for VirtualNode<N>
where
    N: Node + ?Sized,
{
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

// Required for `Ord`.
impl<N> Eq for VirtualNode<N> where N: Node + ?Sized {}

// Required for `Ord`.
impl<N> PartialOrd for VirtualNode<N>
where
    N: Node + ?Sized,
{
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// There is at most one `VirtualNode` per position in the ring, so ordering them by `position`
// only is enough to sort the ring.
impl<N> Ord for VirtualNode<N>
where
    N: Node + ?Sized,
{
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position.cmp(&other.position)
    }
}

// Must agree with `PartialEq`:
//      if (x == y) then (hash(x) == hash(y))
impl<N> Hash for VirtualNode<N>
where
    N: Node + ?Sized,
{
    fn hash<H: StdHasher>(&self, hasher: &mut H) {
        self.position.hash(hasher);
    }
}

impl<N> Display for VirtualNode<N>
where
    N: Node + ?Sized,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:08x} ({}#{})",
            self.position,
            self.node.hashring_node_id(),
            self.vnid
        )
    }
}
