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

//! A concurrent consistent hashing ring with virtual nodes, guarded by a single reader/writer
//! lock.
//!
//! Every distinct [`Node`] is mapped on the ring [`DEFAULT_VNODES_PER_NODE`] times (or as many
//! times as configured upon construction), each time at the position of the digest of
//! `"{name}#{index}"`. A key is assigned on the owner of the first [`VirtualNode`] found at or
//! after the position of its own digest, wrapping around to the smallest position of the ring.
//! Therefore, inserting or removing a [`Node`] only reassigns the keys that fall within the
//! ranges of its own virtual nodes.
//!
//! # Hashing
//!
//! By default, ring positions are produced by [`Crc32Hasher`]. Alternative implementations of
//! [`Hasher`] based on BLAKE3 and BLAKE2b are available through the `blake3-hash` and
//! `blake2b-hash` crate features, respectively. The same [`Hasher`] is always used both for
//! placing the virtual nodes and for hashing the lookup keys.
//!
//! # Concurrency
//!
//! Lookups (e.g., [`HashRing::get`]) hold the ring's read lock, so any number of them may proceed
//! in parallel. Updates ([`HashRing::add`], [`HashRing::remove`]) hold the write lock, hence they
//! are serialized and exclude all lookups for their (short, in-memory) duration.
//! In multi-threaded contexts, [`HashRing`] should be explicitly wrapped in [`Arc`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rwchring::{Crc32Hasher, HashRing, HashRingError, Result};
//!
//! # fn main() -> Result<()> {
//! let ring: HashRing<str, Crc32Hasher> = HashRing::default();
//! assert_eq!(ring.get("key10"), Err(HashRingError::EmptyRing));
//!
//! ring.add(Arc::from("server01"))?;
//! ring.add(Arc::from("server02"))?;
//! ring.add(Arc::from("server03"))?;
//! assert!(ring.add(Arc::from("server01")).is_err());
//!
//! let node = ring.get("key10")?;
//! assert!(["server01", "server02", "server03"].contains(&&*node));
//! assert_eq!(node, ring.get("key10")?);
//!
//! ring.remove("server02")?;
//! assert_eq!(
//!     ring.remove("server02"),
//!     Err(HashRingError::NodeNotFound("server02".to_string()))
//! );
//! # Ok(())
//! # }
//! ```
//!
//!  [`Arc`]: std::sync::Arc

#![doc(html_root_url = "https://docs.rs/rwchring/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod iter;
mod ring;
mod state;
mod types;
mod vnode;


pub use crate::iter::Iter;
pub use crate::ring::HashRing;
#[cfg(any(feature = "blake2b-hash", doc))]
pub use crate::types::Blake2bHasher;
#[cfg(any(feature = "blake3-hash", doc))]
pub use crate::types::Blake3Hasher;
pub use crate::types::{Crc32Hasher, HashRingError, Hasher, Node, Position, Result, Vnid};
pub use crate::vnode::VirtualNode;

/// The number of virtual nodes per distinct ring node of a [`HashRing`] created via
/// [`Default::default`].
pub const DEFAULT_VNODES_PER_NODE: Vnid = 20;
