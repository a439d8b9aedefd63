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

use thiserror::Error;

/// A type for the replica index of each virtual node of every distinct consistent hashing ring
/// node.
///
/// This is merely a type alias for `u16` for now.
/// Therefore, each distinct [`Node`] in the [`HashRing<N, H>`] can be mapped at least once and at
/// most [`u16::MAX`] times on the consistent hashing ring.
///
///
///  [`HashRing<N, H>`]: ../struct.HashRing.html
pub type Vnid = u16;

/// A position on the consistent hashing ring, i.e., the output of a [`Hasher`].
pub type Position = u32;

/// A custom `Result` type for this crate, combining a return value with a [`HashRingError`].
///
/// It is used all over the crate and also returned by many functions and method in its external
/// API.
pub type Result<T> = std::result::Result<T, HashRingError>;

/// A trait to be implemented by any type that needs to act as a distinct node in the consistent
/// hashing ring.
pub trait Node {
    /// Returns a name that uniquely identifies the particular [`Node`] from the rest of its kind.
    ///
    /// The virtual nodes of the [`Node`] are placed on the ring based on this name, so it must
    /// remain the same for as long as the [`Node`] populates the ring.
    fn hashring_node_id(&self) -> Cow<'_, str>;
}

impl Node for String {
    #[inline]
    fn hashring_node_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl Node for str {
    #[inline]
    fn hashring_node_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// An error type returned by calls to the API exposed by this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashRingError {
    /// The number of virtual nodes per ring node, provided for the construction of the consistent
    /// hashing ring, is invalid.
    #[error("Invalid configuration: {0} virtual nodes per node")]
    InvalidConfiguration(Vnid),

    /// The [`Node`] is already registered in the consistent hashing ring.
    #[error("Node {0:?} already exists in the ring")]
    DuplicateNode(String),

    /// The [`Node`] is not registered in the consistent hashing ring.
    #[error("Node {0:?} does not exist in the ring")]
    NodeNotFound(String),

    /// The consistent hashing ring is currently empty.
    #[error("HashRing is empty")]
    EmptyRing,
}

/// A trait to be implemented by any type that needs to act as a hash algorithm implementation.
///
/// The same `Hasher` places the virtual nodes on the ring and hashes the lookup keys, so any
/// implementation must be deterministic across process runs (i.e., not randomly seeded).
///
/// For the built-in implementations, refer to [`Crc32Hasher`] (the default one) and, if the
/// respective crate features are enabled, `Blake3Hasher` and `Blake2bHasher`.
// NOTE: The `Hasher` must also be `Default` as a means of instantiating it anew when cloning the
// `HashRing`.
pub trait Hasher: Default {
    /// Given a byte slice, returns its position on the consistent hashing ring.
    fn digest(&self, bytes: &[u8]) -> Position;
}

/// A [`Hasher`] implementation based on the CRC-32 (IEEE) checksum, as implemented in the
/// [crc32fast][crc32fast] crate.
///
///  [crc32fast]: https://docs.rs/crc32fast/1/crc32fast/
#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32Hasher;

impl Hasher for Crc32Hasher {
    #[inline]
    fn digest(&self, bytes: &[u8]) -> Position {
        crc32fast::hash(bytes)
    }
}

/// A [`Hasher`] implementation based on the [BLAKE3][BLAKE3.io] cryptographic hash function, as
/// implemented in the [blake3][blake3] crate.
///
/// The ring position is made of the first four bytes of the digest, in big-endian order.
///
/// To use this `Hasher` implementation in `rwchring-rs`, the `blake3-hash` crate feature must be
/// enabled.
///
///  [BLAKE3.io]: https://blake3.io/
///  [blake3]: https://docs.rs/blake3/0.3/blake3/
#[cfg(any(feature = "blake3-hash", doc))]
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

#[cfg(feature = "blake3-hash")]
impl Hasher for Blake3Hasher {
    #[inline]
    fn digest(&self, bytes: &[u8]) -> Position {
        let digest = blake3::hash(bytes);
        let d = digest.as_bytes();
        Position::from_be_bytes([d[0], d[1], d[2], d[3]])
    }
}

/// A [`Hasher`] implementation based on the [BLAKE2b][BLAKE2b] cryptographic hash function, as
/// implemented in the [blake2b_simd][blake2b_simd] crate.
///
/// The ring position is made of the first four bytes of the digest, in big-endian order.
///
/// To use this `Hasher` implementation in `rwchring-rs`, the `blake2b-hash` crate feature must be
/// enabled.
///
///  [BLAKE2b]: https://www.blake2.net/
///  [blake2b_simd]: https://docs.rs/blake2b_simd/0.5/blake2b_simd/
#[cfg(any(feature = "blake2b-hash", doc))]
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake2bHasher;

#[cfg(feature = "blake2b-hash")]
impl Hasher for Blake2bHasher {
    #[inline]
    fn digest(&self, bytes: &[u8]) -> Position {
        let digest = blake2b_simd::blake2b(bytes);
        let d = digest.as_bytes();
        Position::from_be_bytes([d[0], d[1], d[2], d[3]])
    }
}
