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

use std::iter::FusedIterator;

use parking_lot::RwLockReadGuard;

use crate::{state::HashRingState, types::Node, vnode::VirtualNode};

/// An iterator over the [`VirtualNode`]s of a [`HashRing<N, H>`], in ascending order of their
/// position on the ring.
///
/// It holds the ring's read lock for as long as it lives, so the ring cannot be updated in the
/// meantime: the iteration always reflects a single, consistent state of the ring. Lookups on the
/// same thread (e.g., [`HashRing::get`]) are fine while an `Iter` is alive, even if some other
/// thread is waiting to update the ring; calling [`HashRing::add`] or [`HashRing::remove`] on the
/// same thread, though, will deadlock.
///
/// Each [`VirtualNode`] is yielded as a clone, which is cheap.
///
///
///  [`HashRing<N, H>`]: struct.HashRing.html
///  [`HashRing::get`]: struct.HashRing.html#method.get
///  [`HashRing::add`]: struct.HashRing.html#method.add
///  [`HashRing::remove`]: struct.HashRing.html#method.remove
pub struct Iter<'a, N>
where
    N: Node + ?Sized,
{
    inner: RwLockReadGuard<'a, HashRingState<N>>,
    front: usize,
    back: usize,
}

impl<'a, N> Iter<'a, N>
where
    N: Node + ?Sized,
{
    #[inline]
    pub(crate) fn new(inner: RwLockReadGuard<'a, HashRingState<N>>) -> Self {
        let back = inner.len_virtual_nodes();
        Iter {
            inner,
            front: 0,
            back,
        }
    }
}

impl<'a, N> Iterator for Iter<'a, N>
where
    N: Node + ?Sized,
{
    type Item = VirtualNode<N>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            self.inner.vnodes.get(self.front - 1).cloned()
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.back - self.front;
        (rem, Some(rem))
    }
}

impl<'a, N> DoubleEndedIterator for Iter<'a, N>
where
    N: Node + ?Sized,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            self.inner.vnodes.get(self.back).cloned()
        } else {
            None
        }
    }
}

impl<'a, N> ExactSizeIterator for Iter<'a, N>
where
    N: Node + ?Sized,
{
    #[inline]
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<'a, N: Node + ?Sized> FusedIterator for Iter<'a, N> {}
