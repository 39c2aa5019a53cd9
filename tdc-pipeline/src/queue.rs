// TDC Toolkit
// Copyright (c) 2026 The TDC Toolkit Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded single-producer/single-consumer queues with a distinguished
//! `Shutdown` sentinel standing in for channel disconnection.
//!
//! A queue is shut down implicitly when its [`Sender`] is dropped: the
//! producer is responsible for shutdown (by going out of scope), and a
//! consumer that calls [`Receiver::recv`] after that point observes
//! `Shutdown` forever after.

use crossbeam_channel::{bounded, RecvError};

/// What a [`Receiver`] observes on each call: either the next queued
/// item, in arrival order, or the terminal shutdown signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received<T> {
    Item(T),
    Shutdown,
}

/// The producing half of a bounded queue. `send` suspends the calling
/// thread when the queue is full.
pub struct Sender<T> {
    inner: crossbeam_channel::Sender<T>,
}

impl<T> Sender<T> {
    pub fn send(&self, item: T) {
        // The only way `send` can fail on a bounded channel is a
        // disconnected receiver, which means the consumer side has
        // already gone away; there is nothing useful left to do but
        // drop the item, so failures are silently absorbed here.
        let _ = self.inner.send(item);
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender { inner: self.inner.clone() }
    }
}

/// The consuming half of a bounded queue.
pub struct Receiver<T> {
    inner: crossbeam_channel::Receiver<T>,
}

impl<T> Receiver<T> {
    /// Suspends until an item is available or the queue is shut down.
    pub fn recv(&self) -> Received<T> {
        match self.inner.recv() {
            Ok(item) => Received::Item(item),
            Err(RecvError) => Received::Shutdown,
        }
    }
}

/// Creates a bounded queue of the given capacity.
pub fn channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = bounded(capacity);
    (Sender { inner: tx }, Receiver { inner: rx })
}
