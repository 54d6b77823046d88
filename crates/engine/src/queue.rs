// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job queue.
//!
//! A FIFO channel between the dispatcher and the worker pool. Unbounded
//! by default; with a bound, `push` blocks the producer until a worker
//! frees a slot, which backpressures message intake. Closing the queue
//! lets workers drain what is already buffered and then exit.

use warble_core::Job;

#[derive(Clone)]
pub struct JobQueue {
    tx: async_channel::Sender<Job>,
    rx: async_channel::Receiver<Job>,
}

impl JobQueue {
    /// `bound` of zero means unbounded.
    pub fn new(bound: usize) -> Self {
        let (tx, rx) = if bound == 0 {
            async_channel::unbounded()
        } else {
            async_channel::bounded(bound)
        };
        Self { tx, rx }
    }

    /// Enqueue a job, waiting for a slot when bounded. Returns false
    /// once the queue is closed (shutdown in progress).
    pub async fn push(&self, job: Job) -> bool {
        self.tx.send(job).await.is_ok()
    }

    /// Receiver side for workers; clones share the queue fairly.
    pub fn receiver(&self) -> async_channel::Receiver<Job> {
        self.rx.clone()
    }

    /// Stop accepting jobs. Buffered jobs remain receivable.
    pub fn close(&self) {
        self.tx.close();
    }

    /// Jobs currently buffered.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
