//! Deduplicating crawl frontier with dynamic termination detection.
//!
//! The frontier is the only shared mutable state in a crawl. It accepts
//! URLs from any number of concurrent producers, hands each distinct URL to
//! exactly one consumer, and detects the moment no consumer is mid-flight
//! and no further work can ever appear.
//!
//! Correctness hinges on one ordering rule: a consumer calls
//! [`Frontier::task_done`] only after every [`Frontier::enqueue`] its
//! processing triggered has already incremented the outstanding counter.
//! Under that rule the counter can never transiently read zero while real
//! work is still about to be added.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use tokio::sync::{watch, Semaphore};
use url::Url;

use crate::canonical;

/// Outcome of asking the frontier for more work.
#[derive(Debug)]
pub enum Next {
    /// A URL to process. The caller must call [`Frontier::task_done`]
    /// exactly once for it, after any enqueues made while processing it.
    Item(Url),
    /// The frontier is drained: no pending URLs and no outstanding work.
    /// No further items will ever be produced.
    Drained,
}

struct Inner {
    pending: VecDeque<Url>,
    seen: HashSet<String>,
    outstanding: usize,
}

/// Thread-safe, deduplicating, dynamically growing work queue.
///
/// Mutable state lives behind a single mutex that is never held across an
/// await point. Consumer blocking is driven by a semaphore carrying one
/// permit per queued URL; closing the semaphore is the terminal broadcast
/// that unblocks every waiting consumer.
pub struct Frontier {
    inner: Mutex<Inner>,
    ready: Semaphore,
    done: watch::Sender<bool>,
}

impl Frontier {
    pub fn new() -> Self {
        let (done, _) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                seen: HashSet::new(),
                outstanding: 0,
            }),
            ready: Semaphore::new(0),
            done,
        }
    }

    /// Offer a URL to the frontier.
    ///
    /// Returns `false` without side effects if a URL with the same
    /// deduplication key was ever enqueued before. Otherwise records the
    /// key, counts the URL as outstanding, queues it, and wakes one blocked
    /// consumer. The membership test and insert happen under one lock, so
    /// two racing producers can never both believe they were first.
    pub fn enqueue(&self, url: Url) -> bool {
        {
            let mut inner = self.inner.lock().expect("frontier lock poisoned");
            if !inner.seen.insert(canonical::dedup_key(&url)) {
                return false;
            }
            inner.outstanding += 1;
            inner.pending.push_back(url);
        }
        self.ready.add_permits(1);
        true
    }

    /// Pull the next URL, blocking while the pending list is empty but work
    /// is still outstanding elsewhere. Returns [`Next::Drained`] once the
    /// terminal state is reached.
    pub async fn next(&self) -> Next {
        match self.ready.acquire().await {
            Ok(permit) => {
                permit.forget();
                let mut inner = self.inner.lock().expect("frontier lock poisoned");
                // One permit is added per queued URL, so a held permit
                // always has a matching pending entry.
                match inner.pending.pop_front() {
                    Some(url) => Next::Item(url),
                    None => Next::Drained,
                }
            }
            // Closed: the last outstanding URL completed.
            Err(_) => Next::Drained,
        }
    }

    /// Record that one dequeued URL has been fully processed.
    ///
    /// Must be called exactly once per [`Next::Item`], regardless of whether
    /// processing succeeded, erred, or found nothing. A missed call hangs
    /// the crawl forever. When the outstanding count reaches zero the
    /// frontier closes and broadcasts completion; it cannot be re-opened.
    pub fn task_done(&self) {
        let drained = {
            let mut inner = self.inner.lock().expect("frontier lock poisoned");
            debug_assert!(inner.outstanding > 0, "task_done without matching enqueue");
            inner.outstanding -= 1;
            inner.outstanding == 0
        };
        if drained {
            self.ready.close();
            // send_replace updates the value even with no live receivers,
            // so a wait() that subscribes after the drain still sees it.
            self.done.send_replace(true);
        }
    }

    /// Block until the frontier reaches its terminal state.
    pub async fn wait(&self) {
        let mut rx = self.done.subscribe();
        // borrow_and_update marks the current value as seen before awaiting
        // a change, so a completion that already happened is not missed.
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Number of URLs enqueued but not yet fully processed.
    pub fn outstanding(&self) -> usize {
        self.inner.lock().expect("frontier lock poisoned").outstanding
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
