//! Title resolution in article discovery order.
//!
//! Article pages are fetched concurrently and finish in any order, but the
//! [`TitleRegistry`] must see titles in discovery order for the resolved
//! names to be stable between runs. Each article holds a [`TitleTicket`] for
//! its sequence number; resolving waits until every earlier ticket has been
//! resolved or dropped.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::naming::TitleRegistry;

#[derive(Debug, Default)]
struct TurnState {
    next: usize,
    finished: BTreeSet<usize>,
    registry: TitleRegistry,
}

/// Shared turn counter plus the per-artist registry.
#[derive(Debug)]
pub(crate) struct TitleTurns {
    state: Mutex<TurnState>,
    next_tx: watch::Sender<usize>,
}

impl TitleTurns {
    pub(crate) fn new() -> Arc<Self> {
        let (next_tx, _) = watch::channel(0);
        Arc::new(Self {
            state: Mutex::new(TurnState::default()),
            next_tx,
        })
    }

    /// Ticket for the article with discovery sequence `seq`.
    pub(crate) fn ticket(self: &Arc<Self>, seq: usize) -> TitleTicket {
        TitleTicket {
            turns: Arc::clone(self),
            seq,
            done: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TurnState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark `seq` finished and advance past every contiguous finished turn.
    fn finish(&self, seq: usize) {
        let next = {
            let mut guard = self.lock();
            let state = &mut *guard;
            state.finished.insert(seq);
            while state.finished.remove(&state.next) {
                state.next += 1;
            }
            state.next
        };
        self.next_tx.send_replace(next);
    }

    async fn wait_for_turn(&self, seq: usize) {
        let mut rx = self.next_tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|next| *next >= seq).await;
    }
}

/// Place in the resolution order. Dropping an unresolved ticket (article
/// failed, task panicked) gives the turn away so later articles proceed.
#[derive(Debug)]
pub(crate) struct TitleTicket {
    turns: Arc<TitleTurns>,
    seq: usize,
    done: bool,
}

impl TitleTicket {
    /// Wait for this article's turn, then resolve `title` to a unique name.
    pub(crate) async fn resolve(mut self, title: &str) -> String {
        self.turns.wait_for_turn(self.seq).await;
        let resolved = self.turns.lock().registry.resolve(title);
        self.done = true;
        self.turns.finish(self.seq);
        resolved
    }
}

impl Drop for TitleTicket {
    fn drop(&mut self) {
        if !self.done {
            self.turns.finish(self.seq);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_in_sequence_order_regardless_of_arrival() {
        let turns = TitleTurns::new();
        let t0 = turns.ticket(0);
        let t1 = turns.ticket(1);
        let t2 = turns.ticket(2);

        let late = tokio::spawn(async move { t2.resolve("Update").await });
        let mid = tokio::spawn(async move { t1.resolve("Update").await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!late.is_finished());
        assert_eq!(t0.resolve("Update").await, "Update");
        assert_eq!(mid.await.unwrap(), "Update (1)");
        assert_eq!(late.await.unwrap(), "Update (2)");
    }

    #[tokio::test]
    async fn dropped_ticket_passes_turn() {
        let turns = TitleTurns::new();
        let t0 = turns.ticket(0);
        let t1 = turns.ticket(1);
        drop(t0);
        let name = tokio::time::timeout(Duration::from_secs(2), t1.resolve("Solo"))
            .await
            .expect("turn should pass after drop");
        assert_eq!(name, "Solo");
    }

    #[tokio::test]
    async fn out_of_order_finish_advances_contiguously() {
        let turns = TitleTurns::new();
        let t0 = turns.ticket(0);
        let t1 = turns.ticket(1);
        let t2 = turns.ticket(2);
        drop(t1);
        assert_eq!(*turns.next_tx.borrow(), 0);
        assert_eq!(t0.resolve("A").await, "A");
        assert_eq!(*turns.next_tx.borrow(), 2);
        assert_eq!(t2.resolve("A").await, "A (1)");
    }
}
