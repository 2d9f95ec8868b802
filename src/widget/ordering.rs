use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// How replies to overlapping submissions are placed in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyOrder {
    /// Render each reply as soon as it resolves.
    #[default]
    Arrival,
    /// Hold replies back until every earlier submission has resolved.
    Submission,
    /// Render a reply only if nothing newer has been rendered yet.
    LatestOnly,
}

impl FromStr for ReplyOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrival" => Ok(ReplyOrder::Arrival),
            "submission" => Ok(ReplyOrder::Submission),
            "latest" | "latest-only" => Ok(ReplyOrder::LatestOnly),
            other => Err(ConfigError::ReplyOrder(other.to_string())),
        }
    }
}

/// Where a resolved reply went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Ready,
    Deferred,
    Dropped,
}

/// Issues sequence numbers and decides when resolved items may render.
#[derive(Debug)]
pub struct Sequencer<T> {
    order: ReplyOrder,
    next_seq: u64,
    next_to_render: u64,
    newest_rendered: Option<u64>,
    pending: BTreeMap<u64, T>,
}

impl<T> Sequencer<T> {
    pub fn new(order: ReplyOrder) -> Self {
        Self {
            order,
            next_seq: 0,
            next_to_render: 0,
            newest_rendered: None,
            pending: BTreeMap::new(),
        }
    }

    pub fn issue(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Number of resolved items waiting on an earlier one.
    pub fn backlog(&self) -> usize {
        self.pending.len()
    }

    /// Records that `seq` resolved with `item` and returns everything that
    /// may render now, in render order.
    ///
    /// Only an `answered` item makes older ones stale under `LatestOnly`; a
    /// failure still renders but lets an older answer through afterwards.
    pub fn resolve(&mut self, seq: u64, item: T, answered: bool) -> (Placement, Vec<(u64, T)>) {
        match self.order {
            ReplyOrder::Arrival => (Placement::Ready, vec![(seq, item)]),
            ReplyOrder::LatestOnly => {
                if self.newest_rendered.is_some_and(|newest| seq < newest) {
                    return (Placement::Dropped, Vec::new());
                }
                if answered {
                    self.newest_rendered = Some(seq);
                }
                (Placement::Ready, vec![(seq, item)])
            }
            ReplyOrder::Submission => {
                self.pending.insert(seq, item);
                let mut ready = Vec::new();
                while let Some(item) = self.pending.remove(&self.next_to_render) {
                    ready.push((self.next_to_render, item));
                    self.next_to_render += 1;
                }
                let placement = if ready.iter().any(|(s, _)| *s == seq) {
                    Placement::Ready
                } else {
                    Placement::Deferred
                };
                (placement, ready)
            }
        }
    }
}
