use std::{collections::VecDeque, time::Duration};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Identity of one scheduled tick; the engine only honours its current token.
pub struct TickToken(pub(crate) u64);

impl TickToken {
    /// Raw token value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Host capability for delayed callbacks.
///
/// When a scheduled tick fires the host calls
/// [`PlaybackEngine::on_timer`](crate::PlaybackEngine::on_timer) with the token.
/// `cancel` is best effort: a tick that already left the queue may still be delivered,
/// and the engine discards it because its token is no longer live.
pub trait TickScheduler {
    /// Deliver `token` back to the engine after `after` has elapsed.
    fn schedule(&mut self, token: TickToken, after: Duration);

    /// Drop a pending tick.
    fn cancel(&mut self, token: TickToken);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Tick waiting in a [`ManualScheduler`].
pub struct ScheduledTick {
    /// Token to hand back to the engine.
    pub token: TickToken,
    /// Requested delay.
    pub after: Duration,
}

/// Scheduler pumped by the host's own loop (UI frame callback, test, virtual clock).
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: VecDeque<ScheduledTick>,
}

impl ManualScheduler {
    /// Scheduler with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest pending tick.
    pub fn pop_next(&mut self) -> Option<ScheduledTick> {
        self.pending.pop_front()
    }

    /// Peek at the oldest pending tick.
    pub fn peek(&self) -> Option<&ScheduledTick> {
        self.pending.front()
    }

    /// Number of pending ticks.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, token: TickToken, after: Duration) {
        self.pending.push_back(ScheduledTick { token, after });
    }

    fn cancel(&mut self, token: TickToken) {
        self.pending.retain(|t| t.token != token);
    }
}
