// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// One-shot signal raised when a result leaves the pending state.
///
/// Waiters sleep on it for at most one poll interval, so a completion observed by another
/// thread wakes them immediately while a completion that nobody observed yet is still
/// picked up by their next poll.
#[derive(Debug, Default)]
pub(crate) struct CompletionSignal {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl CompletionSignal {
    pub(crate) fn raise(&self) {
        let mut raised = self.raised.lock();
        if !*raised {
            *raised = true;
            self.condvar.notify_all();
        }
    }

    pub(crate) fn is_raised(&self) -> bool {
        *self.raised.lock()
    }

    /// Blocks until the signal is raised or `timeout` elapses. Returns whether it was raised.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let mut raised = self.raised.lock();
        if !*raised {
            // Spurious wake-ups and timeouts are both handled by the caller re-polling.
            let _timed_out = self.condvar.wait_for(&mut raised, timeout);
        }

        *raised
    }
}
