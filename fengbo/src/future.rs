// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::Error;

/// Why a [`Future::wait`] call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The operation was aborted, usually by connection teardown.
    Cancelled,

    /// The wait timeout elapsed before the future settled. The operation
    /// itself keeps running; waiting again is allowed.
    TimedOut,

    /// The operation failed with an engine error.
    Failed(Error),
}

#[derive(Debug)]
enum State<T> {
    Pending,
    Completed(T),
    Cancelled,
    Failed(Error),
}

/// One-shot completion cell shared between the engine and API callers.
///
/// A future starts out pending and settles exactly once: `complete`,
/// `cancel` and `fail` are terminal, and later transition attempts are
/// no-ops. Any number of threads may [`wait`](Self::wait) concurrently;
/// all of them are released when the future settles.
pub struct Future<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.state)
            .finish()
    }
}

impl<T> Default for Future<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Future<T> {
    /// Create a new pending future.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(State::Pending),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Settle with a value, releasing all waiters.
    pub fn complete(&self, value: T) {
        let mut state = self.lock();
        if matches!(*state, State::Pending) {
            *state = State::Completed(value);
            self.cond.notify_all();
        }
    }

    /// Settle as cancelled, releasing all waiters.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if matches!(*state, State::Pending) {
            *state = State::Cancelled;
            self.cond.notify_all();
        }
    }

    /// Settle with an error, releasing all waiters.
    pub fn fail(&self, err: Error) {
        let mut state = self.lock();
        if matches!(*state, State::Pending) {
            *state = State::Failed(err);
            self.cond.notify_all();
        }
    }

    /// Returns true if the future has not settled yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(*self.lock(), State::Pending)
    }
}

impl<T: Clone> Future<T> {
    /// Block until the future settles or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::TimedOut`] if the timeout elapses first,
    /// [`WaitError::Cancelled`] if the operation was aborted, or the
    /// stored error.
    pub fn wait(&self, timeout: Duration) -> Result<T, WaitError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            match &*state {
                State::Completed(value) => return Ok(value.clone()),
                State::Cancelled => return Err(WaitError::Cancelled),
                State::Failed(err) => return Err(WaitError::Failed(err.clone())),
                State::Pending => {}
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::TimedOut);
            }
            let (guard, _result) = self
                .cond
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_complete_releases_waiter() {
        let future = Arc::new(Future::new());
        let clone = Arc::clone(&future);
        let handle = thread::spawn(move || clone.wait(Duration::from_secs(1)));
        future.complete(42);
        assert_eq!(handle.join().unwrap(), Ok(42));
    }

    #[test]
    fn test_wait_timeout() {
        let future: Future<()> = Future::new();
        assert_eq!(
            future.wait(Duration::from_millis(10)),
            Err(WaitError::TimedOut)
        );
        // Still pending; a later completion is observed.
        future.complete(());
        assert_eq!(future.wait(Duration::from_millis(10)), Ok(()));
    }

    #[test]
    fn test_cancel() {
        let future: Future<u8> = Future::new();
        future.cancel();
        assert_eq!(
            future.wait(Duration::from_millis(10)),
            Err(WaitError::Cancelled)
        );
    }

    #[test]
    fn test_transitions_are_terminal() {
        let future: Future<u8> = Future::new();
        future.complete(1);
        future.cancel();
        future.fail(Error::new(ErrorKind::IoError, "late"));
        future.complete(2);
        assert_eq!(future.wait(Duration::from_millis(10)), Ok(1));
    }

    #[test]
    fn test_multiple_waiters() {
        let future = Arc::new(Future::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let clone = Arc::clone(&future);
            handles.push(thread::spawn(move || clone.wait(Duration::from_secs(1))));
        }
        future.complete("done");
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok("done"));
        }
    }

    #[test]
    fn test_fail() {
        let future: Future<u8> = Future::new();
        future.fail(Error::new(ErrorKind::MissingPong, "no pong"));
        match future.wait(Duration::from_millis(10)) {
            Err(WaitError::Failed(err)) => assert_eq!(err.kind(), ErrorKind::MissingPong),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
