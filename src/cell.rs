//! The shared reading cell.
//!
//! A single value protected by an async mutex. Exactly one task writes it and any number of tasks
//! read it. The lock is only ever held for the copy in or out, so a waiter is delayed by at most one
//! other task's copy.

use crate::{LOCK_TIMEOUT, Reading};
use embassy_sync::{blocking_mutex::raw::RawMutex, mutex::Mutex};
use embassy_time::{Duration, with_timeout};

/// The cell the monitor tasks share
pub type ReadingCell<M> = SharedCell<M, Reading>;

/// The lock could not be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockError {
    /// Nobody released the lock within the cell's lock timeout
    Timeout,
}

/// A `Copy` value shared between tasks. Readers always get a complete copy of the last finished
/// write (or the initial value), never a mix of two writes.
pub struct SharedCell<M: RawMutex, T: Copy> {
    inner: Mutex<M, T>,
    lock_timeout: Duration,
}

impl<M: RawMutex, T: Copy> SharedCell<M, T> {
    /// Create a cell holding `initial`, using the default lock timeout
    pub const fn new(initial: T) -> Self {
        Self::with_lock_timeout(initial, LOCK_TIMEOUT)
    }

    /// Create a cell holding `initial`. Lock waits longer than `lock_timeout` fail with
    /// [`LockError::Timeout`].
    pub const fn with_lock_timeout(initial: T, lock_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(initial),
            lock_timeout,
        }
    }

    /// Replace the stored value
    pub async fn write(&self, value: T) -> Result<(), LockError> {
        let mut guard = with_timeout(self.lock_timeout, self.inner.lock())
            .await
            .map_err(|_| LockError::Timeout)?;
        *guard = value;
        Ok(())
    }

    /// Copy out the current value
    pub async fn read(&self) -> Result<T, LockError> {
        let guard = with_timeout(self.lock_timeout, self.inner.lock())
            .await
            .map_err(|_| LockError::Timeout)?;
        Ok(*guard)
    }

    /// Copy out the current value without waiting. `None` if someone holds the lock right now.
    pub fn try_read(&self) -> Option<T> {
        self.inner.try_lock().ok().map(|guard| *guard)
    }

    /// Direct access to the underlying mutex, used to hold the lock across an await in tests and
    /// diagnostics.
    pub fn raw(&self) -> &Mutex<M, T> {
        &self.inner
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

impl<M: RawMutex> SharedCell<M, Reading> {
    /// A reading cell holding zero lux, the state before the first acquisition
    pub const fn empty() -> Self {
        Self::new(Reading::ZERO)
    }
}
