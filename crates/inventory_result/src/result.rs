// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{Level, event};

use crate::inventory::Shared;
use crate::signal::CompletionSignal;
use crate::{Error, MaterializedResult, Result, ResultCode, ResultHandle, StatusClass};

/// Where an [`InventoryResult`] stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultState {
    /// The operation is still in flight.
    Pending,
    /// The operation succeeded but its records are not available yet.
    Completed,
    /// The records were fetched and partitioned; see [`InventoryResult::materialized`].
    Materialized,
    /// The operation failed with the given code.
    Failed(ResultCode),
    /// The result wraps [`ResultHandle::INVALID`] and will never complete.
    Invalid,
}

impl ResultState {
    /// Whether the outcome of the operation is known.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The result of an asynchronous inventory operation.
///
/// A result owns the native handle of one operation. It polls the native subsystem for the
/// status of the operation and, the first time it observes success, fetches the produced
/// item records, partitions them into active, removed and consumed items and hands them to
/// the owning [`Inventory`][crate::Inventory]. Later reads are served from that
/// [`MaterializedResult`] without touching the native subsystem.
///
/// All methods take `&self` and may be called from several threads; materialization
/// happens at most once regardless.
///
/// A caller that observes the result as materialized also observes it applied to the
/// inventory: when another thread is still merging the result into the snapshot or
/// running update listeners, the observing call waits for it to finish.
///
/// The handle is released by [`InventoryResult::dispose`] or, if that was never called,
/// when the result is dropped. Any call after `dispose` returns [`Error::Disposed`],
/// except [`InventoryResult::handle`] and [`InventoryResult::is_valid`], which keep
/// answering and report [`ResultHandle::INVALID`] and `false`.
#[derive(Debug)]
pub struct InventoryResult {
    inner: Mutex<Inner>,
    // Held by the materializing thread until the result is applied to the inventory.
    // Reentrant so that update listeners may query the result being applied.
    applying: ReentrantMutex<()>,
    signal: CompletionSignal,
}

#[derive(Debug)]
struct Inner {
    handle: ResultHandle,
    // `None` once the result has been disposed.
    inventory: Option<Arc<Shared>>,
    materialized: Option<Arc<MaterializedResult>>,
}

impl Inner {
    fn inventory(&self) -> Result<Arc<Shared>> {
        self.inventory.clone().ok_or(Error::Disposed)
    }

    fn status(&self, inventory: &Shared) -> ResultCode {
        if self.handle.is_valid() {
            inventory.native.result_status(self.handle)
        } else {
            ResultCode::InvalidParam
        }
    }

    fn state(&self, inventory: &Shared) -> ResultState {
        if self.materialized.is_some() {
            return ResultState::Materialized;
        }

        if !self.handle.is_valid() {
            return ResultState::Invalid;
        }

        let code = self.status(inventory);
        match code.class() {
            StatusClass::Pending => ResultState::Pending,
            StatusClass::Success => ResultState::Completed,
            StatusClass::Failure => ResultState::Failed(code),
        }
    }

    /// Destroys the native handle. Returns `false` if it was already released.
    fn release(&mut self) -> bool {
        let Some(inventory) = self.inventory.take() else {
            return false;
        };

        inventory.native.destroy_result(self.handle);
        event!(Level::DEBUG, message = "destroyed inventory result", handle = self.handle.as_raw());

        self.handle = ResultHandle::INVALID;
        self.materialized = None;
        true
    }
}

impl InventoryResult {
    pub(crate) fn new(inventory: Arc<Shared>, handle: ResultHandle) -> Self {
        Self {
            inner: Mutex::new(Inner {
                handle,
                inventory: Some(inventory),
                materialized: None,
            }),
            applying: ReentrantMutex::new(()),
            signal: CompletionSignal::default(),
        }
    }

    /// Waits until a materialization running on another thread has been applied.
    fn wait_applied(&self) {
        drop(self.applying.lock());
    }

    /// The native handle, or [`ResultHandle::INVALID`] once disposed.
    ///
    /// Unlike most other methods, this keeps working after disposal.
    #[must_use]
    pub fn handle(&self) -> ResultHandle {
        self.inner.lock().handle
    }

    /// Returns `true` unless the handle is [`ResultHandle::INVALID`].
    ///
    /// A disposed result is not valid; this keeps working after disposal.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.lock().handle.is_valid()
    }

    /// Queries the raw status of the operation.
    ///
    /// An invalid handle reports [`ResultCode::InvalidParam`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn status(&self) -> Result<ResultCode> {
        let inner = self.inner.lock();
        let inventory = inner.inventory()?;
        Ok(inner.status(&inventory))
    }

    /// Reports the current state without materializing.
    ///
    /// A successful operation whose records were not fetched yet reports
    /// [`ResultState::Completed`]; use [`InventoryResult::advance`] to move it forward.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn state(&self) -> Result<ResultState> {
        let state = {
            let inner = self.inner.lock();
            let inventory = inner.inventory()?;
            inner.state(&inventory)
        };

        if state == ResultState::Materialized {
            self.wait_applied();
        }

        Ok(state)
    }

    /// Polls the operation once and materializes it if it has succeeded.
    ///
    /// Materialization fetches the completion timestamp and the item records. If the
    /// native subsystem has no records to offer yet, the result stays
    /// [`ResultState::Completed`] and the next call tries again. Once materialized, the
    /// owning inventory is notified exactly once and further calls return
    /// [`ResultState::Materialized`] without calling into the native subsystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn advance(&self) -> Result<ResultState> {
        let mut inner = self.inner.lock();
        let inventory = inner.inventory()?;
        let (state, applied) = Self::step(&mut inner, &inventory);

        let Some(materialized) = applied else {
            drop(inner);

            if state == ResultState::Materialized {
                self.wait_applied();
            }

            if state.is_decided() {
                self.signal.raise();
            }

            return Ok(state);
        };

        // Taken before the state lock is released, so nobody observes the result as
        // materialized before it is applied.
        let applying = self.applying.lock();
        drop(inner);

        inventory.apply_result(&materialized);
        drop(applying);

        self.signal.raise();
        Ok(state)
    }

    fn step(inner: &mut Inner, inventory: &Shared) -> (ResultState, Option<Arc<MaterializedResult>>) {
        match inner.state(inventory) {
            ResultState::Failed(code) => {
                event!(Level::DEBUG, message = "inventory operation failed", handle = inner.handle.as_raw(), code = code.as_raw());
                (ResultState::Failed(code), None)
            }
            ResultState::Completed => {
                let native = &inventory.native;
                let timestamp = native.result_timestamp(inner.handle);

                let Some(records) = native.result_items(inner.handle) else {
                    event!(
                        Level::DEBUG,
                        message = "inventory operation succeeded without records",
                        handle = inner.handle.as_raw()
                    );
                    return (ResultState::Completed, None);
                };

                let materialized = Arc::new(MaterializedResult::from_records(inner.handle, timestamp, &records, inventory.catalog()));
                event!(
                    Level::TRACE,
                    message = "materialized inventory result",
                    handle = inner.handle.as_raw(),
                    records = records.len(),
                    timestamp
                );

                inner.materialized = Some(Arc::clone(&materialized));
                (ResultState::Materialized, Some(materialized))
            }
            state => (state, None),
        }
    }

    /// Returns `true` while the operation is in flight.
    ///
    /// This is not a read-only check: once the operation has succeeded, the call
    /// materializes the result (see [`InventoryResult::advance`]) before returning `false`.
    /// Failed operations and invalid handles are never pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn is_pending(&self) -> Result<bool> {
        Ok(self.advance()? == ResultState::Pending)
    }

    /// Returns `true` if the operation succeeded.
    ///
    /// Unlike [`InventoryResult::is_pending`], this never materializes the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn is_success(&self) -> Result<bool> {
        {
            let inner = self.inner.lock();
            let inventory = inner.inventory()?;

            if inner.materialized.is_none() {
                return Ok(inner.handle.is_valid() && inner.status(&inventory) == ResultCode::Ok);
            }
        }

        self.wait_applied();
        Ok(true)
    }

    /// The materialized items, once the operation succeeded and its records were fetched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn materialized(&self) -> Result<Option<Arc<MaterializedResult>>> {
        let materialized = {
            let inner = self.inner.lock();
            inner.inventory()?;
            inner.materialized.clone()
        };

        if materialized.is_some() {
            self.wait_applied();
        }

        Ok(materialized)
    }

    /// Completion timestamp, once materialized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn timestamp(&self) -> Result<Option<u32>> {
        Ok(self.materialized()?.map(|m| m.timestamp()))
    }

    /// Blocks the calling thread until the outcome of the operation is known or
    /// `max_wait` has elapsed, and returns whether it succeeded.
    ///
    /// The returned value equals what [`InventoryResult::is_success`] reports right after
    /// the call. Under [`WaitPolicy::Unbounded`][crate::WaitPolicy::Unbounded] `max_wait`
    /// is ignored and the call only returns once the operation is decided.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn block(&self, max_wait: Duration) -> Result<bool> {
        let inventory = self.inner.lock().inventory()?;
        let options = inventory.options;
        let stopwatch = inventory.clock.stopwatch();

        while self.is_pending()? {
            if options.expired(stopwatch.elapsed(), max_wait) {
                event!(Level::DEBUG, message = "inventory result wait expired", handle = self.handle().as_raw());
                break;
            }

            self.signal.wait(options.get_poll_interval());
        }

        self.is_success()
    }

    /// Like [`InventoryResult::block`], with the inventory's default maximum wait.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn block_default(&self) -> Result<bool> {
        let max_wait = self.inner.lock().inventory()?.options.get_max_wait();
        self.block(max_wait)
    }

    /// Waits without blocking the thread until the outcome of the operation is known or
    /// `max_wait` has elapsed on the inventory clock, and returns whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub async fn wait(&self, max_wait: Duration) -> Result<bool> {
        let inventory = self.inner.lock().inventory()?;
        let options = inventory.options;
        let clock = inventory.clock.clone();
        drop(inventory);

        let stopwatch = clock.stopwatch();

        while self.is_pending()? {
            if options.expired(stopwatch.elapsed(), max_wait) {
                event!(Level::DEBUG, message = "inventory result wait expired", handle = self.handle().as_raw());
                break;
            }

            clock.delay(options.get_poll_interval()).await;
        }

        self.is_success()
    }

    /// Encodes the result into an opaque buffer that [`Inventory::deserialize`] turns back
    /// into an equivalent result.
    ///
    /// Returns `None` if the native subsystem could not encode the result. The buffer is
    /// returned exactly as the native subsystem wrote it.
    ///
    /// [`Inventory::deserialize`]: crate::Inventory::deserialize
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was disposed.
    pub fn serialize(&self) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock();
        let inventory = inner.inventory()?;
        let native = &inventory.native;

        let mut size = 0;
        // The sizing call reports through `size` only.
        let _sized = native.serialize_result(inner.handle, None, &mut size);

        let Ok(len) = usize::try_from(size) else {
            return Ok(None);
        };

        let mut buffer = vec![0; len];
        if !native.serialize_result(inner.handle, Some(&mut buffer), &mut size) {
            event!(Level::DEBUG, message = "inventory result serialization failed", handle = inner.handle.as_raw());
            return Ok(None);
        }

        Ok(Some(buffer))
    }

    /// Destroys the native handle and detaches the result from its inventory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disposed`] if the result was already disposed.
    pub fn dispose(&self) -> Result<()> {
        if self.inner.lock().release() {
            Ok(())
        } else {
            Err(Error::Disposed)
        }
    }
}

impl Drop for InventoryResult {
    fn drop(&mut self) {
        self.inner.get_mut().release();
    }
}
