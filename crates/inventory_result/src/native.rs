// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

use crate::{ItemDetails, ResultCode, ResultHandle};

/// Capabilities of the native inventory subsystem that results are built on.
///
/// Implementations bind to the actual subsystem. Calls are expected to be cheap,
/// non-blocking and safe to repeat for the same handle; the subsystem owns the operation
/// behind a handle until [`InventoryNative::destroy_result`] is called.
pub trait InventoryNative: Debug + Send + Sync {
    /// Returns the current status of the operation behind `handle`.
    fn result_status(&self, handle: ResultHandle) -> ResultCode;

    /// Returns the completion time of the operation, in seconds since the Unix epoch.
    fn result_timestamp(&self, handle: ResultHandle) -> u32;

    /// Returns the item records produced by the operation.
    ///
    /// `None` means the records are not available (yet), which is different from an
    /// operation that produced no records.
    fn result_items(&self, handle: ResultHandle) -> Option<Vec<ItemDetails>>;

    /// Releases the operation behind `handle`.
    fn destroy_result(&self, handle: ResultHandle);

    /// Encodes the result of the operation into `buffer`.
    ///
    /// When `buffer` is `None`, only `size` is updated with the number of bytes required.
    /// Otherwise `size` holds the capacity of `buffer` on input and the number of bytes
    /// written on output. Returns `false` if the result could not be encoded.
    fn serialize_result(&self, handle: ResultHandle, buffer: Option<&mut [u8]>, size: &mut u32) -> bool;

    /// Reconstructs an operation from bytes previously produced by
    /// [`InventoryNative::serialize_result`], returning the handle of the new operation.
    fn deserialize_result(&self, data: &[u8]) -> Option<ResultHandle>;
}
