// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Misuse of an inventory result.
///
/// Failures of the native subsystem are not errors at this level: they are reported
/// through [`ResultState`][crate::ResultState], `is_success() == false` or an absent
/// serialized buffer. An `Error` always points at a lifecycle bug in the calling code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The result was already disposed and its handle destroyed.
    #[error("the inventory result has already been disposed")]
    Disposed,
}

/// A specialized `Result` for inventory result operations.
pub type Result<T> = std::result::Result<T, Error>;
