// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Display, Formatter};

/// Opaque identifier of an operation tracked by the native inventory subsystem.
///
/// The native subsystem hands out handles when an operation is issued and resolves them
/// into a status, a set of item records and a completion timestamp once the operation
/// has finished. [`ResultHandle::INVALID`] is a distinguished sentinel that never refers
/// to an operation.
///
/// # Examples
///
/// ```
/// use inventory_result::ResultHandle;
///
/// let handle = ResultHandle::from_raw(7);
/// assert!(handle.is_valid());
/// assert!(!ResultHandle::INVALID.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultHandle(i32);

impl ResultHandle {
    /// The sentinel handle. Results wrapping it are permanently failed.
    pub const INVALID: Self = Self(-1);

    /// Wraps a raw handle value as returned by the native subsystem.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Returns `true` unless this is [`ResultHandle::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for ResultHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Display for ResultHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("invalid")
        }
    }
}
