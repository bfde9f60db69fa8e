// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use recoverable::{Recovery, RecoveryInfo};

/// Status reported by the native inventory subsystem for an operation handle.
///
/// Only a subset of the native result codes carries meaning for inventory operations and
/// is named here. Every other raw value is preserved in [`ResultCode::Other`], so that
/// converting with [`ResultCode::from_raw`] and back with [`ResultCode::as_raw`] is lossless.
///
/// # Examples
///
/// ```
/// use inventory_result::{ResultCode, StatusClass};
///
/// assert_eq!(ResultCode::from_raw(22), ResultCode::Pending);
/// assert_eq!(ResultCode::Ok.class(), StatusClass::Success);
/// assert_eq!(ResultCode::from_raw(1234).as_raw(), 1234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResultCode {
    /// The operation completed successfully.
    Ok,
    /// Generic failure.
    Fail,
    /// No connection to the backing service.
    NoConnection,
    /// A parameter was invalid. Also reported for the invalid handle sentinel.
    InvalidParam,
    /// The subsystem is busy with another operation.
    Busy,
    /// The operation is not allowed in the current state.
    InvalidState,
    /// The caller is not allowed to perform the operation.
    AccessDenied,
    /// The operation timed out on the service side.
    Timeout,
    /// The backing service is unavailable.
    ServiceUnavailable,
    /// The operation has not completed yet.
    Pending,
    /// A quota or limit was exceeded.
    LimitExceeded,
    /// The data referenced by the operation has expired.
    Expired,
    /// Too many operations were issued in a short time.
    RateLimitExceeded,
    /// A result code with no dedicated variant.
    Other(i32),
}

/// Coarse classification of a [`ResultCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// The operation is still in flight.
    Pending,
    /// The operation completed successfully.
    Success,
    /// The operation completed with a failure.
    Failure,
}

impl ResultCode {
    /// Converts a raw native result code.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Ok,
            2 => Self::Fail,
            3 => Self::NoConnection,
            8 => Self::InvalidParam,
            10 => Self::Busy,
            11 => Self::InvalidState,
            15 => Self::AccessDenied,
            16 => Self::Timeout,
            20 => Self::ServiceUnavailable,
            22 => Self::Pending,
            25 => Self::LimitExceeded,
            27 => Self::Expired,
            84 => Self::RateLimitExceeded,
            other => Self::Other(other),
        }
    }

    /// Returns the raw native value of this result code.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Ok => 1,
            Self::Fail => 2,
            Self::NoConnection => 3,
            Self::InvalidParam => 8,
            Self::Busy => 10,
            Self::InvalidState => 11,
            Self::AccessDenied => 15,
            Self::Timeout => 16,
            Self::ServiceUnavailable => 20,
            Self::Pending => 22,
            Self::LimitExceeded => 25,
            Self::Expired => 27,
            Self::RateLimitExceeded => 84,
            Self::Other(raw) => raw,
        }
    }

    /// Classifies the code as pending, success or failure.
    #[must_use]
    pub const fn class(self) -> StatusClass {
        match self {
            Self::Pending => StatusClass::Pending,
            Self::Ok => StatusClass::Success,
            _ => StatusClass::Failure,
        }
    }
}

impl From<i32> for ResultCode {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        code.as_raw()
    }
}

/// Tells callers whether re-issuing the inventory operation may help.
///
/// A pending status is reported as retryable because polling again is expected to
/// produce a decided status.
impl Recovery for ResultCode {
    fn recovery(&self) -> RecoveryInfo {
        match self {
            Self::Pending | Self::Busy | Self::Timeout | Self::LimitExceeded | Self::RateLimitExceeded => RecoveryInfo::retry(),
            Self::NoConnection | Self::ServiceUnavailable => RecoveryInfo::unavailable(),
            Self::Other(_) => RecoveryInfo::unknown(),
            Self::Ok | Self::Fail | Self::InvalidParam | Self::InvalidState | Self::AccessDenied | Self::Expired => RecoveryInfo::never(),
        }
    }
}

#[cfg(test)]
mod tests {
    use recoverable::RecoveryKind;

    use super::*;

    #[test]
    fn raw_values_round_trip() {
        for raw in -3..100 {
            assert_eq!(ResultCode::from_raw(raw).as_raw(), raw);
        }
    }

    #[test]
    fn named_codes_are_not_other() {
        assert_eq!(ResultCode::from(1), ResultCode::Ok);
        assert_eq!(ResultCode::from(8), ResultCode::InvalidParam);
        assert_eq!(ResultCode::from(22), ResultCode::Pending);
        assert_eq!(ResultCode::from(5), ResultCode::Other(5));
        assert_eq!(i32::from(ResultCode::RateLimitExceeded), 84);
    }

    #[test]
    fn classification() {
        assert_eq!(ResultCode::Pending.class(), StatusClass::Pending);
        assert_eq!(ResultCode::Ok.class(), StatusClass::Success);
        assert_eq!(ResultCode::InvalidParam.class(), StatusClass::Failure);
        assert_eq!(ResultCode::Other(99).class(), StatusClass::Failure);
    }

    #[test]
    fn recovery_kinds() {
        assert_eq!(ResultCode::Busy.recovery().kind(), RecoveryKind::Retry);
        assert_eq!(ResultCode::Pending.recovery().kind(), RecoveryKind::Retry);
        assert_eq!(ResultCode::ServiceUnavailable.recovery().kind(), RecoveryKind::Unavailable);
        assert_eq!(ResultCode::AccessDenied.recovery().kind(), RecoveryKind::Never);
        assert_eq!(ResultCode::Ok.recovery().kind(), RecoveryKind::Never);
        assert_eq!(ResultCode::Other(1234).recovery().kind(), RecoveryKind::Unknown);
    }
}
