//! Status codes and the error type shared by both backends.
//!
//! Every operation of both backends reports its outcome as a [`SaiStatus`].
//! Rust callers see it through [`SaiError`], which keeps the status and a
//! short context string so log lines can say which object was involved.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! define_statuses {
    ($($variant:ident = $code:literal => $name:literal,)+) => {
        /// Outcome codes, numbered as `sai_status_t`.
        #[repr(i32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SaiStatus {
            $($variant = $code,)+
        }

        impl SaiStatus {
            const ALL: &'static [SaiStatus] = &[$(SaiStatus::$variant,)+];

            /// The `SAI_STATUS_*` name used on the wire.
            pub fn name(&self) -> &'static str {
                match self {
                    $(SaiStatus::$variant => $name,)+
                }
            }
        }
    };
}

define_statuses! {
    Success = 0 => "SAI_STATUS_SUCCESS",
    Failure = -1 => "SAI_STATUS_FAILURE",
    NotSupported = -2 => "SAI_STATUS_NOT_SUPPORTED",
    NoMemory = -3 => "SAI_STATUS_NO_MEMORY",
    InsufficientResources = -4 => "SAI_STATUS_INSUFFICIENT_RESOURCES",
    InvalidParameter = -5 => "SAI_STATUS_INVALID_PARAMETER",
    ItemAlreadyExists = -6 => "SAI_STATUS_ITEM_ALREADY_EXISTS",
    ItemNotFound = -7 => "SAI_STATUS_ITEM_NOT_FOUND",
    BufferOverflow = -8 => "SAI_STATUS_BUFFER_OVERFLOW",
    InvalidPortNumber = -9 => "SAI_STATUS_INVALID_PORT_NUMBER",
    InvalidPortMember = -10 => "SAI_STATUS_INVALID_PORT_MEMBER",
    InvalidVlanId = -11 => "SAI_STATUS_INVALID_VLAN_ID",
    Uninitialized = -12 => "SAI_STATUS_UNINITIALIZED",
    TableFull = -13 => "SAI_STATUS_TABLE_FULL",
    MandatoryAttributeMissing = -14 => "SAI_STATUS_MANDATORY_ATTRIBUTE_MISSING",
    NotImplemented = -15 => "SAI_STATUS_NOT_IMPLEMENTED",
    AddrNotFound = -16 => "SAI_STATUS_ADDR_NOT_FOUND",
    ObjectInUse = -17 => "SAI_STATUS_OBJECT_IN_USE",
    InvalidObjectType = -18 => "SAI_STATUS_INVALID_OBJECT_TYPE",
    InvalidObjectId = -19 => "SAI_STATUS_INVALID_OBJECT_ID",
    InvalidNifId = -20 => "SAI_STATUS_INVALID_NIF_ID",
    NifTableFull = -21 => "SAI_STATUS_NIF_TABLE_FULL",
    HwTableFull = -22 => "SAI_STATUS_HW_TABLE_FULL",
    NotExecuted = -23 => "SAI_STATUS_NOT_EXECUTED",
    InvalidAttribute = -24 => "SAI_STATUS_INVALID_ATTRIBUTE",
}

impl SaiStatus {
    /// Maps a raw code; unknown codes collapse to `Failure`.
    pub fn from_raw(code: i32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|s| *s as i32 == code)
            .unwrap_or(SaiStatus::Failure)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SaiStatus::Success)
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn into_result(self) -> SaiResult<()> {
        match self {
            SaiStatus::Success => Ok(()),
            status => Err(SaiError::from_status(status)),
        }
    }
}

impl fmt::Display for SaiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SaiStatus {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.name() == s)
            .ok_or_else(|| SaiError::invalid_parameter(format!("unknown status {}", s)))
    }
}

/// A failed SAI call: the status it reports plus what it was about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaiError {
    /// Malformed or contradictory input caught before any mutation.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The referenced object or entry does not exist.
    #[error("{item} not found")]
    NotFound { item: String },

    /// An entry with the same structural key already exists.
    #[error("{item} already exists")]
    AlreadyExists { item: String },

    /// A caller-provided list was too small; required sizes were written back.
    #[error("buffer overflow: {message}")]
    BufferOverflow { message: String },

    /// The id does not encode the object type it was used as.
    #[error("invalid object id: {message}")]
    InvalidObjectId { message: String },

    /// The feature area is intentionally not modelled.
    #[error("not implemented: {feature}")]
    NotImplemented { feature: String },

    /// The API was used before `initialize`.
    #[error("backend not initialized")]
    Uninitialized,

    /// A bulk element was skipped after an earlier failure.
    #[error("not executed")]
    NotExecuted,

    /// Generic internal failure, including resource exhaustion.
    #[error("failure: {message}")]
    Failure { message: String },

    /// Any other status reported by a remote peer.
    #[error("call returned {status}")]
    Status { status: SaiStatus },
}

impl SaiError {
    pub fn from_status(status: SaiStatus) -> Self {
        Self::with_context(status, "unknown")
    }

    /// Creates an error from a status, attaching a context string.
    pub fn with_context(status: SaiStatus, context: impl Into<String>) -> Self {
        let context = context.into();
        match status {
            SaiStatus::Success => SaiError::Failure {
                message: format!("success status used as error ({})", context),
            },
            SaiStatus::InvalidParameter => SaiError::InvalidParameter { message: context },
            SaiStatus::ItemNotFound => SaiError::NotFound { item: context },
            SaiStatus::ItemAlreadyExists => SaiError::AlreadyExists { item: context },
            SaiStatus::BufferOverflow => SaiError::BufferOverflow { message: context },
            SaiStatus::InvalidObjectId => SaiError::InvalidObjectId { message: context },
            SaiStatus::NotImplemented => SaiError::NotImplemented { feature: context },
            SaiStatus::Uninitialized => SaiError::Uninitialized,
            SaiStatus::NotExecuted => SaiError::NotExecuted,
            SaiStatus::Failure => SaiError::Failure { message: context },
            _ => SaiError::Status { status },
        }
    }

    /// Returns the status code this error is reported as.
    pub fn status(&self) -> SaiStatus {
        match self {
            SaiError::InvalidParameter { .. } => SaiStatus::InvalidParameter,
            SaiError::NotFound { .. } => SaiStatus::ItemNotFound,
            SaiError::AlreadyExists { .. } => SaiStatus::ItemAlreadyExists,
            SaiError::BufferOverflow { .. } => SaiStatus::BufferOverflow,
            SaiError::InvalidObjectId { .. } => SaiStatus::InvalidObjectId,
            SaiError::NotImplemented { .. } => SaiStatus::NotImplemented,
            SaiError::Uninitialized => SaiStatus::Uninitialized,
            SaiError::NotExecuted => SaiStatus::NotExecuted,
            SaiError::Failure { .. } => SaiStatus::Failure,
            SaiError::Status { status } => *status,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SaiError::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        SaiError::NotFound { item: item.into() }
    }

    pub fn already_exists(item: impl Into<String>) -> Self {
        SaiError::AlreadyExists { item: item.into() }
    }

    pub fn buffer_overflow(message: impl Into<String>) -> Self {
        SaiError::BufferOverflow {
            message: message.into(),
        }
    }

    pub fn invalid_object_id(message: impl Into<String>) -> Self {
        SaiError::InvalidObjectId {
            message: message.into(),
        }
    }

    pub fn not_implemented(feature: impl Into<String>) -> Self {
        SaiError::NotImplemented {
            feature: feature.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        SaiError::Failure {
            message: message.into(),
        }
    }
}

pub type SaiResult<T> = Result<T, SaiError>;

/// Collapses a result into the status code a C caller would have seen.
pub fn status_of<T>(result: &SaiResult<T>) -> SaiStatus {
    match result {
        Ok(_) => SaiStatus::Success,
        Err(e) => e.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes() {
        assert_eq!(SaiStatus::from_raw(-8), SaiStatus::BufferOverflow);
        assert_eq!(SaiStatus::from_raw(-24), SaiStatus::InvalidAttribute);
        assert_eq!(SaiStatus::from_raw(42), SaiStatus::Failure);
        assert_eq!(SaiStatus::NotExecuted as i32, -23);
        assert!(SaiStatus::Success.into_result().is_ok());
        assert!(SaiStatus::TableFull.is_error());
    }

    #[test]
    fn test_status_name_parses_back() {
        let parsed: SaiStatus = "SAI_STATUS_BUFFER_OVERFLOW".parse().unwrap();
        assert_eq!(parsed, SaiStatus::BufferOverflow);
        assert!("SAI_STATUS_BOGUS".parse::<SaiStatus>().is_err());
    }

    #[test]
    fn test_context_maps_to_variant() {
        let err = SaiError::with_context(SaiStatus::ItemNotFound, "oid:0x1");
        assert_eq!(err, SaiError::not_found("oid:0x1"));
        assert_eq!(err.to_string(), "oid:0x1 not found");

        let err = SaiError::from_status(SaiStatus::TableFull);
        assert_eq!(err, SaiError::Status { status: SaiStatus::TableFull });
        assert_eq!(err.status(), SaiStatus::TableFull);
    }

    #[test]
    fn test_status_of() {
        let ok: SaiResult<u32> = Ok(1);
        let err: SaiResult<u32> = Err(SaiError::Uninitialized);
        assert_eq!(status_of(&ok), SaiStatus::Success);
        assert_eq!(status_of(&err), SaiStatus::Uninitialized);
    }
}
