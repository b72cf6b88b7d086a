//! Item-state status codes
//!
//! The status is a closed set. The integer codes are part of the persisted
//! format and MUST NOT change:
//!
//! | Code | Status             | Meaning                                              |
//! |------|--------------------|------------------------------------------------------|
//! | 0    | `Undefined`        | initial / terminal, after discard or dispose         |
//! | 1    | `Existing`         | persistent state                                     |
//! | 2    | `ExistingModified` | persistent state transiently modified (copy-on-write)|
//! | 3    | `ExistingRemoved`  | persistent state transiently removed (copy-on-write) |
//! | 4    | `New`              | brand-new, not yet persisted                         |
//! | 5    | `StaleModified`    | overlaid state was modified by another session       |
//! | 6    | `StaleDestroyed`   | overlaid state was destroyed by another session      |
//!
//! No transition graph is enforced: any member may follow any other.

use crate::error::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an item state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum Status {
    /// Initial and terminal status; never accepted by a constructor
    #[default]
    Undefined = 0,
    /// Persistent, unmodified state
    Existing = 1,
    /// Persistent state that has been transiently modified
    ExistingModified = 2,
    /// Persistent state that has been transiently removed
    ExistingRemoved = 3,
    /// New state with no persistent counterpart
    New = 4,
    /// Overlaid persistent state was modified by somebody else
    StaleModified = 5,
    /// Overlaid persistent state was destroyed by somebody else
    StaleDestroyed = 6,
}

impl Status {
    /// Every member of the closed set, in code order
    pub const ALL: [Status; 7] = [
        Status::Undefined,
        Status::Existing,
        Status::ExistingModified,
        Status::ExistingRemoved,
        Status::New,
        Status::StaleModified,
        Status::StaleDestroyed,
    ];

    /// Persisted integer code
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Resolve an integer code
    ///
    /// # Errors
    /// Returns `UnknownStatusCode` for codes outside the closed set.
    pub fn from_code(code: i32) -> StateResult<Self> {
        Status::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .ok_or(StateError::UnknownStatusCode(code))
    }

    /// Accepted by fresh construction
    pub const fn is_fresh(self) -> bool {
        matches!(self, Status::Existing | Status::New)
    }

    /// Accepted by overlay (copy-on-write) construction
    pub const fn is_copy_on_write(self) -> bool {
        matches!(self, Status::ExistingModified | Status::ExistingRemoved)
    }

    /// Anything other than `Existing`
    pub const fn is_transient(self) -> bool {
        !matches!(self, Status::Existing)
    }

    /// Overlaid state changed underneath this one
    pub const fn is_stale(self) -> bool {
        matches!(self, Status::StaleModified | Status::StaleDestroyed)
    }

    /// Upper-case name, as used in logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Undefined => "UNDEFINED",
            Status::Existing => "EXISTING",
            Status::ExistingModified => "EXISTING_MODIFIED",
            Status::ExistingRemoved => "EXISTING_REMOVED",
            Status::New => "NEW",
            Status::StaleModified => "STALE_MODIFIED",
            Status::StaleDestroyed => "STALE_DESTROYED",
        }
    }
}

impl TryFrom<i32> for Status {
    type Error = StateError;

    fn try_from(code: i32) -> StateResult<Self> {
        Status::from_code(code)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> i32 {
        status.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
