//! Terminal stream status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status code reported when a stream was handled successfully.
pub const STATUS_OK: i32 = 200;

/// Generic error code reported when a handler fails.
pub const STATUS_ERROR: i32 = 500;

/// Status carried by the terminal frame of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatus {
    pub code: i32,
    pub message: String,
}

impl StreamStatus {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The fixed success status.
    pub fn ok() -> Self {
        Self::new(STATUS_OK, "OK")
    }

    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OK
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={}, message={}", self.code, self.message)
    }
}
