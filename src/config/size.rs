//! Bounding-box size parsed from `WIDTHxHEIGHT` strings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BatchResizeError, Result};

/// Separator between the width and height components
pub const SIZE_SEPARATOR: char = 'x';

/// Maximum width and height an output image may occupy.
///
/// Both dimensions are positive. Serialized as the same `WxH` string the
/// command line accepts, so config files read `size = "500x500"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Create a size, rejecting zero dimensions
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BatchResizeError::malformed_size(
                format!("{width}{SIZE_SEPARATOR}{height}"),
                "width and height must be greater than 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    /// Whether an image of the given dimensions already fits
    pub fn contains(self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
        }
    }
}

impl FromStr for Size {
    type Err = BatchResizeError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(SIZE_SEPARATOR).collect();
        let [width, height] = parts.as_slice() else {
            return Err(BatchResizeError::malformed_size(
                s,
                format!("expected exactly one '{SIZE_SEPARATOR}' separator"),
            ));
        };

        let width = width
            .parse::<u32>()
            .map_err(|e| BatchResizeError::malformed_size(s, format!("invalid width: {e}")))?;
        let height = height
            .parse::<u32>()
            .map_err(|e| BatchResizeError::malformed_size(s, format!("invalid height: {e}")))?;

        Self::new(width, height).map_err(|_| {
            BatchResizeError::malformed_size(s, "width and height must be greater than 0")
        })
    }
}

impl TryFrom<String> for Size {
    type Error = BatchResizeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Size> for String {
    fn from(size: Size) -> Self {
        size.to_string()
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SIZE_SEPARATOR}{}", self.width, self.height)
    }
}
