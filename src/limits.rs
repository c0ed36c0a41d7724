use crate::arith;
use crate::error::ConvertError;

/// Default ceiling on `width * height`.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// Default ceiling on input file size (256 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 268_435_456;

/// Resource limits for decode operations.
///
/// Set once before converting and passed by reference; nothing mutates it
/// afterwards. `None` means unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum input file size in bytes, checked before any decode begins.
    pub max_bytes: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pixels: Some(DEFAULT_MAX_PIXELS),
            max_bytes: Some(DEFAULT_MAX_BYTES),
        }
    }
}

impl Limits {
    /// No ceilings at all. Overflow checks still apply.
    pub const fn none() -> Self {
        Self {
            max_pixels: None,
            max_bytes: None,
        }
    }

    /// Set the pixel ceiling. `0` disables the check.
    pub const fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = if max_pixels == 0 {
            None
        } else {
            Some(max_pixels)
        };
        self
    }

    /// Set the input size ceiling. `0` disables the check.
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = if max_bytes == 0 {
            None
        } else {
            Some(max_bytes)
        };
        self
    }

    /// Compute `width * height` with overflow checking and compare it
    /// against `max_pixels`. Returns the pixel count on success.
    pub fn check_pixel_budget(&self, width: u32, height: u32) -> Result<usize, ConvertError> {
        let pixels = arith::pixel_count(width, height)?;
        if let Some(max_px) = self.max_pixels {
            if pixels as u64 > max_px {
                return Err(ConvertError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} ({width}x{height}) exceeds limit {max_px}"
                )));
            }
        }
        Ok(pixels)
    }

    /// Check an input size against `max_bytes`.
    pub fn check_input_size(&self, bytes: u64) -> Result<(), ConvertError> {
        if let Some(max_bytes) = self.max_bytes {
            if bytes > max_bytes {
                return Err(ConvertError::LimitExceeded(alloc::format!(
                    "input size {bytes} bytes exceeds limit {max_bytes}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_ceilings() {
        let limits = Limits::default();
        assert_eq!(limits.max_pixels, Some(100_000_000));
        assert_eq!(limits.max_bytes, Some(268_435_456));
    }

    #[test]
    fn zero_disables_checks() {
        let limits = Limits::default().with_max_pixels(0).with_max_bytes(0);
        assert_eq!(limits, Limits::none());
        assert!(limits.check_pixel_budget(100_000, 100_000).is_ok());
        assert!(limits.check_input_size(u64::MAX).is_ok());
    }

    #[test]
    fn pixel_budget_is_inclusive() {
        let limits = Limits::none().with_max_pixels(100);
        assert_eq!(limits.check_pixel_budget(10, 10).unwrap(), 100);
        let err = limits.check_pixel_budget(20, 20).unwrap_err();
        assert!(err.is_limit_exceeded());
        assert!(limits.check_pixel_budget(101, 1).is_err());
    }

    #[test]
    fn input_size_is_inclusive() {
        let limits = Limits::none().with_max_bytes(1024);
        assert!(limits.check_input_size(1024).is_ok());
        assert!(limits.check_input_size(1025).unwrap_err().is_limit_exceeded());
    }
}
