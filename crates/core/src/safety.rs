//! Safety layer: validates every request parameter against what the X9
//! firmware accepts before a payload is built.
//!
//! # X9 Bounds
//!
//! ## Sensitivity
//! - **Range**: 200 – 4,800 DPI
//! - **Steps**: 12 discrete values, see [`crate::tables::SENSITIVITY_TABLE`]
//! - Values between steps are resolved to the nearest step; values outside
//!   the range are rejected, never clamped.
//!
//! ## Profiles
//! - **Range**: 1–6
//!
//! ## Lighting duration
//! - **Range**: 1–6. Keeps the fixed/cyclic sub-opcodes inside 0x80..=0x95.
//!
//! ## Safety Invariants
//! 1. No raw sensitivity is ever sent; only table codes
//! 2. Only the named colors are accepted from the command line
//! 3. All validation happens BEFORE the transfer, no partial payload is emitted

use crate::error::{Error, Result};
use crate::tables::{PROFILE_COUNT, SENSITIVITY_MAX, SENSITIVITY_MIN};

/// Write-risk disclaimer, shown in CLI help.
pub const WRITE_DISCLAIMER: &str = "\
WARNING: This tool detaches the mouse from its kernel driver and writes raw \
control transfers to it. All values are checked against the firmware's \
supported ranges, but the protocol is undocumented. Use at your own risk.";

/// Lowest accepted lighting duration code.
pub const DURATION_MIN: u8 = 1;
/// Highest accepted lighting duration code.
pub const DURATION_MAX: u8 = 6;

/// Reject sensitivities outside the firmware's domain.
pub fn validate_sensitivity(value: u32) -> Result<u16> {
    if !(SENSITIVITY_MIN as u32..=SENSITIVITY_MAX as u32).contains(&value) {
        return Err(Error::unsupported(
            "sensitivity",
            value,
            format!("{SENSITIVITY_MIN}..={SENSITIVITY_MAX}"),
        ));
    }
    Ok(value as u16)
}

/// Validate a 1-based profile number.
pub fn validate_profile(profile: u8) -> Result<u8> {
    if profile == 0 || profile as usize > PROFILE_COUNT {
        return Err(Error::unsupported(
            "profile",
            profile,
            format!("1..={PROFILE_COUNT}"),
        ));
    }
    Ok(profile)
}

/// Validate a lighting duration code.
pub fn validate_duration(duration: u8) -> Result<u8> {
    if !(DURATION_MIN..=DURATION_MAX).contains(&duration) {
        return Err(Error::unsupported(
            "duration",
            duration,
            format!("{DURATION_MIN}..={DURATION_MAX}"),
        ));
    }
    Ok(duration)
}
