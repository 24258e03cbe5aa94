//! LED color and lighting-mode command encoding.
//!
//! Color profile (opcode 0x14):
//!   - byte 2: (profile - 1) * 2 (high nibble) | green intensity (low nibble)
//!   - byte 3: red intensity (high nibble) | blue intensity (low nibble)
//!   - byte 4: active profile mask
//!
//! Intensities are inverted and coarsened to 4 bits: 0 is full, 15 is off.
//!
//! Lighting mode (opcode 0x13):
//!   - byte 2: cyclic color mask
//!   - byte 3: mode sub-opcode

use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::safety;
use crate::tables::{opcodes, Rgb};
use tracing::debug;

/// Default duration code used by the fixed and cyclic modes.
pub const DEFAULT_DURATION: u8 = 1;

/// LED behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightingMode {
    /// Breathing on the profile color.
    Fixed,
    /// Rotate through the enabled cyclic colors.
    Cyclic,
    /// Solid profile color.
    Static,
    Off,
}

impl LightingMode {
    pub const ALL: [LightingMode; 4] = [
        LightingMode::Fixed,
        LightingMode::Cyclic,
        LightingMode::Static,
        LightingMode::Off,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Cyclic => "cyclic",
            Self::Static => "static",
            Self::Off => "off",
        }
    }

    /// Parse a mode tag (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| Error::unsupported("lighting mode", name, "fixed, cyclic, static, off"))
    }

    /// Sub-opcode byte for this mode.
    pub fn sub_opcode(&self, duration: u8) -> u8 {
        match self {
            Self::Fixed => opcodes::MODE_FIXED_BASE.saturating_sub(duration),
            Self::Cyclic => opcodes::MODE_CYCLIC_BASE.saturating_sub(duration),
            Self::Static => opcodes::MODE_STATIC,
            Self::Off => opcodes::MODE_OFF,
        }
    }
}

impl std::fmt::Display for LightingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compress a channel to the firmware's inverted 4-bit intensity.
pub fn channel_intensity(channel: u8) -> u8 {
    (255 - channel) / 16
}

/// Encode the LED color for one profile.
pub fn encode_color_profile(profile: u8, rgb: Rgb, active_profile_mask: u8) -> Result<Payload> {
    let profile = safety::validate_profile(profile)?;
    let slot = (profile - 1) * 2;
    let red = channel_intensity(rgb.red);
    let green = channel_intensity(rgb.green);
    let blue = channel_intensity(rgb.blue);

    let payload = Payload::new(
        opcodes::COLOR_PROFILE,
        &[(slot << 4) | green, (red << 4) | blue, active_profile_mask],
    );
    debug!(profile, ?rgb, payload = %payload, "Encoded color profile");
    Ok(payload)
}

/// Encode a lighting mode change.
///
/// `duration` only affects the fixed and cyclic modes but is validated for
/// every mode.
pub fn encode_lighting_mode(
    mode: LightingMode,
    cyclic_color_mask: u8,
    duration: u8,
) -> Result<Payload> {
    let duration = safety::validate_duration(duration)?;
    let payload = Payload::new(
        opcodes::LIGHTING_MODE,
        &[cyclic_color_mask, mode.sub_opcode(duration)],
    );
    debug!(%mode, duration, payload = %payload, "Encoded lighting mode");
    Ok(payload)
}
