//! In-memory profile and cyclic-color state for one invocation.
//!
//! The registry is owned by the caller and passed explicitly to the
//! encoders; nothing here is persisted or shared between sessions.

use crate::error::Result;
use crate::safety;
use crate::tables::{ColorName, PROFILE_COUNT};

/// Enabled flags for the six profiles and the seven cyclic colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: [bool; PROFILE_COUNT],
    active_profile: u8,
    /// Indexed by [`ColorName::cyclic_bit`].
    cyclic_colors: [bool; 7],
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self {
            profiles: [true; PROFILE_COUNT],
            active_profile: 1,
            cyclic_colors: [true; 7],
        }
    }
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_profile(&mut self, profile: u8) -> Result<()> {
        let p = safety::validate_profile(profile)?;
        self.profiles[p as usize - 1] = true;
        Ok(())
    }

    pub fn disable_profile(&mut self, profile: u8) -> Result<()> {
        let p = safety::validate_profile(profile)?;
        self.profiles[p as usize - 1] = false;
        Ok(())
    }

    pub fn is_profile_enabled(&self, profile: u8) -> bool {
        safety::validate_profile(profile)
            .map(|p| self.profiles[p as usize - 1])
            .unwrap_or(false)
    }

    /// Profile the mouse is currently using (1-based).
    pub fn active_profile(&self) -> u8 {
        self.active_profile
    }

    pub fn set_active_profile(&mut self, profile: u8) -> Result<()> {
        self.active_profile = safety::validate_profile(profile)?;
        Ok(())
    }

    /// Include or exclude a color from cyclic lighting.
    pub fn set_cyclic_color(&mut self, color: ColorName, enabled: bool) {
        self.cyclic_colors[color.cyclic_bit()] = enabled;
    }

    /// Bit `i` set iff profile `i + 1` is enabled.
    pub fn active_profile_mask(&self) -> u8 {
        bitmask(&self.profiles)
    }

    /// Bit `i` set iff `ColorName::CYCLIC_ORDER[i]` takes part in cycling.
    pub fn cyclic_color_mask(&self) -> u8 {
        bitmask(&self.cyclic_colors)
    }
}

fn bitmask(flags: &[bool]) -> u8 {
    flags
        .iter()
        .enumerate()
        .filter(|(_, enabled)| **enabled)
        .fold(0u8, |mask, (bit, _)| mask | (1 << bit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let reg = ProfileRegistry::new();
        assert_eq!(reg.active_profile_mask(), 0x3F);
        assert_eq!(reg.cyclic_color_mask(), 0x7F);
        assert_eq!(reg.active_profile(), 1);
    }

    #[test]
    fn profiles_one_and_three_give_mask_five() {
        let mut reg = ProfileRegistry::new();
        for p in [2, 4, 5, 6] {
            reg.disable_profile(p).unwrap();
        }
        assert_eq!(reg.active_profile_mask(), 5);
        assert!(reg.is_profile_enabled(1));
        assert!(!reg.is_profile_enabled(2));
    }

    #[test]
    fn enable_restores_bit() {
        let mut reg = ProfileRegistry::new();
        reg.disable_profile(6).unwrap();
        assert_eq!(reg.active_profile_mask(), 0x1F);
        reg.enable_profile(6).unwrap();
        assert_eq!(reg.active_profile_mask(), 0x3F);
    }

    #[test]
    fn invalid_profile_index_rejected() {
        let mut reg = ProfileRegistry::new();
        assert!(reg.disable_profile(0).is_err());
        assert!(reg.enable_profile(7).is_err());
        assert!(reg.set_active_profile(9).is_err());
        assert!(!reg.is_profile_enabled(7));
        assert_eq!(reg.active_profile_mask(), 0x3F);
    }

    #[test]
    fn cyclic_mask_follows_firmware_order() {
        let mut reg = ProfileRegistry::new();
        for color in ColorName::ALL {
            reg.set_cyclic_color(color, false);
        }
        assert_eq!(reg.cyclic_color_mask(), 0);

        reg.set_cyclic_color(ColorName::Yellow, true);
        reg.set_cyclic_color(ColorName::Red, true);
        assert_eq!(reg.cyclic_color_mask(), 0b0001_0001);
    }
}
