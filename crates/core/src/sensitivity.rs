//! Sensitivity (DPI) command encoding.
//!
//! Payload layout (opcode 0x09):
//!   - byte 2: 0x40 - 1 + current active profile
//!   - byte 3: sensitivity code (high nibble) | target profile + 7 (low nibble)
//!   - byte 4: active profile mask

use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::profile::ProfileRegistry;
use crate::safety;
use crate::tables::{opcodes, supported_sensitivities, SENSITIVITY_TABLE};
use tracing::debug;

/// Map a requested sensitivity onto a supported step.
///
/// Values outside 200..=4800 are rejected. Inside the range, the step with
/// the smallest absolute distance wins; on a tie the lower step wins.
pub fn resolve_sensitivity(requested: u32) -> Result<u16> {
    let value = safety::validate_sensitivity(requested)?;
    let resolved = supported_sensitivities()
        .min_by_key(|&step| step.abs_diff(value))
        .unwrap_or(value);
    if resolved != value {
        debug!(requested = value, resolved, "Sensitivity resolved to nearest step");
    }
    Ok(resolved)
}

/// Firmware code for a supported sensitivity step.
pub fn sensitivity_code(step: u16) -> Result<u8> {
    SENSITIVITY_TABLE
        .iter()
        .find(|&&(value, _)| value == step)
        .map(|&(_, code)| code)
        .ok_or_else(|| Error::unsupported("sensitivity", step, "a supported step"))
}

/// Encode a sensitivity change for `target_profile`.
pub fn encode_sensitivity(
    requested: u32,
    target_profile: u8,
    registry: &ProfileRegistry,
) -> Result<Payload> {
    let target = safety::validate_profile(target_profile)?;
    let step = resolve_sensitivity(requested)?;
    let code = sensitivity_code(step)?;

    let selector = opcodes::ACTIVE_PROFILE_BASE - 1 + registry.active_profile();
    let packed = (code << 4) | (target + opcodes::TARGET_PROFILE_OFFSET);

    let payload = Payload::new(
        opcodes::SENSITIVITY,
        &[selector, packed, registry.active_profile_mask()],
    );
    debug!(step, code, target, payload = %payload, "Encoded sensitivity");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_steps_resolve_to_themselves() {
        for step in supported_sensitivities() {
            assert_eq!(resolve_sensitivity(step as u32).unwrap(), step);
        }
    }

    #[test]
    fn every_in_range_value_resolves_to_a_step() {
        let steps: Vec<u16> = supported_sensitivities().collect();
        let mut previous = 0;
        for v in 200..=4800u32 {
            let r = resolve_sensitivity(v).unwrap();
            assert!(steps.contains(&r));
            assert_eq!(resolve_sensitivity(r as u32).unwrap(), r);
            assert!(r >= previous, "resolution must be monotonic");
            previous = r;
        }
    }

    #[test]
    fn nearest_step_and_tie_break() {
        assert_eq!(resolve_sensitivity(1290).unwrap(), 1200);
        assert_eq!(resolve_sensitivity(1500).unwrap(), 1600);
        // 1400 is equidistant from 1200 and 1600
        assert_eq!(resolve_sensitivity(1400).unwrap(), 1200);
        assert_eq!(resolve_sensitivity(2800).unwrap(), 2400);
        assert_eq!(resolve_sensitivity(4500).unwrap(), 4800);
    }

    #[test]
    fn below_domain_is_rejected_not_clamped() {
        let err = resolve_sensitivity(50).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue { field: "sensitivity", .. }));
        assert!(resolve_sensitivity(5000).is_err());
    }

    #[test]
    fn reserved_codes_never_produced() {
        let reg = ProfileRegistry::new();
        for v in 200..=4800u32 {
            let payload = encode_sensitivity(v, 1, &reg).unwrap();
            let code = payload.as_bytes()[3] >> 4;
            assert!(![0, 8, 10, 12].contains(&code), "value {v} produced code {code}");
        }
    }

    #[test]
    fn encode_default_2000_on_profile_one() {
        let reg = ProfileRegistry::new();
        let payload = encode_sensitivity(2000, 1, &reg).unwrap();
        assert_eq!(
            payload.as_bytes(),
            &[0x07, 0x09, 0x40, 0x98, 0x3F, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn encode_uses_active_profile_and_mask() {
        let mut reg = ProfileRegistry::new();
        reg.set_active_profile(3).unwrap();
        reg.disable_profile(2).unwrap();
        let payload = encode_sensitivity(800, 6, &reg).unwrap();
        assert_eq!(
            payload.as_bytes(),
            &[0x07, 0x09, 0x42, 0x4D, 0x3D, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn linear_codes_below_1200() {
        for (step, code) in [(200, 1), (600, 3), (1200, 6)] {
            assert_eq!(sensitivity_code(step).unwrap(), code);
        }
        assert_eq!(sensitivity_code(4000).unwrap(), 0xE);
        assert!(sensitivity_code(1400).is_err());
    }

    #[test]
    fn encode_rejects_invalid_profile() {
        let reg = ProfileRegistry::new();
        assert!(encode_sensitivity(800, 0, &reg).is_err());
        assert!(encode_sensitivity(800, 7, &reg).is_err());
    }
}
