//! Turns requested configuration changes into transfers and reports the
//! outcome of each one.
//!
//! Each change is validated and encoded before any of its payloads are
//! sent. A rejected change does not stop the others; a transport failure
//! faults the session, so the remaining changes are skipped.

use crate::device::DeviceIdentity;
use crate::error::{Error, Result};
use crate::lighting::{self, LightingMode};
use crate::payload::Payload;
use crate::profile::ProfileRegistry;
use crate::sensitivity;
use crate::session::{ClaimGuard, DeviceSession};
use crate::tables::ColorName;
use crate::transport::{DeviceLocator, UsbInterface};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// One user-requested change, as received from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigChange {
    /// Sensitivity for one profile; resolved to the nearest step.
    Sensitivity { value: u32, profile: u8 },
    /// LED color token: a color name or "off".
    Color { token: String, profile: u8 },
    /// Explicit lighting mode.
    Lighting { mode: String, duration: u8 },
}

impl ConfigChange {
    pub fn describe(&self) -> String {
        match self {
            Self::Sensitivity { value, profile } => {
                format!("sensitivity {value} (profile {profile})")
            }
            Self::Color { token, profile } => format!("color {token} (profile {profile})"),
            Self::Lighting { mode, duration } => {
                format!("lighting mode {mode} (duration {duration})")
            }
        }
    }
}

/// A validated change ready to transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub payloads: Vec<Payload>,
    /// Message reported once every payload is sent.
    pub summary: String,
}

/// Validate `change` and encode its payloads.
pub fn plan_change(change: &ConfigChange, registry: &ProfileRegistry) -> Result<PlannedChange> {
    match change {
        ConfigChange::Sensitivity { value, profile } => {
            let step = sensitivity::resolve_sensitivity(*value)?;
            let payload = sensitivity::encode_sensitivity(*value, *profile, registry)?;
            let summary = if step as u32 == *value {
                format!("DPI set to: {step}")
            } else {
                format!("DPI set to: {step} (nearest supported to {value})")
            };
            Ok(PlannedChange {
                payloads: vec![payload],
                summary,
            })
        }
        ConfigChange::Color { token, profile } => {
            if token.trim().eq_ignore_ascii_case("off") {
                let payload = lighting::encode_lighting_mode(
                    LightingMode::Off,
                    registry.cyclic_color_mask(),
                    lighting::DEFAULT_DURATION,
                )?;
                return Ok(PlannedChange {
                    payloads: vec![payload],
                    summary: "LED turned off".to_string(),
                });
            }
            let color = ColorName::from_name(token)
                .ok_or_else(|| Error::unsupported("color", token, supported_color_tokens()))?;
            let color_payload = lighting::encode_color_profile(
                *profile,
                color.rgb(),
                registry.active_profile_mask(),
            )?;
            let mode_payload = lighting::encode_lighting_mode(
                LightingMode::Static,
                registry.cyclic_color_mask(),
                lighting::DEFAULT_DURATION,
            )?;
            Ok(PlannedChange {
                payloads: vec![color_payload, mode_payload],
                summary: format!("LED color set to: {color}"),
            })
        }
        ConfigChange::Lighting { mode, duration } => {
            let mode = LightingMode::from_name(mode)?;
            let payload =
                lighting::encode_lighting_mode(mode, registry.cyclic_color_mask(), *duration)?;
            Ok(PlannedChange {
                payloads: vec![payload],
                summary: format!("LED mode set to: {mode}"),
            })
        }
    }
}

/// Comma-separated list of accepted color tokens.
pub fn supported_color_tokens() -> String {
    ColorName::ALL
        .iter()
        .map(|c| c.name())
        .chain(std::iter::once("off"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Applied,
    /// Failed validation; nothing was sent.
    Rejected,
    /// A transfer failed.
    Failed,
    /// Not attempted because the session faulted earlier.
    Skipped,
}

/// Outcome of one change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeOutcome {
    pub change: ConfigChange,
    pub status: ChangeStatus,
    pub message: String,
}

impl ChangeOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == ChangeStatus::Applied
    }
}

/// Plan and transfer each change in order.
pub fn apply_changes<T: UsbInterface>(
    guard: &mut ClaimGuard<'_, T>,
    registry: &ProfileRegistry,
    changes: &[ConfigChange],
) -> Vec<ChangeOutcome> {
    changes
        .iter()
        .map(|change| {
            let (status, message) = apply_one(guard, registry, change);
            ChangeOutcome {
                change: change.clone(),
                status,
                message,
            }
        })
        .collect()
}

fn apply_one<T: UsbInterface>(
    guard: &mut ClaimGuard<'_, T>,
    registry: &ProfileRegistry,
    change: &ConfigChange,
) -> (ChangeStatus, String) {
    if guard.is_faulted() {
        return (
            ChangeStatus::Skipped,
            "skipped after an earlier transfer failure".to_string(),
        );
    }
    let plan = match plan_change(change, registry) {
        Ok(plan) => plan,
        Err(e) => {
            debug!(change = %change.describe(), error = %e, "Change rejected");
            return (ChangeStatus::Rejected, e.to_string());
        }
    };
    for payload in &plan.payloads {
        if let Err(e) = guard.transfer(payload) {
            warn!(change = %change.describe(), error = %e, "Change failed");
            return (ChangeStatus::Failed, e.to_string());
        }
    }
    (ChangeStatus::Applied, plan.summary)
}

/// Result of a whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub outcomes: Vec<ChangeOutcome>,
    /// Set when the device could not be fully returned to the kernel.
    pub release_warning: Option<String>,
}

impl SessionReport {
    pub fn all_applied(&self) -> bool {
        self.outcomes.iter().all(ChangeOutcome::succeeded)
    }
}

/// Run one complete session: discover, check, claim, apply, release.
///
/// Setup failures abort before any transfer. Release always runs once the
/// interface is claimed.
pub fn run_session<L: DeviceLocator>(
    locator: &L,
    identity: &DeviceIdentity,
    registry: &ProfileRegistry,
    changes: &[ConfigChange],
    timeout: Duration,
) -> Result<SessionReport> {
    let mut session = DeviceSession::discover(locator, identity)?.with_timeout(timeout);
    session.check_ready()?;
    let mut guard = session.claim()?;

    let outcomes = apply_changes(&mut guard, registry, changes);
    let release_warning = guard.release().err().map(|e| e.to_string());

    Ok(SessionReport {
        outcomes,
        release_warning,
    })
}
