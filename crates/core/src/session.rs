//! Exclusive-access session around the mouse's HID interface.
//!
//! State machine:
//!
//! ```text
//! Unattached -> Discovered -> Ready -> Claimed -> Released
//!                  \------------\--------\-------> Faulted -> Released
//! ```
//!
//! The kernel driver is detached only while a [`ClaimGuard`] is alive.
//! Dropping the guard (or the session) releases the interface and
//! reattaches the driver if this session detached it.

use crate::device::DeviceIdentity;
use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::transport::{DeviceLocator, UsbInterface, SET_REPORT};
use crate::INTERFACE_INDEX;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Default timeout for one control transfer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unattached,
    Discovered,
    Ready,
    Claimed,
    Released,
    Faulted,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unattached => "unattached",
            Self::Discovered => "discovered",
            Self::Ready => "ready",
            Self::Claimed => "claimed",
            Self::Released => "released",
            Self::Faulted => "faulted",
        }
    }
}

/// An opened mouse and its claim bookkeeping.
pub struct DeviceSession<T: UsbInterface> {
    interface: T,
    state: SessionState,
    /// Kernel driver owned the interface when checked.
    kernel_owned: bool,
    /// This session detached the kernel driver and must reattach it.
    detached: bool,
    claimed: bool,
    timeout: Duration,
}

impl<T: UsbInterface> DeviceSession<T> {
    /// Locate and open the device matching `identity`.
    pub fn discover<L>(locator: &L, identity: &DeviceIdentity) -> Result<Self>
    where
        L: DeviceLocator<Interface = T>,
    {
        debug!(%identity, "Trying to find device");
        let interface = locator
            .locate(identity)?
            .ok_or_else(|| Error::DeviceNotFound(format!("{identity}. Try replugging")))?;
        info!(%identity, "Device found");
        Ok(Self {
            interface,
            state: SessionState::Discovered,
            kernel_owned: false,
            detached: false,
            claimed: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the kernel driver owned the interface at the last check.
    pub fn kernel_owned(&self) -> bool {
        self.kernel_owned
    }

    /// Query the driver state of the interface.
    pub fn check_ready(&mut self) -> Result<()> {
        self.expect_state("check_ready", &[SessionState::Discovered, SessionState::Ready])?;
        match self.interface.kernel_driver_active(INTERFACE_INDEX) {
            Ok(active) => {
                self.kernel_owned = active;
                self.state = SessionState::Ready;
                info!(kernel_owned = active, "Device is ready to be configured");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Faulted;
                Err(match e {
                    Error::PermissionDenied(_) | Error::DeviceNotFound(_) => e,
                    other => Error::DeviceNotFound(other.to_string()),
                })
            }
        }
    }

    /// Detach the kernel driver if needed and claim the interface.
    ///
    /// Only valid from `Ready`. The returned guard mutably borrows the
    /// session, so a second claim while one is held cannot be expressed;
    /// calling this after the guard is gone returns `InvalidState`.
    pub fn claim(&mut self) -> Result<ClaimGuard<'_, T>> {
        self.expect_state("claim", &[SessionState::Ready])?;

        if self.kernel_owned {
            if let Err(e) = self.interface.detach_kernel_driver(INTERFACE_INDEX) {
                self.state = SessionState::Faulted;
                return Err(e);
            }
            self.detached = true;
            debug!(interface = INTERFACE_INDEX, "Kernel driver detached");
        }

        if let Err(e) = self.interface.claim_interface(INTERFACE_INDEX) {
            self.state = SessionState::Faulted;
            if let Err(warning) = self.release() {
                warn!(error = %warning, "Restore after failed claim did not complete");
            }
            return Err(e);
        }
        self.claimed = true;
        self.state = SessionState::Claimed;
        info!(interface = INTERFACE_INDEX, "Interface claimed");

        Ok(ClaimGuard { session: self })
    }

    fn transfer(&mut self, payload: &Payload) -> Result<()> {
        self.expect_state("transfer", &[SessionState::Claimed])?;
        trace!(payload = %payload, "Control TX");
        let written = match self
            .interface
            .write_control(&SET_REPORT, payload.as_ref(), self.timeout)
        {
            Ok(n) => n,
            Err(e) => {
                self.state = SessionState::Faulted;
                warn!(error = %e, "Control transfer failed");
                return Err(match e {
                    Error::Transport(_) => e,
                    other => Error::Transport(other.to_string()),
                });
            }
        };
        if written != payload.as_ref().len() {
            self.state = SessionState::Faulted;
            return Err(Error::Transport(format!(
                "short write: {written} of {} bytes",
                payload.as_ref().len()
            )));
        }
        Ok(())
    }

    /// Give the interface back to the kernel.
    ///
    /// Only performs work that is still outstanding, so repeated calls are
    /// harmless. Failures are returned as [`Error::Release`].
    fn release(&mut self) -> Result<()> {
        let mut failures = Vec::new();

        if self.claimed {
            self.claimed = false;
            if let Err(e) = self.interface.release_interface(INTERFACE_INDEX) {
                failures.push(format!("release interface: {e}"));
            }
        }
        if self.detached {
            self.detached = false;
            match self.interface.attach_kernel_driver(INTERFACE_INDEX) {
                Ok(()) => debug!(interface = INTERFACE_INDEX, "Kernel driver reattached"),
                Err(e) => failures.push(format!("reattach kernel driver: {e}")),
            }
        }
        self.state = SessionState::Released;

        if failures.is_empty() {
            info!("Device released back to kernel");
            Ok(())
        } else {
            let err = Error::Release(failures.join("; "));
            warn!(error = %err, "Release incomplete");
            Err(err)
        }
    }

    fn expect_state(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }
}

impl<T: UsbInterface> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        if self.claimed || self.detached {
            let _ = self.release();
        }
    }
}

/// Scope of exclusive ownership. Releases on drop.
pub struct ClaimGuard<'a, T: UsbInterface> {
    session: &'a mut DeviceSession<T>,
}

impl<T: UsbInterface> ClaimGuard<'_, T> {
    /// Send one payload. A failure faults the session; later transfers
    /// are refused until release.
    pub fn transfer(&mut self, payload: &Payload) -> Result<()> {
        self.session.transfer(payload)
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn is_faulted(&self) -> bool {
        self.session.state == SessionState::Faulted
    }

    /// Release explicitly to observe the outcome.
    pub fn release(self) -> Result<()> {
        // Drop sees nothing left to undo.
        self.session.release()
    }
}

impl<T: UsbInterface> Drop for ClaimGuard<'_, T> {
    fn drop(&mut self) {
        if self.session.state != SessionState::Released {
            let _ = self.session.release();
        }
    }
}
