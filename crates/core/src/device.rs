//! Device model: identity, discovery, and the rusb-backed interface.

use crate::error::{Error, Result};
use crate::transport::{ControlRequest, DeviceLocator, UsbInterface};
use crate::{pids, FANTECH_VID};
use rusb::{DeviceHandle, GlobalContext};
use std::time::Duration;
use tracing::{debug, info, trace};

/// USB vendor/product pair identifying the target mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl std::fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Supported mouse models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseModel {
    X9Thor,
}

impl MouseModel {
    /// Look up model from USB product ID.
    pub fn from_pid(pid: u16) -> Option<Self> {
        match pid {
            pids::X9_THOR => Some(Self::X9Thor),
            _ => None,
        }
    }

    /// Model for an identity, if it is a supported Fantech device.
    pub fn from_identity(identity: &DeviceIdentity) -> Option<Self> {
        if identity.vendor_id != FANTECH_VID {
            return None;
        }
        Self::from_pid(identity.product_id)
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::X9Thor => "Fantech X9 Thor",
        }
    }

    pub fn identity(&self) -> DeviceIdentity {
        match self {
            Self::X9Thor => DeviceIdentity {
                vendor_id: FANTECH_VID,
                product_id: pids::X9_THOR,
            },
        }
    }
}

/// Information about a discovered device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub model: MouseModel,
    pub vid: u16,
    pub pid: u16,
    pub bus: u8,
    pub address: u8,
}

/// Attached devices whose identity satisfies `matches`.
fn matching_devices(
    matches: impl Fn(&DeviceIdentity) -> bool,
) -> Result<Vec<(rusb::Device<GlobalContext>, DeviceIdentity)>> {
    let mut found = Vec::new();
    for device in rusb::devices()?.iter() {
        let desc = match device.device_descriptor() {
            Ok(desc) => desc,
            Err(e) => {
                trace!(error = %e, "Skipping device without readable descriptor");
                continue;
            }
        };
        let identity = DeviceIdentity {
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
        };
        if matches(&identity) {
            found.push((device, identity));
        }
    }
    Ok(found)
}

/// List all connected supported mice.
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
    debug!("Starting USB device enumeration");
    let mut devices = Vec::new();
    for (device, identity) in matching_devices(|id| MouseModel::from_identity(id).is_some())? {
        let Some(model) = MouseModel::from_identity(&identity) else {
            continue;
        };
        info!(
            model = model.name(),
            bus = device.bus_number(),
            address = device.address(),
            "Found supported device"
        );
        devices.push(DeviceInfo {
            model,
            vid: identity.vendor_id,
            pid: identity.product_id,
            bus: device.bus_number(),
            address: device.address(),
        });
    }

    debug!(count = devices.len(), "Device enumeration complete");
    Ok(devices)
}

/// Finds devices through libusb's global context.
#[derive(Debug, Default, Clone, Copy)]
pub struct RusbLocator;

impl DeviceLocator for RusbLocator {
    type Interface = RusbInterface;

    fn locate(&self, identity: &DeviceIdentity) -> Result<Option<RusbInterface>> {
        let Some((device, _)) = matching_devices(|id| id == identity)?.into_iter().next() else {
            return Ok(None);
        };
        debug!(%identity, bus = device.bus_number(), address = device.address(), "Opening device");
        let handle = device.open()?;
        Ok(Some(RusbInterface { handle }))
    }
}

/// An opened device handle.
pub struct RusbInterface {
    handle: DeviceHandle<GlobalContext>,
}

impl UsbInterface for RusbInterface {
    fn kernel_driver_active(&mut self, interface: u8) -> Result<bool> {
        Ok(self.handle.kernel_driver_active(interface)?)
    }

    fn detach_kernel_driver(&mut self, interface: u8) -> Result<()> {
        Ok(self.handle.detach_kernel_driver(interface)?)
    }

    fn attach_kernel_driver(&mut self, interface: u8) -> Result<()> {
        Ok(self.handle.attach_kernel_driver(interface)?)
    }

    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        Ok(self.handle.claim_interface(interface)?)
    }

    fn release_interface(&mut self, interface: u8) -> Result<()> {
        Ok(self.handle.release_interface(interface)?)
    }

    fn write_control(
        &mut self,
        request: &ControlRequest,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize> {
        self.handle
            .write_control(
                request.request_type,
                request.request,
                request.value,
                request.index,
                data,
                timeout,
            )
            .map_err(|e| match e {
                // A vanished device mid-transfer is still a transfer failure.
                rusb::Error::NoDevice => Error::Transport(e.to_string()),
                other => Error::from(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_model_from_known_pid() {
        assert_eq!(MouseModel::from_pid(0x0FC0), Some(MouseModel::X9Thor));
    }

    #[test]
    fn mouse_model_from_unknown_pid() {
        assert_eq!(MouseModel::from_pid(0x1234), None);
    }

    #[test]
    fn identity_matches_constants() {
        let id = MouseModel::X9Thor.identity();
        assert_eq!(id.vendor_id, 0x18F8);
        assert_eq!(id.product_id, 0x0FC0);
        assert_eq!(id.to_string(), "18f8:0fc0");
    }

    #[test]
    fn from_identity_requires_vendor_and_product() {
        let id = MouseModel::X9Thor.identity();
        assert_eq!(MouseModel::from_identity(&id), Some(MouseModel::X9Thor));

        let other_vendor = DeviceIdentity {
            vendor_id: 0x046D,
            product_id: pids::X9_THOR,
        };
        assert_eq!(MouseModel::from_identity(&other_vendor), None);

        let other_product = DeviceIdentity {
            vendor_id: FANTECH_VID,
            product_id: 0x1234,
        };
        assert_eq!(MouseModel::from_identity(&other_product), None);
    }
}
