//! USB interface abstraction for the X9 session.
//!
//! Provides a trait-based seam so that the rusb-backed device and mock
//! devices share the same interface.

use crate::device::DeviceIdentity;
use crate::error::Result;
use std::time::Duration;

/// Setup packet fields of a host-to-device control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    /// bmRequestType
    pub request_type: u8,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
}

/// HID class SET_REPORT, feature report 7, interface 1.
pub const SET_REPORT: ControlRequest = ControlRequest {
    request_type: 0x21,
    request: 0x09,
    value: 0x0307,
    index: 0x0001,
};

/// Operations the session needs from an opened USB device.
pub trait UsbInterface: Send {
    /// Whether the kernel driver currently owns `interface`.
    fn kernel_driver_active(&mut self, interface: u8) -> Result<bool>;
    fn detach_kernel_driver(&mut self, interface: u8) -> Result<()>;
    fn attach_kernel_driver(&mut self, interface: u8) -> Result<()>;
    fn claim_interface(&mut self, interface: u8) -> Result<()>;
    fn release_interface(&mut self, interface: u8) -> Result<()>;
    /// One synchronous control transfer; returns the number of bytes written.
    fn write_control(
        &mut self,
        request: &ControlRequest,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize>;
}

/// Opens the device matching an identity, if one is attached.
pub trait DeviceLocator {
    type Interface: UsbInterface;

    fn locate(&self, identity: &DeviceIdentity) -> Result<Option<Self::Interface>>;
}


#[cfg(test)]
mod tests {
    use super::mock::{Call, MockInterface};
    use super::*;

    #[test]
    fn set_report_constants() {
        assert_eq!(SET_REPORT.request_type, 0x21);
        assert_eq!(SET_REPORT.request, 0x09);
        assert_eq!(SET_REPORT.value, 0x0307);
        assert_eq!(SET_REPORT.index, 0x0001);
    }

    #[test]
    fn mock_records_transfers_in_order() {
        let mut mock = MockInterface::new(true);
        mock.write_control(&SET_REPORT, &[1, 2], Duration::from_millis(10))
            .unwrap();
        mock.write_control(&SET_REPORT, &[3], Duration::from_millis(10))
            .unwrap();
        assert_eq!(mock.transfers(), vec![vec![1, 2], vec![3]]);
        assert_eq!(mock.count(&Call::Transfer(vec![3])), 1);
    }

    #[test]
    fn mock_fails_selected_transfer() {
        let mut mock = MockInterface::new(true);
        mock.state().fail_transfer = Some(1);
        let timeout = Duration::from_millis(10);
        assert!(mock.write_control(&SET_REPORT, &[0], timeout).is_ok());
        assert!(mock.write_control(&SET_REPORT, &[0], timeout).is_err());
        assert!(mock.write_control(&SET_REPORT, &[0], timeout).is_ok());
    }
}
