//! open-x9-core: payload encoding, profile state, and USB session handling
//! for the Fantech X9 Thor mouse.
//!
//! The mouse is configured through 8-byte HID SET_REPORT control transfers
//! on interface 1, which the kernel's HID driver normally owns. A
//! [`session::DeviceSession`] detaches the driver for the duration of the
//! transfers and always hands the interface back.

pub mod apply;
pub mod device;
pub mod error;
pub mod lighting;
pub mod payload;
pub mod profile;
pub mod safety;
pub mod sensitivity;
pub mod session;
pub mod tables;
pub mod transport;

/// Fantech USB Vendor ID.
pub const FANTECH_VID: u16 = 0x18F8;

/// Known product IDs.
pub mod pids {
    /// X9 Thor (wired).
    pub const X9_THOR: u16 = 0x0FC0;
}

/// HID interface carrying configuration reports.
pub const INTERFACE_INDEX: u8 = 1;
