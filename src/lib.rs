//! This is a platform-agnostic Rust driver for the MCP9808 digital
//! temperature sensor based on the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! For further details of the device architecture and operation, please refer
//! to the official [`Datasheet`].
//!
//! [`Datasheet`]: https://ww1.microchip.com/downloads/en/DeviceDoc/25095A.pdf

#![doc(html_root_url = "https://docs.rs/mcp9808/latest")]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

mod fmt;

mod registers;
pub use registers::*;

#[cfg(feature = "async")]
pub mod asynchronous;

pub mod blocking;

/// Expected content of the manufacturer ID register.
pub const MANUFACTURER_ID: u16 = 0x0054;

/// Expected high byte of the device ID register. The low byte is the
/// silicon revision.
pub const DEVICE_ID: u8 = 0x04;

/// A2, A1 and A0 pin logic levels, selecting one of eight bus addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// A2, A1, A0 tied to GND (default), address `0x18`.
    #[default]
    A000,
    /// A0 tied to V+, address `0x19`.
    A001,
    /// A1 tied to V+, address `0x1a`.
    A010,
    /// A1 and A0 tied to V+, address `0x1b`.
    A011,
    /// A2 tied to V+, address `0x1c`.
    A100,
    /// A2 and A0 tied to V+, address `0x1d`.
    A101,
    /// A2 and A1 tied to V+, address `0x1e`.
    A110,
    /// A2, A1, A0 tied to V+, address `0x1f`.
    A111,
}

impl Address {
    /// Select the address from the A2, A1 and A0 pin levels.
    #[must_use]
    pub fn from_pins(a2: bool, a1: bool, a0: bool) -> Self {
        match (a2, a1, a0) {
            (false, false, false) => Self::A000,
            (false, false, true) => Self::A001,
            (false, true, false) => Self::A010,
            (false, true, true) => Self::A011,
            (true, false, false) => Self::A100,
            (true, false, true) => Self::A101,
            (true, true, false) => Self::A110,
            (true, true, true) => Self::A111,
        }
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        match address {
            Address::A000 => 0b001_1000,
            Address::A001 => 0b001_1001,
            Address::A010 => 0b001_1010,
            Address::A011 => 0b001_1011,
            Address::A100 => 0b001_1100,
            Address::A101 => 0b001_1101,
            Address::A110 => 0b001_1110,
            Address::A111 => 0b001_1111,
        }
    }
}

/// Static chip information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Info {
    /// Chip name.
    pub chip_name: &'static str,
    /// Manufacturer name.
    pub manufacturer_name: &'static str,
    /// Bus interface.
    pub interface: &'static str,
    /// Minimum supply voltage in V.
    pub supply_voltage_min_v: f32,
    /// Maximum supply voltage in V.
    pub supply_voltage_max_v: f32,
    /// Maximum supply current in mA.
    pub max_current_ma: f32,
    /// Minimum operating temperature in ℃.
    pub temperature_min: f32,
    /// Maximum operating temperature in ℃.
    pub temperature_max: f32,
    /// Driver crate version.
    pub driver_version: &'static str,
}

/// MCP9808 chip information.
pub const INFO: Info = Info {
    chip_name: "Microchip MCP9808",
    manufacturer_name: "Microchip",
    interface: "I2C",
    supply_voltage_min_v: 2.7,
    supply_voltage_max_v: 5.5,
    max_current_ma: 0.4,
    temperature_min: Temperature::MIN_CELSIUS,
    temperature_max: Temperature::MAX_CELSIUS,
    driver_version: env!("CARGO_PKG_VERSION"),
};

/// Handle lifecycle. Bus operations are only issued while `Initialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Uninitialized,
    Initialized,
    Deinitialized,
}

/// Check the two identity registers read while probing the device.
pub(crate) fn is_mcp9808(manufacturer_id: u16, device_id: u16) -> bool {
    manufacturer_id == MANUFACTURER_ID && device_id.to_be_bytes()[0] == DEVICE_ID
}
