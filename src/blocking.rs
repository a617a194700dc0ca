//! Mcp9808 Blocking API

#[cfg(feature = "embedded-sensors-hal")]
use embedded_sensors_hal::sensor;
#[cfg(feature = "embedded-sensors-hal")]
use embedded_sensors_hal::temperature::{DegreesCelsius, TemperatureSensor};

use super::{
    is_mcp9808, Address, AlertEvent, AlertMode, AlertPolarity, AlertSelect, AlertStatus, CodecError, Configuration, Hysteresis,
    Info, Register, Resolution, State, Temperature, INFO,
};

/// MCP9808 blocking device driver
pub struct Mcp9808<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> {
    /// The concrete I2C bus implementation
    i2c: I2C,

    /// The concrete [`embedded_hal::delay::DelayNs`] implementation
    delay: DELAY,

    /// The I2C address.
    pub(crate) addr: u8,

    state: State,
}

impl<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> Mcp9808<I2C, DELAY> {
    const SHUTDOWN_SETTLE_MS: u32 = 10;

    /// Create a new, uninitialized MCP9808 instance. No bus traffic happens
    /// until [`Self::init`].
    pub fn new_blocking(i2c: I2C, delay: DELAY, address: Address) -> Self {
        Self {
            i2c,
            delay,
            addr: address.into(),
            state: State::Uninitialized,
        }
    }

    /// Create a new MCP9808 instance with A2, A1 and A0 tied to GND,
    /// resulting in an instance responding to address `0x18`.
    pub fn new_blocking_with_default_address(i2c: I2C, delay: DELAY) -> Self {
        Self::new_blocking(i2c, delay, Address::default())
    }

    /// I2C address this instance talks to.
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Static chip information.
    pub fn info() -> Info {
        INFO
    }

    /// Whether [`Self::init`] succeeded and [`Self::deinit`] was not called
    /// since.
    pub fn is_initialized(&self) -> bool {
        self.state == State::Initialized
    }

    /// Destroy the driver instance, return the I2C bus instance.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Probe the device identity and mark the instance initialized. Calling
    /// it on an initialized instance does nothing.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the I2C transaction fails, `Error::UnknownDevice`
    /// when the identity registers do not match an MCP9808
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        if self.state == State::Initialized {
            return Ok(());
        }

        let manufacturer_id = u16::from_be_bytes(self.read(Register::ManufacturerId)?);
        let device_id = u16::from_be_bytes(self.read(Register::DeviceId)?);

        if !is_mcp9808(manufacturer_id, device_id) {
            warn!(
                "unexpected identity at {:#x}: manufacturer {:#x}, device {:#x}",
                self.addr,
                manufacturer_id,
                device_id
            );
            return Err(Error::UnknownDevice {
                manufacturer_id,
                device_id,
            });
        }

        self.state = State::Initialized;
        debug!("mcp9808 at {:#x} ready, revision {}", self.addr, device_id & 0xff);
        Ok(())
    }

    /// Place the device in shutdown and mark the instance deinitialized.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn deinit(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_shutdown(true))?;
        self.state = State::Deinitialized;
        debug!("mcp9808 at {:#x} shut down", self.addr);
        Ok(())
    }

    /// Read ambient temperature in ℃
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn temperature(&mut self) -> Result<f32, Error<I2C::Error>> {
        Ok(self.read_temperature()?.ambient_celsius())
    }

    /// Read the ambient temperature word, including the limit comparison
    /// flags.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn read_temperature(&mut self) -> Result<Temperature, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let raw = self.read(Register::Temperature)?;
        Ok(Temperature::from(u16::from_be_bytes(raw)))
    }

    /// Wait for one conversion at the configured resolution, then read the
    /// ambient temperature.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` for a malformed resolution
    /// register
    pub fn wait_for_temperature(&mut self) -> Result<f32, Error<I2C::Error>> {
        let resolution = self.resolution()?;
        self.delay.delay_ms(resolution.conversion_time_ms());
        self.temperature()
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` when reserved bits are set
    pub fn configuration(&mut self) -> Result<Configuration, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let data = self.read(Register::Configuration)?;
        Ok(Configuration::decode(u16::from_be_bytes(data))?)
    }

    /// Set configuration register. Locks already set on the device are
    /// kept set in the written word.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` when `config` has reserved bits set, otherwise
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` when the current register is
    /// malformed
    pub fn set_configuration(&mut self, config: Configuration) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        let config = Configuration::decode(u16::from(config)).map_err(|_| Error::InvalidInput)?;
        self.modify_configuration(|current| config.with_locks_from(current))
    }

    /// Read limit hysteresis
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn hysteresis(&mut self) -> Result<Hysteresis, Error<I2C::Error>> {
        Ok(self.configuration()?.hysteresis())
    }

    /// Set limit hysteresis
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_hysteresis(hysteresis))
    }

    /// Whether the device is in shutdown mode
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn is_shutdown(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration()?.shutdown())
    }

    /// Enter or leave shutdown mode, then let the device settle.
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_shutdown(shutdown))?;
        self.delay.delay_ms(Self::SHUTDOWN_SETTLE_MS);
        Ok(())
    }

    /// Whether the alert output is enabled
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn alert_enabled(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration()?.alert_enable())
    }

    /// Enable or disable the alert output
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn set_alert_enabled(&mut self, enable: bool) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_enable(enable))
    }

    /// Read alert output select
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn alert_select(&mut self) -> Result<AlertSelect, Error<I2C::Error>> {
        Ok(self.configuration()?.alert_select())
    }

    /// Set alert output select
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn set_alert_select(&mut self, select: AlertSelect) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_select(select))
    }

    /// Read alert output polarity
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn alert_polarity(&mut self) -> Result<AlertPolarity, Error<I2C::Error>> {
        Ok(self.configuration()?.alert_polarity())
    }

    /// Set alert output polarity
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn set_alert_polarity(&mut self, polarity: AlertPolarity) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_polarity(polarity))
    }

    /// Read alert output mode
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn alert_mode(&mut self) -> Result<AlertMode, Error<I2C::Error>> {
        Ok(self.configuration()?.alert_mode())
    }

    /// Set alert output mode
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn set_alert_mode(&mut self, mode: AlertMode) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_mode(mode))
    }

    /// Whether the alert output is currently asserted
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn is_alert_asserted(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration()?.is_alert_asserted())
    }

    /// Release an alert output latched in interrupt mode
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn clear_interrupt(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(Configuration::with_interrupt_clear)
    }

    /// Lock the critical limit. Only a power cycle unlocks it.
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn lock_critical(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(Configuration::with_critical_lock)
    }

    /// Whether the critical limit is locked
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn is_critical_locked(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration()?.is_critical_locked())
    }

    /// Lock the upper and lower limits. Only a power cycle unlocks them.
    ///
    /// # Errors
    ///
    /// See [`Self::set_configuration`]
    pub fn lock_limits(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(Configuration::with_limits_lock)
    }

    /// Whether the upper and lower limits are locked
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub fn is_limits_locked(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration()?.is_limits_locked())
    }

    /// Read upper limit register in ℃
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn upper_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.limit(Register::UpperLimit)
    }

    /// Set upper limit register, rounded to the nearest 0.25℃ the device
    /// compares against.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` when the limit is outside -40℃..=125℃,
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn set_upper_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.set_limit(Register::UpperLimit, limit)
    }

    /// Read lower limit register in ℃
    ///
    /// # Errors
    ///
    /// See [`Self::upper_limit`]
    pub fn lower_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.limit(Register::LowerLimit)
    }

    /// Set lower limit register
    ///
    /// # Errors
    ///
    /// See [`Self::set_upper_limit`]
    pub fn set_lower_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.set_limit(Register::LowerLimit, limit)
    }

    /// Read critical limit register in ℃
    ///
    /// # Errors
    ///
    /// See [`Self::upper_limit`]
    pub fn critical_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.limit(Register::CriticalLimit)
    }

    /// Set critical limit register
    ///
    /// # Errors
    ///
    /// See [`Self::set_upper_limit`]
    pub fn set_critical_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.set_limit(Register::CriticalLimit, limit)
    }

    /// Read measurement resolution
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` when reserved bits are set
    pub fn resolution(&mut self) -> Result<Resolution, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let [raw] = self.read(Register::Resolution)?;
        Ok(Resolution::decode(raw)?)
    }

    /// Set measurement resolution
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        self.write(Register::Resolution, [resolution.into()])
    }

    /// Read silicon revision
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn device_revision(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let [_, revision] = self.read(Register::DeviceId)?;
        Ok(revision)
    }

    /// Read any register as a raw value. The 8-bit resolution register is
    /// returned in the low byte.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub fn register(&mut self, reg: Register) -> Result<u16, Error<I2C::Error>> {
        self.ensure_initialized()?;
        if reg.width() == 1 {
            let [raw] = self.read(reg)?;
            Ok(u16::from(raw))
        } else {
            Ok(u16::from_be_bytes(self.read(reg)?))
        }
    }

    /// Write any writable register with a raw value. A configuration word
    /// goes through [`Self::set_configuration`], so it cannot clear a lock.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` for read-only registers or a value wider than
    /// the register, `Error::NotInitialized` when not initialized,
    /// `Error::Bus` when the I2C transaction fails
    pub fn set_register(&mut self, reg: Register, value: u16) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        if !reg.is_writable() {
            return Err(Error::InvalidInput);
        }
        if reg == Register::Configuration {
            let config = Configuration::decode(value).map_err(|_| Error::InvalidInput)?;
            return self.set_configuration(config);
        }
        if reg.width() == 1 {
            let byte = u8::try_from(value).map_err(|_| Error::InvalidInput)?;
            self.write(reg, [byte])
        } else {
            self.write(reg, value.to_be_bytes())
        }
    }

    /// Service an alert: read the comparison flags, report each asserted one
    /// to `handler` (critical first), then clear the interrupt.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` when the configuration
    /// register is malformed
    pub fn handle_alert<F>(&mut self, mut handler: F) -> Result<AlertStatus, Error<I2C::Error>>
    where
        F: FnMut(AlertEvent),
    {
        let status = self.read_temperature()?.status();
        trace!(
            "alert status: critical {}, upper {}, lower {}",
            status.critical(),
            status.upper(),
            status.lower()
        );
        status.events().for_each(&mut handler);
        self.clear_interrupt()?;
        Ok(status)
    }

    fn limit(&mut self, reg: Register) -> Result<f32, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let raw = self.read(reg)?;
        Ok(Temperature::from(u16::from_be_bytes(raw)).celsius())
    }

    fn set_limit(&mut self, reg: Register, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        let word = Temperature::limit_from_celsius(limit)?;
        self.write(reg, u16::from(word).to_be_bytes())
    }

    fn modify_configuration<F>(&mut self, f: F) -> Result<(), Error<I2C::Error>>
    where
        F: FnOnce(Configuration) -> Configuration,
    {
        let current = self.configuration()?;
        let value: u16 = f(current).into();
        self.write(Register::Configuration, value.to_be_bytes())
    }

    fn ensure_initialized(&self) -> Result<(), Error<I2C::Error>> {
        if self.state == State::Initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn read<const N: usize>(&mut self, reg: Register) -> Result<[u8; N], Error<I2C::Error>> {
        let mut bytes = [0; N];
        self.i2c
            .write_read(self.addr, &[reg.into()], &mut bytes)
            .map_err(Error::Bus)?;
        Ok(bytes)
    }

    fn write<const N: usize>(&mut self, reg: Register, value: [u8; N]) -> Result<(), Error<I2C::Error>> {
        let mut data = [0; 3];

        data[0] = reg.into();
        data[1..=N].copy_from_slice(&value);
        trace!("write {:#x} <- {:?}", data[0], &data[1..=N]);

        self.i2c.write(self.addr, &data[..=N]).map_err(Error::Bus)
    }
}

/// Mcp9808 Errors
#[derive(Debug, PartialEq)]
pub enum Error<E: embedded_hal::i2c::Error> {
    /// I2C Bus Error
    Bus(E),
    /// Operation attempted before `init` or after `deinit`
    NotInitialized,
    /// Invalid Input Error
    InvalidInput,
    /// Register holds an undefined bit pattern
    Decode(u16),
    /// Identity registers do not describe an MCP9808
    UnknownDevice {
        /// Manufacturer ID register content
        manufacturer_id: u16,
        /// Device ID register content
        device_id: u16,
    },
}

impl<E: embedded_hal::i2c::Error> From<CodecError> for Error<E> {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::OutOfRange => Self::InvalidInput,
            CodecError::Unrecognized(raw) => Self::Decode(raw),
        }
    }
}

#[cfg(feature = "embedded-sensors-hal")]
impl<E: embedded_hal::i2c::Error> sensor::Error for Error<E> {
    fn kind(&self) -> sensor::ErrorKind {
        match *self {
            Self::Bus(_) => sensor::ErrorKind::Peripheral,
            Self::InvalidInput => sensor::ErrorKind::InvalidInput,
            _ => sensor::ErrorKind::Other,
        }
    }
}

#[cfg(feature = "embedded-sensors-hal")]
impl<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> sensor::ErrorType for Mcp9808<I2C, DELAY> {
    type Error = Error<I2C::Error>;
}

#[cfg(feature = "embedded-sensors-hal")]
impl<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> TemperatureSensor for Mcp9808<I2C, DELAY> {
    fn temperature(&mut self) -> Result<DegreesCelsius, Self::Error> {
        Mcp9808::temperature(self)
    }
}
