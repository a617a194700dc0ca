//! Mcp9808 Async API

#[cfg(feature = "embedded-sensors-hal-async")]
use embedded_sensors_hal_async::sensor;
#[cfg(feature = "embedded-sensors-hal-async")]
use embedded_sensors_hal_async::temperature::{
    DegreesCelsius, TemperatureHysteresis, TemperatureSensor, TemperatureThresholdSet, TemperatureThresholdWait,
};

use super::{
    is_mcp9808, Address, AlertEvent, AlertMode, AlertPolarity, AlertSelect, AlertStatus, CodecError, Configuration,
    Hysteresis, Info, Register, Resolution, State, Temperature, INFO,
};

/// MCP9808 asynchronous device driver
pub struct Mcp9808<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> {
    /// The concrete I2C bus implementation
    i2c: I2C,

    /// The concrete [`embedded_hal_async::delay::DelayNs`] implementation
    delay: DELAY,

    /// The I2C address.
    pub(crate) addr: u8,

    state: State,
}

impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> Mcp9808<I2C, DELAY> {
    const SHUTDOWN_SETTLE_MS: u32 = 10;

    /// Create a new, uninitialized MCP9808 instance. No bus traffic happens
    /// until [`Self::init`].
    pub fn new_async(i2c: I2C, delay: DELAY, address: Address) -> Self {
        Self {
            i2c,
            delay,
            addr: address.into(),
            state: State::Uninitialized,
        }
    }

    /// Create a new MCP9808 instance with A2, A1 and A0 tied to GND,
    /// resulting in an instance responding to address `0x18`.
    pub fn new_async_with_default_address(i2c: I2C, delay: DELAY) -> Self {
        Self::new_async(i2c, delay, Address::default())
    }

    /// Create a new `AlertMcp9808` instance by consuming a plain
    /// MCP9808 instance.
    pub fn into_alert<ALERT: embedded_hal_async::digital::Wait>(self, alert: ALERT) -> AlertMcp9808<I2C, DELAY, ALERT> {
        AlertMcp9808 { mcp9808: self, alert }
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
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        if self.state == State::Initialized {
            return Ok(());
        }

        let manufacturer_id = u16::from_be_bytes(self.read(Register::ManufacturerId).await?);
        let device_id = u16::from_be_bytes(self.read(Register::DeviceId).await?);

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
    pub async fn deinit(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_shutdown(true)).await?;
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
    pub async fn temperature(&mut self) -> Result<f32, Error<I2C::Error>> {
        Ok(self.read_temperature().await?.ambient_celsius())
    }

    /// Read the ambient temperature word, including the limit comparison
    /// flags.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub async fn read_temperature(&mut self) -> Result<Temperature, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let raw = self.read(Register::Temperature).await?;
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
    pub async fn wait_for_temperature(&mut self) -> Result<f32, Error<I2C::Error>> {
        let resolution = self.resolution().await?;
        self.delay.delay_ms(resolution.conversion_time_ms()).await;
        self.temperature().await
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` when reserved bits are set
    pub async fn configuration(&mut self) -> Result<Configuration, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let data = self.read(Register::Configuration).await?;
        Ok(Configuration::decode(u16::from_be_bytes(data))?)
    }

    /// Set configuration register. Locks already set on the device are
    /// kept set in the written word.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` when `config` has reserved bits set, otherwise
    /// see [`Self::configuration`]
    pub async fn set_configuration(&mut self, config: Configuration) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        let config = Configuration::decode(u16::from(config)).map_err(|_| Error::InvalidInput)?;
        self.modify_configuration(|current| config.with_locks_from(current)).await
    }

    /// Read limit hysteresis
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn hysteresis(&mut self) -> Result<Hysteresis, Error<I2C::Error>> {
        Ok(self.configuration().await?.hysteresis())
    }

    /// Set limit hysteresis
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_hysteresis(hysteresis)).await
    }

    /// Whether the device is in shutdown mode
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn is_shutdown(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration().await?.shutdown())
    }

    /// Enter or leave shutdown mode, then let the device settle.
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_shutdown(shutdown)).await?;
        self.delay.delay_ms(Self::SHUTDOWN_SETTLE_MS).await;
        Ok(())
    }

    /// Whether the alert output is enabled
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn alert_enabled(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration().await?.alert_enable())
    }

    /// Enable or disable the alert output
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn set_alert_enabled(&mut self, enable: bool) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_enable(enable)).await
    }

    /// Read alert output select
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn alert_select(&mut self) -> Result<AlertSelect, Error<I2C::Error>> {
        Ok(self.configuration().await?.alert_select())
    }

    /// Set alert output select
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn set_alert_select(&mut self, select: AlertSelect) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_select(select)).await
    }

    /// Read alert output polarity
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn alert_polarity(&mut self) -> Result<AlertPolarity, Error<I2C::Error>> {
        Ok(self.configuration().await?.alert_polarity())
    }

    /// Set alert output polarity
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn set_alert_polarity(&mut self, polarity: AlertPolarity) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_polarity(polarity)).await
    }

    /// Read alert output mode
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn alert_mode(&mut self) -> Result<AlertMode, Error<I2C::Error>> {
        Ok(self.configuration().await?.alert_mode())
    }

    /// Set alert output mode
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn set_alert_mode(&mut self, mode: AlertMode) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(|cfg| cfg.with_alert_mode(mode)).await
    }

    /// Whether the alert output is currently asserted
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn is_alert_asserted(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration().await?.is_alert_asserted())
    }

    /// Release an alert output latched in interrupt mode
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn clear_interrupt(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(Configuration::with_interrupt_clear).await
    }

    /// Lock the critical limit. Only a power cycle unlocks it.
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn lock_critical(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(Configuration::with_critical_lock).await
    }

    /// Whether the critical limit is locked
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn is_critical_locked(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration().await?.is_critical_locked())
    }

    /// Lock the upper and lower limits. Only a power cycle unlocks them.
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn lock_limits(&mut self) -> Result<(), Error<I2C::Error>> {
        self.modify_configuration(Configuration::with_limits_lock).await
    }

    /// Whether the upper and lower limits are locked
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`]
    pub async fn is_limits_locked(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.configuration().await?.is_limits_locked())
    }

    /// Read upper limit register in ℃
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub async fn upper_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.limit(Register::UpperLimit).await
    }

    /// Set upper limit register, rounded to the nearest 0.25℃ the device
    /// compares against.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` when the limit is outside -40℃..=125℃,
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub async fn set_upper_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.set_limit(Register::UpperLimit, limit).await
    }

    /// Read lower limit register in ℃
    ///
    /// # Errors
    ///
    /// See [`Self::upper_limit`]
    pub async fn lower_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.limit(Register::LowerLimit).await
    }

    /// Set lower limit register
    ///
    /// # Errors
    ///
    /// See [`Self::set_upper_limit`]
    pub async fn set_lower_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.set_limit(Register::LowerLimit, limit).await
    }

    /// Read critical limit register in ℃
    ///
    /// # Errors
    ///
    /// See [`Self::upper_limit`]
    pub async fn critical_limit(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.limit(Register::CriticalLimit).await
    }

    /// Set critical limit register
    ///
    /// # Errors
    ///
    /// See [`Self::set_upper_limit`]
    pub async fn set_critical_limit(&mut self, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.set_limit(Register::CriticalLimit, limit).await
    }

    /// Read measurement resolution
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails, `Error::Decode` when reserved bits are set
    pub async fn resolution(&mut self) -> Result<Resolution, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let [raw] = self.read(Register::Resolution).await?;
        Ok(Resolution::decode(raw)?)
    }

    /// Set measurement resolution
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub async fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        self.write(Register::Resolution, [resolution.into()]).await
    }

    /// Read silicon revision
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub async fn device_revision(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let [_, revision] = self.read(Register::DeviceId).await?;
        Ok(revision)
    }

    /// Read any register as a raw value. The 8-bit resolution register is
    /// returned in the low byte.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` when not initialized, `Error::Bus` when the
    /// I2C transaction fails
    pub async fn register(&mut self, reg: Register) -> Result<u16, Error<I2C::Error>> {
        self.ensure_initialized()?;
        if reg.width() == 1 {
            let [raw] = self.read(reg).await?;
            Ok(u16::from(raw))
        } else {
            Ok(u16::from_be_bytes(self.read(reg).await?))
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
    pub async fn set_register(&mut self, reg: Register, value: u16) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        if !reg.is_writable() {
            return Err(Error::InvalidInput);
        }
        if reg == Register::Configuration {
            let config = Configuration::decode(value).map_err(|_| Error::InvalidInput)?;
            return self.set_configuration(config).await;
        }
        if reg.width() == 1 {
            let byte = u8::try_from(value).map_err(|_| Error::InvalidInput)?;
            self.write(reg, [byte]).await
        } else {
            self.write(reg, value.to_be_bytes()).await
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
    pub async fn handle_alert<F>(&mut self, mut handler: F) -> Result<AlertStatus, Error<I2C::Error>>
    where
        F: FnMut(AlertEvent),
    {
        let status = self.read_temperature().await?.status();
        trace!(
            "alert status: critical {}, upper {}, lower {}",
            status.critical(),
            status.upper(),
            status.lower()
        );
        status.events().for_each(&mut handler);
        self.clear_interrupt().await?;
        Ok(status)
    }

    async fn limit(&mut self, reg: Register) -> Result<f32, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let raw = self.read(reg).await?;
        Ok(Temperature::from(u16::from_be_bytes(raw)).celsius())
    }

    async fn set_limit(&mut self, reg: Register, limit: f32) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        let word = Temperature::limit_from_celsius(limit)?;
        self.write(reg, u16::from(word).to_be_bytes()).await
    }

    async fn modify_configuration<F>(&mut self, f: F) -> Result<(), Error<I2C::Error>>
    where
        F: FnOnce(Configuration) -> Configuration,
    {
        let current = self.configuration().await?;
        let value: u16 = f(current).into();
        self.write(Register::Configuration, value.to_be_bytes()).await
    }

    fn ensure_initialized(&self) -> Result<(), Error<I2C::Error>> {
        if self.state == State::Initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    async fn read<const N: usize>(&mut self, reg: Register) -> Result<[u8; N], Error<I2C::Error>> {
        let mut bytes = [0; N];
        self.i2c
            .write_read(self.addr, &[reg.into()], &mut bytes)
            .await
            .map_err(Error::Bus)?;
        Ok(bytes)
    }

    async fn write<const N: usize>(&mut self, reg: Register, value: [u8; N]) -> Result<(), Error<I2C::Error>> {
        let mut data = [0; 3];

        data[0] = reg.into();
        data[1..=N].copy_from_slice(&value);
        trace!("write {:#x} <- {:?}", data[0], &data[1..=N]);

        self.i2c.write(self.addr, &data[..=N]).await.map_err(Error::Bus)
    }
}

/// Mcp9808 Errors
#[derive(Debug, PartialEq)]
pub enum Error<E: embedded_hal_async::i2c::Error> {
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
    /// Other Error
    Other,
}

impl<E: embedded_hal_async::i2c::Error> From<CodecError> for Error<E> {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::OutOfRange => Self::InvalidInput,
            CodecError::Unrecognized(raw) => Self::Decode(raw),
        }
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<E: embedded_hal_async::i2c::Error> sensor::Error for Error<E> {
    fn kind(&self) -> sensor::ErrorKind {
        match *self {
            Self::Bus(_) => sensor::ErrorKind::Peripheral,
            Self::InvalidInput => sensor::ErrorKind::InvalidInput,
            _ => sensor::ErrorKind::Other,
        }
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> sensor::ErrorType
    for Mcp9808<I2C, DELAY>
{
    type Error = Error<I2C::Error>;
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> TemperatureSensor
    for Mcp9808<I2C, DELAY>
{
    async fn temperature(&mut self) -> Result<DegreesCelsius, Self::Error> {
        Mcp9808::temperature(self).await
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> TemperatureThresholdSet
    for Mcp9808<I2C, DELAY>
{
    async fn set_temperature_threshold_low(&mut self, threshold: DegreesCelsius) -> Result<(), Self::Error> {
        self.set_lower_limit(threshold).await
    }

    async fn set_temperature_threshold_high(&mut self, threshold: DegreesCelsius) -> Result<(), Self::Error> {
        self.set_upper_limit(threshold).await
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> TemperatureHysteresis
    for Mcp9808<I2C, DELAY>
{
    async fn set_temperature_threshold_hysteresis(&mut self, hysteresis: DegreesCelsius) -> Result<(), Self::Error> {
        // The device only offers four discrete hysteresis steps.
        let hysteresis = Hysteresis::from_celsius(hysteresis)?;
        self.set_hysteresis(hysteresis).await
    }
}

/// MCP9808 asynchronous device driver (with alert pin)
pub struct AlertMcp9808<
    I2C: embedded_hal_async::i2c::I2c,
    DELAY: embedded_hal_async::delay::DelayNs,
    ALERT: embedded_hal_async::digital::Wait,
> {
    /// Underlying MCP9808 sensor.
    pub mcp9808: Mcp9808<I2C, DELAY>,
    alert: ALERT,
}

impl<
        I2C: embedded_hal_async::i2c::I2c,
        DELAY: embedded_hal_async::delay::DelayNs,
        ALERT: embedded_hal_async::digital::Wait,
    > AlertMcp9808<I2C, DELAY, ALERT>
{
    /// Create a new, uninitialized `AlertMcp9808` instance.
    pub fn new_async(i2c: I2C, delay: DELAY, address: Address, alert: ALERT) -> Self {
        let mcp9808 = Mcp9808::new_async(i2c, delay, address);
        Self { mcp9808, alert }
    }

    /// Create a new `AlertMcp9808` instance with A2, A1 and A0 tied to GND,
    /// resulting in an instance responding to address `0x18`.
    pub fn new_async_with_default_address(i2c: I2C, delay: DELAY, alert: ALERT) -> Self {
        Self::new_async(i2c, delay, Address::default(), alert)
    }

    /// Destroy the driver instance, return the I2C bus instance and ALERT pin instance.
    pub fn destroy(self) -> (I2C, ALERT) {
        (self.mcp9808.destroy(), self.alert)
    }

    /// Wait until the ALERT pin signals, then service the alert and return
    /// the comparison flags seen at that moment.
    ///
    /// In comparator mode the wait is level triggered and returns at once
    /// while the condition persists. In interrupt mode it is edge triggered
    /// and the latched output is released before returning.
    ///
    /// # Errors
    ///
    /// `Error::Other` when waiting on the pin fails, otherwise see
    /// [`Mcp9808::handle_alert`]
    pub async fn wait_for_alert(&mut self) -> Result<AlertStatus, Error<I2C::Error>> {
        self.wait_for_alert_with(|_| {}).await
    }

    /// Same as [`Self::wait_for_alert`], reporting each asserted flag to
    /// `handler` (critical first) before the interrupt is cleared.
    ///
    /// # Errors
    ///
    /// See [`Self::wait_for_alert`]
    pub async fn wait_for_alert_with<F>(&mut self, handler: F) -> Result<AlertStatus, Error<I2C::Error>>
    where
        F: FnMut(AlertEvent),
    {
        let config = self.mcp9808.configuration().await?;

        match (config.alert_mode(), config.alert_polarity()) {
            (AlertMode::Comparator, AlertPolarity::ActiveLow) => {
                self.alert.wait_for_low().await.map_err(|_| Error::Other)?;
            }
            (AlertMode::Comparator, AlertPolarity::ActiveHigh) => {
                self.alert.wait_for_high().await.map_err(|_| Error::Other)?;
            }
            (AlertMode::Interrupt, AlertPolarity::ActiveLow) => {
                self.alert.wait_for_falling_edge().await.map_err(|_| Error::Other)?;
            }
            (AlertMode::Interrupt, AlertPolarity::ActiveHigh) => {
                self.alert.wait_for_rising_edge().await.map_err(|_| Error::Other)?;
            }
        }

        self.mcp9808.handle_alert(handler).await
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<
        I2C: embedded_hal_async::i2c::I2c,
        DELAY: embedded_hal_async::delay::DelayNs,
        ALERT: embedded_hal_async::digital::Wait,
    > sensor::ErrorType for AlertMcp9808<I2C, DELAY, ALERT>
{
    type Error = Error<I2C::Error>;
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<
        I2C: embedded_hal_async::i2c::I2c,
        DELAY: embedded_hal_async::delay::DelayNs,
        ALERT: embedded_hal_async::digital::Wait,
    > TemperatureSensor for AlertMcp9808<I2C, DELAY, ALERT>
{
    async fn temperature(&mut self) -> Result<DegreesCelsius, Self::Error> {
        self.mcp9808.temperature().await
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<
        I2C: embedded_hal_async::i2c::I2c,
        DELAY: embedded_hal_async::delay::DelayNs,
        ALERT: embedded_hal_async::digital::Wait,
    > TemperatureThresholdSet for AlertMcp9808<I2C, DELAY, ALERT>
{
    async fn set_temperature_threshold_low(&mut self, threshold: DegreesCelsius) -> Result<(), Self::Error> {
        self.mcp9808.set_lower_limit(threshold).await
    }

    async fn set_temperature_threshold_high(&mut self, threshold: DegreesCelsius) -> Result<(), Self::Error> {
        self.mcp9808.set_upper_limit(threshold).await
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<
        I2C: embedded_hal_async::i2c::I2c,
        DELAY: embedded_hal_async::delay::DelayNs,
        ALERT: embedded_hal_async::digital::Wait,
    > TemperatureThresholdWait for AlertMcp9808<I2C, DELAY, ALERT>
{
    async fn wait_for_temperature_threshold(&mut self) -> Result<DegreesCelsius, Self::Error> {
        self.wait_for_alert().await?;

        // Return temperature after the trigger for caller to determine which threshold was crossed.
        self.mcp9808.temperature().await
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<
        I2C: embedded_hal_async::i2c::I2c,
        DELAY: embedded_hal_async::delay::DelayNs,
        ALERT: embedded_hal_async::digital::Wait,
    > TemperatureHysteresis for AlertMcp9808<I2C, DELAY, ALERT>
{
    async fn set_temperature_threshold_hysteresis(&mut self, hysteresis: DegreesCelsius) -> Result<(), Self::Error> {
        self.mcp9808.set_temperature_threshold_hysteresis(hysteresis).await
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    use super::*;

    fn identity_reads() -> Vec<Transaction> {
        vec![
            Transaction::write_read(0x18, vec![0x06], vec![0x00, 0x54]),
            Transaction::write_read(0x18, vec![0x07], vec![0x04, 0x00]),
        ]
    }

    #[tokio::test]
    async fn uninitialized_instance_stays_off_the_bus() {
        let mock = Mock::new(&[]);
        let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());

        assert_eq!(mcp.temperature().await, Err(Error::NotInitialized));
        assert_eq!(mcp.set_alert_mode(AlertMode::Interrupt).await, Err(Error::NotInitialized));
        assert_eq!(mcp.set_critical_limit(90.0).await, Err(Error::NotInitialized));

        let mut mock = mcp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn read_temperature_default_address() {
        let words = [
            ([0x00, 0x50], 5.0),
            ([0x1f, 0xb0], -5.0),
            ([0x1f, 0xff], -0.0625),
            ([0x1d, 0x80], -40.0),
            ([0xe1, 0x90], 25.0),
        ];

        for (raw, t) in words {
            let expectations = [identity_reads(), vec![Transaction::write_read(0x18, vec![0x05], raw.to_vec())]].concat();
            let mock = Mock::new(&expectations);
            let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());
            mcp.init().await.unwrap();

            let temp = mcp.temperature().await.unwrap();
            assert_approx_eq!(temp, t, 1e-4);

            let mut mock = mcp.destroy();
            mock.done();
        }
    }

    #[tokio::test]
    async fn read_write_configuration_register() {
        let expectations = [
            identity_reads(),
            vec![
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x00]),
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x00]),
                Transaction::write(0x18, vec![0x01, 0x04, 0x0f]),
            ],
        ]
        .concat();

        let mock = Mock::new(&expectations);
        let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());
        mcp.init().await.unwrap();

        let cfg = mcp.configuration().await.unwrap();
        assert_eq!(cfg, Configuration::default());

        let cfg = cfg
            .with_alert_mode(AlertMode::Interrupt)
            .with_alert_polarity(AlertPolarity::ActiveHigh)
            .with_alert_select(AlertSelect::CriticalOnly)
            .with_alert_enable(true)
            .with_hysteresis(Hysteresis::ThreeCelsius);
        mcp.set_configuration(cfg).await.unwrap();

        let mut mock = mcp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn limits_and_resolution() {
        let expectations = [
            identity_reads(),
            vec![
                Transaction::write(0x18, vec![0x02, 0x05, 0x00]),
                Transaction::write(0x18, vec![0x03, 0x00, 0xa0]),
                Transaction::write_read(0x18, vec![0x03], vec![0x11, 0x40]),
                Transaction::write(0x18, vec![0x08, 0x02]),
            ],
        ]
        .concat();

        let mock = Mock::new(&expectations);
        let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());
        mcp.init().await.unwrap();

        mcp.set_upper_limit(80.0).await.unwrap();
        mcp.set_lower_limit(10.1).await.unwrap();
        assert_approx_eq!(mcp.lower_limit().await.unwrap(), -20.0, 1e-4);
        assert_eq!(mcp.set_critical_limit(130.0).await, Err(Error::InvalidInput));
        mcp.set_resolution(Resolution::Eighth).await.unwrap();

        let mut mock = mcp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn handle_alert_reports_events_and_clears() {
        let expectations = [
            identity_reads(),
            vec![
                Transaction::write_read(0x18, vec![0x05], vec![0x21, 0x00]),
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x09]),
                Transaction::write(0x18, vec![0x01, 0x00, 0x29]),
            ],
        ]
        .concat();

        let mock = Mock::new(&expectations);
        let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());
        mcp.init().await.unwrap();

        let mut events = Vec::new();
        let status = mcp.handle_alert(|event| events.push(event)).await.unwrap();
        assert_eq!(events, vec![AlertEvent::Lower]);
        assert!(status.lower());

        let mut mock = mcp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn wait_for_interrupt_mode_alert() {
        let i2c_expectations = [
            identity_reads(),
            vec![
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x09]),
                Transaction::write_read(0x18, vec![0x05], vec![0x45, 0x00]),
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x19]),
                Transaction::write(0x18, vec![0x01, 0x00, 0x39]),
            ],
        ]
        .concat();
        let i2c_mock = Mock::new(&i2c_expectations);

        let pin_expectations = [digital::Transaction::wait_for_edge(digital::Edge::Falling)];
        let pin_mock = digital::Mock::new(&pin_expectations);

        let mut mcp = AlertMcp9808::new_async_with_default_address(i2c_mock, NoopDelay::new(), pin_mock);
        mcp.mcp9808.init().await.unwrap();

        let status = mcp.wait_for_alert().await.unwrap();
        assert!(status.upper());
        assert!(!status.critical());

        let (mut i2c_mock, mut pin_mock) = mcp.destroy();
        i2c_mock.done();
        pin_mock.done();
    }

    #[tokio::test]
    async fn wait_for_comparator_mode_alert() {
        let i2c_expectations = [
            identity_reads(),
            vec![
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x0a]),
                Transaction::write_read(0x18, vec![0x05], vec![0x85, 0x00]),
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x1a]),
                Transaction::write(0x18, vec![0x01, 0x00, 0x3a]),
            ],
        ]
        .concat();
        let i2c_mock = Mock::new(&i2c_expectations);

        let pin_expectations = [digital::Transaction::wait_for_state(digital::State::High)];
        let pin_mock = digital::Mock::new(&pin_expectations);

        let mut mcp = Mcp9808::new_async_with_default_address(i2c_mock, NoopDelay::new()).into_alert(pin_mock);
        mcp.mcp9808.init().await.unwrap();

        let mut events = Vec::new();
        let status = mcp.wait_for_alert_with(|event| events.push(event)).await.unwrap();
        assert!(status.critical());
        assert_eq!(events, vec![AlertEvent::Critical]);

        let (mut i2c_mock, mut pin_mock) = mcp.destroy();
        i2c_mock.done();
        pin_mock.done();
    }

    #[tokio::test]
    async fn raw_configuration_write_keeps_locks() {
        let expectations = [
            identity_reads(),
            vec![
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0xc0]),
                Transaction::write(0x18, vec![0x01, 0x00, 0xc8]),
            ],
        ]
        .concat();

        let mock = Mock::new(&expectations);
        let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());
        mcp.init().await.unwrap();

        assert_eq!(mcp.set_register(Register::Configuration, 0xf800).await, Err(Error::InvalidInput));
        assert_eq!(
            mcp.set_configuration(Configuration::from(0x8000)).await,
            Err(Error::InvalidInput)
        );
        mcp.set_register(Register::Configuration, 0x0008).await.unwrap();

        let mut mock = mcp.destroy();
        mock.done();
    }

    #[cfg(feature = "embedded-sensors-hal-async")]
    #[tokio::test]
    async fn hysteresis_trait_accepts_device_steps_only() {
        let expectations = [
            identity_reads(),
            vec![
                Transaction::write_read(0x18, vec![0x01], vec![0x00, 0x00]),
                Transaction::write(0x18, vec![0x01, 0x06, 0x00]),
            ],
        ]
        .concat();

        let mock = Mock::new(&expectations);
        let mut mcp = Mcp9808::new_async_with_default_address(mock, NoopDelay::new());
        mcp.init().await.unwrap();

        assert!(mcp.set_temperature_threshold_hysteresis(6.0).await.is_ok());
        assert_eq!(mcp.set_temperature_threshold_hysteresis(2.0).await, Err(Error::InvalidInput));

        let mut mock = mcp.destroy();
        mock.done();
    }
}
