#![allow(missing_docs)]
use bilge::prelude::*;

/// Register pointers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Configuration register pointer.
    Configuration,

    /// Alert temperature upper boundary register pointer.
    UpperLimit,

    /// Alert temperature lower boundary register pointer.
    LowerLimit,

    /// Critical temperature register pointer.
    CriticalLimit,

    /// Ambient temperature register pointer.
    Temperature,

    /// Manufacturer ID register pointer.
    ManufacturerId,

    /// Device ID and revision register pointer.
    DeviceId,

    /// Resolution register pointer.
    Resolution,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        match reg {
            Register::Configuration => 0x01,
            Register::UpperLimit => 0x02,
            Register::LowerLimit => 0x03,
            Register::CriticalLimit => 0x04,
            Register::Temperature => 0x05,
            Register::ManufacturerId => 0x06,
            Register::DeviceId => 0x07,
            Register::Resolution => 0x08,
        }
    }
}

impl Register {
    /// Number of data bytes transferred for this register.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            Register::Resolution => 1,
            _ => 2,
        }
    }

    /// Whether the device accepts writes to this register.
    #[must_use]
    pub fn is_writable(self) -> bool {
        !matches!(
            self,
            Register::Temperature | Register::ManufacturerId | Register::DeviceId
        )
    }
}

/// Register codec failures. The codec never touches the bus, so these only
/// ever describe bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Temperature outside of the representable -40℃ to +125℃ window, or NaN.
    OutOfRange,

    /// Register holds a bit pattern no defined setting maps to.
    Unrecognized(u16),
}

/// Comparison flags latched in the upper three bits of the ambient
/// temperature register.
#[bitsize(3)]
#[derive(DebugBits, FromBits, Clone, Copy, PartialEq)]
pub struct AlertStatus {
    /// Ambient temperature is below the lower limit.
    pub lower: bool,

    /// Ambient temperature is above the upper limit.
    pub upper: bool,

    /// Ambient temperature is at or above the critical limit.
    pub critical: bool,
}

/// Alert condition reported to an alert handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertEvent {
    /// Critical limit reached.
    Critical,

    /// Upper limit exceeded.
    Upper,

    /// Fell below the lower limit.
    Lower,
}

impl AlertStatus {
    /// True when any of the comparison flags is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.critical() || self.upper() || self.lower()
    }

    /// Asserted flags as events, critical first.
    pub fn events(self) -> impl Iterator<Item = AlertEvent> {
        [
            (self.critical(), AlertEvent::Critical),
            (self.upper(), AlertEvent::Upper),
            (self.lower(), AlertEvent::Lower),
        ]
        .into_iter()
        .filter_map(|(set, event)| set.then_some(event))
    }
}

/// Temperature word, shared by the ambient temperature register and the
/// upper, lower and critical limit registers.
///
/// Bits 11..0 hold the value in 1/16℃ steps and bit 12 is the sign. The
/// ambient register stores the 13-bit value as two's complement, see
/// [`Temperature::ambient_celsius`]. The limit registers store sign and
/// magnitude with a 0.25℃ step, see [`Temperature::limit_from_celsius`].
/// The three most significant bits carry the [`AlertStatus`] when read from
/// the ambient register and are always zero in encoded words.
#[bitsize(16)]
#[derive(DebugBits, FromBits, Clone, Copy, PartialEq)]
pub struct Temperature {
    magnitude: u12,
    negative: bool,
    flags: AlertStatus,
}

impl Temperature {
    /// Size of one magnitude step.
    pub const CELSIUS_PER_BIT: f32 = 0.0625;

    /// Smallest step the limit registers compare against.
    pub const LIMIT_CELSIUS_PER_BIT: f32 = 0.25;

    /// Lowest encodable temperature.
    pub const MIN_CELSIUS: f32 = -40.0;

    /// Highest encodable temperature.
    pub const MAX_CELSIUS: f32 = 125.0;

    const VALUE_MASK: u16 = 0x1fff;

    /// Encode a temperature as sign and magnitude, rounding to the nearest
    /// 1/16℃ step with ties away from zero.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when `celsius` is outside
    /// [`Self::MIN_CELSIUS`]..=[`Self::MAX_CELSIUS`] or is NaN.
    pub fn from_celsius(celsius: f32) -> Result<Self, CodecError> {
        Self::encode(celsius, Self::CELSIUS_PER_BIT, 0)
    }

    /// Encode a limit register word. Same as [`Self::from_celsius`] but
    /// rounded to the nearest 0.25℃ step, since the device ignores the two
    /// lowest magnitude bits of a limit.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when `celsius` is outside
    /// [`Self::MIN_CELSIUS`]..=[`Self::MAX_CELSIUS`] or is NaN.
    pub fn limit_from_celsius(celsius: f32) -> Result<Self, CodecError> {
        Self::encode(celsius, Self::LIMIT_CELSIUS_PER_BIT, 2)
    }

    fn encode(celsius: f32, step: f32, shift: u32) -> Result<Self, CodecError> {
        if !(Self::MIN_CELSIUS..=Self::MAX_CELSIUS).contains(&celsius) {
            return Err(CodecError::OutOfRange);
        }

        let negative = celsius < 0.0;
        let magnitude = if negative { -celsius } else { celsius };

        // Range check above bounds the step count to 2000.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = ((magnitude / step + 0.5) as u16) << shift;

        let sign = if negative && steps != 0 { 1 << 12 } else { 0 };
        Ok(Self::from(sign | steps))
    }

    /// Sign and magnitude value in ℃, as held by the limit registers. Status
    /// flags do not affect the value.
    #[must_use]
    pub fn celsius(&self) -> f32 {
        let magnitude = f32::from(self.magnitude().value()) * Self::CELSIUS_PER_BIT;
        if self.negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Two's complement value in ℃, as held by the ambient temperature
    /// register. Status flags do not affect the value.
    #[must_use]
    pub fn ambient_celsius(&self) -> f32 {
        let raw = u16::from(*self) & Self::VALUE_MASK;

        // Move bit 12 into the i16 sign bit, then shift back arithmetically.
        #[allow(clippy::cast_possible_wrap)]
        let value = ((raw << 3) as i16) >> 3;
        f32::from(value) * Self::CELSIUS_PER_BIT
    }

    /// Comparison flags carried by the word.
    #[must_use]
    pub fn status(&self) -> AlertStatus {
        self.flags()
    }
}

/// Configuration register.
#[bitsize(16)]
#[derive(DebugBits, FromBits, Clone, Copy, PartialEq)]
pub struct Configuration {
    /// Alert output mode.
    pub alert_mode: AlertMode,

    /// Alert output polarity.
    pub alert_polarity: AlertPolarity,

    /// Alert output select.
    pub alert_select: AlertSelect,

    /// Alert output control.
    pub alert_enable: bool,

    alert_status: bool,

    interrupt_clear: bool,

    window_lock: bool,

    critical_lock: bool,

    /// Shutdown mode.
    pub shutdown: bool,

    /// Upper and lower limit hysteresis.
    pub hysteresis: Hysteresis,

    reserved11_15: u5,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from(0x0000)
    }
}

impl Configuration {
    const RESERVED_MASK: u16 = 0xf800;

    /// Decode a raw configuration word.
    ///
    /// # Errors
    ///
    /// [`CodecError::Unrecognized`] when any reserved bit is set.
    pub fn decode(raw: u16) -> Result<Self, CodecError> {
        if raw & Self::RESERVED_MASK != 0 {
            return Err(CodecError::Unrecognized(raw));
        }
        Ok(Self::from(raw))
    }

    /// Configure alert output mode.
    #[must_use]
    pub fn with_alert_mode(mut self, mode: AlertMode) -> Self {
        self.set_alert_mode(mode);
        self
    }

    /// Configure alert output polarity.
    #[must_use]
    pub fn with_alert_polarity(mut self, polarity: AlertPolarity) -> Self {
        self.set_alert_polarity(polarity);
        self
    }

    /// Configure which limits drive the alert output.
    #[must_use]
    pub fn with_alert_select(mut self, select: AlertSelect) -> Self {
        self.set_alert_select(select);
        self
    }

    /// Enable or disable the alert output.
    #[must_use]
    pub fn with_alert_enable(mut self, enable: bool) -> Self {
        self.set_alert_enable(enable);
        self
    }

    /// Configure shutdown mode.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: bool) -> Self {
        self.set_shutdown(shutdown);
        self
    }

    /// Configure limit hysteresis.
    #[must_use]
    pub fn with_hysteresis(mut self, hyst: Hysteresis) -> Self {
        self.set_hysteresis(hyst);
        self
    }

    /// Request an interrupt clear. The bit always reads back as zero.
    #[must_use]
    pub fn with_interrupt_clear(mut self) -> Self {
        self.set_interrupt_clear(true);
        self
    }

    /// Lock the critical limit register. Cleared only by a power cycle.
    #[must_use]
    pub fn with_critical_lock(mut self) -> Self {
        self.set_critical_lock(true);
        self
    }

    /// Lock the upper and lower limit registers. Cleared only by a power
    /// cycle.
    #[must_use]
    pub fn with_limits_lock(mut self) -> Self {
        self.set_window_lock(true);
        self
    }

    /// Carry over every lock already set in `current`.
    #[must_use]
    pub fn with_locks_from(mut self, current: Configuration) -> Self {
        if current.critical_lock() {
            self.set_critical_lock(true);
        }
        if current.window_lock() {
            self.set_window_lock(true);
        }
        self
    }

    /// Whether the alert output is currently asserted.
    #[must_use]
    pub fn is_alert_asserted(&self) -> bool {
        self.alert_status()
    }

    /// Whether an interrupt clear is requested by this word.
    #[must_use]
    pub fn is_interrupt_clear(&self) -> bool {
        self.interrupt_clear()
    }

    /// Whether the critical limit register is locked.
    #[must_use]
    pub fn is_critical_locked(&self) -> bool {
        self.critical_lock()
    }

    /// Whether the upper and lower limit registers are locked.
    #[must_use]
    pub fn is_limits_locked(&self) -> bool {
        self.window_lock()
    }
}

/// Alert output mode.
#[bitsize(1)]
#[derive(Debug, FromBits, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertMode {
    /// Comparator mode (default). The output follows the comparison result.
    Comparator,

    /// Interrupt mode. The output stays asserted until an interrupt clear.
    Interrupt,
}

/// Alert output polarity.
#[bitsize(1)]
#[derive(Debug, FromBits, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertPolarity {
    /// Active low (default).
    ActiveLow,

    /// Active high.
    ActiveHigh,
}

/// Limits that drive the alert output.
#[bitsize(1)]
#[derive(Debug, FromBits, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertSelect {
    /// Upper, lower and critical limits (default).
    All,

    /// Critical limit only.
    CriticalOnly,
}

/// Upper and lower limit hysteresis.
#[bitsize(2)]
#[derive(Debug, FromBits, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hysteresis {
    /// 0℃ hysteresis (default).
    ZeroCelsius,

    /// +1.5℃ hysteresis.
    OneAndHalfCelsius,

    /// +3℃ hysteresis.
    ThreeCelsius,

    /// +6℃ hysteresis.
    SixCelsius,
}

impl Hysteresis {
    /// Hysteresis in ℃.
    #[must_use]
    pub fn celsius(self) -> f32 {
        match self {
            Hysteresis::ZeroCelsius => 0.0,
            Hysteresis::OneAndHalfCelsius => 1.5,
            Hysteresis::ThreeCelsius => 3.0,
            Hysteresis::SixCelsius => 6.0,
        }
    }

    /// Map a hysteresis in ℃ onto one of the four supported steps.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when `celsius` is not exactly one of the
    /// supported steps.
    pub fn from_celsius(celsius: f32) -> Result<Self, CodecError> {
        [
            Hysteresis::ZeroCelsius,
            Hysteresis::OneAndHalfCelsius,
            Hysteresis::ThreeCelsius,
            Hysteresis::SixCelsius,
        ]
        .into_iter()
        .find(|h| {
            let delta = h.celsius() - celsius;
            delta < f32::EPSILON && delta > -f32::EPSILON
        })
        .ok_or(CodecError::OutOfRange)
    }
}

/// Measurement resolution, stored in the 8-bit resolution register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 0.5℃ resolution.
    Half,

    /// 0.25℃ resolution.
    Quarter,

    /// 0.125℃ resolution.
    Eighth,

    /// 0.0625℃ resolution (power-on default).
    Sixteenth,
}

impl Default for Resolution {
    fn default() -> Self {
        Self::Sixteenth
    }
}

impl From<Resolution> for u8 {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Half => 0b00,
            Resolution::Quarter => 0b01,
            Resolution::Eighth => 0b10,
            Resolution::Sixteenth => 0b11,
        }
    }
}

impl Resolution {
    /// Decode the raw resolution register.
    ///
    /// # Errors
    ///
    /// [`CodecError::Unrecognized`] when any of the reserved bits 7..2 is set.
    pub fn decode(raw: u8) -> Result<Self, CodecError> {
        match raw {
            0b00 => Ok(Resolution::Half),
            0b01 => Ok(Resolution::Quarter),
            0b10 => Ok(Resolution::Eighth),
            0b11 => Ok(Resolution::Sixteenth),
            _ => Err(CodecError::Unrecognized(u16::from(raw))),
        }
    }

    /// Smallest temperature step at this resolution.
    #[must_use]
    pub fn celsius_per_bit(self) -> f32 {
        match self {
            Resolution::Half => 0.5,
            Resolution::Quarter => 0.25,
            Resolution::Eighth => 0.125,
            Resolution::Sixteenth => 0.0625,
        }
    }

    /// Typical conversion time at this resolution.
    #[must_use]
    pub fn conversion_time_ms(self) -> u32 {
        match self {
            Resolution::Half => 30,
            Resolution::Quarter => 65,
            Resolution::Eighth => 130,
            Resolution::Sixteenth => 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn register_pointers() {
        let pointers: Vec<u8> = [
            Register::Configuration,
            Register::UpperLimit,
            Register::LowerLimit,
            Register::CriticalLimit,
            Register::Temperature,
            Register::ManufacturerId,
            Register::DeviceId,
            Register::Resolution,
        ]
        .into_iter()
        .map(u8::from)
        .collect();
        assert_eq!(pointers, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(Register::Resolution.width(), 1);
        assert_eq!(Register::Configuration.width(), 2);
        assert!(!Register::Temperature.is_writable());
        assert!(Register::CriticalLimit.is_writable());
    }

    #[test]
    fn decode_positive_temperature() {
        let t = Temperature::from(0x0050);
        assert_eq!(t.celsius(), 5.0);
        assert!(!t.status().any());
    }

    #[test]
    fn decode_negative_temperature() {
        assert_eq!(Temperature::from(0x1050).celsius(), -5.0);
        assert_eq!(Temperature::from(0x1280).celsius(), -40.0);
    }

    #[test]
    fn decode_negative_ambient_temperature() {
        assert_eq!(Temperature::from(0x1fff).ambient_celsius(), -0.0625);
        assert_eq!(Temperature::from(0x1ffc).ambient_celsius(), -0.25);
        assert_eq!(Temperature::from(0x1fb0).ambient_celsius(), -5.0);
        assert_eq!(Temperature::from(0x1d80).ambient_celsius(), -40.0);
    }

    #[test]
    fn decode_ambient_temperature_within_range() {
        assert_eq!(Temperature::from(0x0050).ambient_celsius(), 5.0);
        assert_eq!(Temperature::from(0x07d0).ambient_celsius(), 125.0);
        assert_eq!(Temperature::from(0x0000).ambient_celsius(), 0.0);

        // Flags set on top of a negative reading.
        assert_eq!(Temperature::from(0xfd80).ambient_celsius(), -40.0);

        for raw in (0x0000..=0x07d0_u16).chain(0x1d80..=0x1fff) {
            let t = Temperature::from(raw).ambient_celsius();
            assert!(
                (Temperature::MIN_CELSIUS..=Temperature::MAX_CELSIUS).contains(&t),
                "{raw:#06x} -> {t}"
            );
        }
    }

    #[test]
    fn decode_ignores_status_flags() {
        let t = Temperature::from(0xe190);
        assert_eq!(t.celsius(), 25.0);

        let status = t.status();
        assert!(status.critical());
        assert!(status.upper());
        assert!(status.lower());
    }

    #[test]
    fn encode_temperature() {
        assert_eq!(u16::from(Temperature::from_celsius(5.0).unwrap()), 0x0050);
        assert_eq!(u16::from(Temperature::from_celsius(-5.0).unwrap()), 0x1050);
        assert_eq!(u16::from(Temperature::from_celsius(0.0).unwrap()), 0x0000);
        assert_eq!(u16::from(Temperature::from_celsius(125.0).unwrap()), 0x07d0);
        assert_eq!(u16::from(Temperature::from_celsius(-40.0).unwrap()), 0x1280);
    }

    #[test]
    fn encode_rounds_ties_away_from_zero() {
        // 0.03125 is exactly half a step
        assert_eq!(u16::from(Temperature::from_celsius(0.03125).unwrap()), 0x0001);
        assert_eq!(u16::from(Temperature::from_celsius(-0.03125).unwrap()), 0x1001);
        assert_eq!(u16::from(Temperature::from_celsius(25.01).unwrap()), 0x0190);
        assert_eq!(u16::from(Temperature::from_celsius(-0.01).unwrap()), 0x0000);
    }

    #[test]
    fn encode_limit_in_quarter_steps() {
        assert_eq!(u16::from(Temperature::limit_from_celsius(25.0625).unwrap()), 0x0190);
        assert_eq!(u16::from(Temperature::limit_from_celsius(25.125).unwrap()), 0x0194);
        assert_eq!(u16::from(Temperature::limit_from_celsius(-5.0).unwrap()), 0x1050);
        assert_eq!(u16::from(Temperature::limit_from_celsius(-0.1).unwrap()), 0x0000);
        assert_eq!(u16::from(Temperature::limit_from_celsius(125.0).unwrap()), 0x07d0);
        assert_eq!(u16::from(Temperature::limit_from_celsius(-40.0).unwrap()), 0x1280);
        assert_eq!(Temperature::limit_from_celsius(125.25), Err(CodecError::OutOfRange));

        let word = Temperature::limit_from_celsius(-17.3).unwrap();
        assert_eq!(word.celsius(), -17.25);
    }

    #[test]
    fn encode_rejects_out_of_range() {
        assert_eq!(Temperature::from_celsius(125.0625), Err(CodecError::OutOfRange));
        assert_eq!(Temperature::from_celsius(-40.0625), Err(CodecError::OutOfRange));
        assert_eq!(Temperature::from_celsius(f32::NAN), Err(CodecError::OutOfRange));
        assert_eq!(Temperature::from_celsius(f32::INFINITY), Err(CodecError::OutOfRange));
    }

    #[test]
    fn temperature_round_trip() {
        for step in -640_i16..=2000 {
            let t = f32::from(step) * Temperature::CELSIUS_PER_BIT;
            let encoded = Temperature::from_celsius(t).unwrap();
            assert_eq!(encoded.celsius(), t, "step {step}");
            assert!(!encoded.status().any());
        }
    }

    #[test]
    fn alert_events_in_priority_order() {
        let events: Vec<AlertEvent> = Temperature::from(0xe000).status().events().collect();
        assert_eq!(events, vec![AlertEvent::Critical, AlertEvent::Upper, AlertEvent::Lower]);

        let events: Vec<AlertEvent> = Temperature::from(0x2000).status().events().collect();
        assert_eq!(events, vec![AlertEvent::Lower]);

        assert_eq!(Temperature::from(0x0190).status().events().count(), 0);
    }

    #[test]
    fn default_configuration() {
        let cfg = Configuration::default();
        assert_eq!(cfg.value, 0x0000);
    }

    #[test]
    fn modify_alert_mode() {
        let cfg = Configuration::default().with_alert_mode(AlertMode::Interrupt);
        assert_eq!(cfg.value, 0x0001);
    }

    #[test]
    fn modify_alert_polarity() {
        let cfg = Configuration::default().with_alert_polarity(AlertPolarity::ActiveHigh);
        assert_eq!(cfg.value, 0x0002);
    }

    #[test]
    fn modify_alert_select() {
        let cfg = Configuration::default().with_alert_select(AlertSelect::CriticalOnly);
        assert_eq!(cfg.value, 0x0004);
    }

    #[test]
    fn modify_alert_enable() {
        let cfg = Configuration::default().with_alert_enable(true);
        assert_eq!(cfg.value, 0x0008);
    }

    #[test]
    fn modify_interrupt_clear() {
        let cfg = Configuration::default().with_interrupt_clear();
        assert_eq!(cfg.value, 0x0020);
        assert!(cfg.is_interrupt_clear());
    }

    #[test]
    fn modify_locks() {
        let cfg = Configuration::default().with_limits_lock();
        assert_eq!(cfg.value, 0x0040);
        assert!(cfg.is_limits_locked());
        assert!(!cfg.is_critical_locked());

        let cfg = Configuration::default().with_critical_lock();
        assert_eq!(cfg.value, 0x0080);
        assert!(cfg.is_critical_locked());
    }

    #[test]
    fn modify_shutdown() {
        let cfg = Configuration::default().with_shutdown(true);
        assert_eq!(cfg.value, 0x0100);
    }

    #[test]
    fn modify_hysteresis() {
        let cfg = Configuration::default().with_hysteresis(Hysteresis::SixCelsius);
        assert_eq!(cfg.value, 0x0600);
    }

    #[test]
    fn locks_survive_every_setter() {
        let locked = Configuration::default().with_critical_lock().with_limits_lock();
        let cfg = locked
            .with_alert_mode(AlertMode::Interrupt)
            .with_alert_polarity(AlertPolarity::ActiveHigh)
            .with_alert_select(AlertSelect::CriticalOnly)
            .with_alert_enable(false)
            .with_shutdown(true)
            .with_hysteresis(Hysteresis::ThreeCelsius);
        assert!(cfg.is_critical_locked());
        assert!(cfg.is_limits_locked());
    }

    #[test]
    fn carry_over_locks() {
        let current = Configuration::from(0x00c0);
        let cfg = Configuration::default()
            .with_alert_enable(true)
            .with_locks_from(current);
        assert_eq!(cfg.value, 0x00c8);

        let cfg = Configuration::default().with_locks_from(Configuration::default());
        assert_eq!(cfg.value, 0x0000);
    }

    #[test]
    fn setters_leave_other_fields_untouched() {
        type Setter = fn(Configuration) -> Configuration;

        // (field mask, setter touching only that field)
        let setters: [(u16, Setter); 8] = [
            (0x0001, |c| c.with_alert_mode(AlertMode::Interrupt)),
            (0x0002, |c| c.with_alert_polarity(AlertPolarity::ActiveHigh)),
            (0x0004, |c| c.with_alert_select(AlertSelect::CriticalOnly)),
            (0x0008, |c| c.with_alert_enable(true)),
            (0x0040, Configuration::with_limits_lock),
            (0x0080, Configuration::with_critical_lock),
            (0x0100, |c| c.with_shutdown(true)),
            (0x0600, |c| c.with_hysteresis(Hysteresis::OneAndHalfCelsius)),
        ];

        for base in [0x0000_u16, 0x0010, 0x0215, 0x07df] {
            let before = Configuration::from(base);
            for (mask, set) in setters {
                let after = set(before);
                assert_eq!(after.value & !mask, before.value & !mask, "base {base:#06x} mask {mask:#06x}");

                if mask != 0x0001 {
                    assert_eq!(after.alert_mode(), before.alert_mode());
                }
                if mask != 0x0600 {
                    assert_eq!(after.hysteresis(), before.hysteresis());
                }
                if mask != 0x0100 {
                    assert_eq!(after.shutdown(), before.shutdown());
                }
                assert_eq!(after.is_alert_asserted(), before.is_alert_asserted());
            }
        }
    }

    #[test]
    fn field_round_trip() {
        for mode in [AlertMode::Comparator, AlertMode::Interrupt] {
            assert_eq!(Configuration::default().with_alert_mode(mode).alert_mode(), mode);
        }
        for polarity in [AlertPolarity::ActiveLow, AlertPolarity::ActiveHigh] {
            assert_eq!(Configuration::default().with_alert_polarity(polarity).alert_polarity(), polarity);
        }
        for select in [AlertSelect::All, AlertSelect::CriticalOnly] {
            assert_eq!(Configuration::default().with_alert_select(select).alert_select(), select);
        }
        for hyst in [
            Hysteresis::ZeroCelsius,
            Hysteresis::OneAndHalfCelsius,
            Hysteresis::ThreeCelsius,
            Hysteresis::SixCelsius,
        ] {
            assert_eq!(Configuration::default().with_hysteresis(hyst).hysteresis(), hyst);
            assert_eq!(Hysteresis::from_celsius(hyst.celsius()), Ok(hyst));
        }
        for resolution in [
            Resolution::Half,
            Resolution::Quarter,
            Resolution::Eighth,
            Resolution::Sixteenth,
        ] {
            assert_eq!(Resolution::decode(u8::from(resolution)), Ok(resolution));
        }
    }

    #[test]
    fn decode_rejects_reserved_bits() {
        assert_eq!(Configuration::decode(0x0800), Err(CodecError::Unrecognized(0x0800)));
        assert_eq!(Configuration::decode(0x8001), Err(CodecError::Unrecognized(0x8001)));
        assert_eq!(Configuration::decode(0x07ff).map(u16::from), Ok(0x07ff));
        assert_eq!(Resolution::decode(0x04), Err(CodecError::Unrecognized(0x04)));
    }

    #[test]
    fn hysteresis_rejects_unsupported_steps() {
        assert_eq!(Hysteresis::from_celsius(2.0), Err(CodecError::OutOfRange));
        assert_eq!(Hysteresis::from_celsius(-1.5), Err(CodecError::OutOfRange));
        assert_approx_eq!(Hysteresis::SixCelsius.celsius(), 6.0, 1e-6);
    }

    #[test]
    fn resolution_timing() {
        assert_eq!(Resolution::default(), Resolution::Sixteenth);
        assert_eq!(Resolution::Half.conversion_time_ms(), 30);
        assert_eq!(Resolution::Sixteenth.conversion_time_ms(), 250);
        assert_approx_eq!(Resolution::Eighth.celsius_per_bit(), 0.125, 1e-6);
    }
}
