//! Typed view of GPIO_CONFIG, plus encode/decode/validate/merge.

use crate::ondisk::gpio::*;
use crate::types::{Error, Result};
use num_traits::FromPrimitive;

fn parse<T: FromPrimitive>(field: GpioConfigField, value: u32) -> Result<T> {
    T::from_u32(value).ok_or(Error::InvalidField { field: field.name(), value })
}

/// Picks OVERRIDE unless it's the hardware default.
fn pick<T: Copy + Default + PartialEq>(base: T, overrides: T) -> T {
    if overrides == T::default() {
        base
    } else {
        overrides
    }
}

/// InterruptConfig: routing OR-ed with trigger type.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct GpioIntConfig {
    pub source: GpioIntSource,
    pub trigger: GpioIntTrigger,
}

impl GpioIntConfig {
    pub fn new(source: GpioIntSource, trigger: GpioIntTrigger) -> Self {
        Self { source, trigger }
    }

    pub fn from_raw(raw: u16) -> Result<Self> {
        let field = GpioConfigField::InterruptConfig;
        let invalid = Error::InvalidField { field: field.name(), value: raw.into() };
        if raw & !(GPIO_INT_CONFIG_INT_SOURCE_MASK | GPIO_INT_CONFIG_INT_TYPE_MASK)
            != 0
        {
            return Err(invalid);
        }
        let source = GpioIntSource::from_u16(raw & GPIO_INT_CONFIG_INT_SOURCE_MASK)
            .ok_or(invalid)?;
        let trigger = GpioIntTrigger::from_u16(raw & GPIO_INT_CONFIG_INT_TYPE_MASK)
            .ok_or(invalid)?;
        Ok(Self { source, trigger })
    }

    pub fn to_raw(self) -> u16 {
        u16::from(self.source as u8) | u16::from(self.trigger as u8)
    }
}

/// ElectricalConfig: termination OR-ed with 1.8 V tolerance.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct GpioElectricalConfig {
    pub termination: GpioTermination,
    pub tolerance_1v8: GpioTolerance1v8,
}

impl GpioElectricalConfig {
    pub fn new(termination: GpioTermination, tolerance_1v8: GpioTolerance1v8) -> Self {
        Self { termination, tolerance_1v8 }
    }

    pub fn from_raw(raw: u16) -> Result<Self> {
        let field = GpioConfigField::ElectricalConfig;
        let invalid = Error::InvalidField { field: field.name(), value: raw.into() };
        if raw
            & !(GPIO_ELECTRICAL_CONFIG_TERMINATION_MASK
                | GPIO_ELECTRICAL_CONFIG_1V8_TOLERANCE_MASK)
            != 0
        {
            return Err(invalid);
        }
        let termination = GpioTermination::from_u16(
            raw & GPIO_ELECTRICAL_CONFIG_TERMINATION_MASK,
        )
        .ok_or(invalid)?;
        let tolerance_1v8 = GpioTolerance1v8::from_u16(
            raw & GPIO_ELECTRICAL_CONFIG_1V8_TOLERANCE_MASK,
        )
        .ok_or(invalid)?;
        Ok(Self { termination, tolerance_1v8 })
    }

    pub fn to_raw(self) -> u16 {
        u16::from(self.termination as u8) | u16::from(self.tolerance_1v8 as u8)
    }
}

impl GpioLockConfig {
    pub fn from_flags(pad_config: bool, output_state: bool) -> Self {
        match (pad_config, output_state) {
            (false, false) => Self::Default,
            (true, false) => Self::PadConfigLock,
            (false, true) => Self::OutputStateLock,
            (true, true) => Self::PadConfigAndOutputStateLock,
        }
    }

    pub fn locks_pad_config(self) -> bool {
        self as u8 & GPIO_LOCK_CONFIG_PAD_CONF_LOCK_MASK
            == GPIO_LOCK_CONFIG_PAD_CONF_LOCK_MASK
    }

    pub fn locks_output_state(self) -> bool {
        self as u8 & GPIO_LOCK_CONFIG_OUTPUT_LOCK_MASK
            == GPIO_LOCK_CONFIG_OUTPUT_LOCK_MASK
    }
}

impl core::ops::BitOr for GpioLockConfig {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_flags(
            self.locks_pad_config() || rhs.locks_pad_config(),
            self.locks_output_state() || rhs.locks_output_state(),
        )
    }
}

impl GpioOtherConfig {
    pub fn overrides_rx_raw(self) -> bool {
        self as u8 & GPIO_OTHER_CONFIG_RXRAW_MASK == Self::RxRaw1En as u8
    }
}

/// Configuration of one pad, with every field as its enumeration.  The
/// Default of every field leaves the hardware setting unmodified.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct GpioConfig {
    pub pad_mode: GpioPadMode,
    pub host_soft_pad_own: GpioHostSwOwn,
    pub direction: GpioDirection,
    pub output_state: GpioOutputState,
    pub interrupt_config: GpioIntConfig,
    pub power_config: GpioResetConfig,
    pub electrical_config: GpioElectricalConfig,
    pub lock_config: GpioLockConfig,
    pub other_settings: GpioOtherConfig,
}

impl GpioConfig {
    /// Packs the fields into their on-disk positions.
    pub fn encode(&self) -> GPIO_CONFIG {
        GPIO_CONFIG::new()
            .with_pad_mode(self.pad_mode as u8)
            .with_host_soft_pad_own(self.host_soft_pad_own as u8)
            .with_direction(self.direction as u8)
            .with_output_state(self.output_state as u8)
            .with_interrupt_config(self.interrupt_config.to_raw())
            .with_power_config(self.power_config as u8)
            .with_electrical_config(self.electrical_config.to_raw())
            .with_lock_config(self.lock_config as u8)
            .with_other_settings(self.other_settings as u8)
    }

    pub fn to_word(&self) -> u64 {
        self.encode().into()
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        self.encode().into_bytes()
    }

    /// Fails on the first field that is not one of its enumeration's values.
    pub fn decode(raw: GPIO_CONFIG) -> Result<Self> {
        let rsvd_bits = raw.rsvd_bits();
        if rsvd_bits != 0 {
            return Err(Error::InvalidField {
                field: GpioConfigField::RsvdBits.name(),
                value: rsvd_bits,
            });
        }
        Ok(Self {
            pad_mode: parse(GpioConfigField::PadMode, raw.pad_mode().into())?,
            host_soft_pad_own: parse(
                GpioConfigField::HostSoftPadOwn,
                raw.host_soft_pad_own().into(),
            )?,
            direction: parse(
                GpioConfigField::Direction,
                raw.direction().into(),
            )?,
            output_state: parse(
                GpioConfigField::OutputState,
                raw.output_state().into(),
            )?,
            interrupt_config: GpioIntConfig::from_raw(raw.interrupt_config())?,
            power_config: parse(
                GpioConfigField::PowerConfig,
                raw.power_config().into(),
            )?,
            electrical_config: GpioElectricalConfig::from_raw(
                raw.electrical_config(),
            )?,
            lock_config: parse(
                GpioConfigField::LockConfig,
                raw.lock_config().into(),
            )?,
            other_settings: parse(
                GpioConfigField::OtherSettings,
                raw.other_settings().into(),
            )?,
        })
    }

    pub fn from_word(word: u64) -> Result<Self> {
        Self::decode(GPIO_CONFIG::from(word))
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Result<Self> {
        Self::decode(GPIO_CONFIG::from_bytes(bytes))
    }

    /// Combines BASE (self) with OVERRIDES.  Every sub-range (including
    /// the two halves of InterruptConfig and ElectricalConfig) is combined
    /// on its own: a Default in OVERRIDES keeps BASE, anything else replaces
    /// it.  Lock flags accumulate.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        Self {
            pad_mode: pick(self.pad_mode, overrides.pad_mode),
            host_soft_pad_own: pick(
                self.host_soft_pad_own,
                overrides.host_soft_pad_own,
            ),
            direction: pick(self.direction, overrides.direction),
            output_state: pick(self.output_state, overrides.output_state),
            interrupt_config: GpioIntConfig {
                source: pick(
                    self.interrupt_config.source,
                    overrides.interrupt_config.source,
                ),
                trigger: pick(
                    self.interrupt_config.trigger,
                    overrides.interrupt_config.trigger,
                ),
            },
            power_config: pick(self.power_config, overrides.power_config),
            electrical_config: GpioElectricalConfig {
                termination: pick(
                    self.electrical_config.termination,
                    overrides.electrical_config.termination,
                ),
                tolerance_1v8: pick(
                    self.electrical_config.tolerance_1v8,
                    overrides.electrical_config.tolerance_1v8,
                ),
            },
            lock_config: self.lock_config | overrides.lock_config,
            other_settings: pick(self.other_settings, overrides.other_settings),
        }
    }

    /// Whether every field is left at its hardware default.
    pub fn is_hardware_default(&self) -> bool {
        *self == Self::default()
    }
}

impl TryFrom<GPIO_CONFIG> for GpioConfig {
    type Error = Error;

    fn try_from(raw: GPIO_CONFIG) -> Result<Self> {
        Self::decode(raw)
    }
}

impl From<GpioConfig> for GPIO_CONFIG {
    fn from(config: GpioConfig) -> Self {
        config.encode()
    }
}

impl GPIO_CONFIG {
    /// Raw value of FIELD, extracted by offset and width.
    pub fn field(&self, field: GpioConfigField) -> u32 {
        ((u64::from(*self) & field.mask()) >> field.offset()) as u32
    }

    /// Sets FIELD to the raw VALUE, which has to fit into the field.
    pub fn with_field_checked(
        self,
        field: GpioConfigField,
        value: u32,
    ) -> Result<Self> {
        if value & !field.value_mask() != 0 {
            return Err(Error::FieldOverflow { field: field.name(), value });
        }
        let word = (u64::from(self) & !field.mask())
            | (u64::from(value) << field.offset());
        Ok(Self::from(word))
    }

    /// Checks every field against its enumeration and that the reserved
    /// bits are clear.  Nothing is corrected.
    pub fn validate(&self) -> Result<()> {
        GpioConfig::decode(*self).map(|_| ())
    }
}
