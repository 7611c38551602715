// This file contains the FSP HOB on-disk formats.  These mirror the layouts the
// FSP binary produces.  Do not reorder fields or change values.

#![allow(non_camel_case_types)]

use crate::struct_accessors::{make_accessors, Getter, Setter};
use byteorder::LittleEndian;
use core::mem::{replace, size_of};
use static_assertions::const_assert_eq;
use zerocopy::{AsBytes, FromBytes, LayoutVerified, Unaligned};

/// Given *BUF (a collection of multiple items), retrieves the first of the items and returns it after advancing *BUF to the next item.
/// If the item cannot be parsed, returns None and does not advance.
pub fn take_header_from_collection_mut<'a, T: Sized + FromBytes + AsBytes>(
    buf: &mut &'a mut [u8],
) -> Option<&'a mut T> {
    let xbuf = replace(&mut *buf, &mut []);
    match LayoutVerified::<_, T>::new_from_prefix(xbuf) {
        Some((item, xbuf)) => {
            *buf = xbuf;
            Some(item.into_mut())
        }
        None => None,
    }
}

/// Given *BUF (a collection of multiple items), retrieves the first of the items and returns it after advancing *BUF to the next item.
/// If the item cannot be parsed, returns None and does not advance.
pub fn take_header_from_collection<'a, T: Sized + FromBytes>(
    buf: &mut &'a [u8],
) -> Option<&'a T> {
    let xbuf = replace(&mut *buf, &[]);
    match LayoutVerified::<_, T>::new_from_prefix(xbuf) {
        Some((item, xbuf)) => {
            *buf = xbuf;
            Some(item.into_ref())
        }
        None => None,
    }
}

make_accessors! {
    /// Version information the FSP reports about itself.
    /// Note: TimeStamp sits between FspVersionBuild and FspVersionMinor.
    #[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(C, packed)]
    pub struct FSP_INFO_HOB {
        pub(crate) silicon_init_version_major: u8 : pub get u8 : pub set u8,
        pub(crate) silicon_init_version_minor: u8 : pub get u8 : pub set u8,
        pub(crate) silicon_init_version_revision: u8 : pub get u8 : pub set u8,
        pub(crate) silicon_init_version_build: u8 : pub get u8 : pub set u8,
        pub(crate) fsp_version_revision: u8 : pub get u8 : pub set u8,
        pub(crate) fsp_version_build: u8 : pub get u8 : pub set u8,
        pub(crate) time_stamp: [u8; 12] : pub get [u8; 12] : pub set [u8; 12], // not necessarily NUL-terminated
        pub(crate) fsp_version_minor: u8 : pub get u8 : pub set u8,
    }
}

impl Default for FSP_INFO_HOB {
    fn default() -> Self {
        Self {
            silicon_init_version_major: 0,
            silicon_init_version_minor: 0,
            silicon_init_version_revision: 0,
            silicon_init_version_build: 0,
            fsp_version_revision: 0,
            fsp_version_build: 0,
            time_stamp: [0; 12],
            fsp_version_minor: 0,
        }
    }
}

const_assert_eq!(size_of::<FSP_INFO_HOB>(), 19);

pub mod fusa {
    use super::*;
    use memoffset::offset_of;
    use num_derive::{FromPrimitive, ToPrimitive};
    use zerocopy::U32;

    use crate::types::{Error, Result};

    /// Compare to the version of the HOB retrieved from the FSP.  Only an
    /// exact match may be interpreted.
    pub const FUSA_INFO_VERSION: u32 = 0x0000_0100;

    /// Number of CheckResults slots per test.
    pub const FUSA_CHECK_RESULTS_COUNT: usize = 32;

    /// Used both for FUSA_TEST_RESULT::test_result and for each of
    /// FUSA_TEST_RESULT::check_results.  The values are far apart so
    /// that bit flips do not turn one into another.
    #[derive(
        Debug, Default, PartialEq, Eq, Clone, Copy, FromPrimitive, ToPrimitive,
    )]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize)
    )]
    #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
    #[repr(u8)]
    pub enum FusaTestStatus {
        #[default]
        NotRun = 0x00,
        Pass = 0x2D,
        Fail = 0xD2,
        DeviceNotAvailable = 0xFF,
    }

    /// Unique id of each FuSa test.  The position of a FUSA_TEST_RESULT in
    /// the FUSA_INFO_HOB is its test number.
    /// Note: Cpu4-7 and CboSlice4-7 only exist on the H SKUs.
    #[derive(
        Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, FromPrimitive,
        ToPrimitive,
    )]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize)
    )]
    #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
    #[repr(u32)]
    pub enum FusaTestNumber {
        Mc0Cmi = 0,
        Mc1Cmi,
        Mc0CmiCh0Data,
        Mc0CmiCh1Data,
        Mc0CmiCh2Data,
        Mc0CmiCh3Data,
        Mc1CmiCh0Data,
        Mc1CmiCh1Data,
        Mc1CmiCh2Data,
        Mc1CmiCh3Data,
        Ibecc0Cmi,
        Ibecc1Cmi,
        Ibecc0EccCorrError,
        Ibecc1EccCorrError,
        Ibecc0EccUncorrError,
        Ibecc1EccUncorrError,

        Mc0Mbist,
        Mc1Mbist,
        Mc0Ch0Mbist,
        Mc0Ch1Mbist,
        Mc0Ch2Mbist,
        Mc0Ch3Mbist,
        Mc1Ch0Mbist,
        Mc1Ch1Mbist,
        Mc1Ch2Mbist,
        Mc1Ch3Mbist,
        Ibecc0Mbist,
        Ibecc1Mbist,

        Cpu0Idi,
        Cpu1Idi,
        Cpu2Idi,
        Cpu3Idi,
        Cpu4Idi,
        Cpu5Idi,
        Cpu6Idi,
        Cpu7Idi,

        Cpu0Mbist,
        Cpu1Mbist,
        Cpu2Mbist,
        Cpu3Mbist,
        Cpu4Mbist,
        Cpu5Mbist,
        Cpu6Mbist,
        Cpu7Mbist,

        CboSlice0Ingress,
        CboSlice1Ingress,
        CboSlice2Ingress,
        CboSlice3Ingress,
        CboSlice4Ingress,
        CboSlice5Ingress,
        CboSlice6Ingress,
        CboSlice7Ingress,

        OpiLinkIosfData,
        Dip,
        Iop,
    }

    impl FusaTestNumber {
        /// Total number of tests; also the number of FUSA_TEST_RESULT in the
        /// HOB.  Tied to FUSA_INFO_VERSION.
        pub const TOTAL: usize = Self::Iop as usize + 1;

        /// Iterates over all tests in HOB order.
        pub fn iter() -> impl Iterator<Item = Self> {
            (0..Self::TOTAL as u32)
                .filter_map(<Self as num_traits::FromPrimitive>::from_u32)
        }

        pub fn index(self) -> usize {
            self as usize
        }
    }

    impl Setter<FusaTestNumber> for U32<LittleEndian> {
        fn set1(&mut self, value: FusaTestNumber) {
            self.set(value as u32)
        }
    }
    impl Setter<FusaTestStatus> for u8 {
        fn set1(&mut self, value: FusaTestStatus) {
            *self = value as u8
        }
    }

    /// Checksum algorithm for FUSA_TEST_RESULT::crc32.  The FSP does not
    /// document which CRC32 it uses, so the caller has to supply one.
    pub trait Crc32 {
        fn crc32(&self, bytes: &[u8]) -> u32;
    }

    impl<F: Fn(&[u8]) -> u32> Crc32 for F {
        fn crc32(&self, bytes: &[u8]) -> u32 {
            self(bytes)
        }
    }

    make_accessors! {
        #[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
        #[repr(C, packed)]
        pub struct FUSA_TEST_RESULT {
            pub(crate) test_number: U32<LittleEndian> : pub get FusaTestNumber : pub set FusaTestNumber,
            pub(crate) total_checks: U32<LittleEndian> : pub get u32 : pub set u32,
            pub(crate) test_result: u8 : pub get FusaTestStatus : pub set FusaTestStatus,
            pub(crate) reserved_byte: [u8; 3], // 0; pads to 4 Byte alignment
            pub(crate) check_results: [u8; FUSA_CHECK_RESULTS_COUNT] : pub get [u8; FUSA_CHECK_RESULTS_COUNT] : pub set [u8; FUSA_CHECK_RESULTS_COUNT],
            pub(crate) crc32: U32<LittleEndian> : pub get u32 : pub set u32, // over all the fields before it
        }
    }

    const_assert_eq!(size_of::<FUSA_TEST_RESULT>(), 48);

    impl Default for FUSA_TEST_RESULT {
        fn default() -> Self {
            Self {
                test_number: 0u32.into(),
                total_checks: 0u32.into(),
                test_result: FusaTestStatus::NotRun as u8,
                reserved_byte: [0; 3],
                check_results: [FusaTestStatus::NotRun as u8;
                    FUSA_CHECK_RESULTS_COUNT],
                crc32: 0u32.into(), // probably invalid
            }
        }
    }

    impl FUSA_TEST_RESULT {
        pub fn new(test_number: FusaTestNumber) -> Self {
            Self::default().with_test_number(test_number)
        }

        /// Status of the check at INDEX.
        pub fn check_result(&self, index: usize) -> Result<FusaTestStatus> {
            let value = *self.check_results.get(index).ok_or(
                Error::FieldOverflow {
                    field: "FUSA_TEST_RESULT::check_results",
                    value: u32::try_from(index).unwrap_or(u32::MAX),
                },
            )?;
            value.get1("FUSA_TEST_RESULT::check_results")
        }

        pub fn set_check_result(
            &mut self,
            index: usize,
            value: FusaTestStatus,
        ) -> Result<()> {
            let slot = self.check_results.get_mut(index).ok_or(
                Error::FieldOverflow {
                    field: "FUSA_TEST_RESULT::check_results",
                    value: u32::try_from(index).unwrap_or(u32::MAX),
                },
            )?;
            slot.set1(value);
            Ok(())
        }

        /// Statuses of the checks that were performed, in order.
        pub fn checks(
            &self,
        ) -> impl Iterator<Item = Result<FusaTestStatus>> + '_ {
            let total = (self.total_checks.get() as usize)
                .min(FUSA_CHECK_RESULTS_COUNT);
            (0..total).map(move |i| self.check_result(i))
        }

        /// Conformance check.  Does not look at the checksum.
        pub fn validate(&self) -> Result<()> {
            self.test_number()?;
            self.test_result()?;
            let total_checks = self.total_checks.get();
            if total_checks as usize > FUSA_CHECK_RESULTS_COUNT {
                return Err(Error::InvalidField {
                    field: "FUSA_TEST_RESULT::total_checks",
                    value: total_checks,
                });
            }
            if self.reserved_byte != [0; 3] {
                return Err(Error::InvalidField {
                    field: "FUSA_TEST_RESULT::reserved_byte",
                    value: u32::from_le_bytes([
                        self.reserved_byte[0],
                        self.reserved_byte[1],
                        self.reserved_byte[2],
                        0,
                    ]),
                });
            }
            for i in 0..FUSA_CHECK_RESULTS_COUNT {
                self.check_result(i)?;
            }
            Ok(())
        }

        /// The bytes the checksum is computed over.
        pub fn checksummed_bytes(&self) -> &[u8] {
            &self.as_bytes()[..offset_of!(FUSA_TEST_RESULT, crc32)]
        }

        pub fn compute_crc32<C: Crc32 + ?Sized>(&self, crc: &C) -> u32 {
            crc.crc32(self.checksummed_bytes())
        }

        pub fn verify_crc32<C: Crc32 + ?Sized>(&self, crc: &C) -> Result<()> {
            let stored = self.crc32.get();
            let computed = self.compute_crc32(crc);
            if stored == computed {
                Ok(())
            } else {
                Err(Error::ChecksumMismatch {
                    test_number: self.test_number.get(),
                    stored,
                    computed,
                })
            }
        }

        pub fn update_crc32<C: Crc32 + ?Sized>(&mut self, crc: &C) {
            let computed = self.compute_crc32(crc);
            self.crc32.set(computed);
        }
    }

    make_accessors! {
        /// The FUSA_INFO_HOB starts with this; it is followed by
        /// FusaTestNumber::TOTAL instances of FUSA_TEST_RESULT.
        #[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
        #[repr(C, packed)]
        pub struct FUSA_INFO_HOB_HEADER {
            pub(crate) version: U32<LittleEndian> : pub get u32 : pub set u32,
        }
    }

    impl Default for FUSA_INFO_HOB_HEADER {
        fn default() -> Self {
            Self { version: FUSA_INFO_VERSION.into() }
        }
    }

    pub const FUSA_INFO_HOB_SIZE: usize = size_of::<FUSA_INFO_HOB_HEADER>()
        + FusaTestNumber::TOTAL * size_of::<FUSA_TEST_RESULT>();

    const_assert_eq!(FusaTestNumber::TOTAL, 55);
    const_assert_eq!(FUSA_INFO_HOB_SIZE, 2644);
}

pub mod gpio {
    use modular_bitfield::prelude::*;
    use num_derive::{FromPrimitive, ToPrimitive};

    /// For any GPIO pad number use this type.
    pub type GpioPad = u32;
    /// For any GPIO group number use this type.
    pub type GpioGroup = u32;

    /// Pad configuration, as consumed by the FSP GPIO library.
    /// The field widths add up to two 32 bit words.  No field straddles
    /// the boundary between the words, so the bit positions within the
    /// little-endian u64 are the ones listed in GpioConfigField.
    #[bitfield(bits = 64)]
    #[repr(u64)]
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GPIO_CONFIG {
        pub pad_mode: B5,
        pub host_soft_pad_own: B2,
        pub direction: B6,
        pub output_state: B2,
        pub interrupt_config: B9,
        pub power_config: B8,
        pub electrical_config: B9,
        pub lock_config: B4,
        pub other_settings: B2,
        pub rsvd_bits: B17, // 0
    }

    impl Default for GPIO_CONFIG {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Explicit bit layout of GPIO_CONFIG.
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub enum GpioConfigField {
        PadMode,
        HostSoftPadOwn,
        Direction,
        OutputState,
        InterruptConfig,
        PowerConfig,
        ElectricalConfig,
        LockConfig,
        OtherSettings,
        RsvdBits,
    }

    impl GpioConfigField {
        pub const ALL: [Self; 10] = [
            Self::PadMode,
            Self::HostSoftPadOwn,
            Self::Direction,
            Self::OutputState,
            Self::InterruptConfig,
            Self::PowerConfig,
            Self::ElectricalConfig,
            Self::LockConfig,
            Self::OtherSettings,
            Self::RsvdBits,
        ];

        pub const fn name(self) -> &'static str {
            match self {
                Self::PadMode => "PadMode",
                Self::HostSoftPadOwn => "HostSoftPadOwn",
                Self::Direction => "Direction",
                Self::OutputState => "OutputState",
                Self::InterruptConfig => "InterruptConfig",
                Self::PowerConfig => "PowerConfig",
                Self::ElectricalConfig => "ElectricalConfig",
                Self::LockConfig => "LockConfig",
                Self::OtherSettings => "OtherSettings",
                Self::RsvdBits => "RsvdBits",
            }
        }

        /// Bit position within the little-endian u64.
        pub const fn offset(self) -> u32 {
            match self {
                Self::PadMode => 0,
                Self::HostSoftPadOwn => 5,
                Self::Direction => 7,
                Self::OutputState => 13,
                Self::InterruptConfig => 15,
                Self::PowerConfig => 24,
                Self::ElectricalConfig => 32,
                Self::LockConfig => 41,
                Self::OtherSettings => 45,
                Self::RsvdBits => 47,
            }
        }

        pub const fn width(self) -> u32 {
            match self {
                Self::PadMode => 5,
                Self::HostSoftPadOwn => 2,
                Self::Direction => 6,
                Self::OutputState => 2,
                Self::InterruptConfig => 9,
                Self::PowerConfig => 8,
                Self::ElectricalConfig => 9,
                Self::LockConfig => 4,
                Self::OtherSettings => 2,
                Self::RsvdBits => 17,
            }
        }

        /// Mask of the field, not shifted.
        pub const fn value_mask(self) -> u32 {
            (1u32 << self.width()) - 1
        }

        /// Mask of the field within the u64.
        pub const fn mask(self) -> u64 {
            (self.value_mask() as u64) << self.offset()
        }
    }

    /// Mask for GpioIntConfig for the interrupt source
    pub const GPIO_INT_CONFIG_INT_SOURCE_MASK: u16 = 0x1F;
    /// Mask for GpioIntConfig for the interrupt type
    pub const GPIO_INT_CONFIG_INT_TYPE_MASK: u16 = 0xE0;
    /// Mask for GpioElectricalConfig for the termination value
    pub const GPIO_ELECTRICAL_CONFIG_TERMINATION_MASK: u16 = 0x1F;
    /// Mask for GpioElectricalConfig for the 1.8 V tolerance setting
    pub const GPIO_ELECTRICAL_CONFIG_1V8_TOLERANCE_MASK: u16 = 0x60;
    /// Mask for GpioLockConfig for the pad configuration lock
    pub const GPIO_LOCK_CONFIG_PAD_CONF_LOCK_MASK: u8 = 0x3;
    /// Mask for GpioLockConfig for the pad output lock
    pub const GPIO_LOCK_CONFIG_OUTPUT_LOCK_MASK: u8 = 0x5;
    /// Mask for GpioOtherConfig for the RxRaw1 setting
    pub const GPIO_OTHER_CONFIG_RXRAW_MASK: u8 = 0x3;

    /// Value 0 of every GPIO enum: leave the setting as it is in hardware.
    pub const GPIO_HARDWARE_DEFAULT: u8 = 0x0;

    macro_rules! gpio_enum {(
        $(#[$enum_meta:meta])*
        pub enum $EnumName:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => (
        $(#[$enum_meta])*
        #[derive(
            Debug, Default, PartialEq, Eq, Clone, Copy, FromPrimitive,
            ToPrimitive,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
        #[repr(u8)]
        pub enum $EnumName {
            $(
                $(#[$variant_meta])*
                $variant = $value,
            )*
        }
    )}

    gpio_enum! {
        /// Native modes make Direction (except inversion), OutputState,
        /// InterruptConfig, HostSoftPadOwn and the output lock meaningless.
        pub enum GpioPadMode {
            #[default]
            HardwareDefault = GPIO_HARDWARE_DEFAULT,
            Gpio = 0x1,
            Native1 = 0x3,
            Native2 = 0x5,
            Native3 = 0x7,
            Native4 = 0x9,
        }
    }

    gpio_enum! {
        /// Host software pad ownership.  Selects which interrupt status
        /// registers the pad updates.
        pub enum GpioHostSwOwn {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            /// Pad is not used by the GPIO OS driver.  Required for
            /// SCI/SMI/NMI generation.
            Acpi = 0x1,
            /// Pad is controlled by the GPIO OS driver (through an ACPI
            /// GpioIo/GpioInt descriptor).
            Gpio = 0x3,
        }
    }

    gpio_enum! {
        /// Bit 0 and 1 choose input/output enable, bit 3 and 4 the input
        /// inversion.
        pub enum GpioDirection {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            InOut = 0x1 | (0x1 << 3),
            InInvOut = 0x1 | (0x3 << 3),
            In = 0x3 | (0x1 << 3),
            InInv = 0x3 | (0x3 << 3),
            Out = 0x5,
            None = 0x7,
        }
    }

    gpio_enum! {
        /// Only relevant if output is enabled.
        pub enum GpioOutputState {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            Low = 0x1,
            High = 0x3,
        }
    }

    gpio_enum! {
        /// Interrupt routing; bits 0 to 4 of InterruptConfig.
        pub enum GpioIntSource {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            /// No IOxAPIC/SCI/SMI/NMI generation.
            Dis = 0x1,
            Nmi = 0x3,
            Smi = 0x5,
            Sci = 0x9,
            /// IOxAPIC interrupts cannot be shared and their IRQ number is
            /// fixed per pad.
            Apic = 0x11,
        }
    }

    gpio_enum! {
        /// Interrupt trigger; bits 5 to 7 of InterruptConfig.
        pub enum GpioIntTrigger {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            Level = 0x1 << 5,
            /// Which edge depends on the input inversion.
            Edge = 0x3 << 5,
            LvlEdgDis = 0x5 << 5,
            BothEdge = 0x7 << 5,
        }
    }

    gpio_enum! {
        /// Pad reset domain (PADCFG_DW0.PadRstCfg): which events reset the
        /// pad configuration.
        pub enum GpioResetConfig {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            /// Deprecated.  GPP: RSMRST; GPD: DSW_PWROK.
            PwrGood = 0x09,
            /// Deprecated.  Deep GPIO Reset.
            Deep = 0x0B,
            /// Deprecated.  GPIO Reset.
            Normal = 0x0D,
            /// Deprecated.  GPP: reserved; GPD: RSMRST.
            Resume = 0x0F,
            /// Reset on DeepSx and G3.
            ResumeReset = 0x01,
            /// Reset on warm/cold/global reset, DeepSx and G3.
            HostDeepReset = 0x03,
            /// Reset on S3/S4/S5, warm/cold/global reset, DeepSx and G3.
            PlatformReset = 0x05,
            /// Reset on G3 only (GPD).
            DswReset = 0x07,
        }
    }

    gpio_enum! {
        /// Termination; bits 0 to 4 of ElectricalConfig.
        pub enum GpioTermination {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            None = 0x1,
            Wpd5K = 0x5,
            Wpd20K = 0x9,
            Wpu1K = 0x13,
            Wpu2K = 0x17,
            Wpu5K = 0x15,
            Wpu20K = 0x19,
            Wpu1K2K = 0x1B,
            /// Termination is controlled by the native function.
            Native = 0x1F,
        }
    }

    gpio_enum! {
        /// 1.8 V pad tolerance; bits 5 and 6 of ElectricalConfig.
        pub enum GpioTolerance1v8 {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            NoTolerance1v8 = 0x1 << 5,
            Tolerance1v8 = 0x3 << 5,
        }
    }

    gpio_enum! {
        /// Lock settings are reset in the Powergood domain, regardless of
        /// the pad reset domain.
        pub enum GpioLockConfig {
            #[default]
            Default = GPIO_HARDWARE_DEFAULT,
            PadConfigLock = 0x3,
            OutputStateLock = 0x5,
            PadConfigAndOutputStateLock = 0x3 | 0x5,
        }
    }

    gpio_enum! {
        /// RX raw override to '1'.  Applies in input mode, before RXINV.
        pub enum GpioOtherConfig {
            #[default]
            RxRaw1Default = GPIO_HARDWARE_DEFAULT,
            RxRaw1Dis = 0x1,
            RxRaw1En = 0x3,
        }
    }
}
