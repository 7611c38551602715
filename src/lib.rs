//! Layouts of the FSP information HOB, the FuSa test result HOB and the
//! GPIO pad configuration, with helpers to read, check and build them.

#![cfg_attr(not(feature = "std"), no_std)]

mod fsp_info;
mod fusa;
mod gpio;
pub mod ondisk;
#[cfg(feature = "serde")]
mod serializers;
mod struct_accessors;
mod tests;
mod types;

pub use fsp_info::{FspVersion, SiliconInitVersion};
pub use fusa::{FusaInfoHob, FusaInfoHobMut, FusaSummary};
pub use gpio::{GpioConfig, GpioElectricalConfig, GpioIntConfig};
pub use ondisk::fusa::{
    Crc32, FusaTestNumber, FusaTestStatus, FUSA_INFO_VERSION,
    FUSA_TEST_RESULT,
};
pub use ondisk::gpio::{
    GpioConfigField, GpioDirection, GpioHostSwOwn, GpioIntSource,
    GpioIntTrigger, GpioLockConfig, GpioOtherConfig, GpioOutputState,
    GpioPad, GpioPadMode, GpioResetConfig, GpioTermination, GpioTolerance1v8,
    GPIO_CONFIG,
};
pub use ondisk::FSP_INFO_HOB;
pub use types::{Error, FileSystemError, Result};
