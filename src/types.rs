#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[non_exhaustive]
pub enum FileSystemError {
    #[cfg_attr(feature = "std", error("inconsistent header"))]
    InconsistentHeader,
    #[cfg_attr(feature = "std", error("payload too small"))]
    PayloadTooSmall,
    #[cfg_attr(feature = "std", error("payload too big"))]
    PayloadTooBig,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[non_exhaustive]
pub enum Error {
    #[cfg_attr(
        feature = "std",
        error("version mismatch: expected {expected:#x}, got {actual:#x}")
    )]
    VersionMismatch { expected: u32, actual: u32 },
    #[cfg_attr(feature = "std", error("invalid value {value:#x} in {field}"))]
    InvalidField { field: &'static str, value: u32 },
    #[cfg_attr(
        feature = "std",
        error("value {value:#x} does not fit into {field}")
    )]
    FieldOverflow { field: &'static str, value: u32 },
    #[cfg_attr(
        feature = "std",
        error("checksum mismatch in test {test_number}: stored {stored:#010x}, computed {computed:#010x}")
    )]
    ChecksumMismatch { test_number: u32, stored: u32, computed: u32 },
    #[cfg_attr(
        feature = "std",
        error("test result at position {position} claims test number {test_number}")
    )]
    TestNumberMismatch { position: usize, test_number: u32 },
    #[cfg_attr(feature = "std", error("file system error {0}: {1}"))]
    FileSystem(FileSystemError, &'static str), // error, field name
    #[cfg_attr(feature = "std", error("out of space"))]
    OutOfSpace,
}

pub type Result<Q> = core::result::Result<Q, Error>;
