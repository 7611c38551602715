use crate::ondisk::{take_header_from_collection, take_header_from_collection_mut, FSP_INFO_HOB};
use crate::types::{Error, FileSystemError, Result};
use core::fmt;
use zerocopy::AsBytes;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct SiliconInitVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
    pub build: u8,
}

impl fmt::Display for SiliconInitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.revision, self.build)
    }
}

/// The HOB does not carry a major version for the FSP.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct FspVersion {
    pub minor: u8,
    pub revision: u8,
    pub build: u8,
}

impl fmt::Display for FspVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.minor, self.revision, self.build)
    }
}

impl FSP_INFO_HOB {
    /// Interprets the beginning of BUF as FSP_INFO_HOB.  Trailing bytes
    /// (HOB padding) are ignored.
    pub fn load(buf: &[u8]) -> Result<&Self> {
        let mut buf = buf;
        let result = take_header_from_collection::<Self>(&mut buf).ok_or(
            Error::FileSystem(FileSystemError::PayloadTooSmall, "FSP_INFO_HOB"),
        )?;
        log::debug!(
            "FSP_INFO_HOB: silicon init {}, FSP {}, {} trailing bytes",
            result.silicon_init_version(),
            result.fsp_version(),
            buf.len()
        );
        Ok(result)
    }

    pub fn load_mut(buf: &mut [u8]) -> Result<&mut Self> {
        let mut buf = buf;
        take_header_from_collection_mut::<Self>(&mut buf).ok_or(
            Error::FileSystem(FileSystemError::PayloadTooSmall, "FSP_INFO_HOB"),
        )
    }

    /// Writes the HOB to the beginning of BUF.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<()> {
        let bytes = self.as_bytes();
        let target = buf.get_mut(..bytes.len()).ok_or(Error::OutOfSpace)?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    pub fn silicon_init_version(&self) -> SiliconInitVersion {
        SiliconInitVersion {
            major: self.silicon_init_version_major,
            minor: self.silicon_init_version_minor,
            revision: self.silicon_init_version_revision,
            build: self.silicon_init_version_build,
        }
    }

    pub fn set_silicon_init_version(&mut self, value: SiliconInitVersion) {
        self.set_silicon_init_version_major(value.major);
        self.set_silicon_init_version_minor(value.minor);
        self.set_silicon_init_version_revision(value.revision);
        self.set_silicon_init_version_build(value.build);
    }

    #[must_use]
    pub fn with_silicon_init_version(mut self, value: SiliconInitVersion) -> Self {
        self.set_silicon_init_version(value);
        self
    }

    pub fn fsp_version(&self) -> FspVersion {
        FspVersion {
            minor: self.fsp_version_minor,
            revision: self.fsp_version_revision,
            build: self.fsp_version_build,
        }
    }

    pub fn set_fsp_version(&mut self, value: FspVersion) {
        self.set_fsp_version_minor(value.minor);
        self.set_fsp_version_revision(value.revision);
        self.set_fsp_version_build(value.build);
    }

    #[must_use]
    pub fn with_fsp_version(mut self, value: FspVersion) -> Self {
        self.set_fsp_version(value);
        self
    }

    /// The time stamp up to the first NUL (or all 12 Byte if there is
    /// none).  None if that is not UTF-8.
    pub fn time_stamp_str(&self) -> Option<&str> {
        let time_stamp: &[u8; 12] = &self.time_stamp;
        let len = time_stamp.iter().position(|&b| b == 0).unwrap_or(time_stamp.len());
        core::str::from_utf8(&time_stamp[..len]).ok()
    }
}
