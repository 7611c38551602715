use crate::ondisk::fusa::{
    Crc32, FusaTestNumber, FusaTestStatus, FUSA_INFO_HOB_HEADER,
    FUSA_INFO_VERSION, FUSA_TEST_RESULT,
};
use crate::ondisk::{take_header_from_collection, take_header_from_collection_mut};
use crate::types::{Error, FileSystemError, Result};
use core::mem::size_of;
use zerocopy::LayoutVerified;

const RESULTS_SIZE: usize =
    FusaTestNumber::TOTAL * size_of::<FUSA_TEST_RESULT>();

fn check_version(header: &FUSA_INFO_HOB_HEADER) -> Result<()> {
    let version = header.version()?;
    if version != FUSA_INFO_VERSION {
        log::warn!(
            "FuSa info HOB version {:#x} is not the supported {:#x}; ignoring it",
            version,
            FUSA_INFO_VERSION
        );
        return Err(Error::VersionMismatch {
            expected: FUSA_INFO_VERSION,
            actual: version,
        });
    }
    Ok(())
}

/// The position of each result in the HOB has to be its test number.
fn check_positions(results: &[FUSA_TEST_RESULT]) -> Result<()> {
    for (position, result) in results.iter().enumerate() {
        let test_number = result.test_number.get();
        if test_number as usize != position {
            log::warn!(
                "FuSa test result at position {} claims test number {}",
                position,
                test_number
            );
            return Err(Error::TestNumberMismatch { position, test_number });
        }
    }
    Ok(())
}

/// Number of tests per outcome.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct FusaSummary {
    pub not_run: usize,
    pub passed: usize,
    pub failed: usize,
    pub device_not_available: usize,
}

impl FusaSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
    pub fn total(&self) -> usize {
        self.not_run + self.passed + self.failed + self.device_not_available
    }
}

/// Read-only view of a FUSA_INFO_HOB.
#[derive(Debug, Clone, Copy)]
pub struct FusaInfoHob<'a> {
    header: &'a FUSA_INFO_HOB_HEADER,
    results: &'a [FUSA_TEST_RESULT],
}

impl<'a> FusaInfoHob<'a> {
    pub const SIZE: usize = crate::ondisk::fusa::FUSA_INFO_HOB_SIZE;

    /// Refuses HOBs of any other version than FUSA_INFO_VERSION before
    /// looking at the results.
    pub fn load(buf: &'a [u8]) -> Result<Self> {
        let mut buf = buf;
        let header =
            take_header_from_collection::<FUSA_INFO_HOB_HEADER>(&mut buf)
                .ok_or(Error::FileSystem(
                    FileSystemError::PayloadTooSmall,
                    "FUSA_INFO_HOB_HEADER::version",
                ))?;
        check_version(header)?;
        let body = buf.get(..RESULTS_SIZE).ok_or(Error::FileSystem(
            FileSystemError::PayloadTooSmall,
            "FUSA_INFO_HOB::results",
        ))?;
        let results =
            LayoutVerified::<_, [FUSA_TEST_RESULT]>::new_slice_unaligned(body)
                .ok_or(Error::FileSystem(
                    FileSystemError::InconsistentHeader,
                    "FUSA_INFO_HOB::results",
                ))?
                .into_slice();
        check_positions(results)?;
        log::debug!("FuSa info HOB with {} test results", results.len());
        Ok(Self { header, results })
    }

    pub fn version(&self) -> u32 {
        self.header.version.get()
    }

    pub fn results(&self) -> core::slice::Iter<'a, FUSA_TEST_RESULT> {
        self.results.iter()
    }

    pub fn result(&self, test_number: FusaTestNumber) -> &'a FUSA_TEST_RESULT {
        &self.results[test_number.index()]
    }

    /// Status of TEST_NUMBER as a whole.
    pub fn status(&self, test_number: FusaTestNumber) -> Result<FusaTestStatus> {
        self.result(test_number).test_result()
    }

    /// Conformance check of every result.  Does not look at checksums.
    pub fn validate(&self) -> Result<()> {
        for result in self.results {
            result.validate()?;
        }
        Ok(())
    }

    pub fn verify_checksums<C: Crc32 + ?Sized>(&self, crc: &C) -> Result<()> {
        for result in self.results {
            if let Err(e) = result.verify_crc32(crc) {
                log::warn!("FuSa test result checksum: {:?}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> Result<FusaSummary> {
        let mut summary = FusaSummary::default();
        for result in self.results {
            match result.test_result()? {
                FusaTestStatus::NotRun => summary.not_run += 1,
                FusaTestStatus::Pass => summary.passed += 1,
                FusaTestStatus::Fail => summary.failed += 1,
                FusaTestStatus::DeviceNotAvailable => {
                    summary.device_not_available += 1
                }
            }
        }
        Ok(summary)
    }

    /// Tests whose overall result is Fail.
    pub fn failed_tests(&self) -> impl Iterator<Item = FusaTestNumber> + 'a {
        let results = self.results;
        FusaTestNumber::iter().filter(move |number| {
            matches!(
                results[number.index()].test_result(),
                Ok(FusaTestStatus::Fail)
            )
        })
    }
}

/// Mutable view of a FUSA_INFO_HOB.
#[derive(Debug)]
pub struct FusaInfoHobMut<'a> {
    header: &'a mut FUSA_INFO_HOB_HEADER,
    results: &'a mut [FUSA_TEST_RESULT],
}

impl<'a> FusaInfoHobMut<'a> {
    fn split(buf: &'a mut [u8]) -> Result<Self> {
        let mut buf = buf;
        let header =
            take_header_from_collection_mut::<FUSA_INFO_HOB_HEADER>(&mut buf)
                .ok_or(Error::OutOfSpace)?;
        let body = buf.get_mut(..RESULTS_SIZE).ok_or(Error::OutOfSpace)?;
        let results =
            LayoutVerified::<_, [FUSA_TEST_RESULT]>::new_slice_unaligned(body)
                .ok_or(Error::FileSystem(
                    FileSystemError::InconsistentHeader,
                    "FUSA_INFO_HOB::results",
                ))?
                .into_mut_slice();
        Ok(Self { header, results })
    }

    /// Lays out a new HOB in BUF: current version, every test not run.
    /// Checksums are left at 0; see update_checksums.
    pub fn create(buf: &'a mut [u8]) -> Result<Self> {
        let hob = Self::split(buf)?;
        *hob.header = FUSA_INFO_HOB_HEADER::default();
        for (result, number) in hob.results.iter_mut().zip(FusaTestNumber::iter())
        {
            *result = FUSA_TEST_RESULT::new(number);
        }
        Ok(hob)
    }

    /// Like FusaInfoHob::load, the version is checked before the length.
    pub fn load(buf: &'a mut [u8]) -> Result<Self> {
        let mut header_buf: &[u8] = buf;
        let header =
            take_header_from_collection::<FUSA_INFO_HOB_HEADER>(&mut header_buf)
                .ok_or(Error::FileSystem(
                    FileSystemError::PayloadTooSmall,
                    "FUSA_INFO_HOB_HEADER::version",
                ))?;
        check_version(header)?;
        if buf.len() < FusaInfoHob::SIZE {
            return Err(Error::FileSystem(
                FileSystemError::PayloadTooSmall,
                "FUSA_INFO_HOB",
            ));
        }
        let hob = Self::split(buf)?;
        check_positions(hob.results)?;
        Ok(hob)
    }

    pub fn as_hob(&self) -> FusaInfoHob<'_> {
        FusaInfoHob { header: &*self.header, results: &*self.results }
    }

    pub fn result_mut(
        &mut self,
        test_number: FusaTestNumber,
    ) -> &mut FUSA_TEST_RESULT {
        &mut self.results[test_number.index()]
    }

    pub fn update_checksums<C: Crc32 + ?Sized>(&mut self, crc: &C) {
        for result in self.results.iter_mut() {
            result.update_crc32(crc);
        }
    }
}
