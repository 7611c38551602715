// This file contains the serializers for the ondisk formats.
// These are meant automatically make serde use a temporary serde-aware struct
// as a proxy when serializing/deserializing a non-serde-aware struct. Note that
// if too many fields are private, it means that those are not in the proxy
// struct in the first place. This might cause problems. Also, serialization can
// fail if the nice simple user-visible type cannot represent what we are doing.

use crate::ondisk::fusa::{
    FusaTestNumber, FusaTestStatus, FUSA_CHECK_RESULTS_COUNT, FUSA_TEST_RESULT,
};
use crate::ondisk::FSP_INFO_HOB;
use serde::{Deserialize, Serialize};

// Note: This is written such that it will fail if the underlying struct has
// fields added/removed/renamed--if those have a public setter.
macro_rules! make_serde{($StructName:ident, $SerdeStructName:ident, [$($field_name:ident),* $(,)?]
) => (
    paste::paste!{
        impl<'de> serde::de::Deserialize<'de> for $StructName {
            fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
            where D: serde::de::Deserializer<'de>, {
                let config = $SerdeStructName::deserialize(deserializer)?;
                Ok($StructName::default()
                $(
                .[<with_ $field_name>](config.$field_name.into())
                )*)
                }
        }
        impl serde::Serialize for $StructName {
            fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
            where S: serde::Serializer, {
                $SerdeStructName {
                    $(
                        $field_name: self.$field_name().map_err(|_| serde::ser::Error::custom("value unknown"))?.into(),
                    )*
                }.serialize(serializer)
            }
        }
        #[cfg(feature = "schemars")]
        impl schemars::JsonSchema for $StructName {
            fn schema_name() -> String {
                <$SerdeStructName as schemars::JsonSchema>::schema_name()
            }
            fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
                <$SerdeStructName as schemars::JsonSchema>::json_schema(gen)
            }
        }
    }
)}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename = "FSP_INFO_HOB")]
pub(crate) struct SerdeFspInfoHob {
    silicon_init_version_major: u8,
    silicon_init_version_minor: u8,
    silicon_init_version_revision: u8,
    silicon_init_version_build: u8,
    fsp_version_revision: u8,
    fsp_version_build: u8,
    time_stamp: [u8; 12],
    fsp_version_minor: u8,
}

make_serde!(
    FSP_INFO_HOB,
    SerdeFspInfoHob,
    [
        silicon_init_version_major,
        silicon_init_version_minor,
        silicon_init_version_revision,
        silicon_init_version_build,
        fsp_version_revision,
        fsp_version_build,
        time_stamp,
        fsp_version_minor,
    ]
);

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename = "FUSA_TEST_RESULT")]
pub(crate) struct SerdeFusaTestResult {
    test_number: FusaTestNumber,
    total_checks: u32,
    test_result: FusaTestStatus,
    check_results: [u8; FUSA_CHECK_RESULTS_COUNT],
    crc32: u32,
}

make_serde!(
    FUSA_TEST_RESULT,
    SerdeFusaTestResult,
    [test_number, total_checks, test_result, check_results, crc32,]
);
