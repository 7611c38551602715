#[cfg(test)]
mod tests {
    use crate::ondisk::fusa::{FUSA_INFO_HOB_SIZE, FUSA_TEST_RESULT};
    use crate::ondisk::gpio::{
        GpioConfigField, GPIO_CONFIG, GPIO_INT_CONFIG_INT_SOURCE_MASK,
        GPIO_INT_CONFIG_INT_TYPE_MASK,
    };
    use crate::{
        Error, FileSystemError, FusaInfoHob, FusaInfoHobMut, FusaSummary,
        FusaTestNumber, FusaTestStatus, GpioConfig, GpioDirection,
        GpioElectricalConfig, GpioHostSwOwn, GpioIntConfig, GpioIntSource,
        GpioIntTrigger, GpioLockConfig, GpioOtherConfig, GpioOutputState,
        GpioPadMode, GpioResetConfig, GpioTermination, GpioTolerance1v8,
        FUSA_INFO_VERSION,
    };
    use num_traits::FromPrimitive;
    use zerocopy::LayoutVerified;

    fn checksum(bytes: &[u8]) -> u32 {
        bytes
            .iter()
            .fold(0x1234_5678u32, |acc, &b| acc.rotate_left(5) ^ u32::from(b))
    }

    fn result_from(bytes: &[u8]) -> FUSA_TEST_RESULT {
        *LayoutVerified::<_, FUSA_TEST_RESULT>::new_unaligned(bytes)
            .unwrap()
            .into_ref()
    }

    fn gpio_in() -> GpioConfig {
        GpioConfig {
            pad_mode: GpioPadMode::Gpio,
            direction: GpioDirection::In,
            ..Default::default()
        }
    }

    fn busy_config() -> GpioConfig {
        GpioConfig {
            pad_mode: GpioPadMode::Native2,
            host_soft_pad_own: GpioHostSwOwn::Acpi,
            direction: GpioDirection::InInvOut,
            output_state: GpioOutputState::High,
            interrupt_config: GpioIntConfig::new(
                GpioIntSource::Sci,
                GpioIntTrigger::BothEdge,
            ),
            power_config: GpioResetConfig::PlatformReset,
            electrical_config: GpioElectricalConfig::new(
                GpioTermination::Wpu20K,
                GpioTolerance1v8::Tolerance1v8,
            ),
            lock_config: GpioLockConfig::PadConfigAndOutputStateLock,
            other_settings: GpioOtherConfig::RxRaw1En,
        }
    }

    #[test]
    fn encode_gpio_input() {
        let raw = gpio_in().encode();
        assert_eq!(raw.pad_mode(), 0x1);
        assert_eq!(raw.direction(), 0x3 | (0x1 << 3));
        assert_eq!(raw.rsvd_bits(), 0);
        assert_eq!(u64::from(raw), 0x1 | (0xB << 7));
        assert_eq!(gpio_in().to_bytes(), [0x81, 0x05, 0, 0, 0, 0, 0, 0]);
        assert_eq!(GpioConfig::decode(raw).unwrap(), gpio_in());
    }

    #[test]
    fn encode_hardware_default() {
        let config = GpioConfig::default();
        assert!(config.is_hardware_default());
        assert_eq!(config.to_word(), 0);
        assert_eq!(GpioConfig::from_word(0).unwrap(), config);
    }

    #[test]
    fn decode_busy_config() -> Result<(), Error> {
        let config = busy_config();
        let raw = GPIO_CONFIG::from(config);
        assert_eq!(raw.interrupt_config(), 0x09 | 0xE0);
        assert_eq!(raw.electrical_config(), 0x19 | 0x60);
        assert_eq!(raw.lock_config(), 0x7);
        assert_eq!(raw.field(GpioConfigField::PowerConfig), 0x05);
        assert_eq!(u64::from(raw) >> 32, 0x79 | (0x7 << 9) | (0x3 << 13));
        raw.validate()?;
        assert_eq!(GpioConfig::try_from(raw)?, config);
        assert_eq!(GpioConfig::from_bytes(config.to_bytes())?, config);
        Ok(())
    }

    #[test]
    fn decode_masks_interrupt_config() {
        let words = [
            0u64,
            u64::MAX,
            0x1 | (0xB << 7) | (0x31 << 15),
            0x0123_4567_89AB_CDEF,
            0xFF80_0000,
        ];
        for word in words {
            let raw = GPIO_CONFIG::from(word);
            let interrupt_config = ((word >> 15) & 0x1FF) as u16;
            assert_eq!(raw.interrupt_config(), interrupt_config);
            assert_eq!(
                raw.interrupt_config() & GPIO_INT_CONFIG_INT_SOURCE_MASK,
                interrupt_config & 0x1F
            );
            assert_eq!(
                raw.interrupt_config() & GPIO_INT_CONFIG_INT_TYPE_MASK,
                interrupt_config & 0xE0
            );
            for field in GpioConfigField::ALL {
                assert_eq!(
                    u64::from(raw.field(field)),
                    (word >> field.offset()) & u64::from(field.value_mask())
                );
            }
        }
    }

    #[test]
    fn decode_encode_every_single_field_value() -> Result<(), Error> {
        for field in GpioConfigField::ALL {
            let mut legal = 0;
            for value in 0..=field.value_mask() {
                let raw = GPIO_CONFIG::new().with_field_checked(field, value)?;
                assert_eq!(raw.field(field), value);
                if let Ok(config) = GpioConfig::decode(raw) {
                    assert_eq!(config.encode(), raw, "{} {:#x}", field.name(), value);
                    legal += 1;
                }
            }
            // At least the hardware default.
            assert!(legal >= 1, "{}", field.name());
        }
        Ok(())
    }

    #[test]
    fn decode_masks_pseudo_random_words() {
        let mut word = 0x9E37_79B9_7F4A_7C15u64;
        for _ in 0..10_000 {
            word ^= word << 13;
            word ^= word >> 7;
            word ^= word << 17;
            let raw = GPIO_CONFIG::from(word);
            assert_eq!(u64::from(raw), word);
            let mut reassembled = 0u64;
            for field in GpioConfigField::ALL {
                let value = raw.field(field);
                assert_eq!(
                    u64::from(value),
                    (word >> field.offset()) & u64::from(field.value_mask())
                );
                reassembled |= u64::from(value) << field.offset();
            }
            assert_eq!(reassembled, word);
            assert_eq!(
                raw.interrupt_config() & GPIO_INT_CONFIG_INT_SOURCE_MASK,
                ((word >> 15) & 0x1F) as u16
            );
            assert_eq!(
                raw.interrupt_config() & GPIO_INT_CONFIG_INT_TYPE_MASK,
                ((word >> 15) & 0xE0) as u16
            );
            if let Ok(config) = GpioConfig::decode(raw) {
                assert_eq!(config.to_word(), word);
            }
        }
    }

    #[test]
    fn validate_rejects_unknown_direction() {
        let raw = GPIO_CONFIG::new().with_pad_mode(0x1).with_direction(0x2);
        assert_eq!(
            raw.validate(),
            Err(Error::InvalidField { field: "Direction", value: 0x2 })
        );
        assert_eq!(
            GpioConfig::decode(raw),
            Err(Error::InvalidField { field: "Direction", value: 0x2 })
        );
    }

    #[test]
    fn validate_rejects_unknown_interrupt_parts() {
        // Nmi | Smi is not a source.
        let raw = GPIO_CONFIG::new().with_interrupt_config(0x7 | 0x20);
        assert_eq!(
            raw.validate(),
            Err(Error::InvalidField { field: "InterruptConfig", value: 0x27 })
        );
        // 0x40 is not a trigger.
        let raw = GPIO_CONFIG::new().with_interrupt_config(0x11 | 0x40);
        assert_eq!(
            raw.validate(),
            Err(Error::InvalidField { field: "InterruptConfig", value: 0x51 })
        );
        // Bit 8 is outside both masks.
        let raw = GPIO_CONFIG::new().with_interrupt_config(0x100 | 0x11);
        assert!(matches!(
            raw.validate(),
            Err(Error::InvalidField { field: "InterruptConfig", .. })
        ));
        // Each half on its own is fine.
        GPIO_CONFIG::new().with_interrupt_config(0x11).validate().unwrap();
        GPIO_CONFIG::new().with_interrupt_config(0xA0).validate().unwrap();
    }

    #[test]
    fn validate_rejects_unknown_electrical_parts() {
        let raw = GPIO_CONFIG::new().with_electrical_config(0x3);
        assert_eq!(
            raw.validate(),
            Err(Error::InvalidField { field: "ElectricalConfig", value: 0x3 })
        );
        let raw = GPIO_CONFIG::new().with_electrical_config(0x80 | 0x1);
        assert!(raw.validate().is_err());
        let raw = GPIO_CONFIG::new().with_electrical_config(0x40 | 0x1);
        assert!(raw.validate().is_err());
        GPIO_CONFIG::new().with_electrical_config(0x1F | 0x20).validate().unwrap();
    }

    #[test]
    fn validate_rejects_other_fields() {
        let cases = [
            (GPIO_CONFIG::new().with_pad_mode(0x2), "PadMode", 0x2),
            (GPIO_CONFIG::new().with_host_soft_pad_own(0x2), "HostSoftPadOwn", 0x2),
            (GPIO_CONFIG::new().with_output_state(0x2), "OutputState", 0x2),
            (GPIO_CONFIG::new().with_power_config(0x02), "PowerConfig", 0x02),
            (GPIO_CONFIG::new().with_lock_config(0x1), "LockConfig", 0x1),
            (GPIO_CONFIG::new().with_other_settings(0x2), "OtherSettings", 0x2),
            (GPIO_CONFIG::new().with_rsvd_bits(0x1), "RsvdBits", 0x1),
        ];
        for (raw, field, value) in cases {
            assert_eq!(raw.validate(), Err(Error::InvalidField { field, value }));
        }
    }

    #[test]
    fn deprecated_reset_values_are_accepted() {
        for value in [0x09u8, 0x0B, 0x0D, 0x0F] {
            let raw = GPIO_CONFIG::new().with_power_config(value);
            let config = GpioConfig::decode(raw).unwrap();
            assert_eq!(config.power_config as u8, value);
        }
    }

    #[test]
    fn set_field_checks_width() -> Result<(), Error> {
        let raw = GPIO_CONFIG::new()
            .with_field_checked(GpioConfigField::PadMode, 0x1)?
            .with_field_checked(GpioConfigField::Direction, 0xB)?;
        assert_eq!(GpioConfig::decode(raw)?, gpio_in());
        assert_eq!(
            GPIO_CONFIG::new().with_field_checked(GpioConfigField::PadMode, 0x20),
            Err(Error::FieldOverflow { field: "PadMode", value: 0x20 })
        );
        assert_eq!(
            GPIO_CONFIG::new()
                .with_field_checked(GpioConfigField::InterruptConfig, 0x200),
            Err(Error::FieldOverflow { field: "InterruptConfig", value: 0x200 })
        );
        // Neighbours are left alone.
        let raw = GPIO_CONFIG::from(u64::MAX)
            .with_field_checked(GpioConfigField::LockConfig, 0)?;
        assert_eq!(u64::from(raw), !GpioConfigField::LockConfig.mask());
        Ok(())
    }

    #[test]
    fn merge_combines_sub_ranges() {
        let base = GpioConfig {
            interrupt_config: GpioIntConfig::new(
                GpioIntSource::Apic,
                GpioIntTrigger::Default,
            ),
            electrical_config: GpioElectricalConfig::new(
                GpioTermination::Default,
                GpioTolerance1v8::Tolerance1v8,
            ),
            ..gpio_in()
        };
        let overrides = GpioConfig {
            interrupt_config: GpioIntConfig::new(
                GpioIntSource::Default,
                GpioIntTrigger::Level,
            ),
            electrical_config: GpioElectricalConfig::new(
                GpioTermination::Wpd20K,
                GpioTolerance1v8::Default,
            ),
            ..Default::default()
        };
        let merged = base.merge(&overrides);
        assert_eq!(merged.pad_mode, GpioPadMode::Gpio);
        assert_eq!(merged.direction, GpioDirection::In);
        assert_eq!(
            merged.interrupt_config,
            GpioIntConfig::new(GpioIntSource::Apic, GpioIntTrigger::Level)
        );
        assert_eq!(
            merged.interrupt_config.to_raw(),
            base.interrupt_config.to_raw() | overrides.interrupt_config.to_raw()
        );
        assert_eq!(
            merged.electrical_config.to_raw(),
            base.electrical_config.to_raw()
                | overrides.electrical_config.to_raw()
        );
        assert_eq!(merged.to_word(), base.to_word() | overrides.to_word());
    }

    #[test]
    fn merge_overrides_non_default() {
        let base = busy_config();
        let overrides = GpioConfig {
            direction: GpioDirection::Out,
            interrupt_config: GpioIntConfig::new(
                GpioIntSource::Nmi,
                GpioIntTrigger::Default,
            ),
            ..Default::default()
        };
        let merged = base.merge(&overrides);
        assert_eq!(merged.direction, GpioDirection::Out);
        assert_eq!(merged.interrupt_config.source, GpioIntSource::Nmi);
        assert_eq!(merged.interrupt_config.trigger, GpioIntTrigger::BothEdge);
        merged.encode().validate().unwrap();
        assert_eq!(base.merge(&GpioConfig::default()), base);
        assert_eq!(GpioConfig::default().merge(&base), base);
    }

    #[test]
    fn lock_flags_accumulate() {
        let pad = GpioLockConfig::PadConfigLock;
        let output = GpioLockConfig::OutputStateLock;
        assert!(pad.locks_pad_config());
        assert!(!pad.locks_output_state());
        assert!(output.locks_output_state());
        assert!(!output.locks_pad_config());
        assert_eq!(pad | output, GpioLockConfig::PadConfigAndOutputStateLock);
        assert_eq!(pad as u8 | output as u8, (pad | output) as u8);
        assert_eq!(pad | GpioLockConfig::Default, pad);
        let base = GpioConfig { lock_config: pad, ..Default::default() };
        let overrides = GpioConfig { lock_config: output, ..Default::default() };
        assert_eq!(
            base.merge(&overrides).lock_config,
            GpioLockConfig::PadConfigAndOutputStateLock
        );
        assert!(GpioOtherConfig::RxRaw1En.overrides_rx_raw());
        assert!(!GpioOtherConfig::RxRaw1Dis.overrides_rx_raw());
    }

    #[test]
    fn fusa_status_accepts_only_known_bytes() {
        for byte in 0..=255u8 {
            let known = matches!(byte, 0x00 | 0x2D | 0xD2 | 0xFF);
            assert_eq!(FusaTestStatus::from_u8(byte).is_some(), known, "{:#x}", byte);
            let mut result = FUSA_TEST_RESULT::new(FusaTestNumber::Dip);
            result.set_check_result(3, FusaTestStatus::Pass).unwrap();
            let mut bytes = [0u8; 48];
            bytes.copy_from_slice(zerocopy::AsBytes::as_bytes(&result));
            bytes[8] = byte;
            let result = result_from(&bytes);
            assert_eq!(result.validate().is_ok(), known);
            if known {
                assert_eq!(result.test_result().unwrap() as u8, byte);
            }
        }
    }

    #[test]
    fn fusa_test_result_conformance() {
        let mut result = FUSA_TEST_RESULT::new(FusaTestNumber::Mc1Ch2Mbist)
            .with_total_checks(2)
            .with_test_result(FusaTestStatus::Fail);
        result.set_check_result(0, FusaTestStatus::Pass).unwrap();
        result.set_check_result(1, FusaTestStatus::Fail).unwrap();
        result.validate().unwrap();
        let checks = result.checks().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(checks, [FusaTestStatus::Pass, FusaTestStatus::Fail]);

        assert_eq!(
            result.check_result(32),
            Err(Error::FieldOverflow {
                field: "FUSA_TEST_RESULT::check_results",
                value: 32
            })
        );
        assert!(result.set_check_result(32, FusaTestStatus::Pass).is_err());
        assert_eq!(
            result.check_result(usize::MAX),
            Err(Error::FieldOverflow {
                field: "FUSA_TEST_RESULT::check_results",
                value: u32::MAX
            })
        );

        let mut check_results = result.check_results().unwrap();
        check_results[31] = 0x2C;
        let bad = result.with_check_results(check_results);
        assert_eq!(
            bad.validate(),
            Err(Error::InvalidField {
                field: "FUSA_TEST_RESULT::check_results",
                value: 0x2C
            })
        );

        let bad = result.with_total_checks(33);
        assert_eq!(
            bad.validate(),
            Err(Error::InvalidField {
                field: "FUSA_TEST_RESULT::total_checks",
                value: 33
            })
        );

        let mut bytes = [0u8; 48];
        bytes.copy_from_slice(zerocopy::AsBytes::as_bytes(&result));
        bytes[10] = 1;
        let bad = result_from(&bytes);
        assert_eq!(
            bad.validate(),
            Err(Error::InvalidField {
                field: "FUSA_TEST_RESULT::reserved_byte",
                value: 0x100
            })
        );

        let bad = result.with_crc32(0).with_test_number(FusaTestNumber::Iop);
        bad.validate().unwrap();
        bytes.copy_from_slice(zerocopy::AsBytes::as_bytes(&bad));
        bytes[0..4].copy_from_slice(&55u32.to_le_bytes());
        let bad = result_from(&bytes);
        assert_eq!(
            bad.validate(),
            Err(Error::InvalidField {
                field: "FUSA_TEST_RESULT::test_number",
                value: 55
            })
        );
    }

    #[test]
    fn fusa_test_result_checksum() {
        let mut result = FUSA_TEST_RESULT::new(FusaTestNumber::Cpu3Idi)
            .with_total_checks(1)
            .with_test_result(FusaTestStatus::Pass);
        result.set_check_result(0, FusaTestStatus::Pass).unwrap();
        assert_eq!(result.checksummed_bytes().len(), 44);

        result.update_crc32(&checksum);
        assert_eq!(
            result.crc32().unwrap(),
            checksum(&zerocopy::AsBytes::as_bytes(&result)[..44])
        );
        result.verify_crc32(&checksum).unwrap();

        let stored = result.crc32().unwrap();
        let tampered = result.with_test_result(FusaTestStatus::Fail);
        match tampered.verify_crc32(&checksum) {
            Err(Error::ChecksumMismatch { test_number, stored: s, computed }) => {
                assert_eq!(test_number, FusaTestNumber::Cpu3Idi as u32);
                assert_eq!(s, stored);
                assert_ne!(computed, stored);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn create_and_load_fusa_info_hob() -> Result<(), Error> {
        let mut buffer = [0xFFu8; FUSA_INFO_HOB_SIZE + 4];
        let mut hob = FusaInfoHobMut::create(&mut buffer[..])?;
        hob.result_mut(FusaTestNumber::Mc0Cmi)
            .set_test_result(FusaTestStatus::Pass);
        hob.result_mut(FusaTestNumber::Ibecc1Mbist)
            .set_test_result(FusaTestStatus::Fail);
        hob.result_mut(FusaTestNumber::Cpu7Idi)
            .set_test_result(FusaTestStatus::DeviceNotAvailable);
        hob.update_checksums(&checksum);
        assert_eq!(hob.as_hob().version(), FUSA_INFO_VERSION);

        assert_eq!(&buffer[0..4], &[0x00, 0x01, 0x00, 0x00]);
        // The result of test N is at 4 + 48 * N.
        let offset = 4 + 48 * FusaTestNumber::Ibecc1Mbist.index();
        assert_eq!(
            &buffer[offset..offset + 4],
            &(FusaTestNumber::Ibecc1Mbist as u32).to_le_bytes()
        );
        assert_eq!(buffer[offset + 8], 0xD2);
        assert_eq!(&buffer[FUSA_INFO_HOB_SIZE..], &[0xFF; 4]);

        let hob = FusaInfoHob::load(&buffer[..])?;
        hob.validate()?;
        hob.verify_checksums(&checksum)?;
        assert_eq!(hob.results().count(), FusaTestNumber::TOTAL);
        for (result, number) in hob.results().zip(FusaTestNumber::iter()) {
            assert_eq!(result.test_number()?, number);
        }
        assert_eq!(hob.status(FusaTestNumber::Mc0Cmi)?, FusaTestStatus::Pass);
        assert_eq!(hob.status(FusaTestNumber::Iop)?, FusaTestStatus::NotRun);
        assert_eq!(
            hob.summary()?,
            FusaSummary {
                not_run: FusaTestNumber::TOTAL - 3,
                passed: 1,
                failed: 1,
                device_not_available: 1,
            }
        );
        assert!(hob.summary()?.has_failures());
        assert_eq!(hob.summary()?.total(), FusaTestNumber::TOTAL);
        assert_eq!(
            hob.failed_tests().collect::<Vec<_>>(),
            [FusaTestNumber::Ibecc1Mbist]
        );

        let mut hob = FusaInfoHobMut::load(&mut buffer[..])?;
        hob.result_mut(FusaTestNumber::Dip).set_total_checks(4);
        assert!(matches!(
            hob.as_hob().verify_checksums(&checksum),
            Err(Error::ChecksumMismatch { test_number: 53, .. })
        ));
        Ok(())
    }

    #[test]
    fn load_fusa_info_hob_with_other_version() {
        let mut buffer = [0u8; FUSA_INFO_HOB_SIZE];
        FusaInfoHobMut::create(&mut buffer[..]).unwrap();
        buffer[0..4].copy_from_slice(&0x0000_0200u32.to_le_bytes());
        assert_eq!(
            FusaInfoHob::load(&buffer[..]).err(),
            Some(Error::VersionMismatch { expected: 0x100, actual: 0x200 })
        );
        assert!(matches!(
            FusaInfoHobMut::load(&mut buffer[..]),
            Err(Error::VersionMismatch { expected: 0x100, actual: 0x200 })
        ));
        // The version is checked before the length.
        assert_eq!(
            FusaInfoHob::load(&buffer[..8]).err(),
            Some(Error::VersionMismatch { expected: 0x100, actual: 0x200 })
        );
        assert!(matches!(
            FusaInfoHobMut::load(&mut buffer[..8]),
            Err(Error::VersionMismatch { expected: 0x100, actual: 0x200 })
        ));
        assert!(matches!(
            FusaInfoHobMut::load(&mut buffer[..3]),
            Err(Error::FileSystem(FileSystemError::PayloadTooSmall, _))
        ));
        buffer[0..4].copy_from_slice(&FUSA_INFO_VERSION.to_le_bytes());
        assert!(matches!(
            FusaInfoHobMut::load(&mut buffer[..8]),
            Err(Error::FileSystem(
                FileSystemError::PayloadTooSmall,
                "FUSA_INFO_HOB"
            ))
        ));
    }

    #[test]
    fn load_truncated_fusa_info_hob() {
        let mut buffer = [0u8; FUSA_INFO_HOB_SIZE];
        FusaInfoHobMut::create(&mut buffer[..]).unwrap();
        assert_eq!(
            FusaInfoHob::load(&buffer[..FUSA_INFO_HOB_SIZE - 1]).err(),
            Some(Error::FileSystem(
                FileSystemError::PayloadTooSmall,
                "FUSA_INFO_HOB::results"
            ))
        );
        assert!(matches!(
            FusaInfoHob::load(&buffer[..3]),
            Err(Error::FileSystem(FileSystemError::PayloadTooSmall, _))
        ));
        assert!(matches!(
            FusaInfoHobMut::create(&mut buffer[..100]),
            Err(Error::OutOfSpace)
        ));
    }

    #[test]
    fn load_fusa_info_hob_with_misplaced_result() {
        let mut buffer = [0u8; FUSA_INFO_HOB_SIZE];
        let mut hob = FusaInfoHobMut::create(&mut buffer[..]).unwrap();
        hob.result_mut(FusaTestNumber::Mc1Cmi)
            .set_test_number(FusaTestNumber::Mc0Cmi);
        assert_eq!(
            FusaInfoHob::load(&buffer[..]).err(),
            Some(Error::TestNumberMismatch { position: 1, test_number: 0 })
        );
    }
}
