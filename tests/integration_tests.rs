/*
 * Integration tests for Yukon Detect
 *
 * These tests drive detection and verification through a mocked board,
 * and check the CLI surface, profiles and settings working together.
 */

use clap::Parser;
use mockall::mock;
use mockall::predicate::eq;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

use yk_core::{
    classify_raw, load_settings, save_settings, update_setting, AppSettings, Bit, DetectionBoard,
    Detector, DetectorConfig, ModuleIdentity, ModuleKind, ModuleSession, SlotId, SlotOutcome,
    VerificationPolicy,
};
use yk_error::{Result, YukonError};
use yukon_detect::cli::{build_registration, Cli, Commands, SettingsCommands};
use yukon_detect::config::parse_profile;

mock! {
    pub Board {}

    impl DetectionBoard for Board {
        fn read_adc1_voltage(&mut self, slot: SlotId) -> Result<f32>;
        fn read_slow_pins(&mut self, slot: SlotId) -> Result<[Bit; 3]>;
        fn is_main_output_enabled(&self) -> bool;
        fn read_output_voltage(&mut self) -> Result<f32>;
    }
}

fn slot(n: u8) -> SlotId {
    SlotId::new(n).unwrap()
}

fn fast_config() -> DetectorConfig {
    DetectorConfig {
        samples: 4,
        dissipate_timeout: std::time::Duration::from_millis(50),
        dissipate_poll_interval: std::time::Duration::from_millis(1),
        ..DetectorConfig::default()
    }
}

/// Dual Motor in slot 1, LED Strip in slot 4, everything else empty
fn mock_populated_board() -> MockBoard {
    let mut board = MockBoard::new();
    board.expect_is_main_output_enabled().return_const(false);
    board.expect_read_output_voltage().returning(|| Ok(0.1));
    board.expect_read_adc1_voltage().returning(|slot| {
        Ok(match slot.get() {
            1 => 3.29,
            4 => 0.05,
            _ => 1.65,
        })
    });
    board
        .expect_read_slow_pins()
        .returning(|_| Ok([Bit::High, Bit::High, Bit::High]));
    board
}

#[test]
fn test_detector_averages_samples_from_board() {
    let mut board = MockBoard::new();
    board.expect_is_main_output_enabled().return_const(false);
    board
        .expect_read_slow_pins()
        .with(eq(slot(3)))
        .times(1)
        .returning(|_| Ok([Bit::Low, Bit::Low, Bit::Low]));
    // Individual samples straddle the LOW threshold; the average does not
    let mut samples = vec![0.3f32, 0.0, 0.1, 0.0].into_iter();
    board
        .expect_read_adc1_voltage()
        .with(eq(slot(3)))
        .times(4)
        .returning(move |_| Ok(samples.next().unwrap_or(0.0)));

    let mut detector = Detector::with_config(board, fast_config());
    let detection = detector.detect_module(slot(3)).unwrap();

    assert!((detection.adc1_voltage - 0.1).abs() < 1e-6);
    assert_eq!(
        detection.classification.identity,
        ModuleIdentity::Confirmed(ModuleKind::QuadServoDirect)
    );
    assert_eq!(detection.classification.condition, Some("A1 near 0V"));
}

#[test]
fn test_detection_refused_while_output_enabled() {
    let mut board = MockBoard::new();
    board.expect_is_main_output_enabled().return_const(true);
    board.expect_read_adc1_voltage().never();
    board.expect_read_slow_pins().never();

    let mut detector = Detector::new(board);
    assert!(matches!(
        detector.detect_module(slot(1)),
        Err(YukonError::MainOutputActive { .. })
    ));
    assert!(detector.find_slots_with_module(ModuleKind::BigMotor).is_err());
}

#[test]
fn test_board_errors_propagate() {
    let mut board = MockBoard::new();
    board.expect_is_main_output_enabled().return_const(false);
    board
        .expect_read_slow_pins()
        .returning(|_| Err(YukonError::board("i2c expander not responding")));

    let mut detector = Detector::with_config(board, fast_config());
    assert!(matches!(detector.detect_all(), Err(YukonError::Board(_))));
}

#[test]
fn test_output_dissipation_times_out() {
    let mut board = MockBoard::new();
    board.expect_is_main_output_enabled().return_const(false);
    board.expect_read_output_voltage().returning(|| Ok(5.0));

    let mut detector = Detector::with_config(board, fast_config());
    match detector.wait_for_output_dissipation() {
        Err(YukonError::OutputNotDissipated { voltage, .. }) => assert_eq!(voltage, 5.0),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_session_verifies_profile_against_board() {
    let profile = parse_profile(
        r#"{ "modules": { "1": "dual-motor", "4": "led-strip" } }"#,
    )
    .unwrap();

    let mut session = ModuleSession::with_config(mock_populated_board(), fast_config());
    for (s, kind) in profile.to_assignments().unwrap().iter() {
        if let Some(kind) = kind {
            session.register_with_slot(s, kind).unwrap();
        }
    }

    let report = session.prepare_modules(&profile.to_policy().unwrap()).unwrap();
    assert_eq!(report.matched_count(), 2);
    assert_eq!(report.outcome(slot(2)), Some(SlotOutcome::Empty));
}

#[test]
fn test_session_discrepancy_outranks_undetected() {
    let profile = parse_profile(
        r#"{ "modules": { "1": "big-motor", "2": "audio-amp", "4": "led-strip" } }"#,
    )
    .unwrap();

    let mut session = ModuleSession::with_config(mock_populated_board(), fast_config());
    for (s, kind) in profile.to_assignments().unwrap().iter() {
        if let Some(kind) = kind {
            session.register_with_slot(s, kind).unwrap();
        }
    }

    match session.verify_modules(&VerificationPolicy::default()) {
        Err(YukonError::ModuleDiscrepancy { slots }) => assert_eq!(slots, vec![1]),
        other => panic!("unexpected result: {:?}", other),
    }

    let relaxed = parse_profile(r#"{ "allow_discrepancies": [1] }"#)
        .unwrap()
        .to_policy()
        .unwrap();
    match session.verify_modules(&relaxed) {
        Err(YukonError::ModulesUndetected { slots }) => assert_eq!(slots, vec![2]),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_unassigned_addresses_are_not_errors() {
    let result = classify_raw(1, 1, 0, 0).unwrap();
    assert_eq!(result.identity, ModuleIdentity::Unspecified);
    assert!(!result.is_detected());

    assert!(matches!(
        classify_raw(3, 0, 0, 0),
        Err(YukonError::InvalidInput { .. })
    ));
}

#[test]
fn test_cli_parsing() {
    let cli = Cli::try_parse_from(["yukon-detect", "-v", "classify", "float", "1", "1", "1"]).unwrap();
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Classify { json: false, .. }));

    let cli = Cli::try_parse_from(["yukon-detect", "level", "-0.1", "--low", "0.3"]).unwrap();
    match cli.command {
        Commands::Level { volts, thresholds } => {
            assert_eq!(volts, -0.1);
            assert_eq!(thresholds.low, Some(0.3));
            assert_eq!(thresholds.high, None);
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = Cli::try_parse_from([
        "yukon-detect",
        "verify",
        "board.json",
        "--register",
        "1=dual-motor",
        "--register",
        "4=led-strip",
        "--log-file",
        "events.jsonl",
    ])
    .unwrap();
    assert!(cli.log_file.is_some());
    match cli.command {
        Commands::Verify(args) => {
            assert_eq!(args.registrations.len(), 2);
            let saved = build_registration(&args).unwrap();
            assert_eq!(saved.modules.get(&4), Some(&ModuleKind::LedStrip));
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = Cli::try_parse_from(["yukon-detect", "settings", "set", "detection.samples", "8"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Settings(SettingsCommands::Set { .. })
    ));

    assert!(Cli::try_parse_from(["yukon-detect", "classify", "low", "0"]).is_err());
}

#[test]
#[serial]
fn test_settings_round_trip_through_config_dir() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    assert_eq!(load_settings().unwrap(), AppSettings::default());

    let mut settings = AppSettings::default();
    update_setting(&mut settings, "detection.adc_low_threshold", "0.3").unwrap();
    update_setting(&mut settings, "output.dissipate_timeout_secs", "5").unwrap();
    save_settings(&settings).unwrap();

    let path = dir.path().join("yukon-detect").join("settings.json");
    assert!(path.exists());
    let loaded = load_settings().unwrap();
    assert_eq!(loaded.detection.adc_low_threshold, 0.3);
    assert_eq!(loaded.detector_config().unwrap().dissipate_timeout.as_secs(), 5);

    fs::write(&path, r#"{ "detection": { "adc_low_threshold": 3.5 } }"#).unwrap();
    assert!(load_settings().is_err());

    std::env::remove_var("XDG_CONFIG_HOME");
}
