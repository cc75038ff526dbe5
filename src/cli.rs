/*
 * This file is part of Yukon Detect.
 *
 * Copyright (C) 2025 Yukon Detect contributors
 *
 * Yukon Detect is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Yukon Detect is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Yukon Detect. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command Line Interface
//!
//! Classification works on typed-in pin states; scanning and verification
//! work on board snapshots captured as JSON.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use yk_core::{
    addresses_for, format_classification, format_detection, format_identity, format_observation,
    format_outcome, format_voltage, get_cached_settings, get_settings_path, load_settings,
    load_snapshot, render_address_table, save_settings, update_setting,
    AdcThresholds, AppSettings, DetectorConfig, ModuleKind, ModuleSession, PinObservation,
    SlotSelection, SnapshotBoard, ADDRESS_TABLE,
};

use yk_error::YukonError;

use crate::config::{load_profile, parse_registration, Allowance, SavedProfile};
use crate::logger::log_event;

#[derive(Parser, Debug)]
#[command(name = "yukon-detect")]
#[command(version)]
#[command(about = "Yukon Detect - Identify the modules in a Yukon board's slots")]
#[command(long_about = "Yukon Detect - Identify the modules in a Yukon board's slots

Each slot exposes one tri-state ADC line and three digital SLOW lines.
Before the main output is powered, their combination identifies the
module plugged into the slot.

EXAMPLES:
    yukon-detect classify low 0 0 1          Look up one address
    yukon-detect level 1.7                   Threshold a voltage
    yukon-detect table                       Print the address table
    yukon-detect scan board.json             Classify every slot of a snapshot
    yukon-detect find board.json big-motor   Slots holding a module
    yukon-detect verify board.json --register 2=big-motor --allow-unregistered
    yukon-detect settings set detection.samples 16

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Override the log filter
    XDG_CONFIG_HOME        Base directory for settings

FILES:
    ~/.config/yukon-detect/settings.json   Detection thresholds and timing")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Append JSON event records to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one address: ADC1 level and the three SLOW bits
    Classify {
        /// ADC1 level: low, float or high
        adc1: String,
        /// SLOW1 bit (0 or 1)
        slow1: String,
        /// SLOW2 bit (0 or 1)
        slow2: String,
        /// SLOW3 bit (0 or 1)
        slow3: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert an ADC1 voltage to its level
    Level {
        /// Voltage in volts
        #[arg(allow_negative_numbers = true)]
        volts: f32,
        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Print the module address table
    Table {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect the module in every slot of a snapshot
    Scan {
        /// Board snapshot file
        snapshot: PathBuf,
        #[command(flatten)]
        thresholds: ThresholdArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the slots of a snapshot holding a module
    Find {
        /// Board snapshot file
        snapshot: PathBuf,
        /// Module name or slug, e.g. big-motor
        module: String,
        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Check registered modules against a snapshot
    Verify(VerifyArgs),

    /// List module types and the addresses they use
    Modules,

    /// Settings management
    #[command(subcommand, about = "View and modify settings")]
    Settings(SettingsCommands),
}

/// Threshold overrides on top of the saved settings
#[derive(Args, Debug, Default, Clone)]
pub struct ThresholdArgs {
    /// Voltage at or below which ADC1 reads LOW
    #[arg(long, value_name = "VOLTS")]
    pub low: Option<f32>,
    /// Voltage at or above which ADC1 reads HIGH
    #[arg(long, value_name = "VOLTS")]
    pub high: Option<f32>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Board snapshot file
    pub snapshot: PathBuf,
    /// Registration profile (JSON)
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,
    /// Register a module, e.g. 2=big-motor (repeatable)
    #[arg(long = "register", value_name = "SLOT=MODULE")]
    pub registrations: Vec<String>,
    /// Accept detected modules nobody registered
    #[arg(long)]
    pub allow_unregistered: bool,
    /// Accept registered modules that were not detected
    #[arg(long)]
    pub allow_undetected: bool,
    /// Accept a different module than registered
    #[arg(long)]
    pub allow_discrepancies: bool,
    /// Accept a board with nothing registered
    #[arg(long)]
    pub allow_no_modules: bool,
    #[command(flatten)]
    pub thresholds: ThresholdArgs,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show all settings as JSON
    Show,
    /// Print the settings file path
    Path,
    /// Set a setting value by dotted key
    Set {
        /// Setting key, e.g. detection.adc_low_threshold
        key: String,
        /// New value
        value: String,
    },
    /// Reset all settings to defaults
    Reset,
}

impl ThresholdArgs {
    /// Thresholds from settings with any overrides applied
    pub fn resolve(&self, settings: &AppSettings) -> yk_error::Result<AdcThresholds> {
        AdcThresholds::new(
            self.low.unwrap_or(settings.detection.adc_low_threshold),
            self.high.unwrap_or(settings.detection.adc_high_threshold),
        )
    }

    pub fn detector_config(&self, settings: &AppSettings) -> yk_error::Result<DetectorConfig> {
        let mut config = settings.detector_config()?;
        config.thresholds = self.resolve(settings)?;
        Ok(config)
    }
}

// ============================================================================
// Command dispatch
// ============================================================================

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Classify {
            adc1,
            slow1,
            slow2,
            slow3,
            json,
        } => run_classify(&adc1, &slow1, &slow2, &slow3, json),
        Commands::Level { volts, thresholds } => run_level(volts, &thresholds),
        Commands::Table { json } => run_table(json),
        Commands::Scan {
            snapshot,
            thresholds,
            json,
        } => run_scan(&snapshot, &thresholds, json),
        Commands::Find {
            snapshot,
            module,
            thresholds,
        } => run_find(&snapshot, &module, &thresholds),
        Commands::Verify(args) => run_verify(&args),
        Commands::Modules => run_modules(),
        Commands::Settings(cmd) => run_settings(cmd),
    }
}

fn open_session(
    snapshot: &Path,
    thresholds: &ThresholdArgs,
) -> anyhow::Result<ModuleSession<SnapshotBoard>> {
    let settings = get_cached_settings();
    let config = thresholds.detector_config(&settings)?;
    let snapshot = load_snapshot(snapshot)
        .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
    Ok(ModuleSession::with_config(SnapshotBoard::new(snapshot), config))
}

fn run_classify(adc1: &str, slow1: &str, slow2: &str, slow3: &str, json: bool) -> anyhow::Result<()> {
    let observation = PinObservation::parse(adc1, slow1, slow2, slow3)?;
    let classification = yk_core::classify_observation(&observation);

    log_event(
        "classify",
        json!({ "address": observation.to_string(), "identity": classification.identity }),
    );

    if json {
        let out = json!({
            "address": observation,
            "identity": classification.identity,
            "condition": classification.condition,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_classification(&classification));
    }
    Ok(())
}

fn run_level(volts: f32, thresholds: &ThresholdArgs) -> anyhow::Result<()> {
    let settings = get_cached_settings();
    let thresholds = thresholds.resolve(&settings)?;
    let level = thresholds.classify_voltage(volts)?;
    println!("{} -> {}", format_voltage(volts), level);
    Ok(())
}

fn run_table(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&ADDRESS_TABLE[..])?);
    } else {
        print!("{}", render_address_table());
    }
    Ok(())
}

fn run_scan(snapshot: &Path, thresholds: &ThresholdArgs, json: bool) -> anyhow::Result<()> {
    let mut session = open_session(snapshot, thresholds)?;
    let detections = session.detector().detect_all()?;

    log_event(
        "scan",
        json!({
            "snapshot": snapshot.display().to_string(),
            "detected": detections.iter().filter(|d| d.classification.is_detected()).count(),
        }),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&detections)?);
    } else {
        for detection in &detections {
            println!("{}", format_detection(detection));
        }
    }
    Ok(())
}

fn run_find(snapshot: &Path, module: &str, thresholds: &ThresholdArgs) -> anyhow::Result<()> {
    let kind: ModuleKind = module.parse()?;
    let mut session = open_session(snapshot, thresholds)?;
    let slots = session.find_slots_with_module(kind)?;

    log_event("find", json!({ "module": kind, "slots": slots }));

    if slots.is_empty() {
        println!("No {} found", kind);
    } else {
        let names: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
        println!("{}: {}", kind, names.join(", "));
    }
    Ok(())
}

/// Merge the profile with command-line registrations and allow flags
pub fn build_registration(args: &VerifyArgs) -> anyhow::Result<SavedProfile> {
    let mut profile = match &args.profile {
        Some(path) => load_profile(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => SavedProfile::default(),
    };

    for registration in &args.registrations {
        let (slot, kind) = parse_registration(registration)?;
        if profile.modules.contains_key(&slot.get()) {
            return Err(YukonError::SlotOccupied(slot.get()).into());
        }
        profile.modules.insert(slot.get(), kind);
    }

    if args.allow_unregistered {
        profile.allow_unregistered = Allowance::Flag(true);
    }
    if args.allow_undetected {
        profile.allow_undetected = Allowance::Flag(true);
    }
    if args.allow_discrepancies {
        profile.allow_discrepancies = Allowance::Flag(true);
    }
    if args.allow_no_modules {
        profile.allow_no_modules = true;
    }
    Ok(profile)
}

fn run_verify(args: &VerifyArgs) -> anyhow::Result<()> {
    let profile = build_registration(args)?;
    let policy = profile.to_policy()?;
    let assignments = profile.to_assignments()?;
    debug!(
        "Allowances: unregistered={} undetected={} discrepancies={} no_modules={}",
        describe_selection(&policy.allow_unregistered),
        describe_selection(&policy.allow_undetected),
        describe_selection(&policy.allow_discrepancies),
        policy.allow_no_modules
    );

    let mut session = open_session(&args.snapshot, &args.thresholds)?;
    for (slot, kind) in assignments.iter() {
        if let Some(kind) = kind {
            session.register_with_slot(slot, kind)?;
        }
    }

    let result = session.prepare_modules(&policy);
    log_event(
        "verify",
        json!({
            "snapshot": args.snapshot.display().to_string(),
            "registered": session.assignments().registered_count(),
            "ok": result.is_ok(),
        }),
    );

    let report = result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (slot, outcome) in &report.outcomes {
            let allowed = if outcome.is_problem() { " (allowed)" } else { "" };
            println!("{:<6} {}{}", slot.to_string(), format_outcome(outcome), allowed);
        }
        println!("Verified: {} module(s) matched", report.matched_count());
    }
    Ok(())
}

/// Advice printed after a failed run, if the error has any
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    let yukon = err.chain().find_map(|e| e.downcast_ref::<YukonError>())?;
    if yukon.is_verification() {
        Some("pass --allow-unregistered, --allow-undetected, --allow-discrepancies or --allow-no-modules (or a profile) to accept this board")
    } else {
        None
    }
}

fn run_modules() -> anyhow::Result<()> {
    for kind in ModuleKind::ALL {
        println!("{} ({})", kind.name(), kind.slug());
        for entry in addresses_for(kind) {
            let identity = format_identity(&entry.identity);
            match entry.condition {
                Some(condition) => println!(
                    "    {}  {} ({})",
                    format_observation(&entry.observation),
                    identity,
                    condition
                ),
                None => println!("    {}  {}", format_observation(&entry.observation), identity),
            }
        }
    }
    Ok(())
}

fn run_settings(cmd: SettingsCommands) -> anyhow::Result<()> {
    match cmd {
        SettingsCommands::Show => {
            let settings = load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommands::Path => {
            println!("{}", get_settings_path()?.display());
        }
        SettingsCommands::Set { key, value } => {
            let mut settings = load_settings()?;
            update_setting(&mut settings, &key, &value)?;
            save_settings(&settings)?;
            log_event("settings_set", json!({ "key": key, "value": value }));
            println!("Set {} = {}", key, value);
        }
        SettingsCommands::Reset => {
            save_settings(&AppSettings::default())?;
            log_event("settings_reset", json!({}));
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}

/// Slots a selection covers, for display
fn describe_selection(selection: &SlotSelection) -> String {
    match selection {
        SlotSelection::None => "none".to_string(),
        SlotSelection::All => "all".to_string(),
        SlotSelection::Slots(slots) => slots
            .iter()
            .map(|s| s.get().to_string())
            .collect::<Vec<_>>()
            .join(","),
    }
}
