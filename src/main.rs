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

use clap::Parser;
use tracing::warn;

use yk_core::{load_settings, AppSettings};
use yukon_detect::cli::{error_hint, run, Cli};
use yukon_detect::logger;

fn main() {
    let cli = Cli::parse();

    // Settings are read before tracing exists, so report failures afterwards
    let (log_level, settings_error) = match load_settings() {
        Ok(settings) => (settings.general.log_level, None),
        Err(e) => (AppSettings::default().general.log_level, Some(e)),
    };
    logger::init_tracing(cli.verbose, &log_level);
    if let Some(e) = settings_error {
        warn!("Using default log level: {}", e);
    }

    if let Some(path) = &cli.log_file {
        if let Err(e) = logger::init_event_log(path) {
            eprintln!("error: cannot open log file {}: {}", path.display(), e);
            std::process::exit(1);
        }
        let args: Vec<String> = std::env::args().collect();
        logger::log_event("startup", serde_json::json!({ "args": args }));
    }

    if let Err(e) = run(cli) {
        logger::log_event("error", serde_json::json!({ "message": format!("{:#}", e) }));
        eprintln!("error: {:#}", e);
        if let Some(hint) = error_hint(&e) {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(1);
    }
}
