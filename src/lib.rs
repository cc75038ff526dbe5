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

//! Yukon Detect - module detection for Yukon boards
//!
//! This library provides the command-line front end over `yk-core`:
//! argument parsing, saved registration profiles, and event logging.

pub mod cli;
pub mod config;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
