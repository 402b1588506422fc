/*
 * This file is part of Fanlord.
 *
 * Copyright (C) 2025 Fanlord contributors
 *
 * Fanlord is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanlord is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanlord. If not, see <https://www.gnu.org/licenses/>.
 */

//! Fanlord - fan duty control for Supermicro X-series boards
//!
//! This library encodes IPMI raw fan commands, runs them through the vendor
//! command-line tool, and keeps an append-only log of every invocation.

pub mod encoder;
pub mod dispatch;
pub mod command_log;
pub mod controller;
pub mod error;
pub mod i18n;
pub mod app;
pub mod config;
pub mod system;
pub mod events;
pub mod ui;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
