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

use std::fs;

/// Whether the vendor tool is likely to reach /dev/ipmi0.
#[cfg(unix)]
pub fn is_privileged() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_privileged() -> bool {
    true
}

fn read_trim(p: &str) -> Option<String> {
    fs::read_to_string(p)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Board vendor and model from DMI, e.g. "Supermicro X11SPi-TF".
pub fn read_board_name() -> String {
    let vendor = read_trim("/sys/devices/virtual/dmi/id/board_vendor");
    let name = read_trim("/sys/devices/virtual/dmi/id/board_name");
    join_board(vendor, name)
        .or_else(|| read_trim("/sys/devices/virtual/dmi/id/product_name"))
        .unwrap_or_default()
}

fn join_board(vendor: Option<String>, name: Option<String>) -> Option<String> {
    match (vendor, name) {
        (Some(v), Some(n)) => Some(format!("{} {}", v, n)),
        (Some(v), None) => Some(v),
        (None, Some(n)) => Some(n),
        (None, None) => None,
    }
}

/// Boards the raw fan commands are known to target.
pub fn looks_like_supermicro(board: &str) -> bool {
    let lower = board.to_ascii_lowercase();
    lower.contains("supermicro") || lower.split_whitespace().any(|w| w.starts_with("x1") || w.starts_with("x9"))
}
