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

//! UI strings keyed by element, never by rendered text.

use std::env;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Chinese,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Chinese, Language::English, Language::Japanese];

    /// Name shown in the language menu, always in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "中文",
            Language::Japanese => "日本語",
        }
    }

    /// Map a locale tag like `zh_CN.UTF-8` or `ja-JP` to a supported language.
    pub fn from_locale(tag: &str) -> Language {
        let lower = tag.trim().to_ascii_lowercase().replace('-', "_");
        match lower.split(['_', '.', '@']).next().unwrap_or("") {
            "zh" => Language::Chinese,
            "ja" => Language::Japanese,
            _ => Language::English,
        }
    }

    /// First non-empty of `LC_ALL`, `LC_MESSAGES`, `LANG`.
    pub fn detect() -> Language {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|k| env::var(k).ok())
            .find(|v| !v.trim().is_empty())
            .map(|v| Language::from_locale(&v))
            .unwrap_or_default()
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "zh" | "chinese" | "中文" => Ok(Language::Chinese),
            "ja" | "japanese" | "日本語" => Ok(Language::Japanese),
            other => Err(format!("unsupported language '{}' (use en, zh or ja)", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextKey {
    WindowTitle,
    PresetModes,
    SilentMode,
    PerformanceMode,
    FullSpeedMode,
    ManualControl,
    CpuFanSpeed,
    PeripheralFanSpeed,
    WarningText,
    ResetAuto,
    StatusInfo,
    CreatedBy,
    ThisIsA,
    Project,
    LanguageMenu,
    ExecuteCommand,
    CommandSuccess,
    CommandFailed,
    CommandError,
    AutoControl,
}

pub fn tr(lang: Language, key: TextKey) -> &'static str {
    match lang {
        Language::English => english(key),
        Language::Chinese => chinese(key),
        Language::Japanese => japanese(key),
    }
}

fn english(key: TextKey) -> &'static str {
    match key {
        TextKey::WindowTitle => "Fan Lord for Supermicro X-Series",
        TextKey::PresetModes => "Preset Modes",
        TextKey::SilentMode => "Silent Mode",
        TextKey::PerformanceMode => "Performance Mode",
        TextKey::FullSpeedMode => "Full Speed Mode",
        TextKey::ManualControl => "Manual Control",
        TextKey::CpuFanSpeed => "CPU Fan Speed",
        TextKey::PeripheralFanSpeed => "Peripheral Fan Speed",
        TextKey::WarningText => "Note: If the value is less than 30%, BMC may automatically reset fan speed to full speed",
        TextKey::ResetAuto => "Reset to Auto Control",
        TextKey::StatusInfo => "Status Information",
        TextKey::CreatedBy => "Created by: ",
        TextKey::ThisIsA => " | This is a ",
        TextKey::Project => " opensource project",
        TextKey::LanguageMenu => "Language",
        TextKey::ExecuteCommand => "Execute command",
        TextKey::CommandSuccess => "Command executed successfully!",
        TextKey::CommandFailed => "Command execution failed:",
        TextKey::CommandError => "Error executing command:",
        TextKey::AutoControl => "auto",
    }
}

fn chinese(key: TextKey) -> &'static str {
    match key {
        TextKey::WindowTitle => "Fan Lord for Supermicro X-Series",
        TextKey::PresetModes => "预设模式",
        TextKey::SilentMode => "静音模式",
        TextKey::PerformanceMode => "性能模式",
        TextKey::FullSpeedMode => "全速模式",
        TextKey::ManualControl => "手动控制",
        TextKey::CpuFanSpeed => "CPU风扇转速",
        TextKey::PeripheralFanSpeed => "外设风扇转速",
        TextKey::WarningText => "注意：如果数值小于30%，BMC可能会自动重置风扇转速为全速",
        TextKey::ResetAuto => "重置为自动控制",
        TextKey::StatusInfo => "状态信息",
        TextKey::CreatedBy => "Created by: ",
        TextKey::ThisIsA => " | This is a ",
        TextKey::Project => " opensource project",
        TextKey::LanguageMenu => "语言",
        TextKey::ExecuteCommand => "执行命令",
        TextKey::CommandSuccess => "命令执行成功！",
        TextKey::CommandFailed => "命令执行失败：",
        TextKey::CommandError => "执行出错：",
        TextKey::AutoControl => "自动",
    }
}

fn japanese(key: TextKey) -> &'static str {
    match key {
        TextKey::WindowTitle => "Fan Lord for Supermicro X-Series",
        TextKey::PresetModes => "プリセットモード",
        TextKey::SilentMode => "サイレントモード",
        TextKey::PerformanceMode => "パフォーマンスモード",
        TextKey::FullSpeedMode => "フルスピードモード",
        TextKey::ManualControl => "手動制御",
        TextKey::CpuFanSpeed => "CPUファン速度",
        TextKey::PeripheralFanSpeed => "周辺機器ファン速度",
        TextKey::WarningText => "注意：値が30%未満の場合、BMCが自動的にファン速度をフルスピードにリセットする可能性があります",
        TextKey::ResetAuto => "自動制御にリセット",
        TextKey::StatusInfo => "ステータス情報",
        TextKey::CreatedBy => "作成者: ",
        TextKey::ThisIsA => " | これは ",
        TextKey::Project => " オープンソースプロジェクトです",
        TextKey::LanguageMenu => "言語",
        TextKey::ExecuteCommand => "コマンドを実行",
        TextKey::CommandSuccess => "コマンドが正常に実行されました！",
        TextKey::CommandFailed => "コマンド実行に失敗しました：",
        TextKey::CommandError => "コマンドの実行中にエラーが発生しました：",
        TextKey::AutoControl => "自動",
    }
}
