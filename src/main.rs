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

use std::io::stdout;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;

use fanlord::app::App;
use fanlord::config::{self, SavedConfig};
use fanlord::controller::{Controller, FanAction};
use fanlord::dispatch::{locate_tool, Dispatcher};
use fanlord::encoder::{FanChannel, PresetMode};
use fanlord::events::handle_key_event;
use fanlord::i18n::Language;
use fanlord::ui::ui;
use fanlord::{logger, system};

#[derive(Parser)]
#[command(name = "fanlord")]
#[command(version)]
#[command(about = "Fanlord - fan duty control for Supermicro X-series boards")]
#[command(long_about = "Fanlord - fan duty control for Supermicro X-series boards

Sends IPMI raw fan commands through the vendor IPMICFG tool.

EXAMPLES:
    fanlord                          Launch the terminal UI (default)
    fanlord set cpu 45               Set the CPU zone to 45%
    fanlord preset performance       CPU 50%, peripheral 100%
    fanlord reset                    Hand fan control back to the BMC
    fanlord --tool /opt/IPMICFG-Linux.x86_64 show-config

ENVIRONMENT VARIABLES:
    FANLORD_TOOL           Path to the vendor tool
    LANG / LC_ALL          UI language (zh, ja, en)

FILES:
    ~/.config/fanlord/config.json    Saved settings")]
struct Cli {
    /// Path to the vendor IPMI tool
    #[arg(long, global = true)]
    tool: Option<PathBuf>,

    /// UI language: en, zh or ja
    #[arg(long, global = true)]
    lang: Option<Language>,

    /// Append JSON-lines events to /var/log/fanlord/events.jsonl
    #[arg(long, global = true)]
    logging: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the terminal UI (default)
    Tui,

    /// Set one fan zone to a fixed duty cycle
    Set {
        channel: ChannelArg,
        /// Duty cycle in percent, 0-100
        #[arg(allow_negative_numbers = true)]
        percent: i64,
    },

    /// Apply a preset to both zones
    Preset { mode: PresetArg },

    /// Return both zones to automatic BMC control
    Reset,

    /// Print the effective configuration
    ShowConfig,

    /// Save --tool and --lang into the config file
    SaveConfig,
}

#[derive(Copy, Clone, ValueEnum)]
enum ChannelArg {
    Cpu,
    Peripheral,
}

impl From<ChannelArg> for FanChannel {
    fn from(c: ChannelArg) -> Self {
        match c {
            ChannelArg::Cpu => FanChannel::Cpu,
            ChannelArg::Peripheral => FanChannel::Peripheral,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum PresetArg {
    Silent,
    Performance,
    FullSpeed,
}

impl From<PresetArg> for PresetMode {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Silent => PresetMode::Silent,
            PresetArg::Performance => PresetMode::Performance,
            PresetArg::FullSpeed => PresetMode::FullSpeed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.logging {
        let path = logger::init_logging();
        logger::log_event("startup", serde_json::json!({
            "args": std::env::args().collect::<Vec<_>>(),
            "log_path": path,
        }));
    }

    let saved = config::load_saved_config().unwrap_or_default();
    let language = config::resolve_language(cli.lang, &saved);
    let tool = config::resolve_tool_path(cli.tool.as_deref(), &saved);

    let action = match cli.command.unwrap_or(Commands::Tui) {
        Commands::ShowConfig => return show_config(&saved, &tool, language),
        Commands::SaveConfig => return save_config(&cli.tool, cli.lang, saved),
        Commands::Tui => None,
        Commands::Set { channel, percent } => Some(FanAction::SliderReleased { channel: channel.into(), percent }),
        Commands::Preset { mode } => Some(FanAction::Preset(mode.into())),
        Commands::Reset => Some(FanAction::Reset),
    };

    // The tool must exist before any control is offered
    let tool = match locate_tool(&tool) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --tool, {} or tool_path in {}", config::TOOL_ENV, config::config_path().display());
            logger::log_event("fatal_error", serde_json::json!({ "error": e.to_string() }));
            std::process::exit(1);
        }
    };
    let controller = Controller::new(Dispatcher::new(tool));

    match action {
        Some(action) => run_headless(controller, action, language),
        None => run_tui(controller, language, &saved),
    }
}

fn show_config(saved: &SavedConfig, tool: &std::path::Path, language: Language) -> anyhow::Result<()> {
    println!("config file: {}", config::config_path().display());
    println!("{}", serde_json::to_string_pretty(saved)?);
    println!("resolved tool: {}", tool.display());
    println!("resolved language: {}", language.native_name());
    Ok(())
}

fn save_config(tool: &Option<PathBuf>, lang: Option<Language>, mut saved: SavedConfig) -> anyhow::Result<()> {
    if let Some(t) = tool {
        saved.tool_path = Some(t.clone());
    }
    if lang.is_some() {
        saved.language = lang;
    }
    let path = config::save_config(&saved)?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

fn run_headless(mut controller: Controller, action: FanAction, language: Language) -> anyhow::Result<()> {
    // A one-shot `set` always writes, even at 0%
    let results = match action {
        FanAction::SliderReleased { channel, percent } => controller.set_duty(channel, percent),
        other => controller.handle(other),
    };
    let results = match results {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            logger::log_event("fatal_error", serde_json::json!({ "error": e.to_string() }));
            std::process::exit(1);
        }
    };

    let mut failed = false;
    for result in &results {
        for line in result.render(language) {
            println!("{}", line);
        }
        if let Some(err) = result.to_error() {
            eprintln!("Error: {}", err);
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn run_tui(controller: Controller, language: Language, saved: &SavedConfig) -> anyhow::Result<()> {
    let mut app = App::new(controller, language);
    app.slider_step = saved.slider_step;
    app.board_name = system::read_board_name();
    app.privileged = system::is_privileged();
    if !app.privileged {
        app.status = "Not running as root: the vendor tool usually needs elevated rights".to_string();
    } else if !app.board_name.is_empty() && !system::looks_like_supermicro(&app.board_name) {
        app.status = format!("{} does not look like a Supermicro board; raw commands may be rejected", app.board_name);
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    logger::log_event("tui_start", serde_json::json!({ "language": language, "board": app.board_name }));
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
        logger::log_event("fatal_error", serde_json::json!({ "error": err.to_string() }));
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Dispatch blocks inside the key handler, so a plain blocking read is enough
        if let Event::Key(key_event) = event::read()? {
            if handle_key_event(app, key_event)? {
                return Ok(());
            }
        }
    }
}
