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

use crate::app::{preset_key, App, Focus, VERSION};
use crate::command_log::LogTag;
use crate::dispatch::CommandRunner;
use crate::encoder::{FanChannel, PresetMode, LOW_DUTY_THRESHOLD};
use crate::i18n::{Language, TextKey};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};

const AUTHOR: &str = "karminski";
const ORG: &str = "KCORES";

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Gauge color: grey below the BMC floor, green at or above it.
fn duty_color(percent: u8) -> Color {
    if percent < LOW_DUTY_THRESHOLD {
        Color::Gray
    } else {
        Color::Green
    }
}

/// First line to show so the newest entry stays visible.
fn log_scroll(total_lines: usize, height: u16) -> u16 {
    total_lines.saturating_sub(height as usize).min(u16::MAX as usize) as u16
}

pub fn ui<R: CommandRunner>(f: &mut Frame, app: &App<R>) {
    let size = f.area();

    // header | presets | manual control | status log | footer | status line
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, app, chunks[0]);
    render_presets(f, app, chunks[1]);
    render_manual_control(f, app, chunks[2]);
    render_status_log(f, app, chunks[3]);
    render_footer(f, app, chunks[4]);

    let status = Paragraph::new(app.status.as_str()).style(Style::default().fg(Color::Gray));
    f.render_widget(status, chunks[5]);

    if app.show_language_menu {
        render_language_menu(f, app, size);
    }

    if app.show_warning_popup {
        let popup_area = centered_rect(50, 30, size);
        f.render_widget(Clear, popup_area);

        let popup_block = Block::default()
            .title(" Warning ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let inner = popup_block.inner(popup_area);
        f.render_widget(popup_block, popup_area);

        let lines = vec![
            Line::from(app.warning_message.clone()),
            Line::from(""),
            Line::from("Press Enter or Esc to close."),
        ];

        let p = Paragraph::new(lines).alignment(Alignment::Left).wrap(Wrap { trim: false });
        f.render_widget(p, inner);
    }
}

fn render_header<R: CommandRunner>(f: &mut Frame, app: &App<R>, area: Rect) {
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let board = if app.board_name.is_empty() { "?" } else { app.board_name.as_str() };
    let header_text = format!(" {}    |    Board: {} ", app.text(TextKey::WindowTitle), board);
    let header = Paragraph::new(header_text).style(Style::default().fg(Color::Yellow));
    f.render_widget(header, header_cols[0]);

    let (right, style) = if app.privileged {
        (format!("{}: {}", app.text(TextKey::LanguageMenu), app.language.native_name()), Style::default().fg(Color::Gray))
    } else {
        ("not root: IPMI access may fail".to_string(), Style::default().fg(Color::Red))
    };
    let right = Paragraph::new(right).alignment(Alignment::Right).style(style);
    f.render_widget(right, header_cols[1]);
}

fn render_presets<R: CommandRunner>(f: &mut Frame, app: &App<R>, area: Rect) {
    let focused = app.focus == Focus::Presets;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", app.text(TextKey::PresetModes)))
        .border_style(focus_style(focused));

    let mut spans: Vec<Span> = Vec::new();
    for (i, mode) in PresetMode::ALL.iter().enumerate() {
        let label = format!(" [{}] {} ", i + 1, app.text(preset_key(*mode)));
        let style = if focused && i == app.preset_idx {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("  "));
    }

    let p = Paragraph::new(Line::from(spans)).block(block).alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn render_manual_control<R: CommandRunner>(f: &mut Frame, app: &App<R>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", app.text(TextKey::ManualControl)))
        .border_style(focus_style(app.focus.channel().is_some() || app.focus == Focus::Reset));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

    render_slider(f, app, FanChannel::Cpu, TextKey::CpuFanSpeed, rows[0], rows[1]);
    render_slider(f, app, FanChannel::Peripheral, TextKey::PeripheralFanSpeed, rows[2], rows[3]);

    let warning = Paragraph::new(app.text(TextKey::WarningText))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    f.render_widget(warning, rows[4]);

    let reset_style = if app.focus == Focus::Reset {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let reset = Paragraph::new(format!(" [r] {} ", app.text(TextKey::ResetAuto)))
        .style(reset_style)
        .alignment(Alignment::Center);
    f.render_widget(reset, rows[5]);
}

fn render_slider<R: CommandRunner>(
    f: &mut Frame,
    app: &App<R>,
    channel: FanChannel,
    key: TextKey,
    label_area: Rect,
    gauge_area: Rect,
) {
    let focused = app.focus.channel() == Some(channel);
    let mirror = app.controller.mirror();
    let knob = app.slider(channel);

    // value label shows the knob while dragging, "auto" after a reset
    let value = if mirror.is_automatic(channel) && knob == 0 {
        app.text(TextKey::AutoControl).to_string()
    } else {
        format!("{}%", knob)
    };
    let marker = if focused { "> " } else { "  " };
    let label = Paragraph::new(format!("{}{}: {}", marker, app.text(key), value)).style(focus_style(focused));
    f.render_widget(label, label_area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(duty_color(knob)).bg(Color::Black))
        .percent(u16::from(knob))
        .label(format!("{}%", knob));
    f.render_widget(gauge, gauge_area);
}

fn render_status_log<R: CommandRunner>(f: &mut Frame, app: &App<R>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", app.text(TextKey::StatusInfo)));
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();
    for entry in app.controller.log().entries() {
        let color = match entry.outcome.tag() {
            LogTag::Success => Color::Green,
            LogTag::Error => Color::Red,
        };
        for (i, text) in entry.render(app.language).into_iter().enumerate() {
            let style = if i == 0 { Style::default() } else { Style::default().fg(color) };
            lines.push(Line::from(Span::styled(text, style)));
        }
    }

    let scroll = log_scroll(lines.len(), inner.height);
    let p = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(p, area);
}

fn render_footer<R: CommandRunner>(f: &mut Frame, app: &App<R>, area: Rect) {
    let footer = Line::from(vec![
        Span::raw(app.text(TextKey::CreatedBy)),
        Span::styled(AUTHOR, Style::default().fg(Color::Cyan)),
        Span::raw(app.text(TextKey::ThisIsA)),
        Span::styled(ORG, Style::default().fg(Color::Cyan)),
        Span::raw(app.text(TextKey::Project)),
        Span::raw(format!(" | {}", VERSION)),
    ]);
    let p = Paragraph::new(footer).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray));
    f.render_widget(p, area);
}

fn render_language_menu<R: CommandRunner>(f: &mut Frame, app: &App<R>, size: Rect) {
    let area = centered_rect(30, 30, size);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", app.text(TextKey::LanguageMenu)))
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = Language::ALL
        .iter()
        .map(|l| {
            let current = if *l == app.language { " *" } else { "" };
            ListItem::new(format!("{}{}", l.native_name(), current))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.language_idx.min(Language::ALL.len() - 1)));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_app;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_duty_color_threshold() {
        assert_eq!(duty_color(0), Color::Gray);
        assert_eq!(duty_color(29), Color::Gray);
        assert_eq!(duty_color(30), Color::Green);
        assert_eq!(duty_color(100), Color::Green);
    }

    #[test]
    fn test_log_scroll_keeps_tail_visible() {
        assert_eq!(log_scroll(3, 10), 0);
        assert_eq!(log_scroll(25, 10), 15);
    }

    #[test]
    fn test_render_main_screen() {
        let mut app = mock_app(0);
        app.apply_preset(PresetMode::Silent);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Preset Modes"));
        assert!(text.contains("Status Information"));
        assert!(text.contains("Command executed successfully!"));
        assert!(text.contains("karminski"));
    }

    #[test]
    fn test_render_failure_and_popups() {
        let mut app = mock_app(1);
        app.drag(FanChannel::Cpu, 50);
        app.release(FanChannel::Cpu);
        app.open_language_menu();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Command execution failed:"));
        assert!(text.contains("English *"));

        app.show_warning("Dispatch already in progress".into());
        terminal.draw(|f| ui(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Warning"));
    }
}
