use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use super::app::{MessageType, Mode, PreviewState, StatusMessage};
use super::layout::AppLayout;
use crate::models::{ConversationRecord, SortKey};
use crate::utils::terminal::{single_line, strip_ansi_codes};
use crate::utils::{
    format_conversation_line, format_date, format_duration, format_path_with_tilde,
    short_session_id,
};

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const BAR_BG: Color = Color::Rgb(24, 24, 27);
const ERROR: Color = Color::Rgb(239, 68, 68);

/// Snapshot of selector state needed to draw one frame
pub struct RenderState<'a> {
    pub items: &'a [ConversationRecord],
    pub selected_idx: usize,
    pub mode: &'a Mode,
    pub sort_key: SortKey,
    pub sort_descending: bool,
    pub searching: bool,
    pub status_message: Option<&'a StatusMessage>,
    pub working_dir: &'a Path,
    pub page_size: usize,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_header(frame, layout.header_area, state.working_dir);

    match state.mode {
        Mode::Preview(preview) => {
            render_preview_controls(frame, layout.controls_area);
            render_preview(frame, layout.body_area, state, preview);
            render_preview_status(frame, layout.status_area, preview, state.page_size);
        }
        Mode::List | Mode::Search(_) => {
            render_list_controls(frame, layout.controls_area, state);
            render_results_table(frame, layout.body_area, state);
            render_status_bar(frame, layout.status_area, state);
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, working_dir: &Path) {
    let lines = vec![
        Line::from(Span::styled(
            "runlog - Claude Code Conversation Uploader",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Current directory: {}", format_path_with_tilde(working_dir)),
            Style::default().fg(MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_list_controls(frame: &mut Frame, area: Rect, state: &RenderState) {
    let lines = match state.mode {
        Mode::Search(search) => {
            let mut search_line = vec![
                Span::styled("Search: ", Style::default().fg(Color::Cyan)),
                Span::styled(strip_ansi_codes(&search.query), Style::default().fg(BRIGHT)),
                Span::styled("|", Style::default().fg(MUTED)),
            ];
            if state.searching {
                search_line.push(Span::styled(" Searching...", Style::default().fg(Color::Yellow)));
            }
            vec![
                Line::from(search_line),
                Line::from(Span::styled(
                    "(↑↓ navigate, → preview, ↵ select, esc exit)",
                    Style::default().fg(MUTED),
                )),
            ]
        }
        _ => {
            let arrow = if state.sort_descending { "↓" } else { "↑" };
            vec![
                Line::from(Span::styled(
                    "Select a conversation:",
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    "(↑↓ navigate, → preview, ↵ select, / search, s sort, o order, esc exit)",
                    Style::default().fg(MUTED),
                )),
                Line::from(Span::styled(
                    format!("Sort: {} {}", state.sort_key.label(), arrow),
                    Style::default().fg(MUTED),
                )),
            ]
        }
    };
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_results_table(frame: &mut Frame, area: Rect, state: &RenderState) {
    if state.items.is_empty() {
        let query = match state.mode {
            Mode::Search(search) if !search.query.is_empty() => {
                format!(" matching \"{}\"", strip_ansi_codes(&search.query))
            }
            _ => String::new(),
        };
        let text = if state.searching {
            "Searching...".to_string()
        } else {
            format!("No conversations found{}", query)
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .block(results_block());
        frame.render_widget(paragraph, area);
        return;
    }

    let rows: Vec<Row> = state
        .items
        .iter()
        .map(|record| {
            let mut messages = record.message_count.to_string();
            if let Some(matches) = record.match_count {
                messages.push_str(&format!(" ({})", matches));
            }
            let summary = record.summary_text.as_deref().map(single_line).unwrap_or_default();

            Row::new(vec![
                Cell::from(short_session_id(&record.session_id))
                    .style(Style::default().fg(Color::Blue)),
                Cell::from(format_date(record.last_event_time)),
                Cell::from(messages).style(Style::default().fg(Color::Yellow)),
                Cell::from(format_duration(record.active_duration.unwrap_or(0)))
                    .style(Style::default().fg(Color::Magenta)),
                Cell::from(summary),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(18),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Min(20),
    ];

    let header = Row::new(vec!["ID", "Time", "Messages", "Active", "Summary"])
        .style(Style::default().fg(MUTED));

    let table = Table::new(rows, widths)
        .header(header)
        .block(results_block())
        .row_highlight_style(
            Style::default()
                .fg(BRIGHT) // Bright text
                .bg(ACCENT) // Emerald background
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("❯ ");

    let mut table_state = TableState::default().with_selected(Some(state.selected_idx));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn results_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Conversations ")
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = if let Some(status) = state.status_message {
        let fg = match status.message_type {
            MessageType::Error => ERROR,
            MessageType::Info => BRIGHT,
        };
        (format!(" {} ", status.text), Style::default().fg(fg).bg(BAR_BG))
    } else {
        let mut parts = vec![format!("{} conversations", state.items.len())];
        if !state.items.is_empty() {
            parts.push(format!("entry {}/{}", state.selected_idx + 1, state.items.len()));
        }
        parts.push("Enter: select".to_string());
        parts.push("Esc: quit".to_string());
        (format!(" {} ", parts.join(" | ")), Style::default().fg(BRIGHT).bg(BAR_BG))
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}

fn render_preview_controls(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Message Preview", Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(
            "(↑ older, ↓ newer, ← back, ↵ select, esc exit)",
            Style::default().fg(MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_preview(frame: &mut Frame, area: Rect, state: &RenderState, preview: &PreviewState) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(record) = state.items.get(state.selected_idx) {
        for line in format_conversation_line(record).lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(Span::styled(
            "─".repeat(area.width.saturating_sub(2).min(100) as usize),
            Style::default().fg(MUTED),
        )));
    }

    if preview.messages.is_empty() {
        lines.push(Line::from(Span::styled("No messages to preview", Style::default().fg(MUTED))));
    } else {
        let end = (preview.offset + state.page_size).min(preview.messages.len());
        for (i, message) in preview.messages[preview.offset..end].iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(""));
            }

            let (role, color) = match message.entry_type.as_str() {
                "user" => ("User".to_string(), Color::Blue),
                "assistant" => ("Assistant".to_string(), Color::Green),
                "thinking" => ("Thinking".to_string(), Color::Yellow),
                other => (strip_ansi_codes(other), MUTED),
            };
            lines.push(Line::from(vec![
                Span::styled(role, Style::default().fg(color)),
                Span::raw(" "),
                Span::styled(format_date(Some(message.timestamp)), Style::default().fg(MUTED)),
            ]));
            lines.push(Line::from(strip_ansi_codes(&message.content)));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(MUTED)))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_preview_status(frame: &mut Frame, area: Rect, preview: &PreviewState, page_size: usize) {
    let total = preview.messages.len();
    let end = (preview.offset + page_size).min(total);
    let start = if total == 0 { 0 } else { preview.offset + 1 };

    let mut parts = Vec::new();
    if preview.offset > 0 {
        parts.push("↑ older".to_string());
    }
    parts.push(format!("Messages {}-{} of {}", start, end, total));
    if preview.offset + page_size < total {
        parts.push("newer ↓".to_string());
    }

    let paragraph = Paragraph::new(format!(" {} ", parts.join(" │ ")))
        .style(Style::default().fg(MUTED).bg(BAR_BG));
    frame.render_widget(paragraph, area);
}
