use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app_state::App;
use crate::message::format_size;
use crate::notice::NoticeLevel;
use crate::render::{render_message, render_welcome};

pub fn draw_ui(f: &mut Frame, app: &mut App) {
    // Minimum 3 (1 line + 2 borders), maximum 8 lines
    let line_count = app.input.textarea().lines().len() as u16;
    let textarea_height = (line_count + 2).clamp(3, 8);
    let attachment_height = if app.input.image().is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(attachment_height),
            Constraint::Length(textarea_height),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_transcript(f, app, chunks[1]);
    if attachment_height > 0 {
        render_attachment(f, app, chunks[2]);
    }
    render_input(f, app, chunks[3]);

    if app.input.picker().is_open() {
        render_picker(f, app);
    }
    render_notices(f, app);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("Image Chat", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(
            "  Upload images and ask questions",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if !app.chat.is_empty() {
        spans.push(Span::styled("   [Ctrl+L] Clear", Style::default().fg(Color::Cyan)));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.client().endpoint().host_str().unwrap_or("analysis").to_string()),
    );
    f.render_widget(header, area);
}

fn render_transcript(f: &mut Frame, app: &mut App, area: Rect) {
    // Inner width: borders plus the scrollbar column.
    let width = area.width.saturating_sub(3);
    let lines: Vec<Line<'static>> = if app.chat.is_empty() {
        render_welcome()
    } else {
        app.chat
            .messages()
            .iter()
            .flat_map(|msg| render_message(msg, width, app.tick))
            .collect()
    };

    let title = format!("Messages ({})", app.chat.messages().len());
    let revision = app.chat.revision();
    app.transcript.render(f, area, &title, lines, revision);
}

fn render_attachment(f: &mut Frame, app: &App, area: Rect) {
    let Some(image) = app.input.image() else {
        return;
    };
    let preview = match app.input.preview_info() {
        Some((mime, size)) => format!("preview {} {}", mime, format_size(size)),
        None => "preparing preview...".to_string(),
    };
    let line = Line::from(vec![
        Span::styled("[image] ", Style::default().fg(Color::Magenta)),
        Span::raw(format!(
            "{} ({}, {})  ",
            image.file_name,
            image.mime_type,
            format_size(image.bytes.len() as u64)
        )),
        Span::styled(preview, Style::default().fg(Color::DarkGray)),
    ]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Attachment (Ctrl+X to remove)"),
    );
    f.render_widget(widget, area);
}

fn render_input(f: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.chat.is_loading() {
        "Input (Waiting for response...)"
    } else {
        "Input (Enter to send, Shift+Enter for new line, Ctrl+O to attach)"
    };
    let style = if app.input.is_disabled() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let textarea = app.input.textarea_mut();
    textarea.set_block(Block::default().borders(Borders::ALL).title(title).style(style));
    f.render_widget(&*textarea, area);
}

fn render_picker(f: &mut Frame, app: &App) {
    let area = f.area();
    let width = area.width.saturating_sub(8).min(80);
    let popup = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: area.height / 3,
        width,
        height: 3,
    };
    f.render_widget(Clear, popup);
    f.render_widget(app.input.picker().field(), popup);
}

fn render_notices(f: &mut Frame, app: &App) {
    let area = f.area();
    for (i, notice) in app.chat.notices().visible().take(3).enumerate() {
        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        let width = (notice.text.chars().count() as u16 + 4).min(area.width.saturating_sub(2));
        let y = 1 + i as u16 * 3;
        if y + 3 > area.height {
            break;
        }
        let rect = Rect {
            x: area.width.saturating_sub(width + 1),
            y,
            width,
            height: 3,
        };
        let widget = Paragraph::new(notice.text.as_str())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(Color::Black)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(widget, rect);
    }
}
