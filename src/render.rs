//! Turns message records into terminal lines. Nothing here holds state.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::message::{Message, Role};

const DOT: &str = "●";

/// Lines for a single message: optional image block, then either the
/// loading dots or the wrapped body, then the `HH:MM` timestamp and a
/// blank separator. `tick` only drives the dot animation.
pub fn render_message(message: &Message, width: u16, tick: u64) -> Vec<Line<'static>> {
    let alignment = match message.role {
        Role::User => Alignment::Right,
        Role::Ai => Alignment::Left,
    };
    let body_style = body_style(message);
    let bubble_width = bubble_width(width);

    let mut lines = Vec::new();

    if let Some(image) = &message.image {
        lines.push(Line::from(Span::styled(
            format!("[image] {}", image.describe()),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
        )));
    }

    if message.loading {
        lines.push(loading_dots(tick));
    } else {
        for raw in message.content.split('\n') {
            if raw.is_empty() {
                lines.push(Line::from(""));
                continue;
            }
            for wrapped in textwrap::wrap(raw, bubble_width) {
                lines.push(Line::from(Span::styled(wrapped.into_owned(), body_style)));
            }
        }
    }

    lines.push(Line::from(Span::styled(
        message.timestamp(),
        Style::default().fg(Color::DarkGray),
    )));

    let mut lines: Vec<Line<'static>> = lines
        .into_iter()
        .map(|line| line.alignment(alignment))
        .collect();
    lines.push(Line::from(""));
    lines
}

/// Messages stay within 80% of the transcript width.
fn bubble_width(width: u16) -> usize {
    ((width as usize) * 4 / 5).max(10)
}

fn body_style(message: &Message) -> Style {
    match message.role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Ai if message.id.as_str().starts_with("error-") => Style::default().fg(Color::Red),
        Role::Ai => Style::default().fg(Color::White),
    }
}

fn loading_dots(tick: u64) -> Line<'static> {
    let active = (tick % 3) as usize;
    let spans: Vec<Span<'static>> = (0..3)
        .flat_map(|i| {
            let style = if i == active {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(DOT, style), Span::raw(" ")]
        })
        .collect();
    Line::from(spans)
}

/// Shown while the conversation is empty.
pub fn render_welcome() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "Image Chat",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Attach an image and ask questions about it, or just start a conversation."),
        Line::from(Span::styled(
            "Ctrl+O attaches an image; you can also drop a file onto the terminal.",
            Style::default().fg(Color::DarkGray),
        )),
    ]
    .into_iter()
    .map(|line| line.alignment(Alignment::Center))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ImageRef;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_user_message_right_aligned() {
        let msg = Message::user("hello".to_string(), None);
        let lines = render_message(&msg, 80, 0);
        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert_eq!(text_of(&lines[0]), "hello");
        assert_eq!(text_of(&lines[1]), msg.timestamp());
        assert_eq!(text_of(lines.last().unwrap()), "");
    }

    #[test]
    fn test_ai_message_left_aligned() {
        let mut msg = Message::placeholder();
        msg.loading = false;
        msg.content = "answer".to_string();
        let lines = render_message(&msg, 80, 0);
        assert_eq!(lines[0].alignment, Some(Alignment::Left));
        assert_eq!(text_of(&lines[0]), "answer");
    }

    #[test]
    fn test_loading_shows_three_dots() {
        let msg = Message::placeholder();
        let lines = render_message(&msg, 80, 1);
        let dots = text_of(&lines[0]);
        assert_eq!(dots.matches(DOT).count(), 3);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_line_breaks_preserved() {
        let msg = Message::user("one\n\nthree".to_string(), None);
        let lines = render_message(&msg, 80, 0);
        assert_eq!(text_of(&lines[0]), "one");
        assert_eq!(text_of(&lines[1]), "");
        assert_eq!(text_of(&lines[2]), "three");
    }

    #[test]
    fn test_long_text_wraps_to_bubble_width() {
        let msg = Message::user("word ".repeat(40), None);
        let lines = render_message(&msg, 50, 0);
        let body: Vec<_> = lines.iter().take_while(|l| text_of(l) != msg.timestamp()).collect();
        assert!(body.len() > 1);
        assert!(body.iter().all(|l| text_of(l).chars().count() <= 40));
    }

    #[test]
    fn test_image_block_comes_first() {
        let image = ImageRef {
            file_name: "cat.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 4096,
        };
        let msg = Message::user("what is it".to_string(), Some(image));
        let lines = render_message(&msg, 80, 0);
        assert_eq!(text_of(&lines[0]), "[image] cat.png (image/png, 4 KB)");
        assert_eq!(text_of(&lines[1]), "what is it");
    }

    #[test]
    fn test_error_message_styled_red() {
        let msg = Message::error("failed");
        let lines = render_message(&msg, 80, 0);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
    }
}
