use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

/// Scroll state for the message transcript. Follows the newest message
/// until the user scrolls up, and snaps back whenever the conversation
/// changes.
#[derive(Debug)]
pub struct TranscriptView {
    pub scroll_position: usize,
    pub max_scroll: usize,
    follow: bool,
    seen_revision: Option<u64>,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self {
            scroll_position: 0,
            max_scroll: 0,
            follow: true,
            seen_revision: None,
        }
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_position = self.scroll_position.saturating_sub(lines);
        self.follow = self.scroll_position >= self.max_scroll;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_position = (self.scroll_position + lines).min(self.max_scroll);
        self.follow = self.scroll_position >= self.max_scroll;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll_position = self.max_scroll;
    }

    pub fn scroll_to_top(&mut self) {
        self.follow = false;
        self.scroll_position = 0;
    }

    /// Recomputes the scroll range for `content_height` lines shown in
    /// `viewport_height` rows. A new `revision` re-enables following.
    pub fn sync(&mut self, revision: u64, content_height: usize, viewport_height: usize) {
        if self.seen_revision != Some(revision) {
            self.seen_revision = Some(revision);
            self.follow = true;
        }
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.follow {
            self.scroll_position = self.max_scroll;
        } else {
            self.scroll_position = self.scroll_position.min(self.max_scroll);
        }
    }

    pub fn render(
        &mut self,
        f: &mut ratatui::Frame,
        area: Rect,
        title: &str,
        lines: Vec<Line<'static>>,
        revision: u64,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        // Two rows of border.
        let viewport_height = chunks[0].height.saturating_sub(2) as usize;
        self.sync(revision, lines.len(), viewport_height);

        let paragraph = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(Color::Blue)),
            )
            .scroll((self.scroll_position.min(u16::MAX as usize) as u16, 0));

        f.render_widget(paragraph, chunks[0]);

        if self.max_scroll > 0 {
            let mut scrollbar_state = ScrollbarState::new(self.max_scroll)
                .position(self.scroll_position);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            f.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
        }
    }
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self::new()
    }
}
