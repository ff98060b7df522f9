use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct StatusBar {
    pub error_message: Option<String>,
    pub info_message: Option<String>,
    pub loading: bool,
    /// Chains with an RPC endpoint, out of all registered chains.
    pub chains_ready: (usize, usize),
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            error_message: None,
            info_message: None,
            loading: false,
            chains_ready: (0, 0),
        }
    }

    pub fn clear_messages(&mut self) {
        self.error_message = None;
        self.info_message = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        // --- Left side ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else if self.loading {
            Line::from(Span::styled(
                " Resolving... (a wallet scan can take a while)",
                Style::default().fg(THEME.text_accent),
            ))
        } else if let Some(ref info) = self.info_message {
            Line::from(Span::styled(format!(" {info}"), THEME.success_style()))
        } else {
            Line::from(vec![
                Span::styled(" /", Style::default().fg(THEME.text_accent)),
                Span::styled(":Search  ", Style::default().fg(THEME.text_muted)),
                Span::styled("Esc", Style::default().fg(THEME.text_accent)),
                Span::styled(":Back  ", Style::default().fg(THEME.text_muted)),
                Span::styled("?", Style::default().fg(THEME.text_accent)),
                Span::styled(":Help  ", Style::default().fg(THEME.text_muted)),
                Span::styled("q", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", Style::default().fg(THEME.text_muted)),
            ])
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: how many chains can be queried ---
        let (ready, total) = self.chains_ready;
        let dot_color = if ready == 0 { THEME.error } else { THEME.success };
        let right_content = Line::from(vec![
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(
                format!("{ready}/{total} chains ready "),
                Style::default().fg(dot_color),
            ),
        ]);

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
