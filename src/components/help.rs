use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Returns true if it consumed the event
    pub fn handle_key(&mut self, _key: KeyEvent) -> bool {
        if self.visible {
            self.visible = false;
            true
        } else {
            false
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let popup_width = area.width * 60 / 100;
        let popup_height = area.height * 70 / 100;
        let x = area.x + (area.width - popup_width) / 2;
        let y = area.y + (area.height - popup_height) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));

        let section = |title: &'static str| {
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(THEME.text_accent)
                    .add_modifier(Modifier::BOLD),
            ))
        };
        let entry = |key: &'static str, action: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<9}"), Style::default().fg(THEME.text_accent)),
                Span::styled(action, Style::default().fg(THEME.text)),
            ])
        };

        let help_text = vec![
            section("Search"),
            entry("/", "Open search"),
            entry("Tab", "Cycle chain (all chains / one chain)"),
            entry("Enter", "Look up transaction"),
            entry("Esc", "Cancel search"),
            Line::from(""),
            section("Transaction"),
            entry("a", "Wallet activity of the sender"),
            entry("p", "Export PDF"),
            entry("\u{2191}/k \u{2193}/j", "Scroll"),
            Line::from(""),
            section("Wallet Activity"),
            entry("\u{2191}/k \u{2193}/j", "Move selection"),
            entry("Enter", "Open selected transaction"),
            entry("c", "Export CSV"),
            entry("e", "Export chart JSON"),
            Line::from(""),
            section("Other"),
            entry("Esc", "Go back"),
            entry("?", "Toggle this help"),
            entry("q", "Quit"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }
}
