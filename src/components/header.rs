use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct Header {
    pub current_tab: usize,
    /// Chain the current result came from, or the active chain filter.
    pub chain_name: Option<String>,
    pub wallet: Option<String>,
}

const TABS: &[&str] = &["Transaction", "Wallet Activity"];

impl Header {
    pub fn new() -> Self {
        Self {
            current_tab: 0,
            chain_name: None,
            wallet: None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        // Split the header into three sections: left (title), center (tabs), right (chain/wallet)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(13),
                Constraint::Min(0),
                Constraint::Length(48),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " tx-tracker",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tab_titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(tab_titles)
            .select(self.current_tab)
            .style(THEME.muted_style())
            .highlight_style(THEME.accent_style().add_modifier(Modifier::BOLD))
            .divider(Span::raw(" | "));
        frame.render_widget(tabs, chunks[1]);

        let chain = self.chain_name.as_deref().unwrap_or("all chains");
        let mut spans = vec![Span::styled(chain.to_string(), Style::default().fg(THEME.text))];
        if let Some(wallet) = &self.wallet {
            spans.push(Span::styled(" | ", THEME.muted_style()));
            spans.push(Span::styled(wallet.clone(), THEME.address_style()));
        }
        spans.push(Span::raw(" "));

        let info = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(info, chunks[2]);
    }
}
