use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::chains::ChainRegistry;
use crate::events::AppEvent;
use crate::theme::THEME;

/// One registry entry as shown on the start screen.
pub struct ChainRow {
    pub name: String,
    pub chain_id: u64,
    pub rpc_configured: bool,
    pub explorer_key: Option<String>,
}

pub struct WelcomeView {
    pub chains: Vec<ChainRow>,
}

impl WelcomeView {
    pub fn new(registry: &ChainRegistry) -> Self {
        let chains = registry
            .iter()
            .map(|c| ChainRow {
                name: c.name.clone(),
                chain_id: c.chain_id,
                rpc_configured: c.rpc_url.is_some(),
                explorer_key: c
                    .explorer
                    .api_key
                    .is_none()
                    .then(|| c.explorer.api_key_env.clone()),
            })
            .collect();
        Self { chains }
    }
}

fn yes_no(ok: bool) -> Cell<'static> {
    if ok {
        Cell::from("\u{2713} yes").style(THEME.success_style())
    } else {
        Cell::from("\u{2717} no").style(THEME.error_style())
    }
}

impl Component for WelcomeView {
    fn handle_key(&mut self, _key: KeyEvent) -> Option<AppEvent> {
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);

        let intro = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Paste a transaction hash to see the transaction and the recent activity of its sender.",
                Style::default().fg(THEME.text),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", THEME.muted_style()),
                Span::styled("/", THEME.accent_style().add_modifier(Modifier::BOLD)),
                Span::styled(" to search, ", THEME.muted_style()),
                Span::styled("Tab", THEME.accent_style().add_modifier(Modifier::BOLD)),
                Span::styled(" in the search box to pick a chain, ", THEME.muted_style()),
                Span::styled("?", THEME.accent_style().add_modifier(Modifier::BOLD)),
                Span::styled(" for help.", THEME.muted_style()),
            ]),
        ];
        let intro_block = Block::default()
            .title(" tx-tracker ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        frame.render_widget(Paragraph::new(intro).block(intro_block), chunks[0]);

        let header = Row::new(vec![
            Cell::from("Chain"),
            Cell::from("Chain ID"),
            Cell::from("RPC"),
            Cell::from("Explorer key"),
        ])
        .style(THEME.table_header_style());

        let rows: Vec<Row> = self
            .chains
            .iter()
            .map(|c| {
                let explorer = match &c.explorer_key {
                    None => yes_no(true),
                    Some(env) => Cell::from(format!("\u{2717} set {env}")).style(THEME.warning_style()),
                };
                Row::new(vec![
                    Cell::from(c.name.clone()).style(THEME.accent_style()),
                    Cell::from(c.chain_id.to_string()),
                    yes_no(c.rpc_configured),
                    explorer,
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(22),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(20),
        ];
        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .title(" Chains (searched in this order) ")
                .borders(Borders::ALL)
                .border_style(THEME.border_style()),
        );
        frame.render_widget(table, chunks[1]);
    }
}
