use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::types::{TransactionDetail, TxStatus};
use crate::events::{AppEvent, ExportKind, View};
use crate::theme::THEME;
use crate::utils;

pub struct TxDetailView {
    pub detail: Option<TransactionDetail>,
    /// Explorer link for the transaction on the chain it was found on.
    pub explorer_url: Option<String>,
    pub symbol: String,
    pub loading: bool,
    scroll: u16,
    max_scroll: u16,
}

impl TxDetailView {
    pub fn new() -> Self {
        Self {
            detail: None,
            explorer_url: None,
            symbol: "ETH".to_string(),
            loading: false,
            scroll: 0,
            max_scroll: 0,
        }
    }

    pub fn reset(&mut self) {
        self.detail = None;
        self.explorer_url = None;
        self.loading = true;
        self.scroll = 0;
    }

    fn section(title: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ))
    }

    fn build_lines(&self, detail: &TransactionDetail) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let tx = &detail.tx;

        lines.push(Line::from(vec![
            Span::styled("  Hash:  ", THEME.muted_style()),
            Span::styled(format!("{:#x}", tx.hash), THEME.hash_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Chain:  ", THEME.muted_style()),
            Span::styled(detail.chain_name.clone(), THEME.accent_style()),
        ]));

        let status_text = match detail.status {
            TxStatus::Success => "\u{2713} Success",
            TxStatus::Failed => "\u{2717} Failed",
        };
        let status_value = Span::styled(status_text, THEME.status_style(detail.status));
        lines.push(Line::from(vec![
            Span::styled("  Status:  ", THEME.muted_style()),
            status_value,
        ]));

        if let Some(block_num) = tx.block_number {
            lines.push(Line::from(vec![
                Span::styled("  Block:  ", THEME.muted_style()),
                Span::styled(utils::format_number(block_num), THEME.accent_style()),
            ]));
        }

        if let Some(ts) = tx.block_timestamp {
            lines.push(Line::from(vec![
                Span::styled("  Timestamp:  ", THEME.muted_style()),
                Span::raw(utils::format_timestamp(ts)),
                Span::raw("  ("),
                Span::raw(utils::format_time_ago(ts)),
                Span::raw(")"),
            ]));
        }

        lines.push(Line::from(vec![
            Span::styled("  Category:  ", THEME.muted_style()),
            Span::styled(tx.annotation(), THEME.category_style()),
        ]));

        // ---- Parties ----
        lines.push(Line::from(""));
        lines.push(Self::section("Parties"));
        lines.push(Line::from(""));

        let label_span = |label: &Option<String>| match label {
            Some(l) => Span::styled(format!("  [{l}]"), THEME.accent_style()),
            None => Span::raw(""),
        };

        let from = tx
            .from
            .map(|a| a.to_checksum(None))
            .unwrap_or_else(|| "unknown".to_string());
        lines.push(Line::from(vec![
            Span::styled("  From:  ", THEME.muted_style()),
            Span::styled(from, THEME.address_style()),
            label_span(&detail.from_label),
        ]));

        match &tx.to {
            Some(addr) => lines.push(Line::from(vec![
                Span::styled("  To:    ", THEME.muted_style()),
                Span::styled(addr.to_checksum(None), THEME.address_style()),
                label_span(&detail.to_label),
            ])),
            None => lines.push(Line::from(vec![
                Span::styled("  To:    ", THEME.muted_style()),
                Span::styled("Contract Creation", Style::default().fg(THEME.warning)),
            ])),
        }

        lines.push(Line::from(vec![
            Span::styled("  Value:  ", THEME.muted_style()),
            Span::styled(utils::format_native(tx.value, &self.symbol), THEME.native_style()),
        ]));

        // ---- Gas ----
        lines.push(Line::from(""));
        lines.push(Self::section("Gas"));
        lines.push(Line::from(""));

        lines.push(Line::from(vec![
            Span::styled("  Gas Limit:  ", THEME.muted_style()),
            Span::raw(utils::format_number(tx.gas_limit)),
        ]));
        if let Some(gas_price) = tx.gas_price {
            lines.push(Line::from(vec![
                Span::styled("  Gas Price:  ", THEME.muted_style()),
                Span::raw(utils::format_gwei(gas_price)),
            ]));
        }

        // ---- Raw Input ----
        lines.push(Line::from(""));
        lines.push(Self::section("Raw Input"));
        lines.push(Line::from(""));

        let input_hex = format!("{}", tx.input);
        let truncated = if input_hex.len() > 200 {
            format!("  {}...", &input_hex[..200])
        } else {
            format!("  {input_hex}")
        };
        lines.push(Line::from(Span::styled(truncated, THEME.muted_style())));

        if let Some(url) = &self.explorer_url {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  Explorer:  ", THEME.muted_style()),
                Span::styled(url.clone(), THEME.accent_style()),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  a", THEME.accent_style()),
            Span::styled(":Wallet activity  ", THEME.muted_style()),
            Span::styled("p", THEME.accent_style()),
            Span::styled(":Export PDF", THEME.muted_style()),
        ]));

        lines
    }
}

impl Component for TxDetailView {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Backspace, _) => Some(AppEvent::Back),
            (KeyCode::Char('a'), _) => self
                .detail
                .as_ref()
                .map(|d| AppEvent::Navigate(View::WalletActivity(d.tx.hash))),
            (KeyCode::Char('p'), _) => self
                .detail
                .as_ref()
                .map(|_| AppEvent::ExportRequested(ExportKind::Pdf)),
            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
                if self.scroll < self.max_scroll {
                    self.scroll += 1;
                }
                None
            }
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.scroll = self.scroll.saturating_add(20).min(self.max_scroll);
                None
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.scroll = self.scroll.saturating_sub(20);
                None
            }
            (KeyCode::Char('g'), _) => {
                self.scroll = 0;
                None
            }
            (KeyCode::Char('G'), _) => {
                self.scroll = self.max_scroll;
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::default()
            .title(" Transaction Detail ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        if self.loading && self.detail.is_none() {
            let loading = Paragraph::new("Searching chains...")
                .style(THEME.muted_style())
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
            return;
        }

        let detail = match &self.detail {
            Some(d) => d,
            None => return,
        };

        let lines = self.build_lines(detail);
        let total_lines = lines.len() as u16;
        self.max_scroll = total_lines.saturating_sub(inner.height);

        if self.scroll > self.max_scroll {
            self.scroll = self.max_scroll;
        }

        let paragraph = Paragraph::new(lines)
            .style(Style::default().fg(THEME.text))
            .scroll((self.scroll, 0));

        frame.render_widget(paragraph, inner);

        if total_lines > inner.height {
            let mut scroll_state = ScrollbarState::default()
                .content_length(total_lines as usize)
                .position(self.scroll as usize);

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("^"))
                .end_symbol(Some("v"));

            frame.render_stateful_widget(scrollbar, inner, &mut scroll_state);
        }
    }
}
