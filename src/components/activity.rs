use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::report::ActivityReport;
use crate::data::types::{ResolutionResult, SourceOfTruth};
use crate::events::{AppEvent, ExportKind, View};
use crate::theme::THEME;
use crate::utils;

pub struct ActivityView {
    pub result: Option<ResolutionResult>,
    report: Option<ActivityReport>,
    pub symbol: String,
    pub loading: bool,
    table_state: TableState,
}

impl ActivityView {
    pub fn new() -> Self {
        Self {
            result: None,
            report: None,
            symbol: "ETH".to_string(),
            loading: false,
            table_state: TableState::default(),
        }
    }

    pub fn reset(&mut self) {
        self.result = None;
        self.report = None;
        self.loading = true;
        self.table_state.select(None);
    }

    pub fn set_result(&mut self, result: ResolutionResult) {
        self.report = Some(ActivityReport::from_result(&result));
        self.table_state
            .select((!result.transactions.is_empty()).then_some(0));
        self.result = Some(result);
        self.loading = false;
    }

    fn len(&self) -> usize {
        self.result.as_ref().map(|r| r.transactions.len()).unwrap_or(0)
    }

    fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if current + 1 >= len { current } else { current + 1 };
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.len() == 0 {
            return;
        }
        let prev = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(prev));
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect, result: &ResolutionResult) {
        let source = match result.source_of_truth {
            SourceOfTruth::NodeScan => {
                format!("node scan ({} blocks)", utils::format_number(result.blocks_scanned))
            }
            SourceOfTruth::ExplorerFallback => "explorer fallback".to_string(),
        };
        let line = Line::from(vec![
            Span::styled(" Wallet ", THEME.muted_style()),
            Span::styled(result.wallet.to_checksum(None), THEME.address_style()),
            Span::styled("  on ", THEME.muted_style()),
            Span::styled(result.chain_name.clone(), THEME.accent_style()),
            Span::styled("  | ", THEME.muted_style()),
            Span::styled(format!("{} txs", result.transactions.len()), Style::default().fg(THEME.text)),
            Span::styled("  | total ", THEME.muted_style()),
            Span::styled(utils::format_native(result.total_value, &self.symbol), THEME.native_style()),
            Span::styled("  | via ", THEME.muted_style()),
            Span::styled(source, Style::default().fg(THEME.warning)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect, report: &ActivityReport) {
        let block = Block::default()
            .title(format!(" Value per transaction ({}) ", self.symbol))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        // Bars are drawn oldest to newest, left to right.
        let bars: Vec<Bar> = report
            .chart
            .values
            .iter()
            .zip(&report.chart.labels)
            .rev()
            .map(|(value, label)| {
                let block_label = label.split(' ').next().unwrap_or_default().to_string();
                Bar::default()
                    .value((value * 1e6).round() as u64)
                    .text_value(format!("{value}"))
                    .label(Line::from(block_label))
                    .style(THEME.native_style())
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(10)
            .bar_gap(1)
            .value_style(Style::default().fg(THEME.text).add_modifier(Modifier::BOLD));
        frame.render_widget(chart, area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let Some(result) = &self.result else {
            return;
        };

        let header = Row::new(vec![
            Cell::from("Block"),
            Cell::from("Time"),
            Cell::from("Hash"),
            Cell::from("From"),
            Cell::from("To"),
            Cell::from("Value"),
            Cell::from("Gas"),
            Cell::from("Type"),
            Cell::from("Origin"),
        ])
        .style(THEME.table_header_style());

        let rows: Vec<Row> = result
            .transactions
            .iter()
            .map(|tx| {
                Row::new(vec![
                    Cell::from(tx.block_number.map(|n| n.to_string()).unwrap_or_default())
                        .style(THEME.accent_style()),
                    Cell::from(
                        tx.block_timestamp
                            .map(utils::format_time_ago)
                            .unwrap_or_else(|| "-".to_string()),
                    )
                    .style(THEME.muted_style()),
                    Cell::from(utils::truncate_hash(&tx.hash)).style(THEME.hash_style()),
                    Cell::from(tx.from.map(|a| utils::truncate_address(&a)).unwrap_or_default())
                        .style(THEME.address_style()),
                    Cell::from(
                        tx.to
                            .map(|a| utils::truncate_address(&a))
                            .unwrap_or_else(|| "(create)".to_string()),
                    )
                    .style(THEME.address_style()),
                    Cell::from(utils::format_native(tx.value, &self.symbol)).style(THEME.native_style()),
                    Cell::from(utils::format_number(tx.gas_limit)),
                    Cell::from(tx.annotation()).style(THEME.category_style()),
                    Cell::from(tx.origin.to_string()).style(THEME.origin_style(tx.origin)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(9),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(" Transactions (newest first) ")
                    .borders(Borders::ALL)
                    .border_style(THEME.border_focused_style()),
            )
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

impl Component for ActivityView {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Enter => {
                let idx = self.table_state.selected()?;
                let tx = self.result.as_ref()?.transactions.get(idx)?;
                Some(AppEvent::Navigate(View::TransactionDetail(tx.hash)))
            }
            KeyCode::Char('c') => self
                .result
                .as_ref()
                .map(|_| AppEvent::ExportRequested(ExportKind::Csv)),
            KeyCode::Char('e') => self
                .result
                .as_ref()
                .map(|_| AppEvent::ExportRequested(ExportKind::Json)),
            KeyCode::Esc | KeyCode::Backspace => Some(AppEvent::Back),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.loading && self.result.is_none() {
            let block = Block::default()
                .title(" Wallet Activity ")
                .borders(Borders::ALL)
                .border_style(THEME.border_focused_style());
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let loading = Paragraph::new("Scanning recent blocks for wallet activity...")
                .style(THEME.muted_style())
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Percentage(40),
                Constraint::Min(5),
            ])
            .split(area);

        let (Some(result), Some(report)) = (&self.result, &self.report) else {
            return;
        };
        self.render_summary(frame, chunks[0], result);
        self.render_chart(frame, chunks[1], report);
        self.render_table(frame, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::data::types::fixtures;

    fn press(view: &mut ActivityView, code: KeyCode) -> Option<AppEvent> {
        view.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn result() -> ResolutionResult {
        let wallet = Address::repeat_byte(1);
        ResolutionResult {
            seed_hash: B256::repeat_byte(0xaa),
            wallet,
            chain_name: "TestChain".into(),
            transactions: vec![
                fixtures::tx(0x01, Some(wallet), None, 9),
                fixtures::tx(0x02, Some(wallet), None, 8),
            ],
            total_value: U256::ZERO,
            source_of_truth: SourceOfTruth::NodeScan,
            blocks_scanned: 2,
        }
    }

    #[test]
    fn test_enter_opens_selected_transaction() {
        let mut view = ActivityView::new();
        view.set_result(result());
        press(&mut view, KeyCode::Down);
        press(&mut view, KeyCode::Down);
        assert!(matches!(
            press(&mut view, KeyCode::Enter),
            Some(AppEvent::Navigate(View::TransactionDetail(h))) if h == B256::repeat_byte(0x02)
        ));
    }

    #[test]
    fn test_exports_need_a_result() {
        let mut view = ActivityView::new();
        assert!(press(&mut view, KeyCode::Char('c')).is_none());
        view.set_result(result());
        assert!(matches!(
            press(&mut view, KeyCode::Char('c')),
            Some(AppEvent::ExportRequested(ExportKind::Csv))
        ));
        assert!(matches!(
            press(&mut view, KeyCode::Char('e')),
            Some(AppEvent::ExportRequested(ExportKind::Json))
        ));
    }
}
