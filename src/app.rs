use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::B256;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;

use crate::components::Component;
use crate::components::activity::ActivityView;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::search::{SearchAction, SearchBar};
use crate::components::status_bar::StatusBar;
use crate::components::tx_detail::TxDetailView;
use crate::components::welcome::WelcomeView;
use crate::data::DataService;
use crate::error::ResolveError;
use crate::events::{AppEvent, ExportKind, SearchQuery, View};
use crate::theme::THEME;

pub struct App {
    // Navigation
    view_stack: Vec<View>,
    current_view: View,
    /// Chain filter for the next request. Narrowed to the chain a result was
    /// found on so follow-up requests skip the other chains.
    chain_hint: Option<String>,

    // Components
    header: Header,
    welcome: WelcomeView,
    tx_detail: TxDetailView,
    activity: ActivityView,
    status_bar: StatusBar,
    search_bar: SearchBar,
    help: HelpOverlay,

    // Data
    data_service: Arc<DataService>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        data_service: Arc<DataService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate_ms: u64,
        chain_hint: Option<String>,
    ) -> Self {
        let registry = data_service.resolver().registry();
        let chain_names = registry.names().into_iter().map(str::to_string).collect();
        let ready = registry.iter().filter(|c| c.rpc_url.is_some()).count();

        let mut search_bar = SearchBar::new(chain_names);
        search_bar.select_chain(chain_hint.as_deref());
        let mut status_bar = StatusBar::new();
        status_bar.chains_ready = (ready, registry.iter().count());
        let mut header = Header::new();
        header.chain_name = chain_hint.clone();
        let welcome = WelcomeView::new(registry);

        Self {
            view_stack: Vec::new(),
            current_view: View::Welcome,
            chain_hint,
            header,
            welcome,
            tx_detail: TxDetailView::new(),
            activity: ActivityView::new(),
            status_bar,
            search_bar,
            help: HelpOverlay::new(),
            data_service,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Validate a search and open the transaction it names.
    pub fn submit_search(&mut self, input: &str, chain: Option<&str>) {
        match SearchQuery::parse(input, chain) {
            Ok(query) => {
                self.search_bar.deactivate();
                self.chain_hint = query.chain;
                self.header.chain_name = self.chain_hint.clone();
                self.header.wallet = None;
                self.navigate_to(View::TransactionDetail(query.hash));
            }
            Err(e) => {
                self.search_bar.active = true;
                self.search_bar.error = Some(e.to_string());
                self.status_bar.error_message = Some(e.to_string());
            }
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        match &self.current_view {
            View::Welcome => self.welcome.render(frame, chunks[1]),
            View::TransactionDetail(_) => self.tx_detail.render(frame, chunks[1]),
            View::WalletActivity(_) => self.activity.render(frame, chunks[1]),
        }

        self.status_bar.render(frame, chunks[2]);

        // Overlays (rendered on top)
        self.search_bar.render(frame, area);
        self.help.render(frame, area);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only handle key press events (not release/repeat) for cross-platform compat
            if key.kind != KeyEventKind::Press {
                return;
            }

            if self.help.handle_key(key) {
                return;
            }

            if self.search_bar.active {
                match self.search_bar.handle_key(key) {
                    Some(SearchAction::Submit { input, chain }) => {
                        self.submit_search(&input, chain.as_deref());
                    }
                    Some(SearchAction::Cancel) | None => {}
                }
                return;
            }

            // Global keys
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('/') | KeyCode::Char('s') => {
                    self.search_bar.select_chain(self.chain_hint.as_deref());
                    self.search_bar.activate();
                    return;
                }
                KeyCode::Char('?') => {
                    self.help.toggle();
                    return;
                }
                _ => {}
            }

            let app_event = match &self.current_view {
                View::Welcome => self.welcome.handle_key(key),
                View::TransactionDetail(_) => self.tx_detail.handle_key(key),
                View::WalletActivity(_) => self.activity.handle_key(key),
            };

            if let Some(event) = app_event {
                self.handle_app_event(event);
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TransactionLoaded(detail) => {
                if self.current_view != View::TransactionDetail(detail.tx.hash) {
                    tracing::debug!(hash = %detail.tx.hash, "dropping stale transaction reply");
                    return;
                }
                self.status_bar.loading = false;
                self.narrow_to_chain(&detail.chain_name);
                self.header.wallet = detail.tx.from.map(|a| a.to_checksum(None));
                self.tx_detail.explorer_url = self
                    .data_service
                    .resolver()
                    .registry()
                    .get(&detail.chain_name)
                    .map(|c| c.tx_url(&detail.tx.hash));
                self.tx_detail.loading = false;
                self.tx_detail.detail = Some(*detail);
            }
            AppEvent::ActivityLoaded(result) => {
                if self.current_view != View::WalletActivity(result.seed_hash) {
                    tracing::debug!(hash = %result.seed_hash, "dropping stale activity reply");
                    return;
                }
                self.status_bar.loading = false;
                self.narrow_to_chain(&result.chain_name);
                self.header.wallet = Some(result.wallet.to_checksum(None));
                self.activity.set_result(*result);
            }
            AppEvent::LookupFailed(err) => {
                self.status_bar.loading = false;
                self.tx_detail.loading = false;
                self.activity.loading = false;
                if matches!(err, ResolveError::InvalidHash(_)) {
                    self.search_bar.activate();
                    self.search_bar.error = Some(err.to_string());
                }
                self.status_bar.error_message = Some(err.to_string());
            }
            AppEvent::ExportRequested(kind) => self.request_export(kind),
            AppEvent::ExportComplete(message) => {
                self.status_bar.error_message = None;
                self.status_bar.info_message = Some(message);
            }
            AppEvent::Navigate(view) => {
                self.navigate_to(view);
            }
            AppEvent::Back => {
                self.go_back();
            }
            AppEvent::Error(msg) => {
                self.status_bar.error_message = Some(msg);
                self.status_bar.loading = false;
            }
        }
    }

    fn narrow_to_chain(&mut self, chain_name: &str) {
        let chain = self
            .data_service
            .resolver()
            .registry()
            .get(chain_name)
            .map(|c| (c.name.clone(), c.symbol.clone()));
        if let Some((name, symbol)) = chain {
            self.chain_hint = Some(name.clone());
            self.header.chain_name = Some(name);
            self.tx_detail.symbol = symbol.clone();
            self.activity.symbol = symbol;
        }
    }

    fn request_export(&mut self, kind: ExportKind) {
        match (kind, &self.current_view) {
            (ExportKind::Pdf, View::TransactionDetail(_)) => {
                if let Some(detail) = &self.tx_detail.detail {
                    self.data_service.export_pdf(detail.clone());
                }
            }
            (ExportKind::Csv, View::WalletActivity(_)) => {
                if let Some(result) = &self.activity.result {
                    self.data_service.export_csv(result.clone());
                }
            }
            (ExportKind::Json, View::WalletActivity(_)) => {
                if let Some(result) = &self.activity.result {
                    self.data_service.export_json(result.clone());
                }
            }
            _ => {}
        }
    }

    fn set_tab(&mut self) {
        match &self.current_view {
            View::Welcome | View::TransactionDetail(_) => self.header.current_tab = 0,
            View::WalletActivity(_) => self.header.current_tab = 1,
        }
    }

    fn navigate_to(&mut self, view: View) {
        self.status_bar.clear_messages();

        let old_view = std::mem::replace(&mut self.current_view, view.clone());
        self.view_stack.push(old_view);
        self.set_tab();

        match view {
            View::Welcome => {}
            View::TransactionDetail(hash) => self.load_transaction(hash),
            View::WalletActivity(hash) => {
                self.activity.reset();
                self.status_bar.loading = true;
                self.data_service
                    .fetch_activity(hash, self.chain_hint.clone());
            }
        }
    }

    fn load_transaction(&mut self, hash: B256) {
        if self
            .tx_detail
            .detail
            .as_ref()
            .is_some_and(|d| d.tx.hash == hash)
        {
            return;
        }
        self.tx_detail.reset();
        self.status_bar.loading = true;
        self.data_service
            .fetch_transaction(hash, self.chain_hint.clone());
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_stack.pop() {
            self.current_view = prev_view;
            self.set_tab();
            self.status_bar.clear_messages();
            self.status_bar.loading = false;
            // Returning to a transaction reached from the activity table may
            // need it reloaded.
            if let View::TransactionDetail(hash) = self.current_view {
                self.load_transaction(hash);
            }
        }
    }
}
