use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// Outcome of a key press in the search popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Submit { input: String, chain: Option<String> },
    Cancel,
}

pub struct SearchBar {
    pub active: bool,
    pub input: String,
    cursor_position: usize,
    pub error: Option<String>,
    /// Registry chain names; index 0 of the cycle means "all chains".
    chains: Vec<String>,
    chain_index: usize,
}

impl SearchBar {
    pub fn new(chains: Vec<String>) -> Self {
        Self {
            active: false,
            input: String::new(),
            cursor_position: 0,
            error: None,
            chains,
            chain_index: 0,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.input.clear();
        self.cursor_position = 0;
        self.error = None;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.error = None;
    }

    /// Currently selected chain, `None` for all chains.
    pub fn chain(&self) -> Option<&str> {
        match self.chain_index {
            0 => None,
            i => self.chains.get(i - 1).map(String::as_str),
        }
    }

    /// Preselect a chain by name; unknown names select all chains.
    pub fn select_chain(&mut self, name: Option<&str>) {
        self.chain_index = name
            .and_then(|n| self.chains.iter().position(|c| c.eq_ignore_ascii_case(n)))
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    /// Byte offset of the cursor, which counts characters.
    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn cycle_chain(&mut self, forward: bool) {
        let options = self.chains.len() + 1;
        self.chain_index = if forward {
            (self.chain_index + 1) % options
        } else {
            (self.chain_index + options - 1) % options
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SearchAction> {
        if !self.active {
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                self.active = false;
                Some(SearchAction::Submit {
                    input: self.input.trim().to_string(),
                    chain: self.chain().map(str::to_string),
                })
            }
            KeyCode::Esc => {
                self.deactivate();
                Some(SearchAction::Cancel)
            }
            KeyCode::Tab => {
                self.cycle_chain(true);
                None
            }
            KeyCode::BackTab => {
                self.cycle_chain(false);
                None
            }
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let idx = self.byte_index();
                    self.input.remove(idx);
                }
                self.error = None;
                None
            }
            KeyCode::Delete => {
                if self.cursor_position < self.char_count() {
                    let idx = self.byte_index();
                    self.input.remove(idx);
                }
                self.error = None;
                None
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                if self.cursor_position < self.char_count() {
                    self.cursor_position += 1;
                }
                None
            }
            KeyCode::Home => {
                self.cursor_position = 0;
                None
            }
            KeyCode::End => {
                self.cursor_position = self.char_count();
                None
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'u' {
                    self.input.clear();
                    self.cursor_position = 0;
                } else {
                    let idx = self.byte_index();
                    self.input.insert(idx, c);
                    self.cursor_position += 1;
                }
                self.error = None;
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }

        let width = area.width.min(76);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let popup_area = Rect::new(x, area.y + 2, width, 4);

        frame.render_widget(Clear, popup_area);

        let border_style = if self.error.is_some() {
            Style::default().fg(THEME.error)
        } else {
            THEME.border_focused_style()
        };

        let title = if let Some(ref err) = self.error {
            format!(" Search - {err} ")
        } else {
            " Search (transaction hash) ".to_string()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .style(Style::default().bg(THEME.surface));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let display_text = if self.input.is_empty() {
            Span::styled("0x...", THEME.muted_style())
        } else {
            Span::styled(&self.input, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(display_text), rows[0]);

        let chain_line = Line::from(vec![
            Span::styled("Chain: ", THEME.muted_style()),
            Span::styled(self.chain().unwrap_or("all chains"), THEME.accent_style()),
            Span::styled("  (Tab to change)", THEME.muted_style()),
        ]);
        frame.render_widget(Paragraph::new(chain_line), rows[1]);

        let cursor_x = inner.x + self.cursor_position as u16;
        if cursor_x < inner.right() {
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(bar: &mut SearchBar, code: KeyCode) -> Option<SearchAction> {
        bar.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn bar() -> SearchBar {
        let mut bar = SearchBar::new(vec!["Ethereum Mainnet".into(), "Polygon Mainnet".into()]);
        bar.activate();
        bar
    }

    #[test]
    fn test_tab_cycles_through_all_chains() {
        let mut bar = bar();
        assert_eq!(bar.chain(), None);
        press(&mut bar, KeyCode::Tab);
        assert_eq!(bar.chain(), Some("Ethereum Mainnet"));
        press(&mut bar, KeyCode::Tab);
        assert_eq!(bar.chain(), Some("Polygon Mainnet"));
        press(&mut bar, KeyCode::Tab);
        assert_eq!(bar.chain(), None);
        press(&mut bar, KeyCode::BackTab);
        assert_eq!(bar.chain(), Some("Polygon Mainnet"));
    }

    #[test]
    fn test_submit_carries_input_and_chain() {
        let mut bar = bar();
        for c in "0xab".chars() {
            press(&mut bar, KeyCode::Char(c));
        }
        press(&mut bar, KeyCode::Tab);
        let action = press(&mut bar, KeyCode::Enter);
        assert_eq!(
            action,
            Some(SearchAction::Submit {
                input: "0xab".into(),
                chain: Some("Ethereum Mainnet".into())
            })
        );
        assert!(!bar.active);
    }

    #[test]
    fn test_escape_cancels() {
        let mut bar = bar();
        assert_eq!(press(&mut bar, KeyCode::Esc), Some(SearchAction::Cancel));
        assert!(press(&mut bar, KeyCode::Char('x')).is_none());
    }

    #[test]
    fn test_select_chain() {
        let mut bar = bar();
        bar.select_chain(Some("polygon mainnet"));
        assert_eq!(bar.chain(), Some("Polygon Mainnet"));
        bar.select_chain(Some("nowhere"));
        assert_eq!(bar.chain(), None);
    }

    #[test]
    fn test_editing_around_multibyte_characters() {
        let mut bar = bar();
        for c in ['é', 'a', 'ß', 'b'] {
            press(&mut bar, KeyCode::Char(c));
        }
        assert_eq!(bar.input, "éaßb");

        press(&mut bar, KeyCode::Left);
        press(&mut bar, KeyCode::Backspace);
        assert_eq!(bar.input, "éab");

        press(&mut bar, KeyCode::Home);
        press(&mut bar, KeyCode::Delete);
        assert_eq!(bar.input, "ab");

        press(&mut bar, KeyCode::End);
        press(&mut bar, KeyCode::Char('ü'));
        press(&mut bar, KeyCode::Right);
        press(&mut bar, KeyCode::Char('c'));
        assert_eq!(bar.input, "abüc");
    }
}
