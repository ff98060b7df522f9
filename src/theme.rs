use ratatui::style::{Color, Modifier, Style};

use crate::data::types::{Origin, TxStatus};

pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub surface_bright: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub native_value: Color,
    pub address_color: Color,
    pub hash_color: Color,
    /// Rows that came from our own node scan.
    pub origin_node: Color,
    /// Rows taken verbatim from the block explorer.
    pub origin_explorer: Color,
    pub category: Color,
}

pub const THEME: Theme = Theme {
    bg: Color::Rgb(14, 17, 24),
    surface: Color::Rgb(22, 26, 36),
    surface_bright: Color::Rgb(34, 40, 54),
    text: Color::Rgb(222, 226, 232),
    text_muted: Color::Rgb(118, 126, 142),
    text_accent: Color::Cyan,
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    selected_bg: Color::Rgb(38, 62, 96),
    selected_fg: Color::White,
    border: Color::Rgb(58, 64, 80),
    border_focused: Color::Cyan,
    native_value: Color::Rgb(98, 126, 234),
    address_color: Color::Rgb(255, 179, 71),
    hash_color: Color::Rgb(150, 156, 180),
    origin_node: Color::Green,
    origin_explorer: Color::Rgb(230, 160, 60),
    category: Color::Rgb(190, 150, 230),
};

impl Theme {
    pub const fn header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub const fn selected_style(&self) -> Style {
        Style::new().fg(self.selected_fg).bg(self.selected_bg).add_modifier(Modifier::BOLD)
    }

    pub const fn border_style(&self) -> Style {
        Style::new().fg(self.border)
    }

    pub const fn border_focused_style(&self) -> Style {
        Style::new().fg(self.border_focused)
    }

    pub const fn muted_style(&self) -> Style {
        Style::new().fg(self.text_muted)
    }

    pub const fn accent_style(&self) -> Style {
        Style::new().fg(self.text_accent)
    }

    pub const fn success_style(&self) -> Style {
        Style::new().fg(self.success)
    }

    pub const fn error_style(&self) -> Style {
        Style::new().fg(self.error)
    }

    pub const fn warning_style(&self) -> Style {
        Style::new().fg(self.warning)
    }

    pub const fn native_style(&self) -> Style {
        Style::new().fg(self.native_value)
    }

    pub const fn address_style(&self) -> Style {
        Style::new().fg(self.address_color)
    }

    pub const fn hash_style(&self) -> Style {
        Style::new().fg(self.hash_color)
    }

    pub const fn category_style(&self) -> Style {
        Style::new().fg(self.category)
    }

    pub const fn origin_style(&self, origin: Origin) -> Style {
        match origin {
            Origin::Node => Style::new().fg(self.origin_node),
            Origin::Explorer => Style::new().fg(self.origin_explorer),
        }
    }

    pub const fn status_style(&self, status: TxStatus) -> Style {
        match status {
            TxStatus::Success => Style::new().fg(self.success).add_modifier(Modifier::BOLD),
            TxStatus::Failed => Style::new().fg(self.error).add_modifier(Modifier::BOLD),
        }
    }

    pub const fn table_header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface_bright).add_modifier(Modifier::BOLD)
    }
}
