use crate::theme::help::HEADING_STYLE;
use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{HorizontalAlignment, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

/// Width of the column naming a key or gesture
const KEY_WIDTH: usize = 22;

static KEYS: &[(&str, &str)] = &[
    ("h, LEFT, PAGE UP", "Previous month"),
    ("l, RIGHT, PAGE DOWN", "Next month"),
    ("0, HOME", "Jump to today"),
    ("g", "Input month to jump to"),
    ("TAB", "Select next range"),
    ("ENTER", "Accept selection"),
    ("?", "Show this help"),
    ("q, ESC", "Quit"),
];

static MOUSE: &[(&str, &str)] = &[
    ("drag", "Select the days passed over"),
    ("click", "Set the next end of the range"),
    ("hover", "Preview the range"),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Help {
    fn text() -> Text<'static> {
        let mut lines = Vec::new();
        for (title, entries) in [("Keyboard", KEYS), ("Mouse", MOUSE)] {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::styled(title, HEADING_STYLE));
            lines.extend(entries.iter().map(|(what, does)| {
                Line::raw(format!("{what:<width$}{does}", width = KEY_WIDTH))
            }));
        }
        lines.push(Line::default());
        lines.push(Line::raw("Press the Any Key to dismiss."));
        Text::from(lines)
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Help::text();
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Commands ")
                    .title_alignment(HorizontalAlignment::Center),
            )
            .style(self.0);
        let [help_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [help_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(help_area);
        let outer_area = Rect {
            x: help_area.x.saturating_sub(1),
            y: help_area.y,
            width: help_area.width.saturating_add(2),
            height: help_area.height,
        };
        Clear.render(outer_area, buf);
        Block::new().style(self.0).render(outer_area, buf);
        para.render(help_area, buf);
    }
}
