// services/tui-dash/src/components/mod.rs
//
// Presentation components. Every draw function is a pure function of the
// dashboard state and a session snapshot.

use ratatui::{prelude::*, widgets::*};
use svckit::session::SessionData;
use svckit::{FetchStatus, Page};

use crate::state::{DashboardState, View};

mod footer;
mod forecast;
mod header;
mod log;
mod products;
mod report;
mod status;
mod upload;

pub use forecast::NO_FORECAST_DATA;
pub use products::NO_PRODUCT_DATA;
pub use report::NO_REPORT;

// Color palette: Blue accent, Cream, Silver, Gold on dark teal
pub mod colors {
    use ratatui::style::Color;

    pub const ACCENT: Color = Color::Rgb(38, 139, 210);
    pub const DARK_ACCENT: Color = Color::Rgb(7, 54, 66);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SILVER: Color = Color::Rgb(147, 161, 161);
    pub const GOLD: Color = Color::Rgb(255, 193, 37);
    pub const DARK_GOLD: Color = Color::Rgb(184, 134, 11);
    pub const BG_DARK: Color = Color::Rgb(0, 20, 30);
    pub const BG_PANEL: Color = Color::Rgb(7, 30, 41);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
    pub const ERROR: Color = Color::Rgb(220, 50, 47);
}

/// Everything one frame needs.
pub struct Screen<'a> {
    pub state: &'a DashboardState,
    pub session: &'a SessionData,
    /// Fetch status of the page on screen; `None` on the upload view.
    pub status: Option<&'a FetchStatus>,
    pub mode: &'a str,
}

pub fn draw_ui(frame: &mut Frame, screen: &Screen) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(12),   // Page
            Constraint::Length(8), // Activity
            Constraint::Length(2), // Footer
        ])
        .split(area);

    header::draw_header(frame, chunks[0], screen);
    draw_page(frame, chunks[1], screen);
    log::draw_activity_panel(frame, chunks[2], screen.state);
    footer::draw_footer(frame, chunks[3], screen.state);
}

fn draw_page(frame: &mut Frame, area: Rect, screen: &Screen) {
    let page = match screen.state.view {
        View::Upload => {
            upload::draw_upload(frame, area, screen.state, screen.session);
            return;
        }
        View::Data(page) => page,
    };

    let idle = FetchStatus::Idle;
    let status = screen.status.unwrap_or(&idle);
    if status::draw_pending(frame, area, page, status) {
        return;
    }

    match page {
        Page::Forecast => forecast::draw_forecast(frame, area, screen.session.forecast.as_ref()),
        Page::Products => products::draw_products(frame, area, screen.session.products.as_ref()),
        Page::Report => report::draw_report(frame, area, screen.session.report().as_ref()),
    }
}

pub(crate) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}

pub(crate) fn draw_placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let block = panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Span::styled(message, Style::default().fg(colors::SILVER)))
            .alignment(Alignment::Center),
        rows[1],
    );
}

pub(crate) fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: &str, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            label,
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            value,
            Style::default().fg(value_color).add_modifier(Modifier::BOLD),
        )),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

pub fn format_currency(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}
