// Loading, retrying and error views shared by the data pages.

use ratatui::{prelude::*, widgets::*};
use svckit::{FetchStatus, Page};

use super::{colors, panel};

fn page_title(page: Page) -> &'static str {
    match page {
        Page::Forecast => "SALES FORECAST",
        Page::Products => "TOP PRODUCTS",
        Page::Report => "SALES REPORT",
    }
}

/// Draws the pending view for `status` and returns true, or returns false
/// when the page content should be drawn instead.
pub fn draw_pending(frame: &mut Frame, area: Rect, page: Page, status: &FetchStatus) -> bool {
    let lines = match status {
        FetchStatus::Idle | FetchStatus::Loading => vec![Line::from(Span::styled(
            format!("Loading {}...", page.label()),
            Style::default().fg(colors::GOLD),
        ))],
        FetchStatus::Retrying { attempt, max, message } => vec![
            Line::from(Span::styled(
                format!("Analysis still processing, retrying (attempt {}/{})", attempt, max),
                Style::default().fg(colors::GOLD).bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(message.as_str(), Style::default().fg(colors::SILVER))),
        ],
        FetchStatus::Failed { message } => vec![
            Line::from(Span::styled(message.as_str(), Style::default().fg(colors::ERROR).bold())),
            Line::from(""),
            Line::from(vec![
                Span::styled(" [R] Retry ", Style::default().fg(colors::BG_DARK).bg(colors::WHITE)),
            ]),
        ],
        FetchStatus::RedirectToUpload => vec![Line::from(Span::styled(
            "Upload a CSV file first",
            Style::default().fg(colors::SILVER),
        ))],
        FetchStatus::Ready | FetchStatus::Cancelled => return false,
    };

    let block = panel(page_title(page));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[1],
    );
    true
}
