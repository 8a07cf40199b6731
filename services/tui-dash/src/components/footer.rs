use ratatui::{prelude::*, widgets::*};
use svckit::metrics;

use super::colors;
use crate::state::{DashboardState, View};

fn key(label: &str, color: Color) -> Span<'_> {
    Span::styled(label, Style::default().fg(colors::BG_DARK).bg(color))
}

fn hint(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(colors::SILVER))
}

pub fn draw_footer(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let mut help = vec![
        key(" [ESC] ", colors::ERROR),
        hint(" Quit "),
        Span::raw(" "),
        key(" [TAB] ", colors::ACCENT),
        hint(" Next page "),
        Span::raw(" "),
    ];

    match state.view {
        View::Upload => {
            help.push(key(" [ENTER] ", colors::GOLD));
            help.push(hint(" Upload "));
        }
        View::Data(_) => {
            help.push(key(" [1-4] ", colors::SILVER));
            help.push(hint(" Go to "));
            help.push(Span::raw(" "));
            help.push(key(" [R] ", colors::WHITE));
            help.push(hint(" Retry "));
            help.push(Span::raw(" "));
            help.push(key(" [P/D/C] ", colors::GOLD));
            help.push(hint(" PNG/PDF/CSV "));
        }
    }

    help.push(Span::raw("  "));
    help.push(Span::styled(
        format!(
            "requests {}  retries {}",
            metrics::total_requests(),
            metrics::total_retries()
        ),
        Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
    ));

    let mut lines = vec![Line::from(help)];
    if let Some(export) = &state.last_export {
        lines.push(Line::from(Span::styled(
            export.as_str(),
            Style::default().fg(colors::SUCCESS),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(colors::BG_DARK)),
        area,
    );
}
