use ratatui::{prelude::*, widgets::*};

use super::{colors, Screen};
use crate::state::View;

pub fn draw_header(frame: &mut Frame, area: Rect, screen: &Screen) {
    let mode_color = match screen.mode {
        "DEMO" => colors::GOLD,
        _ => colors::SUCCESS,
    };

    let file_label = match (&screen.session.file_id, screen.session.is_processing) {
        (_, true) => Span::styled("processing upload...", Style::default().fg(colors::GOLD)),
        (Some(id), false) => Span::styled(format!("file {}", id), Style::default().fg(colors::WHITE)),
        (None, false) => Span::styled("no file uploaded", Style::default().fg(colors::SILVER)),
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            " SALES FORECAST ",
            Style::default().fg(colors::WHITE).bg(colors::DARK_ACCENT).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", screen.mode),
            Style::default().fg(mode_color).bold(),
        ),
        Span::raw("  "),
        file_label,
    ]);

    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(colors::DARK_ACCENT))
        .style(Style::default().bg(colors::BG_DARK));

    frame.render_widget(Paragraph::new(title).block(border.clone()), chunks[0]);

    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(screen.state.view.index())
        .style(Style::default().fg(colors::SILVER))
        .highlight_style(Style::default().fg(colors::GOLD).bold())
        .divider(Span::raw("|"))
        .block(border);

    frame.render_widget(tabs, chunks[1]);
}
