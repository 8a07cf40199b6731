use ratatui::{prelude::*, widgets::*};
use svckit::types::ReportPayload;

use super::{colors, draw_placeholder, panel};

pub const NO_REPORT: &str = "No report available";

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(colors::GOLD).bold()))
}

fn numbered<'a>(lines: &mut Vec<Line<'a>>, items: &'a [String]) {
    for (i, item) in items.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), Style::default().fg(colors::ACCENT)),
            Span::styled(item.as_str(), Style::default().fg(colors::WHITE)),
        ]));
    }
}

pub fn draw_report(frame: &mut Frame, area: Rect, report: Option<&ReportPayload>) {
    let Some(report) = report.filter(|r| **r != ReportPayload::default()) else {
        draw_placeholder(frame, area, "SALES REPORT", NO_REPORT);
        return;
    };

    let body = Style::default().fg(colors::WHITE);
    let mut lines = vec![
        heading("Executive Summary"),
        Line::from(Span::styled(report.summary.as_str(), body)),
        Line::from(""),
        heading("Key Insights"),
    ];
    numbered(&mut lines, &report.insights);
    lines.push(Line::from(""));
    lines.push(heading("Recommendations"));
    numbered(&mut lines, &report.recommendations);
    lines.push(Line::from(""));
    lines.push(heading("Future Outlook"));
    lines.push(Line::from(Span::styled(report.future_outlook.as_str(), body)));

    frame.render_widget(
        Paragraph::new(lines)
            .block(panel("SALES REPORT"))
            .wrap(Wrap { trim: true }),
        area,
    );
}
