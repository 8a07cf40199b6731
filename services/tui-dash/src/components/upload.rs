use ratatui::{prelude::*, widgets::*};
use svckit::session::SessionData;

use super::{colors, panel};
use crate::state::{DashboardState, UploadStatus};

pub fn draw_upload(frame: &mut Frame, area: Rect, state: &DashboardState, session: &SessionData) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(area);

    let intro = Paragraph::new(Line::from(Span::styled(
        "Enter the path of a sales CSV file and press Enter to upload and process it.",
        Style::default().fg(colors::SILVER),
    )))
    .block(panel("UPLOAD SALES DATA"));
    frame.render_widget(intro, rows[0]);

    let cursor = if state.is_uploading() { "" } else { "_" };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(colors::GOLD)),
        Span::styled(state.input.as_str(), Style::default().fg(colors::WHITE)),
        Span::styled(cursor, Style::default().fg(colors::GOLD).add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(panel("CSV FILE"));
    frame.render_widget(input, rows[1]);

    let mut lines = match &state.upload {
        UploadStatus::Idle => vec![Line::from(Span::styled(
            "Waiting for a file.",
            Style::default().fg(colors::SILVER),
        ))],
        UploadStatus::Uploading(path) => vec![Line::from(Span::styled(
            format!("Uploading and processing {}...", path.display()),
            Style::default().fg(colors::GOLD),
        ))],
        UploadStatus::Done { file_id, rows, features } => vec![
            Line::from(Span::styled(
                format!("Processed {} rows, {} features created.", rows, features),
                Style::default().fg(colors::SUCCESS).bold(),
            )),
            Line::from(Span::styled(
                format!("File id {}", file_id),
                Style::default().fg(colors::WHITE),
            )),
        ],
        UploadStatus::Failed(message) => vec![Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(colors::ERROR).bold(),
        ))],
    };

    if let Some(file_id) = &session.file_id {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Current upload: {} (press Tab to view the forecast)", file_id),
            Style::default().fg(colors::SILVER),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(panel("STATUS"))
            .wrap(Wrap { trim: true }),
        rows[2],
    );
}
