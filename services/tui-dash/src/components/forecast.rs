use ratatui::{prelude::*, widgets::*};
use svckit::types::{ForecastPayload, ForecastPoint};

use super::{colors, draw_placeholder, draw_stat_box, format_currency, format_percent, panel};

pub const NO_FORECAST_DATA: &str = "No forecast data available";

pub fn draw_forecast(frame: &mut Frame, area: Rect, payload: Option<&ForecastPayload>) {
    let Some(payload) = payload.filter(|p| !p.chart_data.is_empty()) else {
        draw_placeholder(frame, area, "SALES FORECAST", NO_FORECAST_DATA);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8)])
        .split(area);

    draw_summary_cards(frame, rows[0], payload);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);

    draw_chart(frame, body[0], &payload.chart_data);
    draw_model_details(frame, body[1], payload);
}

fn draw_summary_cards(frame: &mut Frame, area: Rect, payload: &ForecastPayload) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let best = &payload.prediction_results.best_model;
    let summary = &payload.prediction_results.prediction_summary;

    let accuracy = best
        .accuracy_score
        .map(|score| format!(" ({})", format_percent(score * 100.0)))
        .unwrap_or_default();
    draw_stat_box(
        frame,
        chunks[0],
        "BEST MODEL",
        &format!("{}{}", best.display_name(), accuracy),
        colors::GOLD,
    );

    draw_stat_box(
        frame,
        chunks[1],
        "AVG PREDICTED",
        &summary.avg_predicted_sales.map(format_currency).unwrap_or_else(|| "-".to_string()),
        colors::WHITE,
    );

    let peak = match (&summary.max_predicted_day, summary.max_predicted_value) {
        (Some(day), Some(value)) => format!("{} {}", day, format_currency(value)),
        (Some(day), None) => day.clone(),
        _ => "-".to_string(),
    };
    draw_stat_box(frame, chunks[2], "PEAK DAY", &peak, colors::SUCCESS);

    let trend = match (&summary.trend, summary.trend_percentage) {
        (Some(trend), Some(pct)) => format!("{} {}", trend, format_percent(pct)),
        (Some(trend), None) => trend.clone(),
        _ => "-".to_string(),
    };
    let trend_color = if summary.trend.as_deref() == Some("decreasing") {
        colors::ERROR
    } else {
        colors::SUCCESS
    };
    draw_stat_box(frame, chunks[3], "TREND", &trend, trend_color);
}

fn series(points: &[ForecastPoint], value: impl Fn(&ForecastPoint) -> Option<f64>) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| value(p).map(|v| (i as f64, v)))
        .collect()
}

fn draw_chart(frame: &mut Frame, area: Rect, points: &[ForecastPoint]) {
    let actual = series(points, |p| p.actual);
    let predicted = series(points, |p| Some(p.predicted));
    let lower = series(points, |p| p.lower_bound);
    let upper = series(points, |p| p.upper_bound);

    let (y_min, y_max) = actual
        .iter()
        .chain(&predicted)
        .chain(&lower)
        .chain(&upper)
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));
    let pad = ((y_max - y_min) * 0.1).max(1.0);
    let (y_min, y_max) = ((y_min - pad).max(0.0), y_max + pad);
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let band_style = Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM);
    let datasets = vec![
        Dataset::default()
            .name("Upper bound")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(band_style)
            .data(&upper),
        Dataset::default()
            .name("Lower bound")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(band_style)
            .data(&lower),
        Dataset::default()
            .name("Predicted")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors::ACCENT))
            .data(&predicted),
        Dataset::default()
            .name("Actual")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors::SUCCESS))
            .data(&actual),
    ];

    let first = points.first().map(|p| p.date.clone()).unwrap_or_default();
    let middle = points.get(points.len() / 2).map(|p| p.date.clone()).unwrap_or_default();
    let last = points.last().map(|p| p.date.clone()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(panel("SALES FORECAST"))
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(colors::SILVER))
                .bounds([0.0, x_max])
                .labels(vec![first, middle, last]),
        )
        .y_axis(
            Axis::default()
                .title("Sales ($)")
                .style(Style::default().fg(colors::SILVER))
                .bounds([y_min, y_max])
                .labels(vec![
                    format!("${:.0}", y_min),
                    format!("${:.0}", (y_min + y_max) / 2.0),
                    format!("${:.0}", y_max),
                ]),
        )
        .legend_position(Some(LegendPosition::TopLeft));

    frame.render_widget(chart, area);
}

fn draw_model_details(frame: &mut Frame, area: Rect, payload: &ForecastPayload) {
    let items: Vec<ListItem> = payload
        .model_details
        .iter()
        .map(|(key, value)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}: ", key.replace('_', " ")), Style::default().fg(colors::SILVER)),
                Span::styled(value.to_string(), Style::default().fg(colors::WHITE)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(panel("MODEL DETAILS")), area);
}
