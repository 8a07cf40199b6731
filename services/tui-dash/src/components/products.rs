use ratatui::{prelude::*, widgets::*};
use svckit::types::ProductsPayload;

use super::{colors, draw_placeholder, draw_stat_box, format_currency, format_percent, panel};

pub const NO_PRODUCT_DATA: &str = "No product data available";

const BAR_COLORS: [Color; 5] = [
    colors::GOLD,
    colors::ACCENT,
    colors::SUCCESS,
    colors::DARK_GOLD,
    colors::SILVER,
];

pub fn draw_products(frame: &mut Frame, area: Rect, payload: Option<&ProductsPayload>) {
    let Some(payload) = payload.filter(|p| !p.chart_data.is_empty() || !p.product_details.is_empty()) else {
        draw_placeholder(frame, area, "TOP PRODUCTS", NO_PRODUCT_DATA);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8)])
        .split(area);

    draw_summary_cards(frame, rows[0], payload);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    draw_share_chart(frame, body[0], payload);
    draw_products_table(frame, body[1], payload);
}

fn draw_summary_cards(frame: &mut Frame, area: Rect, payload: &ProductsPayload) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let summary = &payload.summary;
    draw_stat_box(frame, chunks[0], "PRODUCTS", &summary.total_products.to_string(), colors::WHITE);
    draw_stat_box(
        frame,
        chunks[1],
        "TOP 5 SHARE",
        &format_percent(summary.top_five_percentage),
        colors::GOLD,
    );
    draw_stat_box(
        frame,
        chunks[2],
        "TOP CATEGORY",
        &format!("{} {}", summary.top_category, format_percent(summary.top_category_percentage)),
        colors::SUCCESS,
    );
    draw_stat_box(
        frame,
        chunks[3],
        "HIGHEST MARGIN",
        &summary.highest_margin_product,
        colors::ACCENT,
    );
}

fn draw_share_chart(frame: &mut Frame, area: Rect, payload: &ProductsPayload) {
    if payload.chart_data.is_empty() {
        draw_placeholder(frame, area, "REVENUE SHARE", NO_PRODUCT_DATA);
        return;
    }

    let bars: Vec<Bar> = payload
        .chart_data
        .iter()
        .enumerate()
        .map(|(i, share)| {
            let label: String = share.name.chars().take(10).collect();
            Bar::default()
                .value((share.percent * 100.0).round().max(0.0) as u64)
                .text_value(format_percent(share.percent))
                .label(Line::from(label))
                .style(Style::default().fg(BAR_COLORS[i % BAR_COLORS.len()]))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel("REVENUE SHARE"))
        .bar_width(10)
        .bar_gap(2)
        .value_style(Style::default().fg(colors::BG_DARK).bold())
        .label_style(Style::default().fg(colors::SILVER))
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn draw_products_table(frame: &mut Frame, area: Rect, payload: &ProductsPayload) {
    let rows: Vec<Row> = payload
        .product_details
        .iter()
        .enumerate()
        .map(|(i, product)| {
            Row::new(vec![
                Cell::from(Span::styled(format!("{}", i + 1), Style::default().fg(colors::GOLD))),
                Cell::from(Span::styled(product.name.as_str(), Style::default().fg(colors::WHITE))),
                Cell::from(Span::styled(product.category.as_str(), Style::default().fg(colors::SILVER))),
                Cell::from(format_currency(product.revenue)),
                Cell::from(product.quantity.to_string()),
                Cell::from(format_percent(product.percentage)),
            ])
        })
        .collect();

    let header_style = Style::default().fg(colors::GOLD).bold();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from(Span::styled("#", header_style)),
            Cell::from(Span::styled("PRODUCT", header_style)),
            Cell::from(Span::styled("CATEGORY", header_style)),
            Cell::from(Span::styled("REVENUE", header_style)),
            Cell::from(Span::styled("QTY", header_style)),
            Cell::from(Span::styled("SHARE", header_style)),
        ])
        .bottom_margin(1),
    )
    .style(Style::default().fg(colors::WHITE))
    .block(panel("PRODUCT DETAILS"));

    frame.render_widget(table, area);
}
