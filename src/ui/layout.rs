use {
    super::{
        renderer::{format_bill, format_clock, item_label},
        terminal::metric_items,
    },
    crate::{
        catalog::Catalog,
        state::{DashboardState, StatusLevel},
    },
    chrono::Local,
    ratatui::{
        layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Row, Table},
        Frame,
    },
    std::time::Duration,
};

/// Render the dashboard
pub fn render_layout(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    catalog: &Catalog,
    refresh_interval: Duration,
) {
    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(5),    // Item table
            Constraint::Length(4), // Per-item metrics
            Constraint::Length(3), // Totals
            Constraint::Length(3), // Status
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_items_table(f, chunks[1], state, catalog);
    render_metrics(f, chunks[2], state, catalog);
    render_totals(f, chunks[3], state, catalog);
    render_footer(f, chunks[4], state, refresh_interval);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Block::default()
        .borders(Borders::ALL)
        .title("Scanned Item Summary");

    let text = vec![
        Line::from(vec![Span::styled(
            "🛒 Smart Trolley Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw("🕒 Current Time: "),
            Span::styled(
                format_clock(&Local::now()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_items_table(f: &mut Frame, area: Rect, state: &DashboardState, catalog: &Catalog) {
    let block = Block::default().borders(Borders::ALL).title("Items");

    if state.summary.is_empty() {
        let notice = Paragraph::new("No items scanned yet.")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        f.render_widget(notice, area);
        return;
    }

    let currency = catalog.currency();
    let header = Row::new(vec![
        "Item".to_string(),
        "Qty".to_string(),
        format!("Unit Price ({})", currency),
        format!("Total Price ({})", currency),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .summary
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                row.item_name.clone(),
                row.quantity.to_string(),
                row.unit_price.to_string(),
                row.total_price.to_string(),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(40), // Item
        Constraint::Percentage(15), // Qty
        Constraint::Percentage(20), // Unit price
        Constraint::Percentage(25), // Total price
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn render_metrics(f: &mut Frame, area: Rect, state: &DashboardState, catalog: &Catalog) {
    let items = metric_items(catalog);
    if items.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = items
        .iter()
        .map(|_| Constraint::Ratio(1, items.len() as u32))
        .collect();
    let tiles = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (slot, (item_name, tile)) in items.iter().zip(tiles.iter()).enumerate() {
        let quantity = state.summary.quantity_of(item_name);
        let style = if quantity > 0 {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("[{}] {}", slot + 1, item_label(catalog, item_name)));
        let value = Paragraph::new(Line::from(Span::styled(quantity.to_string(), style)))
            .alignment(Alignment::Center)
            .block(block);

        f.render_widget(value, *tile);
    }
}

fn render_totals(f: &mut Frame, area: Rect, state: &DashboardState, catalog: &Catalog) {
    let summary = &state.summary;
    let currency = catalog.currency();

    let mut spans = vec![
        Span::styled("📦 Total Items: ", Style::default().fg(Color::Cyan)),
        Span::styled(
            summary.total_items.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("💰 Total Bill ({}): ", currency),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format_bill(summary.total_bill, currency),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if summary.unrecognized_events > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Unrecognized scans: {}", summary.unrecognized_events),
            Style::default().fg(Color::Magenta),
        ));
    }

    let totals = Block::default().borders(Borders::ALL).title("Totals");
    f.render_widget(Paragraph::new(Line::from(spans)).block(totals), area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &DashboardState, refresh_interval: Duration) {
    let mut spans = Vec::new();

    if let Some(error) = &state.poll_error {
        spans.push(Span::styled("Store: ", Style::default().fg(Color::Red)));
        spans.push(Span::raw(error.clone()));
    } else if let Some(status) = &state.status {
        let color = match status.level {
            StatusLevel::Info => Color::Blue,
            StatusLevel::Success => Color::Green,
            StatusLevel::Error => Color::Red,
        };
        spans.push(Span::styled(status.text.clone(), Style::default().fg(color)));
    } else {
        spans.push(Span::styled("Status: ", Style::default().fg(Color::Green)));
        spans.push(Span::raw(if state.last_refresh.is_some() {
            "Connected"
        } else {
            "Connecting..."
        }));
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::raw(format!(
        "Auto-refreshing every {} seconds",
        refresh_interval.as_secs()
    )));
    spans.push(Span::raw(" | [n] remove one · r refresh · q quit"));

    let footer = Block::default().borders(Borders::ALL).title("Status");
    f.render_widget(Paragraph::new(Line::from(spans)).block(footer), area);
}
