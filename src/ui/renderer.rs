// Formatting helpers shared by the terminal layout and the headless summary

use {
    crate::{aggregator::Summary, catalog::Catalog},
    chrono::{DateTime, TimeZone},
    std::fmt::Write,
};

/// Format a bill total, `Rs. 130` for rupees and `130 USD` otherwise
pub fn format_bill(amount: u64, currency: &str) -> String {
    match currency {
        "PKR" | "INR" => format!("Rs. {}", amount),
        _ => format!("{} {}", amount, currency),
    }
}

pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%d-%m-%Y %H:%M:%S").to_string()
}

/// Tile label for an item, with its icon when the catalog has one
pub fn item_label(catalog: &Catalog, item_name: &str) -> String {
    match catalog.icon(item_name) {
        Some(icon) if !icon.is_empty() => format!("{} {}", icon, item_name),
        _ => item_name.to_string(),
    }
}

/// Plain-text summary for `--once`
pub fn render_plain(summary: &Summary, catalog: &Catalog) -> String {
    let currency = catalog.currency();
    let unit_header = format!("Unit Price ({})", currency);
    let total_header = format!("Total Price ({})", currency);
    let name_width = summary
        .rows
        .iter()
        .map(|row| row.item_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Item".len());

    let mut out = String::new();
    if summary.is_empty() {
        out.push_str("No items scanned yet.\n");
    } else {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>5}  {:>uw$}  {:>tw$}",
            "Item",
            "Qty",
            unit_header,
            total_header,
            uw = unit_header.len(),
            tw = total_header.len(),
        );
        for row in &summary.rows {
            let _ = writeln!(
                out,
                "{:<name_width$}  {:>5}  {:>uw$}  {:>tw$}",
                row.item_name,
                row.quantity,
                row.unit_price,
                row.total_price,
                uw = unit_header.len(),
                tw = total_header.len(),
            );
        }
    }

    out.push('\n');
    let _ = writeln!(out, "Total Items: {}", summary.total_items);
    let _ = writeln!(
        out,
        "Total Bill ({}): {}",
        currency,
        format_bill(summary.total_bill, currency)
    );
    if summary.unrecognized_events > 0 {
        let _ = writeln!(out, "Unrecognized scans: {}", summary.unrecognized_events);
    }
    out
}
