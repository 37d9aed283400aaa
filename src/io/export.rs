use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{ItemVariant, LogEntry, ProductDetails, format_cents};

/// How listings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Flat record of one history entry, shared by the JSON and CSV writers.
#[derive(Debug, Serialize)]
struct HistoryRow {
    recorded_at: String,
    kind: &'static str,
    amount: String,
    entry: String,
}

impl From<&LogEntry> for HistoryRow {
    fn from(entry: &LogEntry) -> Self {
        Self {
            recorded_at: entry.recorded_at.to_rfc3339(),
            kind: entry.kind.as_str(),
            amount: format_cents(entry.amount_cents),
            entry: entry.to_string(),
        }
    }
}

/// Flat record of one product, shared by the JSON and CSV writers.
#[derive(Debug, Serialize)]
struct StockRow {
    id: u32,
    name: String,
    quantity: i64,
    kind: &'static str,
    brand: Option<String>,
    price: Option<String>,
}

impl From<&ProductDetails> for StockRow {
    fn from(details: &ProductDetails) -> Self {
        let (brand, price) = match &details.variant {
            ItemVariant::Electronic { brand, price_cents } => {
                (Some(brand.clone()), Some(format_cents(*price_cents)))
            }
            ItemVariant::General => (None, None),
        };
        Self {
            id: details.id,
            name: details.name.clone(),
            quantity: details.quantity,
            kind: details.variant.as_str(),
            brand,
            price,
        }
    }
}

/// Write a transaction history, oldest entry first.
pub fn write_history<'a, W: Write>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    format: OutputFormat,
    mut writer: W,
) -> Result<usize> {
    let rows: Vec<HistoryRow> = entries.into_iter().map(HistoryRow::from).collect();

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &rows)
                .context("Failed to write history as JSON")?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => write_csv(&rows, writer)?,
        OutputFormat::Table => {
            if rows.is_empty() {
                writeln!(writer, "No transactions yet.")?;
            } else {
                writeln!(writer, "{:<20} {:<12} {:>12}", "DATE", "TYPE", "AMOUNT")?;
                writeln!(writer, "{}", "-".repeat(46))?;
                for row in &rows {
                    let date = row.recorded_at.get(..19).unwrap_or(&row.recorded_at);
                    writeln!(
                        writer,
                        "{:<20} {:<12} {:>12}",
                        date.replace('T', " "),
                        row.kind,
                        row.amount
                    )?;
                }
            }
        }
    }

    Ok(rows.len())
}

/// Write a stock listing including variant attributes.
pub fn write_stock<'a, W: Write>(
    items: impl IntoIterator<Item = &'a ProductDetails>,
    format: OutputFormat,
    mut writer: W,
) -> Result<usize> {
    let rows: Vec<StockRow> = items.into_iter().map(StockRow::from).collect();

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &rows)
                .context("Failed to write stock as JSON")?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => write_csv(&rows, writer)?,
        OutputFormat::Table => {
            if rows.is_empty() {
                writeln!(writer, "No products found.")?;
            } else {
                writeln!(
                    writer,
                    "{:<6} {:<20} {:>8} {:<12} {:>10}",
                    "ID", "NAME", "QTY", "BRAND", "PRICE"
                )?;
                writeln!(writer, "{}", "-".repeat(60))?;
                for row in &rows {
                    writeln!(
                        writer,
                        "{:<6} {:<20} {:>8} {:<12} {:>10}",
                        row.id,
                        truncate(&row.name, 20),
                        row.quantity,
                        row.brand.as_deref().unwrap_or("-"),
                        row.price.as_deref().unwrap_or("-")
                    )?;
                }
            }
        }
    }

    Ok(rows.len())
}

fn write_csv<T: Serialize, W: Write>(rows: &[T], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row).context("Failed to write CSV row")?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Catalog, ItemVariant, StockItem, TransactionKind};

    fn catalog() -> Catalog {
        Catalog::from_items([
            StockItem::electronic(1, "Laptop", 50, "Dell", 80_000).unwrap(),
            StockItem::new(2, "Desk", 3, ItemVariant::General).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_stock_csv_has_header_and_empty_optional_fields() {
        let mut out = Vec::new();
        let count = write_stock(&catalog().all_details(), OutputFormat::Csv, &mut out).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,name,quantity,kind,brand,price");
        assert_eq!(lines[1], "1,Laptop,50,electronic,Dell,800.00");
        assert_eq!(lines[2], "2,Desk,3,general,,");
    }

    #[test]
    fn test_stock_json_is_an_array() {
        let mut out = Vec::new();
        write_stock(&catalog().all_details(), OutputFormat::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["brand"], "Dell");
        assert!(value[1]["brand"].is_null());
    }

    #[test]
    fn test_history_table() {
        let entries = vec![
            LogEntry::new(TransactionKind::Deposit, 5000),
            LogEntry::new(TransactionKind::Withdrawal, 1250),
        ];
        let mut out = Vec::new();
        write_history(&entries, OutputFormat::Table, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("deposit"));
        assert!(text.contains("50.00"));
        assert!(text.contains("withdrawal"));
        assert!(text.contains("12.50"));
    }

    #[test]
    fn test_empty_history_table() {
        let mut out = Vec::new();
        let count = write_history(&Vec::<LogEntry>::new(), OutputFormat::Table, &mut out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "No transactions yet.\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Smartphone", 20), "Smartphone");
        assert_eq!(truncate("An extremely long product name", 10), "An extr...");
    }
}
