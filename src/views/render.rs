//! Plain-text rendering of view state for the terminal.

use std::fmt;

use rust_decimal::Decimal;

use crate::resources::{Component, Order, Quotation, Resource, ResourceId};

use super::detail::{DetailState, DetailView};
use super::list::{capitalize, ListView, LoadState};

/// A record that renders as a table row and a field list.
pub trait Render: Resource {
    /// Column headings.
    const COLUMNS: &'static [&'static str];

    /// One cell per column.
    fn row(&self) -> Vec<String>;

    /// Labelled fields for the detail screen.
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Format an amount as dollars with two decimals.
pub fn money(amount: &Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Date part of an ISO timestamp, or "N/A".
pub fn date_only(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.split('T').next().unwrap_or(v).to_string(),
        None => "N/A".to_string(),
    }
}

fn id_cell(id: Option<&ResourceId>) -> String {
    id.map(ToString::to_string).unwrap_or_else(|| "N/A".to_string())
}

impl Render for Component {
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Price", "Stock"];

    fn row(&self) -> Vec<String> {
        vec![
            id_cell(self.id.as_ref()),
            self.name.clone(),
            money(&self.price),
            self.available_stock.to_string(),
        ]
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_cell(self.id.as_ref())),
            ("Name", self.name.clone()),
            (
                "Description",
                self.description.clone().unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Price", money(&self.price)),
            ("Stock", self.available_stock.to_string()),
        ]
    }
}

impl Render for Quotation {
    const COLUMNS: &'static [&'static str] = &["ID", "Customer", "Items", "Total", "Status"];

    fn row(&self) -> Vec<String> {
        vec![
            id_cell(self.id.as_ref()),
            self.customer_name.clone(),
            self.items.len().to_string(),
            money(&self.total_amount),
            self.status.to_string(),
        ]
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_cell(self.id.as_ref())),
            ("Customer", self.customer_name.clone()),
            ("Items", self.items.len().to_string()),
            ("Total", money(&self.total_amount)),
            ("Status", self.status.to_string()),
        ]
    }
}

impl Render for Order {
    const COLUMNS: &'static [&'static str] = &["ID", "Customer", "Date", "Total", "Status"];

    fn row(&self) -> Vec<String> {
        vec![
            id_cell(self.id.as_ref()),
            self.customer_id.clone(),
            date_only(self.order_date.as_deref()),
            money(&self.total_amount),
            self.status.to_string(),
        ]
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_cell(self.id.as_ref())),
            ("Customer", self.customer_id.clone()),
            ("Date", date_only(self.order_date.as_deref())),
            ("Total", money(&self.total_amount)),
            ("Status", self.status.to_string()),
        ]
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, columns: &[&str], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(f, columns.iter().copied(), &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(f, "{}", rule.join("  "))?;
    for row in rows {
        write_row(f, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
}

fn write_row<'a>(
    f: &mut fmt::Formatter<'_>,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(f, "{}", padded.join("  ").trim_end())
}

impl<R: Render> fmt::Display for ListView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(notice) = self.notice() {
            writeln!(f, "{}", notice)?;
        }
        match self.state() {
            LoadState::Loading => writeln!(f, "Loading {}s...", R::LABEL),
            LoadState::Failed(err) => writeln!(f, "Error loading {}s: {}", R::LABEL, err.user_message()),
            LoadState::Loaded(records) if records.is_empty() => {
                writeln!(f, "No {}s found. Add one to get started.", R::LABEL)
            }
            LoadState::Loaded(records) => {
                let rows: Vec<Vec<String>> = records.iter().map(Render::row).collect();
                write_table(f, R::COLUMNS, &rows)
            }
        }
    }
}

impl<R: Render> fmt::Display for DetailView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state() {
            DetailState::Loading => writeln!(f, "Loading {} {}...", R::LABEL, self.id()),
            DetailState::NotFound => writeln!(f, "{} {} not found.", capitalize(R::LABEL), self.id()),
            DetailState::Failed(err) => {
                writeln!(f, "Error loading {} {}: {}", R::LABEL, self.id(), err.user_message())
            }
            DetailState::Loaded(record) => {
                let fields = record.fields();
                let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (label, value) in fields {
                    writeln!(f, "{:<width$}  {}", format!("{}:", label), value, width = width + 1)?;
                }
                Ok(())
            }
        }
    }
}
