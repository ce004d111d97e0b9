//! Subcommands

pub mod all;
pub mod authors;
pub mod config;
pub mod enrich;
pub mod works;

use std::time::Duration;

use alexharvest_core::{HttpConfig, ReqwestTransport};
use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

/// Two-column table on stderr
pub(crate) fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

pub(crate) fn transport(http: &HttpConfig, api_key: Option<&str>) -> Result<ReqwestTransport> {
    ReqwestTransport::new(http, api_key.map(String::from))
}

pub(crate) fn fmt_secs(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}
