//! Config subcommand - print the effective configuration

use alexharvest_openalex::Config;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use super::fmt_secs;

pub fn show(config: &Config) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let works = &config.works;
    let types = if works.types.is_empty() {
        "(any)".to_string()
    } else {
        works.types.join("|")
    };

    table.add_row(vec!["API base URL", config.api_url.as_str()]);
    table.add_row(vec![
        "API key",
        if config.api_key.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec!["Discovery filter", config.discovery.filter.as_str()]);
    table.add_row(vec![
        "Discovery page size",
        &config.discovery.per_page.to_string(),
    ]);
    table.add_row(vec!["Discovery pause", &fmt_secs(config.discovery.page_pause)]);
    table.add_row(vec![
        "Enrichment workers",
        &config.enrichment.workers.to_string(),
    ]);
    table.add_row(vec!["Works page size", &works.per_page.to_string()]);
    table.add_row(vec!["Work types", &types]);
    table.add_row(vec![
        "Checkpoint interval",
        &format!("{} pages", works.checkpoint_interval),
    ]);
    table.add_row(vec![
        "Rate limit",
        &format!("{} req/s", works.max_requests_per_second),
    ]);
    table.add_row(vec!["Max attempts", &works.retry.max_attempts.to_string()]);
    table.add_row(vec![
        "Authorship cap",
        &works.policy.max_full_authorships.to_string(),
    ]);
    table.add_row(vec![
        "Year floor",
        &works.policy.min_publication_year.to_string(),
    ]);
    table.add_row(vec![
        "Author limit",
        &works
            .max_authors
            .map_or_else(|| "none".to_string(), |n| n.to_string()),
    ]);
    table.add_row(vec![
        "Timeouts",
        &format!(
            "connect {}, request {}",
            fmt_secs(config.http.connect_timeout),
            fmt_secs(config.http.request_timeout)
        ),
    ]);
    table.add_row(vec![
        "Authors (basic)",
        &config.output.authors_basic.display().to_string(),
    ]);
    table.add_row(vec![
        "Authors (detailed)",
        &config.output.authors_detailed.display().to_string(),
    ]);
    table.add_row(vec!["Works", &config.output.works.display().to_string()]);

    eprintln!("\n{table}");
}
