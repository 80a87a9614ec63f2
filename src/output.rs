//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use cdnstore_core::types::PageResponse;
use cdnstore_entity::asset::Asset;
use cdnstore_entity::sequence::SequenceCounter;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Asset display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct AssetRow {
    /// Asset ID
    pub id: String,
    /// Group code
    pub group: String,
    /// Size label
    pub size: String,
    /// Stored path
    pub path: String,
    /// File size in bytes
    pub bytes: i64,
    /// Subject reference
    pub subject: String,
    /// Privacy flag
    pub private: bool,
    /// Lifecycle state
    pub state: String,
}

impl From<&Asset> for AssetRow {
    fn from(a: &Asset) -> Self {
        Self {
            id: a.id.to_string(),
            group: a.group_code.clone(),
            size: a.size_label.to_string(),
            path: a.file_path.clone(),
            bytes: a.file_size_bytes,
            subject: a.subject().map(|s| s.to_string()).unwrap_or_default(),
            private: a.is_private,
            state: a.state().to_string(),
        }
    }
}

/// Counter display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct CounterRow {
    /// Alias
    pub alias: String,
    /// Prefix
    pub prefix: String,
    /// Suffix
    pub suffix: String,
    /// Next queue number
    pub queue: i32,
    /// Period tag
    pub separator: String,
    /// Last update
    pub updated_at: String,
}

impl From<&SequenceCounter> for CounterRow {
    fn from(c: &SequenceCounter) -> Self {
        Self {
            alias: c.alias.clone(),
            prefix: c.prefix.clone().unwrap_or_default(),
            suffix: c.suffix.clone().unwrap_or_default(),
            queue: c.queue,
            separator: c.separator.clone(),
            updated_at: c.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Print assets, as table rows or as the full JSON records
pub fn print_assets(assets: &[Asset], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<AssetRow> = assets.iter().map(AssetRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(&assets),
    }
}

/// Print one page of assets with its position
pub fn print_page(page: &PageResponse<Asset>, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_assets(&page.items, format);
            println!(
                "Page {}/{} ({} total)",
                page.page,
                page.total_pages.max(1),
                page.total_items
            );
        }
        OutputFormat::Json => print_json(page),
    }
}

/// Print counters
pub fn print_counters(counters: &[SequenceCounter], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<CounterRow> = counters.iter().map(CounterRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(&counters),
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
