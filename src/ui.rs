//! Terminal output for the CLI

use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;
use tabled::{Table, Tabled, settings::Style as TableStyle};

use crate::storage::DbStats;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub dim: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() {
            Self {
                header: Style::new().cyan().bold(),
                success: Style::new().green().bold(),
                error: Style::new().red().bold(),
                dim: Style::new().white().dimmed(),
            }
        } else {
            Self::plain()
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            dim: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

pub fn header(text: &str) {
    println!("{}", text.style(theme().header.clone()));
}

pub fn success(text: &str) {
    println!("✅ {}", text.style(theme().success.clone()));
}

pub fn error(text: &str) {
    eprintln!("❌ {}", text.style(theme().error.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("   {}: {}", label.style(theme().dim.clone()), value);
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Table")]
    table: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

/// Row counts rendered as a rounded table
pub fn stats_table(stats: &DbStats) -> String {
    let rows: Vec<CountRow> = stats
        .rows()
        .into_iter()
        .map(|(table, rows)| CountRow { table, rows })
        .collect();
    Table::new(rows).with(TableStyle::rounded()).to_string()
}
