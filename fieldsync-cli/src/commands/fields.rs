//! `fieldsync fields`: list catalog fields for one table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use fieldsync_core::{CatalogStore, PersistedField, SchemaSnapshot, YamlCatalog};

/// Arguments for `fieldsync fields`.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Snapshot the table belongs to.
    pub snapshot: PathBuf,

    /// Table name, either `name` or `schema.name`.
    pub table: String,

    /// Include retired fields.
    #[arg(long)]
    pub all: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FieldJson<'a> {
    id: u64,
    name: &'a str,
    display_name: &'a str,
    base_type: &'a str,
    semantic_type: Option<String>,
    parent_id: Option<u64>,
    active: bool,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "display name")]
    display_name: String,
    #[tabled(rename = "base type")]
    base_type: String,
    #[tabled(rename = "semantic type")]
    semantic_type: String,
    #[tabled(rename = "status")]
    status: String,
}

impl FieldsArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;

        let snapshot = SchemaSnapshot::load(&self.snapshot)
            .with_context(|| format!("failed to load snapshot {}", self.snapshot.display()))?;
        let table = snapshot
            .tables()
            .into_iter()
            .find(|t| t.name == self.table || t.qualified_name() == self.table)
            .with_context(|| format!("table '{}' is not in the snapshot", self.table))?;

        let catalog = YamlCatalog::open_at(&home).context("failed to open field catalog")?;
        let fields = if self.all {
            catalog.fields(&table)
        } else {
            catalog.active_fields(&table)
        }
        .with_context(|| format!("failed to read fields of '{}'", table.qualified_name()))?;

        if self.json {
            print_json(&fields)?;
            return Ok(());
        }
        if fields.is_empty() {
            println!(
                "No fields recorded for '{}'. Run `fieldsync sync` first.",
                table.qualified_name()
            );
            return Ok(());
        }

        println!("{}", table.qualified_name().bold());
        let rows: Vec<FieldRow> = fields.iter().map(row).collect();
        let mut rendered = Table::new(rows);
        rendered.with(Style::rounded());
        println!("{rendered}");
        Ok(())
    }
}

fn row(field: &PersistedField) -> FieldRow {
    FieldRow {
        id: field.id.0,
        name: field.name.clone(),
        display_name: field.display_name.clone(),
        base_type: field.base_type.to_string(),
        semantic_type: field
            .special_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string()),
        status: if field.active {
            "active".green().to_string()
        } else {
            "retired".bright_black().to_string()
        },
    }
}

fn print_json(fields: &[PersistedField]) -> Result<()> {
    let payload: Vec<FieldJson<'_>> = fields
        .iter()
        .map(|f| FieldJson {
            id: f.id.0,
            name: &f.name,
            display_name: &f.display_name,
            base_type: &f.base_type.0,
            semantic_type: f.special_type.map(|t| t.to_string()),
            parent_id: f.parent_id.map(|p| p.0),
            active: f.active,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize fields JSON")?
    );
    Ok(())
}
