use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", render_yaml(value)?),
        OutputFormat::Table => print_fields(value),
    }
    Ok(())
}

pub fn render_yaml(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Prints `items` as a table with `headers`, or as JSON/YAML.
pub fn print_list<T: Serialize>(
    items: &[T],
    format: OutputFormat,
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
) -> Result<()> {
    if format != OutputFormat::Table {
        return print_value(&serde_json::to_value(items)?, format);
    }
    if items.is_empty() {
        println!("No results found.");
        return Ok(());
    }
    println!("{}", render_table(headers, items.iter().map(row)));
    println!("Total: {}", items.len());
    Ok(())
}

pub fn render_table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

// Top-level fields as a two-column table; nested values stay as JSON.
fn print_fields(value: &Value) {
    let Some(obj) = value.as_object() else {
        println!("{value}");
        return;
    };
    let rows = obj.iter().map(|(k, v)| {
        let shown = match v {
            Value::String(s) => s.clone(),
            Value::Null => "-".to_string(),
            other => other.to_string(),
        };
        vec![k.clone(), shown]
    });
    println!("{}", render_table(&["Field", "Value"], rows));
}
