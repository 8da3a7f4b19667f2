use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use smartcare_client::{Notification, Notifier, Variant};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    let value = serde_json::to_value(value)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Yaml => println!("{}", format_yaml(&value, 0)),
        OutputFormat::Table => println!("{}", render_table(&value)),
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Prints notifications as they arrive: successes to stdout, failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        let line = match &n.description {
            Some(d) => format!("{} {}", n.title.bold(), d),
            None => n.title.bold().to_string(),
        };
        match n.variant {
            Variant::Default => print_success(&line),
            Variant::Destructive => print_error(&line),
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collections become one row per record with a column per field of the
/// first record; a single record becomes a field/value table.
fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "No records found.".to_string(),
        Value::Array(items) => {
            let columns: Vec<String> = match items.first() {
                Some(Value::Object(first)) => first.keys().cloned().collect(),
                _ => vec!["value".to_string()],
            };
            let mut builder = Builder::default();
            builder.push_record(columns.iter().cloned());
            for item in items {
                let row: Vec<String> = match item {
                    Value::Object(obj) => columns
                        .iter()
                        .map(|c| obj.get(c).map(cell).unwrap_or_else(|| "-".into()))
                        .collect(),
                    other => vec![cell(other)],
                };
                builder.push_record(row);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            format!("{table}\nTotal: {}", items.len())
        }
        Value::Object(obj) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (k, v) in obj {
                builder.push_record([k.clone(), cell(v)]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        other => cell(other),
    }
}

fn format_yaml(value: &Value, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.contains('\n') {
                let pad = " ".repeat(indent + 2);
                format!("|\n{pad}{}", s.replace('\n', &format!("\n{pad}")))
            } else {
                format!("\"{}\"", s.replace('"', "\\\""))
            }
        }
        Value::Array(arr) if arr.is_empty() => "[]".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    let item = format_yaml(v, indent + 2);
                    format!("{prefix}- {}", item.trim_start())
                })
                .collect();
            format!("\n{}", items.join("\n"))
        }
        Value::Object(obj) if obj.is_empty() => "{}".to_string(),
        Value::Object(obj) => {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    let val = format_yaml(v, indent + 2);
                    if val.starts_with('\n') {
                        format!("{prefix}{k}:{val}")
                    } else {
                        format!("{prefix}{k}: {val}")
                    }
                })
                .collect();
            if indent == 0 {
                items.join("\n")
            } else {
                format!("\n{}", items.join("\n"))
            }
        }
    }
}
