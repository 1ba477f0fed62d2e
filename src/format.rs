//! Result rendering.
//!
//! Turns evaluation rows into the text shown to users:
//!
//! - no rows: `false`
//! - rows without bindings (a satisfied ground query): `true`
//! - otherwise a table with one column per variable, or a JSON array of
//!   row objects
//!
//! ```text
//! +---+---+
//! | I | J |
//! +---+---+
//! | 0 | 1 |
//! +---+---+
//! ```

use crate::ast::Value;
use crate::error::{Error, Result};
use crate::eval::{Bindings, RuleOutcome};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{ContentArrangement, Table, TableComponent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How query results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Render evaluation rows.
pub fn render_rows(rows: &[Bindings], format: OutputFormat) -> Result<String> {
    if rows.is_empty() {
        return Ok("false\n".to_string());
    }
    if rows.iter().all(Bindings::is_empty) {
        return Ok("true\n".to_string());
    }

    match format {
        OutputFormat::Pretty => Ok(render_table(rows)),
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = rows.iter().map(Bindings::to_json).collect();
            let mut out = serde_json::to_string_pretty(&json)
                .map_err(|e| Error::SerializationError(e.to_string()))?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// `defined` or `undefined`
pub fn render_rule(outcome: &RuleOutcome) -> String {
    if outcome.is_defined() {
        "defined\n".to_string()
    } else {
        "undefined\n".to_string()
    }
}

/// Pretty-printed JSON for a single value
pub fn render_value(value: &Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&serde_json::Value::from(value))
        .map_err(|e| Error::SerializationError(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn render_table(rows: &[Bindings]) -> String {
    let columns: Vec<String> = rows
        .iter()
        .flat_map(|row| row.iter().map(|(var, _)| var.name().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_style(TableComponent::LeftBorder, '|')
        .set_style(TableComponent::RightBorder, '|')
        .set_style(TableComponent::VerticalLines, '|')
        .set_style(TableComponent::TopBorder, '-')
        .set_style(TableComponent::BottomBorder, '-')
        .set_style(TableComponent::HeaderLines, '-')
        .set_style(TableComponent::TopLeftCorner, '+')
        .set_style(TableComponent::TopRightCorner, '+')
        .set_style(TableComponent::BottomLeftCorner, '+')
        .set_style(TableComponent::BottomRightCorner, '+')
        .set_style(TableComponent::TopBorderIntersections, '+')
        .set_style(TableComponent::BottomBorderIntersections, '+')
        .set_style(TableComponent::LeftHeaderIntersection, '+')
        .set_style(TableComponent::MiddleHeaderIntersections, '+')
        .set_style(TableComponent::RightHeaderIntersection, '+')
        // No rule between body rows.
        .remove_style(TableComponent::HorizontalLines)
        .remove_style(TableComponent::MiddleIntersections)
        .remove_style(TableComponent::LeftBorderIntersections)
        .remove_style(TableComponent::RightBorderIntersections)
        .set_header(columns.iter().map(|c| c.to_uppercase()));

    for row in rows {
        table.add_row(columns.iter().map(|col| {
            row.get(&col.as_str().into())
                .map(|v| serde_json::Value::from(v).to_string())
                .unwrap_or_default()
        }));
    }

    let mut out = table.to_string();
    out.push('\n');
    out
}
