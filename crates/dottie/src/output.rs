//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, structured formats use serde, plain emits one
//! identifier per line.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render rows in the chosen format.
pub fn render_list<R>(
    format: OutputFormat,
    rows: &[R],
    id_fn: impl Fn(&R) -> String,
) -> Result<String, serde_json::Error>
where
    R: Serialize + Tabled,
{
    Ok(match format {
        OutputFormat::Table => Table::new(rows).with(Style::rounded()).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(rows)?,
        OutputFormat::JsonCompact => serde_json::to_string(rows)?,
        OutputFormat::Plain => rows.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render an arbitrary JSON payload. Only compact formats collapse it.
pub fn render_value(
    format: OutputFormat,
    value: &serde_json::Value,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table | OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::JsonCompact | OutputFormat::Plain => serde_json::to_string(value),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: &'static str,
    }

    #[test]
    fn plain_lists_ids() {
        let rows = [Row { id: "a" }, Row { id: "b" }];
        let out = render_list(OutputFormat::Plain, &rows, |r| r.id.to_owned()).unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn table_has_headers() {
        let rows = [Row { id: "a" }];
        let out = render_list(OutputFormat::Table, &rows, |r| r.id.to_owned()).unwrap();
        assert!(out.contains("ID"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let value = serde_json::json!({"a": [1, 2]});
        assert_eq!(
            render_value(OutputFormat::JsonCompact, &value).unwrap(),
            r#"{"a":[1,2]}"#
        );
    }
}
