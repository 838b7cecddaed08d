//! `--listhosts` output

use std::fmt::Write;

use crate::config::ConfigDocument;
use crate::context::RunContext;

/// Render the entries of a document, with their keys when verbose.
pub fn render_entries(document: &ConfigDocument, ctx: &RunContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Specified entries in {} are:", ctx.config_filename);

    for entry in document.entries() {
        let _ = writeln!(out, "\t {}", entry.name);
        if ctx.verbose {
            for (key, value) in &entry.raw {
                let _ = writeln!(out, "\t\t {}: {}", key, display_value(value));
            }
            out.push('\n');
        }
    }

    out
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
