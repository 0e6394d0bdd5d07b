use clap::ValueEnum;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Writes the `{"output": ...}` document Stash reads from a plugin's stdout.
/// Failures are reported inside `output`, never through Stash's `error` field.
pub struct PluginOutput {
    format: OutputFormat,
}

impl PluginOutput {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn report<T: Serialize>(&self, report: &T) {
        let output = serde_json::to_value(report).unwrap_or_else(|e| {
            json!({
                "result": "failed",
                "reason": format!("Failed to serialize plugin result: {}", e)
            })
        });
        self.print_document(&output);
    }

    pub fn failure(&self, reason: impl AsRef<str>) {
        self.print_document(&failure_output(reason.as_ref()));
    }

    fn print_document(&self, output: &Value) {
        let text = render(self.format, output);
        let mut stdout = io::stdout().lock();
        // Nothing sensible to do if stdout is gone
        let _ = writeln!(stdout, "{}", text);
        let _ = stdout.flush();
    }
}

fn failure_output(reason: &str) -> Value {
    json!({ "result": "failed", "reason": reason })
}

fn render(format: OutputFormat, output: &Value) -> String {
    let document = json!({ "output": output });
    match format {
        OutputFormat::Json => serde_json::to_string(&document).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&document).unwrap_or_default(),
    }
}
