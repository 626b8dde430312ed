//! Verdict rendering for the monitoring system.

use clap::ValueEnum;
use serde_json::json;

use podwatch_core::Verdict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<CODE> - <message>`, one line.
    #[default]
    Text,
    /// JSON object with code, status, message, and listed instances.
    Json,
}

/// Collapse any line breaks so the plugin prints exactly one line.
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn render(verdict: &Verdict, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => single_line(&verdict.message),
        OutputFormat::Json => json!({
            "code": verdict.exit_code(),
            "status": verdict.code,
            "message": single_line(&verdict.message),
            "instances": verdict.instances,
        })
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podwatch_core::StatusCode;

    #[test]
    fn test_render_text_is_single_line() {
        let v = Verdict::unknown("'kubectl' exited with 1:\nUnable to connect");
        assert_eq!(
            render(&v, OutputFormat::Text),
            "UNKNOWN - 'kubectl' exited with 1: Unable to connect"
        );
    }

    #[test]
    fn test_render_json() {
        let v = Verdict::new(StatusCode::Critical, "two running")
            .with_instances(vec!["a(n1)".to_string(), "b(n1)".to_string()]);
        let parsed: serde_json::Value = serde_json::from_str(&render(&v, OutputFormat::Json)).unwrap();
        assert_eq!(parsed["code"], 2);
        assert_eq!(parsed["status"], "CRITICAL");
        assert_eq!(parsed["message"], "CRITICAL - two running");
        assert_eq!(parsed["instances"][1], "b(n1)");
    }
}
