//! Plain-text report rendering
//!
//! Processed scholarship records and eligibility results are written as
//! human-readable text files next to their JSON counterparts.

use crate::extraction::EligibilityResult;
use serde_json::Value;

/// Renders a JSON object as indented `KEY: value` lines
///
/// Nested objects are indented by two spaces, array items are listed one per
/// line with a `- ` bullet, and nulls are left out.
///
/// # Arguments
///
/// * `record` - The JSON value to render (usually an object)
///
/// # Returns
///
/// The rendered text, one field per line
pub fn format_record(record: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, record, "");
    out
}

fn write_value(out: &mut String, value: &Value, indent: &str) {
    let Value::Object(map) = value else {
        if let Some(scalar) = scalar_text(value) {
            out.push_str(&format!("{}{}\n", indent, scalar));
        }
        return;
    };

    for (key, value) in map {
        let label = key.to_uppercase();
        match value {
            Value::Null => {}
            Value::Array(items) => {
                out.push_str(&format!("{}{}:\n", indent, label));
                for item in items {
                    write_item(out, item, indent);
                }
            }
            Value::Object(_) => {
                out.push_str(&format!("{}{}:\n", indent, label));
                write_value(out, value, &format!("{}  ", indent));
            }
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    out.push_str(&format!("{}{}: {}\n", indent, label, text));
                }
            }
        }
    }
}

fn write_item(out: &mut String, item: &Value, indent: &str) {
    match item {
        Value::Object(_) => {
            let mut nested = String::new();
            write_value(&mut nested, item, &format!("{}    ", indent));
            // First line of an object item carries the bullet
            let body = nested.trim_start();
            if !body.is_empty() {
                out.push_str(&format!("{}  - {}", indent, body));
            }
        }
        other => {
            if let Some(text) = scalar_text(other) {
                out.push_str(&format!("{}  - {}\n", indent, text));
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Renders an eligibility result as a report
pub fn format_eligibility(result: &EligibilityResult) -> String {
    let mut report = String::new();
    report.push_str("Scholarship Eligibility Evaluation\n");
    report.push_str("==================================\n\n");
    report.push_str(&format!("Scholarship Name: {}\n", result.scholarship_name));
    report.push_str(&format!("Eligibility Score: {}%\n", result.eligibility_score));

    for (heading, items) in [
        ("Reasons", &result.reasons),
        ("Missing Requirements", &result.missing_requirements),
        ("Recommendations", &result.recommendations),
    ] {
        report.push_str(&format!("\n{}:\n", heading));
        for item in items {
            report.push_str(&format!("- {}\n", item));
        }
    }

    report.push_str(&format!(
        "\nEvaluated at: {}\n",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    ));
    report
}
