//! Output formatting for fetch results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::usecase::FetchOutcome;

/// Longest body excerpt printed in pretty mode.
const BODY_PREVIEW_CHARS: usize = 200;

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub client: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<JsonResult>,
}

/// One fetched URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResult {
    pub url: String,
    pub ok: bool,
    pub bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub elapsed_ms: u64,
}

/// Build the JSON report without printing it.
pub fn build_json_report(client: &str, outcomes: &[FetchOutcome], include_body: bool) -> JsonReport {
    let results: Vec<JsonResult> = outcomes
        .iter()
        .map(|o| outcome_to_json(o, include_body))
        .collect();
    let succeeded = results.iter().filter(|r| r.ok).count();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        client: client.to_string(),
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        results,
    }
}

/// Write results in JSON format.
pub fn write_json(client: &str, outcomes: &[FetchOutcome], include_body: bool) -> anyhow::Result<()> {
    let report = build_json_report(client, outcomes, include_body);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn outcome_to_json(o: &FetchOutcome, include_body: bool) -> JsonResult {
    let elapsed_ms = o.elapsed.as_millis() as u64;
    match &o.result {
        Ok(body) => JsonResult {
            url: o.url.clone(),
            ok: true,
            bytes: body.len(),
            error_kind: None,
            error: None,
            body: include_body.then(|| body.clone()),
            elapsed_ms,
        },
        Err(e) => JsonResult {
            url: o.url.clone(),
            ok: false,
            bytes: 0,
            error_kind: Some(e.kind().to_string()),
            error: Some(e.to_string()),
            body: None,
            elapsed_ms,
        },
    }
}

/// Write results in pretty format.
pub fn write_pretty(client: &str, outcomes: &[FetchOutcome], show_body: bool) {
    // Header
    println!();
    print!("  ");
    print!("{}", "doublefetch".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Client: ".dimmed());
    println!("{}", client);
    println!();

    for outcome in outcomes {
        write_outcome(outcome, show_body);
    }
    println!();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed == 0 {
        println!("  {} {} fetched", "✓".green(), outcomes.len());
    } else {
        println!(
            "  {} {} of {} failed",
            "✗".red(),
            failed,
            outcomes.len()
        );
    }
    println!();
}

fn write_outcome(outcome: &FetchOutcome, show_body: bool) {
    let elapsed = format!("{}ms", outcome.elapsed.as_millis()).dimmed();
    match &outcome.result {
        Ok(body) => {
            println!(
                "  {} {} {} {}",
                "OK  ".green().bold(),
                outcome.url,
                format!("({} bytes)", body.len()).dimmed(),
                elapsed
            );
            if show_body {
                println!("      {}", preview(body));
            }
        }
        Err(e) => {
            println!(
                "  {} {} {}",
                "FAIL".red().bold(),
                outcome.url,
                elapsed
            );
            println!("      {} {}", format!("[{}]", e.kind()).yellow(), e);
        }
    }
}

/// Single-line excerpt of a body.
fn preview(body: &str) -> String {
    let flat: String = body
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let flat = flat.trim();

    if flat.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = flat.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{}…", cut)
    } else {
        flat.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use crate::usecase::UseCaseError;
    use std::time::Duration;

    fn outcomes() -> Vec<FetchOutcome> {
        vec![
            FetchOutcome {
                url: "https://a.test/ok".to_string(),
                result: Ok("hello".to_string()),
                elapsed: Duration::from_millis(12),
            },
            FetchOutcome {
                url: "https://a.test/missing".to_string(),
                result: Err(UseCaseError::Fetch {
                    url: "https://a.test/missing".to_string(),
                    source: ApiError::NotFound,
                }),
                elapsed: Duration::from_millis(3),
            },
        ]
    }

    #[test]
    fn test_json_report_counts() {
        let report = build_json_report("stub", &outcomes(), false);

        assert_eq!(report.client, "stub");
        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        assert!(report.results[0].ok);
        assert_eq!(report.results[0].bytes, 5);
        assert_eq!(report.results[0].elapsed_ms, 12);
        assert!(report.results[0].body.is_none());

        assert!(!report.results[1].ok);
        assert_eq!(report.results[1].error_kind.as_deref(), Some("not_found"));
    }

    #[test]
    fn test_json_report_includes_body() {
        let report = build_json_report("http", &outcomes(), true);
        assert_eq!(report.results[0].body.as_deref(), Some("hello"));
        assert!(report.results[1].body.is_none());
    }

    #[test]
    fn test_json_omits_empty_optionals() {
        let report = build_json_report("stub", &outcomes(), false);
        let json = serde_json::to_value(&report).unwrap();

        let ok = &json["results"][0];
        assert!(ok.get("error").is_none());
        assert!(ok.get("body").is_none());

        let failed = &json["results"][1];
        assert_eq!(failed["error_kind"], "not_found");
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("a\nb\tc"), "a b c");

        let long = "x".repeat(BODY_PREVIEW_CHARS + 10);
        let p = preview(&long);
        assert!(p.ends_with('…'));
        assert_eq!(p.chars().count(), BODY_PREVIEW_CHARS + 1);
    }
}
