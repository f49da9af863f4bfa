//! Eligibility scoring of processed scholarships

use crate::config::Config;
use crate::extraction::credentials::load_credentials;
use crate::extraction::schema::{eligibility_schema, EligibilityResult};
use crate::extraction::StructuredExtractor;
use crate::output::{format_eligibility, write_report};
use crate::HarvestError;
use std::path::Path;

const PROCESSED_SUFFIX: &str = "_processed.txt";

/// Scholarships scored by one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringSummary {
    /// `(scholarship file stem, score)` pairs in file order
    pub scored: Vec<(String, f64)>,
    pub failed: Vec<String>,
}

fn build_prompt(scholarship: &str, credentials: &str) -> String {
    format!(
        "Based on the following scholarship information and my credentials, evaluate my \
         eligibility and provide a score from 0-100%.\n\
         Also, provide reasons for the score, list any missing requirements, and give \
         recommendations for improving eligibility.\n\
         Use step by step thinking when evaluating the score.\n\n\
         Scholarship Information:\n{scholarship}\n\n\
         My Credentials:\n{credentials}\n\n\
         Provide your evaluation in the required schema format, and address the user directly.\n"
    )
}

/// Scores one scholarship against the credential corpus
///
/// Never fails: missing credentials and service errors produce sentinel
/// results with a zero score.
pub async fn evaluate_eligibility(
    scorer: &dyn StructuredExtractor,
    scholarship: &str,
    credentials: Option<&str>,
) -> EligibilityResult {
    let Some(credentials) = credentials else {
        return EligibilityResult::no_credentials();
    };

    let value = match scorer
        .extract(&build_prompt(scholarship, credentials), &eligibility_schema())
        .await
    {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Error evaluating eligibility: {}", e);
            return EligibilityResult::evaluation_failed();
        }
    };

    match serde_json::from_value::<EligibilityResult>(value) {
        Ok(result) => result.clamped(),
        Err(e) => {
            tracing::error!("Eligibility result does not match the schema: {}", e);
            EligibilityResult::evaluation_failed()
        }
    }
}

fn list_processed(dir: &Path) -> std::io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut stems: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.strip_suffix(".txt")
                .filter(|_| name.ends_with(PROCESSED_SUFFIX))
                .map(str::to_string)
        })
        .collect();
    stems.sort();
    Ok(stems)
}

/// Scores every processed scholarship in the process directory
///
/// # Arguments
///
/// * `config` - Configuration naming the credentials, process and results directories
/// * `scorer` - The structured extraction service
///
/// # Returns
///
/// * `Ok(ScoringSummary)` - Scores written for each processed scholarship;
///   a report that cannot be written counts as failed
/// * `Err(HarvestError)` - No credentials were found, or a directory is unusable
pub async fn run_scoring(
    config: &Config,
    scorer: &dyn StructuredExtractor,
) -> Result<ScoringSummary, HarvestError> {
    let credentials = load_credentials(&config.output.credentials_dir)?.ok_or_else(|| {
        HarvestError::Setup(format!(
            "No credentials found in {}; add .pdf, .txt or .md documents",
            config.output.credentials_dir.display()
        ))
    })?;
    tracing::info!("Credentials loaded, starting eligibility evaluation");

    let process_dir = &config.output.process_dir;
    let results_dir = &config.output.results_dir;
    let stems = list_processed(process_dir)?;
    if stems.is_empty() {
        tracing::warn!("No processed scholarships found in {}", process_dir.display());
    }

    let mut summary = ScoringSummary::default();
    for stem in stems {
        tracing::info!("Evaluating eligibility for {}...", stem);

        let scholarship = match std::fs::read_to_string(process_dir.join(format!("{}.txt", stem))) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", stem, e);
                summary.failed.push(stem);
                continue;
            }
        };

        let result = evaluate_eligibility(scorer, &scholarship, Some(&credentials)).await;
        let path = results_dir.join(format!("{}_eligibility.txt", stem));
        if let Err(e) = write_report(&path, &format_eligibility(&result)) {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            summary.failed.push(stem);
            continue;
        }

        tracing::info!("Eligibility evaluation saved to {}", path.display());
        summary.scored.push((stem, result.eligibility_score));
    }

    Ok(summary)
}
