//! Scholarship extraction from crawled text
//!
//! For each site store in the scrape directory, the stored pages are joined
//! into one document and handed to the extractor with the scholarship schema.
//! The record is written as a text report and as JSON.

use crate::config::Config;
use crate::extraction::schema::{scholarship_schema, Scholarship};
use crate::extraction::{ExtractionError, StructuredExtractor};
use crate::output::{format_record, write_report};
use crate::storage::{FileStorage, PageRecord, PageStore};
use crate::HarvestError;
use std::path::Path;

const STORE_SUFFIX: &str = "-data.txt";

/// Sites processed by one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub processed: Vec<String>,
    pub failed: Vec<String>,
}

/// Builds the extraction prompt for one site
pub(crate) fn build_prompt(site: &str, text: &str) -> String {
    format!(
        "Based on the following text from {site}, extract as much information as possible \
         about scholarships.\n\
         Use the provided schema to structure the output. If a field is not applicable or \
         the information is not available, omit it from the output.\n\n\
         Text:\n{text}\n"
    )
}

/// Cuts `text` to at most `max_chars` characters
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Joins stored pages into one document, skipping pages without text
pub(crate) fn join_pages(pages: &[PageRecord]) -> String {
    pages
        .iter()
        .filter(|page| !page.text.trim().is_empty())
        .map(|page| format!("LINK: {}\n\n{}\n", page.url, page.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts a scholarship record from one site's text
///
/// # Arguments
///
/// * `extractor` - The structured extraction service
/// * `site` - Site name, used in the prompt
/// * `text` - The site's collected page text
/// * `max_chars` - Input size cap in characters
///
/// # Returns
///
/// * `Ok(Scholarship)` - The extracted record, possibly sparse
/// * `Err(ExtractionError)` - The service failed or returned an unusable object
pub async fn extract_site(
    extractor: &dyn StructuredExtractor,
    site: &str,
    text: &str,
    max_chars: usize,
) -> Result<Scholarship, ExtractionError> {
    let input = truncate_chars(text, max_chars);
    if input.len() < text.len() {
        tracing::warn!(
            "Text for {} truncated to {} characters before extraction",
            site,
            max_chars
        );
    }

    let value = extractor
        .extract(&build_prompt(site, input), &scholarship_schema())
        .await?;
    serde_json::from_value(value).map_err(ExtractionError::Schema)
}

/// Lists site names that have a store in `dir`, sorted
pub(crate) fn list_site_stores(dir: &Path) -> std::io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sites: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.strip_suffix(STORE_SUFFIX)
                .filter(|site| !site.is_empty())
                .map(str::to_string)
        })
        .collect();
    sites.sort();
    Ok(sites)
}

/// Writes the text and JSON renderings of one site's record
fn save_record(process_dir: &Path, site: &str, record: &Scholarship) -> Result<(), HarvestError> {
    let value = serde_json::to_value(record).map_err(ExtractionError::Schema)?;
    let json = serde_json::to_string_pretty(&value).map_err(ExtractionError::Schema)?;
    write_report(&process_dir.join(format!("{}_processed.txt", site)), &format_record(&value))?;
    write_report(&process_dir.join(format!("{}_processed.json", site)), &json)?;
    Ok(())
}

/// Runs extraction over every site store in the scrape directory
///
/// # Arguments
///
/// * `config` - Configuration naming the scrape and process directories
/// * `extractor` - The structured extraction service
///
/// # Returns
///
/// * `Ok(ExtractionSummary)` - Which sites were processed and which failed;
///   a site whose output cannot be written counts as failed
/// * `Err(HarvestError)` - No site stores exist, or a directory is unusable
pub async fn run_extraction(
    config: &Config,
    extractor: &dyn StructuredExtractor,
) -> Result<ExtractionSummary, HarvestError> {
    let scrape_dir = &config.output.scrape_dir;
    let sites = list_site_stores(scrape_dir)?;
    if sites.is_empty() {
        return Err(HarvestError::Setup(format!(
            "No scraped data found in {}; run the crawl first",
            scrape_dir.display()
        )));
    }

    let storage = FileStorage::new(scrape_dir)?;
    let process_dir = &config.output.process_dir;
    std::fs::create_dir_all(process_dir)?;

    let mut summary = ExtractionSummary::default();
    for site in sites {
        tracing::info!("Processing {}...", site);

        let text = match storage.load_pages(&site) {
            Ok(pages) => join_pages(&pages),
            Err(e) => {
                tracing::error!("Failed to read store for {}: {}", site, e);
                summary.failed.push(site);
                continue;
            }
        };
        if text.is_empty() {
            tracing::warn!("No page text stored for {}, skipping", site);
            summary.failed.push(site);
            continue;
        }

        let record = match extract_site(
            extractor,
            &site,
            &text,
            config.extraction.max_input_chars,
        )
        .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Extraction failed for {}: {}", site, e);
                summary.failed.push(site);
                continue;
            }
        };

        if let Err(e) = save_record(process_dir, &site, &record) {
            tracing::error!("Failed to save scholarship data for {}: {}", site, e);
            summary.failed.push(site);
            continue;
        }

        tracing::info!("Saved scholarship data for {} to {}", site, process_dir.display());
        summary.processed.push(site);
    }

    Ok(summary)
}
