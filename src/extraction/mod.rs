//! Extraction and scoring stages
//!
//! These stages run after the crawl:
//! - `process` turns each site's stored text into a structured scholarship record
//! - `eligibility` scores processed records against the user's credentials
//!
//! Both talk to the outside world only through [`StructuredExtractor`].

mod client;
mod credentials;
mod eligibility;
mod process;
pub mod schema;

pub use client::{OpenAiExtractor, StructuredExtractor};
pub use credentials::{extract_pdf_text, load_credentials};
pub use eligibility::{evaluate_eligibility, run_scoring, ScoringSummary};
pub use process::{extract_site, run_extraction, ExtractionSummary};
pub use schema::{EligibilityResult, Scholarship, Schema};

use thiserror::Error;

/// Errors from the extraction service or its inputs
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Environment variable {0} with the API key is not set")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Service returned no content")]
    EmptyResponse,

    #[error("Service returned invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Service returned JSON that is not an object")]
    NotAnObject,

    #[error("Record does not match the schema: {0}")]
    Schema(serde_json::Error),

    #[error("Failed to read PDF {path}: {message}")]
    Pdf { path: String, message: String },
}
