//! Record types and the JSON schemas sent to the extraction service
//!
//! The typed records are deliberately lenient: every field the service may
//! leave out is optional or defaults to empty, and unknown enum values map to
//! an `Unknown` variant instead of rejecting the whole record.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named JSON schema
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScholarshipType {
    FullScholarship,
    PartialScholarship,
    FeeWaiver,
    Tuition,
    LivingExpenses,
    Research,
    Travel,
    Mixed,
    ApplicationFeeWaiver,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriterionKind {
    WorkExperience,
    AcademicQualification,
    EnglishLanguage,
    Gpa,
    AdditionalRequirements,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DegreeType {
    Bsc,
    Msc,
    Phd,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCriterion {
    #[serde(rename = "type")]
    pub kind: CriterionKind,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiver_request_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOfStudy {
    #[serde(default)]
    pub field: Vec<String>,
}

/// Structured scholarship record extracted from crawled text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scholarship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_type: Option<ScholarshipType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eligible_countries: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_eligible_countries: Vec<String>,
    /// Kept as written on the site; deadlines are often not exact dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_fee: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eligibility_criteria: Vec<EligibilityCriterion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degree_types: Vec<DegreeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub application_process: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_of_study: Option<Vec<FieldOfStudy>>,
}

/// Eligibility assessment of one scholarship against the credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    #[serde(default = "unknown_scholarship")]
    pub scholarship_name: String,
    #[serde(default)]
    pub eligibility_score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub missing_requirements: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl EligibilityResult {
    /// Result used when there are no credentials to compare against
    pub fn no_credentials() -> Self {
        Self {
            scholarship_name: unknown_scholarship(),
            eligibility_score: 0.0,
            reasons: vec!["No credentials provided for evaluation".to_string()],
            missing_requirements: vec!["All credentials are missing".to_string()],
            recommendations: vec!["Please provide credentials for evaluation".to_string()],
        }
    }

    /// Result used when the scoring service failed
    pub fn evaluation_failed() -> Self {
        Self {
            scholarship_name: unknown_scholarship(),
            eligibility_score: 0.0,
            reasons: vec!["Error occurred during evaluation".to_string()],
            missing_requirements: vec!["Unable to determine due to error".to_string()],
            recommendations: vec!["Please try again or contact support".to_string()],
        }
    }

    /// Clamps the score into 0..=100; NaN becomes 0
    pub fn clamped(mut self) -> Self {
        self.eligibility_score = if self.eligibility_score.is_nan() {
            0.0
        } else {
            self.eligibility_score.clamp(0.0, 100.0)
        };
        self
    }
}

fn unknown_scholarship() -> String {
    "Unknown Scholarship".to_string()
}

/// Schema for scholarship extraction
pub fn scholarship_schema() -> Schema {
    let string = |description: &str| json!({ "type": "string", "description": description });
    let string_list = |description: &str| {
        json!({ "type": "array", "items": { "type": "string" }, "description": description })
    };

    Schema {
        name: "scholarship",
        body: json!({
            "type": "object",
            "properties": {
                "name": string("Name of the scholarship"),
                "provider": string("Provider of the scholarship"),
                "description": string("Description of the scholarship"),
                "scholarshipType": {
                    "type": "string",
                    "enum": [
                        "FULL_SCHOLARSHIP", "PARTIAL_SCHOLARSHIP", "FEE_WAIVER", "TUITION",
                        "LIVING_EXPENSES", "RESEARCH", "TRAVEL", "MIXED",
                        "APPLICATION_FEE_WAIVER"
                    ]
                },
                "fundingAmount": {
                    "type": ["number", "null"],
                    "description": "How much money does the scholarship award?"
                },
                "fundingCurrency": {
                    "type": ["string", "null"],
                    "description": "Currency of the funding amount"
                },
                "applicationUrl": string("URL to apply for the scholarship"),
                "eligibleCountries": string_list("Complete list of countries eligible for the scholarship"),
                "nonEligibleCountries": string_list("Complete list of countries not eligible for the scholarship"),
                "applicationDeadline": string("Deadline to apply for the scholarship"),
                "programStartDate": string("Start date of the program"),
                "applicationFee": string("Any application fee for the scholarship mentioned"),
                "eligibilityCriteria": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "type": {
                                "type": "string",
                                "enum": [
                                    "workExperience", "academicQualification", "englishLanguage",
                                    "gpa", "additionalRequirements", "other"
                                ]
                            },
                            "description": string("Full explanation of what is expected in detail for the eligibility criterion")
                        },
                        "required": ["type", "description"]
                    }
                },
                "degreeTypes": {
                    "type": "array",
                    "items": { "type": "string", "enum": ["BSC", "MSC", "PHD", "OTHER"] },
                    "description": "The degree types that are eligible for this scholarship"
                },
                "applicationProcess": string_list("Step by step process of how to apply, in detail; if unavailable, any useful guide or resource for an interested candidate"),
                "requiredDocuments": string_list("Documents required for the application, in detail with counts if mentioned"),
                "additionalInfo": {
                    "type": "object",
                    "properties": {
                        "websiteUrl": string("Website URL of the scholarship"),
                        "contactInfo": string("Contact information for the scholarship"),
                        "waiverRequestPeriod": string("Period for requesting a waiver"),
                        "exclusions": string("Specific exclusions, such as nationalities not eligible")
                    },
                    "required": ["websiteUrl"]
                },
                "fieldsOfStudy": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": string_list("Every field of study eligible for the scholarship, or 'Not specified'")
                        }
                    }
                }
            },
            "required": [
                "name", "provider", "description", "scholarshipType", "applicationUrl",
                "eligibleCountries", "nonEligibleCountries", "applicationDeadline",
                "applicationFee", "eligibilityCriteria", "degreeTypes",
                "applicationProcess", "requiredDocuments", "additionalInfo"
            ]
        }),
    }
}

/// Schema for eligibility scoring
pub fn eligibility_schema() -> Schema {
    Schema {
        name: "eligibility_result",
        body: json!({
            "type": "object",
            "properties": {
                "scholarshipName": { "type": "string", "description": "The name of the scholarship" },
                "eligibilityScore": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 100,
                    "description": "The assessed score of the scholarship based on my credentials"
                },
                "reasons": {
                    "type": "array", "items": { "type": "string" },
                    "description": "The reasons supporting the eligibility score given"
                },
                "missingRequirements": {
                    "type": "array", "items": { "type": "string" },
                    "description": "The missing requirements for the scholarship"
                },
                "recommendations": {
                    "type": "array", "items": { "type": "string" },
                    "description": "Recommendations for improving eligibility, or that none are needed"
                }
            },
            "required": [
                "scholarshipName", "eligibilityScore", "reasons",
                "missingRequirements", "recommendations"
            ]
        }),
    }
}
