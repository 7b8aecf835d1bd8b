//! Report models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Report stored in database, with its tag names.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub external_report_id: String,
    pub is_active: bool,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// Report payload returned by the API.
///
/// `powerbi_id` is `null` when the caller may not see the external report id.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub powerbi_id: Option<String>,
    pub is_active: bool,
    pub is_hide_report: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl ReportResponse {
    pub fn new(report: Report, reveal_external_id: bool) -> Self {
        Self {
            id: report.id,
            name: report.name,
            description: report.description,
            powerbi_id: reveal_external_id.then_some(report.external_report_id),
            is_active: report.is_active,
            is_hide_report: report.is_hidden,
            created_at: report.created_at,
            updated_at: report.updated_at,
            tags: report.tags,
        }
    }
}

/// Request body for creating a report.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReportRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Power BI report id (required)
    #[serde(alias = "external_report_id")]
    pub powerbi_id: Option<String>,
    pub is_active: Option<bool>,
    /// Defaults to true: new reports start hidden.
    #[serde(alias = "is_hidden")]
    pub is_hide_report: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Partial update of a report.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateReportRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Ignored when blank.
    #[serde(alias = "external_report_id")]
    pub powerbi_id: Option<String>,
    pub is_active: Option<bool>,
    #[serde(alias = "is_hidden")]
    pub is_hide_report: Option<bool>,
    /// Replaces the tag set when present.
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTagRequest {
    pub name: String,
}
