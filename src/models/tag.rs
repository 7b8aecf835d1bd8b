//! Tag models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

/// Tag stored in database.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTagRequest {
    pub name: String,
}

/// Trim, validate and de-duplicate tag names, keeping first-seen order.
pub fn normalize_tag_names(names: &[String]) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for raw in names {
        let name = super::required_name("tag name", Some(raw), super::limits::TAG_NAME)?;
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}
