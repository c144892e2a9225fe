//! Location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location entity, purely descriptive. Deleting a location sets the
/// referencing posts' location to null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a location
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationInput {
    pub name: String,
    #[serde(default = "default_is_published")]
    pub is_published: bool,
}

fn default_is_published() -> bool {
    true
}

/// Input for updating a location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}
