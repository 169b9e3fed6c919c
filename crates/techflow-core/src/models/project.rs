use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Task;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "ON_HOLD")]
    OnHold,
}

impl ProjectStatus {
    /// The wire value sent as a filter or payload field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::OnHold => "ON_HOLD",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "Active"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::OnHold => write!(f, "On Hold"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    /// Accepts wire names and the common lowercase/kebab spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "ON_HOLD" | "ONHOLD" => Ok(ProjectStatus::OnHold),
            _ => Err(format!("unknown project status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    /// Present on detail responses that embed the project's tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

/// Payload for `POST /projects`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
}

/// Partial payload for `PUT /projects/{id}`. Unset fields are left untouched
/// by the server, so they are omitted from the body entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// One page of `GET /projects`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectsPage {
    pub projects: Vec<Project>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(rename = "currentPage", default)]
    pub current_page: Option<u32>,
}
