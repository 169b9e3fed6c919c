use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Project, User};

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "To Do"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" | "INPROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" | "DONE" => Ok(TaskStatus::Completed),
            _ => Err(format!("unknown task status: {}", s)),
        }
    }
}

/// Task priority, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "URGENT")]
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "Low"),
            TaskPriority::Medium => write!(f, "Medium"),
            TaskPriority::High => write!(f, "High"),
            TaskPriority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" => Ok(TaskPriority::Urgent),
            _ => Err(format!("unknown task priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
    #[serde(rename = "projectId", default)]
    pub project_id: Option<String>,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    /// Embedded on some detail responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(rename = "assignedUser", default, skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<User>,
}

/// Payload for `POST /tasks`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub priority: TaskPriority,
    #[serde(rename = "dueDate")]
    pub due_date: String,
    #[serde(rename = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// Partial payload for `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(rename = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assigned_to.is_none()
    }
}

/// Payload for `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub status: TaskStatus,
}

/// One page of `GET /tasks`. The member-tasks endpoint returns the same
/// shape without pagination fields, so `totalPages` defaults to 1.
#[derive(Debug, Clone, Deserialize)]
pub struct TasksPage {
    pub tasks: Vec<Task>,
    #[serde(rename = "totalPages", default = "default_total_pages")]
    pub total_pages: u32,
    #[serde(rename = "currentPage", default)]
    pub current_page: Option<u32>,
}

fn default_total_pages() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tasks_page() {
        let json = r#"{"tasks":[{"id":"t-10","title":"Wire up login form","description":"Hook the form to the auth endpoint","status":"IN_PROGRESS","priority":"HIGH","dueDate":"2025-12-01","projectId":"p-1","assignedTo":"u-42","createdAt":"2025-11-02T08:15:00.000Z","updatedAt":"2025-11-05T10:00:00.000Z"}],"totalPages":3,"currentPage":2}"#;

        let page: TasksPage = serde_json::from_str(json).expect("Failed to parse tasks page");
        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.total_pages, 3);

        let task = &page.tasks[0];
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.project_id.as_deref(), Some("p-1"));
        assert_eq!(task.assigned_to.as_deref(), Some("u-42"));
    }

    #[test]
    fn test_parse_member_tasks_without_pagination() {
        // /team/members/{id}/tasks omits totalPages
        let json = r#"{"tasks":[]}"#;
        let page: TasksPage = serde_json::from_str(json).expect("Failed to parse member tasks");
        assert!(page.tasks.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, None);
    }

    #[test]
    fn test_parse_task_with_embedded_user() {
        let json = r#"{"id":"t-3","title":"Review PR","status":"TODO","priority":"LOW","assignedUser":{"id":"u-9","email":"lee@example.com","name":"Lee"}}"#;
        let task: Task = serde_json::from_str(json).expect("Failed to parse task");
        assert_eq!(task.assigned_user.as_ref().map(|u| u.name.as_str()), Some("Lee"));
        assert!(task.project.is_none());
    }

    #[test]
    fn test_new_task_omits_unassigned() {
        let new = NewTask {
            title: "Draft proposal".to_string(),
            description: String::new(),
            project_id: "p-1".to_string(),
            priority: TaskPriority::Medium,
            due_date: "2025-12-24".to_string(),
            assigned_to: None,
        };
        let body = serde_json::to_value(&new).expect("Failed to serialize new task");
        assert!(body.get("assignedTo").is_none());
        assert_eq!(body["projectId"], "p-1");
        assert_eq!(body["priority"], "MEDIUM");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Urgent > TaskPriority::High);
        assert!(TaskPriority::Low < TaskPriority::Medium);
    }
}
