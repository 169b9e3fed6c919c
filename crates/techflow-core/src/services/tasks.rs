use tracing::debug;

use crate::api::{ApiResult, HttpClient};
use crate::models::{NewTask, StatusChange, Task, TaskPriority, TaskStatus, TaskUpdate, TasksPage};

use super::projects::DEFAULT_PAGE_SIZE;

/// Parameters for `GET /tasks`. Filters are AND-combined server-side;
/// only set filters are sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub project_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub page: u32,
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            project_id: None,
            status: None,
            priority: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TaskQuery {
    fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref project_id) = self.project_id {
            if !project_id.is_empty() {
                pairs.push(("projectId", project_id.clone()));
            }
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[derive(Clone)]
pub struct TaskService {
    http: HttpClient,
}

impl TaskService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, query: &TaskQuery) -> ApiResult<TasksPage> {
        debug!(page = query.page, limit = query.limit, "Fetching tasks");
        self.http.get_query("/tasks", &query.to_query_pairs()).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<Task> {
        self.http.get(&format!("/tasks/{}", id)).await
    }

    pub async fn create(&self, task: &NewTask) -> ApiResult<Task> {
        debug!(title = %task.title, project_id = %task.project_id, "Creating task");
        self.http.post("/tasks", task).await
    }

    pub async fn update(&self, id: &str, update: &TaskUpdate) -> ApiResult<Task> {
        self.http.put(&format!("/tasks/{}", id), update).await
    }

    /// The narrow status-only update (`PATCH /tasks/{id}/status`).
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> ApiResult<Task> {
        debug!(id, status = status.as_str(), "Updating task status");
        self.http
            .patch(&format!("/tasks/{}/status", id), &StatusChange { status })
            .await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        debug!(id, "Deleting task");
        self.http.delete(&format!("/tasks/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_filters_are_omitted() {
        let query = TaskQuery {
            page: 2,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "2".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_empty_project_id_is_omitted() {
        let query = TaskQuery {
            project_id: Some(String::new()),
            ..Default::default()
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.iter().all(|(name, _)| *name != "projectId"));
    }

    #[test]
    fn test_set_filters_pass_through_exact_values() {
        let query = TaskQuery {
            project_id: Some("p-1".to_string()),
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::Urgent),
            ..Default::default()
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("projectId", "p-1".to_string())));
        assert!(pairs.contains(&("status", "TODO".to_string())));
        assert!(pairs.contains(&("priority", "URGENT".to_string())));
    }
}
