use tracing::debug;

use crate::api::{ApiResult, HttpClient};
use crate::models::{TasksPage, TeamMember, TeamMembersResponse};

#[derive(Clone)]
pub struct TeamService {
    http: HttpClient,
}

impl TeamService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn members(&self) -> ApiResult<Vec<TeamMember>> {
        debug!("Fetching team members");
        let response: TeamMembersResponse = self.http.get("/team/members").await?;
        Ok(response.members)
    }

    /// Tasks assigned to one team member. The endpoint returns the tasks
    /// shape without pagination fields.
    pub async fn member_tasks(&self, member_id: &str) -> ApiResult<TasksPage> {
        debug!(member_id, "Fetching member tasks");
        self.http
            .get(&format!("/team/members/{}/tasks", member_id))
            .await
    }
}
