use tracing::debug;

use crate::api::{ApiResult, HttpClient};
use crate::models::{NewProject, Project, ProjectUpdate, ProjectsPage};

/// Default page size for list calls
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameters for `GET /projects`. Pages are 1-based; an empty search
/// is not sent to the server at all.
///
/// Clone + PartialEq so a caller can keep the query it issued and drop a
/// response that no longer matches the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: String::new(),
        }
    }
}

impl ProjectQuery {
    fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}

#[derive(Clone)]
pub struct ProjectService {
    http: HttpClient,
}

impl ProjectService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, query: &ProjectQuery) -> ApiResult<ProjectsPage> {
        debug!(page = query.page, limit = query.limit, "Fetching projects");
        self.http
            .get_query("/projects", &query.to_query_pairs())
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResult<Project> {
        self.http.get(&format!("/projects/{}", id)).await
    }

    pub async fn create(&self, project: &NewProject) -> ApiResult<Project> {
        debug!(name = %project.name, "Creating project");
        self.http.post("/projects", project).await
    }

    pub async fn update(&self, id: &str, update: &ProjectUpdate) -> ApiResult<Project> {
        self.http.put(&format!("/projects/{}", id), update).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        debug!(id, "Deleting project");
        self.http.delete(&format!("/projects/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_always_paginate() {
        let query = ProjectQuery {
            page: 2,
            limit: 10,
            search: String::new(),
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "2".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_include_nonempty_search() {
        let query = ProjectQuery {
            search: "relaunch".to_string(),
            ..Default::default()
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("search", "relaunch".to_string())));
    }

    #[test]
    fn test_default_query_is_first_page() {
        let query = ProjectQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    }
}
