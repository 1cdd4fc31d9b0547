//! Manager endpoints for project CRUD and collaborator roles.

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::types::{
    ApiEnvelope, AssignRoleData, AssignRoleRequest, CreateProjectRequest, DeleteProjectData,
    ProjectModel, UpdateProjectRequest,
};

/// Typed project endpoints.
pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Access the project endpoints.
    #[must_use]
    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi { client: self }
    }
}

impl ProjectsApi<'_> {
    /// List the current user's projects.
    ///
    /// # Errors
    /// Classified per status; see [`ApiClient::get_json`].
    pub async fn list(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<ApiEnvelope<Vec<ProjectModel>>, ApiError> {
        self.client
            .get_json(&format!("/manager/projects?limit={limit}&offset={offset}"))
            .await
    }

    /// Create a project.
    ///
    /// # Errors
    /// Classified per status.
    pub async fn create(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ApiEnvelope<ProjectModel>, ApiError> {
        self.client.post_json("/manager/projects", request).await
    }

    /// Update a project.
    ///
    /// # Errors
    /// Classified per status.
    pub async fn update(
        &self,
        id: u64,
        request: &UpdateProjectRequest,
    ) -> Result<ApiEnvelope<ProjectModel>, ApiError> {
        self.client.put_json(&format!("/manager/projects/{id}"), request).await
    }

    /// Delete a project.
    ///
    /// # Errors
    /// Classified per status.
    pub async fn delete(&self, id: u64) -> Result<ApiEnvelope<DeleteProjectData>, ApiError> {
        self.client.delete_json(&format!("/manager/projects/{id}")).await
    }

    /// Assign a collaborator role (owner only).
    ///
    /// # Errors
    /// Classified per status; a 403 surfaces as `ApiError::Auth`.
    pub async fn assign_role(
        &self,
        project_id: u64,
        request: &AssignRoleRequest,
    ) -> Result<ApiEnvelope<AssignRoleData>, ApiError> {
        self.client.post_json(&format!("/manager/projects/{project_id}/roles"), request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use circle_common::testing::MemoryCredentialStore;
    use circle_common::Session;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::types::ProjectRole;
    use crate::config::ClientConfig;

    fn client(server: &MockServer) -> ApiClient {
        let store = Arc::new(MemoryCredentialStore::with_session(
            Session::new(
                "jwt".to_string(),
                Some(Utc::now().timestamp() + 30 * 24 * 60 * 60),
                None,
            ),
            Duration::from_secs(60),
        ));
        let config = ClientConfig { base_url: server.uri(), ..ClientConfig::default() };
        ApiClient::builder().config(config).store(store).build().expect("client")
    }

    fn project_json(id: u64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "owner_user_id": 1,
            "name": name,
            "slug": "circle-icons",
            "visibility": "private",
            "icon_count": 0,
            "created_at": "2026-08-01T10:00:00Z",
            "updated_at": "2026-08-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn list_sends_pagination_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/manager/projects"))
            .and(query_param("limit", "50"))
            .and(query_param("offset", "10"))
            .and(header("Authorization", "Bearer jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "ok",
                "data": [project_json(1, "Circle Icons")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client(&server).projects().list(50, 10).await.expect("list");
        let projects = envelope.data.expect("data");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Circle Icons");
    }

    #[tokio::test]
    async fn create_posts_the_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/manager/projects"))
            .and(body_json(json!({ "name": "Circle Icons", "visibility": "public" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "created",
                "data": project_json(2, "Circle Icons")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreateProjectRequest {
            name: "Circle Icons".to_string(),
            slug: None,
            package_name: None,
            visibility: Some(crate::api::types::ProjectVisibility::Public),
            description: None,
        };
        let envelope = client(&server).projects().create(&request).await.expect("create");
        assert_eq!(envelope.data.expect("data").id, 2);
    }

    #[tokio::test]
    async fn assign_role_hits_the_roles_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/manager/projects/7/roles"))
            .and(body_json(json!({ "target_user_id": 42, "role": "editor" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "ok",
                "data": { "ok": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = AssignRoleRequest { target_user_id: 42, role: ProjectRole::Editor };
        let envelope =
            client(&server).projects().assign_role(7, &request).await.expect("assign");
        assert!(envelope.data.expect("data").ok);
    }

    #[tokio::test]
    async fn forbidden_assignment_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/manager/projects/7/roles"))
            .respond_with(ResponseTemplate::new(403).set_body_string("owner only"))
            .mount(&server)
            .await;

        let request = AssignRoleRequest { target_user_id: 42, role: ProjectRole::Admin };
        let err = client(&server)
            .projects()
            .assign_role(7, &request)
            .await
            .expect_err("must be refused");
        assert!(matches!(err, ApiError::Auth(_)));
    }
}
