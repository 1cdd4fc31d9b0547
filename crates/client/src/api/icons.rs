//! Manager endpoints for icon metadata and file upload.
//!
//! Upload is the multipart path: a `component_info` text field matched
//! against the icon record, plus the file bytes.

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::request::FormPayload;
use crate::api::types::{ApiEnvelope, IconModel, ListIconsParams, UploadIconData};

/// Typed icon endpoints.
pub struct IconsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Access the icon endpoints.
    #[must_use]
    pub fn icons(&self) -> IconsApi<'_> {
        IconsApi { client: self }
    }
}

impl IconsApi<'_> {
    /// List icons of a project with optional filtering and pagination.
    ///
    /// # Errors
    /// Classified per status; see [`ApiClient::get_json`].
    pub async fn list(
        &self,
        project_id: u64,
        params: &ListIconsParams,
    ) -> Result<ApiEnvelope<Vec<IconModel>>, ApiError> {
        let query = params.query_string();
        let path = if query.is_empty() {
            format!("/manager/projects/{project_id}/icons")
        } else {
            format!("/manager/projects/{project_id}/icons?{query}")
        };
        self.client.get_json(&path).await
    }

    /// Fetch a single icon record.
    ///
    /// # Errors
    /// Classified per status.
    pub async fn get(
        &self,
        project_id: u64,
        icon_id: u64,
    ) -> Result<ApiEnvelope<IconModel>, ApiError> {
        self.client.get_json(&format!("/manager/projects/{project_id}/icons/{icon_id}")).await
    }

    /// Upload an icon file for a component.
    ///
    /// # Arguments
    /// * `project_id` - The project the icon belongs to
    /// * `component_info` - Component string matched against the icon record
    /// * `file_name` - Name reported to the server
    /// * `content_type` - MIME type of the file
    /// * `bytes` - Raw file content
    ///
    /// # Errors
    /// Classified per status; an invalid `content_type` is `ApiError::Config`.
    pub async fn upload(
        &self,
        project_id: u64,
        component_info: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiEnvelope<UploadIconData>, ApiError> {
        let form = FormPayload::new()
            .text("component_info", component_info)
            .file("file", file_name, content_type, bytes);
        self.client.post_form(&format!("/manager/icons/{project_id}/upload"), form).await
    }
}
