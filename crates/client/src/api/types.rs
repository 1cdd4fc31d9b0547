//! Wire types for the CircleCenter API.
//!
//! Field names match the backend's JSON exactly; timestamps stay in the
//! representation the wire uses (unix seconds for token expiry, formatted
//! strings for record audit fields).

use serde::{Deserialize, Serialize};

/// Generic response envelope used by every JSON endpoint.
///
/// `data` is optional because failure and logout envelopes omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// Error body the backend attaches to refused requests.
///
/// A 401 may carry `code: "ACCOUNT_NOT_VERIFIED"` plus the account email;
/// the client never interprets it, it is for the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub message: String,
    pub code: Option<String>,
    pub email: Option<String>,
}

impl ErrorPayload {
    /// Parse an error payload out of a raw response body.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Payload of a successful `/account/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshData {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile-plus-token payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub locale: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterData {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub locale: String,
    pub timezone: String,
    pub created_at: String,
    pub email_sent: bool,
    pub email_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendVerificationData {
    pub email_sent: bool,
    pub email_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    pub user_id: u64,
    pub username: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Manager: projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectVisibility {
    Private,
    Public,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectModel {
    pub id: u64,
    pub owner_user_id: u64,
    pub name: String,
    pub slug: String,
    pub package_name: Option<String>,
    pub visibility: ProjectVisibility,
    pub description: Option<String>,
    pub icon_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<ProjectVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<ProjectVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteProjectData {
    #[serde(default)]
    pub id: Option<u64>,
}

/// Collaborator roles assignable on a project. Ownership transfer is not an
/// assignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignRoleRequest {
    pub target_user_id: u64,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRoleData {
    pub ok: bool,
}

// ---------------------------------------------------------------------------
// Manager: icons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct IconModel {
    pub id: u64,
    #[serde(rename = "projectId")]
    pub project_id: u64,
    pub name: String,
    #[serde(rename = "pkg")]
    pub package: String,
    #[serde(rename = "componentInfo")]
    pub component_info: String,
    pub drawable: String,
    pub status: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Optional filters and pagination for the icon listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListIconsParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<String>,
    pub package: Option<String>,
    pub search: Option<String>,
}

impl ListIconsParams {
    /// Render the set parameters as a query string (no leading `?`).
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(format!("limit={limit}"));
        }
        if let Some(offset) = self.offset {
            pairs.push(format!("offset={offset}"));
        }
        if let Some(status) = &self.status {
            pairs.push(format!("status={}", urlencoding::encode(status)));
        }
        if let Some(package) = &self.package {
            pairs.push(format!("package={}", urlencoding::encode(package)));
        }
        if let Some(search) = &self.search {
            pairs.push(format!("search={}", urlencoding::encode(search)));
        }
        pairs.join("&")
    }
}

/// Payload of a successful icon file upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadIconData {
    pub path: String,
    pub content_type: String,
}
