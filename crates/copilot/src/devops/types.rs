//! Response and request schemas for the Azure DevOps REST surface.
//!
//! Responses are decoded into these named shapes right at the client
//! boundary, so a missing attribute is a decode error instead of a silent
//! runtime fault somewhere downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{ count, value }` envelope most collection endpoints return.
#[derive(Clone, Debug, Deserialize)]
pub struct ValueList<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> ValueList<T> {
    /// Whether the envelope carries at least one element.
    #[inline]
    pub fn has_results(&self) -> bool {
        !self.value.is_empty()
    }
}

/// A git ref (branch head). Fields beyond the two we inspect are kept so
/// the object can be passed through to the model verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    pub name: String,
    pub object_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A git repository reference.
#[derive(Clone, Debug, Deserialize)]
pub struct GitRepository {
    pub id: String,
    pub name: String,
}

/// A file or directory inside a repository.
#[derive(Clone, Debug, Deserialize)]
pub struct GitItem {
    pub path: String,
}

/// A team project reference.
#[derive(Clone, Debug, Deserialize)]
pub struct TeamProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    pub display_name: Option<String>,
}

/// A build record, as returned by the build list endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u64,
    pub build_number: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub queue_time: Option<String>,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub source_branch: Option<String>,
    pub source_version: Option<String>,
    pub url: Option<String>,
    pub requested_for: Option<IdentityRef>,
}

/// The reduced build projection handed to the model.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub id: u64,
    pub build_number: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub queue_time: Option<String>,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub source_branch: Option<String>,
    pub source_version: Option<String>,
    pub url: Option<String>,
    pub requested_for: Option<String>,
}

impl From<Build> for BuildSummary {
    fn from(build: Build) -> Self {
        Self {
            id: build.id,
            build_number: build.build_number,
            status: build.status,
            result: build.result,
            queue_time: build.queue_time,
            start_time: build.start_time,
            finish_time: build.finish_time,
            source_branch: build.source_branch,
            source_version: build.source_version,
            url: build.url,
            requested_for: build
                .requested_for
                .and_then(|identity| identity.display_name),
        }
    }
}

/// One entry of a ref-update POST.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefUpdate {
    pub name: String,
    pub old_object_id: String,
    pub new_object_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct VersionControlCapability {
    #[serde(rename = "sourceControlType")]
    pub source_control_type: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProcessTemplateCapability {
    #[serde(rename = "templateTypeId")]
    pub template_type_id: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectCapabilities {
    pub versioncontrol: VersionControlCapability,
    #[serde(rename = "processTemplate")]
    pub process_template: ProcessTemplateCapability,
}

/// Payload of the project-creation POST.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectCreate {
    pub name: String,
    pub description: String,
    pub capabilities: ProjectCapabilities,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectId {
    pub id: String,
}

/// Payload of the repository-creation POST.
#[derive(Clone, Debug, Serialize)]
pub struct RepositoryCreate {
    pub name: String,
    pub project: ProjectId,
}

#[derive(Clone, Debug, Serialize)]
pub struct CodeSearchFilters {
    #[serde(rename = "Project")]
    pub project: Vec<String>,
}

/// Payload of the code-search POST. The page is fixed: always the first
/// 50 hits.
#[derive(Clone, Debug, Serialize)]
pub struct CodeSearchRequest {
    #[serde(rename = "searchText")]
    pub search_text: String,
    #[serde(rename = "$skip")]
    pub skip: u32,
    #[serde(rename = "$top")]
    pub top: u32,
    pub filters: CodeSearchFilters,
}
