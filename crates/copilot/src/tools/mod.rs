//! Azure DevOps tools exposed to the model.
//!
//! Tool outputs are plain strings the model can read back: JSON arrays for
//! listings, `"true"` / `"false"` for mutations, and the empty string when
//! there is nothing to report. A tool only returns an error for transport
//! or decode failures; "the thing does not exist" is a sentinel, not an
//! error.

mod branches;
mod builds;
mod code_search;
mod projects;
mod repositories;
mod users;

pub use branches::{
    CreateBranchTool, DeleteBranchTool, GetBranchTool, ListBranchesTool,
};
pub use builds::ListBuildsTool;
pub use code_search::CodeSearchTool;
pub use projects::{CreateProjectTool, DeleteProjectTool, ListProjectsTool};
pub use repositories::{
    CreateRepositoryTool, DeleteRepositoryTool, GetReadmeTool, ListFilesTool,
    ListRepositoriesTool,
};
pub use users::GetUserByEmailTool;

use devops_copilot_core::tool::Error as ToolError;

use crate::devops::ClientError;

pub(crate) fn client_failure(err: ClientError) -> ToolError {
    ToolError::execution_error().with_reason(err.to_string())
}
