use devops_copilot_core::{Agent, AgentBuilder, TurnError};
use devops_copilot_core::transcript::Transcript;
use devops_copilot_model::ChatProvider;

use crate::devops::DevOpsClient;
use crate::tools::*;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    client: DevOpsClient,
    system_prompt: String,
}

impl SessionBuilder {
    /// Creates a session builder with a chat provider and a configured
    /// Azure DevOps client.
    pub fn new<P: ChatProvider + 'static>(
        provider: P,
        client: DevOpsClient,
    ) -> Self {
        Self {
            agent_builder: AgentBuilder::with_provider(provider),
            client,
            system_prompt: include_str!("./prompt.md").to_owned(),
        }
    }

    /// Overrides the default system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Builds a new session with the full tool set registered.
    pub fn build(self) -> Session {
        let client = self.client;
        let agent = self
            .agent_builder
            .with_system_prompt(self.system_prompt)
            .with_tool(ListBranchesTool::new(client.clone()))
            .with_tool(GetBranchTool::new(client.clone()))
            .with_tool(CreateBranchTool::new(client.clone()))
            .with_tool(DeleteBranchTool::new(client.clone()))
            .with_tool(ListProjectsTool::new(client.clone()))
            .with_tool(CreateProjectTool::new(client.clone()))
            .with_tool(DeleteProjectTool::new(client.clone()))
            .with_tool(ListRepositoriesTool::new(client.clone()))
            .with_tool(CreateRepositoryTool::new(client.clone()))
            .with_tool(DeleteRepositoryTool::new(client.clone()))
            .with_tool(ListFilesTool::new(client.clone()))
            .with_tool(GetReadmeTool::new(client.clone()))
            .with_tool(ListBuildsTool::new(client.clone()))
            .with_tool(CodeSearchTool::new(client.clone()))
            .with_tool(GetUserByEmailTool::new(client))
            .build();

        Session { agent }
    }
}

/// A chat session: a fully configured agent with every Azure DevOps tool
/// registered.
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Runs one conversation turn. See [`Agent::run_turn`].
    #[inline]
    pub async fn run_turn(
        &mut self,
        input: &str,
        on_delta: impl Fn(&str) + Send + Sync + 'static,
    ) -> Result<String, TurnError> {
        self.agent.run_turn(input, on_delta).await
    }

    /// The conversation history so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        self.agent.transcript()
    }
}
