//! End-to-end session test: a scripted model driving a real tool against a
//! mocked Azure DevOps service.

use devops_copilot::{DevOpsClient, DevOpsEndpoints, SessionBuilder};
use devops_copilot_model::{ChatMessage, ToolCallRequest};
use devops_copilot_test_model::{
    ScriptedEvent, ScriptedProvider, ScriptedResponse,
};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_branch_listing_round_trip() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/P/_apis/git/repositories/R/refs")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter".into(), "heads".into()),
            Matcher::UrlEncoded("api-version".into(), "6.0".into()),
        ]))
        .with_body(
            json!({
                "count": 2,
                "value": [
                    { "name": "refs/heads/feature/x", "objectId": "aaa" },
                    { "name": "refs/heads/main", "objectId": "bbb" }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = DevOpsClient::new(
        DevOpsEndpoints {
            org: server.url(),
            search: server.url(),
            graph: server.url(),
        },
        "test-pat",
    )
    .unwrap();

    let provider = ScriptedProvider::default();
    provider.push_response(ScriptedResponse::with_events([
        ScriptedEvent::ToolCall(ToolCallRequest {
            id: "call_1".to_owned(),
            name: "list_branches".to_owned(),
            arguments: json!({ "project": "P", "repository": "R" }),
        }),
    ]));
    provider.push_response(ScriptedResponse::with_text(
        "R has the branches feature/x and main.",
    ));

    let mut session = SessionBuilder::new(provider.clone(), client).build();
    let text = session
        .run_turn("Which branches does R in P have?", |_| {})
        .await
        .unwrap();

    assert_eq!(text, "R has the branches feature/x and main.");
    assert_eq!(provider.remaining(), 0);

    // The tool reply fed back to the model carries the stripped names.
    let entries = session.transcript().entries();
    let ChatMessage::Tool(reply) = &entries[2] else {
        panic!("expected a tool reply entry");
    };
    assert_eq!(reply.id, "call_1");
    assert_eq!(reply.content, r#"["feature/x","main"]"#);
}
