//! Turn pipeline tests: transcript policy around agent success and
//! failure, and progress-event delivery.

use sqlchat::agent::{AgentEvent, ChannelSink, MockAgent, NullSink};
use sqlchat::session::Session;
use sqlchat::transcript::{ChatRole, GREETING};

#[tokio::test]
async fn test_turn_appends_user_then_assistant() {
    let mut session = Session::new();
    let agent = MockAgent::answering("There are 2 students.");

    session
        .handle_turn("how many students are there?", &agent, &NullSink)
        .await
        .unwrap();

    let roles: Vec<ChatRole> = session
        .transcript()
        .messages()
        .iter()
        .map(|m| m.role)
        .collect();
    assert_eq!(
        roles,
        vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
    );
}

#[tokio::test]
async fn test_failed_turn_appends_no_assistant_message() {
    let mut session = Session::new();
    let agent = MockAgent::failing("rate limited");

    let outcome = session.handle_turn("anything", &agent, &NullSink).await;

    assert!(outcome.is_err());
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript().messages()[1].role, ChatRole::User);

    // The next successful turn continues from the same history
    let agent = MockAgent::answering("recovered");
    session.handle_turn("retry", &agent, &NullSink).await.unwrap();
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_progress_events_flow_through_the_sink() {
    let mut session = Session::new();
    let agent = MockAgent::answering("done").with_events(vec![
        AgentEvent::ToolCall {
            name: "list_tables".to_string(),
            input: String::new(),
        },
        AgentEvent::Sql("SELECT count(*) FROM student".to_string()),
    ]);
    let (sink, mut rx) = ChannelSink::new();

    session.handle_turn("count them", &agent, &sink).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], AgentEvent::ToolCall { .. }));
}

#[tokio::test]
async fn test_clear_history_between_turns() {
    let mut session = Session::new();
    let agent = MockAgent::answering("A");

    session.handle_turn("Q1", &agent, &NullSink).await.unwrap();
    session.handle_turn("Q2", &agent, &NullSink).await.unwrap();
    assert_eq!(session.transcript().len(), 5);

    session.clear_history();

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript().messages()[0].content, GREETING);

    session.handle_turn("Q3", &agent, &NullSink).await.unwrap();
    assert_eq!(session.transcript().len(), 3);
}
