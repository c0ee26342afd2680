//! Drives a real `ChatSession` against the router served on a loopback port.

use std::sync::Arc;

use async_trait::async_trait;
use krishi_client::{ChatSession, HttpProxyApi, SendOutcome, Sender};
use krishi_provider::{GenerativeProvider, ProviderError};
use krishi_server::{AppState, Config, routes};

struct Agronomist;

#[async_trait]
impl GenerativeProvider for Agronomist {
    fn name(&self) -> &str {
        "agronomist"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        assert!(prompt.contains("User question: How to grow rice?"));
        Ok("Transplant seedlings after 25 days.".to_owned())
    }
}

async fn serve(provider: Option<Arc<dyn GenerativeProvider>>) -> String {
    let state = Arc::new(AppState::new(Config::default(), provider));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, routes::build(state))
            .await
            .expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn question_gets_exactly_one_reply() {
    let base = serve(Some(Arc::new(Agronomist))).await;
    let session = ChatSession::new(HttpProxyApi::new(base));
    let before = session.len();

    let SendOutcome::Replied(reply) = session.send_message("How to grow rice?").await else {
        panic!("expected a reply");
    };
    assert_eq!(reply.text, "Transplant seedlings after 25 days.");
    assert!(!reply.is_error);

    let messages = session.messages();
    assert_eq!(messages.len(), before + 2);
    assert_eq!(messages[before].sender, Sender::User);
    assert_eq!(messages[before].text, "How to grow rice?");
    assert_eq!(messages[before + 1].sender, Sender::Bot);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn unconfigured_server_hint_reaches_the_conversation() {
    let base = serve(None).await;
    let api = HttpProxyApi::new(base);

    let health = api.health().await.expect("chat health");
    assert!(!health.provider_configured);

    let session = ChatSession::new(api);
    let SendOutcome::Replied(reply) = session.send_message("Is it going to rain?").await else {
        panic!("expected an error reply");
    };
    assert!(reply.is_error);
    assert_eq!(
        reply.text,
        "Please set up your Gemini API key in the environment variables"
    );
}

#[tokio::test]
async fn blank_input_never_reaches_the_server() {
    let base = serve(None).await;
    let session = ChatSession::new(HttpProxyApi::new(base));
    let before = session.len();

    let outcome = session.send_message("   ").await;
    assert!(matches!(outcome, SendOutcome::Ignored(_)));
    assert_eq!(session.len(), before);
}
