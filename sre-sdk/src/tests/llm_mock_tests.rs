//! Mock tests for the language-model service client

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::LlmConfig;
    use crate::context::{CancellationError, RequestContext};
    use crate::error::ServiceError;
    use crate::services::llm::{ChatRequest, LlmClient};

    fn create_test_client(mock_server: &MockServer, token: Option<&str>) -> LlmClient {
        let mut config = LlmConfig::new(mock_server.uri());
        config.api_token = token.map(str::to_string);
        LlmClient::new(config).expect("Failed to build LLM client")
    }

    #[tokio::test]
    async fn test_chat_posts_prompt_and_context() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(header("Authorization", "Bearer llm-token"))
            .and(body_json(json!({
                "prompt": "summarize",
                "context": {"metrics": "{\"value\":1}"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "all good"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("llm-token"));
        let request = ChatRequest::new("summarize").with_context("metrics", "{\"value\":1}");
        let response = client
            .chat(&RequestContext::background(), &request)
            .await
            .expect("chat");

        assert_eq!(response.output, "all good");
    }

    #[tokio::test]
    async fn test_chat_omits_empty_context() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(body_json(json!({"prompt": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": ""})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        let response = client
            .chat(&RequestContext::background(), &ChatRequest::new("hello"))
            .await
            .expect("chat");

        // Empty output is left to the caller.
        assert!(response.output.is_empty());
    }

    #[tokio::test]
    async fn test_chat_error_status_folds_body_into_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("model overloaded"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        let err = client
            .chat(&RequestContext::background(), &ChatRequest::new("hello"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("LLM request failed: model overloaded"));
        assert_eq!(err.status_code(), Some(502));
    }

    #[tokio::test]
    async fn test_chat_bad_json_is_parsing_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        let err = client
            .chat(&RequestContext::background(), &ChatRequest::new("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err.root(), ServiceError::Parsing(_)));
    }

    #[tokio::test]
    async fn test_enabled_when_health_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        assert_eq!(client.enabled(&RequestContext::background()).await, Ok(true));
    }

    #[tokio::test]
    async fn test_enabled_false_on_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        assert_eq!(client.enabled(&RequestContext::background()).await, Ok(false));
    }

    #[tokio::test]
    async fn test_enabled_false_when_unreachable() {
        let client = LlmClient::new(LlmConfig::new("http://127.0.0.1:9")).expect("client");
        assert_eq!(client.enabled(&RequestContext::background()).await, Ok(false));
    }

    #[tokio::test]
    async fn test_enabled_propagates_cancellation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        let ctx = RequestContext::background();
        ctx.cancel();

        assert_eq!(client.enabled(&ctx).await, Err(CancellationError::Cancelled));
    }

    #[tokio::test]
    async fn test_enabled_propagates_deadline() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(100));

        assert_eq!(
            client.enabled(&ctx).await,
            Err(CancellationError::DeadlineExceeded)
        );
    }
}
