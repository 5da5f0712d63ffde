use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use logprob_lens::types::CompletionRequest;
use logprob_lens::Error;

mod support;
use support::{build_client, completion_body, mount_completion};

#[tokio::test]
async fn create_sends_logprob_request_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "Say hi"}],
            "temperature": 0.5,
            "logprobs": true,
            "top_logprobs": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .mount(&server)
        .await;

    let client = build_client(&server.uri());
    let request = CompletionRequest::new("gpt-4o-mini", "Say hi", 2).with_temperature(0.5);
    let completion = client.completions().create(&request).await.unwrap();

    assert_eq!(completion.id, "chatcmpl-9x");
    assert_eq!(completion.usage.total_tokens, 13);
    assert_eq!(completion.choices[0].tokens.len(), 2);
    assert_eq!(completion.choices[0].tokens[1].alternatives[0].token, "!");
}

#[tokio::test]
async fn non_success_status_is_api_error_not_schema_error() {
    let server = MockServer::start().await;
    mount_completion(
        &server,
        ResponseTemplate::new(401).set_body_string("invalid api key"),
    )
    .await;

    let client = build_client(&server.uri());
    let err = client
        .completions()
        .create(&CompletionRequest::new("gpt-4o-mini", "Say hi", 2))
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(
        matches!(err, Error::ApiError { status: 401, ref message } if message == "invalid api key")
    );
}

#[tokio::test]
async fn malformed_json_body_is_transport_failure() {
    let server = MockServer::start().await;
    mount_completion(
        &server,
        ResponseTemplate::new(200).set_body_string("{not json"),
    )
    .await;

    let client = build_client(&server.uri());
    let err = client
        .completions()
        .create(&CompletionRequest::new("gpt-4o-mini", "Say hi", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Serialization { .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn schema_violations_are_reported_with_paths() {
    let server = MockServer::start().await;
    let mut body = completion_body();
    body["usage"].as_object_mut().unwrap().remove("total_tokens");
    body["system_fingerprint"] = json!("fp_abc");
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let client = build_client(&server.uri());
    let err = client
        .completions()
        .create(&CompletionRequest::new("gpt-4o-mini", "Say hi", 2))
        .await
        .unwrap_err();
    assert!(!err.is_transport());
    let source = match err {
        Error::Schema { source } => source,
        other => panic!("expected schema error, got {other:?}"),
    };
    let paths: Vec<&str> = source.paths().collect();
    assert_eq!(paths, vec!["usage.total_tokens", "system_fingerprint"]);
}

#[tokio::test]
async fn create_raw_returns_unvalidated_body() {
    let server = MockServer::start().await;
    mount_completion(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})),
    )
    .await;

    let client = build_client(&server.uri());
    let raw = client
        .completions()
        .create_raw(&CompletionRequest::new("gpt-4o-mini", "Say hi", 2))
        .await
        .unwrap();
    assert_eq!(raw, json!({"unexpected": true}));
}

#[tokio::test]
async fn invalid_request_is_rejected_before_sending() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(completion_body())).await;

    let client = build_client(&server.uri());
    let err = client
        .completions()
        .create(&CompletionRequest::new("gpt-4o-mini", "Say hi", 42))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
