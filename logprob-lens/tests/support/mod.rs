#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use logprob_lens::Client;

pub fn build_client(base_url: &str) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(format!("{base_url}/v1"))
        .build()
        .unwrap()
}

pub fn completion_body() -> Value {
    json!({
        "id": "chatcmpl-9x",
        "object": "chat.completion",
        "created": 1_717_000_000,
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Hi there"},
            "logprobs": {"content": [
                {"token": "Hi", "logprob": -0.105, "bytes": [72, 105], "top_logprobs": [
                    {"token": "Hi", "logprob": -0.105, "bytes": [72, 105]},
                    {"token": "Hello", "logprob": -2.303, "bytes": null}
                ]},
                {"token": " there", "logprob": -0.7, "bytes": [32, 116, 104, 101, 114, 101], "top_logprobs": [
                    {"token": "!", "logprob": -0.69, "bytes": [33]},
                    {"token": " there", "logprob": -0.7, "bytes": [32, 116, 104, 101, 114, 101]}
                ]}
            ], "refusal": null},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 11, "completion_tokens": 2, "total_tokens": 13},
        "system_fingerprint": null
    })
}

pub async fn mount_completion(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(response)
        .mount(server)
        .await;
}
