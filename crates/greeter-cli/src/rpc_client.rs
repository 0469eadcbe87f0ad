// crates/greeter-cli/src/rpc_client.rs
//
// Lightweight JSON client that POSTs SayHello to the greeter-daemon endpoint.

use std::time::Duration;

use thiserror::Error;
use tonic::Code;

use greeter_rpc::proto::{ErrorBody, HelloReply, HelloRequest, SAY_HELLO_PATH};
use greeter_rpc::server::GRPC_TIMEOUT_HEADER;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{code:?}: {message}")]
    Status { code: Code, message: String },
}

/// Full URL of the SayHello method under `endpoint`.
pub fn say_hello_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), SAY_HELLO_PATH)
}

/// Encode a timeout as a `grpc-timeout` value, at millisecond precision.
pub fn grpc_timeout_value(timeout: Duration) -> String {
    format!("{}m", timeout.as_millis())
}

/// Call SayHello and return the greeting message.
pub async fn say_hello(endpoint: &str, name: &str, timeout: Duration) -> Result<String, ClientError> {
    let request = HelloRequest {
        name: name.to_string(),
    };

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let resp = client
        .post(say_hello_url(endpoint))
        .header(GRPC_TIMEOUT_HEADER, grpc_timeout_value(timeout))
        .json(&request)
        .send()
        .await?;

    let code = resp
        .headers()
        .get("grpc-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i32>().ok())
        .map(Code::from_i32)
        .unwrap_or(Code::Unknown);
    let body = resp.bytes().await?;

    decode_reply(code, &body)
}

fn decode_reply(code: Code, body: &[u8]) -> Result<String, ClientError> {
    if code == Code::Ok {
        let reply: HelloReply = serde_json::from_slice(body)?;
        return Ok(reply.message);
    }

    let message = serde_json::from_slice::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
    Err(ClientError::Status { code, message })
}
