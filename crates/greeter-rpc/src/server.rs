// crates/greeter-rpc/src/server.rs
//
// RPC server setup: GreeterRpcServer and RpcConfig.
//
// A single tonic-hosted service accepts JSON-encoded unary requests at
// `/greeter.Greeter/SayHello`, runs them through the interceptor chain, and
// returns JSON-encoded replies. Error statuses are reported through the
// `grpc-status`/`grpc-message` headers plus a JSON error body.
//
// This avoids proto codegen while still using tonic's server infrastructure
// for transport and HTTP/2 handling.

use std::sync::Arc;
use std::time::Duration;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::{Code, Status};

use greeter_core::{CallContext, GreetingUseCase, SharedLogger};

use crate::chain::{Chain, ChainError};
use crate::handlers::GreeterHandler;
use crate::middleware;
use crate::proto::{ErrorBody, HelloReply, HelloRequest, SAY_HELLO_PATH, SERVICE_NAME};

/// Characters escaped in `grpc-message`: controls, non-ASCII, and `%`.
const GRPC_MESSAGE_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'%');

/// Header carrying the caller's timeout, e.g. `3S` or `250m`.
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

// ---------------------------------------------------------------------------
// GreeterRpcServer
// ---------------------------------------------------------------------------

/// The Greeter RPC server.
///
/// Owns the interceptor chain, built once here and shared by every call.
#[derive(Debug, Clone)]
pub struct GreeterRpcServer {
    config: RpcConfig,
    chain: Arc<Chain<HelloRequest, HelloReply>>,
}

impl GreeterRpcServer {
    /// Create a server whose SayHello calls run `usecase` behind the
    /// standard Validation -> Logging -> Recovery chain.
    pub fn new(
        config: RpcConfig,
        usecase: Arc<dyn GreetingUseCase>,
        logger: SharedLogger,
    ) -> Result<Self, ChainError> {
        let handler = Arc::new(GreeterHandler::new(usecase));
        let chain = middleware::standard_chain(handler, logger)?;
        Ok(Self {
            config,
            chain: Arc::new(chain),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// The tower service answering RPCs, for mounting or in-process calls.
    pub fn service(&self) -> GreeterJsonRpcServer {
        GreeterJsonRpcServer {
            chain: self.chain.clone(),
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn start_with_shutdown<F>(
        &self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("Greeter RPC server listening on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(self.service())
            .serve_with_shutdown(addr, shutdown)
            .await?;

        tracing::info!("Greeter RPC server stopped");
        Ok(())
    }

    /// Serve until the process is interrupted.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------

/// Low-level service: reads the body, builds the call context, runs the
/// chain, and encodes the reply or status.
#[derive(Clone)]
pub struct GreeterJsonRpcServer {
    chain: Arc<Chain<HelloRequest, HelloReply>>,
}

impl std::fmt::Debug for GreeterJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreeterJsonRpcServer").finish()
    }
}

impl tonic::server::NamedService for GreeterJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for GreeterJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let chain = self.chain.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            if parts.uri.path() != SAY_HELLO_PATH {
                return Ok(status_response(&Status::unimplemented(format!(
                    "unknown method: {}",
                    parts.uri.path()
                ))));
            }

            let ctx = context_from_parts(&parts);

            let body_bytes = match collect_body(body).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    return Ok(status_response(&Status::internal(format!(
                        "failed to read request body: {}",
                        e
                    ))));
                }
            };

            let request: HelloRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    return Ok(status_response(&Status::invalid_argument(format!(
                        "invalid request body: {}",
                        e
                    ))));
                }
            };

            match chain.call(ctx, request).await {
                Ok(reply) => {
                    let json = serde_json::to_vec(&reply).unwrap_or_default();
                    Ok(build_response(json, Code::Ok, None))
                }
                Err(status) => Ok(status_response(&status)),
            }
        })
    }
}

/// Build the call context from the request head: method path, deadline
/// from `grpc-timeout`, and every UTF-8 header as metadata.
fn context_from_parts(parts: &http::request::Parts) -> CallContext {
    let mut ctx = CallContext::new(parts.uri.path());

    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            ctx = ctx.with_metadata(name.as_str(), value);
        }
    }

    let timeout = parts
        .headers
        .get(GRPC_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_grpc_timeout);
    if let Some(timeout) = timeout {
        ctx = ctx.with_timeout(timeout);
    }

    ctx
}

/// Parse a `grpc-timeout` value: up to eight ASCII digits followed by one of
/// `H`, `M`, `S`, `m`, `u`, `n`.
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if !value.is_ascii() || value.len() < 2 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(amount * 3600)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

fn status_response(status: &Status) -> http::Response<tonic::body::BoxBody> {
    let body = ErrorBody {
        code: status.code() as i32,
        message: status.message().to_string(),
    };
    let json = serde_json::to_vec(&body).unwrap_or_default();
    build_response(json, status.code(), Some(status.message()))
}

/// Build an HTTP response with the given JSON body and gRPC status headers.
fn build_response(
    json: Vec<u8>,
    code: Code,
    message: Option<&str>,
) -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json)).map_err(|never| match never {}),
    );

    let mut response = http::Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    headers.insert("grpc-status", http::HeaderValue::from(code as i32));
    if let Some(message) = message {
        let encoded = utf8_percent_encode(message, GRPC_MESSAGE_ENCODE_SET).to_string();
        if let Ok(value) = http::HeaderValue::from_str(&encoded) {
            headers.insert("grpc-message", value);
        }
    }
    response
}
