// crates/greeter-rpc/src/proto.rs
//
// Wire messages for the Greeter service. Bodies are JSON-encoded; no proto
// codegen is involved.

use serde::{Deserialize, Serialize};

use greeter_core::{Capability, Validatable};

/// Fully qualified service name.
pub const SERVICE_NAME: &str = "greeter.Greeter";

/// Path of the single unary method.
pub const SAY_HELLO_PATH: &str = "/greeter.Greeter/SayHello";

/// Request for SayHello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloRequest {
    /// Name of the person to greet.
    pub name: String,
}

/// Response from SayHello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloReply {
    pub message: String,
}

/// Error body returned alongside the `grpc-status` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric gRPC status code.
    pub code: i32,
    pub message: String,
}

// HelloRequest carries only a name, so there is nothing the validation
// interceptor can check; it passes through untouched.
impl Validatable for HelloRequest {
    fn capability(&self) -> Capability<'_> {
        Capability::Neither
    }
}
