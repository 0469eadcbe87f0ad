// crates/greeter-rpc/src/lib.rs
//
// greeter-rpc: Interceptor chain, SayHello handler, and RPC server for the
// Greeter service.
//
// Requests arrive as JSON over tonic's transport, pass through the
// Validation -> Logging -> Recovery chain, and reach the greeting use case
// through `GreeterHandler`.

pub mod chain;
pub mod handlers;
pub mod middleware;
pub mod proto;
pub mod server;
pub mod status;

// Re-export the main server type for ergonomic access.
pub use chain::{Chain, ChainBuilder, ChainError, Interceptor, Next, UnaryHandler};
pub use server::{GreeterJsonRpcServer, GreeterRpcServer, RpcConfig};
