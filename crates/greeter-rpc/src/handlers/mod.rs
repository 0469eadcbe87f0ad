// crates/greeter-rpc/src/handlers/mod.rs
//
// Terminal handlers for the RPC methods. Each handler adapts wire messages
// to domain types and back.

pub mod greeter;

pub use greeter::GreeterHandler;
