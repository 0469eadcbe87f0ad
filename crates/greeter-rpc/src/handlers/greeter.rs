// crates/greeter-rpc/src/handlers/greeter.rs
//
// SayHello handler: HelloRequest -> Person -> use case -> HelloReply.

use std::sync::Arc;

use async_trait::async_trait;
use tonic::Status;

use greeter_core::{CallContext, GreetingUseCase, Person};

use crate::chain::UnaryHandler;
use crate::proto::{HelloReply, HelloRequest};
use crate::status::status_from_error;

/// Handler for `greeter.Greeter/SayHello`.
pub struct GreeterHandler {
    usecase: Arc<dyn GreetingUseCase>,
}

impl GreeterHandler {
    pub fn new(usecase: Arc<dyn GreetingUseCase>) -> Self {
        Self { usecase }
    }
}

/// Build the domain person for a request.
///
/// The request only carries a name, so the last name is left empty and the
/// age is zero. This person is never run through validation.
pub fn person_from_request(request: HelloRequest) -> Person {
    Person {
        first_name: request.name,
        last_name: String::new(),
        age: 0,
    }
}

#[async_trait]
impl UnaryHandler<HelloRequest, HelloReply> for GreeterHandler {
    async fn handle(&self, ctx: CallContext, request: HelloRequest) -> Result<HelloReply, Status> {
        let person = person_from_request(request);
        let greeting = self
            .usecase
            .execute(&ctx, person)
            .await
            .map_err(|e| status_from_error(&e))?;

        Ok(HelloReply {
            message: greeting.message,
        })
    }
}
