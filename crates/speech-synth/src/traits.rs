use crate::{AudioResource, SynthesisRequest};
use async_trait::async_trait;
use ticket_call::Result;

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Produce an audio resource for `request`.
    ///
    /// Fails with `SynthesisUnavailable` when the service cannot be reached
    /// or rejects the request.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioResource>;

    /// Pre-flight check that the resource can actually be fetched.
    ///
    /// Fails with `ResourceNotFound`.
    async fn verify(&self, resource: &AudioResource) -> Result<()>;
}
