pub mod cache;
pub mod envelope;
pub mod stream;

pub use cache::RedisCache;
pub use envelope::{EventEnvelope, EventMetadata, EVENT_VERSION};
pub use stream::{StreamConsumer, StreamError, StreamMessage, StreamPublisher};
