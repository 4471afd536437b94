pub mod decoder;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod streamfactory;
pub mod transport;

// Re-exports for convenience
pub use requestbody::{Payload, RequestBody, SendDataAs};
pub use response::{Body, Outcome, ParseAs, Response, StreamedResponse};
pub use responsebody::BodyStream;
pub use transport::{Scheme, Transport, TransportOptions, TransportRequest, TransportResponse};
