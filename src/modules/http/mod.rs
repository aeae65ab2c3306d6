pub mod errors;
#[cfg(test)]
pub(crate) mod mock;
pub mod pipeline;
pub mod transport;

pub use errors::{ApiError, ApiErrorKind};
pub use pipeline::RequestPipeline;
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
