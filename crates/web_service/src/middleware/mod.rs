pub mod tracing_middleware;

pub use tracing_middleware::{extract_request_id, RequestId, RequestTracing, REQUEST_ID_HEADER};
