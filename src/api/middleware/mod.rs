pub mod request_span;

pub use request_span::{RequestId, RequestSpan};
