pub mod form;
pub mod request;
pub mod result;

pub use form::FormState;
pub use request::{Attachment, GenerationRequest};
pub use result::{failure_reason, GenerationResult};
