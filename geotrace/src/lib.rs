pub mod normalize;
pub mod payload;
pub mod tls;

pub use payload::{NormalizedSubmission, SubmitPayload};
