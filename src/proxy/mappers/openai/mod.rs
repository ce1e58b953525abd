// OpenAI mapper module
// Chat-completions request models plus buffered and streamed response builders

pub mod models;
pub mod response;
pub mod streaming;

pub use models::*;
pub use response::transform_openai_response;
pub use streaming::build_openai_chunks;
