// Gemini mapper module
// Native generateContent request models and response/stream builders

pub mod models;
pub mod response;
pub mod streaming;

pub use response::transform_gemini_response;
pub use streaming::build_gemini_chunks;
