// Mappers 模块 - 协议转换器
// Inbound normalization, upstream result extraction and outbound
// OpenAI/Gemini rendering

pub mod gemini;
pub mod models;
pub mod openai;
pub mod protocol;
pub mod request;
pub mod result;

pub use models::{GeneratedImage, HistoryTurn, ImageRef, NormalizedRequest, TurnRole, UpstreamResult};
pub use protocol::{OutputProtocol, StreamFraming, STREAM_SENTINEL};
