pub mod gemini;
pub mod transport;

pub use gemini::{GeminiClient, EXHAUSTED_FALLBACK, SIGNAL_LOST_FALLBACK};
pub use transport::{ReqwestTransport, Transport};
