pub mod error;
pub mod fallback;
pub mod frame;
pub mod pipeline;
pub mod protocol;
pub mod session;
pub mod timeline;

pub use error::{NarrationError, SynthesisError};
pub use fallback::{FallbackConfig, FallbackSynthesizer};
pub use pipeline::{NarrationPipeline, NarrationResult, ScriptProvider};
pub use protocol::VoiceConfig;
pub use session::{SessionConfig, SynthesisResult, SynthesisSession};
pub use timeline::{Timeline, WordBoundary};
