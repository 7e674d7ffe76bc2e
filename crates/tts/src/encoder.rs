use base64::{Engine, engine::general_purpose::STANDARD};

use crate::types::{OutputEnvelope, SynthesisResult};

/// Wrap synthesized audio into the job output envelope
///
/// Standard alphabet with padding and no line wrapping.
pub fn encode(result: SynthesisResult) -> OutputEnvelope {
    OutputEnvelope {
        audio_base64: STANDARD.encode(&result.audio),
        mime_type: result.mime_type,
        format: result.format,
        sample_rate: result.sample_rate,
    }
}
