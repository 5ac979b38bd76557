use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayoutError {
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Renderer is no longer running")]
    Disconnected,

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, PlayoutError>;
