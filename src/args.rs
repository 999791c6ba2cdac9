use crate::fish_tts::{Credentials, Latency, Request, ResponseFormat};
use crate::ApiError;
use clap::Parser;
use std::path::PathBuf;

/// fishspeak Configuration
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about = "Synthesize text with Fish Audio and save it as Opus in an OGG container"
)]
pub struct Args {
    /// Text to speak
    #[clap(help = "Text to synthesize.")]
    pub text: String,

    /// Output MP3 path, the OGG lands next to it
    #[clap(
        help = "Path of the intermediate MP3, must end in .mp3. The final file is the same path with .ogg."
    )]
    pub output: PathBuf,

    /// Fish Audio API key
    #[clap(
        long,
        env = "FISH_API_KEY",
        hide_env_values = true,
        help = "Fish Audio API key."
    )]
    pub api_key: Option<String>,

    /// Fish Audio voice model (reference_id)
    #[clap(
        long,
        env = "FISH_MODEL_ID",
        help = "Fish Audio voice model id, sent as reference_id."
    )]
    pub model_id: Option<String>,

    /// API base url
    #[clap(
        long,
        env = "FISH_API_URL",
        default_value = "https://api.fish.audio",
        help = "Base url of the Fish Audio API."
    )]
    pub api_url: String,

    /// ffmpeg binary
    #[clap(
        long,
        env = "FFMPEG_PATH",
        default_value = "ffmpeg",
        help = "ffmpeg binary used to transcode the MP3 to Opus/OGG."
    )]
    pub ffmpeg: String,

    /// MP3 bitrate
    #[clap(
        long,
        env = "MP3_BITRATE",
        default_value = "128",
        help = "MP3 bitrate in kbps requested from the API, 64, 128 or 192."
    )]
    pub mp3_bitrate: u32,

    /// Chunk length
    #[clap(
        long,
        env = "CHUNK_LENGTH",
        default_value = "200",
        help = "Characters per synthesis chunk on the server side, 100 to 300."
    )]
    pub chunk_length: u32,

    /// Normalize
    #[clap(
        long,
        env = "NORMALIZE",
        default_value = "true",
        action = clap::ArgAction::Set,
        help = "Let the API normalize numbers and punctuation in the text."
    )]
    pub normalize: bool,

    /// Latency mode
    #[clap(
        long,
        env = "LATENCY",
        value_enum,
        default_value = "normal",
        help = "Latency mode, normal or balanced."
    )]
    pub latency: Latency,

    /// Strip emoji
    #[clap(
        long,
        env = "STRIP_EMOJI",
        default_value = "false",
        help = "Remove emoji from the text before sending it."
    )]
    pub strip_emoji: bool,

    /// Log Level
    #[clap(
        long,
        env = "LOGLEVEL",
        default_value = "info",
        help = "Log level: error, warn, info, debug, trace."
    )]
    pub loglevel: String,
}

impl Args {
    /// Both secrets must be present and non-empty.
    pub fn credentials(&self) -> Result<Credentials, ApiError> {
        let api_key = self.api_key.as_deref().filter(|v| !v.trim().is_empty());
        let model_id = self.model_id.as_deref().filter(|v| !v.trim().is_empty());
        match (api_key, model_id) {
            (Some(api_key), Some(model_id)) => Ok(Credentials {
                api_key: api_key.to_string(),
                model_id: model_id.to_string(),
            }),
            _ => Err(ApiError::Config(
                "FISH_API_KEY or FISH_MODEL_ID missing.".to_string(),
            )),
        }
    }

    /// Build the synthesis request, checking the option ranges the API accepts.
    pub fn request(&self) -> Result<Request, ApiError> {
        if ![64, 128, 192].contains(&self.mp3_bitrate) {
            return Err(ApiError::Config(format!(
                "mp3 bitrate must be 64, 128 or 192, got {}",
                self.mp3_bitrate
            )));
        }
        if !(100..=300).contains(&self.chunk_length) {
            return Err(ApiError::Config(format!(
                "chunk length must be between 100 and 300, got {}",
                self.chunk_length
            )));
        }

        let text = if self.strip_emoji {
            crate::clean_tts_input(&self.text)
        } else {
            self.text.clone()
        };

        Ok(Request {
            text,
            format: ResponseFormat::Mp3,
            mp3_bitrate: self.mp3_bitrate,
            chunk_length: self.chunk_length,
            normalize: self.normalize,
            latency: self.latency,
        })
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.loglevel.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}
