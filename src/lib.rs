/*
 * lib.rs
 * ------
 * Library side of fishspeak: argument parsing, the Fish Audio TTS client,
 * the ffmpeg transcoder and the pipeline gluing them together.
*/

pub mod args;
pub mod fish_tts;
pub mod pipeline;
pub mod transcode;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Every failure the pipeline can hit. `main` prints it and exits with 1.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Config(String),
    #[error("output path must end in .mp3: {0}")]
    InvalidOutputPath(PathBuf),
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("TTS API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("MP3 not generated: {0}")]
    NotGenerated(PathBuf),
    #[error("OGG not generated: {0}")]
    OggNotGenerated(PathBuf),
    #[error("failed to start transcoder {program}: {source}")]
    TranscoderSpawn {
        program: String,
        source: std::io::Error,
    },
    #[error("transcoder exited with {status}: {stderr}")]
    Transcode { status: String, stderr: String },
}

static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\u{200D}\u{FE0E}\u{FE0F}\u{20E3}]")
        .expect("emoji pattern is valid")
});

/// Strip emoji and their joiners/selectors, then trim. TTS voices read them out
/// as names ("smiling face") or stumble over them.
pub fn clean_tts_input(input: &str) -> String {
    EMOJI.replace_all(input, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_tts_input_removes_emoji_and_trims() {
        assert_eq!(clean_tts_input("  Olá! 👋😀 "), "Olá!");
        assert_eq!(clean_tts_input("thumbs 👍🏽 up"), "thumbs  up");
        assert_eq!(clean_tts_input("family 👨‍👩‍👧 here"), "family  here");
    }

    #[test]
    fn clean_tts_input_keeps_plain_text() {
        let text = "Preço: R$ 10,00 (promoção) #1";
        assert_eq!(clean_tts_input(text), text);
    }

    #[test]
    fn api_error_messages_carry_cause() {
        let err = ApiError::Api {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "TTS API error (401): invalid api key");

        let err = ApiError::NotGenerated(PathBuf::from("out.mp3"));
        assert_eq!(err.to_string(), "MP3 not generated: out.mp3");
    }
}
