/*
    Speech generation pipeline: synthesize to MP3, check it landed,
    transcode to Opus/OGG, remove the MP3.
*/
use crate::fish_tts::{tts_to_file, Credentials, Request};
use crate::transcode::Transcoder;
use crate::ApiError;
use log::{debug, info};
use reqwest::Client;
use std::path::{Path, PathBuf};

/// The OGG path for an output ending in `.mp3` (any case), same stem.
pub fn ogg_path_for(mp3: &Path) -> Result<PathBuf, ApiError> {
    match mp3.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mp3") => Ok(mp3.with_extension("ogg")),
        _ => Err(ApiError::InvalidOutputPath(mp3.to_path_buf())),
    }
}

pub struct Pipeline {
    client: Client,
    base_url: String,
    credentials: Credentials,
    transcoder: Transcoder,
}

impl Pipeline {
    pub fn new(credentials: Credentials, base_url: impl Into<String>, transcoder: Transcoder) -> Self {
        Pipeline {
            client: Client::new(),
            base_url: base_url.into(),
            credentials,
            transcoder,
        }
    }

    /// Run every step for one request and return the path of the OGG file.
    ///
    /// The MP3 is removed only after the transcoder succeeds and the OGG is on
    /// disk; on any earlier failure it is left where it is.
    pub async fn generate_audio(&self, request: &Request, mp3: &Path) -> Result<PathBuf, ApiError> {
        let ogg = ogg_path_for(mp3)?;

        tts_to_file(&self.client, &self.base_url, &self.credentials, request, mp3).await?;

        if !mp3.exists() {
            return Err(ApiError::NotGenerated(mp3.to_path_buf()));
        }

        self.transcoder.to_opus_ogg(mp3, &ogg).await?;

        if !ogg.exists() {
            return Err(ApiError::OggNotGenerated(ogg));
        }

        tokio::fs::remove_file(mp3).await?;
        debug!("Removed intermediate {}", mp3.display());

        info!("Audio ready at {}", ogg.display());
        Ok(ogg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ogg_path_replaces_trailing_mp3() {
        assert_eq!(
            ogg_path_for(Path::new("audios/resposta-5511-1700.mp3")).unwrap(),
            PathBuf::from("audios/resposta-5511-1700.ogg")
        );
        assert_eq!(
            ogg_path_for(Path::new("/tmp/a.mp3.d/Out.MP3")).unwrap(),
            PathBuf::from("/tmp/a.mp3.d/Out.ogg")
        );
    }

    #[test]
    fn ogg_path_requires_mp3_extension() {
        for bad in ["out.wav", "out", "out.mp3.bak", ".mp3"] {
            assert!(
                matches!(ogg_path_for(Path::new(bad)), Err(ApiError::InvalidOutputPath(_))),
                "{bad} should be rejected"
            );
        }
    }
}
