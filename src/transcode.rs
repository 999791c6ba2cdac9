/*
 * transcode.rs
 *
 * Re-encode the synthesized MP3 to Opus in an OGG container with ffmpeg.
 * ffmpeg output is captured, only surfaced when the run fails.
*/

use crate::ApiError;
use log::{debug, info};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

// ffmpeg prints a long banner, keep only the end of it in errors
const STDERR_TAIL_LINES: usize = 8;

#[derive(Debug, Clone)]
pub struct Transcoder {
    program: String,
}

impl Transcoder {
    pub fn new(program: impl Into<String>) -> Self {
        Transcoder {
            program: program.into(),
        }
    }

    /// `-y -i <input> -acodec libopus -f ogg <output>`
    pub fn opus_ogg_args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-acodec".into(),
            "libopus".into(),
            "-f".into(),
            "ogg".into(),
            output.as_os_str().to_owned(),
        ]
    }

    /// Transcode `input` into `output`, overwriting it. Blocks until ffmpeg exits.
    pub async fn to_opus_ogg(&self, input: &Path, output: &Path) -> Result<(), ApiError> {
        debug!(
            "Transcoding {} -> {} with {}",
            input.display(),
            output.display(),
            self.program
        );

        let result = Command::new(&self.program)
            .args(Self::opus_ogg_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ApiError::TranscoderSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ApiError::Transcode {
                status: result.status.to_string(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        info!("Transcoded {} to Opus/OGG", output.display());
        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_request_overwrite_libopus_and_ogg() {
        let args = Transcoder::opus_ogg_args(Path::new("a/b.mp3"), Path::new("a/b.ogg"));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            ["-y", "-i", "a/b.mp3", "-acodec", "libopus", "-f", "ogg", "a/b.ogg"]
        );
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr: String = (0..20).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("line 12"));
        assert!(tail.ends_with("line 19"));
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = Transcoder::new(dir.path().join("no-such-ffmpeg").to_string_lossy());
        let err = transcoder
            .to_opus_ogg(&dir.path().join("in.mp3"), &dir.path().join("in.ogg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TranscoderSpawn { .. }));
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_transcoder_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(
            dir.path(),
            "ffmpeg",
            "echo 'in.mp3: Invalid data found when processing input' >&2\nexit 1",
        );
        let err = Transcoder::new(program)
            .to_opus_ogg(&dir.path().join("in.mp3"), &dir.path().join("in.ogg"))
            .await
            .unwrap_err();
        match err {
            ApiError::Transcode { stderr, .. } => {
                assert!(stderr.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_transcoder_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(
            dir.path(),
            "ffmpeg",
            "for last; do :; done\necho 'banner'\nprintf 'OggS' > \"$last\"",
        );
        let output = dir.path().join("in.ogg");
        Transcoder::new(program)
            .to_opus_ogg(&dir.path().join("in.mp3"), &output)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"OggS");
    }
}
