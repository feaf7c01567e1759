//! CLI-based extractor using the external yt-dlp binary

use super::{Extraction, MediaExtractor, MediaMeta, PlaylistMeta};
use crate::error::{Error, Result};
use crate::types::RequestId;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::process::Command;

/// Fallback extension when yt-dlp reports none for an item
const DEFAULT_EXT: &str = "mp4";

/// CLI-based extractor using the external yt-dlp binary
///
/// Runs yt-dlp with `--dump-single-json` in download mode, so a single
/// invocation both materializes the files and returns the metadata payload.
/// The output template pins downloads to
/// `<download_dir>/<request_id>_<media_id>.<ext>`, which lets callers
/// re-derive file paths without querying storage.
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::{MediaExtractor, YtDlpExtractor};
/// use media_dl::RequestId;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let extractor = YtDlpExtractor::new(
///     PathBuf::from("/usr/bin/yt-dlp"),
///     PathBuf::from("./downloads"),
///     "b".to_string(),
/// );
///
/// // Or auto-discover from PATH
/// let extractor = YtDlpExtractor::from_path(PathBuf::from("./downloads"), "b".to_string())
///     .expect("yt-dlp not found in PATH");
///
/// let result = extractor
///     .extract("https://example.com/watch?v=abc", RequestId(1))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct YtDlpExtractor {
    binary_path: PathBuf,
    download_dir: PathBuf,
    format: String,
}

impl YtDlpExtractor {
    /// Create a new extractor with an explicit binary path
    pub fn new(binary_path: PathBuf, download_dir: PathBuf, format: String) -> Self {
        Self {
            binary_path,
            download_dir,
            format,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Uses the `which` crate to search for the `yt-dlp` binary in the
    /// system PATH.
    ///
    /// # Returns
    ///
    /// `Some(YtDlpExtractor)` if the binary is found, `None` otherwise.
    pub fn from_path(download_dir: PathBuf, format: String) -> Option<Self> {
        which::which("yt-dlp")
            .ok()
            .map(|path| Self::new(path, download_dir, format))
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(&self, url: &str, request_id: RequestId) -> Result<Extraction> {
        let template = format!(
            "{}/{}_%(id)s.%(ext)s",
            self.download_dir.display(),
            request_id
        );

        let output = Command::new(&self.binary_path)
            .arg("--no-simulate") // download alongside the JSON dump
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg("-f")
            .arg(&self.format)
            .arg("-o")
            .arg(&template)
            .arg(url)
            .output()
            .await
            .map_err(|e| {
                Error::Extraction(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let payload: YtDlpPayload = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::Extraction(format!("unparseable yt-dlp output: {}", e)))?;

        payload_to_extraction(payload)
    }

    fn name(&self) -> &str {
        "yt-dlp"
    }
}

/// Subset of yt-dlp's `--dump-single-json` payload this crate reads
///
/// Playlists nest the same shape one level deep under `entries`, with null
/// slots for unavailable members.
#[derive(Debug, Deserialize)]
struct YtDlpPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    entries: Option<Vec<Option<YtDlpPayload>>>,
}

/// Convert the raw JSON payload into the tagged [`Extraction`] variant
///
/// The playlist case is chosen exactly when the payload exposes an `entries`
/// list. Entries without a media id cannot have produced a file and are
/// treated as absent.
fn payload_to_extraction(payload: YtDlpPayload) -> Result<Extraction> {
    if let Some(entries) = payload.entries {
        return Ok(Extraction::Playlist(PlaylistMeta {
            title: payload.title,
            thumbnail: payload.thumbnail,
            entries: entries
                .into_iter()
                .map(|entry| entry.and_then(entry_meta))
                .collect(),
        }));
    }

    let meta = entry_meta(payload)
        .ok_or_else(|| Error::Extraction("missing media id in yt-dlp output".to_string()))?;
    Ok(Extraction::Single(meta))
}

fn entry_meta(payload: YtDlpPayload) -> Option<MediaMeta> {
    let id = payload.id?;
    Some(MediaMeta {
        id,
        title: payload.title,
        thumbnail: payload.thumbnail,
        duration: payload.duration.map(|d| d.round() as u32),
        ext: payload.ext.unwrap_or_else(|| DEFAULT_EXT.to_string()),
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> YtDlpPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn single_video_payload_becomes_single_extraction() {
        let payload = parse(
            r#"{
                "id": "abc",
                "title": "T",
                "thumbnail": "https://example.com/t.jpg",
                "duration": 10.0,
                "ext": "mp4"
            }"#,
        );

        let extraction = payload_to_extraction(payload).unwrap();
        assert_eq!(
            extraction,
            Extraction::Single(MediaMeta {
                id: "abc".to_string(),
                title: Some("T".to_string()),
                thumbnail: Some("https://example.com/t.jpg".to_string()),
                duration: Some(10),
                ext: "mp4".to_string(),
            })
        );
    }

    #[test]
    fn payload_with_entries_becomes_playlist_even_when_empty() {
        let payload = parse(r#"{"title": "PL", "entries": []}"#);

        match payload_to_extraction(payload).unwrap() {
            Extraction::Playlist(playlist) => {
                assert_eq!(playlist.title.as_deref(), Some("PL"));
                assert!(playlist.entries.is_empty());
            }
            other => panic!("expected playlist, got {:?}", other),
        }
    }

    #[test]
    fn null_playlist_entries_are_preserved_as_absent() {
        let payload = parse(
            r#"{
                "title": "PL",
                "entries": [null, {"id": "v1", "title": "A", "ext": "mp4"}]
            }"#,
        );

        match payload_to_extraction(payload).unwrap() {
            Extraction::Playlist(playlist) => {
                assert_eq!(playlist.entries.len(), 2);
                assert!(playlist.entries[0].is_none());
                assert_eq!(playlist.entries[1].as_ref().unwrap().id, "v1");
            }
            other => panic!("expected playlist, got {:?}", other),
        }
    }

    #[test]
    fn entry_without_id_is_treated_as_absent() {
        let payload = parse(
            r#"{
                "title": "PL",
                "entries": [{"title": "no id here"}]
            }"#,
        );

        match payload_to_extraction(payload).unwrap() {
            Extraction::Playlist(playlist) => {
                assert!(
                    playlist.entries[0].is_none(),
                    "an entry without a media id cannot have produced a file"
                );
            }
            other => panic!("expected playlist, got {:?}", other),
        }
    }

    #[test]
    fn single_payload_without_id_is_an_extraction_error() {
        let payload = parse(r#"{"title": "T"}"#);

        let err = payload_to_extraction(payload).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn missing_ext_defaults_to_mp4() {
        let payload = parse(r#"{"id": "abc", "title": "T"}"#);

        match payload_to_extraction(payload).unwrap() {
            Extraction::Single(meta) => assert_eq!(meta.ext, "mp4"),
            other => panic!("expected single, got {:?}", other),
        }
    }

    #[test]
    fn fractional_durations_round_to_whole_seconds() {
        let payload = parse(r#"{"id": "abc", "duration": 127.6}"#);

        match payload_to_extraction(payload).unwrap() {
            Extraction::Single(meta) => assert_eq!(meta.duration, Some(128)),
            other => panic!("expected single, got {:?}", other),
        }
    }
}
