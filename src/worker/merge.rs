//! Result normalization: single-vs-playlist extraction results into the
//! request's flat field set.

use crate::db::CompletedFields;
use crate::extractor::{Extraction, MediaMeta};
use crate::types::{RequestId, Video};
use std::path::{Path, PathBuf};

/// Title used when a media item reports none
const UNKNOWN_TITLE: &str = "Unknown";

/// Title used when a playlist reports none
const UNKNOWN_PLAYLIST_TITLE: &str = "Unknown Playlist";

/// Derive the deterministic path of a downloaded file
///
/// Paths are a pure function of the request id, the capability's per-item
/// identifier, and its reported extension, so they can be re-derived at any
/// time without querying storage.
pub fn video_path(download_dir: &Path, request_id: RequestId, media_id: &str, ext: &str) -> PathBuf {
    download_dir.join(format!("{}_{}.{}", request_id, media_id, ext))
}

/// Normalize a raw extraction result into the fields persisted on completion
///
/// - Playlist: null entries are dropped; each remaining entry becomes a
///   [`Video`]; the request title and thumbnail come from the playlist
///   itself; `playlist_count` counts the non-null entries and
///   `downloaded_count` the videos actually produced.
/// - Single: exactly one [`Video`] from the top-level metadata, whose title
///   and thumbnail also become the request's; the playlist counts stay
///   absent.
pub fn merge_extraction(
    request_id: RequestId,
    extraction: Extraction,
    download_dir: &Path,
) -> CompletedFields {
    match extraction {
        Extraction::Single(meta) => {
            let image_url = meta.thumbnail.clone();
            let video = build_video(request_id, meta, download_dir);

            CompletedFields {
                title: video.title.clone(),
                image_url,
                videos: vec![video],
                is_playlist: false,
                playlist_count: None,
                downloaded_count: None,
            }
        }
        Extraction::Playlist(playlist) => {
            let present: Vec<MediaMeta> = playlist.entries.into_iter().flatten().collect();
            let playlist_count = present.len() as u32;

            let videos: Vec<Video> = present
                .into_iter()
                .map(|meta| build_video(request_id, meta, download_dir))
                .collect();
            let downloaded_count = videos.len() as u32;

            CompletedFields {
                title: playlist
                    .title
                    .unwrap_or_else(|| UNKNOWN_PLAYLIST_TITLE.to_string()),
                image_url: playlist.thumbnail,
                videos,
                is_playlist: true,
                playlist_count: Some(playlist_count),
                downloaded_count: Some(downloaded_count),
            }
        }
    }
}

/// Build a [`Video`] value object from one media item's metadata
fn build_video(request_id: RequestId, meta: MediaMeta, download_dir: &Path) -> Video {
    let path = video_path(download_dir, request_id, &meta.id, &meta.ext);

    Video {
        id: meta.id,
        title: meta.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        path,
        image_url: meta.thumbnail.unwrap_or_default(),
        duration: meta.duration.unwrap_or(0),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::PlaylistMeta;

    fn meta(id: &str, title: Option<&str>) -> MediaMeta {
        MediaMeta {
            id: id.to_string(),
            title: title.map(String::from),
            thumbnail: None,
            duration: None,
            ext: "mp4".to_string(),
        }
    }

    #[test]
    fn video_path_is_deterministic() {
        let dir = Path::new("/downloads");
        let first = video_path(dir, RequestId(7), "abc", "mp4");
        let second = video_path(dir, RequestId(7), "abc", "mp4");

        assert_eq!(first, PathBuf::from("/downloads/7_abc.mp4"));
        assert_eq!(first, second, "re-derivation must produce the same path");
    }

    #[test]
    fn single_video_merges_into_one_entry_with_request_metadata() {
        let extraction = Extraction::Single(MediaMeta {
            id: "abc".to_string(),
            title: Some("T".to_string()),
            thumbnail: Some("https://example.com/t.jpg".to_string()),
            duration: Some(10),
            ext: "mp4".to_string(),
        });

        let fields = merge_extraction(RequestId(1), extraction, Path::new("/downloads"));

        assert_eq!(fields.title, "T");
        assert_eq!(
            fields.image_url.as_deref(),
            Some("https://example.com/t.jpg")
        );
        assert!(!fields.is_playlist);
        assert!(fields.playlist_count.is_none());
        assert!(fields.downloaded_count.is_none());

        assert_eq!(fields.videos.len(), 1);
        let video = &fields.videos[0];
        assert_eq!(video.id, "abc");
        assert_eq!(video.title, "T");
        assert_eq!(video.path, PathBuf::from("/downloads/1_abc.mp4"));
        assert_eq!(video.duration, 10);
    }

    #[test]
    fn single_video_defaults_apply_for_missing_metadata() {
        let extraction = Extraction::Single(meta("abc", None));

        let fields = merge_extraction(RequestId(1), extraction, Path::new("/downloads"));

        assert_eq!(fields.title, "Unknown");
        assert!(fields.image_url.is_none());
        assert_eq!(fields.videos[0].title, "Unknown");
        assert_eq!(fields.videos[0].image_url, "");
        assert_eq!(fields.videos[0].duration, 0);
    }

    #[test]
    fn playlist_filters_null_entries_and_preserves_order() {
        let extraction = Extraction::Playlist(PlaylistMeta {
            title: Some("PL".to_string()),
            thumbnail: Some("https://example.com/cover.jpg".to_string()),
            entries: vec![None, Some(meta("v1", Some("A"))), Some(meta("v2", Some("B")))],
        });

        let fields = merge_extraction(RequestId(9), extraction, Path::new("/downloads"));

        assert!(fields.is_playlist);
        assert_eq!(fields.playlist_count, Some(2));
        assert_eq!(fields.downloaded_count, Some(2));
        assert_eq!(fields.title, "PL");
        assert_eq!(
            fields.image_url.as_deref(),
            Some("https://example.com/cover.jpg")
        );

        assert_eq!(fields.videos.len(), 2);
        assert_eq!(fields.videos[0].id, "v1");
        assert_eq!(fields.videos[1].id, "v2");
        assert_eq!(
            fields.videos[0].path,
            PathBuf::from("/downloads/9_v1.mp4")
        );
    }

    #[test]
    fn playlist_title_defaults_when_absent() {
        let extraction = Extraction::Playlist(PlaylistMeta {
            title: None,
            thumbnail: None,
            entries: vec![Some(meta("v1", None))],
        });

        let fields = merge_extraction(RequestId(2), extraction, Path::new("/downloads"));

        assert_eq!(fields.title, "Unknown Playlist");
        assert!(fields.image_url.is_none());
        assert_eq!(fields.videos[0].title, "Unknown");
    }

    #[test]
    fn playlist_entry_defaults_fill_thumbnail_and_duration() {
        let extraction = Extraction::Playlist(PlaylistMeta {
            title: Some("PL".to_string()),
            thumbnail: None,
            entries: vec![Some(MediaMeta {
                id: "v1".to_string(),
                title: Some("A".to_string()),
                thumbnail: None,
                duration: None,
                ext: "webm".to_string(),
            })],
        });

        let fields = merge_extraction(RequestId(3), extraction, Path::new("/downloads"));

        let video = &fields.videos[0];
        assert_eq!(video.image_url, "");
        assert_eq!(video.duration, 0);
        assert_eq!(video.path, PathBuf::from("/downloads/3_v1.webm"));
    }

    #[test]
    fn all_null_playlist_produces_zero_counts_and_no_videos() {
        let extraction = Extraction::Playlist(PlaylistMeta {
            title: Some("PL".to_string()),
            thumbnail: None,
            entries: vec![None, None],
        });

        let fields = merge_extraction(RequestId(4), extraction, Path::new("/downloads"));

        assert!(fields.videos.is_empty());
        assert_eq!(fields.playlist_count, Some(0));
        assert_eq!(fields.downloaded_count, Some(0));
    }

    #[test]
    fn extension_flows_into_the_derived_path() {
        let extraction = Extraction::Single(MediaMeta {
            id: "clip".to_string(),
            title: Some("C".to_string()),
            thumbnail: None,
            duration: Some(5),
            ext: "mkv".to_string(),
        });

        let fields = merge_extraction(RequestId(12), extraction, Path::new("/data/media"));

        assert_eq!(
            fields.videos[0].path,
            PathBuf::from("/data/media/12_clip.mkv")
        );
    }
}
