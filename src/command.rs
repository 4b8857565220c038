//! Builds yt-dlp argument lists from download requests
//!
//! Flag order is part of the contract with the external tool and must not be
//! reshuffled: mode/format flags first, optional toggles next, URL last.

use crate::model::{AudioRequest, VideoRequest};

/// Trims surrounding whitespace and rejects empty input.
pub fn normalize_url(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Argument list for an audio extraction run.
pub fn audio_args(req: &AudioRequest) -> Vec<String> {
    let mut args = vec![
        "-x".to_owned(),
        "--audio-format".to_owned(),
        req.format.flag_value().to_owned(),
        "--audio-quality".to_owned(),
        req.quality.to_string(),
    ];

    if req.add_metadata {
        args.push("--add-metadata".to_owned());
    }
    if req.embed_thumbnail {
        args.push("--embed-thumbnail".to_owned());
    }

    args.push(req.url.clone());
    args
}

/// Argument list for a video download run.
pub fn video_args(req: &VideoRequest) -> Vec<String> {
    let mut args = Vec::new();

    // No -f for the Best sentinel; the tool's own default picks the stream.
    if let Some(height) = req.resolution.height() {
        args.push("-f".to_owned());
        args.push(format_selector(height));
    }

    args.push("--merge-output-format".to_owned());
    args.push(req.container.flag_value().to_owned());

    if req.subtitles {
        args.push("--write-auto-sub".to_owned());
        args.push("--sub-lang".to_owned());
        args.push("en".to_owned());
        args.push("--embed-subs".to_owned());
    }
    if req.add_metadata {
        args.push("--add-metadata".to_owned());
    }
    if req.embed_thumbnail {
        args.push("--embed-thumbnail".to_owned());
    }

    args.push(req.url.clone());
    args
}

/// Format-selection expression capping video height, with a combined-stream
/// fallback for sources that don't offer separate video and audio.
fn format_selector(height: u32) -> String {
    format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AudioFormat, Container, Resolution};

    fn audio_request() -> AudioRequest {
        AudioRequest {
            url: "https://example.com/watch?v=abc123".to_owned(),
            format: AudioFormat::Mp3,
            quality: 0,
            add_metadata: true,
            embed_thumbnail: true,
        }
    }

    fn video_request() -> VideoRequest {
        VideoRequest {
            url: "https://example.com/watch?v=abc123".to_owned(),
            resolution: Resolution::Fhd1080,
            container: Container::Mp4,
            subtitles: false,
            add_metadata: true,
            embed_thumbnail: true,
        }
    }

    #[test]
    fn audio_args_keep_fixed_order_with_url_last() {
        let req = audio_request();
        let args = audio_args(&req);
        assert_eq!(
            args,
            vec![
                "-x",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "0",
                "--add-metadata",
                "--embed-thumbnail",
                "https://example.com/watch?v=abc123",
            ]
        );
    }

    #[test]
    fn audio_toggles_are_omitted_when_unset() {
        let mut req = audio_request();
        req.add_metadata = false;
        req.embed_thumbnail = false;
        let args = audio_args(&req);
        assert!(!args.contains(&"--add-metadata".to_owned()));
        assert!(!args.contains(&"--embed-thumbnail".to_owned()));
        assert_eq!(args.last().unwrap(), &req.url);
    }

    #[test]
    fn audio_quality_is_a_bare_integer() {
        let mut req = audio_request();
        req.quality = 7;
        let args = audio_args(&req);
        let pos = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[pos + 1], "7");
    }

    #[test]
    fn video_resolution_embeds_bare_height() {
        let args = video_args(&video_request());
        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "bestvideo[height<=1080]+bestaudio/best[height<=1080]");
    }

    #[test]
    fn video_best_omits_format_selection() {
        let mut req = video_request();
        req.resolution = Resolution::Best;
        let args = video_args(&req);
        assert!(!args.contains(&"-f".to_owned()));
        assert_eq!(args[0], "--merge-output-format");
        assert_eq!(args[1], "mp4");
    }

    #[test]
    fn video_subtitle_flags_form_one_group() {
        let mut req = video_request();
        req.subtitles = true;
        req.container = Container::Mkv;
        let args = video_args(&req);
        let pos = args.iter().position(|a| a == "--write-auto-sub").unwrap();
        assert_eq!(&args[pos..pos + 4], &["--write-auto-sub", "--sub-lang", "en", "--embed-subs"]);
        // Subtitle group sits between the container value and the toggles.
        assert_eq!(args[pos - 1], "mkv");
        assert_eq!(args[pos + 4], "--add-metadata");
    }

    #[test]
    fn video_url_is_always_last() {
        for resolution in Resolution::ALL {
            let mut req = video_request();
            req.resolution = resolution;
            let args = video_args(&req);
            assert_eq!(args.last().unwrap(), &req.url);
        }
    }

    #[test]
    fn normalize_url_trims_and_rejects_blank() {
        assert_eq!(normalize_url("  https://a  "), Some("https://a"));
        assert_eq!(normalize_url(""), None);
        assert_eq!(normalize_url("   \t "), None);
    }
}
