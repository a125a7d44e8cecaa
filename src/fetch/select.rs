//! Stream filtering and ranking.

use crate::provider::StreamDescriptor;

/// Mime type of video streams in the combined container.
pub const VIDEO_MIME: &str = "video/webm";
/// Mime type of audio streams in the native audio container.
pub const AUDIO_MIME: &str = "audio/webm";
/// Codec of the native audio streams.
pub const AUDIO_CODEC: &str = "opus";

/// Whether `codec` belongs to the VP9 family (`vp9`, `vp9.2`, `vp09.02.51.10...`).
pub fn is_vp9_family(codec: &str) -> bool {
    let codec = codec.to_ascii_lowercase();
    codec == "vp9" || codec == "vp9.2" || codec.starts_with("vp09.")
}

/// Adaptive WebM video in the VP9 family.
pub fn is_dash_video(stream: &StreamDescriptor) -> bool {
    stream.mime_type == VIDEO_MIME
        && stream.adaptive
        && stream.video_codec.as_deref().is_some_and(is_vp9_family)
}

/// Adaptive WebM audio encoded with Opus.
pub fn is_dash_audio(stream: &StreamDescriptor) -> bool {
    stream.mime_type == AUDIO_MIME
        && stream.adaptive
        && stream
            .audio_codec
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(AUDIO_CODEC))
}

/// First element with the greatest key.
///
/// Equivalent to taking the head of a stable descending sort: among equal keys
/// the earliest candidate wins.
pub fn pick_best<'a, T, K, F>(candidates: impl IntoIterator<Item = &'a T>, key: F) -> Option<&'a T>
where
    T: 'a,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut best: Option<(&'a T, K)> = None;

    for candidate in candidates {
        let k = key(candidate);
        let better = match &best {
            Some((_, best_key)) => k > *best_key,
            None => true,
        };
        if better {
            best = Some((candidate, k));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Frame rate in millihertz, so 30 and 29.97 stay distinct keys.
fn fps_key(fps: Option<f64>) -> u64 {
    fps.map(|fps| (fps * 1000.0).round().max(0.0) as u64)
        .unwrap_or(0)
}

/// Best VP9 video: highest resolution, then highest frame rate.
pub fn best_video(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    pick_best(streams.iter().filter(|s| is_dash_video(s)), |s| {
        (s.resolution.unwrap_or(0), fps_key(s.fps))
    })
}

/// Best Opus audio: highest bit rate.
pub fn best_audio(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    pick_best(streams.iter().filter(|s| is_dash_audio(s)), |s| {
        s.bitrate.unwrap_or(0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, height: u32, fps: f64) -> StreamDescriptor {
        StreamDescriptor {
            format_id: id.to_string(),
            mime_type: VIDEO_MIME.to_string(),
            video_codec: Some("vp9".to_string()),
            adaptive: true,
            resolution: Some(height),
            fps: Some(fps),
            ..Default::default()
        }
    }

    fn audio(id: &str, kbps: u64) -> StreamDescriptor {
        StreamDescriptor {
            format_id: id.to_string(),
            mime_type: AUDIO_MIME.to_string(),
            audio_codec: Some("opus".to_string()),
            adaptive: true,
            bitrate: Some(kbps * 1000),
            ..Default::default()
        }
    }

    #[test]
    fn resolution_dominates_fps_breaks_ties() {
        let streams = vec![
            video("a", 720, 30.0),
            video("b", 1080, 30.0),
            video("c", 1080, 60.0),
            video("d", 480, 60.0),
        ];
        let best = best_video(&streams).unwrap();
        assert_eq!(best.format_id, "c");
    }

    #[test]
    fn fractional_frame_rate_ranks_below_whole() {
        let streams = vec![video("ntsc", 1080, 29.97), video("thirty", 1080, 30.0)];
        assert_eq!(best_video(&streams).unwrap().format_id, "thirty");

        let streams = vec![video("thirty", 1080, 30.0), video("ntsc", 1080, 29.97)];
        assert_eq!(best_video(&streams).unwrap().format_id, "thirty");
    }

    #[test]
    fn full_ties_keep_upstream_order() {
        let streams = vec![video("first", 1080, 60.0), video("second", 1080, 60.0)];
        assert_eq!(best_video(&streams).unwrap().format_id, "first");
    }

    #[test]
    fn highest_bitrate_audio() {
        let streams = vec![audio("128", 128), audio("256", 256), audio("96", 96)];
        assert_eq!(best_audio(&streams).unwrap().format_id, "256");
    }

    #[test]
    fn video_filter_rejects_non_dash() {
        let mut mp4 = video("mp4", 2160, 60.0);
        mp4.mime_type = "video/mp4".to_string();
        mp4.video_codec = Some("avc1.640033".to_string());

        let mut progressive = video("prog", 1440, 60.0);
        progressive.adaptive = false;

        let mut av1 = video("av1", 2160, 60.0);
        av1.video_codec = Some("av01.0.12M.08".to_string());

        let streams = vec![mp4, progressive, av1, video("ok", 720, 30.0)];
        assert_eq!(best_video(&streams).unwrap().format_id, "ok");
    }

    #[test]
    fn vp9_family_spellings() {
        assert!(is_vp9_family("vp9"));
        assert!(is_vp9_family("vp9.2"));
        assert!(is_vp9_family("VP9"));
        assert!(is_vp9_family("vp09.00.51.08"));
        assert!(is_vp9_family("vp09.02.51.10.01.09.16.09.00"));
        assert!(!is_vp9_family("vp8"));
        assert!(!is_vp9_family("avc1.4d401f"));
    }

    #[test]
    fn audio_filter_rejects_other_codecs() {
        let mut aac = audio("aac", 320);
        aac.mime_type = "audio/mp4".to_string();
        aac.audio_codec = Some("mp4a.40.2".to_string());

        let mut combined = audio("combined", 512);
        combined.adaptive = false;

        let streams = vec![aac, combined, audio("ok", 160)];
        assert_eq!(best_audio(&streams).unwrap().format_id, "ok");
    }

    #[test]
    fn empty_candidates() {
        assert!(best_video(&[]).is_none());
        assert!(best_audio(&[audio("a", 1)][..0]).is_none());
        assert!(pick_best(Vec::<&u32>::new(), |x: &u32| *x).is_none());
    }

    #[test]
    fn missing_metrics_rank_lowest() {
        let mut unknown = video("unknown", 0, 0.0);
        unknown.resolution = None;
        unknown.fps = None;
        let streams = vec![unknown, video("known", 144, 15.0)];
        assert_eq!(best_video(&streams).unwrap().format_id, "known");
    }
}
