use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::modules::transcode::ladder::Ladder;
use crate::modules::transcode::layout::{OutputLayout, VARIANT_PLAYLIST_NAME};

const SEGMENT_FILE_PATTERN: &str = "segment%03d.ts";

/// Fully-resolved ffmpeg invocation for one asset. Built once, consumed once
/// by the encoder, no I/O on this path. The argv grammar (filter labels,
/// `%v` substitution, `var_stream_map` pairing) is what standard HLS players
/// and the ffmpeg HLS muxer agree on, so it is reproduced verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJobSpec {
    pub input_path: PathBuf,
    pub filter_complex: String,
    pub variant_args: Vec<String>,
    pub segment_pattern: String,
    pub variant_playlist_pattern: String,
    pub stream_map: String,
    pub master_playlist_name: String,
    pub segment_seconds: u32,
}

impl TranscodeJobSpec {
    pub fn build(
        input_path: &Path,
        layout: &OutputLayout,
        ladder: &Ladder,
        segment_seconds: u32,
    ) -> Result<Self> {
        if ladder.is_empty() {
            bail!("cannot build a transcode job from an empty ladder");
        }
        if ladder.len() != layout.variant_dirs.len() {
            bail!(
                "ladder has {} renditions but layout has {} variant dirs",
                ladder.len(),
                layout.variant_dirs.len()
            );
        }

        Ok(Self {
            input_path: input_path.to_path_buf(),
            filter_complex: build_filter_complex(ladder),
            variant_args: build_variant_args(ladder),
            segment_pattern: pattern_path(&layout.root_dir, SEGMENT_FILE_PATTERN),
            variant_playlist_pattern: pattern_path(&layout.root_dir, VARIANT_PLAYLIST_NAME),
            stream_map: build_stream_map(ladder.len()),
            master_playlist_name: crate::modules::transcode::layout::MASTER_PLAYLIST_NAME
                .to_string(),
            segment_seconds,
        })
    }

    /// Flattens the spec into the exact ffmpeg argv order: input, filter
    /// graph, per-variant mappings, then the HLS muxer block with the
    /// variant playlist pattern as the trailing output.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-y".into(),
            "-i".into(),
            self.input_path.to_string_lossy().into_owned(),
            "-filter_complex".into(),
            self.filter_complex.clone(),
        ];
        args.extend(self.variant_args.iter().cloned());
        args.extend([
            "-f".into(),
            "hls".into(),
            "-hls_time".into(),
            self.segment_seconds.to_string(),
            "-hls_playlist_type".into(),
            "vod".into(),
            "-hls_list_size".into(),
            "0".into(),
            "-hls_flags".into(),
            "independent_segments".into(),
            "-hls_segment_filename".into(),
            self.segment_pattern.clone(),
            "-master_pl_name".into(),
            self.master_playlist_name.clone(),
            "-var_stream_map".into(),
            self.stream_map.clone(),
            self.variant_playlist_pattern.clone(),
        ]);
        args
    }
}

/// `[0:v]split=N[v0in]..[vN-1in];[v0in]scale=W:H[v0out];..`
fn build_filter_complex(ladder: &Ladder) -> String {
    let n = ladder.len();
    let in_labels: String = (0..n).map(|i| format!("[v{i}in]")).collect();
    let mut parts = vec![format!("[0:v]split={n}{in_labels}")];
    for (i, r) in ladder.iter().enumerate() {
        parts.push(format!("[v{i}in]scale={}:{}[v{i}out]", r.width, r.height));
    }
    parts.join(";")
}

/// Per-variant mapping block. Every rendition gets its own audio encode of
/// the one input audio stream so each variant is self-contained.
fn build_variant_args(ladder: &Ladder) -> Vec<String> {
    let mut args = Vec::with_capacity(ladder.len() * 12);
    for (i, r) in ladder.iter().enumerate() {
        args.extend([
            "-map".into(),
            format!("[v{i}out]"),
            format!("-b:v:{i}"),
            r.video_bitrate.clone(),
            format!("-c:v:{i}"),
            "libx264".into(),
            "-map".into(),
            "0:a:0".into(),
            format!("-b:a:{i}"),
            r.audio_bitrate.clone(),
            format!("-c:a:{i}"),
            "aac".into(),
        ]);
    }
    args
}

/// `v:0,a:0 v:1,a:1 ..` — tells the HLS muxer which encoded streams form
/// variant `i`, so the master playlist groups them.
fn build_stream_map(n: usize) -> String {
    (0..n)
        .map(|i| format!("v:{i},a:{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<root>/v%v/<name>` — `%v` is substituted by ffmpeg with the variant
/// index, matching the layout's `v{i}` directories.
fn pattern_path(root_dir: &Path, name: &str) -> String {
    root_dir
        .join("v%v")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::transcode::ladder::Rendition;
    use uuid::Uuid;

    fn layout_for(ladder: &Ladder) -> OutputLayout {
        OutputLayout::plan(Path::new("/srv/hls"), Uuid::nil(), ladder.len())
    }

    #[test]
    fn filter_graph_splits_and_scales_per_rendition() {
        let ladder = Ladder::default();
        let spec = TranscodeJobSpec::build(
            Path::new("/srv/raw/in.mp4"),
            &layout_for(&ladder),
            &ladder,
            6,
        )
        .unwrap();
        assert!(spec.filter_complex.starts_with("[0:v]split=4[v0in][v1in][v2in][v3in]"));
        assert!(spec.filter_complex.contains("[v0in]scale=640:360[v0out]"));
        assert!(spec.filter_complex.contains("[v3in]scale=1920:1080[v3out]"));
    }

    #[test]
    fn stream_map_pairs_are_index_aligned_for_any_ladder_size() {
        for n in 1..=4 {
            let renditions = (0..n)
                .map(|i| Rendition::new(640, 360 + i, "800k", "96k"))
                .collect();
            let ladder = Ladder::new(renditions).unwrap();
            let spec = TranscodeJobSpec::build(
                Path::new("/srv/raw/in.mp4"),
                &layout_for(&ladder),
                &ladder,
                6,
            )
            .unwrap();
            let pairs: Vec<&str> = spec.stream_map.split(' ').collect();
            assert_eq!(pairs.len(), n as usize);
            for (i, pair) in pairs.iter().enumerate() {
                assert_eq!(*pair, format!("v:{i},a:{i}"));
            }
            // one -map per video plus one per audio
            let maps = spec.variant_args.iter().filter(|a| *a == "-map").count();
            assert_eq!(maps, 2 * n as usize);
        }
    }

    #[test]
    fn argv_reproduces_the_hls_muxer_contract() {
        let ladder = Ladder::default();
        let layout = layout_for(&ladder);
        let spec =
            TranscodeJobSpec::build(Path::new("/srv/raw/in.mp4"), &layout, &ladder, 6).unwrap();
        let args = spec.to_args();

        assert_eq!(args[0], "-hide_banner");
        assert_eq!(args[1], "-y");
        assert_eq!(&args[2..4], &["-i".to_string(), "/srv/raw/in.mp4".to_string()]);

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-hls_time") + 1], "6");
        assert_eq!(args[pos("-hls_playlist_type") + 1], "vod");
        assert_eq!(args[pos("-hls_list_size") + 1], "0");
        assert_eq!(args[pos("-hls_flags") + 1], "independent_segments");
        assert_eq!(args[pos("-master_pl_name") + 1], "master.m3u8");
        assert!(args[pos("-hls_segment_filename") + 1].ends_with("v%v/segment%03d.ts"));
        assert_eq!(
            args[pos("-var_stream_map") + 1],
            "v:0,a:0 v:1,a:1 v:2,a:2 v:3,a:3"
        );
        // the variant playlist pattern is the trailing output argument
        assert!(args.last().unwrap().ends_with("v%v/playlist.m3u8"));

        // per-variant codec and bitrate args are index-tagged
        assert!(args.contains(&"-b:v:0".to_string()));
        assert!(args.contains(&"-c:v:3".to_string()));
        assert!(args.contains(&"-b:a:2".to_string()));
    }

    #[test]
    fn mismatched_layout_is_rejected_before_invocation() {
        let ladder = Ladder::default();
        let short = OutputLayout::plan(Path::new("/srv/hls"), Uuid::nil(), 2);
        assert!(TranscodeJobSpec::build(Path::new("/in.mp4"), &short, &ladder, 6).is_err());
    }
}
