use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// One output rendition. Bitrates are kept as ffmpeg-style tokens ("800k")
/// since they pass straight through to the encoder argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
    pub video_bitrate: String,
    pub audio_bitrate: String,
}

/// Ordered rendition table. Index 0 is the lowest quality; the index doubles
/// as the variant directory number and the stream-map position, so order is
/// load-bearing everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ladder {
    renditions: Vec<Rendition>,
}

impl Default for Ladder {
    fn default() -> Self {
        Self {
            renditions: vec![
                Rendition::new(640, 360, "800k", "96k"),
                Rendition::new(842, 480, "1400k", "128k"),
                Rendition::new(1280, 720, "2800k", "128k"),
                Rendition::new(1920, 1080, "5000k", "192k"),
            ],
        }
    }
}

impl Rendition {
    pub fn new(width: u32, height: u32, video_bitrate: &str, audio_bitrate: &str) -> Self {
        Self {
            width,
            height,
            video_bitrate: video_bitrate.to_string(),
            audio_bitrate: audio_bitrate.to_string(),
        }
    }
}

impl Ladder {
    pub fn new(renditions: Vec<Rendition>) -> Result<Self> {
        if renditions.is_empty() {
            bail!("ladder must contain at least one rendition");
        }
        for (i, r) in renditions.iter().enumerate() {
            if r.width == 0 || r.height == 0 {
                bail!("rendition {i} has non-positive dimensions");
            }
        }
        Ok(Self { renditions })
    }

    /// Parses the compact env form: `640x360@800k/96k,1280x720@2800k/128k`.
    /// The audio bitrate may be omitted (`/96k` part), defaulting to 128k.
    pub fn from_spec(spec: &str) -> Result<Self> {
        let mut renditions = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (dims, rates) = part
                .split_once('@')
                .ok_or_else(|| anyhow!("rendition '{part}' is missing '@'"))?;
            let (w, h) = dims
                .split_once('x')
                .ok_or_else(|| anyhow!("rendition '{part}' is missing 'WxH'"))?;
            let width: u32 = w.parse().map_err(|_| anyhow!("bad width in '{part}'"))?;
            let height: u32 = h.parse().map_err(|_| anyhow!("bad height in '{part}'"))?;
            let (vb, ab) = match rates.split_once('/') {
                Some((vb, ab)) => (vb, ab),
                None => (rates, "128k"),
            };
            if !is_bitrate_token(vb) || !is_bitrate_token(ab) {
                bail!("bad bitrate in '{part}'");
            }
            renditions.push(Rendition::new(width, height, vb, ab));
        }
        Self::new(renditions)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let renditions: Vec<Rendition> = serde_json::from_str(contents)?;
        Self::new(renditions)
    }

    pub fn len(&self) -> usize {
        self.renditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rendition> {
        self.renditions.iter()
    }
}

fn is_bitrate_token(token: &str) -> bool {
    let digits = token.strip_suffix(['k', 'K', 'm', 'M']).unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
