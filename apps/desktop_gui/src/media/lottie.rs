//! Lottie support limited to what the overlay draws: the timing header of a
//! bodymovin JSON file. Layers are not rendered.

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use loader_core::{AnimationError, AnimationPlayer};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LottieHeader {
    #[serde(rename = "fr")]
    pub frame_rate: f64,
    #[serde(rename = "ip")]
    pub in_point: f64,
    #[serde(rename = "op")]
    pub out_point: f64,
    #[serde(rename = "nm", default)]
    pub name: Option<String>,
}

impl LottieHeader {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let header: Self = serde_json::from_str(raw).map_err(|err| err.to_string())?;
        if !header.frame_rate.is_finite() || header.frame_rate <= 0.0 {
            return Err(format!("invalid frame rate {}", header.frame_rate));
        }
        if header.out_point <= header.in_point {
            return Err("animation has no frames".to_string());
        }
        Ok(header)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64((self.out_point - self.in_point) / self.frame_rate)
    }
}

#[derive(Debug, Clone)]
pub struct PlayingAnimation {
    pub path: String,
    pub header: LottieHeader,
    pub looping: bool,
    pub started: Instant,
}

impl PlayingAnimation {
    /// The animation's own name, else the file stem of its path.
    pub fn label(&self) -> &str {
        self.header.name.as_deref().unwrap_or_else(|| {
            Path::new(&self.path)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(&self.path)
        })
    }

    /// Playback position in `0.0..=1.0`; one-shot animations hold the last frame.
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.header.duration().as_secs_f64();
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let ratio = if self.looping {
            (elapsed % total) / total
        } else {
            (elapsed / total).min(1.0)
        };
        ratio as f32
    }
}

/// What the overlay currently has loaded; shared with the draw code.
pub type AnimationState = Arc<Mutex<Option<PlayingAnimation>>>;

pub struct LottiePlayer {
    state: AnimationState,
}

impl LottiePlayer {
    pub fn new(state: AnimationState) -> Self {
        Self { state }
    }

    fn slot(&self) -> MutexGuard<'_, Option<PlayingAnimation>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AnimationPlayer for LottiePlayer {
    fn load(&mut self, path: &str, looping: bool) -> Result<(), AnimationError> {
        let raw = fs::read_to_string(path).map_err(|err| AnimationError::Asset {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        let header = LottieHeader::parse(&raw).map_err(|reason| AnimationError::Asset {
            path: path.to_string(),
            reason,
        })?;
        debug!(path, looping, frames = header.out_point - header.in_point, "animation loaded");

        *self.slot() = Some(PlayingAnimation {
            path: path.to_string(),
            header,
            looping,
            started: Instant::now(),
        });
        Ok(())
    }

    fn destroy(&mut self) {
        self.slot().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPINNER: &str = r#"{"v":"5.7.4","fr":30,"ip":0,"op":60,"w":120,"h":120,"nm":"spinner","layers":[]}"#;

    #[test]
    fn header_reads_timing_fields() {
        let header = LottieHeader::parse(SPINNER).expect("valid header");
        assert_eq!(header.name.as_deref(), Some("spinner"));
        assert_eq!(header.duration(), Duration::from_secs(2));
    }

    #[test]
    fn header_rejects_zero_frame_rate_and_empty_range() {
        assert!(LottieHeader::parse(r#"{"fr":0,"ip":0,"op":10}"#).is_err());
        assert!(LottieHeader::parse(r#"{"fr":30,"ip":10,"op":10}"#).is_err());
        assert!(LottieHeader::parse("not json").is_err());
    }

    #[test]
    fn one_shot_progress_holds_last_frame() {
        let started = Instant::now();
        let animation = PlayingAnimation {
            path: "check.json".into(),
            header: LottieHeader::parse(SPINNER).expect("valid header"),
            looping: false,
            started,
        };
        assert_eq!(animation.progress(started + Duration::from_secs(5)), 1.0);

        let looping = PlayingAnimation {
            looping: true,
            ..animation
        };
        let progress = looping.progress(started + Duration::from_secs(3));
        assert!((progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn label_falls_back_to_file_stem() {
        let mut animation = PlayingAnimation {
            path: "/static/lottie/success_check.json".into(),
            header: LottieHeader::parse(SPINNER).expect("valid header"),
            looping: false,
            started: Instant::now(),
        };
        assert_eq!(animation.label(), "spinner");

        animation.header.name = None;
        assert_eq!(animation.label(), "success_check");
    }

    #[test]
    fn player_loads_file_and_destroy_clears_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spinner.json");
        fs::write(&path, SPINNER).expect("write asset");
        let state = AnimationState::default();
        let mut player = LottiePlayer::new(state.clone());

        player
            .load(path.to_str().expect("utf-8 path"), true)
            .expect("load asset");
        assert!(state.lock().expect("state").as_ref().is_some_and(|a| a.looping));

        player.destroy();
        assert!(state.lock().expect("state").is_none());
    }

    #[test]
    fn missing_file_is_an_asset_error() {
        let mut player = LottiePlayer::new(AnimationState::default());
        let err = player
            .load("/nonexistent/spinner.json", true)
            .expect_err("missing file");
        assert!(matches!(err, AnimationError::Asset { .. }));
    }
}
