use tracing::{debug, warn};

use crate::indicator::AnimationPlayer;

/// Keeps at most one loaded animation and skips reloading the same asset.
pub struct AnimationSlot {
    player: Option<Box<dyn AnimationPlayer>>,
    current_path: Option<String>,
}

impl AnimationSlot {
    pub fn new(player: Option<Box<dyn AnimationPlayer>>) -> Self {
        Self {
            player,
            current_path: None,
        }
    }

    /// Plays `path`, replacing whatever was loaded before. Without a player or
    /// a path this does nothing; the indicator still toggles without a graphic.
    pub fn play(&mut self, path: Option<&str>, looping: bool) {
        let (Some(player), Some(path)) = (self.player.as_mut(), path) else {
            return;
        };

        if self.current_path.as_deref() == Some(path) {
            return;
        }

        if self.current_path.take().is_some() {
            player.destroy();
        }

        match player.load(path, looping) {
            Ok(()) => {
                debug!(path, looping, "loaded loader animation");
                self.current_path = Some(path.to_owned());
            }
            Err(error) => warn!(path, %error, "loader animation unavailable"),
        }
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
