//! Seams standing in for the indicator's mount point and animation library.

use shared::markers::MountConfig;
use thiserror::Error;

use crate::animation::AnimationSlot;

/// The visible overlay: a label and an on/off state.
pub trait Indicator: Send {
    fn set_text(&mut self, text: &str);
    fn set_active(&mut self, active: bool);
}

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("animation asset '{path}' could not be loaded: {reason}")]
    Asset { path: String, reason: String },
    #[error("animation player unavailable")]
    Unavailable,
}

/// One playable animation instance at a time.
pub trait AnimationPlayer: Send {
    fn load(&mut self, path: &str, looping: bool) -> Result<(), AnimationError>;
    fn destroy(&mut self);
}

/// Everything the controller renders into. Absent mount means an inert
/// controller.
pub struct Mount {
    pub(crate) indicator: Box<dyn Indicator>,
    pub(crate) animation: AnimationSlot,
    pub(crate) config: MountConfig,
}

impl Mount {
    pub fn new(indicator: impl Indicator + 'static, config: MountConfig) -> Self {
        Self {
            indicator: Box::new(indicator),
            animation: AnimationSlot::new(None),
            config,
        }
    }

    pub fn with_player(mut self, player: impl AnimationPlayer + 'static) -> Self {
        self.animation = AnimationSlot::new(Some(Box::new(player)));
        self
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }
}
