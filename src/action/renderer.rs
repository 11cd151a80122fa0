use crate::action::node::{Animation, PlayConfig};
use crate::foundation::error::StagehandResult;
use crate::scene::object::EntityRef;

/// Scene-rendering host driven by a [`crate::Director`].
///
/// The director only calls these three operations. Every call happens on the
/// director's thread, in script order.
pub trait Renderer {
    /// Play an animation with the given options.
    fn play(&mut self, animation: Animation, config: &PlayConfig) -> StagehandResult<()>;

    /// Pause for `duration` seconds.
    fn wait(&mut self, duration: f64) -> StagehandResult<()>;

    /// Add an entity to the scene without animation.
    fn add(&mut self, entity: EntityRef) -> StagehandResult<()>;
}

/// One call received by a [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    /// `play(animation, config)`.
    Play {
        /// Played animation.
        animation: Animation,
        /// Options it was played with.
        config: PlayConfig,
    },
    /// `wait(duration)`.
    Wait(f64),
    /// `add(entity)`, recorded by entity name.
    Add(String),
}

impl RenderCall {
    /// JSON description for logs and the CLI.
    pub fn describe(&self) -> serde_json::Value {
        match self {
            Self::Play { animation, config } => serde_json::json!({
                "play": animation.describe(),
                "config": config,
            }),
            Self::Wait(duration) => serde_json::json!({ "wait": duration }),
            Self::Add(name) => serde_json::json!({ "add": name }),
        }
    }
}

/// In-memory renderer that records every call.
///
/// Built with [`RecordingRenderer::finishing`], it also applies each played animation's end
/// state, so entity geometry after playback matches what a real renderer would leave.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    finish: bool,
}

impl RecordingRenderer {
    /// Record calls only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls and apply end states of played animations.
    pub fn finishing() -> Self {
        Self {
            calls: Vec::new(),
            finish: true,
        }
    }

    /// Recorded calls in arrival order.
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Drain recorded calls.
    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Renderer for RecordingRenderer {
    fn play(&mut self, animation: Animation, config: &PlayConfig) -> StagehandResult<()> {
        if self.finish {
            animation.finish();
        }
        self.calls.push(RenderCall::Play {
            animation,
            config: config.clone(),
        });
        Ok(())
    }

    fn wait(&mut self, duration: f64) -> StagehandResult<()> {
        self.calls.push(RenderCall::Wait(duration));
        Ok(())
    }

    fn add(&mut self, entity: EntityRef) -> StagehandResult<()> {
        let name = entity.borrow().name().to_owned();
        self.calls.push(RenderCall::Add(name));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/action/renderer.rs"]
mod tests;
