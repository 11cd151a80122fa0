//! `stagehand` interprets two JSON documents against an animation renderer.
//!
//! An *object-spec* document declares named scene objects (text, shapes, groups, user kinds)
//! together with post-construction directives. An *action script* sequences, groups and times
//! animations over those objects. The crate builds the objects into a [`Registry`], compiles
//! scripts into [`ActionNode`]s and plays them through a [`Renderer`]; drawing and timing are
//! left to the renderer.
//!
//! ```no_run
//! use stagehand::{Director, RecordingRenderer, load_objects};
//!
//! # fn main() -> stagehand::StagehandResult<()> {
//! let registry = load_objects("objects.json".as_ref())?;
//! let mut director = Director::new(&registry);
//! director.load_actions("actions.json".as_ref())?;
//! director.set_target(RecordingRenderer::new())?;
//! director.play()?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub(crate) mod action;
pub(crate) mod expression;
pub(crate) mod foundation;
pub(crate) mod scene;

pub use action::director::{Director, DirectorOpts, Scene, Warning};
pub use action::node::{
    ActionNode, Animation, ControlPolicy, MethodArg, MethodBatch, MethodCall, PlayConfig, Proxy,
    ProxyMethod, TransitionKind, animate,
};
pub use action::renderer::{RecordingRenderer, RenderCall, Renderer};
pub use action::table::action_names;
pub use expression::{
    EXPRESSION_MARKER, ExprError, Program, REFERENCE_MARKER, Scope, Value, evaluate,
};
pub use foundation::core::{DOWN, LEFT, ORIGIN, Point, RIGHT, UP, Vec2};
pub use foundation::error::{Cause, StagehandError, StagehandResult};
pub use foundation::ident::{Identifier, normalize};
pub use scene::attributes::{AttributeDirective, INDEX_PLACEHOLDER};
pub use scene::kinds::{BuiltinKind, NAMESPACE_SEPARATOR, UserConstructor, ValueRule};
pub use scene::loader::{load_objects, load_objects_into, parse_document, read_document};
pub use scene::object::{EntityKind, EntityRef, Properties, SceneObject, Updater, share};
pub use scene::registry::{Binding, Registry};
