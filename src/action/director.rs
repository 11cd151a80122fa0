use std::fmt;
use std::path::Path;

use crate::action::descriptor::{Descriptor, invalid_config};
use crate::action::node::{
    ActionNode, Animation, MethodCall, PlayConfig, ProxyMethod, TransitionKind, animate,
};
use crate::action::renderer::{RecordingRenderer, Renderer};
use crate::action::table::{Arity, ControlKind, Tag};
use crate::expression::{EXPRESSION_MARKER, ExprError, REFERENCE_MARKER, Value};
use crate::foundation::error::{StagehandError, StagehandResult};
use crate::foundation::ident::normalize;
use crate::scene::loader::{parse_document, read_document};
use crate::scene::object::{EntityRef, Properties};
use crate::scene::registry::{BareStrings, Registry};

/// Placeholder replaced by each parameter of a `select` action.
const SELECTION_PLACEHOLDER: &str = "{}";

const LEAF_KEYS: &[&str] = &["action", "target", "params", "properties"];
const CONTROL_KEYS: &[&str] = &["action", "params", "properties", "async"];
const SELECTION_KEYS: &[&str] = &["action", "target", "params", "properties"];
const ADD_KEYS: &[&str] = &["action", "target"];

/// Options for a [`Director`].
#[derive(Clone, Debug, Default)]
pub struct DirectorOpts {
    /// Turn every warning into an execution error.
    pub deny_warnings: bool,
}

/// A non-fatal finding about a script.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Warning {
    /// Action the warning was raised for.
    pub action: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (action `{}`)", self.message, self.action)
    }
}

/// A named, ordered list of action descriptors.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Scene {
    /// Scene name (key in the action-script document).
    pub name: String,
    /// Raw descriptors in document order.
    pub actions: Vec<serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Nesting {
    TopLevel,
    InControl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Defer,
    Materialize,
}

/// Compiles action scripts against a built [`Registry`] and plays them on a [`Renderer`].
///
/// [`Director::compile`] and [`Director::play`] run the same interpreter; the only difference
/// is whether each compiled node is handed to the renderer right away. A descriptor is
/// therefore accepted or rejected identically by both.
#[derive(Debug)]
pub struct Director<'r, R: Renderer = RecordingRenderer> {
    registry: &'r Registry,
    opts: DirectorOpts,
    scenes: Vec<Scene>,
    target: Option<R>,
    warnings: Vec<Warning>,
}

impl<'r, R: Renderer> Director<'r, R> {
    /// A director with default options over a built registry.
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_opts(registry, DirectorOpts::default())
    }

    /// A director with explicit options.
    pub fn with_opts(registry: &'r Registry, opts: DirectorOpts) -> Self {
        Self {
            registry,
            opts,
            scenes: Vec::new(),
            target: None,
            warnings: Vec::new(),
        }
    }

    /// Bind the renderer. A director is bound at most once.
    pub fn set_target(&mut self, target: R) -> StagehandResult<()> {
        if self.target.is_some() {
            return Err(StagehandError::execution("renderer is already set"));
        }
        self.target = Some(target);
        Ok(())
    }

    /// Bound renderer, if any.
    pub fn target(&self) -> Option<&R> {
        self.target.as_ref()
    }

    /// Bound renderer, if any.
    pub fn target_mut(&mut self) -> Option<&mut R> {
        self.target.as_mut()
    }

    /// Give the bound renderer back.
    pub fn into_target(self) -> Option<R> {
        self.target
    }

    /// Loaded scenes in document order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Load an action-script document from disk.
    pub fn load_actions(&mut self, path: &Path) -> StagehandResult<()> {
        let doc = read_document(path)?;
        self.load_actions_value(&doc)
    }

    /// Load an action-script document from text.
    pub fn load_actions_str(&mut self, text: &str) -> StagehandResult<()> {
        let doc = parse_document(text)?;
        self.load_actions_value(&doc)
    }

    /// Load an already decoded action-script document: a mapping from scene name to a list
    /// of descriptors. Scenes are appended in document order.
    pub fn load_actions_value(&mut self, doc: &serde_json::Value) -> StagehandResult<()> {
        let map = doc
            .as_object()
            .ok_or_else(|| StagehandError::load("an action script must be a mapping"))?;
        for (name, actions) in map {
            let actions = actions.as_array().ok_or_else(|| {
                StagehandError::load(format!("scene `{name}` must be a list of actions"))
            })?;
            if self.scenes.iter().any(|s| &s.name == name) {
                return Err(StagehandError::load(format!(
                    "scene `{name}` is already loaded"
                )));
            }
            self.scenes.push(Scene {
                name: name.clone(),
                actions: actions.clone(),
            });
        }
        tracing::debug!(scenes = self.scenes.len(), "loaded action script");
        Ok(())
    }

    /// Compile descriptors into nodes without touching the renderer.
    #[tracing::instrument(skip(self, descriptors), fields(descriptors = descriptors.len()))]
    pub fn compile(&mut self, descriptors: &[serde_json::Value]) -> StagehandResult<Vec<ActionNode>> {
        self.interpret(descriptors, Nesting::TopLevel, Mode::Defer)
    }

    /// Compile one loaded scene without touching the renderer.
    pub fn compile_scene(&mut self, name: &str) -> StagehandResult<Vec<ActionNode>> {
        let actions = self.scene_actions(name)?;
        self.compile(&actions)
    }

    /// Play every loaded scene in order.
    #[tracing::instrument(skip(self), fields(scenes = self.scenes.len()))]
    pub fn play(&mut self) -> StagehandResult<()> {
        self.ensure_target()?;
        let scenes = self.scenes.clone();
        for scene in &scenes {
            tracing::debug!(scene = %scene.name, "playing scene");
            self.interpret(&scene.actions, Nesting::TopLevel, Mode::Materialize)?;
        }
        Ok(())
    }

    /// Play one loaded scene.
    #[tracing::instrument(skip(self))]
    pub fn play_scene(&mut self, name: &str) -> StagehandResult<()> {
        self.ensure_target()?;
        let actions = self.scene_actions(name)?;
        self.interpret(&actions, Nesting::TopLevel, Mode::Materialize)?;
        Ok(())
    }

    fn scene_actions(&self, name: &str) -> StagehandResult<Vec<serde_json::Value>> {
        self.scenes
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.actions.clone())
            .ok_or_else(|| StagehandError::execution(format!("cannot find scene `{name}`")))
    }

    fn ensure_target(&self) -> StagehandResult<()> {
        if self.target.is_none() {
            return Err(StagehandError::execution("renderer has not been set"));
        }
        Ok(())
    }

    fn interpret(
        &mut self,
        descriptors: &[serde_json::Value],
        nesting: Nesting,
        mode: Mode,
    ) -> StagehandResult<Vec<ActionNode>> {
        let mut out = Vec::with_capacity(descriptors.len());
        for raw in descriptors {
            let d = Descriptor::dispatch(raw)?;
            tracing::debug!(action = d.name(), ?nesting, ?mode, "dispatch");
            if d.spec.tag == Tag::Selection {
                let expanded = self.expand_selection(&d)?;
                out.extend(self.interpret(&expanded, nesting, mode)?);
                continue;
            }
            let node = self.build(&d, nesting)?;
            if mode == Mode::Materialize {
                self.materialize(&node)?;
            }
            out.push(node);
        }
        Ok(out)
    }

    fn build(&mut self, d: &Descriptor<'_>, nesting: Nesting) -> StagehandResult<ActionNode> {
        match d.spec.tag {
            Tag::Wait => wait(d),
            Tag::Add => self.add(d, nesting),
            Tag::Control(kind) => self.control(d, kind),
            Tag::Method(method) => self.method(d, method),
            Tag::Simple(kind) => self.simple(d, kind),
            Tag::Selection => Err(StagehandError::execution(
                "action `select` cannot be built as a single node",
            )),
        }
    }

    fn materialize(&mut self, node: &ActionNode) -> StagehandResult<()> {
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| StagehandError::execution("renderer has not been set"))?;
        match node {
            ActionNode::Wait { duration } => target.wait(*duration),
            ActionNode::Add { entity, .. } => target.add(entity.clone()),
            other => target.play(other.animation()?, &other.config()),
        }
    }

    fn warn(&mut self, action: &str, message: String) -> StagehandResult<()> {
        tracing::warn!(action, "{message}");
        if self.opts.deny_warnings {
            return Err(StagehandError::execution(format!(
                "{message} (action `{action}`, warnings are denied)"
            )));
        }
        self.warnings.push(Warning {
            action: action.to_owned(),
            message,
        });
        Ok(())
    }

    fn lookup(&self, target: &str) -> StagehandResult<(String, EntityRef)> {
        let name = normalize(target)?;
        let entity = self.registry.entity(&name)?;
        Ok((name, entity))
    }

    fn check_arity(&mut self, d: &Descriptor<'_>, supplied: usize) -> StagehandResult<()> {
        if let Arity::Exact(expected) = d.spec.arity
            && expected != supplied
        {
            self.warn(
                d.name(),
                format!("expected {expected} positional argument(s), got {supplied}"),
            )?;
        }
        Ok(())
    }

    fn resolve(
        &self,
        d: &Descriptor<'_>,
        raw: &serde_json::Value,
        bare: BareStrings,
    ) -> StagehandResult<Value> {
        self.registry
            .resolve_value(raw, bare, true)
            .map_err(|e| e.into_error(|src, err| expression_failed(d.name(), &src, err)))
    }

    fn add(&mut self, d: &Descriptor<'_>, nesting: Nesting) -> StagehandResult<ActionNode> {
        if nesting == Nesting::InControl {
            return Err(StagehandError::execution(
                "action `add` is not allowed inside a control action",
            ));
        }
        d.check_keys(ADD_KEYS, false)?;
        let (target, entity) = self.lookup(d.target()?)?;
        Ok(ActionNode::Add { target, entity })
    }

    fn control(&mut self, d: &Descriptor<'_>, kind: ControlKind) -> StagehandResult<ActionNode> {
        if d.has("target") {
            return Err(StagehandError::execution(format!(
                "control action `{}` takes its targets from params",
                d.name()
            )));
        }
        d.check_config(CONTROL_KEYS)?;
        let params = d.params()?.ok_or_else(|| {
            StagehandError::execution(format!("missing parameters for action `{}`", d.name()))
        })?;
        let asynchronous = match d.get("async") {
            None => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(other) => {
                return Err(StagehandError::execution(format!(
                    "`async` of action `{}` must be a bool, got {other}",
                    d.name()
                )));
            }
        };

        let mut lag_ratio = None;
        for (key, raw) in d.properties()?.into_iter().flatten() {
            let renamed = d
                .spec
                .properties
                .iter()
                .find(|(k, _)| *k == key.as_str())
                .map(|(_, renamed)| *renamed);
            match renamed {
                Some("lag_ratio") => {
                    lag_ratio = Some(raw.as_f64().ok_or_else(|| {
                        StagehandError::execution(format!(
                            "property `{key}` of action `{}` must be a number",
                            d.name()
                        ))
                    })?);
                }
                _ => return Err(invalid_config(key)),
            }
        }

        let config = PlayConfig {
            run_time: d.run_time()?,
        };
        let children = self.interpret(params, Nesting::InControl, Mode::Defer)?;
        Ok(ActionNode::Control {
            action: d.name().to_owned(),
            policy: kind.policy(lag_ratio),
            children,
            asynchronous,
            config,
        })
    }

    fn method(&mut self, d: &Descriptor<'_>, method: ProxyMethod) -> StagehandResult<ActionNode> {
        d.check_config(LEAF_KEYS)?;
        let (target, entity) = self.lookup(d.target()?)?;
        let params = d.params()?.ok_or_else(|| {
            StagehandError::execution(format!("missing parameters for action `{}`", d.name()))
        })?;
        self.check_arity(d, params.len())?;
        let args = params
            .iter()
            .map(|p| self.resolve(d, p, BareStrings::Evaluate))
            .collect::<StagehandResult<Vec<_>>>()?;
        let call = MethodCall::new(method, &args, entity.clone())?;
        let handle = animate(&entity).call(call.method, call.arg);
        Ok(ActionNode::Method {
            action: d.name().to_owned(),
            target,
            call,
            handle,
            config: PlayConfig {
                run_time: d.run_time()?,
            },
        })
    }

    fn simple(&mut self, d: &Descriptor<'_>, kind: TransitionKind) -> StagehandResult<ActionNode> {
        d.check_config(LEAF_KEYS)?;
        let (target, entity) = self.lookup(d.target()?)?;
        let params = d.params()?.unwrap_or_default();
        self.check_arity(d, params.len())?;

        let supplied = d.properties()?;
        let declared = d.spec.properties;
        match supplied {
            None if !declared.is_empty() => {
                self.warn(d.name(), "missing properties".to_owned())?;
            }
            Some(map) => {
                for (key, _) in declared.iter().filter(|(k, _)| !map.contains_key(*k)) {
                    self.warn(d.name(), format!("missing property `{key}`"))?;
                }
            }
            None => {}
        }

        let mut args = Vec::with_capacity(params.len());
        for (i, p) in params.iter().enumerate() {
            let value = match (kind, p) {
                (TransitionKind::Transform, serde_json::Value::String(name))
                    if i == 0 && !name.starts_with(EXPRESSION_MARKER) =>
                {
                    let name = name
                        .strip_prefix(REFERENCE_MARKER)
                        .unwrap_or(name.as_str());
                    Value::Entity(self.lookup(name)?.1)
                }
                _ => self.resolve(d, p, BareStrings::Literal)?,
            };
            args.push(value);
        }

        let mut properties = Properties::new();
        for (key, raw) in supplied.into_iter().flatten() {
            properties.insert(key.clone(), self.resolve(d, raw, BareStrings::Literal)?);
        }

        Ok(ActionNode::Simple {
            action: d.name().to_owned(),
            target,
            animation: Animation::Transition {
                kind,
                target: entity,
                args,
                properties,
            },
            config: PlayConfig {
                run_time: d.run_time()?,
            },
        })
    }

    /// Expand a `select` template into one concrete descriptor per parameter.
    fn expand_selection(&self, d: &Descriptor<'_>) -> StagehandResult<Vec<serde_json::Value>> {
        for key in ["target", "params", "properties"] {
            if !d.has(key) {
                return Err(StagehandError::execution(format!(
                    "action `select` requires `{key}`"
                )));
            }
        }
        d.check_keys(SELECTION_KEYS, false)?;
        let template = d.target()?;
        let action = d.properties()?.ok_or_else(|| {
            StagehandError::execution("properties of action `select` must be an action")
        })?;

        let params = match d.get("params") {
            Some(serde_json::Value::String(src)) if src.starts_with(EXPRESSION_MARKER) => {
                match self.registry.eval_in_scope(src, true, None) {
                    Ok(Value::List(items)) => items,
                    Ok(other) => {
                        return Err(StagehandError::execution(format!(
                            "params of action `select` must evaluate to a list, got {}",
                            other.type_name()
                        )));
                    }
                    Err(e) => {
                        return Err(e.into_error(|src, err| expression_failed(d.name(), &src, err)));
                    }
                }
            }
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| self.resolve(d, item, BareStrings::Literal))
                .collect::<StagehandResult<Vec<_>>>()?,
            _ => {
                return Err(StagehandError::execution(
                    "params of action `select` must be a list or an expression",
                ));
            }
        };

        Ok(params
            .iter()
            .map(|p| {
                let mut child = action.clone();
                child.insert(
                    "target".to_owned(),
                    serde_json::Value::String(template.replace(SELECTION_PLACEHOLDER, &p.to_string())),
                );
                serde_json::Value::Object(child)
            })
            .collect())
    }
}

fn wait(d: &Descriptor<'_>) -> StagehandResult<ActionNode> {
    let invalid = || StagehandError::execution("invalid parameters for action `wait`");
    if d.len() != 2 {
        return Err(invalid());
    }
    let params = d.params()?.ok_or_else(invalid)?;
    let [duration] = params else {
        return Err(invalid());
    };
    match duration.as_f64() {
        Some(duration) if duration >= 0.0 => Ok(ActionNode::Wait { duration }),
        _ => Err(invalid()),
    }
}

fn expression_failed(action: &str, source: &str, err: ExprError) -> StagehandError {
    StagehandError::execution_with(
        format!("failed to evaluate `{source}` for action `{action}`"),
        err,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/action/director.rs"]
mod tests;
