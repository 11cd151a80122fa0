use std::rc::Rc;

use crate::expression::Value;
use crate::foundation::core::Vec2;
use crate::foundation::error::{StagehandError, StagehandResult};
use crate::scene::object::{EntityRef, Properties};

/// Playback options handed to [`crate::Renderer::play`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct PlayConfig {
    /// Animation length in seconds (`duration` in scripts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,
}

/// Transitions played by simple actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// Draw text or strokes progressively.
    Write,
    /// Reverse of `Write`.
    Unwrite,
    /// Draw the outline, then fill.
    Create,
    /// Reverse of `Create`.
    Uncreate,
    /// Fade from transparent.
    FadeIn,
    /// Fade to transparent.
    FadeOut,
    /// Briefly highlight.
    Indicate,
    /// Morph the target into the entity given as first argument.
    Transform,
}

/// Proxy methods available through [`animate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyMethod {
    /// Translate by a vector.
    Shift,
    /// Scale by a factor.
    Scale,
}

impl ProxyMethod {
    /// Method name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Scale => "scale",
        }
    }
}

/// Composition policy of a control action.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPolicy {
    /// Children run at the same time.
    Parallel,
    /// Children run one after another.
    Sequential,
    /// Children start one after another with overlap.
    Staggered {
        /// Fraction of a child's run time after which the next one starts.
        lag_ratio: Option<f64>,
    },
}

/// Argument of a recorded method call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MethodArg {
    /// Translation vector for `shift`.
    Vector(Vec2),
    /// Factor for `scale`.
    Factor(f64),
}

/// A recorded `(method, argument, owning entity)` triple.
#[derive(Clone, Debug)]
pub struct MethodCall {
    /// Method to invoke.
    pub method: ProxyMethod,
    /// Evaluated argument.
    pub arg: MethodArg,
    /// Entity the method is invoked on.
    pub target: EntityRef,
}

impl PartialEq for MethodCall {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method && self.arg == other.arg && Rc::ptr_eq(&self.target, &other.target)
    }
}

impl MethodCall {
    /// Build a call from evaluated script arguments; only the first argument is used.
    pub fn new(method: ProxyMethod, args: &[Value], target: EntityRef) -> StagehandResult<Self> {
        let first = args.first().ok_or_else(|| {
            StagehandError::execution(format!("`{}` expects one argument", method.name()))
        })?;
        let arg = match method {
            ProxyMethod::Shift => MethodArg::Vector(first.as_vector().map_err(|e| {
                StagehandError::execution_with("`shift` expects a vector", e)
            })?),
            ProxyMethod::Scale => MethodArg::Factor(first.as_f64().map_err(|e| {
                StagehandError::execution_with("`scale` expects a number", e)
            })?),
        };
        Ok(Self { method, arg, target })
    }

    /// Invoke the method on its entity.
    pub fn apply(&self) {
        let mut target = self.target.borrow_mut();
        match self.arg {
            MethodArg::Vector(v) => target.shift(v),
            MethodArg::Factor(f) => target.scale(f),
        }
    }
}

/// Method calls merged into one operation by an asynchronous control action.
#[derive(Debug, Default, PartialEq)]
pub struct MethodBatch {
    calls: Vec<MethodCall>,
}

impl MethodBatch {
    /// Every recorded call, in script order.
    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    /// Invoke every recorded call owned by `entity`.
    pub fn apply_to(&self, entity: &EntityRef) {
        for call in self.calls.iter().filter(|c| Rc::ptr_eq(&c.target, entity)) {
            call.apply();
        }
    }
}

/// Replayable animation handle consumed by renderers.
#[derive(Clone, Debug)]
pub enum Animation {
    /// A transition on one entity.
    Transition {
        /// Which transition.
        kind: TransitionKind,
        /// Animated entity.
        target: EntityRef,
        /// Evaluated positional arguments.
        args: Vec<Value>,
        /// Evaluated named properties.
        properties: Properties,
    },
    /// A deferred proxy method call (`entity.animate.shift(...)`).
    Proxy(MethodCall),
    /// Apply a shared [`MethodBatch`] to one entity.
    Apply {
        /// Entity the batch is applied to.
        target: EntityRef,
        /// Shared batch.
        batch: Rc<MethodBatch>,
    },
    /// A delay inside a composite.
    Wait {
        /// Seconds.
        duration: f64,
    },
    /// Children combined under a policy.
    Composite {
        /// Composition policy.
        policy: ControlPolicy,
        /// Child animations in script order.
        children: Vec<Animation>,
    },
}

impl PartialEq for Animation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Transition {
                    kind: k1,
                    target: t1,
                    args: a1,
                    properties: p1,
                },
                Self::Transition {
                    kind: k2,
                    target: t2,
                    args: a2,
                    properties: p2,
                },
            ) => k1 == k2 && Rc::ptr_eq(t1, t2) && a1 == a2 && p1 == p2,
            (Self::Proxy(a), Self::Proxy(b)) => a == b,
            (
                Self::Apply {
                    target: t1,
                    batch: b1,
                },
                Self::Apply {
                    target: t2,
                    batch: b2,
                },
            ) => Rc::ptr_eq(t1, t2) && Rc::ptr_eq(b1, b2),
            (Self::Wait { duration: a }, Self::Wait { duration: b }) => a == b,
            (
                Self::Composite {
                    policy: p1,
                    children: c1,
                },
                Self::Composite {
                    policy: p2,
                    children: c2,
                },
            ) => p1 == p2 && c1 == c2,
            _ => false,
        }
    }
}

impl Animation {
    /// Apply the end state of the animation to the entities it touches.
    pub fn finish(&self) {
        match self {
            Self::Proxy(call) => call.apply(),
            Self::Apply { target, batch } => batch.apply_to(target),
            Self::Composite { children, .. } => children.iter().for_each(Self::finish),
            Self::Transition { .. } | Self::Wait { .. } => {}
        }
    }

    /// JSON description for logs and the CLI.
    pub fn describe(&self) -> serde_json::Value {
        match self {
            Self::Transition {
                kind,
                target,
                args,
                properties,
            } => serde_json::json!({
                "transition": kind,
                "target": target.borrow().name(),
                "args": args.iter().map(Value::to_json).collect::<Vec<_>>(),
                "properties": properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<serde_json::Map<_, _>>(),
            }),
            Self::Proxy(call) => serde_json::json!({
                "proxy": call.method,
                "target": call.target.borrow().name(),
                "arg": describe_arg(call.arg),
            }),
            Self::Apply { target, batch } => serde_json::json!({
                "apply": target.borrow().name(),
                "batch": batch
                    .calls()
                    .iter()
                    .map(|c| serde_json::json!({
                        "method": c.method,
                        "target": c.target.borrow().name(),
                        "arg": describe_arg(c.arg),
                    }))
                    .collect::<Vec<_>>(),
            }),
            Self::Wait { duration } => serde_json::json!({ "wait": duration }),
            Self::Composite { policy, children } => serde_json::json!({
                "composite": policy,
                "children": children.iter().map(Self::describe).collect::<Vec<_>>(),
            }),
        }
    }
}

fn describe_arg(arg: MethodArg) -> serde_json::Value {
    match arg {
        MethodArg::Vector(v) => serde_json::json!([v.x, v.y]),
        MethodArg::Factor(f) => serde_json::json!(f),
    }
}

/// Proxy over an entity whose methods return animations instead of mutating.
#[derive(Clone, Debug)]
pub struct Proxy {
    target: EntityRef,
}

/// Start a proxy call chain on `entity`, like `entity.animate` in scene code.
pub fn animate(entity: &EntityRef) -> Proxy {
    Proxy {
        target: entity.clone(),
    }
}

impl Proxy {
    /// Deferred translation.
    pub fn shift(self, by: Vec2) -> Animation {
        Animation::Proxy(MethodCall {
            method: ProxyMethod::Shift,
            arg: MethodArg::Vector(by),
            target: self.target,
        })
    }

    /// Deferred scale.
    pub fn scale(self, factor: f64) -> Animation {
        Animation::Proxy(MethodCall {
            method: ProxyMethod::Scale,
            arg: MethodArg::Factor(factor),
            target: self.target,
        })
    }

    /// Deferred form of a recorded call.
    pub fn call(self, method: ProxyMethod, arg: MethodArg) -> Animation {
        Animation::Proxy(MethodCall {
            method,
            arg,
            target: self.target,
        })
    }
}

/// A compiled action.
#[derive(Clone, Debug)]
pub enum ActionNode {
    /// A transition on one target.
    Simple {
        /// Action name.
        action: String,
        /// Canonical target name.
        target: String,
        /// Built animation.
        animation: Animation,
        /// Playback options.
        config: PlayConfig,
    },
    /// A proxy method call on one target.
    Method {
        /// Action name.
        action: String,
        /// Canonical target name.
        target: String,
        /// Recorded call, used when folded into an asynchronous control action.
        call: MethodCall,
        /// Proxy animation handle.
        handle: Animation,
        /// Playback options.
        config: PlayConfig,
    },
    /// Children grouped under a policy.
    Control {
        /// Action name.
        action: String,
        /// Composition policy.
        policy: ControlPolicy,
        /// Compiled children.
        children: Vec<ActionNode>,
        /// Fold method children into one batch.
        asynchronous: bool,
        /// Playback options.
        config: PlayConfig,
    },
    /// A delay.
    Wait {
        /// Seconds.
        duration: f64,
    },
    /// Direct, unanimated addition to the scene.
    Add {
        /// Canonical target name.
        target: String,
        /// Entity to add.
        entity: EntityRef,
    },
}

impl ActionNode {
    /// Action name as written in the script.
    pub fn action(&self) -> &str {
        match self {
            Self::Simple { action, .. } | Self::Method { action, .. } | Self::Control { action, .. } => {
                action
            }
            Self::Wait { .. } => "wait",
            Self::Add { .. } => "add",
        }
    }

    /// Canonical target name of leaf nodes.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Simple { target, .. } | Self::Method { target, .. } | Self::Add { target, .. } => {
                Some(target)
            }
            Self::Control { .. } | Self::Wait { .. } => None,
        }
    }

    /// Playback options.
    pub fn config(&self) -> PlayConfig {
        match self {
            Self::Simple { config, .. }
            | Self::Method { config, .. }
            | Self::Control { config, .. } => config.clone(),
            Self::Wait { .. } | Self::Add { .. } => PlayConfig::default(),
        }
    }

    /// Animation handle of a playable node. `Add` nodes have none.
    pub fn animation(&self) -> StagehandResult<Animation> {
        match self {
            Self::Simple { animation, .. } => Ok(animation.clone()),
            Self::Method { handle, .. } => Ok(handle.clone()),
            Self::Wait { duration } => Ok(Animation::Wait {
                duration: *duration,
            }),
            Self::Control {
                policy,
                children,
                asynchronous,
                ..
            } => composite(*policy, children, *asynchronous),
            Self::Add { target, .. } => Err(StagehandError::execution(format!(
                "`add` of `{target}` is not an animation"
            ))),
        }
    }
}

/// Build the composite animation of a control node.
///
/// With `asynchronous`, every method child is recorded into one shared [`MethodBatch`] and
/// each distinct owning entity contributes a single [`Animation::Apply`] in place of the
/// method children's proxy animations.
fn composite(
    policy: ControlPolicy,
    children: &[ActionNode],
    asynchronous: bool,
) -> StagehandResult<Animation> {
    if !asynchronous {
        return Ok(Animation::Composite {
            policy,
            children: children
                .iter()
                .map(ActionNode::animation)
                .collect::<StagehandResult<_>>()?,
        });
    }

    let batch = Rc::new(MethodBatch {
        calls: children
            .iter()
            .filter_map(|c| match c {
                ActionNode::Method { call, .. } => Some(call.clone()),
                _ => None,
            })
            .collect(),
    });

    let mut applied: Vec<EntityRef> = Vec::new();
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child {
            ActionNode::Method { call, .. } => {
                if applied.iter().any(|e| Rc::ptr_eq(e, &call.target)) {
                    continue;
                }
                applied.push(call.target.clone());
                out.push(Animation::Apply {
                    target: call.target.clone(),
                    batch: batch.clone(),
                });
            }
            other => out.push(other.animation()?),
        }
    }
    Ok(Animation::Composite {
        policy,
        children: out,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/action/node.rs"]
mod tests;
