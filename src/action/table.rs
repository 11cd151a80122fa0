//! Static action table: every supported action name and how it is dispatched.

use crate::action::node::{ControlPolicy, ProxyMethod, TransitionKind};

/// Implementation tag of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tag {
    /// Build and play a transition against one target.
    Simple(TransitionKind),
    /// Invoke a proxy method on one target.
    Method(ProxyMethod),
    /// Group child actions under a composition policy.
    Control(ControlKind),
    /// Pure delay.
    Wait,
    /// Compile-time fan-out of one action template.
    Selection,
    /// Unanimated scene mutation, top level only.
    Add,
}

/// Control policy before its properties are known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ControlKind {
    Parallel,
    Sequential,
    Staggered,
}

impl ControlKind {
    pub(crate) fn policy(self, lag_ratio: Option<f64>) -> ControlPolicy {
        match self {
            Self::Parallel => ControlPolicy::Parallel,
            Self::Sequential => ControlPolicy::Sequential,
            Self::Staggered => ControlPolicy::Staggered { lag_ratio },
        }
    }
}

/// Positional parameter expectation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Arity {
    /// Exactly this many; a mismatch is a warning for leaf actions.
    Exact(usize),
    /// Children come from `params`.
    Children,
    /// Exactly one param and no other keys.
    Wait,
    /// `target`, `params` and `properties` all required.
    Selection,
    /// Target only; illegal below a control action.
    Add,
}

/// One row of the action table.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ActionSpec {
    pub(crate) name: &'static str,
    pub(crate) tag: Tag,
    pub(crate) arity: Arity,
    /// Named properties the action expects. For control actions each entry is
    /// `(document key, renamed key)`; leaf actions only use the first element.
    pub(crate) properties: &'static [(&'static str, &'static str)],
}

/// Config keys shared by every playable action, mapped to their playback names.
pub(crate) const BASIC_CONFIG: &[(&str, &str)] = &[("duration", "run_time")];

pub(crate) const ACTIONS: &[ActionSpec] = &[
    leaf("write", Tag::Simple(TransitionKind::Write), 0, &[]),
    leaf("unwrite", Tag::Simple(TransitionKind::Unwrite), 0, &[]),
    leaf("create", Tag::Simple(TransitionKind::Create), 0, &[]),
    leaf("uncreate", Tag::Simple(TransitionKind::Uncreate), 0, &[]),
    leaf("fade-in", Tag::Simple(TransitionKind::FadeIn), 0, &[]),
    leaf("fade-out", Tag::Simple(TransitionKind::FadeOut), 0, &[]),
    leaf(
        "indicate",
        Tag::Simple(TransitionKind::Indicate),
        0,
        &[("scale_factor", "scale_factor")],
    ),
    leaf("transform", Tag::Simple(TransitionKind::Transform), 1, &[]),
    leaf("translate", Tag::Method(ProxyMethod::Shift), 1, &[]),
    leaf("scale", Tag::Method(ProxyMethod::Scale), 1, &[]),
    ActionSpec {
        name: "parallel",
        tag: Tag::Control(ControlKind::Parallel),
        arity: Arity::Children,
        properties: &[],
    },
    ActionSpec {
        name: "sequential",
        tag: Tag::Control(ControlKind::Sequential),
        arity: Arity::Children,
        properties: &[],
    },
    ActionSpec {
        name: "staggered",
        tag: Tag::Control(ControlKind::Staggered),
        arity: Arity::Children,
        properties: &[("ratio", "lag_ratio")],
    },
    ActionSpec {
        name: "wait",
        tag: Tag::Wait,
        arity: Arity::Wait,
        properties: &[],
    },
    ActionSpec {
        name: "select",
        tag: Tag::Selection,
        arity: Arity::Selection,
        properties: &[],
    },
    ActionSpec {
        name: "add",
        tag: Tag::Add,
        arity: Arity::Add,
        properties: &[],
    },
];

const fn leaf(
    name: &'static str,
    tag: Tag,
    params: usize,
    properties: &'static [(&'static str, &'static str)],
) -> ActionSpec {
    ActionSpec {
        name,
        tag,
        arity: Arity::Exact(params),
        properties,
    }
}

pub(crate) fn lookup(name: &str) -> Option<&'static ActionSpec> {
    ACTIONS.iter().find(|spec| spec.name == name)
}

/// Names of every supported action, in table order.
pub fn action_names() -> impl Iterator<Item = &'static str> {
    ACTIONS.iter().map(|spec| spec.name)
}
