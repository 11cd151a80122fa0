//! Borrowed view over one action descriptor mapping, with the shape checks shared by every
//! action kind.

use crate::action::table::{self, ActionSpec, BASIC_CONFIG};
use crate::foundation::error::{StagehandError, StagehandResult};

type Map = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Descriptor<'a> {
    pub(crate) spec: &'static ActionSpec,
    map: &'a Map,
}

impl<'a> Descriptor<'a> {
    /// Dispatch step: the descriptor must be a mapping naming a supported action.
    pub(crate) fn dispatch(raw: &'a serde_json::Value) -> StagehandResult<Self> {
        let map = raw
            .as_object()
            .ok_or_else(|| StagehandError::execution("an action descriptor must be a mapping"))?;
        let name = match map.get("action") {
            None => return Err(StagehandError::execution("an action must be specified")),
            Some(serde_json::Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(StagehandError::execution(format!(
                    "action name must be a string, got {other}"
                )));
            }
        };
        let spec = table::lookup(name).ok_or_else(|| {
            StagehandError::execution(format!("action `{name}` is unsupported"))
        })?;
        Ok(Self { spec, map })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.spec.name
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.map.get(key)
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.map.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn require(&self, key: &str, what: &str) -> StagehandResult<&'a serde_json::Value> {
        self.get(key).ok_or_else(|| {
            StagehandError::execution(format!("{what} for action `{}`", self.name()))
        })
    }

    pub(crate) fn target(&self) -> StagehandResult<&'a str> {
        self.require("target", "an action target must be specified")?
            .as_str()
            .ok_or_else(|| {
                StagehandError::execution(format!(
                    "target of action `{}` must be a string",
                    self.name()
                ))
            })
    }

    /// `params` as a list; `None` when absent.
    pub(crate) fn params(&self) -> StagehandResult<Option<&'a [serde_json::Value]>> {
        match self.get("params") {
            None => Ok(None),
            Some(serde_json::Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(StagehandError::execution(format!(
                "params of action `{}` must be a list, got {other}",
                self.name()
            ))),
        }
    }

    /// `properties` as a mapping; `None` when absent.
    pub(crate) fn properties(&self) -> StagehandResult<Option<&'a Map>> {
        match self.get("properties") {
            None => Ok(None),
            Some(serde_json::Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(StagehandError::execution(format!(
                "properties of action `{}` must be a mapping, got {other}",
                self.name()
            ))),
        }
    }

    /// Reject every key outside `allowed` and the basic config keys.
    pub(crate) fn check_config(&self, allowed: &[&str]) -> StagehandResult<()> {
        self.check_keys(allowed, true)
    }

    /// Reject every key outside `allowed`; basic config keys only pass with `basic`.
    pub(crate) fn check_keys(&self, allowed: &[&str], basic: bool) -> StagehandResult<()> {
        for key in self.keys() {
            let known = allowed.contains(&key)
                || (basic && BASIC_CONFIG.iter().any(|(k, _)| *k == key));
            if !known {
                return Err(invalid_config(key));
            }
        }
        Ok(())
    }

    /// `duration`, renamed to its playback name.
    pub(crate) fn run_time(&self) -> StagehandResult<Option<f64>> {
        match self.get("duration") {
            None => Ok(None),
            Some(v) => match v.as_f64() {
                Some(d) if d >= 0.0 => Ok(Some(d)),
                _ => Err(StagehandError::execution(format!(
                    "duration of action `{}` must be a non-negative number, got {v}",
                    self.name()
                ))),
            },
        }
    }
}

pub(crate) fn invalid_config(key: &str) -> StagehandError {
    StagehandError::execution(format!("config `{key}` is invalid"))
}

#[cfg(test)]
#[path = "../../tests/unit/action/descriptor.rs"]
mod tests;
