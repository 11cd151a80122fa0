use std::collections::HashMap;

use crate::expression::{
    EXPRESSION_MARKER, ExprError, REFERENCE_MARKER, Scope, Value, evaluate,
};
use crate::foundation::error::{StagehandError, StagehandResult};
use crate::foundation::ident::{Identifier, normalize};
use crate::scene::attributes::{AttributeDirective, Owner};
use crate::scene::kinds::{KindTable, NAMESPACE_SEPARATOR, UserConstructor, ValueRule};
use crate::scene::object::{EntityRef, Properties, SceneObject, share};

const DEFAULT_TYPE: &str = "text";
const RESERVED_KEYS: [&str; 3] = ["type", "value", "properties"];

/// What a registry name is currently bound to.
#[derive(Clone, Debug)]
pub enum Binding {
    /// Registered, not built yet: the raw object spec.
    Pending(serde_json::Value),
    /// Built entity.
    Built(EntityRef),
}

#[derive(Debug)]
struct Entry {
    name: String,
    index: Option<i64>,
    binding: Binding,
}

/// How bare strings (without a marker) are treated when resolving document values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BareStrings {
    Literal,
    Evaluate,
}

/// Failure while resolving a document value.
#[derive(Debug)]
pub(crate) enum ResolveError {
    /// A referenced entity is unknown or not built.
    Lookup(StagehandError),
    /// An expression failed to parse or evaluate.
    Expr { source: String, error: ExprError },
}

impl ResolveError {
    /// Keep lookup failures as they are; wrap expression failures with `wrap`.
    pub(crate) fn into_error(
        self,
        wrap: impl FnOnce(String, ExprError) -> StagehandError,
    ) -> StagehandError {
        match self {
            Self::Lookup(e) => e,
            Self::Expr { source, error } => wrap(source, error),
        }
    }
}

/// Owns every named entity, in registration order.
///
/// Names are single-assignment: once added, a name is never rebound to another entry,
/// renamed, or removed. Pending entries become built entities in [`Registry::build_all`].
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    lookup: HashMap<String, usize>,
    kinds: KindTable,
}

impl Registry {
    /// An empty registry with only the builtin kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user kind reachable through a qualified `type` name.
    pub fn register_kind(
        &mut self,
        qualified: &str,
        rule: ValueRule,
        constructor: UserConstructor,
    ) -> StagehandResult<()> {
        self.kinds.register(qualified, rule, constructor)
    }

    /// Bind a canonical `name` to a raw object spec.
    pub fn add(&mut self, name: impl Into<String>, raw: serde_json::Value) -> StagehandResult<()> {
        self.insert(name.into(), None, raw)
    }

    /// Bind a raw composite key (see [`crate::normalize`]) to a raw object spec, keeping
    /// its index for directive templates.
    pub fn add_key(&mut self, key: &str, raw: serde_json::Value) -> StagehandResult<()> {
        let id = Identifier::parse(key)?;
        self.insert(id.canonical(), id.index, raw)
    }

    fn insert(
        &mut self,
        name: String,
        index: Option<i64>,
        raw: serde_json::Value,
    ) -> StagehandResult<()> {
        if self.lookup.contains_key(&name) {
            return Err(StagehandError::object(format!(
                "object `{name}` already exists"
            )));
        }
        self.lookup.insert(name.clone(), self.entries.len());
        self.entries.push(Entry {
            name,
            index,
            binding: Binding::Pending(raw),
        });
        Ok(())
    }

    /// Current binding of a canonical name.
    pub fn get(&self, name: &str) -> StagehandResult<&Binding> {
        self.lookup
            .get(name)
            .map(|&i| &self.entries[i].binding)
            .ok_or_else(|| StagehandError::object(format!("cannot find object `{name}`")))
    }

    /// Built entity for a canonical name.
    pub fn entity(&self, name: &str) -> StagehandResult<EntityRef> {
        match self.get(name)? {
            Binding::Built(e) => Ok(e.clone()),
            Binding::Pending(_) => Err(StagehandError::object(format!(
                "object `{name}` is referenced before it is built"
            ))),
        }
    }

    /// Built entity for a raw composite key.
    pub fn resolve(&self, key: &str) -> StagehandResult<EntityRef> {
        self.entity(&normalize(key)?)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Index carried by the composite key a name was registered with.
    pub fn index_of(&self, name: &str) -> Option<i64> {
        self.lookup.get(name).and_then(|&i| self.entries[i].index)
    }

    /// Build every pending entry in registration order.
    ///
    /// Fails fast: the first error aborts the pass and the registry must not be used
    /// for playback afterwards.
    #[tracing::instrument(skip(self), fields(objects = self.entries.len()))]
    pub fn build_all(&mut self) -> StagehandResult<()> {
        for i in 0..self.entries.len() {
            let Binding::Pending(raw) = &self.entries[i].binding else {
                continue;
            };
            let raw = raw.clone();
            let owner = Owner {
                name: self.entries[i].name.clone(),
                index: self.entries[i].index,
            };
            let entity = self.build_one(&owner, &raw)?;
            tracing::debug!(name = %owner.name, kind = %entity.borrow().kind().name(), "built object");
            self.entries[i].binding = Binding::Built(entity);
        }
        Ok(())
    }

    fn build_one(&self, owner: &Owner, raw: &serde_json::Value) -> StagehandResult<EntityRef> {
        let name = owner.name.as_str();
        let obj = match raw {
            serde_json::Value::String(content) => self
                .kinds
                .resolve(DEFAULT_TYPE)?
                .construct(DEFAULT_TYPE, Some(Value::Str(content.clone())), Properties::new())
                .map_err(|e| failed_to_create(name, e))?,
            serde_json::Value::Array(names) => {
                let members = names
                    .iter()
                    .map(|n| {
                        let n = n.as_str().ok_or_else(|| {
                            StagehandError::object(format!(
                                "group `{name}` must list object names"
                            ))
                        })?;
                        self.resolve(n)
                    })
                    .collect::<StagehandResult<Vec<_>>>()?;
                SceneObject::group(members)
            }
            serde_json::Value::Object(map) => {
                let entity = self.build_mapping(owner, map)?;
                return Ok(entity);
            }
            other => {
                return Err(StagehandError::object(format!(
                    "object `{name}` must be a string, a list or a mapping, got {other}"
                )));
            }
        };
        let entity = share(obj);
        entity.borrow_mut().set_name(name);
        Ok(entity)
    }

    fn build_mapping(
        &self,
        owner: &Owner,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> StagehandResult<EntityRef> {
        let name = owner.name.as_str();
        let type_name = match map.get("type") {
            None => DEFAULT_TYPE,
            Some(serde_json::Value::String(t)) => t.as_str(),
            Some(other) => {
                return Err(StagehandError::object(format!(
                    "object `{name}` has a non-string type {other}"
                )));
            }
        };
        let ctor = self
            .kinds
            .resolve(type_name)
            .map_err(|e| failed_to_create(name, e))?;
        let qualified = type_name.contains(NAMESPACE_SEPARATOR);

        let value = match map.get("value") {
            Some(raw) => Some(
                self.resolve_value(raw, BareStrings::Literal, qualified)
                    .map_err(|e| e.into_error(|_, err| failed_to_create(name, err)))?,
            ),
            None if ctor.value_optional() => None,
            None => {
                return Err(StagehandError::object(format!(
                    "object `{name}` should have a value"
                )));
            }
        };

        let mut properties = Properties::new();
        match map.get("properties") {
            None => {}
            Some(serde_json::Value::Object(props)) => {
                for (k, raw) in props {
                    let v = self
                        .resolve_value(raw, BareStrings::Literal, qualified)
                        .map_err(|e| e.into_error(|_, err| failed_to_create(name, err)))?;
                    properties.insert(k.clone(), v);
                }
            }
            Some(_) => {
                return Err(StagehandError::object(format!(
                    "properties of `{name}` must be a mapping"
                )));
            }
        }

        let mut obj = ctor
            .construct(type_name, value, properties)
            .map_err(|e| failed_to_create(name, e))?;
        obj.set_name(name);
        let entity = share(obj);

        for (key, raw) in map {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let directive = AttributeDirective::from_key(key).ok_or_else(|| {
                StagehandError::object(format!("unsupported attribute `{key}` on `{name}`"))
            })?;
            directive.apply(self, &entity, raw, owner)?;
        }
        Ok(entity)
    }

    /// Resolve a document value: `@name` references a built entity, `=expr` is evaluated,
    /// lists are resolved item by item, and bare strings follow `bare`.
    pub(crate) fn resolve_value(
        &self,
        raw: &serde_json::Value,
        bare: BareStrings,
        expose_registry: bool,
    ) -> Result<Value, ResolveError> {
        match raw {
            serde_json::Value::String(s) => {
                if let Some(name) = s.strip_prefix(REFERENCE_MARKER) {
                    return self
                        .resolve(name)
                        .map(Value::Entity)
                        .map_err(ResolveError::Lookup);
                }
                if s.starts_with(EXPRESSION_MARKER) || bare == BareStrings::Evaluate {
                    return self.eval_in_scope(s, expose_registry, None);
                }
                Ok(Value::Str(s.clone()))
            }
            serde_json::Value::Array(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.resolve_value(item, bare, expose_registry))
                    .collect::<Result<_, _>>()?,
            )),
            other => Value::from_json(other).map_err(|error| ResolveError::Expr {
                source: other.to_string(),
                error,
            }),
        }
    }

    pub(crate) fn eval_in_scope(
        &self,
        source: &str,
        expose_registry: bool,
        this: Option<&EntityRef>,
    ) -> Result<Value, ResolveError> {
        let mut scope = Scope::new();
        if expose_registry {
            scope = scope.with_registry(self);
        }
        if let Some(this) = this {
            scope = scope.with_this(this);
        }
        evaluate(source, &scope).map_err(|error| ResolveError::Expr {
            source: source.to_owned(),
            error,
        })
    }

    /// Per-frame hook for renderers: run every updater once.
    ///
    /// Each updater is evaluated with `this` bound to its entity, `dt` bound to the frame
    /// delta and registry lookups available; its result becomes the entity's new center.
    pub fn run_updaters(&self, dt: f64) -> StagehandResult<()> {
        for entry in &self.entries {
            let Binding::Built(entity) = &entry.binding else {
                continue;
            };
            let updaters = entity.borrow().updaters().to_vec();
            for updater in updaters {
                let scope = Scope::new().with_registry(self).with_this(entity).with_dt(dt);
                let target = updater
                    .program()
                    .eval(&scope)
                    .and_then(|v| v.as_vector())
                    .map_err(|e| {
                        StagehandError::object_with(
                            format!(
                                "updater `{}` of `{}` failed",
                                updater.program().source(),
                                entry.name
                            ),
                            e,
                        )
                    })?;
                entity.borrow_mut().move_to(target.to_point());
            }
        }
        Ok(())
    }
}

fn failed_to_create(name: &str, cause: impl Into<crate::foundation::error::Cause>) -> StagehandError {
    StagehandError::object_with(format!("failed to create object `{name}`"), cause)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;
