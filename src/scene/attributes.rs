//! Post-construction directives carried next to `type`/`value`/`properties`.

use crate::expression::{Program, Value};
use crate::foundation::error::{StagehandError, StagehandResult};
use crate::scene::object::{EntityRef, Updater};
use crate::scene::registry::{BareStrings, Registry};

/// Placeholder replaced by the owner's index inside `shift` expressions.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// The entity a directive is applied to, as registered.
#[derive(Clone, Debug)]
pub(crate) struct Owner {
    pub(crate) name: String,
    pub(crate) index: Option<i64>,
}

/// Closed set of attribute directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeDirective {
    /// `shift`: translate by a vector.
    Shift,
    /// `color`: recolor with a literal color.
    Color,
    /// `scale`: scale by a number or an expression.
    Scale,
    /// `move-to`: center onto another entity.
    MoveTo,
    /// `associate-updater`: attach a per-frame updater expression.
    AssociateUpdater,
}

impl AttributeDirective {
    /// Directive for a mapping key, if the key names one.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "shift" => Self::Shift,
            "color" => Self::Color,
            "scale" => Self::Scale,
            "move-to" => Self::MoveTo,
            "associate-updater" => Self::AssociateUpdater,
            _ => return None,
        })
    }

    /// Key as written in documents.
    pub fn key(self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Color => "color",
            Self::Scale => "scale",
            Self::MoveTo => "move-to",
            Self::AssociateUpdater => "associate-updater",
        }
    }

    pub(crate) fn apply(
        self,
        registry: &Registry,
        entity: &EntityRef,
        raw: &serde_json::Value,
        owner: &Owner,
    ) -> StagehandResult<()> {
        match self {
            Self::Shift => shift(registry, entity, raw, owner),
            Self::Color => color(entity, raw, owner),
            Self::Scale => scale(registry, entity, raw, owner),
            Self::MoveTo => move_to(registry, entity, raw, owner),
            Self::AssociateUpdater => associate_updater(entity, raw, owner),
        }
    }
}

fn invalid(directive: AttributeDirective, owner: &Owner, what: &str) -> StagehandError {
    StagehandError::object(format!(
        "`{}` on `{}` {what}",
        directive.key(),
        owner.name
    ))
}

fn evaluated(
    directive: AttributeDirective,
    registry: &Registry,
    entity: &EntityRef,
    source: &str,
    owner: &Owner,
) -> StagehandResult<Value> {
    registry
        .eval_in_scope(source, false, Some(entity))
        .map_err(|e| {
            e.into_error(|src, err| {
                StagehandError::object_with(
                    format!(
                        "`{}` on `{}` failed to evaluate `{src}`",
                        directive.key(),
                        owner.name
                    ),
                    err,
                )
            })
        })
}

fn shift(
    registry: &Registry,
    entity: &EntityRef,
    raw: &serde_json::Value,
    owner: &Owner,
) -> StagehandResult<()> {
    let d = AttributeDirective::Shift;
    let value = match raw {
        serde_json::Value::String(src) => {
            let src = if src.contains(INDEX_PLACEHOLDER) {
                let index = owner
                    .index
                    .ok_or_else(|| invalid(d, owner, "uses `{index}` but the object has no index"))?;
                src.replace(INDEX_PLACEHOLDER, &index.to_string())
            } else {
                src.clone()
            };
            evaluated(d, registry, entity, &src, owner)?
        }
        other => registry
            .resolve_value(other, BareStrings::Literal, false)
            .map_err(|e| e.into_error(|_, err| StagehandError::object_with("invalid shift", err)))?,
    };
    let by = value
        .as_vector()
        .map_err(|e| StagehandError::object_with(format!("`shift` on `{}`", owner.name), e))?;
    entity.borrow_mut().shift(by);
    Ok(())
}

fn color(entity: &EntityRef, raw: &serde_json::Value, owner: &Owner) -> StagehandResult<()> {
    let color = raw
        .as_str()
        .ok_or_else(|| invalid(AttributeDirective::Color, owner, "expects a color string"))?;
    entity.borrow_mut().set_color(color);
    Ok(())
}

fn scale(
    registry: &Registry,
    entity: &EntityRef,
    raw: &serde_json::Value,
    owner: &Owner,
) -> StagehandResult<()> {
    let d = AttributeDirective::Scale;
    let factor = match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(d, owner, "is out of range"))?,
        serde_json::Value::String(src) => evaluated(d, registry, entity, src, owner)?
            .as_f64()
            .map_err(|e| StagehandError::object_with(format!("`scale` on `{}`", owner.name), e))?,
        _ => return Err(invalid(d, owner, "expects a number or an expression")),
    };
    entity.borrow_mut().scale(factor);
    Ok(())
}

fn move_to(
    registry: &Registry,
    entity: &EntityRef,
    raw: &serde_json::Value,
    owner: &Owner,
) -> StagehandResult<()> {
    let target = raw
        .as_str()
        .ok_or_else(|| invalid(AttributeDirective::MoveTo, owner, "expects an object name"))?;
    let center = registry.resolve(target)?.borrow().center();
    entity.borrow_mut().move_to(center);
    Ok(())
}

fn associate_updater(
    entity: &EntityRef,
    raw: &serde_json::Value,
    owner: &Owner,
) -> StagehandResult<()> {
    let d = AttributeDirective::AssociateUpdater;
    let src = raw
        .as_str()
        .ok_or_else(|| invalid(d, owner, "expects an expression"))?;
    let program = Program::parse(src).map_err(|e| {
        StagehandError::object_with(format!("updater of `{}` does not parse", owner.name), e)
    })?;
    entity.borrow_mut().add_updater(Updater::new(program));
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/attributes.rs"]
mod tests;
