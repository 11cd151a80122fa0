use std::collections::HashMap;

use kurbo::Size;

use crate::expression::Value;
use crate::foundation::core::Point;
use crate::foundation::error::{StagehandError, StagehandResult};
use crate::scene::object::{EntityKind, Properties, SceneObject};

/// Separator that marks a type name as a registry-namespaced user kind.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Builtin entity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// Plain text; value is the content.
    Text,
    /// TeX markup; value is the source.
    Tex,
    /// TeX math; value is the source.
    MathTex,
    /// Circle; optional radius.
    Circle,
    /// Square; optional side length.
    Square,
    /// Rectangle; value is `[width, height]`.
    Rectangle,
    /// Small dot; optional point.
    Dot,
    /// Segment; value is two points.
    Line,
    /// Arrow; value is two points.
    Arrow,
    /// Coordinate axes; no value.
    Axes,
    /// Coordinate grid; no value.
    NumberPlane,
    /// Group of other entities; built from the list form only.
    Group,
}

const TEXT_CHAR_WIDTH: f64 = 0.3;
const TEXT_HEIGHT: f64 = 0.5;
const DOT_RADIUS: f64 = 0.08;
const FRAME_SIZE: Size = Size::new(14.0, 8.0);

impl BuiltinKind {
    /// Look up a builtin by its document name; the first letter is capitalized before
    /// matching, so `"text"` and `"Text"` are the same kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let first = chars.next()?;
        let capitalized: String = first.to_uppercase().chain(chars).collect();
        Some(match capitalized.as_str() {
            "Text" => Self::Text,
            "Tex" => Self::Tex,
            "MathTex" => Self::MathTex,
            "Circle" => Self::Circle,
            "Square" => Self::Square,
            "Rectangle" => Self::Rectangle,
            "Dot" => Self::Dot,
            "Line" => Self::Line,
            "Arrow" => Self::Arrow,
            "Axes" => Self::Axes,
            "NumberPlane" => Self::NumberPlane,
            _ => return None,
        })
    }

    /// Capitalized type name.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Tex => "Tex",
            Self::MathTex => "MathTex",
            Self::Circle => "Circle",
            Self::Square => "Square",
            Self::Rectangle => "Rectangle",
            Self::Dot => "Dot",
            Self::Line => "Line",
            Self::Arrow => "Arrow",
            Self::Axes => "Axes",
            Self::NumberPlane => "NumberPlane",
            Self::Group => "Group",
        }
    }

    /// Kinds that can be built from properties alone.
    pub fn value_optional(self) -> bool {
        matches!(
            self,
            Self::Axes | Self::NumberPlane | Self::Circle | Self::Square | Self::Dot
        )
    }

    pub(crate) fn construct(
        self,
        value: Option<Value>,
        properties: Properties,
    ) -> StagehandResult<SceneObject> {
        let kind = EntityKind::Builtin(self);
        let obj = match self {
            Self::Text | Self::Tex | Self::MathTex => {
                let content = value
                    .as_ref()
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        StagehandError::object(format!("{} expects a string value", self.type_name()))
                    })?;
                let size = Size::new(
                    content.chars().count() as f64 * TEXT_CHAR_WIDTH,
                    TEXT_HEIGHT,
                );
                SceneObject::new(kind, value, properties, size)
            }
            Self::Circle | Self::Square => {
                let default = if self == Self::Circle { 1.0 } else { 2.0 };
                let n = optional_number(self, value.as_ref(), default)?;
                let side = if self == Self::Circle { 2.0 * n } else { n };
                SceneObject::new(kind, value, properties, Size::new(side, side))
            }
            Self::Dot => {
                let at = match &value {
                    Some(v) => vector(self, v)?.to_point(),
                    None => Point::ORIGIN,
                };
                let d = 2.0 * DOT_RADIUS;
                SceneObject::new(kind, value, properties, Size::new(d, d)).at(at)
            }
            Self::Rectangle => {
                let v = required(self, value.as_ref())?;
                let wh = vector(self, v)?;
                SceneObject::new(kind, value, properties, Size::new(wh.x, wh.y))
            }
            Self::Line | Self::Arrow => {
                let points = match required(self, value.as_ref())? {
                    Value::List(items) if items.len() == 2 => {
                        (vector(self, &items[0])?, vector(self, &items[1])?)
                    }
                    _ => {
                        return Err(StagehandError::object(format!(
                            "{} expects two points",
                            self.type_name()
                        )));
                    }
                };
                let (a, b) = points;
                let size = Size::new((b.x - a.x).abs(), (b.y - a.y).abs());
                SceneObject::new(kind, value, properties, size).at(a.lerp(b, 0.5).to_point())
            }
            Self::Axes | Self::NumberPlane => {
                if value.is_some() {
                    return Err(StagehandError::object(format!(
                        "{} takes no value",
                        self.type_name()
                    )));
                }
                SceneObject::new(kind, None, properties, FRAME_SIZE)
            }
            Self::Group => {
                return Err(StagehandError::object(
                    "groups are built from a list of names",
                ));
            }
        };
        Ok(obj)
    }
}

fn required(kind: BuiltinKind, value: Option<&Value>) -> StagehandResult<&Value> {
    value.ok_or_else(|| StagehandError::object(format!("{} expects a value", kind.type_name())))
}

fn optional_number(kind: BuiltinKind, value: Option<&Value>, default: f64) -> StagehandResult<f64> {
    match value {
        None => Ok(default),
        Some(v) => v.as_f64().map_err(|e| {
            StagehandError::object_with(format!("{} expects a number", kind.type_name()), e)
        }),
    }
}

fn vector(kind: BuiltinKind, value: &Value) -> StagehandResult<kurbo::Vec2> {
    value.as_vector().map_err(|e| {
        StagehandError::object_with(format!("{} expects a point", kind.type_name()), e)
    })
}

/// Constructor for a user kind.
pub type UserConstructor = fn(Option<Value>, Properties) -> StagehandResult<SceneObject>;

/// Whether a kind may be built without a `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueRule {
    /// `value` must be present.
    Required,
    /// `value` may be omitted.
    Optional,
}

#[derive(Clone, Copy)]
struct UserKind {
    rule: ValueRule,
    constructor: UserConstructor,
}

/// A resolved type name.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Constructor {
    Builtin(BuiltinKind),
    User {
        rule: ValueRule,
        constructor: UserConstructor,
    },
}

impl Constructor {
    pub(crate) fn value_optional(self) -> bool {
        match self {
            Self::Builtin(kind) => kind.value_optional(),
            Self::User { rule, .. } => rule == ValueRule::Optional,
        }
    }

    pub(crate) fn construct(
        self,
        name: &str,
        value: Option<Value>,
        properties: Properties,
    ) -> StagehandResult<SceneObject> {
        match self {
            Self::Builtin(kind) => kind.construct(value, properties),
            Self::User { constructor, .. } => {
                let mut obj = constructor(value, properties)?;
                obj.set_kind(EntityKind::User(name.to_owned()));
                Ok(obj)
            }
        }
    }
}

/// Type-name table: the builtin kinds plus the user namespace.
#[derive(Default)]
pub struct KindTable {
    user: HashMap<String, UserKind>,
}

impl KindTable {
    /// Register a user kind under a qualified name (it must contain
    /// [`NAMESPACE_SEPARATOR`]).
    pub fn register(
        &mut self,
        qualified: &str,
        rule: ValueRule,
        constructor: UserConstructor,
    ) -> StagehandResult<()> {
        if !qualified.contains(NAMESPACE_SEPARATOR) {
            return Err(StagehandError::object(format!(
                "user kind `{qualified}` must be qualified with `{NAMESPACE_SEPARATOR}`"
            )));
        }
        if self.user.contains_key(qualified) {
            return Err(StagehandError::object(format!(
                "user kind `{qualified}` is already registered"
            )));
        }
        self.user
            .insert(qualified.to_owned(), UserKind { rule, constructor });
        Ok(())
    }

    pub(crate) fn resolve(&self, type_name: &str) -> StagehandResult<Constructor> {
        if type_name.contains(NAMESPACE_SEPARATOR) {
            return self
                .user
                .get(type_name)
                .map(|k| Constructor::User {
                    rule: k.rule,
                    constructor: k.constructor,
                })
                .ok_or_else(|| StagehandError::object(format!("unknown user kind `{type_name}`")));
        }
        BuiltinKind::from_type_name(type_name)
            .map(Constructor::Builtin)
            .ok_or_else(|| StagehandError::object(format!("unknown type `{type_name}`")))
    }
}

impl std::fmt::Debug for KindTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.user.keys().collect();
        names.sort();
        f.debug_struct("KindTable").field("user", &names).finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/kinds.rs"]
mod tests;
