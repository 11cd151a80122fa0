use std::fmt;
use std::rc::Rc;

use crate::expression::error::ExprError;
use crate::foundation::core::Vec2;
use crate::scene::object::EntityRef;

/// A dynamically typed value produced by documents and expressions.
#[derive(Clone, Debug)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any number; integers are stored as `f64`.
    Number(f64),
    /// String.
    Str(String),
    /// 2D vector.
    Vector(Vec2),
    /// Ordered list.
    List(Vec<Value>),
    /// A built scene object.
    Entity(EntityRef),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Convert a JSON literal. Objects have no value form and are rejected.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, ExprError> {
        Ok(match raw {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(
                n.as_f64()
                    .ok_or_else(|| ExprError::eval(format!("number {n} is out of range")))?,
            ),
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Array(items) => Self::List(
                items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(_) => {
                return Err(ExprError::eval("mappings cannot be used as values"));
            }
        })
    }

    /// JSON form used for diagnostics; entities are written as their registry name.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::json!(n),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Vector(v) => serde_json::json!([v.x, v.y]),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Entity(e) => serde_json::json!({ "entity": e.borrow().name() }),
        }
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Vector(_) => "vector",
            Self::List(_) => "list",
            Self::Entity(_) => "entity",
        }
    }

    /// Numeric view.
    pub fn as_f64(&self) -> Result<f64, ExprError> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(ExprError::eval(format!(
                "expected number, got {}",
                other.type_name()
            ))),
        }
    }

    /// Boolean view.
    pub fn as_bool(&self) -> Result<bool, ExprError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(ExprError::eval(format!(
                "expected bool, got {}",
                other.type_name()
            ))),
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Vector view: vectors, `[x, y]` lists and entity centers.
    pub fn as_vector(&self) -> Result<Vec2, ExprError> {
        match self {
            Self::Vector(v) => Ok(*v),
            Self::List(items) if items.len() == 2 => {
                Ok(Vec2::new(items[0].as_f64()?, items[1].as_f64()?))
            }
            Self::Entity(e) => Ok(e.borrow().center().to_vec2()),
            other => Err(ExprError::eval(format!(
                "expected vector, got {}",
                other.type_name()
            ))),
        }
    }

    /// Entity view.
    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Template form: integral numbers print without a fraction, strings print bare.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Vector(v) => write!(f, "({}, {})", v.x, v.y),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Entity(e) => f.write_str(e.borrow().name()),
        }
    }
}
