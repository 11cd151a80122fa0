use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use kurbo::{Rect, Size};

use crate::expression::{Program, Value};
use crate::foundation::core::{Point, Vec2};
use crate::scene::kinds::BuiltinKind;

/// Shared handle to a built scene object.
///
/// Groups hold clones of their members' handles, so a member mutated later is seen
/// through every group that contains it.
pub type EntityRef = Rc<RefCell<SceneObject>>;

/// Evaluated constructor keyword arguments.
pub type Properties = BTreeMap<String, Value>;

/// What kind of entity a [`SceneObject`] is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// One of the builtin kinds.
    Builtin(BuiltinKind),
    /// A user kind registered under a qualified name such as `"shapes.Badge"`.
    User(String),
}

impl EntityKind {
    /// Type name as written in documents (builtin names are capitalized).
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(kind) => kind.type_name(),
            Self::User(name) => name,
        }
    }
}

/// Per-frame callback attached by the `associate-updater` directive.
///
/// The program is evaluated with `this` bound to the owning entity; its result is the
/// entity's new center.
#[derive(Clone, Debug, PartialEq)]
pub struct Updater {
    program: Program,
}

impl Updater {
    /// Wrap a parsed program.
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    /// Parsed updater body.
    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// A constructed, named entity.
#[derive(Debug)]
pub struct SceneObject {
    name: String,
    kind: EntityKind,
    value: Option<Value>,
    properties: Properties,
    position: Point,
    extent: Size,
    scale: f64,
    color: Option<String>,
    members: Vec<EntityRef>,
    updaters: Vec<Updater>,
}

impl SceneObject {
    /// A fresh entity centered on the origin with the given unscaled size.
    pub fn new(kind: EntityKind, value: Option<Value>, properties: Properties, extent: Size) -> Self {
        let color = properties
            .get("color")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            name: String::new(),
            kind,
            value,
            properties,
            position: Point::ORIGIN,
            extent,
            scale: 1.0,
            color,
            members: Vec::new(),
            updaters: Vec::new(),
        }
    }

    /// A group referencing `members`. An entity listed more than once is kept once.
    pub fn group(members: Vec<EntityRef>) -> Self {
        let mut obj = Self::new(
            EntityKind::Builtin(BuiltinKind::Group),
            None,
            Properties::new(),
            Size::ZERO,
        );
        for m in members {
            if !obj.members.iter().any(|k| Rc::ptr_eq(k, &m)) {
                obj.members.push(m);
            }
        }
        obj
    }

    /// Place the center at `position` (builder form used by constructors).
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_kind(&mut self, kind: EntityKind) {
        self.kind = kind;
    }

    /// Registry name; empty until the entity has been registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity kind.
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Positional constructor value, if any.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Text content for text-like entities.
    pub fn text(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    /// Constructor keyword argument by name.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Current color.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Accumulated scale factor.
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    /// Group members (empty for leaves).
    pub fn members(&self) -> &[EntityRef] {
        &self.members
    }

    /// Attached updaters.
    pub fn updaters(&self) -> &[Updater] {
        &self.updaters
    }

    fn is_group(&self) -> bool {
        self.kind == EntityKind::Builtin(BuiltinKind::Group)
    }

    /// Bounding box. Groups cover their members; an empty group is a point at the origin.
    pub fn bounds(&self) -> Rect {
        if !self.is_group() {
            let size = Size::new(self.extent.width * self.scale, self.extent.height * self.scale);
            return Rect::from_center_size(self.position, size);
        }
        self.members
            .iter()
            .map(|m| m.borrow().bounds())
            .reduce(|a, b| a.union(b))
            .unwrap_or_default()
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Scaled width.
    pub fn width(&self) -> f64 {
        self.bounds().width()
    }

    /// Scaled height.
    pub fn height(&self) -> f64 {
        self.bounds().height()
    }

    /// Translate by `by`.
    pub fn shift(&mut self, by: Vec2) {
        if self.is_group() {
            for m in &self.members {
                m.borrow_mut().shift(by);
            }
        } else {
            self.position += by;
        }
    }

    /// Scale about the entity's own center.
    pub fn scale(&mut self, factor: f64) {
        if self.is_group() {
            let about = self.center();
            for m in &self.members {
                let mut m = m.borrow_mut();
                let offset = m.center() - about;
                m.scale(factor);
                m.shift(offset * (factor - 1.0));
            }
        }
        self.scale *= factor;
    }

    /// Recolor the entity (and every member of a group).
    pub fn set_color(&mut self, color: &str) {
        for m in &self.members {
            m.borrow_mut().set_color(color);
        }
        self.color = Some(color.to_owned());
    }

    /// Move so the center lands on `point`.
    pub fn move_to(&mut self, point: Point) {
        let by = point - self.center();
        self.shift(by);
    }

    /// Attach a per-frame updater.
    pub fn add_updater(&mut self, updater: Updater) {
        self.updaters.push(updater);
    }
}

/// Wrap a freshly built object into a shared handle.
pub fn share(obj: SceneObject) -> EntityRef {
    Rc::new(RefCell::new(obj))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/object.rs"]
mod tests;
