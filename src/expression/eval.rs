use std::f64::consts::{PI, TAU};

use crate::expression::ast::{BinaryOp, Expr, Lit, UnaryOp};
use crate::expression::error::ExprError;
use crate::expression::parser::parse_expr;
use crate::expression::value::Value;
use crate::foundation::core::{DOWN, LEFT, ORIGIN, RIGHT, UP, Vec2};
use crate::scene::object::EntityRef;
use crate::scene::registry::Registry;

/// Names visible to an expression. Everything else fails to resolve.
#[derive(Clone, Copy, Default)]
pub struct Scope<'a> {
    registry: Option<&'a Registry>,
    this: Option<&'a EntityRef>,
    dt: Option<f64>,
}

impl<'a> Scope<'a> {
    /// Constants and builtin functions only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also expose `objects.<name>` and `find(name)`.
    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Bind `this`.
    pub fn with_this(mut self, this: &'a EntityRef) -> Self {
        self.this = Some(this);
        self
    }

    /// Bind `dt` (seconds since the previous frame).
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    fn registry(&self) -> Result<&'a Registry, ExprError> {
        self.registry
            .ok_or_else(|| ExprError::eval("object lookup is not available here"))
    }
}

/// A parsed expression, ready to be evaluated any number of times.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    source: String,
    expr: Expr,
}

impl Program {
    /// Parse `source`; a leading `=` marker is ignored.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        Ok(Self {
            source: source.to_owned(),
            expr: parse_expr(source)?,
        })
    }

    /// Original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `scope`.
    pub fn eval(&self, scope: &Scope<'_>) -> Result<Value, ExprError> {
        eval_expr(&self.expr, scope)
    }
}

/// Parse and evaluate in one step.
pub fn evaluate(source: &str, scope: &Scope<'_>) -> Result<Value, ExprError> {
    Program::parse(source)?.eval(scope)
}

fn eval_expr(expr: &Expr, scope: &Scope<'_>) -> Result<Value, ExprError> {
    match expr {
        Expr::Lit(Lit::Num(n)) => Ok(Value::Number(*n)),
        Expr::Lit(Lit::Bool(b)) => Ok(Value::Bool(*b)),
        Expr::Lit(Lit::Str(s)) => Ok(Value::Str(s.clone())),
        Expr::List(items) => Ok(Value::List(
            items
                .iter()
                .map(|e| eval_expr(e, scope))
                .collect::<Result<_, _>>()?,
        )),
        Expr::Unary { op, expr } => {
            let v = eval_expr(expr, scope)?;
            match (op, v) {
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Neg, Value::Vector(v)) => Ok(Value::Vector(-v)),
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (op, v) => Err(ExprError::eval(format!(
                    "cannot apply {op:?} to {}",
                    v.type_name()
                ))),
            }
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            if !eval_expr(left, scope)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_expr(right, scope)?.as_bool()?))
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            if eval_expr(left, scope)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_expr(right, scope)?.as_bool()?))
        }
        Expr::Binary { op, left, right } => {
            let a = eval_expr(left, scope)?;
            let b = eval_expr(right, scope)?;
            binary(*op, a, b)
        }
        Expr::Call { func, args } => {
            let args = args
                .iter()
                .map(|e| eval_expr(e, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(func, &args, scope)
        }
        Expr::Path(path) => resolve_path(path, scope),
    }
}

fn binary(op: BinaryOp, a: Value, b: Value) -> Result<Value, ExprError> {
    use Value::{Number, Str, Vector};

    let out = match (op, &a, &b) {
        (BinaryOp::Add, Number(x), Number(y)) => Number(x + y),
        (BinaryOp::Sub, Number(x), Number(y)) => Number(x - y),
        (BinaryOp::Mul, Number(x), Number(y)) => Number(x * y),
        (BinaryOp::Div, Number(x), Number(y)) => Number(x / y),
        (BinaryOp::Mod, Number(x), Number(y)) => Number(x % y),

        (BinaryOp::Add, Vector(x), Vector(y)) => Vector(*x + *y),
        (BinaryOp::Sub, Vector(x), Vector(y)) => Vector(*x - *y),
        (BinaryOp::Mul, Vector(v), Number(k)) | (BinaryOp::Mul, Number(k), Vector(v)) => {
            Vector(*v * *k)
        }
        (BinaryOp::Div, Vector(v), Number(k)) => Vector(*v / *k),

        (BinaryOp::Add, Str(x), Str(y)) => Str(format!("{x}{y}")),

        (BinaryOp::Lt, Number(x), Number(y)) => Value::Bool(x < y),
        (BinaryOp::Le, Number(x), Number(y)) => Value::Bool(x <= y),
        (BinaryOp::Gt, Number(x), Number(y)) => Value::Bool(x > y),
        (BinaryOp::Ge, Number(x), Number(y)) => Value::Bool(x >= y),

        (BinaryOp::Eq, _, _) => Value::Bool(a == b),
        (BinaryOp::Ne, _, _) => Value::Bool(a != b),

        _ => {
            return Err(ExprError::eval(format!(
                "unsupported operands for {op:?}: {} and {}",
                a.type_name(),
                b.type_name()
            )));
        }
    };
    Ok(out)
}

fn constant(name: &str) -> Option<Value> {
    let v = match name {
        "PI" => Value::Number(PI),
        "TAU" => Value::Number(TAU),
        "ORIGIN" => Value::Vector(ORIGIN),
        "UP" => Value::Vector(UP),
        "DOWN" => Value::Vector(DOWN),
        "LEFT" => Value::Vector(LEFT),
        "RIGHT" => Value::Vector(RIGHT),
        "UL" => Value::Vector(UP + LEFT),
        "UR" => Value::Vector(UP + RIGHT),
        "DL" => Value::Vector(DOWN + LEFT),
        "DR" => Value::Vector(DOWN + RIGHT),
        _ => return None,
    };
    Some(v)
}

fn resolve_path(path: &[String], scope: &Scope<'_>) -> Result<Value, ExprError> {
    let (entity, fields) = match path {
        [name] => {
            if let Some(v) = constant(name) {
                return Ok(v);
            }
            match name.as_str() {
                "dt" => {
                    return scope
                        .dt
                        .map(Value::Number)
                        .ok_or_else(|| ExprError::eval("`dt` is only bound inside updaters"));
                }
                "this" => (this(scope)?, &path[1..]),
                _ => return Err(ExprError::eval(format!("unknown name `{name}`"))),
            }
        }
        [head, ..] if head == "this" => (this(scope)?, &path[1..]),
        [head, name, ..] if head == "objects" => (lookup(scope, name)?, &path[2..]),
        _ => {
            return Err(ExprError::eval(format!(
                "unknown name `{}`",
                path.join(".")
            )));
        }
    };

    match fields {
        [] => Ok(Value::Entity(entity)),
        [field] => entity_field(&entity, field),
        _ => Err(ExprError::eval(format!(
            "`{}` is not a readable field",
            path.join(".")
        ))),
    }
}

fn this(scope: &Scope<'_>) -> Result<EntityRef, ExprError> {
    scope
        .this
        .cloned()
        .ok_or_else(|| ExprError::eval("`this` is only bound inside updaters"))
}

fn lookup(scope: &Scope<'_>, name: &str) -> Result<EntityRef, ExprError> {
    scope
        .registry()?
        .resolve(name)
        .map_err(|e| ExprError::eval(e.to_string()))
}

fn entity_field(entity: &EntityRef, field: &str) -> Result<Value, ExprError> {
    let e = entity.borrow();
    Ok(match field {
        "center" => Value::Vector(e.center().to_vec2()),
        "x" => Value::Number(e.center().x),
        "y" => Value::Number(e.center().y),
        "width" => Value::Number(e.width()),
        "height" => Value::Number(e.height()),
        "scale" => Value::Number(e.scale_factor()),
        other => {
            return Err(ExprError::eval(format!(
                "entities have no field `{other}`"
            )));
        }
    })
}

fn expect_args(func: &str, args: &[Value], n: usize) -> Result<(), ExprError> {
    if args.len() != n {
        return Err(ExprError::eval(format!(
            "{func} expects {n} arg{}",
            if n == 1 { "" } else { "s" }
        )));
    }
    Ok(())
}

fn call_builtin(func: &str, args: &[Value], scope: &Scope<'_>) -> Result<Value, ExprError> {
    let unary = |f: fn(f64) -> f64| -> Result<Value, ExprError> {
        expect_args(func, args, 1)?;
        Ok(Value::Number(f(args[0].as_f64()?)))
    };

    match func {
        "abs" => unary(f64::abs),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "sqrt" => unary(f64::sqrt),
        "min" | "max" => {
            expect_args(func, args, 2)?;
            let (a, b) = (args[0].as_f64()?, args[1].as_f64()?);
            Ok(Value::Number(if func == "min" { a.min(b) } else { a.max(b) }))
        }
        "clamp" => {
            expect_args(func, args, 3)?;
            let (x, lo, hi) = (args[0].as_f64()?, args[1].as_f64()?, args[2].as_f64()?);
            if !(lo <= hi) {
                return Err(ExprError::eval("clamp expects lo <= hi"));
            }
            Ok(Value::Number(x.clamp(lo, hi)))
        }
        "lerp" => {
            expect_args(func, args, 3)?;
            let t = args[2].as_f64()?;
            match (&args[0], &args[1]) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + (b - a) * t)),
                (a, b) => {
                    let (a, b) = (a.as_vector()?, b.as_vector()?);
                    Ok(Value::Vector(a.lerp(b, t)))
                }
            }
        }
        "vec" => {
            expect_args(func, args, 2)?;
            Ok(Value::Vector(Vec2::new(args[0].as_f64()?, args[1].as_f64()?)))
        }
        "norm" => {
            expect_args(func, args, 1)?;
            Ok(Value::Number(args[0].as_vector()?.length()))
        }
        "range" => range(args),
        "len" => {
            expect_args(func, args, 1)?;
            match &args[0] {
                Value::List(items) => Ok(Value::Number(items.len() as f64)),
                Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
                other => Err(ExprError::eval(format!(
                    "len expects a list or string, got {}",
                    other.type_name()
                ))),
            }
        }
        "center" => {
            expect_args(func, args, 1)?;
            let entity = args[0]
                .as_entity()
                .ok_or_else(|| ExprError::eval("center expects an entity"))?;
            Ok(Value::Vector(entity.borrow().center().to_vec2()))
        }
        "find" => {
            expect_args(func, args, 1)?;
            let name = args[0]
                .as_str()
                .ok_or_else(|| ExprError::eval("find expects a name"))?;
            Ok(Value::Entity(lookup(scope, name)?))
        }
        other => Err(ExprError::eval(format!("unknown function `{other}`"))),
    }
}

const RANGE_LIMIT: usize = 10_000;

fn range(args: &[Value]) -> Result<Value, ExprError> {
    let (start, end, step) = match args {
        [end] => (0.0, end.as_f64()?, 1.0),
        [start, end] => (start.as_f64()?, end.as_f64()?, 1.0),
        [start, end, step] => (start.as_f64()?, end.as_f64()?, step.as_f64()?),
        _ => return Err(ExprError::eval("range expects 1 to 3 args")),
    };
    if step == 0.0 || !step.is_finite() {
        return Err(ExprError::eval("range step must be finite and non-zero"));
    }

    let mut out = Vec::new();
    let mut x = start;
    while (step > 0.0 && x < end) || (step < 0.0 && x > end) {
        if out.len() == RANGE_LIMIT {
            return Err(ExprError::eval(format!(
                "range produces more than {RANGE_LIMIT} items"
            )));
        }
        out.push(Value::Number(x));
        x += step;
    }
    Ok(Value::List(out))
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
