//! Frontend argument model and its coercion into IR values.
//!
//! Builders accept loosely typed [`Arg`]s so callers can pass literals, symbolic expressions
//! or already-built IR nodes interchangeably. Every coercion either yields a fully typed
//! value or a [`BuildError::UnsupportedArgument`].

use crate::error::{BuildError, BuildResult};
use crate::ir::dtype::DType;
use crate::ir::expr::{Constant, Expr, PrimValue, ShapeExpr, Var};
use crate::ir::prim::{PrimExpr, PrimVar};
use crate::ops::node::CreationOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Prim(PrimExpr),
    Value(PrimValue),
    Expr(Expr),
    Seq(Vec<Arg>),
}

impl Arg {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Float(_) => "float",
            Arg::Bool(_) => "bool",
            Arg::Str(_) => "str",
            Arg::Prim(_) => "prim_expr",
            Arg::Value(_) => "prim_value",
            Arg::Expr(expr) => expr.kind_name(),
            Arg::Seq(_) => "sequence",
        }
    }
}

macro_rules! impl_arg_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

impl_arg_from!(
    i64 => Int,
    i32 => Int as i64,
    u32 => Int as i64,
    f64 => Float,
    f32 => Float as f64,
    bool => Bool,
    String => Str,
    PrimExpr => Prim,
    PrimValue => Value,
    Expr => Expr,
);

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<PrimVar> for Arg {
    fn from(var: PrimVar) -> Self {
        Arg::Prim(PrimExpr::Var(var))
    }
}

impl From<Var> for Arg {
    fn from(var: Var) -> Self {
        Arg::Expr(Expr::Var(var))
    }
}

impl From<ShapeExpr> for Arg {
    fn from(shape: ShapeExpr) -> Self {
        Arg::Expr(Expr::Shape(shape))
    }
}

impl From<Constant> for Arg {
    fn from(constant: Constant) -> Self {
        Arg::Expr(Expr::Constant(constant))
    }
}

impl From<CreationOp> for Arg {
    fn from(op: CreationOp) -> Self {
        Arg::Expr(Expr::from(op))
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(values: Vec<T>) -> Self {
        Arg::Seq(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>, const N: usize> From<[T; N]> for Arg {
    fn from(values: [T; N]) -> Self {
        Arg::Seq(values.into_iter().map(Into::into).collect())
    }
}

fn unsupported(op: &'static str, param: &'static str, expected: &'static str, arg: &Arg) -> BuildError {
    BuildError::UnsupportedArgument {
        op,
        param,
        expected,
        found: arg.kind_name().to_string(),
    }
}

impl PrimValue {
    /// Wraps a scalar argument. Already-wrapped values are returned unchanged.
    pub fn from_arg(arg: Arg, op: &'static str, param: &'static str) -> BuildResult<PrimValue> {
        match arg {
            Arg::Int(value) => Ok(PrimValue::int64(value)),
            Arg::Float(value) => Ok(PrimValue::float32(value)),
            Arg::Bool(value) => Ok(PrimValue::boolean(value)),
            Arg::Prim(expr) => Ok(PrimValue::new(expr)),
            Arg::Value(value) | Arg::Expr(Expr::Prim(value)) => Ok(value),
            other => Err(unsupported(op, param, "a scalar literal or prim value", &other)),
        }
    }
}

fn dimension_from_arg(arg: Arg, op: &'static str, param: &'static str) -> BuildResult<PrimExpr> {
    const EXPECTED: &str = "a sequence of integer dimensions";
    let expr = match arg {
        Arg::Int(value) => return Ok(PrimExpr::int64(value)),
        Arg::Prim(expr) => expr,
        Arg::Value(value) | Arg::Expr(Expr::Prim(value)) => value.value,
        other => return Err(unsupported(op, param, EXPECTED, &other)),
    };
    if expr.dtype().is_integer() {
        Ok(expr)
    } else {
        Err(BuildError::UnsupportedArgument {
            op,
            param,
            expected: EXPECTED,
            found: format!("{} dimension", expr.dtype()),
        })
    }
}

impl ShapeExpr {
    /// Converts a literal sequence of dimensions into a shape. Existing shapes pass through.
    pub fn from_arg(arg: Arg, op: &'static str, param: &'static str) -> BuildResult<ShapeExpr> {
        match arg {
            Arg::Seq(dims) => dims
                .into_iter()
                .map(|dim| dimension_from_arg(dim, op, param))
                .collect(),
            Arg::Expr(Expr::Shape(shape)) => Ok(shape),
            other => Err(unsupported(op, param, "a sequence of integer dimensions", &other)),
        }
    }
}

/// Shape operand: a literal sequence becomes a [`ShapeExpr`]; a variable is kept as a
/// reference and checked during inference.
pub(crate) fn shape_operand(arg: Arg, op: &'static str, param: &'static str) -> BuildResult<Expr> {
    match arg {
        Arg::Expr(var @ Expr::Var(_)) => Ok(var),
        other => ShapeExpr::from_arg(other, op, param).map(Expr::Shape),
    }
}

/// Fill value operand. Bare literals become rank-0 constants.
pub(crate) fn fill_operand(arg: Arg, op: &'static str, param: &'static str) -> BuildResult<Expr> {
    match arg {
        Arg::Int(value) => Ok(Constant::int(value, DType::Si64).into()),
        Arg::Float(value) => Ok(Constant::float(value, DType::F32).into()),
        Arg::Bool(value) => Ok(Constant::boolean(value).into()),
        Arg::Expr(expr @ (Expr::Var(_) | Expr::Constant(_) | Expr::Call(_))) => Ok(expr),
        other => Err(unsupported(op, param, "a scalar tensor", &other)),
    }
}

/// Tensor operand: a variable or a nested creation call.
pub(crate) fn tensor_operand(arg: Arg, op: &'static str, param: &'static str) -> BuildResult<Expr> {
    match arg {
        Arg::Expr(expr @ (Expr::Var(_) | Expr::Constant(_) | Expr::Call(_))) => Ok(expr),
        other => Err(unsupported(op, param, "a tensor expression", &other)),
    }
}
