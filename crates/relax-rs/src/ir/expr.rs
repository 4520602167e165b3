//! Immutable IR expression nodes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ir::dtype::DType;
use crate::ir::prim::PrimExpr;
use crate::ops::node::CreationOp;

/// Dimension list storage; most creation shapes are rank four or less.
pub type Dims = SmallVec<[PrimExpr; 4]>;

/// Identifier of a variable bound inside a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u32);

/// Reference to a parameter or binding. Its struct info lives in the enclosing function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var {
    pub id: VarId,
    pub name: Arc<str>,
}

impl Var {
    pub fn new(id: VarId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Arc::<str>::from(name.into()),
        }
    }
}

/// Ordered list of symbolic-or-concrete dimensions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeExpr {
    values: Dims,
}

impl ShapeExpr {
    pub fn new(values: impl IntoIterator<Item = PrimExpr>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[PrimExpr] {
        &self.values
    }

    pub fn rank(&self) -> usize {
        self.values.len()
    }
}

impl FromIterator<PrimExpr> for ShapeExpr {
    fn from_iter<I: IntoIterator<Item = PrimExpr>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&[i64]> for ShapeExpr {
    fn from(dims: &[i64]) -> Self {
        dims.iter().copied().map(PrimExpr::int64).collect()
    }
}

impl<const N: usize> From<[i64; N]> for ShapeExpr {
    fn from(dims: [i64; N]) -> Self {
        ShapeExpr::from(&dims[..])
    }
}

/// A scalar operator attribute.
///
/// The dtype is the declared dtype of the wrapped expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimValue {
    pub value: PrimExpr,
}

impl PrimValue {
    pub fn new(value: PrimExpr) -> Self {
        Self { value }
    }

    pub fn int64(value: i64) -> Self {
        Self::new(PrimExpr::int64(value))
    }

    pub fn float32(value: f64) -> Self {
        Self::new(PrimExpr::float32(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(PrimExpr::boolean(value))
    }

    pub fn dtype(&self) -> DType {
        self.value.dtype()
    }
}

/// Scalar payload of a [`Constant`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Rank-0 tensor constant, typically a fill value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub value: Literal,
    pub dtype: DType,
}

impl Constant {
    pub fn new(value: Literal, dtype: DType) -> Self {
        Self { value, dtype }
    }

    pub fn float(value: f64, dtype: DType) -> Self {
        Self::new(Literal::Float(value), dtype)
    }

    pub fn int(value: i64, dtype: DType) -> Self {
        Self::new(Literal::Int(value), dtype)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(Literal::Bool(value), DType::Bool)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Int(value) => write!(f, "{value}"),
            Literal::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// IR expression. Nodes are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Var(Var),
    Shape(ShapeExpr),
    Prim(PrimValue),
    Constant(Constant),
    Call(Arc<CreationOp>),
}

impl Expr {
    pub fn as_shape(&self) -> Option<&ShapeExpr> {
        match self {
            Expr::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_prim_value(&self) -> Option<&PrimValue> {
        match self {
            Expr::Prim(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CreationOp> {
        match self {
            Expr::Call(op) => Some(op),
            _ => None,
        }
    }

    /// Short tag used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Var(_) => "var",
            Expr::Shape(_) => "shape",
            Expr::Prim(_) => "prim_value",
            Expr::Constant(_) => "constant",
            Expr::Call(_) => "call",
        }
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Expr::Var(var)
    }
}

impl From<ShapeExpr> for Expr {
    fn from(shape: ShapeExpr) -> Self {
        Expr::Shape(shape)
    }
}

impl From<PrimValue> for Expr {
    fn from(value: PrimValue) -> Self {
        Expr::Prim(value)
    }
}

impl From<Constant> for Expr {
    fn from(value: Constant) -> Self {
        Expr::Constant(value)
    }
}

impl From<CreationOp> for Expr {
    fn from(op: CreationOp) -> Self {
        Expr::Call(Arc::new(op))
    }
}

pub(crate) fn join_dims(values: &[PrimExpr]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ShapeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape([{}])", join_dims(&self.values))
    }
}

impl fmt::Display for PrimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prim({}: {})", self.value, self.dtype())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(var) => write!(f, "%{}", var.name),
            Expr::Shape(shape) => write!(f, "{shape}"),
            Expr::Prim(value) => write!(f, "{value}"),
            Expr::Constant(constant) => write!(f, "const({}: {})", constant.value, constant.dtype),
            Expr::Call(op) => write!(f, "{op}"),
        }
    }
}
