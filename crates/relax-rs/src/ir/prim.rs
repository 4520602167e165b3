//! Symbolic scalar expressions used for dimensions and scalar operator attributes.
//!
//! A [`PrimExpr`] always carries a declared dtype. Integer-ness of an expression is read from
//! that declared dtype rather than from any folded value, so `n: si64` is integral even though
//! its runtime value is unknown.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ir::dtype::DType;

/// Named symbolic scalar, e.g. a dynamic batch size `n: si64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimVar {
    name: Arc<str>,
    dtype: DType,
}

impl PrimVar {
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: Arc::<str>::from(name.into()),
            dtype,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

/// Binary operators over scalar expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimBinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
}

impl PrimBinOp {
    fn symbol(self) -> &'static str {
        match self {
            PrimBinOp::Add => "+",
            PrimBinOp::Sub => "-",
            PrimBinOp::Mul => "*",
            PrimBinOp::Div => "/",
            PrimBinOp::FloorDiv => "floordiv",
        }
    }
}

/// Scalar expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimExpr {
    IntImm {
        value: i64,
        dtype: DType,
    },
    FloatImm {
        value: f64,
        dtype: DType,
    },
    Var(PrimVar),
    Binary {
        op: PrimBinOp,
        lhs: Box<PrimExpr>,
        rhs: Box<PrimExpr>,
    },
    Cast {
        dtype: DType,
        value: Box<PrimExpr>,
    },
    Ceil(Box<PrimExpr>),
}

impl PrimExpr {
    /// Integer immediate with the default `si64` index type.
    pub fn int64(value: i64) -> Self {
        PrimExpr::IntImm {
            value,
            dtype: DType::Si64,
        }
    }

    pub fn int(value: i64, dtype: DType) -> Self {
        PrimExpr::IntImm { value, dtype }
    }

    pub fn float32(value: f64) -> Self {
        PrimExpr::FloatImm {
            value,
            dtype: DType::F32,
        }
    }

    pub fn float(value: f64, dtype: DType) -> Self {
        PrimExpr::FloatImm { value, dtype }
    }

    pub fn boolean(value: bool) -> Self {
        PrimExpr::IntImm {
            value: value as i64,
            dtype: DType::Bool,
        }
    }

    pub fn var(name: impl Into<String>, dtype: DType) -> Self {
        PrimExpr::Var(PrimVar::new(name, dtype))
    }

    pub fn binary(op: PrimBinOp, lhs: PrimExpr, rhs: PrimExpr) -> Self {
        PrimExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn floordiv(lhs: PrimExpr, rhs: PrimExpr) -> Self {
        Self::binary(PrimBinOp::FloorDiv, lhs, rhs)
    }

    pub fn cast(dtype: DType, value: PrimExpr) -> Self {
        PrimExpr::Cast {
            dtype,
            value: Box::new(value),
        }
    }

    pub fn ceil(value: PrimExpr) -> Self {
        PrimExpr::Ceil(Box::new(value))
    }

    /// Declared dtype of the expression.
    ///
    /// Mixed integer/float arithmetic promotes to the float operand's dtype; otherwise the
    /// left operand decides.
    pub fn dtype(&self) -> DType {
        match self {
            PrimExpr::IntImm { dtype, .. } | PrimExpr::FloatImm { dtype, .. } => *dtype,
            PrimExpr::Var(var) => var.dtype(),
            PrimExpr::Binary { lhs, rhs, .. } => promote(lhs.dtype(), rhs.dtype()),
            PrimExpr::Cast { dtype, .. } => *dtype,
            PrimExpr::Ceil(value) => value.dtype(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PrimExpr::IntImm { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PrimExpr::FloatImm { value, .. } => Some(*value),
            PrimExpr::IntImm { value, .. } => Some(*value as f64),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, PrimExpr::IntImm { .. } | PrimExpr::FloatImm { .. })
    }

    /// Returns `true` only when the simplified expression is a constant below `bound`.
    pub fn can_prove_less(&self, bound: i64) -> bool {
        match self.clone().simplify() {
            PrimExpr::IntImm { value, .. } => value < bound,
            PrimExpr::FloatImm { value, .. } => value < bound as f64,
            _ => false,
        }
    }

    /// Folds constants and removes arithmetic identities.
    pub fn simplify(self) -> Self {
        match self {
            PrimExpr::Binary { op, lhs, rhs } => {
                simplify_binary(op, lhs.simplify(), rhs.simplify())
            }
            PrimExpr::Cast { dtype, value } => match value.simplify() {
                PrimExpr::IntImm { value, .. } if dtype.is_float() => PrimExpr::FloatImm {
                    value: value as f64,
                    dtype,
                },
                PrimExpr::IntImm { value, .. } if fits_int(value, dtype) => {
                    PrimExpr::IntImm { value, dtype }
                }
                PrimExpr::FloatImm { value, .. } if dtype.is_float() => {
                    PrimExpr::FloatImm { value, dtype }
                }
                inner @ PrimExpr::FloatImm { value, .. } => match truncate_float(value) {
                    Some(value) if fits_int(value, dtype) => PrimExpr::IntImm { value, dtype },
                    _ => PrimExpr::cast(dtype, inner),
                },
                inner if inner.dtype() == dtype => inner,
                inner => PrimExpr::cast(dtype, inner),
            },
            PrimExpr::Ceil(value) => match value.simplify() {
                PrimExpr::FloatImm { value, dtype } => PrimExpr::FloatImm {
                    value: value.ceil(),
                    dtype,
                },
                inner @ PrimExpr::IntImm { .. } => inner,
                inner => PrimExpr::ceil(inner),
            },
            other => other,
        }
    }
}

fn promote(lhs: DType, rhs: DType) -> DType {
    if !lhs.is_float() && rhs.is_float() {
        rhs
    } else {
        lhs
    }
}

fn is_int_value(expr: &PrimExpr, expected: i64) -> bool {
    matches!(expr, PrimExpr::IntImm { value, .. } if *value == expected)
}

/// Whether `value` is representable in the integer (or bool) `dtype`.
fn fits_int(value: i64, dtype: DType) -> bool {
    match dtype {
        DType::Bool => matches!(value, 0 | 1),
        dtype if dtype.is_signed_int() => {
            let bits = dtype.bitwidth() as u32;
            bits >= 64 || (-(1i64 << (bits - 1))..(1i64 << (bits - 1))).contains(&value)
        }
        dtype if dtype.is_unsigned_int() => {
            let bits = dtype.bitwidth() as u32;
            value >= 0 && (bits >= 64 || value < (1i64 << bits))
        }
        _ => false,
    }
}

fn truncate_float(value: f64) -> Option<i64> {
    let value = value.trunc();
    // 2^63 is exactly representable; anything at or above it does not fit.
    let limit = 9_223_372_036_854_775_808.0_f64;
    (value.is_finite() && value >= -limit && value < limit).then_some(value as i64)
}

/// `None` on division by zero or `i64::MIN / -1`.
fn floor_div_i64(lhs: i64, rhs: i64) -> Option<i64> {
    let quot = lhs.checked_div(rhs)?;
    let rem = lhs.checked_rem(rhs)?;
    if rem != 0 && ((rem < 0) != (rhs < 0)) {
        quot.checked_sub(1)
    } else {
        Some(quot)
    }
}

fn fold_ints(op: PrimBinOp, lhs: i64, rhs: i64) -> Option<i64> {
    match op {
        PrimBinOp::Add => lhs.checked_add(rhs),
        PrimBinOp::Sub => lhs.checked_sub(rhs),
        PrimBinOp::Mul => lhs.checked_mul(rhs),
        PrimBinOp::Div => lhs.checked_div(rhs),
        PrimBinOp::FloorDiv => floor_div_i64(lhs, rhs),
    }
}

fn fold_floats(op: PrimBinOp, lhs: f64, rhs: f64) -> Option<f64> {
    match op {
        PrimBinOp::Add => Some(lhs + rhs),
        PrimBinOp::Sub => Some(lhs - rhs),
        PrimBinOp::Mul => Some(lhs * rhs),
        PrimBinOp::Div if rhs != 0.0 => Some(lhs / rhs),
        PrimBinOp::FloorDiv if rhs != 0.0 => Some((lhs / rhs).floor()),
        PrimBinOp::Div | PrimBinOp::FloorDiv => None,
    }
}

/// Pulls a constant offset off `x + c` / `x - c`.
fn split_offset(expr: &PrimExpr) -> Option<(&PrimExpr, i64)> {
    match expr {
        PrimExpr::Binary {
            op: PrimBinOp::Add,
            lhs,
            rhs,
        } => rhs.as_int().filter(|_| !rhs.dtype().is_float()).map(|c| (&**lhs, c)),
        PrimExpr::Binary {
            op: PrimBinOp::Sub,
            lhs,
            rhs,
        } => rhs
            .as_int()
            .filter(|_| !rhs.dtype().is_float())
            .and_then(|c| c.checked_neg())
            .map(|c| (&**lhs, c)),
        _ => None,
    }
}

fn with_offset(base: PrimExpr, offset: i64, dtype: DType) -> PrimExpr {
    match offset {
        0 => base,
        c if c > 0 => PrimExpr::binary(PrimBinOp::Add, base, PrimExpr::int(c, dtype)),
        c => match c.checked_neg() {
            Some(neg) => PrimExpr::binary(PrimBinOp::Sub, base, PrimExpr::int(neg, dtype)),
            None => PrimExpr::binary(PrimBinOp::Add, base, PrimExpr::int(c, dtype)),
        },
    }
}

fn simplify_binary(op: PrimBinOp, lhs: PrimExpr, rhs: PrimExpr) -> PrimExpr {
    let dtype = promote(lhs.dtype(), rhs.dtype());

    match (&lhs, &rhs) {
        (PrimExpr::IntImm { value: l, .. }, PrimExpr::IntImm { value: r, .. })
            if !dtype.is_float() =>
        {
            if let Some(value) = fold_ints(op, *l, *r) {
                return PrimExpr::IntImm { value, dtype };
            }
        }
        (l, r) if dtype.is_float() && l.is_const() && r.is_const() => {
            let folded = l
                .as_float()
                .zip(r.as_float())
                .and_then(|(l, r)| fold_floats(op, l, r));
            if let Some(value) = folded {
                return PrimExpr::FloatImm { value, dtype };
            }
        }
        _ => {}
    }

    let integral = !dtype.is_float();
    match op {
        PrimBinOp::Add if integral && is_int_value(&rhs, 0) => return lhs,
        PrimBinOp::Add if integral && is_int_value(&lhs, 0) => return rhs,
        PrimBinOp::Sub if integral && is_int_value(&rhs, 0) => return lhs,
        PrimBinOp::Sub if integral && lhs == rhs => return PrimExpr::int(0, dtype),
        PrimBinOp::Mul if integral && (is_int_value(&lhs, 0) || is_int_value(&rhs, 0)) => {
            return PrimExpr::int(0, dtype)
        }
        PrimBinOp::Mul if is_int_value(&rhs, 1) => return lhs,
        PrimBinOp::Mul if is_int_value(&lhs, 1) => return rhs,
        PrimBinOp::Div | PrimBinOp::FloorDiv if is_int_value(&rhs, 1) => return lhs,
        _ => {}
    }

    if integral && matches!(op, PrimBinOp::Add | PrimBinOp::Sub) {
        if let (Some((base, inner)), Some(outer)) = (split_offset(&lhs), rhs.as_int()) {
            let outer = if op == PrimBinOp::Add {
                Some(outer)
            } else {
                outer.checked_neg()
            };
            if let Some(total) = outer.and_then(|outer| inner.checked_add(outer)) {
                return with_offset(base.clone(), total, dtype);
            }
        }
    }

    PrimExpr::binary(op, lhs, rhs)
}

impl Add for PrimExpr {
    type Output = PrimExpr;

    fn add(self, rhs: PrimExpr) -> PrimExpr {
        PrimExpr::binary(PrimBinOp::Add, self, rhs)
    }
}

impl Sub for PrimExpr {
    type Output = PrimExpr;

    fn sub(self, rhs: PrimExpr) -> PrimExpr {
        PrimExpr::binary(PrimBinOp::Sub, self, rhs)
    }
}

impl Mul for PrimExpr {
    type Output = PrimExpr;

    fn mul(self, rhs: PrimExpr) -> PrimExpr {
        PrimExpr::binary(PrimBinOp::Mul, self, rhs)
    }
}

impl Div for PrimExpr {
    type Output = PrimExpr;

    fn div(self, rhs: PrimExpr) -> PrimExpr {
        PrimExpr::binary(PrimBinOp::Div, self, rhs)
    }
}

impl From<i64> for PrimExpr {
    fn from(value: i64) -> Self {
        PrimExpr::int64(value)
    }
}

impl From<PrimVar> for PrimExpr {
    fn from(var: PrimVar) -> Self {
        PrimExpr::Var(var)
    }
}

impl fmt::Display for PrimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimExpr::IntImm {
                value,
                dtype: DType::Bool,
            } => write!(f, "{}", *value != 0),
            PrimExpr::IntImm { value, .. } => write!(f, "{value}"),
            PrimExpr::FloatImm { value, .. } => write!(f, "{value:?}"),
            PrimExpr::Var(var) => f.write_str(var.name()),
            PrimExpr::Binary { op, lhs, rhs } => match op {
                PrimBinOp::Add | PrimBinOp::Sub | PrimBinOp::Mul | PrimBinOp::Div => {
                    write!(f, "({lhs} {} {rhs})", op.symbol())
                }
                PrimBinOp::FloorDiv => write!(f, "{}({lhs}, {rhs})", op.symbol()),
            },
            PrimExpr::Cast { dtype, value } => write!(f, "{dtype}({value})"),
            PrimExpr::Ceil(value) => write!(f, "ceil({value})"),
        }
    }
}
