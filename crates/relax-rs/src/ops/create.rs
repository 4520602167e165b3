//! Builders for tensor creation operators.
//!
//! Builders only normalize arguments and resolve the dtype. Shape validation (ranks,
//! non-negative sizes, operand struct info) happens in [`crate::ops::infer`].

use log::trace;

use crate::error::{BuildError, BuildResult};
use crate::ir::dtype::DType;
use crate::ir::expr::{Expr, PrimValue};
use crate::ops::node::{CreationOp, OpKind};
use crate::ops::resolve::resolve_dtype;
use crate::value::{fill_operand, shape_operand, tensor_operand, Arg};

fn finish(op: CreationOp) -> Expr {
    trace!("built {op}");
    Expr::from(op)
}

pub(crate) fn required_dtype(kind: OpKind, explicit: Option<DType>) -> BuildResult<DType> {
    resolve_dtype(kind, explicit, &[])?.ok_or(BuildError::MissingDType { op: kind.name() })
}

fn prim(arg: impl Into<Arg>, kind: OpKind, param: &'static str) -> BuildResult<PrimValue> {
    PrimValue::from_arg(arg.into(), kind.name(), param)
}

/// Tensor of `shape` filled with `fill_value`. Without `dtype` the fill value's dtype is used.
pub fn full(
    shape: impl Into<Arg>,
    fill_value: impl Into<Arg>,
    dtype: Option<DType>,
) -> BuildResult<Expr> {
    let op = OpKind::Full.name();
    let shape = shape_operand(shape.into(), op, "shape")?;
    let fill_value = fill_operand(fill_value.into(), op, "fill_value")?;
    let dtype = resolve_dtype(OpKind::Full, dtype, &[])?;
    Ok(finish(CreationOp::Full {
        shape,
        fill_value,
        dtype,
    }))
}

/// Tensor shaped like `x` filled with `fill_value`.
pub fn full_like(
    x: impl Into<Arg>,
    fill_value: impl Into<Arg>,
    dtype: Option<DType>,
) -> BuildResult<Expr> {
    let op = OpKind::FullLike.name();
    let x = tensor_operand(x.into(), op, "x")?;
    let fill_value = fill_operand(fill_value.into(), op, "fill_value")?;
    let dtype = resolve_dtype(OpKind::FullLike, dtype, &[])?;
    Ok(finish(CreationOp::FullLike {
        x,
        fill_value,
        dtype,
    }))
}

pub fn ones(shape: impl Into<Arg>, dtype: DType) -> BuildResult<Expr> {
    let shape = shape_operand(shape.into(), OpKind::Ones.name(), "shape")?;
    let dtype = required_dtype(OpKind::Ones, Some(dtype))?;
    Ok(finish(CreationOp::Ones { shape, dtype }))
}

pub fn ones_like(x: impl Into<Arg>, dtype: Option<DType>) -> BuildResult<Expr> {
    let x = tensor_operand(x.into(), OpKind::OnesLike.name(), "x")?;
    let dtype = resolve_dtype(OpKind::OnesLike, dtype, &[])?;
    Ok(finish(CreationOp::OnesLike { x, dtype }))
}

pub fn zeros(shape: impl Into<Arg>, dtype: DType) -> BuildResult<Expr> {
    let shape = shape_operand(shape.into(), OpKind::Zeros.name(), "shape")?;
    let dtype = required_dtype(OpKind::Zeros, Some(dtype))?;
    Ok(finish(CreationOp::Zeros { shape, dtype }))
}

pub fn zeros_like(x: impl Into<Arg>, dtype: Option<DType>) -> BuildResult<Expr> {
    let x = tensor_operand(x.into(), OpKind::ZerosLike.name(), "x")?;
    let dtype = resolve_dtype(OpKind::ZerosLike, dtype, &[])?;
    Ok(finish(CreationOp::ZerosLike { x, dtype }))
}

/// 2-D tensor with ones on the `k`-th diagonal. `m` defaults to `n`.
///
/// `n` is coerced once and reused for `m`, so both dimensions are the same value.
pub fn eye(
    n: impl Into<Arg>,
    m: Option<Arg>,
    k: impl Into<Arg>,
    dtype: DType,
) -> BuildResult<Expr> {
    let n = prim(n, OpKind::Eye, "n")?;
    let m = match m {
        Some(m) => prim(m, OpKind::Eye, "m")?,
        None => n.clone(),
    };
    let k = prim(k, OpKind::Eye, "k")?;
    let dtype = required_dtype(OpKind::Eye, Some(dtype))?;
    Ok(finish(CreationOp::Eye { n, m, k, dtype }))
}

pub fn eye_like(x: impl Into<Arg>, k: impl Into<Arg>, dtype: Option<DType>) -> BuildResult<Expr> {
    let x = tensor_operand(x.into(), OpKind::EyeLike.name(), "x")?;
    let k = prim(k, OpKind::EyeLike, "k")?;
    let dtype = resolve_dtype(OpKind::EyeLike, dtype, &[])?;
    Ok(finish(CreationOp::EyeLike { x, k, dtype }))
}

/// Evenly spaced values in `[start, end)`.
///
/// With `end` omitted the call is read as `arange(0, start, step)`. The shift happens before
/// dtype inference so the shifted values are the ones inspected.
pub fn arange(
    start: impl Into<Arg>,
    end: Option<Arg>,
    step: impl Into<Arg>,
    dtype: Option<DType>,
) -> BuildResult<Expr> {
    let (start, end) = match end {
        Some(end) => (start.into(), end),
        None => (Arg::Int(0), start.into()),
    };
    let start = prim(start, OpKind::Arange, "start")?;
    let end = prim(end, OpKind::Arange, "end")?;
    let step = prim(step, OpKind::Arange, "step")?;
    let dtype = resolve_dtype(OpKind::Arange, dtype, &[&start, &end, &step])?
        .ok_or(BuildError::MissingDType {
            op: OpKind::Arange.name(),
        })?;
    Ok(finish(CreationOp::Arange {
        start,
        end,
        step,
        dtype,
    }))
}

pub fn hamming_window(
    window_size: impl Into<Arg>,
    periodic: impl Into<Arg>,
    alpha: impl Into<Arg>,
    beta: impl Into<Arg>,
    dtype: DType,
) -> BuildResult<Expr> {
    let kind = OpKind::HammingWindow;
    let window_size = prim(window_size, kind, "window_size")?;
    let periodic = prim(periodic, kind, "periodic")?;
    let alpha = prim(alpha, kind, "alpha")?;
    let beta = prim(beta, kind, "beta")?;
    let dtype = required_dtype(kind, Some(dtype))?;
    Ok(finish(CreationOp::HammingWindow {
        window_size,
        periodic,
        alpha,
        beta,
        dtype,
    }))
}

/// Lower triangle of `x`; elements above the `k`-th diagonal are zeroed.
pub fn tril(x: impl Into<Arg>, k: impl Into<Arg>) -> BuildResult<Expr> {
    let x = tensor_operand(x.into(), OpKind::Tril.name(), "x")?;
    let k = prim(k, OpKind::Tril, "k")?;
    Ok(finish(CreationOp::Tril { x, k }))
}

/// Upper triangle of `x`; elements below the `k`-th diagonal are zeroed.
pub fn triu(x: impl Into<Arg>, k: impl Into<Arg>) -> BuildResult<Expr> {
    let x = tensor_operand(x.into(), OpKind::Triu.name(), "x")?;
    let k = prim(k, OpKind::Triu, "k")?;
    Ok(finish(CreationOp::Triu { x, k }))
}
