//! Struct-info inference for creation operators.
//!
//! Inference reads operand types from a [`StructInfoEnv`] and never mutates the node. `_like`
//! operators resolve their shape and dtype here, from whatever is known about the source.

use std::collections::HashMap;

use log::trace;

use crate::error::{InferError, InferResult};
use crate::ir::dtype::DType;
use crate::ir::expr::{Expr, PrimValue, ShapeExpr, Var, VarId};
use crate::ir::prim::PrimExpr;
use crate::ir::struct_info::{StructInfo, TensorShape};
use crate::ops::node::CreationOp;

/// What the environment knows about a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarState<'a> {
    Resolved(&'a StructInfo),
    /// Bound, but its own inference failed.
    Failed,
    Unbound,
}

/// Variable-to-struct-info lookup used during inference.
pub trait StructInfoEnv {
    fn var_state(&self, var: &Var) -> VarState<'_>;
}

impl StructInfoEnv for HashMap<VarId, StructInfo> {
    fn var_state(&self, var: &Var) -> VarState<'_> {
        match self.get(&var.id) {
            Some(sinfo) => VarState::Resolved(sinfo),
            None => VarState::Unbound,
        }
    }
}

/// Struct info of an arbitrary operand expression.
pub fn expr_struct_info(
    expr: &Expr,
    env: &dyn StructInfoEnv,
    op: &'static str,
    param: &'static str,
) -> InferResult<StructInfo> {
    match expr {
        Expr::Var(var) => match env.var_state(var) {
            VarState::Resolved(sinfo) => Ok(sinfo.clone()),
            VarState::Failed => Err(InferError::UnresolvedOperand {
                op,
                param,
                var: var.name.to_string(),
            }),
            VarState::Unbound => Err(InferError::UnboundVar(var.name.to_string())),
        },
        Expr::Shape(shape) => Ok(StructInfo::shape(shape.clone())),
        Expr::Prim(value) => Ok(StructInfo::prim_value(value.value.clone())),
        Expr::Constant(constant) => Ok(StructInfo::tensor(
            ShapeExpr::default(),
            Some(constant.dtype),
        )),
        Expr::Call(call) => infer_struct_info(call, env),
    }
}

/// Output struct info of a creation call.
pub fn infer_struct_info(op: &CreationOp, env: &dyn StructInfoEnv) -> InferResult<StructInfo> {
    let name = op.name();
    let sinfo = match op {
        CreationOp::Full {
            shape,
            fill_value,
            dtype,
        } => {
            let shape = shape_operand(shape, env, name)?;
            let fill = fill_value_operand(fill_value, env, name, true)?;
            StructInfo::Tensor {
                shape,
                dtype: dtype.or(fill.dtype()),
            }
        }
        CreationOp::FullLike {
            x,
            fill_value,
            dtype,
        } => {
            let source = tensor_operand(x, env, name, "x")?;
            fill_value_operand(fill_value, env, name, false)?;
            with_dtype(source, *dtype)
        }
        CreationOp::Ones { shape, dtype } | CreationOp::Zeros { shape, dtype } => {
            StructInfo::Tensor {
                shape: shape_operand(shape, env, name)?,
                dtype: Some(*dtype),
            }
        }
        CreationOp::OnesLike { x, dtype } | CreationOp::ZerosLike { x, dtype } => {
            with_dtype(tensor_operand(x, env, name, "x")?, *dtype)
        }
        CreationOp::Eye { n, m, dtype, .. } => {
            let shape = ShapeExpr::new([n.value.clone(), m.value.clone()]);
            StructInfo::tensor(shape, Some(*dtype))
        }
        CreationOp::EyeLike { x, dtype, .. } => {
            let source = tensor_operand(x, env, name, "x")?;
            check_rank(&source, name, |ndim| ndim == 2, "rank 2")?;
            with_dtype(source, *dtype)
        }
        CreationOp::Arange {
            start,
            end,
            step,
            dtype,
        } => {
            let shape = ShapeExpr::new([arange_length(start, end, step)]);
            StructInfo::tensor(shape, Some(*dtype))
        }
        CreationOp::HammingWindow {
            window_size, dtype, ..
        } => {
            if dtype.is_integer() {
                return Err(InferError::IntegerDType { op: name, dtype: *dtype });
            }
            if window_size.value.can_prove_less(1) {
                return Err(InferError::NonPositiveWindow {
                    op: name,
                    window_size: window_size.value.clone(),
                });
            }
            let length = window_size.value.clone().simplify();
            StructInfo::tensor(ShapeExpr::new([length]), Some(*dtype))
        }
        CreationOp::Tril { x, .. } | CreationOp::Triu { x, .. } => {
            let source = tensor_operand(x, env, name, "x")?;
            check_rank(&source, name, |ndim| ndim >= 2, "rank >= 2")?;
            source
        }
    };
    trace!("{name}: inferred {sinfo}");
    Ok(sinfo)
}

/// Number of elements produced by `arange(start, end, step)`.
///
/// Signed-integer bounds use `floordiv(end - start + step - 1, step)`; anything else goes
/// through `ceil` in `f32`. The result is simplified.
pub fn arange_length(start: &PrimValue, end: &PrimValue, step: &PrimValue) -> PrimExpr {
    let (start, end, step) = (start.value.clone(), end.value.clone(), step.value.clone());
    let integral = [&start, &end, &step]
        .iter()
        .all(|value| value.dtype().is_signed_int());
    let length = if integral {
        PrimExpr::floordiv(end - start + step.clone() - PrimExpr::int64(1), step)
    } else {
        PrimExpr::cast(
            DType::Si64,
            PrimExpr::ceil(PrimExpr::cast(DType::F32, end - start) / step),
        )
    };
    length.simplify()
}

fn shape_operand(
    shape: &Expr,
    env: &dyn StructInfoEnv,
    op: &'static str,
) -> InferResult<TensorShape> {
    match expr_struct_info(shape, env, op, "shape")? {
        StructInfo::Shape {
            values: Some(values),
            ..
        } => Ok(TensorShape::Known(values)),
        StructInfo::Shape {
            values: None,
            ndim: Some(ndim),
        } => Ok(TensorShape::Ndim(ndim)),
        StructInfo::Shape { .. } => Ok(TensorShape::Unknown),
        other => Err(InferError::ExpectedShape {
            op,
            param: "shape",
            found: other.to_string(),
        }),
    }
}

fn tensor_operand(
    expr: &Expr,
    env: &dyn StructInfoEnv,
    op: &'static str,
    param: &'static str,
) -> InferResult<StructInfo> {
    let sinfo = expr_struct_info(expr, env, op, param)?;
    if sinfo.is_tensor() {
        Ok(sinfo)
    } else {
        Err(InferError::ExpectedTensor {
            op,
            param,
            found: sinfo.to_string(),
        })
    }
}

/// `full` needs a known rank of zero; `full_like` only rejects a known non-zero rank.
fn fill_value_operand(
    fill_value: &Expr,
    env: &dyn StructInfoEnv,
    op: &'static str,
    require_known_rank: bool,
) -> InferResult<StructInfo> {
    let sinfo = tensor_operand(fill_value, env, op, "fill_value")?;
    match sinfo.ndim() {
        Some(0) => Ok(sinfo),
        None if !require_known_rank => Ok(sinfo),
        Some(ndim) => Err(InferError::FillValueNotScalar {
            op,
            found: format!("rank {ndim}"),
        }),
        None => Err(InferError::FillValueNotScalar {
            op,
            found: "unknown rank".to_string(),
        }),
    }
}

fn check_rank(
    sinfo: &StructInfo,
    op: &'static str,
    accept: impl Fn(usize) -> bool,
    expected: &'static str,
) -> InferResult<()> {
    match sinfo.ndim() {
        Some(ndim) if !accept(ndim) => Err(InferError::RankMismatch { op, expected, ndim }),
        _ => Ok(()),
    }
}

fn with_dtype(source: StructInfo, dtype: Option<DType>) -> StructInfo {
    match (source, dtype) {
        (StructInfo::Tensor { shape, .. }, Some(dtype)) => StructInfo::Tensor {
            shape,
            dtype: Some(dtype),
        },
        (source, _) => source,
    }
}
