//! Structural type information attached to IR values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::dtype::DType;
use crate::ir::expr::{join_dims, ShapeExpr};
use crate::ir::prim::PrimExpr;

/// What is known about a tensor's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TensorShape {
    Known(ShapeExpr),
    Ndim(usize),
    Unknown,
}

impl TensorShape {
    pub fn ndim(&self) -> Option<usize> {
        match self {
            TensorShape::Known(shape) => Some(shape.rank()),
            TensorShape::Ndim(ndim) => Some(*ndim),
            TensorShape::Unknown => None,
        }
    }

    pub fn known(&self) -> Option<&ShapeExpr> {
        match self {
            TensorShape::Known(shape) => Some(shape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructInfo {
    Prim {
        dtype: DType,
        value: Option<PrimExpr>,
    },
    Shape {
        values: Option<ShapeExpr>,
        ndim: Option<usize>,
    },
    Tensor {
        shape: TensorShape,
        dtype: Option<DType>,
    },
}

impl StructInfo {
    pub fn tensor(shape: impl Into<ShapeExpr>, dtype: Option<DType>) -> Self {
        StructInfo::Tensor {
            shape: TensorShape::Known(shape.into()),
            dtype,
        }
    }

    pub fn tensor_ndim(ndim: usize, dtype: Option<DType>) -> Self {
        StructInfo::Tensor {
            shape: TensorShape::Ndim(ndim),
            dtype,
        }
    }

    pub fn tensor_unknown(dtype: Option<DType>) -> Self {
        StructInfo::Tensor {
            shape: TensorShape::Unknown,
            dtype,
        }
    }

    pub fn shape(values: impl Into<ShapeExpr>) -> Self {
        let values = values.into();
        StructInfo::Shape {
            ndim: Some(values.rank()),
            values: Some(values),
        }
    }

    pub fn shape_ndim(ndim: Option<usize>) -> Self {
        StructInfo::Shape { values: None, ndim }
    }

    pub fn prim(dtype: DType) -> Self {
        StructInfo::Prim { dtype, value: None }
    }

    pub fn prim_value(value: PrimExpr) -> Self {
        StructInfo::Prim {
            dtype: value.dtype(),
            value: Some(value),
        }
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self, StructInfo::Tensor { .. })
    }

    /// Tensor rank when it is known.
    pub fn ndim(&self) -> Option<usize> {
        match self {
            StructInfo::Tensor { shape, .. } => shape.ndim(),
            _ => None,
        }
    }

    /// Tensor element dtype when it is known.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            StructInfo::Tensor { dtype, .. } => *dtype,
            StructInfo::Prim { dtype, .. } => Some(*dtype),
            _ => None,
        }
    }

    pub fn tensor_shape(&self) -> Option<&TensorShape> {
        match self {
            StructInfo::Tensor { shape, .. } => Some(shape),
            _ => None,
        }
    }
}

fn fmt_dtype(dtype: Option<DType>) -> String {
    dtype.map_or_else(|| "?".to_string(), |dtype| dtype.to_string())
}

impl fmt::Display for StructInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructInfo::Prim { dtype, value: None } => write!(f, "prim<{dtype}>"),
            StructInfo::Prim {
                dtype,
                value: Some(value),
            } => write!(f, "prim<{dtype} = {value}>"),
            StructInfo::Shape {
                values: Some(values),
                ..
            } => write!(f, "shape<[{}]>", join_dims(values.values())),
            StructInfo::Shape {
                values: None,
                ndim: Some(ndim),
            } => write!(f, "shape<ndim={ndim}>"),
            StructInfo::Shape {
                values: None,
                ndim: None,
            } => f.write_str("shape<?>"),
            StructInfo::Tensor { shape, dtype } => {
                let dtype = fmt_dtype(*dtype);
                match shape {
                    TensorShape::Known(shape) if shape.rank() == 0 => {
                        write!(f, "tensor<{dtype}, scalar>")
                    }
                    TensorShape::Known(shape) => {
                        let dims = shape
                            .values()
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("x");
                        write!(f, "tensor<{dtype} x {dims}>")
                    }
                    TensorShape::Ndim(ndim) => write!(f, "tensor<{dtype}, ndim={ndim}>"),
                    TensorShape::Unknown => write!(f, "tensor<{dtype}>"),
                }
            }
        }
    }
}
