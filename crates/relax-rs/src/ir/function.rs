//! Functions: parameters, an ordered list of bindings, and outputs.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::expr::{Expr, Var, VarId};
use crate::ir::struct_info::StructInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub var: Var,
    pub struct_info: StructInfo,
}

/// `var = value`. `struct_info` is filled once inference has run on the binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub var: Var,
    pub value: Expr,
    #[serde(default)]
    pub struct_info: Option<StructInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub bindings: Vec<Binding>,
    pub outputs: Vec<Var>,
}

#[derive(Debug, Error)]
pub enum FunctionSerdeError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            bindings: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn binding(&self, id: VarId) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.var.id == id)
    }

    pub fn param(&self, id: VarId) -> Option<&Param> {
        self.params.iter().find(|param| param.var.id == id)
    }

    /// Known struct info of a parameter or an annotated binding.
    pub fn struct_info(&self, id: VarId) -> Option<&StructInfo> {
        self.param(id)
            .map(|param| &param.struct_info)
            .or_else(|| self.binding(id).and_then(|binding| binding.struct_info.as_ref()))
    }

    pub fn to_json_string(&self) -> Result<String, FunctionSerdeError> {
        serde_json::to_string_pretty(self).map_err(FunctionSerdeError::from)
    }

    pub fn from_json_str(src: &str) -> Result<Self, FunctionSerdeError> {
        serde_json::from_str(src).map_err(FunctionSerdeError::from)
    }

    pub fn to_bincode_bytes(&self) -> Result<Vec<u8>, FunctionSerdeError> {
        bincode::serialize(self).map_err(FunctionSerdeError::from)
    }

    pub fn from_bincode_slice(bytes: &[u8]) -> Result<Self, FunctionSerdeError> {
        bincode::deserialize(bytes).map_err(FunctionSerdeError::from)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_json_string()?;
        fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Function::from_json_str(&contents)
            .with_context(|| format!("failed to parse function from {}", path.display()))
    }

    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bincode_bytes()?;
        fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Function::from_bincode_slice(&bytes)
            .with_context(|| format!("failed to decode function from {}", path.display()))
    }

    pub fn to_text(&self) -> String {
        format!("{self}")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|param| format!("%{}: {}", param.var.name, param.struct_info))
            .collect::<Vec<_>>()
            .join(", ");
        write_line(f, 0, &format!("func @{}({params}) {{", self.name))?;
        for binding in &self.bindings {
            fmt_binding(binding, 1, f)?;
        }
        let outputs = self
            .outputs
            .iter()
            .map(|var| format!("%{}", var.name))
            .collect::<Vec<_>>()
            .join(", ");
        write_line(f, 1, &format!("return ({outputs})"))?;
        write_line(f, 0, "}")
    }
}

fn fmt_binding(binding: &Binding, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let line = match &binding.struct_info {
        Some(sinfo) => format!("%{} = {} : {sinfo}", binding.var.name, binding.value),
        None => format!("%{} = {}", binding.var.name, binding.value),
    };
    write_line(f, indent, &line)
}

fn write_line(f: &mut fmt::Formatter<'_>, indent: usize, line: &str) -> fmt::Result {
    for _ in 0..indent {
        f.write_str("  ")?;
    }
    writeln!(f, "{line}")
}
