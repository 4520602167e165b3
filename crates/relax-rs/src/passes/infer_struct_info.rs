use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::config::InferenceConfig;
use crate::error::InferError;
use crate::ir::expr::{Expr, Var, VarId};
use crate::ir::function::Function;
use crate::ir::struct_info::StructInfo;
use crate::ops::infer::{expr_struct_info, StructInfoEnv, VarState};

/// A failed binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub var: Var,
    pub error: InferError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceReport {
    pub struct_info: HashMap<VarId, StructInfo>,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when inference stopped at the first diagnostic.
    pub aborted: bool,
}

impl InferenceReport {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn get(&self, var: &Var) -> Option<&StructInfo> {
        self.struct_info.get(&var.id)
    }

    pub fn error_for(&self, var: &Var) -> Option<&InferError> {
        self.diagnostics
            .iter()
            .find(|diag| diag.var.id == var.id)
            .map(|diag| &diag.error)
    }

    /// Returns `function` with every inferred binding annotated.
    pub fn annotate(&self, mut function: Function) -> Function {
        for binding in &mut function.bindings {
            binding.struct_info = self.struct_info.get(&binding.var.id).cloned();
        }
        function
    }
}

#[derive(Default)]
struct PassEnv {
    resolved: HashMap<VarId, StructInfo>,
    failed: HashSet<VarId>,
}

impl StructInfoEnv for PassEnv {
    fn var_state(&self, var: &Var) -> VarState<'_> {
        if let Some(sinfo) = self.resolved.get(&var.id) {
            VarState::Resolved(sinfo)
        } else if self.failed.contains(&var.id) {
            VarState::Failed
        } else {
            VarState::Unbound
        }
    }
}

/// Infers struct info for every binding of a function in order.
///
/// A failing binding is recorded and the walk continues; bindings that depend on it report an
/// unresolved operand. With `fail_fast` the walk stops at the first failure.
#[derive(Debug, Clone, Default)]
pub struct InferStructInfoPass {
    config: InferenceConfig,
}

impl InferStructInfoPass {
    pub const NAME: &'static str = "infer-struct-info";

    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn run(&self, function: &Function) -> InferenceReport {
        let mut env = PassEnv::default();
        for param in &function.params {
            env.resolved.insert(param.var.id, param.struct_info.clone());
        }

        let mut report = InferenceReport::default();
        for binding in &function.bindings {
            match infer_binding(&binding.value, &env) {
                Ok(sinfo) => {
                    debug!("%{}: {sinfo}", binding.var.name);
                    env.resolved.insert(binding.var.id, sinfo);
                }
                Err(error) => {
                    warn!("%{}: {error}", binding.var.name);
                    env.failed.insert(binding.var.id);
                    report.diagnostics.push(Diagnostic {
                        var: binding.var.clone(),
                        error,
                    });
                    if self.config.fail_fast {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }
        report.struct_info = env.resolved;
        report
    }
}

fn infer_binding(value: &Expr, env: &PassEnv) -> Result<StructInfo, InferError> {
    expr_struct_info(value, env, "bind", "value")
}
