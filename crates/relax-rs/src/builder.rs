//! Bottom-up construction of a [`Function`].

use std::collections::HashMap;

use log::{debug, trace};

use crate::error::{InferError, InferResult};
use crate::ir::expr::{Expr, Var, VarId};
use crate::ir::function::{Binding, Function, Param};
use crate::ir::struct_info::StructInfo;
use crate::ops::infer::expr_struct_info;

/// One program-construction session. Operands must exist before the binding that uses them.
#[derive(Debug)]
pub struct BlockBuilder {
    function: Function,
    next_var_id: u32,
    struct_info: HashMap<VarId, StructInfo>,
}

impl BlockBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            function: Function::new(name),
            next_var_id: 0,
            struct_info: HashMap::new(),
        }
    }

    fn fresh_var(&mut self, name: impl Into<String>) -> Var {
        let var = Var::new(VarId(self.next_var_id), name);
        self.next_var_id += 1;
        var
    }

    pub fn add_param(&mut self, name: impl Into<String>, struct_info: StructInfo) -> Var {
        let var = self.fresh_var(name);
        trace!("param %{}: {struct_info}", var.name);
        self.struct_info.insert(var.id, struct_info.clone());
        self.function.params.push(Param {
            var: var.clone(),
            struct_info,
        });
        var
    }

    /// Binds `expr` without running inference; the pass resolves it later.
    pub fn bind(&mut self, name: impl Into<String>, expr: Expr) -> Var {
        let var = self.fresh_var(name);
        trace!("bind %{} = {expr}", var.name);
        self.function.bindings.push(Binding {
            var: var.clone(),
            value: expr,
            struct_info: None,
        });
        var
    }

    /// Binds `expr` and infers its struct info immediately.
    ///
    /// On failure nothing is bound and the inference error is returned.
    pub fn emit(&mut self, name: impl Into<String>, expr: Expr) -> InferResult<Var> {
        let sinfo = self.normalize(&expr)?;
        let var = self.fresh_var(name);
        debug!("emit %{} = {expr} : {sinfo}", var.name);
        self.struct_info.insert(var.id, sinfo.clone());
        self.function.bindings.push(Binding {
            var: var.clone(),
            value: expr,
            struct_info: Some(sinfo),
        });
        Ok(var)
    }

    /// Struct info of `expr` given what this session knows so far.
    pub fn normalize(&self, expr: &Expr) -> InferResult<StructInfo> {
        expr_struct_info(expr, &self.struct_info, "normalize", "expr")
    }

    pub fn struct_info(&self, var: &Var) -> Option<&StructInfo> {
        self.struct_info.get(&var.id)
    }

    pub fn finish(mut self, outputs: impl IntoIterator<Item = Var>) -> InferResult<Function> {
        self.function.outputs = outputs.into_iter().collect();
        let declared = |id: VarId| {
            self.function.param(id).is_some() || self.function.binding(id).is_some()
        };
        if let Some(unknown) = self.function.outputs.iter().find(|var| !declared(var.id)) {
            return Err(InferError::UnboundVar(unknown.name.to_string()));
        }
        Ok(self.function)
    }
}
