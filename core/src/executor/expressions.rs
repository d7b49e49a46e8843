//! Expression evaluation
//!
//! Evaluation never touches a work queue directly. Calls to interpreted
//! functions push a frame and yield `undefined`; everything else produces
//! its value immediately.

use super::bridge::{ElementProxy, NativeFn};
use super::calls;
use super::errors::{RuntimeError, RuntimeResult};
use super::explain::render_expr;
use super::types::ast::{Expr, LogicalOp, MemberProp, UnaryOp, UpdateOp};
use super::types::values::binary_op;
use super::types::{HostObject, Val};
use super::Interpreter;

/* ===================== Name Resolution ===================== */

/// Look a name up: local scope, global scope, built-in constants, the
/// intercepted host globals, then the surface's own namespace.
pub(crate) fn lookup(it: &Interpreter, name: &str) -> Option<Val> {
    if let Some(v) = it.state.stack.frame(it.active).scope.get(name) {
        return Some(v.clone());
    }
    if let Some(v) = it.state.stack.global().scope.get(name) {
        return Some(v.clone());
    }

    match name {
        "undefined" => Some(Val::Undefined),
        "NaN" => Some(Val::Num(f64::NAN)),
        "Infinity" => Some(Val::Num(f64::INFINITY)),
        "console" => Some(Val::Host(HostObject::Console)),
        "document" if it.surface.is_some() => Some(Val::Host(HostObject::Document)),
        _ => it
            .surface
            .as_ref()
            .and_then(|surface| surface.lock().global(name)),
    }
}

pub(crate) fn resolve(it: &Interpreter, name: &str) -> RuntimeResult<Val> {
    lookup(it, name).ok_or_else(|| RuntimeError::NotDefined(name.to_string()))
}

/// Write to the first scope that already holds `name`, else to global
pub(crate) fn assign_ident(it: &mut Interpreter, name: &str, value: Val) {
    let depth = it.active;
    if it.state.stack.frame(depth).scope.has(name) {
        it.state.stack.frame_mut(depth).scope.assign(name, value);
    } else {
        it.state.stack.global_mut().scope.assign(name, value);
    }
}

/* ===================== Members ===================== */

fn property_key(it: &mut Interpreter, property: &MemberProp) -> RuntimeResult<String> {
    match property {
        MemberProp::Static { name } => Ok(name.clone()),
        MemberProp::Computed { expr } => Ok(eval(it, expr)?.to_js_string()),
    }
}

fn get_member(it: &Interpreter, object: &Val, key: &str) -> RuntimeResult<Val> {
    let native = |func: Option<NativeFn>| {
        func.map(|func| Val::Native { func, this: None })
            .unwrap_or(Val::Undefined)
    };

    Ok(match object {
        Val::Undefined | Val::Null => {
            return Err(RuntimeError::PropertyRead {
                target: object.to_js_string(),
                property: key.to_string(),
            })
        }
        Val::Host(HostObject::Console) => native(NativeFn::console(key)),
        Val::Host(HostObject::Document) => native(NativeFn::document(key)),
        Val::Element(element) => match &it.surface {
            Some(surface) => ElementProxy::new(element, surface).get(key),
            None => Val::Undefined,
        },
        Val::List(items) => match key {
            "length" => Val::Num(items.len() as f64),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Val::Undefined),
        },
        Val::Str(s) => match key {
            "length" => Val::Num(s.encode_utf16().count() as f64),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|i| s.encode_utf16().nth(i))
                .map(|unit| Val::Str(String::from_utf16_lossy(&[unit])))
                .unwrap_or(Val::Undefined),
        },
        Val::Func(def) => match key {
            "name" => Val::Str(def.name.clone().unwrap_or_default()),
            "length" => Val::Num(def.params.len() as f64),
            _ => Val::Undefined,
        },
        _ => Val::Undefined,
    })
}

fn set_member(it: &Interpreter, object: &Val, key: &str, value: &Val) -> RuntimeResult<()> {
    match (object, &it.surface) {
        (Val::Element(element), Some(surface)) => ElementProxy::new(element, surface).set(key, value),
        _ => Err(RuntimeError::PropertyWrite {
            target: object.repr(),
            property: key.to_string(),
        }),
    }
}

/* ===================== Evaluation ===================== */

/// Evaluate an expression in the frame the current step runs in
pub(crate) fn eval(it: &mut Interpreter, expr: &Expr) -> RuntimeResult<Val> {
    match expr {
        Expr::LitBool { v, .. } => Ok(Val::Bool(*v)),
        Expr::LitNum { v, .. } => Ok(Val::Num(*v)),
        Expr::LitStr { v, .. } => Ok(Val::Str(v.clone())),
        Expr::LitNull { .. } => Ok(Val::Null),

        Expr::Ident { name, .. } => resolve(it, name),

        Expr::Member {
            object, property, ..
        } => {
            let object = eval(it, object)?;
            let key = property_key(it, property)?;
            get_member(it, &object, &key)
        }

        Expr::Call { callee, args, .. } => {
            let func = eval(it, callee)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(it, arg)?);
            }
            calls::call_value(it, func, values, None, &render_expr(callee))
        }

        Expr::Binary {
            op, left, right, ..
        } => {
            let l = eval(it, left)?;
            let r = eval(it, right)?;
            Ok(binary_op(*op, &l, &r))
        }

        Expr::Logical {
            op, left, right, ..
        } => {
            let l = eval(it, left)?;
            let short_circuit = match op {
                LogicalOp::And => !l.is_truthy(),
                LogicalOp::Or => l.is_truthy(),
            };
            if short_circuit {
                Ok(l)
            } else {
                eval(it, right)
            }
        }

        Expr::Unary { op, arg, .. } => {
            if let (UnaryOp::TypeOf, Expr::Ident { name, .. }) = (op, arg.as_ref()) {
                let value = lookup(it, name).unwrap_or(Val::Undefined);
                return Ok(Val::Str(value.type_of().to_string()));
            }
            let v = eval(it, arg)?;
            Ok(match op {
                UnaryOp::Not => Val::Bool(!v.is_truthy()),
                UnaryOp::Neg => Val::Num(-v.to_number()),
                UnaryOp::Plus => Val::Num(v.to_number()),
                UnaryOp::TypeOf => Val::Str(v.type_of().to_string()),
            })
        }

        Expr::Update {
            op, prefix, arg, ..
        } => {
            let Expr::Ident { name, .. } = arg.as_ref() else {
                it.diagnostic(format!(
                    "Cannot update {}: only variables can be incremented",
                    render_expr(arg)
                ));
                return Ok(Val::Undefined);
            };
            let old = resolve(it, name)?.to_number();
            let new = match op {
                UpdateOp::Inc => old + 1.0,
                UpdateOp::Dec => old - 1.0,
            };
            assign_ident(it, name, Val::Num(new));
            Ok(Val::Num(if *prefix { new } else { old }))
        }

        Expr::Assign {
            op, target, value, ..
        } => match target.as_ref() {
            Expr::Ident { name, .. } => {
                let result = match op.binary() {
                    Some(bin) => {
                        let current = resolve(it, name)?;
                        binary_op(bin, &current, &eval(it, value)?)
                    }
                    None => eval(it, value)?,
                };
                assign_ident(it, name, result.clone());
                Ok(result)
            }
            Expr::Member {
                object, property, ..
            } => {
                let object = eval(it, object)?;
                let key = property_key(it, property)?;
                let result = match op.binary() {
                    Some(bin) => {
                        let current = get_member(it, &object, &key)?;
                        binary_op(bin, &current, &eval(it, value)?)
                    }
                    None => eval(it, value)?,
                };
                set_member(it, &object, &key, &result)?;
                Ok(result)
            }
            other => Err(RuntimeError::InvalidAssignment(render_expr(other))),
        },

        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => {
            if eval(it, condition)?.is_truthy() {
                eval(it, consequent)
            } else {
                eval(it, alternate)
            }
        }

        Expr::Function { def } => Ok(Val::Func(def.clone())),

        Expr::Unsupported { kind, .. } => {
            it.diagnostic(format!("Skipped unsupported {}", kind));
            Ok(Val::Undefined)
        }
    }
}
