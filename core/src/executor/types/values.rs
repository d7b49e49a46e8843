//! Runtime value types and JavaScript conversions

use serde::{Deserialize, Serialize};

use super::ast::{BinaryOp, FunctionDef};
use crate::executor::bridge::{ElementRef, NativeFn};

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    /// List-like host results (e.g. `querySelectorAll`)
    List(Vec<Val>),
    /// An interpreted function: the AST node is the callable value
    Func(Box<FunctionDef>),
    /// A host built-in, optionally bound to its receiver
    Native {
        func: NativeFn,
        this: Option<Box<Val>>,
    },
    /// One of the intercepted host globals (`console`, `document`)
    Host(HostObject),
    /// A live element wrapped by the host bridge
    Element(ElementRef),
}

/// Intercepted global objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostObject {
    Console,
    Document,
}

impl Val {
    /// Check if value is truthy (ToBoolean)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Undefined | Val::Null => false,
            Val::Bool(b) => *b,
            Val::Num(n) => *n != 0.0 && !n.is_nan(),
            Val::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// ToNumber
    pub fn to_number(&self) -> f64 {
        match self {
            Val::Undefined => f64::NAN,
            Val::Null => 0.0,
            Val::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Val::Num(n) => *n,
            Val::Str(s) => parse_number(s),
            Val::List(items) => match items.as_slice() {
                [] => 0.0,
                [single] => Val::Str(single.to_js_string()).to_number(),
                _ => f64::NAN,
            },
            _ => f64::NAN,
        }
    }

    /// ToString, as used by `+` and `console.log`
    pub fn to_js_string(&self) -> String {
        match self {
            Val::Undefined => "undefined".to_string(),
            Val::Null => "null".to_string(),
            Val::Bool(b) => b.to_string(),
            Val::Num(n) => number_to_string(*n),
            Val::Str(s) => s.clone(),
            Val::List(items) => items
                .iter()
                .map(|v| match v {
                    Val::Undefined | Val::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Val::Func(def) => function_source(def),
            Val::Native { func, .. } => format!("function {}() {{ [native code] }}", func.name()),
            Val::Host(HostObject::Console) => "[object console]".to_string(),
            Val::Host(HostObject::Document) => "[object HTMLDocument]".to_string(),
            Val::Element(_) => "[object HTMLElement]".to_string(),
        }
    }

    /// Display form for bindings and return logs: strings are quoted
    pub fn repr(&self) -> String {
        match self {
            Val::Str(s) => format!("{:?}", s),
            Val::List(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.repr()).collect();
                format!("[{}]", inner.join(", "))
            }
            Val::Element(el) => el.describe(),
            other => other.to_js_string(),
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Val::Undefined => "undefined",
            Val::Null => "object",
            Val::Bool(_) => "boolean",
            Val::Num(_) => "number",
            Val::Str(_) => "string",
            Val::Func(_) | Val::Native { .. } => "function",
            Val::List(_) | Val::Host(_) | Val::Element(_) => "object",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Val::Func(_) | Val::Native { .. })
    }

    /// Display label derived from the value's runtime shape
    pub fn label(&self) -> Option<String> {
        match self {
            Val::Element(_) => Some("element".to_string()),
            Val::List(items) if !items.is_empty() && items.iter().all(|v| matches!(v, Val::Element(_))) => {
                Some(format!("NodeList ({})", items.len()))
            }
            Val::List(items) => Some(format!("list ({})", items.len())),
            Val::Func(_) | Val::Native { .. } => Some("function".to_string()),
            _ => None,
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Val) -> bool {
        match (self, other) {
            (Val::Undefined, Val::Undefined) => true,
            (Val::Null, Val::Null) => true,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Num(a), Val::Num(b)) => a == b,
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::Element(a), Val::Element(b)) => a.node == b.node,
            (Val::Host(a), Val::Host(b)) => a == b,
            (Val::Func(a), Val::Func(b)) => a.span == b.span && a == b,
            (Val::Native { func: a, this: ta }, Val::Native { func: b, this: tb }) => {
                a == b && ta == tb
            }
            // Lists are host results, each one a distinct object
            _ => false,
        }
    }

    /// Loose equality (==)
    pub fn loose_equals(&self, other: &Val) -> bool {
        if std::mem::discriminant(self) == std::mem::discriminant(other) {
            return self.strict_equals(other);
        }

        match (self, other) {
            (Val::Null, Val::Undefined) | (Val::Undefined, Val::Null) => true,
            (Val::Num(a), Val::Str(_)) => *a == other.to_number(),
            (Val::Str(_), Val::Num(b)) => self.to_number() == *b,
            (Val::Bool(_), _) => Val::Num(self.to_number()).loose_equals(other),
            (_, Val::Bool(_)) => self.loose_equals(&Val::Num(other.to_number())),
            (Val::List(_), Val::Num(_) | Val::Str(_)) => {
                Val::Str(self.to_js_string()).loose_equals(other)
            }
            (Val::Num(_) | Val::Str(_), Val::List(_)) => {
                self.loose_equals(&Val::Str(other.to_js_string()))
            }
            _ => false,
        }
    }

    /// Convert a JSON value (fixtures, host properties) into a runtime value
    pub fn from_json(value: &serde_json::Value) -> Val {
        match value {
            serde_json::Value::Null => Val::Null,
            serde_json::Value::Bool(b) => Val::Bool(*b),
            serde_json::Value::Number(n) => Val::Num(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Val::Str(s.clone()),
            serde_json::Value::Array(items) => Val::List(items.iter().map(Val::from_json).collect()),
            serde_json::Value::Object(_) => Val::Str(value.to_string()),
        }
    }

    /// Convert a runtime value into JSON for a host property store
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Val::Undefined | Val::Null => serde_json::Value::Null,
            Val::Bool(b) => serde_json::Value::Bool(*b),
            Val::Num(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(number_to_string(*n))),
            Val::Str(s) => serde_json::Value::String(s.clone()),
            Val::List(items) => serde_json::Value::Array(items.iter().map(Val::to_json).collect()),
            other => serde_json::Value::String(other.to_js_string()),
        }
    }
}

/* ===================== Operators ===================== */

/// Apply a binary operator with JavaScript coercion semantics
pub fn binary_op(op: BinaryOp, left: &Val, right: &Val) -> Val {
    match op {
        BinaryOp::Add => {
            let textual = |v: &Val| !matches!(v, Val::Undefined | Val::Null | Val::Bool(_) | Val::Num(_));
            if textual(left) || textual(right) {
                Val::Str(format!("{}{}", left.to_js_string(), right.to_js_string()))
            } else {
                Val::Num(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Val::Num(left.to_number() - right.to_number()),
        BinaryOp::Mul => Val::Num(left.to_number() * right.to_number()),
        BinaryOp::Div => Val::Num(left.to_number() / right.to_number()),
        BinaryOp::Rem => Val::Num(left.to_number() % right.to_number()),
        BinaryOp::Eq => Val::Bool(left.loose_equals(right)),
        BinaryOp::Ne => Val::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Val::Bool(left.strict_equals(right)),
        BinaryOp::StrictNe => Val::Bool(!left.strict_equals(right)),
        BinaryOp::Lt => Val::Bool(compare(left, right, |o| o.is_lt())),
        BinaryOp::Gt => Val::Bool(compare(left, right, |o| o.is_gt())),
        BinaryOp::Lte => Val::Bool(compare(left, right, |o| o.is_le())),
        BinaryOp::Gte => Val::Bool(compare(left, right, |o| o.is_ge())),
    }
}

/// Relational comparison: two strings compare by code unit, anything else
/// numerically. Any NaN makes the comparison false.
fn compare(left: &Val, right: &Val, test: impl Fn(std::cmp::Ordering) -> bool) -> bool {
    if let (Val::Str(a), Val::Str(b)) = (left, right) {
        let a: Vec<u16> = a.encode_utf16().collect();
        let b: Vec<u16> = b.encode_utf16().collect();
        return test(a.cmp(&b));
    }
    match left.to_number().partial_cmp(&right.to_number()) {
        Some(ordering) => test(ordering),
        None => false,
    }
}

/* ===================== Conversion Helpers ===================== */

/// ToNumber for strings
fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust accepts "inf"/"nan" spellings that JavaScript does not
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number to string the way JavaScript prints it
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        return exponent_form(n);
    }
    if n.fract() == 0.0 {
        return format!("{}", n as i128);
    }
    format!("{}", n)
}

/// `1e+21`, `-1.5e-7`: shortest digits with an explicitly signed exponent
fn exponent_form(n: f64) -> String {
    let rendered = format!("{:e}", n);
    match rendered.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{}e{}", mantissa, exp),
        Some((mantissa, exp)) => format!("{}e+{}", mantissa, exp),
        None => rendered,
    }
}

fn function_source(def: &FunctionDef) -> String {
    let params = def.params.join(", ");
    if def.is_arrow {
        format!("({}) => {{ ... }}", params)
    } else {
        format!("function {}({}) {{ ... }}", def.name.as_deref().unwrap_or(""), params)
    }
}
