//! Natural-language descriptions of pending work
//!
//! Descriptions come from node shape alone; nothing is evaluated. Every
//! shape has a fallback, so generating an explanation cannot fail.

use super::types::ast::{
    AssignOp, BinaryOp, Declarator, Expr, ForInit, FunctionDef, LogicalOp, MemberProp, Stmt,
    UnaryOp, UpdateOp, VarKind,
};
use super::types::values::number_to_string;
use super::types::Pending;

/// Describe a unit of queued work
pub fn explain(pending: &Pending) -> String {
    match pending {
        Pending::Node(stmt) => explain_stmt(stmt),
        Pending::LoopUpdate { update } => {
            format!("Update the loop: {}", lower_first(&explain_expr_stmt(update)))
        }
        Pending::LoopCheck { node } => match node.as_ref() {
            Stmt::For {
                test: Some(test), ..
            } => format!("Check the loop condition `{}` again", render_expr(test)),
            _ => "Repeat the loop".to_string(),
        },
    }
}

pub fn explain_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block { .. } => "Enter a block".to_string(),
        Stmt::Declare { kind, decls, .. } => explain_declaration(*kind, decls),
        Stmt::Function { def } => explain_function(def),
        Stmt::Expr { expr, .. } => explain_expr_stmt(expr),
        Stmt::If { test, .. } => format!("Check if `{}`", render_expr(test)),
        Stmt::For { init, test, .. } => {
            let mut text = "Start a for loop".to_string();
            match init {
                Some(ForInit::Declare { kind, decls, .. }) => {
                    text.push_str(&format!(" with `{}`", render_declaration(*kind, decls)));
                }
                Some(ForInit::Expr { expr }) => {
                    text.push_str(&format!(" with `{}`", render_expr(expr)));
                }
                None => {}
            }
            match test {
                Some(test) => text.push_str(&format!(", repeating while `{}`", render_expr(test))),
                None => text.push_str(", repeating forever"),
            }
            text
        }
        Stmt::Return { value, .. } => match value {
            Some(value) => format!("Return {}", describe_value(value)),
            None => "Return from the function".to_string(),
        },
        Stmt::Empty { .. } => "Do nothing".to_string(),
        Stmt::Unsupported { kind, .. } => format!("Skip unsupported {}", kind),
    }
}

fn explain_declaration(kind: VarKind, decls: &[Declarator]) -> String {
    let noun = match kind {
        VarKind::Const => "constant",
        VarKind::Let | VarKind::Var => "variable",
    };
    let parts: Vec<String> = decls
        .iter()
        .map(|d| match &d.init {
            Some(init) => format!(
                "Declare {} `{}` and set it to {}",
                noun,
                d.name,
                describe_value(init)
            ),
            None => format!("Declare {} `{}`", noun, d.name),
        })
        .collect();
    parts.join("; ")
}

fn explain_function(def: &FunctionDef) -> String {
    if def.params.is_empty() {
        format!("Define function `{}`", def.display_name())
    } else {
        let params: Vec<String> = def.params.iter().map(|p| format!("`{}`", p)).collect();
        format!(
            "Define function `{}` with parameters {}",
            def.display_name(),
            params.join(", ")
        )
    }
}

fn explain_expr_stmt(expr: &Expr) -> String {
    match expr {
        Expr::Assign {
            op, target, value, ..
        } => {
            let target = render_expr(target);
            let value = describe_value(value);
            match op {
                AssignOp::Assign => format!("Set `{}` to {}", target, value),
                AssignOp::Add => format!("Add {} to `{}`", value, target),
                AssignOp::Sub => format!("Subtract {} from `{}`", value, target),
                AssignOp::Mul => format!("Multiply `{}` by {}", target, value),
                AssignOp::Div => format!("Divide `{}` by {}", target, value),
            }
        }
        Expr::Update { op, arg, .. } => match op {
            UpdateOp::Inc => format!("Increase `{}` by 1", render_expr(arg)),
            UpdateOp::Dec => format!("Decrease `{}` by 1", render_expr(arg)),
        },
        Expr::Call { callee, args, .. } => explain_call(callee, args),
        other => format!("Evaluate `{}`", render_expr(other)),
    }
}

/* ===================== Calls ===================== */

/// The callee as `(object, method)` when it is a static member access
fn method_of(callee: &Expr) -> Option<(&Expr, &str)> {
    match callee {
        Expr::Member {
            object,
            property: MemberProp::Static { name },
            ..
        } => Some((object.as_ref(), name.as_str())),
        _ => None,
    }
}

fn is_ident(expr: &Expr, expected: &str) -> bool {
    matches!(expr, Expr::Ident { name, .. } if name == expected)
}

fn list_values(args: &[Expr]) -> String {
    let parts: Vec<String> = args.iter().map(describe_value).collect();
    match parts.len() {
        0 => "nothing".to_string(),
        1 => parts[0].clone(),
        n => format!("{} and {}", parts[..n - 1].join(", "), parts[n - 1]),
    }
}

fn first_arg(args: &[Expr]) -> String {
    args.first()
        .map(describe_value)
        .unwrap_or_else(|| "nothing".to_string())
}

/// Friendly phrase for a call used as a value, if it is a known pattern
fn describe_call_value(callee: &Expr, args: &[Expr]) -> Option<String> {
    if let Some((object, method)) = method_of(callee) {
        if is_ident(object, "document") {
            return match method {
                "getElementById" => Some(format!("the element with id {}", first_arg(args))),
                "querySelector" => Some(format!("the first element matching {}", first_arg(args))),
                "querySelectorAll" => Some(format!("all elements matching {}", first_arg(args))),
                _ => None,
            };
        }
        return None;
    }

    match callee {
        Expr::Ident { name, .. } if name == "prompt" => {
            Some(format!("the answer when you ask the user {}", first_arg(args)))
        }
        Expr::Ident { name, .. } if name == "confirm" => {
            Some(format!("the user's choice when asked {}", first_arg(args)))
        }
        Expr::Ident { name, .. } => Some(format!("the result of calling `{}`", name)),
        _ => None,
    }
}

fn explain_call(callee: &Expr, args: &[Expr]) -> String {
    if let Some((object, method)) = method_of(callee) {
        if is_ident(object, "console") && matches!(method, "log" | "info" | "warn" | "error") {
            return format!("Print {} to the console", list_values(args));
        }
        if method == "addEventListener" {
            let target = match object {
                Expr::Call {
                    callee: inner,
                    args: inner_args,
                    ..
                } => describe_call_value(inner, inner_args)
                    .unwrap_or_else(|| format!("`{}`", render_expr(object))),
                _ => format!("`{}`", render_expr(object)),
            };
            return format!("Listen for {} events on {}", first_arg(args), target);
        }
        if let Some(found) = describe_call_value(callee, args) {
            return format!("Find {}", found);
        }
        return with_args(format!("Call `{}`", render_expr(callee)), args);
    }

    match callee {
        Expr::Ident { name, .. } if name == "alert" => {
            format!("Show an alert saying {}", first_arg(args))
        }
        Expr::Ident { name, .. } if name == "prompt" => format!("Ask the user {}", first_arg(args)),
        Expr::Ident { name, .. } => with_args(format!("Call function `{}`", name), args),
        other => with_args(format!("Call `{}`", render_expr(other)), args),
    }
}

fn with_args(text: String, args: &[Expr]) -> String {
    if args.is_empty() {
        text
    } else {
        format!("{} with {}", text, list_values(args))
    }
}

/* ===================== Values ===================== */

/// Phrase for an expression in value position
fn describe_value(expr: &Expr) -> String {
    match expr {
        Expr::LitNum { .. } | Expr::LitStr { .. } | Expr::LitBool { .. } | Expr::LitNull { .. } => {
            render_expr(expr)
        }
        Expr::Call { callee, args, .. } => describe_call_value(callee, args)
            .unwrap_or_else(|| format!("the result of `{}`", render_expr(expr))),
        Expr::Function { def } if def.is_arrow => "an arrow function".to_string(),
        Expr::Function { .. } => "a function".to_string(),
        other => format!("`{}`", render_expr(other)),
    }
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/* ===================== Source Rendering ===================== */

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Assign { .. } | Expr::Function { .. } => 1,
        Expr::Ternary { .. } => 2,
        Expr::Logical {
            op: LogicalOp::Or, ..
        } => 3,
        Expr::Logical {
            op: LogicalOp::And,
            ..
        } => 4,
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::Unary { .. } => 9,
        Expr::Update { .. } => 10,
        _ => 11,
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Eq | BinaryOp::StrictEq | BinaryOp::Ne | BinaryOp::StrictNe => 5,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte => 6,
        BinaryOp::Add | BinaryOp::Sub => 7,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
    }
}

fn wrapped(expr: &Expr, min: u8) -> String {
    let text = render_expr(expr);
    if precedence(expr) < min {
        format!("({})", text)
    } else {
        text
    }
}

fn render_declaration(kind: VarKind, decls: &[Declarator]) -> String {
    let parts: Vec<String> = decls
        .iter()
        .map(|d| match &d.init {
            Some(init) => format!("{} = {}", d.name, render_expr(init)),
            None => d.name.clone(),
        })
        .collect();
    format!("{} {}", kind.keyword(), parts.join(", "))
}

/// Render an expression back into source-like text
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::LitBool { v, .. } => v.to_string(),
        Expr::LitNum { v, .. } => number_to_string(*v),
        Expr::LitStr { v, .. } => format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
        Expr::LitNull { .. } => "null".to_string(),
        Expr::Ident { name, .. } => name.clone(),
        Expr::Member {
            object, property, ..
        } => match property {
            MemberProp::Static { name } => format!("{}.{}", wrapped(object, 11), name),
            MemberProp::Computed { expr } => {
                format!("{}[{}]", wrapped(object, 11), render_expr(expr))
            }
        },
        Expr::Call { callee, args, .. } => {
            let args: Vec<String> = args.iter().map(render_expr).collect();
            format!("{}({})", wrapped(callee, 11), args.join(", "))
        }
        Expr::Binary {
            op, left, right, ..
        } => {
            let p = binary_precedence(*op);
            format!("{} {} {}", wrapped(left, p), op.symbol(), wrapped(right, p + 1))
        }
        Expr::Logical {
            op, left, right, ..
        } => {
            let (p, symbol) = match op {
                LogicalOp::Or => (3, "||"),
                LogicalOp::And => (4, "&&"),
            };
            format!("{} {} {}", wrapped(left, p), symbol, wrapped(right, p + 1))
        }
        Expr::Unary { op, arg, .. } => {
            let symbol = match op {
                UnaryOp::Not => "!",
                UnaryOp::Neg => "-",
                UnaryOp::Plus => "+",
                UnaryOp::TypeOf => "typeof ",
            };
            let operand = wrapped(arg, 9);
            // `- -x` must not collapse into a decrement
            if matches!(op, UnaryOp::Neg | UnaryOp::Plus) && operand.starts_with(symbol) {
                format!("{} {}", symbol, operand)
            } else {
                format!("{}{}", symbol, operand)
            }
        }
        Expr::Update {
            op, prefix, arg, ..
        } => {
            let symbol = match op {
                UpdateOp::Inc => "++",
                UpdateOp::Dec => "--",
            };
            if *prefix {
                format!("{}{}", symbol, wrapped(arg, 11))
            } else {
                format!("{}{}", wrapped(arg, 11), symbol)
            }
        }
        Expr::Assign {
            op, target, value, ..
        } => format!("{} {} {}", render_expr(target), op.symbol(), render_expr(value)),
        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => format!(
            "{} ? {} : {}",
            wrapped(condition, 3),
            render_expr(consequent),
            render_expr(alternate)
        ),
        Expr::Function { def } => {
            let params = def.params.join(", ");
            if def.is_arrow {
                format!("({}) => {{ ... }}", params)
            } else {
                match &def.name {
                    Some(name) => format!("function {}({}) {{ ... }}", name, params),
                    None => format!("function ({}) {{ ... }}", params),
                }
            }
        }
        Expr::Unsupported { kind, .. } => match kind.as_str() {
            "ArrayExpression" => "[...]".to_string(),
            "ObjectExpression" => "{...}".to_string(),
            other => other.to_string(),
        },
    }
}
