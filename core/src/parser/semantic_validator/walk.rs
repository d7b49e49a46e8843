//! Shared AST traversal for validation rules

use crate::executor::types::ast::{Expr, ForInit, MemberProp, Stmt};

/// A node handed to a visitor, alongside its function nesting depth
pub enum Node<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// Visit every statement and expression under `stmt` in source order
pub fn walk_stmt<'a>(stmt: &'a Stmt, depth: usize, visit: &mut impl FnMut(Node<'a>, usize)) {
    visit(Node::Stmt(stmt), depth);

    match stmt {
        Stmt::Block { body, .. } => {
            for s in body {
                walk_stmt(s, depth, visit);
            }
        }
        Stmt::Declare { decls, .. } => {
            for d in decls {
                if let Some(init) = &d.init {
                    walk_expr(init, depth, visit);
                }
            }
        }
        Stmt::Function { def } => walk_stmt(&def.body, depth + 1, visit),
        Stmt::Expr { expr, .. } => walk_expr(expr, depth, visit),
        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            walk_expr(test, depth, visit);
            walk_stmt(then_s, depth, visit);
            if let Some(else_s) = else_s {
                walk_stmt(else_s, depth, visit);
            }
        }
        Stmt::For {
            init,
            test,
            update,
            body,
            ..
        } => {
            match init {
                Some(ForInit::Declare { decls, .. }) => {
                    for d in decls {
                        if let Some(init) = &d.init {
                            walk_expr(init, depth, visit);
                        }
                    }
                }
                Some(ForInit::Expr { expr }) => walk_expr(expr, depth, visit),
                None => {}
            }
            if let Some(test) = test {
                walk_expr(test, depth, visit);
            }
            if let Some(update) = update {
                walk_expr(update, depth, visit);
            }
            walk_stmt(body, depth, visit);
        }
        Stmt::Return { value, .. } => {
            if let Some(value) = value {
                walk_expr(value, depth, visit);
            }
        }
        Stmt::Empty { .. } | Stmt::Unsupported { .. } => {}
    }
}

pub fn walk_expr<'a>(expr: &'a Expr, depth: usize, visit: &mut impl FnMut(Node<'a>, usize)) {
    visit(Node::Expr(expr), depth);

    match expr {
        Expr::Member {
            object, property, ..
        } => {
            walk_expr(object, depth, visit);
            if let MemberProp::Computed { expr } = property {
                walk_expr(expr, depth, visit);
            }
        }
        Expr::Call { callee, args, .. } => {
            walk_expr(callee, depth, visit);
            for arg in args {
                walk_expr(arg, depth, visit);
            }
        }
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            walk_expr(left, depth, visit);
            walk_expr(right, depth, visit);
        }
        Expr::Unary { arg, .. } | Expr::Update { arg, .. } => walk_expr(arg, depth, visit),
        Expr::Assign { target, value, .. } => {
            walk_expr(target, depth, visit);
            walk_expr(value, depth, visit);
        }
        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => {
            walk_expr(condition, depth, visit);
            walk_expr(consequent, depth, visit);
            walk_expr(alternate, depth, visit);
        }
        Expr::Function { def } => walk_stmt(&def.body, depth + 1, visit),
        Expr::LitBool { .. }
        | Expr::LitNum { .. }
        | Expr::LitStr { .. }
        | Expr::LitNull { .. }
        | Expr::Ident { .. }
        | Expr::Unsupported { .. } => {}
    }
}
