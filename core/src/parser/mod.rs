//! PEST-based parser for the stepjs JavaScript subset
//!
//! Produces the located AST consumed by the executor, with span information
//! for the current-line display and error reporting.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::types::ast::{
    AssignOp, BinaryOp, Declarator, Expr, ForInit, FunctionDef, LogicalOp, MemberProp, Span,
    Stmt, UnaryOp, UpdateOp, VarKind,
};

pub mod semantic_validator;


/* ===================== Program Definition ===================== */

/// A parsed script: the whole-program unit handed to the interpreter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDef {
    /// Top-level statements wrapped in a `Stmt::Block`
    pub body: Stmt,
    /// Span of the entire program
    #[serde(default)]
    pub span: Span,
}

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct ScriptParser;

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("{message}")]
    Build { message: String, span: Option<Span> },
}

impl ParseError {
    fn build(message: impl Into<String>, span: Span) -> Self {
        ParseError::Build {
            message: message.into(),
            span: Some(span),
        }
    }

    /// 1-based line of the error, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Build { span, .. } => span.map(|s| s.line()),
        }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => (line, col),
            pest::error::LineColLocation::Span((line, col), _) => (line, col),
        };
        let message = match &err.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                format!("expected {}", describe_rules(positives))
            }
            pest::error::ErrorVariant::CustomError { message } => message.clone(),
            _ => "unexpected input".to_string(),
        };
        ParseError::Syntax {
            message,
            line,
            column,
        }
    }
}

fn describe_rules(rules: &[Rule]) -> String {
    let names: Vec<String> = rules.iter().map(|r| format!("{:?}", r)).collect();
    names.join(" or ")
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Span Helpers ===================== */

/// Convert a PEST pair's span to our Span type
fn pair_to_span(pair: &Pair<Rule>, source: &str) -> Span {
    let pest_span = pair.as_span();
    let start = pest_span.start();
    let end = pest_span.end();

    let (start_line, start_col) = offset_to_line_col(source, start);
    let (end_line, end_col) = offset_to_line_col(source, end);

    Span::new(start, end, start_line, start_col, end_line, end_col)
}

/// Convert byte offset to (line, column) - 0-indexed
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/* ===================== Pair Helpers ===================== */

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_if
            | Rule::kw_else
            | Rule::kw_for
            | Rule::kw_while
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_return
            | Rule::kw_function
    )
}

/// Inner pairs with keyword tokens filtered out
fn significant(pair: Pair<Rule>) -> impl Iterator<Item = Pair<Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

/// Take the next pair, or report which piece of `what` was missing
fn expect_next<'i>(
    inner: &mut impl Iterator<Item = Pair<'i, Rule>>,
    what: &str,
    span: Span,
) -> ParseResult<Pair<'i, Rule>> {
    inner
        .next()
        .ok_or_else(|| ParseError::build(format!("Malformed {}", what), span))
}

/* ===================== Public API ===================== */

/// Parse a script into its whole-program unit
pub fn parse_program(source: &str) -> ParseResult<ProgramDef> {
    let mut pairs: Pairs<Rule> = ScriptParser::parse(Rule::program, source)?;
    let whole = Span::new(0, source.len(), 0, 0, 0, 0);
    let program = expect_next(&mut pairs, "program", whole)?;
    let program_span = pair_to_span(&program, source);

    let statements = program
        .into_inner()
        .filter(|p| p.as_rule() == Rule::statement)
        .map(|p| build_statement(p, source))
        .collect::<ParseResult<Vec<Stmt>>>()?;

    let body_span = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => first.span().merge(&last.span()),
        _ => program_span,
    };

    Ok(ProgramDef {
        body: Stmt::Block {
            body: statements,
            span: body_span,
        },
        span: program_span,
    })
}

/// Parse a single expression (testing and tooling API)
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    let program = parse_program(source)?;
    match program.body {
        Stmt::Block { mut body, span } if body.len() == 1 => match body.remove(0) {
            Stmt::Expr { expr, .. } => Ok(expr),
            other => Err(ParseError::build(
                format!("Expected an expression, found {}", other.kind_name()),
                span,
            )),
        },
        other => Err(ParseError::build(
            "Expected exactly one expression",
            other.span(),
        )),
    }
}

/* ===================== Statement Builders ===================== */

fn build_statement(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);

    match pair.as_rule() {
        Rule::statement => {
            let inner = expect_next(&mut pair.into_inner(), "statement", span)?;
            build_statement(inner, source)
        }
        Rule::function_decl => {
            let def = build_function(pair, source, false)?;
            Ok(Stmt::Function { def })
        }
        Rule::declare_stmt => {
            let decl = expect_next(&mut pair.into_inner(), "declaration", span)?;
            let (kind, decls) = build_declaration(decl, source)?;
            Ok(Stmt::Declare { kind, decls, span })
        }
        Rule::if_stmt => build_if_stmt(pair, source),
        Rule::for_stmt => build_for_stmt(pair, source),
        Rule::while_stmt => Ok(Stmt::Unsupported {
            kind: "WhileStatement".to_string(),
            span,
        }),
        Rule::break_stmt => Ok(Stmt::Unsupported {
            kind: "BreakStatement".to_string(),
            span,
        }),
        Rule::continue_stmt => Ok(Stmt::Unsupported {
            kind: "ContinueStatement".to_string(),
            span,
        }),
        Rule::return_stmt => {
            let value = match significant(pair).next() {
                Some(expr_pair) => Some(build_expression(expr_pair, source)?),
                None => None,
            };
            Ok(Stmt::Return { value, span })
        }
        Rule::block => build_block(pair, source),
        Rule::empty_stmt => Ok(Stmt::Empty { span }),
        Rule::expr_stmt => {
            let expr_pair = expect_next(&mut pair.into_inner(), "expression statement", span)?;
            let expr = build_expression(expr_pair, source)?;
            Ok(Stmt::Expr { expr, span })
        }
        _ => Err(ParseError::build(
            format!("Unexpected statement rule: {:?}", pair.as_rule()),
            span,
        )),
    }
}

fn build_block(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let statements: ParseResult<Vec<Stmt>> = pair
        .into_inner()
        .map(|stmt_pair| build_statement(stmt_pair, source))
        .collect();

    Ok(Stmt::Block {
        body: statements?,
        span,
    })
}

fn build_declaration(pair: Pair<Rule>, source: &str) -> ParseResult<(VarKind, Vec<Declarator>)> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let kind_pair = expect_next(&mut inner, "declaration", span)?;
    let kind = match kind_pair.as_str() {
        "const" => VarKind::Const,
        "let" => VarKind::Let,
        "var" => VarKind::Var,
        other => {
            return Err(ParseError::build(
                format!("Expected 'const', 'let' or 'var', got: {}", other),
                pair_to_span(&kind_pair, source),
            ))
        }
    };

    let mut decls = Vec::new();
    for declarator in inner {
        let decl_span = pair_to_span(&declarator, source);
        let mut parts = declarator.into_inner();
        let name = expect_next(&mut parts, "declarator", decl_span)?
            .as_str()
            .to_string();
        let init = match parts.next() {
            Some(expr_pair) => Some(build_expression(expr_pair, source)?),
            None => None,
        };
        if kind == VarKind::Const && init.is_none() {
            return Err(ParseError::build(
                format!("Missing initializer in const declaration of '{}'", name),
                decl_span,
            ));
        }
        decls.push(Declarator {
            name,
            init,
            span: decl_span,
        });
    }

    Ok((kind, decls))
}

fn build_if_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = significant(pair);

    let test = build_expression(expect_next(&mut inner, "if condition", span)?, source)?;
    let then_s = build_statement(expect_next(&mut inner, "if branch", span)?, source)?;

    let else_s = match inner.next() {
        Some(else_clause) => {
            let else_inner = expect_next(&mut significant(else_clause), "else branch", span)?;
            Some(Box::new(build_statement(else_inner, source)?))
        }
        None => None,
    };

    Ok(Stmt::If {
        test,
        then_s: Box::new(then_s),
        else_s,
        span,
    })
}

fn build_for_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);

    let mut init = None;
    let mut test = None;
    let mut update = None;
    let mut body = None;

    for part in significant(pair) {
        match part.as_rule() {
            Rule::for_init => {
                let init_span = pair_to_span(&part, source);
                let inner = expect_next(&mut part.into_inner(), "for initializer", init_span)?;
                init = Some(match inner.as_rule() {
                    Rule::declaration => {
                        let (kind, decls) = build_declaration(inner, source)?;
                        ForInit::Declare {
                            kind,
                            decls,
                            span: init_span,
                        }
                    }
                    _ => ForInit::Expr {
                        expr: build_expression(inner, source)?,
                    },
                });
            }
            Rule::for_test => {
                let test_span = pair_to_span(&part, source);
                let inner = expect_next(&mut part.into_inner(), "for condition", test_span)?;
                test = Some(build_expression(inner, source)?);
            }
            Rule::for_update => {
                let update_span = pair_to_span(&part, source);
                let inner = expect_next(&mut part.into_inner(), "for update", update_span)?;
                update = Some(build_expression(inner, source)?);
            }
            _ => body = Some(build_statement(part, source)?),
        }
    }

    let body = body.ok_or_else(|| ParseError::build("Missing for loop body", span))?;

    Ok(Stmt::For {
        init,
        test,
        update,
        body: Box::new(body),
        span,
    })
}

/// Build a function declaration or function expression
fn build_function(pair: Pair<Rule>, source: &str, allow_anonymous: bool) -> ParseResult<FunctionDef> {
    let span = pair_to_span(&pair, source);
    let mut name = None;
    let mut params = Vec::new();
    let mut body = None;

    for part in significant(pair) {
        match part.as_rule() {
            Rule::identifier => name = Some(part.as_str().to_string()),
            Rule::param_list => params = build_param_list(part),
            Rule::block => body = Some(build_block(part, source)?),
            other => {
                return Err(ParseError::build(
                    format!("Unexpected function part: {:?}", other),
                    span,
                ))
            }
        }
    }

    if name.is_none() && !allow_anonymous {
        return Err(ParseError::build("Function declaration requires a name", span));
    }
    let body = body.ok_or_else(|| ParseError::build("Missing function body", span))?;

    Ok(FunctionDef {
        name,
        params,
        body: Box::new(body),
        is_arrow: false,
        span,
    })
}

fn build_param_list(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .map(|id_pair| id_pair.as_str().to_string())
        .collect()
}

fn build_arrow_function(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let params_pair = expect_next(&mut inner, "arrow parameters", span)?;
    let params = match params_pair.into_inner().next() {
        Some(p) if p.as_rule() == Rule::identifier => vec![p.as_str().to_string()],
        Some(p) => build_param_list(p),
        None => vec![],
    };

    let body_pair = expect_next(&mut inner, "arrow body", span)?;
    let body_inner = expect_next(&mut body_pair.into_inner(), "arrow body", span)?;
    let body = match body_inner.as_rule() {
        Rule::block => build_block(body_inner, source)?,
        _ => {
            let expr = build_expression(body_inner, source)?;
            let expr_span = expr.span();
            Stmt::Block {
                body: vec![Stmt::Return {
                    value: Some(expr),
                    span: expr_span,
                }],
                span: expr_span,
            }
        }
    };

    Ok(Expr::Function {
        def: Box::new(FunctionDef {
            name: None,
            params,
            body: Box::new(body),
            is_arrow: true,
            span,
        }),
    })
}

/* ===================== Expression Builders ===================== */

fn build_binary_expr(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);
    let inner_pairs: Vec<_> = pair.into_inner().collect();

    let Some(first) = inner_pairs.first() else {
        return Err(ParseError::build("Empty binary expression", span));
    };
    let mut left = build_expression(first.clone(), source)?;

    let mut i = 1;
    while i < inner_pairs.len() {
        let op_pair = &inner_pairs[i];
        let Some(right_pair) = inner_pairs.get(i + 1) else {
            return Err(ParseError::build(
                "Missing right operand after operator",
                span,
            ));
        };
        let right = build_expression(right_pair.clone(), source)?;
        let new_span = left.span().merge(&right.span());

        left = match op_pair.as_rule() {
            Rule::op_or | Rule::op_and => Expr::Logical {
                op: if op_pair.as_rule() == Rule::op_or {
                    LogicalOp::Or
                } else {
                    LogicalOp::And
                },
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
            _ => Expr::Binary {
                op: binary_op(op_pair.as_str()).ok_or_else(|| {
                    ParseError::build(
                        format!("Unknown operator '{}'", op_pair.as_str()),
                        pair_to_span(op_pair, source),
                    )
                })?,
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
        };

        i += 2;
    }

    Ok(left)
}

fn binary_op(symbol: &str) -> Option<BinaryOp> {
    Some(match symbol {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Rem,
        "==" => BinaryOp::Eq,
        "===" => BinaryOp::StrictEq,
        "!=" => BinaryOp::Ne,
        "!==" => BinaryOp::StrictNe,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "<=" => BinaryOp::Lte,
        ">=" => BinaryOp::Gte,
        _ => return None,
    })
}

fn assign_op(symbol: &str) -> Option<AssignOp> {
    Some(match symbol {
        "=" => AssignOp::Assign,
        "+=" => AssignOp::Add,
        "-=" => AssignOp::Sub,
        "*=" => AssignOp::Mul,
        "/=" => AssignOp::Div,
        _ => return None,
    })
}

fn update_op(symbol: &str) -> UpdateOp {
    if symbol == "--" {
        UpdateOp::Dec
    } else {
        UpdateOp::Inc
    }
}

fn build_expression(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);

    match pair.as_rule() {
        Rule::expression | Rule::assignment | Rule::primary | Rule::literal | Rule::paren_expr => {
            let inner = expect_next(&mut pair.into_inner(), "expression", span)?;
            build_expression(inner, source)
        }
        Rule::assign_expr => {
            let mut inner = pair.into_inner();
            let target = build_expression(expect_next(&mut inner, "assignment", span)?, source)?;
            if !matches!(target, Expr::Ident { .. } | Expr::Member { .. }) {
                return Err(ParseError::build(
                    "Invalid left-hand side in assignment",
                    target.span(),
                ));
            }
            let op_pair = expect_next(&mut inner, "assignment operator", span)?;
            let op = assign_op(op_pair.as_str()).ok_or_else(|| {
                ParseError::build(
                    format!("Unknown assignment operator '{}'", op_pair.as_str()),
                    span,
                )
            })?;
            let value = build_expression(expect_next(&mut inner, "assignment value", span)?, source)?;
            Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
                span,
            })
        }
        Rule::arrow_function => build_arrow_function(pair, source),
        Rule::ternary_expr => {
            let mut inner = pair.into_inner();
            let condition = build_expression(expect_next(&mut inner, "condition", span)?, source)?;

            match inner.next() {
                Some(consequent_pair) => {
                    let consequent = build_expression(consequent_pair, source)?;
                    let alternate =
                        build_expression(expect_next(&mut inner, "ternary", span)?, source)?;
                    Ok(Expr::Ternary {
                        condition: Box::new(condition),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                        span,
                    })
                }
                None => Ok(condition),
            }
        }
        Rule::logical_or_expr
        | Rule::logical_and_expr
        | Rule::equality_expr
        | Rule::comparison_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_expr(pair, source),
        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let first = expect_next(&mut inner, "unary expression", span)?;

            match first.as_rule() {
                Rule::op_unary => {
                    let op = match first.as_str() {
                        "!" => UnaryOp::Not,
                        "-" => UnaryOp::Neg,
                        "+" => UnaryOp::Plus,
                        _ => UnaryOp::TypeOf,
                    };
                    let arg = build_expression(expect_next(&mut inner, "operand", span)?, source)?;
                    Ok(Expr::Unary {
                        op,
                        arg: Box::new(arg),
                        span,
                    })
                }
                _ => build_expression(first, source),
            }
        }
        Rule::prefix_update => {
            let mut inner = pair.into_inner();
            let op = update_op(expect_next(&mut inner, "update operator", span)?.as_str());
            let arg = build_expression(expect_next(&mut inner, "update operand", span)?, source)?;
            Ok(Expr::Update {
                op,
                prefix: true,
                arg: Box::new(arg),
                span,
            })
        }
        Rule::postfix_update => {
            let mut inner = pair.into_inner();
            let arg = build_expression(expect_next(&mut inner, "operand", span)?, source)?;
            match inner.next() {
                Some(op_pair) => Ok(Expr::Update {
                    op: update_op(op_pair.as_str()),
                    prefix: false,
                    arg: Box::new(arg),
                    span,
                }),
                None => Ok(arg),
            }
        }
        Rule::call_expr => {
            let mut inner = pair.into_inner();
            let primary_pair = expect_next(&mut inner, "call expression", span)?;
            let mut expr = build_expression(primary_pair, source)?;

            for postfix_pair in inner {
                let postfix_span = pair_to_span(&postfix_pair, source);
                let postfix_inner = expect_next(&mut postfix_pair.into_inner(), "postfix", span)?;
                let new_span = expr.span().merge(&postfix_span);

                expr = match postfix_inner.as_rule() {
                    Rule::call_suffix => {
                        let args = match postfix_inner.into_inner().next() {
                            Some(arg_list_pair) => build_arg_list(arg_list_pair, source)?,
                            None => vec![],
                        };
                        Expr::Call {
                            callee: Box::new(expr),
                            args,
                            span: new_span,
                        }
                    }
                    Rule::static_access => {
                        let prop_pair =
                            expect_next(&mut postfix_inner.into_inner(), "property", span)?;
                        Expr::Member {
                            object: Box::new(expr),
                            property: MemberProp::Static {
                                name: prop_pair.as_str().to_string(),
                            },
                            span: new_span,
                        }
                    }
                    Rule::computed_access => {
                        let index_pair =
                            expect_next(&mut postfix_inner.into_inner(), "index", span)?;
                        Expr::Member {
                            object: Box::new(expr),
                            property: MemberProp::Computed {
                                expr: Box::new(build_expression(index_pair, source)?),
                            },
                            span: new_span,
                        }
                    }
                    other => {
                        return Err(ParseError::build(
                            format!("Unexpected postfix rule: {:?}", other),
                            postfix_span,
                        ))
                    }
                };
            }

            Ok(expr)
        }
        Rule::function_expr => {
            let def = build_function(pair, source, true)?;
            Ok(Expr::Function { def: Box::new(def) })
        }
        Rule::identifier => Ok(Expr::Ident {
            name: pair.as_str().to_string(),
            span,
        }),
        Rule::number => {
            let num_str = pair.as_str();
            let value = num_str.parse::<f64>().map_err(|e| {
                ParseError::build(format!("Failed to parse number '{}': {}", num_str, e), span)
            })?;
            Ok(Expr::LitNum { v: value, span })
        }
        Rule::boolean => Ok(Expr::LitBool {
            v: pair.as_str() == "true",
            span,
        }),
        Rule::string => {
            let content = expect_next(&mut pair.into_inner(), "string", span)?;
            Ok(Expr::LitStr {
                v: unescape(content.as_str()),
                span,
            })
        }
        Rule::null_lit => Ok(Expr::LitNull { span }),
        Rule::array_lit => Ok(Expr::Unsupported {
            kind: "ArrayExpression".to_string(),
            span,
        }),
        Rule::object_lit => Ok(Expr::Unsupported {
            kind: "ObjectExpression".to_string(),
            span,
        }),
        _ => Err(ParseError::build(
            format!("Unexpected expression rule: {:?}", pair.as_rule()),
            span,
        )),
    }
}

fn build_arg_list(pair: Pair<Rule>, source: &str) -> ParseResult<Vec<Expr>> {
    pair.into_inner()
        .map(|expr_pair| build_expression(expr_pair, source))
        .collect()
}

/// Resolve backslash escapes inside a string literal body
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
