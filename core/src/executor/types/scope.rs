//! Flat per-frame variable bindings with display metadata

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ast::VarKind;
use super::values::Val;

/// How a name was introduced. Used for display, not semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Const,
    Let,
    Var,
    Func,
    Param,
}

impl From<VarKind> for DeclKind {
    fn from(kind: VarKind) -> Self {
        match kind {
            VarKind::Const => DeclKind::Const,
            VarKind::Let => DeclKind::Let,
            VarKind::Var => DeclKind::Var,
        }
    }
}

/// Metadata kept beside every declared name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarMeta {
    pub kind: DeclKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Variable bindings of one frame. Blocks share their frame's scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    values: BTreeMap<String, Val>,
    meta: BTreeMap<String, VarMeta>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a declared name, replacing any earlier binding and metadata
    pub fn declare(&mut self, name: &str, kind: DeclKind, value: Val) {
        let label = value.label();
        self.meta.insert(name.to_string(), VarMeta { kind, label });
        self.values.insert(name.to_string(), value);
    }

    /// Write a value without declaring it. Existing metadata keeps its kind
    /// and gets a fresh label.
    pub fn assign(&mut self, name: &str, value: Val) {
        if let Some(meta) = self.meta.get_mut(name) {
            meta.label = value.label();
        }
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Val> {
        self.values.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn meta(&self, name: &str) -> Option<&VarMeta> {
        self.meta.get(name)
    }

    /// Bindings in name order
    pub fn values(&self) -> &BTreeMap<String, Val> {
        &self.values
    }

    pub fn metadata(&self) -> &BTreeMap<String, VarMeta> {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
