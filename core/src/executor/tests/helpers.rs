//! Test helpers for executor tests
//!
//! Common utilities for building interpreters and a small test page

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use crate::executor::{
    run_until_done, CallScoping, DomElement, Interpreter, InterpreterConfig, MemorySurface,
    SurfaceRef, Val,
};

/// Guard against runaway scripts in tests
const STEP_LIMIT: usize = 10_000;

/// Parse, validate and build an interpreter without a surface
pub fn build(source: &str) -> Interpreter {
    Interpreter::new(source, None).expect("Interpreter construction failed")
}

/// Build with the given call scoping and no surface
pub fn build_scoped(source: &str, call_scoping: CallScoping) -> Interpreter {
    Interpreter::with_config(source, None, InterpreterConfig { call_scoping })
        .expect("Interpreter construction failed")
}

/// Build against a memory surface. The returned handle sees every change
/// the script makes.
pub fn build_with_surface(
    source: &str,
    surface: MemorySurface,
) -> (Interpreter, Arc<Mutex<MemorySurface>>) {
    build_with_surface_scoped(source, surface, CallScoping::default())
}

pub fn build_with_surface_scoped(
    source: &str,
    surface: MemorySurface,
    call_scoping: CallScoping,
) -> (Interpreter, Arc<Mutex<MemorySurface>>) {
    let handle = Arc::new(Mutex::new(surface));
    let shared: SurfaceRef = handle.clone();
    let interp = Interpreter::with_config(source, Some(shared), InterpreterConfig { call_scoping })
        .expect("Interpreter construction failed");
    (interp, handle)
}

/// A button, an output paragraph and a two-item list
pub fn page() -> MemorySurface {
    MemorySurface::new()
        .with_element(DomElement::new("button").with_id("btn"))
        .with_element(DomElement::new("p").with_id("out").with_property("textContent", json!("")))
        .with_element(DomElement::new("li").with_class("item"))
        .with_element(DomElement::new("li").with_class("item"))
}

/// Step to completion; returns the number of steps taken
pub fn run_all(interp: &mut Interpreter) -> usize {
    let steps = run_until_done(interp, Some(STEP_LIMIT));
    assert!(
        interp.state().finished,
        "Script did not finish within {} steps",
        STEP_LIMIT
    );
    steps
}

/// Step until finished, collecting each step's explanation
pub fn explanations(interp: &mut Interpreter) -> Vec<String> {
    let mut out = Vec::new();
    while !interp.state().finished {
        out.push(interp.step().explanation.clone());
        assert!(out.len() < STEP_LIMIT, "Script did not finish");
    }
    out
}

/// Global binding, panicking if missing
pub fn global(interp: &Interpreter, name: &str) -> Val {
    interp
        .state()
        .global(name)
        .cloned()
        .unwrap_or_else(|| panic!("Global '{}' is not bound", name))
}

pub fn global_num(interp: &Interpreter, name: &str) -> f64 {
    match global(interp, name) {
        Val::Num(n) => n,
        other => panic!("Expected '{}' to be a number, got {:?}", name, other),
    }
}

/// Text property of the element with the given id
pub fn element_text(surface: &Arc<Mutex<MemorySurface>>, id: &str, property: &str) -> String {
    let surface = surface.lock();
    let node = surface.find_by_id(id).expect("Element should exist");
    surface
        .element(node)
        .expect("Element should exist")
        .text(property)
}
