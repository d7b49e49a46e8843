//! Host bridge: `console`, `document` and the live rendering surface
//!
//! Interpreted code reaches the host only through the two intercepted globals
//! and the surface's own global namespace. Elements come back wrapped in an
//! [`ElementProxy`], which forwards property access to the surface except for
//! `addEventListener`: registering a listener is recorded here, and a later
//! [`dispatch_event`] re-enters the call machinery for each matching callback.

pub mod memory;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::calls;
use super::errors::{RuntimeError, RuntimeResult};
use super::types::{LogKind, ReturnHook, Val};
use super::Interpreter;

pub use memory::{DomElement, MemorySurface};

/// Shared handle to a live surface
pub type SurfaceRef = Arc<Mutex<dyn LiveSurface + Send>>;

/* ===================== Host Types ===================== */

/// Identity of an element inside its surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// A found element, as handed to interpreted code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRef {
    pub node: NodeId,
    pub tag: String,
    pub id: Option<String>,
}

impl ElementRef {
    /// Short form used in logs, e.g. `<button#save>`
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => format!("<{}#{}>", self.tag, id),
            None => format!("<{}>", self.tag),
        }
    }
}

/// Built-in functions provided by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "name")]
pub enum NativeFn {
    ConsoleLog,
    ConsoleInfo,
    ConsoleWarn,
    ConsoleError,
    GetElementById,
    QuerySelector,
    QuerySelectorAll,
    AddEventListener,
    /// A method forwarded to the element it is bound to
    ElementMethod(String),
    /// A function from the surface's global namespace
    HostGlobal(String),
}

impl NativeFn {
    pub fn name(&self) -> &str {
        match self {
            NativeFn::ConsoleLog => "log",
            NativeFn::ConsoleInfo => "info",
            NativeFn::ConsoleWarn => "warn",
            NativeFn::ConsoleError => "error",
            NativeFn::GetElementById => "getElementById",
            NativeFn::QuerySelector => "querySelector",
            NativeFn::QuerySelectorAll => "querySelectorAll",
            NativeFn::AddEventListener => "addEventListener",
            NativeFn::ElementMethod(name) | NativeFn::HostGlobal(name) => name,
        }
    }

    /// Member of `console` with this name
    pub fn console(name: &str) -> Option<NativeFn> {
        match name {
            "log" => Some(NativeFn::ConsoleLog),
            "info" => Some(NativeFn::ConsoleInfo),
            "warn" => Some(NativeFn::ConsoleWarn),
            "error" => Some(NativeFn::ConsoleError),
            _ => None,
        }
    }

    /// Member of `document` with this name
    pub fn document(name: &str) -> Option<NativeFn> {
        match name {
            "getElementById" => Some(NativeFn::GetElementById),
            "querySelector" => Some(NativeFn::QuerySelector),
            "querySelectorAll" => Some(NativeFn::QuerySelectorAll),
            _ => None,
        }
    }
}

/// Result of reading a property from a live element
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Value(Val),
    /// A callable member; calls go through [`LiveSurface::call_method`]
    Method,
    Missing,
}

/* ===================== LiveSurface Trait ===================== */

/// A live, DOM-like rendering surface
pub trait LiveSurface {
    fn get_element_by_id(&self, id: &str) -> Option<ElementRef>;

    fn query_selector(&self, selector: &str) -> Option<ElementRef>;

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef>;

    fn get_property(&self, node: NodeId, name: &str) -> PropertyValue;

    fn set_property(&mut self, node: NodeId, name: &str, value: &Val) -> Result<(), String>;

    fn call_method(&mut self, node: NodeId, name: &str, args: &[Val]) -> Result<Val, String>;

    /// Told about every listener registration
    fn add_event_listener(&mut self, node: NodeId, event: &str);

    /// Lookup in the surface's own global namespace
    fn global(&self, name: &str) -> Option<Val>;

    fn call_global(&mut self, name: &str, args: &[Val]) -> Result<Val, String>;
}

/* ===================== Element Proxy ===================== */

/// Members the proxy handles itself instead of forwarding
const INTERCEPTED: &[&str] = &["addEventListener"];

/// Interception wrapper around a live element
pub struct ElementProxy<'a> {
    element: &'a ElementRef,
    surface: &'a SurfaceRef,
}

impl<'a> ElementProxy<'a> {
    pub fn new(element: &'a ElementRef, surface: &'a SurfaceRef) -> Self {
        Self { element, surface }
    }

    fn bound(&self, func: NativeFn) -> Val {
        Val::Native {
            func,
            this: Some(Box::new(Val::Element(self.element.clone()))),
        }
    }

    pub fn get(&self, name: &str) -> Val {
        if name == "addEventListener" {
            return self.bound(NativeFn::AddEventListener);
        }
        let property = self.surface.lock().get_property(self.element.node, name);
        match property {
            PropertyValue::Value(v) => v,
            PropertyValue::Method => self.bound(NativeFn::ElementMethod(name.to_string())),
            PropertyValue::Missing => Val::Undefined,
        }
    }

    pub fn set(&self, name: &str, value: &Val) -> RuntimeResult<()> {
        if INTERCEPTED.contains(&name) {
            return Err(RuntimeError::PropertyWrite {
                target: self.element.describe(),
                property: name.to_string(),
            });
        }
        self.surface
            .lock()
            .set_property(self.element.node, name, value)
            .map_err(RuntimeError::Host)
    }

    pub fn call(&self, name: &str, args: &[Val]) -> RuntimeResult<Val> {
        self.surface
            .lock()
            .call_method(self.element.node, name, args)
            .map_err(RuntimeError::Host)
    }
}

/* ===================== Listeners ===================== */

/// A callback registered through `addEventListener`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listener {
    pub id: usize,
    pub target: ElementRef,
    pub event: String,
    pub callback: Val,
}

fn add_event_listener(
    it: &mut Interpreter,
    this: Option<&Val>,
    args: Vec<Val>,
) -> RuntimeResult<Val> {
    let Some(Val::Element(target)) = this else {
        return Err(RuntimeError::Host(
            "addEventListener called without an element".to_string(),
        ));
    };

    let mut args = args.into_iter();
    let event = args.next().unwrap_or(Val::Undefined).to_js_string();
    let callback = args.next().unwrap_or(Val::Undefined);
    if !callback.is_callable() {
        return Err(RuntimeError::NotAFunction(format!(
            "The '{}' listener {}",
            event,
            callback.repr()
        )));
    }

    let id = it.listeners.len() + 1;
    if let Some(surface) = &it.surface {
        surface.lock().add_event_listener(target.node, &event);
    }
    it.state.log(
        LogKind::Event,
        format!("Listening for {} events on {}", event, target.describe()),
    );
    debug!(id, event = %event, target = %target.describe(), "Registered listener");

    it.listeners.push(Listener {
        id,
        target: target.clone(),
        event,
        callback,
    });
    Ok(Val::Undefined)
}

/// Run every listener registered for `event` on `node`, in registration
/// order. Returns how many were scheduled.
pub(crate) fn dispatch_event(it: &mut Interpreter, node: NodeId, event: &str) -> usize {
    let matching: Vec<Listener> = it
        .listeners
        .iter()
        .filter(|l| l.target.node == node && l.event == event)
        .cloned()
        .collect();

    for listener in &matching {
        it.state.log(
            LogKind::Event,
            format!("{} event fired on {}", event, listener.target.describe()),
        );
    }

    // Frames run innermost first, so push the first listener last
    for listener in matching.iter().rev() {
        let hook = ReturnHook::EventHandled {
            event: event.to_string(),
            target: listener.target.describe(),
        };
        trace!(listener = listener.id, "Invoking event listener");
        if let Err(err) = calls::call_value(
            it,
            listener.callback.clone(),
            Vec::new(),
            Some(hook),
            "listener",
        ) {
            it.halt(err);
            break;
        }
    }

    matching.len()
}

/* ===================== Native Functions ===================== */

fn shared_surface(it: &Interpreter) -> RuntimeResult<SurfaceRef> {
    it.surface
        .clone()
        .ok_or_else(|| RuntimeError::NotDefined("document".to_string()))
}

fn arg_string(args: &[Val], index: usize) -> String {
    args.get(index).unwrap_or(&Val::Undefined).to_js_string()
}

/// Format `console.*` arguments the way a browser console prints them
fn console_message(args: &[Val]) -> String {
    args.iter()
        .map(|v| match v {
            Val::Str(s) => s.clone(),
            Val::List(_) | Val::Element(_) => v.repr(),
            other => other.to_js_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Invoke a bridge built-in
pub(crate) fn call_native(
    it: &mut Interpreter,
    func: &NativeFn,
    this: Option<&Val>,
    args: Vec<Val>,
) -> RuntimeResult<Val> {
    match func {
        NativeFn::ConsoleLog | NativeFn::ConsoleInfo => {
            it.state.log(LogKind::Console, console_message(&args));
            Ok(Val::Undefined)
        }
        NativeFn::ConsoleWarn => {
            it.state
                .log(LogKind::Console, format!("warning: {}", console_message(&args)));
            Ok(Val::Undefined)
        }
        NativeFn::ConsoleError => {
            it.state
                .log(LogKind::Console, format!("error: {}", console_message(&args)));
            Ok(Val::Undefined)
        }
        NativeFn::GetElementById => {
            let surface = shared_surface(it)?;
            let found = surface.lock().get_element_by_id(&arg_string(&args, 0));
            Ok(found.map(Val::Element).unwrap_or(Val::Null))
        }
        NativeFn::QuerySelector => {
            let surface = shared_surface(it)?;
            let found = surface.lock().query_selector(&arg_string(&args, 0));
            Ok(found.map(Val::Element).unwrap_or(Val::Null))
        }
        NativeFn::QuerySelectorAll => {
            let surface = shared_surface(it)?;
            let found = surface.lock().query_selector_all(&arg_string(&args, 0));
            Ok(Val::List(found.into_iter().map(Val::Element).collect()))
        }
        NativeFn::AddEventListener => add_event_listener(it, this, args),
        NativeFn::ElementMethod(name) => {
            let Some(Val::Element(element)) = this else {
                return Err(RuntimeError::NotAFunction(name.clone()));
            };
            let surface = shared_surface(it)?;
            ElementProxy::new(element, &surface).call(name, &args)
        }
        NativeFn::HostGlobal(name) => {
            let surface = shared_surface(it)?;
            let result = surface.lock().call_global(name, &args);
            result.map_err(RuntimeError::Host)
        }
    }
}
