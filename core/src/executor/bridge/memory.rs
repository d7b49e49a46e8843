//! In-memory surface: a small document plus `alert`/`prompt`
//!
//! Used by the CLI (loaded from a JSON fixture) and by tests.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::{ElementRef, LiveSurface, NativeFn, NodeId, PropertyValue};
use crate::executor::types::Val;

/// Element methods the memory document answers to
const METHODS: &[&str] = &["getAttribute", "setAttribute", "hasAttribute", "focus"];

/// Host functions in the global namespace
const GLOBAL_FUNCTIONS: &[&str] = &["alert", "prompt", "confirm"];

fn default_tag() -> String {
    "div".to_string()
}

/// A DOM element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomElement {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Script-visible properties (`textContent`, `value`, ...)
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Event names listeners were registered for
    #[serde(default, skip_deserializing)]
    pub listeners: Vec<String>,
}

impl DomElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, value: serde_json::Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Simple selectors only: `#id`, `.class` or a tag name
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }

    /// Text property, or the empty string
    pub fn text(&self, name: &str) -> String {
        self.properties
            .get(name)
            .map(|v| Val::from_json(v).to_js_string())
            .unwrap_or_default()
    }
}

/// Document and global namespace held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySurface {
    #[serde(default)]
    pub elements: Vec<DomElement>,
    /// Plain values in the global namespace
    #[serde(default)]
    pub globals: BTreeMap<String, serde_json::Value>,
    /// Scripted answers handed out by `prompt`, in order
    #[serde(default)]
    pub answers: VecDeque<String>,
    /// Messages passed to `alert`
    #[serde(default, skip_deserializing)]
    pub alerts: Vec<String>,
    /// Questions passed to `prompt`
    #[serde(default, skip_deserializing)]
    pub prompts: Vec<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a surface from a JSON fixture
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_element(mut self, element: DomElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answers.push_back(answer.to_string());
        self
    }

    pub fn add_element(&mut self, element: DomElement) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn element(&self, node: NodeId) -> Option<&DomElement> {
        self.elements.get(node.0)
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements
            .iter()
            .position(|el| el.id.as_deref() == Some(id))
            .map(NodeId)
    }

    fn element_ref(&self, index: usize) -> ElementRef {
        let el = &self.elements[index];
        ElementRef {
            node: NodeId(index),
            tag: el.tag.clone(),
            id: el.id.clone(),
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut DomElement, String> {
        self.elements
            .get_mut(node.0)
            .ok_or_else(|| format!("Element {} no longer exists", node.0))
    }
}

impl LiveSurface for MemorySurface {
    fn get_element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.find_by_id(id).map(|node| self.element_ref(node.0))
    }

    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        self.elements
            .iter()
            .position(|el| el.matches(selector))
            .map(|index| self.element_ref(index))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(selector))
            .map(|(index, _)| self.element_ref(index))
            .collect()
    }

    fn get_property(&self, node: NodeId, name: &str) -> PropertyValue {
        let Some(el) = self.element(node) else {
            return PropertyValue::Missing;
        };
        if let Some(value) = el.properties.get(name) {
            return PropertyValue::Value(Val::from_json(value));
        }

        match name {
            "id" => PropertyValue::Value(Val::Str(el.id.clone().unwrap_or_default())),
            "tagName" => PropertyValue::Value(Val::Str(el.tag.to_uppercase())),
            "className" => PropertyValue::Value(Val::Str(el.classes.join(" "))),
            "textContent" | "innerText" | "innerHTML" | "value" => {
                PropertyValue::Value(Val::Str(String::new()))
            }
            _ if METHODS.contains(&name) => PropertyValue::Method,
            _ => PropertyValue::Missing,
        }
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &Val) -> Result<(), String> {
        let el = self.element_mut(node)?;
        match name {
            "id" => el.id = Some(value.to_js_string()),
            "className" => {
                el.classes = value
                    .to_js_string()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
            }
            "tagName" => return Err("tagName is read-only".to_string()),
            _ => {
                el.properties.insert(name.to_string(), value.to_json());
            }
        }
        Ok(())
    }

    fn call_method(&mut self, node: NodeId, name: &str, args: &[Val]) -> Result<Val, String> {
        let arg = |i: usize| args.get(i).unwrap_or(&Val::Undefined).to_js_string();
        let el = self.element_mut(node)?;
        match name {
            "getAttribute" => Ok(el
                .attributes
                .get(&arg(0))
                .map(|v| Val::Str(v.clone()))
                .unwrap_or(Val::Null)),
            "setAttribute" => {
                el.attributes.insert(arg(0), arg(1));
                Ok(Val::Undefined)
            }
            "hasAttribute" => Ok(Val::Bool(el.attributes.contains_key(&arg(0)))),
            "focus" => Ok(Val::Undefined),
            _ => Err(format!("{} is not a function", name)),
        }
    }

    fn add_event_listener(&mut self, node: NodeId, event: &str) {
        if let Some(el) = self.elements.get_mut(node.0) {
            el.listeners.push(event.to_string());
        }
    }

    fn global(&self, name: &str) -> Option<Val> {
        if GLOBAL_FUNCTIONS.contains(&name) {
            return Some(Val::Native {
                func: NativeFn::HostGlobal(name.to_string()),
                this: None,
            });
        }
        self.globals.get(name).map(Val::from_json)
    }

    fn call_global(&mut self, name: &str, args: &[Val]) -> Result<Val, String> {
        let message = args.first().map(Val::to_js_string).unwrap_or_default();
        match name {
            "alert" => {
                self.alerts.push(message);
                Ok(Val::Undefined)
            }
            "prompt" => {
                self.prompts.push(message);
                Ok(self.answers.pop_front().map(Val::Str).unwrap_or(Val::Null))
            }
            "confirm" => {
                self.prompts.push(message);
                Ok(Val::Bool(true))
            }
            _ => Err(format!("{} is not a function", name)),
        }
    }
}
