//! Description types - Elements, props and children.
//!
//! A description is an immutable value telling the reconciler what the UI
//! should look like. It is produced by user code, consumed by the begin
//! phase, and never mutated.

use std::fmt;
use std::rc::Rc;

use crate::error::RenderError;
use crate::types::Key;

// =============================================================================
// Component
// =============================================================================

/// Body of a function component.
pub type RenderFn = dyn Fn(&Props) -> Result<Node, RenderError>;

/// A user component: a named render function.
///
/// Two components are the same type only if they share the same render
/// function allocation, so create a component once and clone it.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    /// Create a component from a render function.
    pub fn new(
        name: impl Into<Rc<str>>,
        render: impl Fn(&Props) -> Result<Node, RenderError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    /// Display name, used in hook errors and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the body. Hooks are only valid when the reconciler calls this.
    pub(crate) fn render(&self, props: &Props) -> Result<Node, RenderError> {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

// =============================================================================
// Element Type
// =============================================================================

/// What an element describes: a host node or a component.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// Host element name, e.g. `"div"`.
    Host(Rc<str>),
    /// User component.
    Component(Component),
}

impl ElementType {
    /// Name used in logs: the host tag or the component name.
    pub fn name(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Component(component) => component.name(),
        }
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A non-children prop value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Str(Rc<str>),
    Number(f64),
    Bool(bool),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered prop mapping plus the reserved `children` slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attributes: Vec<(Rc<str>, PropValue)>,
    /// The reserved `children` prop.
    pub children: Node,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prop, replacing an existing one with the same name in place.
    pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Look up a prop by name.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attributes
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }

    /// Props in insertion order (excluding `children`).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attributes.iter().map(|(n, v)| (&**n, v))
    }
}

// =============================================================================
// Element
// =============================================================================

/// An immutable UI description node.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub element_type: ElementType,
    pub key: Option<Key>,
    pub props: Rc<Props>,
}

impl Element {
    /// Describe a host element.
    pub fn host(tag: impl Into<Rc<str>>) -> Self {
        Self::new(ElementType::Host(tag.into()))
    }

    /// Describe an instance of a component.
    pub fn component(component: &Component) -> Self {
        Self::new(ElementType::Component(component.clone()))
    }

    fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            key: None,
            props: Rc::new(Props::default()),
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_prop(mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.props).set(name, value);
        self
    }

    /// Set the single `children` value.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        Rc::make_mut(&mut self.props).children = child.into();
        self
    }
}

// =============================================================================
// Node - a children value
// =============================================================================

/// A children value: an element, text, nothing, or a list.
///
/// Lists are describable but only single children are reconciled; a list
/// is treated like an unrecognized child and logged.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    #[default]
    Empty,
    Element(Rc<Element>),
    Text(Rc<str>),
    List(Rc<[Node]>),
}

impl Node {
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Build a multi-child list.
    pub fn list(children: impl IntoIterator<Item = Node>) -> Self {
        Node::List(children.into_iter().collect())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(Rc::new(element))
    }
}

impl From<Rc<Element>> for Node {
    fn from(element: Rc<Element>) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.into())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text.into())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Empty, Into::into)
    }
}

macro_rules! impl_node_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Text(value.to_string().into())
                }
            }
        )*
    };
}

impl_node_from_integer!(i32, i64, u32, u64, usize);

impl From<f64> for Node {
    /// Integral floats print without a fractional part (`100.0` -> `"100"`).
    fn from(value: f64) -> Self {
        let text = if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            value.to_string()
        };
        Node::Text(text.into())
    }
}
