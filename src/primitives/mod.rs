//! Primitives - Descriptions handed to the reconciler.
//!
//! - [`Element`] - a host tag or [`Component`] with key and props
//! - [`Node`] - a `children` value: element, text, nothing or a list
//! - [`Props`] / [`PropValue`] - ordered attributes plus `children`
//!
//! # Example
//!
//! ```ignore
//! let app = Component::new("App", |props| {
//!     let label = props.get("label").cloned();
//!     Ok(Element::host("div").with_child(match label {
//!         Some(PropValue::Str(text)) => Node::Text(text),
//!         _ => Node::Empty,
//!     }).into())
//! });
//!
//! let tree = Element::component(&app).with_prop("label", "hello");
//! ```

mod types;

pub use types::*;
