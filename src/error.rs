//! Error types for the reconciler.
//!
//! Three layers, from innermost to outermost:
//!
//! - [`HookError`] - programmer errors in component bodies. Always fatal.
//! - [`RenderError`] - what a component body returns. Wraps hook errors (fatal)
//!   or carries a component failure (aborts only the current pass).
//! - [`ReconcileError`] - what [`update_root`](crate::update_root) and
//!   [`Dispatch`](crate::Dispatch) return to the caller.

use thiserror::Error;

// =============================================================================
// Hook errors
// =============================================================================

/// Misuse of the state primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// `use_state` was called while no function component was rendering.
    #[error("hooks must be called during component render")]
    OutsideRender,

    /// The component called more hooks than during its previous render.
    #[error(
        "component `{component}` rendered more hooks than during the previous render (expected {expected})"
    )]
    TooManyHooks { component: String, expected: usize },

    /// The component called fewer hooks than during its previous render.
    #[error(
        "component `{component}` rendered fewer hooks than during the previous render ({rendered} of {expected})"
    )]
    TooFewHooks {
        component: String,
        rendered: usize,
        expected: usize,
    },

    /// The hook at `index` was asked for a different state type than it holds.
    #[error("hook #{index} in component `{component}` changed its state type between renders")]
    StateTypeMismatch { component: String, index: usize },
}

// =============================================================================
// Render errors
// =============================================================================

/// Failure raised while rendering a component body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Hook misuse. Surfaces to the caller that triggered the pass.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The component itself failed. Aborts the pass; the committed tree stays.
    #[error("component failed to render: {0}")]
    Component(String),
}

impl RenderError {
    /// Build a component failure from any displayable message.
    pub fn component(message: impl std::fmt::Display) -> Self {
        Self::Component(message.to_string())
    }

    /// Fatal errors escape the work loop; the rest only abort the pass.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Hook(_))
    }
}

// =============================================================================
// Reconcile errors
// =============================================================================

/// Error returned by root updates and dispatch handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Updates kept scheduling follow-up passes past the configured limit.
    #[error("maximum update depth exceeded: {limit} nested render passes")]
    NestedUpdateLimit { limit: usize },
}
