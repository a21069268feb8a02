//! Host facade shared by the recolorization crates.
//! This crate centralizes the interfaces and types through which the engine
//! talks to whatever owns the rendered tree: node and sheet keys, the CSSOM
//! rule model, host errors, and the activity signal plumbing.

use core::fmt;
use std::collections::HashMap;

pub mod activity;
pub use activity::{ActivityHub, Signal};

pub mod cssom;
pub use cssom::{CssRule, Declaration, RuleKind, SheetInfo, SheetOwner};

mod error;
pub use error::{AccessReason, HostError};

// ============================
// Stable keys (shared across subsystems)
// ============================

/// A 64-bit stable key for visual nodes, unique across the primary document
/// and every embedded document the host exposes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct NodeKey(pub u64);

impl fmt::Display for NodeKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "node#{}", self.0)
    }
}

/// Identity of a loaded stylesheet. Two handles to the same sheet compare equal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct SheetKey(pub u64);

impl fmt::Display for SheetKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "sheet#{}", self.0)
    }
}

// ============================
// Computed style view
// ============================

/// Read-only snapshot of the resolved value of every style property on a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    values: HashMap<String, String>,
}

impl ComputedStyle {
    /// Build a snapshot from `(property, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Resolved value of `property`, or the empty string when the host reports none.
    pub fn get(&self, property: &str) -> &str {
        self.values.get(property).map_or("", String::as_str)
    }

    /// Override one resolved value.
    pub fn set(&mut self, property: &str, value: &str) {
        self.values.insert(property.to_owned(), value.to_owned());
    }
}

// ============================
// Host traits
// ============================

/// The rendered element tree as seen by the engine.
///
/// The engine never creates or destroys nodes. It reads computed style,
/// writes settable style overrides, and annotates nodes with attributes.
pub trait DocumentHost {
    /// The document element of the primary document.
    fn root(&self) -> NodeKey;

    /// Every visual node in the primary tree followed by every node inside
    /// each accessible embedded document, in document order.
    fn enumerate_nodes(&self) -> Vec<NodeKey>;

    /// Resolved style of `node`.
    ///
    /// # Errors
    /// Returns an error when the node is detached or its style cannot be computed.
    fn computed_style(&self, node: NodeKey) -> Result<ComputedStyle, HostError>;

    /// The node's own settable value for `property`, or `""` when unset.
    ///
    /// # Errors
    /// Returns an error when the node is unknown to the host.
    fn inline_style(&self, node: NodeKey, property: &str) -> Result<String, HostError>;

    /// Overwrite the node's settable value for `property`.
    ///
    /// # Errors
    /// Returns an error when the node is unknown to the host.
    fn set_style_property(
        &mut self,
        node: NodeKey,
        property: &str,
        value: &str,
    ) -> Result<(), HostError>;

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String>;

    /// Set an attribute on `node`.
    ///
    /// # Errors
    /// Returns an error when the node is unknown to the host.
    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str)
    -> Result<(), HostError>;

    /// Whether the page is currently visible to the user.
    fn is_visible(&self) -> bool;

    /// Connect (`Some`) or disconnect (`None`) the structural mutation observer.
    /// While connected, the host notifies `Signal::Mutation` on the hub for
    /// every structural change.
    fn observe_mutations(&mut self, observer: Option<ActivityHub>);
}

/// The CSSOM side of the host.
pub trait StyleSheetHost {
    /// Every stylesheet currently attached to the primary and accessible embedded documents.
    fn style_sheets(&self) -> Vec<SheetInfo>;

    /// The rule collection of `sheet`.
    ///
    /// # Errors
    /// Returns [`HostError::SheetInaccessible`] when the sheet is not loaded
    /// yet or its rules are security-restricted.
    fn sheet_rules(&self, sheet: SheetKey) -> Result<Vec<CssRule>, HostError>;

    /// Replace (or add) one declaration inside the style rule at `rule_index`,
    /// provided that rule still carries `selector`.
    ///
    /// # Errors
    /// Returns [`HostError::UnknownRule`] when the sheet no longer holds a
    /// style rule for `selector` at `rule_index`.
    fn set_rule_property(
        &mut self,
        sheet: SheetKey,
        rule_index: usize,
        selector: &str,
        declaration: &Declaration,
    ) -> Result<(), HostError>;
}
