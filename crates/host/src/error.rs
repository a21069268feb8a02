use core::fmt;
use std::error::Error;

use crate::{NodeKey, SheetKey};

/// Why a stylesheet's rule collection could not be read.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AccessReason {
    /// Cross-origin or otherwise security-restricted. Will not change for this sheet.
    Restricted,
    /// The sheet has not finished loading. May succeed on a later pass.
    NotLoaded,
}

/// Errors reported by a host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostError {
    /// The node is no longer attached to a document.
    Detached(NodeKey),
    /// Style computation failed for this node.
    StyleUnavailable(NodeKey),
    /// The host has never heard of this node.
    UnknownNode(NodeKey),
    /// The host has never heard of this sheet.
    UnknownSheet(SheetKey),
    /// No style rule at this index.
    UnknownRule { sheet: SheetKey, index: usize },
    /// The sheet's rule collection cannot be read.
    SheetInaccessible { sheet: SheetKey, reason: AccessReason },
}

impl HostError {
    /// True when retrying on a later pass cannot succeed.
    pub fn is_permanent(&self) -> bool {
        !matches!(
            self,
            Self::SheetInaccessible {
                reason: AccessReason::NotLoaded,
                ..
            }
        )
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached(node) => write!(formatter, "{node} is detached"),
            Self::StyleUnavailable(node) => {
                write!(formatter, "computed style unavailable for {node}")
            }
            Self::UnknownNode(node) => write!(formatter, "unknown {node}"),
            Self::UnknownSheet(sheet) => write!(formatter, "unknown {sheet}"),
            Self::UnknownRule { sheet, index } => {
                write!(formatter, "{sheet} has no style rule at index {index}")
            }
            Self::SheetInaccessible { sheet, reason } => match reason {
                AccessReason::Restricted => write!(formatter, "{sheet} rules are restricted"),
                AccessReason::NotLoaded => write!(formatter, "{sheet} is not loaded yet"),
            },
        }
    }
}

impl Error for HostError {}
