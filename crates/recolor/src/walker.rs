//! Batched recolorization of visual nodes.
//!
//! A pass snapshots every unmarked node, then processes a fixed-width batch
//! per call to [`BatchWalker::tick`]. The caller yields to the host scheduler
//! between ticks.

use host::{DocumentHost, HostError, NodeKey};
use log::{debug, trace, warn};

use crate::PROCESSED_MARKER;
use crate::properties::{COLOR_PROPERTIES, ColorProperty, is_default_token};
use crate::tone;

/// Walker lifecycle. Collection happens synchronously inside
/// [`BatchWalker::collect`], so the only observable states are these two.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WalkerState {
    Idle,
    /// Waiting to process batch `batch` (zero-based).
    Ticking { batch: usize },
}

/// What one tick did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TickReport {
    /// Nodes recolored and marked.
    pub nodes: usize,
    pub properties_rewritten: usize,
    /// Nodes whose style could not be read; left unmarked for a later pass.
    pub nodes_skipped: usize,
}

#[derive(Debug)]
pub struct BatchWalker {
    width: usize,
    queue: Vec<NodeKey>,
    cursor: usize,
    state: WalkerState,
}

impl BatchWalker {
    /// A walker processing `width` nodes per tick (at least one).
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            queue: Vec::new(),
            cursor: 0,
            state: WalkerState::Idle,
        }
    }

    pub const fn state(&self) -> WalkerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == WalkerState::Idle
    }

    /// Snapshot every node without the processed marker, including nodes in
    /// accessible embedded documents. Returns the snapshot length.
    pub fn collect<H: DocumentHost + ?Sized>(&mut self, host: &H) -> usize {
        self.queue = host
            .enumerate_nodes()
            .into_iter()
            .filter(|&node| host.attribute(node, PROCESSED_MARKER).is_none())
            .collect();
        self.cursor = 0;
        self.state = if self.queue.is_empty() {
            WalkerState::Idle
        } else {
            WalkerState::Ticking { batch: 0 }
        };
        debug!("collected {} unprocessed nodes", self.queue.len());
        self.queue.len()
    }

    /// Process the next batch. A no-op when idle.
    pub fn tick<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let WalkerState::Ticking { batch } = self.state else {
            return TickReport::default();
        };
        let end = self.cursor.saturating_add(self.width).min(self.queue.len());
        let mut report = TickReport::default();

        for &node in &self.queue[self.cursor..end] {
            match recolor_node(host, node) {
                Ok(rewritten) => {
                    report.properties_rewritten += rewritten;
                    if let Err(err) = host.set_attribute(node, PROCESSED_MARKER, "true") {
                        warn!("could not mark {node}: {err}");
                    }
                    report.nodes += 1;
                }
                Err(err) => {
                    warn!("skipping {node}: {err}");
                    report.nodes_skipped += 1;
                }
            }
        }

        self.cursor = end;
        self.state = if self.cursor >= self.queue.len() {
            self.queue.clear();
            self.cursor = 0;
            WalkerState::Idle
        } else {
            WalkerState::Ticking { batch: batch + 1 }
        };
        debug!(
            "batch {batch}: {} nodes, {} properties, {} skipped",
            report.nodes, report.properties_rewritten, report.nodes_skipped
        );
        report
    }
}

/// Rewrite every color property of `node`. Returns how many were overwritten.
fn recolor_node<H: DocumentHost + ?Sized>(host: &mut H, node: NodeKey) -> Result<usize, HostError> {
    let computed = host.computed_style(node)?;
    let mut rewritten = 0;
    for property in &COLOR_PROPERTIES {
        if skips_default(host, node, property)? {
            continue;
        }
        let Some(color) = tone::transform(computed.get(property.name), property.name, property.category)
        else {
            continue;
        };
        let literal = color.to_string();
        trace!("{node} {}: {} -> {literal}", property.name, computed.get(property.name));
        match host.set_style_property(node, property.name, &literal) {
            Ok(()) => rewritten += 1,
            Err(err) => warn!("could not set {} on {node}: {err}", property.name),
        }
    }
    Ok(rewritten)
}

fn skips_default<H: DocumentHost + ?Sized>(
    host: &H,
    node: NodeKey,
    property: &ColorProperty,
) -> Result<bool, HostError> {
    if !property.honors_default_tokens {
        return Ok(false);
    }
    Ok(is_default_token(&host.inline_style(node, property.name)?))
}
