//! Adaptive recolorization of a live document towards a dark palette.
//!
//! [`Recolorizer`] owns the long-lived state of the engine (the stylesheet
//! processed-set, the batch cursors) and runs one pass at a time as a sequence
//! of short, synchronous ticks. Scheduling those ticks is left to the caller.

use host::{DocumentHost, StyleSheetHost};
use log::{debug, info, warn};

pub mod properties;
pub mod stylesheet;
pub mod tone;
pub mod walker;

pub use stylesheet::{RuleTickReport, StylesheetRewriter};
pub use walker::{BatchWalker, TickReport, WalkerState};

/// Attribute set on every node once its colors have been handled.
pub const PROCESSED_MARKER: &str = "data-recolored";
/// Attribute set on an inline `<style>` element once its rules have been handled.
pub const SHEET_MARKER: &str = "data-recolored-sheet";
/// Background painted on the document root at the start of each pass.
pub const ROOT_BACKDROP: &str = "#000";

/// Counters for one pass.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PassSummary {
    pub nodes: usize,
    pub node_ticks: usize,
    pub properties_rewritten: usize,
    pub nodes_skipped: usize,
    pub rules_visited: usize,
    pub rule_ticks: usize,
    pub declarations_rewritten: usize,
    pub sheets_completed: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Phase {
    Idle,
    Rules,
    Nodes,
}

/// Result of advancing a pass by one tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PassProgress {
    /// More ticks are needed; yield to the host first.
    Pending,
    Complete(PassSummary),
}

#[derive(Debug)]
pub struct Recolorizer {
    walker: BatchWalker,
    rewriter: StylesheetRewriter,
    stylesheets: bool,
    phase: Phase,
    summary: PassSummary,
}

impl Recolorizer {
    /// An engine processing `batch_width` nodes or rules per tick. With
    /// `stylesheets` off, only nodes are rewritten.
    pub fn new(batch_width: usize, stylesheets: bool) -> Self {
        Self {
            walker: BatchWalker::new(batch_width),
            rewriter: StylesheetRewriter::new(batch_width),
            stylesheets,
            phase: Phase::Idle,
            summary: PassSummary::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub const fn walker(&self) -> &BatchWalker {
        &self.walker
    }

    pub const fn rewriter(&self) -> &StylesheetRewriter {
        &self.rewriter
    }

    /// Start a pass: paint the root backdrop and snapshot pending work.
    /// Returns `false` when a pass is already in flight.
    pub fn begin<H>(&mut self, host: &mut H) -> bool
    where
        H: DocumentHost + StyleSheetHost + ?Sized,
    {
        if self.is_running() {
            return false;
        }
        let root = host.root();
        if let Err(err) = host.set_style_property(root, "background-color", ROOT_BACKDROP) {
            warn!("could not paint root backdrop: {err}");
        }

        self.summary = PassSummary::default();
        let rules = if self.stylesheets {
            self.rewriter.collect(host)
        } else {
            0
        };
        let nodes = self.walker.collect(host);
        self.phase = if self.stylesheets && !self.rewriter.is_idle() {
            Phase::Rules
        } else {
            Phase::Nodes
        };
        info!("pass started: {nodes} nodes, {rules} rules");
        true
    }

    /// Advance the current pass by one batch.
    pub fn tick<H>(&mut self, host: &mut H) -> PassProgress
    where
        H: DocumentHost + StyleSheetHost + ?Sized,
    {
        match self.phase {
            Phase::Idle => return PassProgress::Complete(self.summary),
            Phase::Rules => {
                let report = self.rewriter.tick(host);
                self.summary.rule_ticks += 1;
                self.summary.rules_visited += report.rules;
                self.summary.declarations_rewritten += report.declarations_rewritten;
                self.summary.sheets_completed += report.sheets_completed;
                if self.rewriter.is_idle() {
                    self.phase = Phase::Nodes;
                }
            }
            Phase::Nodes => {
                if !self.walker.is_idle() {
                    let report = self.walker.tick(host);
                    self.summary.node_ticks += 1;
                    self.summary.nodes += report.nodes;
                    self.summary.properties_rewritten += report.properties_rewritten;
                    self.summary.nodes_skipped += report.nodes_skipped;
                }
                if self.walker.is_idle() {
                    self.phase = Phase::Idle;
                    info!(
                        "pass complete: {} nodes, {} properties, {} declarations",
                        self.summary.nodes,
                        self.summary.properties_rewritten,
                        self.summary.declarations_rewritten
                    );
                    return PassProgress::Complete(self.summary);
                }
            }
        }
        debug!("pass pending");
        PassProgress::Pending
    }

    /// Run a whole pass without yielding. Intended for hosts with no scheduler.
    pub fn run_to_completion<H>(&mut self, host: &mut H) -> PassSummary
    where
        H: DocumentHost + StyleSheetHost + ?Sized,
    {
        if !self.is_running() {
            self.begin(host);
        }
        loop {
            if let PassProgress::Complete(summary) = self.tick(host) {
                return summary;
            }
        }
    }
}
