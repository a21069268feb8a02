//! In-place rewriting of color declarations inside CSSOM style rules.
//!
//! Rules are processed in the same fixed-width batches as nodes. A linked
//! sheet is remembered by identity once fully visited; an inline `<style>`
//! sheet is remembered through [`SHEET_MARKER`] on its owner element.

use std::collections::HashSet;
use std::sync::LazyLock;

use host::{
    CssRule, Declaration, DocumentHost, HostError, RuleKind, SheetInfo, SheetKey, SheetOwner,
    StyleSheetHost,
};
use log::{debug, trace, warn};
use regex::{Captures, Regex};

use crate::SHEET_MARKER;
use crate::properties::{Category, rule_category};
use crate::tone;

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static COLOR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)url\([^)]*\)|#[0-9a-f]{3,8}\b|rgba?\([^()]*\)")
        .expect("valid color literal pattern")
});

/// A `#` glued to one of these is a fragment or an id, not a hex color.
fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.' | b'/' | b'%' | b'#')
}

#[derive(Debug)]
struct RuleWork {
    sheet: SheetKey,
    index: usize,
    rule: CssRule,
}

/// What one rule tick did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RuleTickReport {
    pub rules: usize,
    pub declarations_rewritten: usize,
    /// Sheets recorded as processed at the end of this tick.
    pub sheets_completed: usize,
}

#[derive(Debug)]
pub struct StylesheetRewriter {
    width: usize,
    /// Linked sheets already fully rewritten.
    processed: HashSet<SheetKey>,
    /// Sheets whose rules will never be readable.
    blocked: HashSet<SheetKey>,
    queue: Vec<RuleWork>,
    cursor: usize,
    /// Sheets collected this pass, recorded as processed when the queue drains.
    collected: Vec<SheetInfo>,
    /// Collected sheets whose rule list shifted since the snapshot.
    stale: HashSet<SheetKey>,
}

impl StylesheetRewriter {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            processed: HashSet::new(),
            blocked: HashSet::new(),
            queue: Vec::new(),
            cursor: 0,
            collected: Vec::new(),
            stale: HashSet::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.collected.is_empty()
    }

    pub fn is_processed(&self, sheet: SheetKey) -> bool {
        self.processed.contains(&sheet)
    }

    pub fn is_blocked(&self, sheet: SheetKey) -> bool {
        self.blocked.contains(&sheet)
    }

    /// Snapshot the style rules of every sheet not yet processed.
    /// Returns the number of rules queued.
    pub fn collect<H>(&mut self, host: &H) -> usize
    where
        H: StyleSheetHost + DocumentHost + ?Sized,
    {
        self.queue.clear();
        self.cursor = 0;
        self.collected.clear();
        self.stale.clear();

        for info in host.style_sheets() {
            if self.already_done(host, info) {
                continue;
            }
            match host.sheet_rules(info.key) {
                Ok(rules) => {
                    self.queue.extend(
                        rules
                            .into_iter()
                            .enumerate()
                            .filter(|(_, rule)| rule.kind == RuleKind::Style)
                            .map(|(index, rule)| RuleWork {
                                sheet: info.key,
                                index,
                                rule,
                            }),
                    );
                    self.collected.push(info);
                }
                Err(err) => self.record_inaccessible(info.key, &err),
            }
        }
        debug!(
            "collected {} style rules from {} sheets",
            self.queue.len(),
            self.collected.len()
        );
        self.queue.len()
    }

    /// Rewrite the next batch of rules. Once the queue drains, every sheet
    /// collected this pass is recorded as processed, except sheets whose rule
    /// list shifted under the snapshot; those are collected again next pass.
    pub fn tick<H>(&mut self, host: &mut H) -> RuleTickReport
    where
        H: StyleSheetHost + DocumentHost + ?Sized,
    {
        let mut report = RuleTickReport::default();
        if self.is_idle() {
            return report;
        }
        let end = self.cursor.saturating_add(self.width).min(self.queue.len());
        for work in &self.queue[self.cursor..end] {
            if self.stale.contains(&work.sheet) {
                continue;
            }
            report.rules += 1;
            match rewrite_rule(host, work) {
                Ok(count) => report.declarations_rewritten += count,
                Err(err) => {
                    debug!("{} changed since collection, retrying next pass: {err}", work.sheet);
                    self.stale.insert(work.sheet);
                }
            }
        }
        self.cursor = end;

        if self.cursor >= self.queue.len() {
            report.sheets_completed = self.finish(host);
        }
        report
    }

    fn already_done<H: DocumentHost + ?Sized>(&self, host: &H, info: SheetInfo) -> bool {
        if self.blocked.contains(&info.key) {
            return true;
        }
        match info.owner {
            SheetOwner::Linked => self.processed.contains(&info.key),
            SheetOwner::Inline { node } => host.attribute(node, SHEET_MARKER).is_some(),
        }
    }

    fn record_inaccessible(&mut self, sheet: SheetKey, err: &HostError) {
        if err.is_permanent() {
            warn!("skipping {sheet} for good: {err}");
            self.blocked.insert(sheet);
        } else {
            debug!("skipping {sheet} this pass: {err}");
        }
    }

    fn finish<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let mut completed = 0;
        for info in self.collected.drain(..) {
            if self.stale.contains(&info.key) {
                continue;
            }
            completed += 1;
            match info.owner {
                SheetOwner::Linked => {
                    self.processed.insert(info.key);
                }
                SheetOwner::Inline { node } => {
                    if let Err(err) = host.set_attribute(node, SHEET_MARKER, "true") {
                        warn!("could not mark {} owner {node}: {err}", info.key);
                    }
                }
            }
        }
        self.queue.clear();
        self.cursor = 0;
        self.stale.clear();
        completed
    }
}

/// Write every transformed declaration of one rule. Fails when the rule no
/// longer sits at its snapshot index.
fn rewrite_rule<H: StyleSheetHost + ?Sized>(
    host: &mut H,
    work: &RuleWork,
) -> Result<usize, HostError> {
    let mut rewritten = 0;
    for decl in &work.rule.declarations {
        let Some(category) = rule_category(&decl.name) else {
            continue;
        };
        let Some(value) = rewrite_value(&decl.value, &decl.name, category) else {
            continue;
        };
        trace!("{} `{}` {}: {} -> {value}", work.sheet, work.rule.selector, decl.name, decl.value);
        let updated = Declaration {
            value,
            ..decl.clone()
        };
        match host.set_rule_property(work.sheet, work.index, &work.rule.selector, &updated) {
            Ok(()) => rewritten += 1,
            Err(err @ HostError::UnknownRule { .. }) => return Err(err),
            Err(err) => warn!("could not rewrite {}: {err}", work.rule.selector),
        }
    }
    Ok(rewritten)
}

/// Transform every color literal in a declaration value. Returns `None` when
/// nothing changed; literals that cannot be transformed are kept verbatim.
pub fn rewrite_value(value: &str, property: &str, category: Category) -> Option<String> {
    let trimmed = value.trim();
    let is_ident = !trimmed.is_empty()
        && trimmed
            .bytes()
            .all(|byte| byte.is_ascii_alphabetic() || byte == b'-');
    if is_ident {
        return tone::transform(trimmed, property, category).map(|color| color.to_string());
    }

    let rewritten = COLOR_LITERAL.replace_all(value, |caps: &Captures<'_>| {
        let literal = &caps[0];
        let glued = caps
            .get(0)
            .and_then(|found| found.start().checked_sub(1))
            .and_then(|before| value.as_bytes().get(before))
            .is_some_and(|&byte| is_name_byte(byte));
        if glued || literal.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("url(")) {
            return literal.to_owned();
        }
        tone::transform(literal, property, category)
            .map_or_else(|| literal.to_owned(), |color| color.to_string())
    });
    (rewritten != value).then(|| rewritten.into_owned())
}
