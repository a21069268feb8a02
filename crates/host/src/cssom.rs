//! Minimal CSSOM model exchanged with the host.

use core::fmt;

use crate::{NodeKey, SheetKey};

/// What element a stylesheet came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SheetOwner {
    /// An externally linked sheet (`<link rel=stylesheet>`); tracked by identity.
    Linked,
    /// An inline `<style>` element; tracked by a marker attribute on `node`.
    Inline { node: NodeKey },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SheetInfo {
    pub key: SheetKey,
    pub owner: SheetOwner,
}

/// Rule type as reported by the CSSOM. Only `Style` rules carry declarations
/// the engine rewrites.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RuleKind {
    Style,
    Media,
    Keyframes,
    FontFace,
    Import,
    Other,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            important: false,
        }
    }

    #[must_use]
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CssRule {
    pub kind: RuleKind,
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl CssRule {
    /// A style rule with the given selector and declarations.
    pub fn style(selector: &str, declarations: Vec<Declaration>) -> Self {
        Self {
            kind: RuleKind::Style,
            selector: selector.to_owned(),
            declarations,
        }
    }

    /// An at-rule or other non-style rule; carries no declarations.
    pub fn other(kind: RuleKind, prelude: &str) -> Self {
        Self {
            kind,
            selector: prelude.to_owned(),
            declarations: Vec::new(),
        }
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|decl| decl.name == name)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.important {
            write!(formatter, "{}: {} !important", self.name, self.value)
        } else {
            write!(formatter, "{}: {}", self.name, self.value)
        }
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {{", self.selector)?;
        for decl in &self.declarations {
            write!(formatter, " {decl};")?;
        }
        write!(formatter, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_display_keeps_importance() {
        let rule = CssRule::style(
            "a",
            vec![
                Declaration::new("color", "#111"),
                Declaration::new("background-color", "#fff").important(),
            ],
        );
        assert_eq!(
            rule.to_string(),
            "a { color: #111; background-color: #fff !important; }"
        );
    }
}
