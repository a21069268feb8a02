//! Host trait implementations: the engine's view of a [`Document`].

use host::{
    AccessReason, ActivityHub, ComputedStyle, CssRule, Declaration, DocumentHost, HostError,
    NodeKey, RuleKind, SheetInfo, SheetKey, StyleSheetHost,
};
use log::debug;

use super::{Document, SharedDocument, SheetState};

impl DocumentHost for Document {
    fn root(&self) -> NodeKey {
        self.root_key()
    }

    fn enumerate_nodes(&self) -> Vec<NodeKey> {
        self.ordered_nodes()
    }

    fn computed_style(&self, node: NodeKey) -> Result<ComputedStyle, HostError> {
        self.live_id(node)?;
        let target = self.node(node).ok_or(HostError::UnknownNode(node))?;
        if target.style_fails {
            return Err(HostError::StyleUnavailable(node));
        }
        let mut style = target.computed.clone();
        for (name, value) in &target.inline {
            if !value.is_empty() {
                style.set(name, value);
            }
        }
        Ok(style)
    }

    fn inline_style(&self, node: NodeKey, property: &str) -> Result<String, HostError> {
        self.live_id(node)?;
        let target = self.node(node).ok_or(HostError::UnknownNode(node))?;
        Ok(target.inline_value(property).unwrap_or_default().to_owned())
    }

    fn set_style_property(
        &mut self,
        node: NodeKey,
        property: &str,
        value: &str,
    ) -> Result<(), HostError> {
        let target = self.node_mut(node)?;
        if let Some(slot) = target.inline.iter_mut().find(|(name, _)| name == property) {
            value.clone_into(&mut slot.1);
        } else {
            target.inline.push((property.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.node(node)?.attr(name).map(str::to_owned)
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), HostError> {
        self.write_attr(node, name, value)
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn observe_mutations(&mut self, observer: Option<ActivityHub>) {
        debug!(
            "mutation observer {}",
            if observer.is_some() { "connected" } else { "disconnected" }
        );
        self.observer = observer;
    }
}

impl StyleSheetHost for Document {
    fn style_sheets(&self) -> Vec<SheetInfo> {
        self.sheets
            .iter()
            .map(|entry| SheetInfo {
                key: entry.key,
                owner: entry.owner,
            })
            .collect()
    }

    fn sheet_rules(&self, sheet: SheetKey) -> Result<Vec<CssRule>, HostError> {
        match &self.sheet_entry(sheet)?.state {
            SheetState::Loaded(rules) => Ok(rules.clone()),
            SheetState::NotLoaded => Err(HostError::SheetInaccessible {
                sheet,
                reason: AccessReason::NotLoaded,
            }),
            SheetState::Restricted => Err(HostError::SheetInaccessible {
                sheet,
                reason: AccessReason::Restricted,
            }),
        }
    }

    fn set_rule_property(
        &mut self,
        sheet: SheetKey,
        rule_index: usize,
        selector: &str,
        declaration: &Declaration,
    ) -> Result<(), HostError> {
        let unknown = HostError::UnknownRule {
            sheet,
            index: rule_index,
        };
        let SheetState::Loaded(rules) = &mut self.sheet_mut(sheet)?.state else {
            return Err(unknown);
        };
        let rule = rules
            .get_mut(rule_index)
            .filter(|rule| rule.kind == RuleKind::Style && rule.selector == selector)
            .ok_or(unknown)?;
        if let Some(slot) = rule
            .declarations
            .iter_mut()
            .find(|decl| decl.name == declaration.name)
        {
            slot.clone_from(declaration);
        } else {
            rule.declarations.push(declaration.clone());
        }
        Ok(())
    }
}

impl DocumentHost for SharedDocument {
    fn root(&self) -> NodeKey {
        self.borrow().root()
    }

    fn enumerate_nodes(&self) -> Vec<NodeKey> {
        self.borrow().enumerate_nodes()
    }

    fn computed_style(&self, node: NodeKey) -> Result<ComputedStyle, HostError> {
        self.borrow().computed_style(node)
    }

    fn inline_style(&self, node: NodeKey, property: &str) -> Result<String, HostError> {
        self.borrow().inline_style(node, property)
    }

    fn set_style_property(
        &mut self,
        node: NodeKey,
        property: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.borrow_mut().set_style_property(node, property, value)
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.borrow().attribute(node, name)
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), HostError> {
        self.borrow_mut().set_attribute(node, name, value)
    }

    fn is_visible(&self) -> bool {
        self.borrow().is_visible()
    }

    fn observe_mutations(&mut self, observer: Option<ActivityHub>) {
        self.borrow_mut().observe_mutations(observer);
    }
}

impl StyleSheetHost for SharedDocument {
    fn style_sheets(&self) -> Vec<SheetInfo> {
        self.borrow().style_sheets()
    }

    fn sheet_rules(&self, sheet: SheetKey) -> Result<Vec<CssRule>, HostError> {
        self.borrow().sheet_rules(sheet)
    }

    fn set_rule_property(
        &mut self,
        sheet: SheetKey,
        rule_index: usize,
        selector: &str,
        declaration: &Declaration,
    ) -> Result<(), HostError> {
        self.borrow_mut()
            .set_rule_property(sheet, rule_index, selector, declaration)
    }
}
