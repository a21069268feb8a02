use std::error::Error;

use host::{CssRule, Declaration, DocumentHost as _, RuleKind, SheetKey};
use html::Document;
use recolor::{Recolorizer, SHEET_MARKER, StylesheetRewriter};

type TestResult = Result<(), Box<dyn Error>>;

fn value_of(doc: &Document, sheet: SheetKey, rule: usize, name: &str) -> Option<String> {
    doc.rules(sheet)?
        .get(rule)?
        .declaration(name)
        .map(|decl| decl.value.clone())
}

#[test]
fn linked_and_inline_sheets_are_rewritten_once() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::new();
    let root = doc.root_key();
    let linked = doc.add_linked_sheet(vec![CssRule::style(
        "p",
        vec![
            Declaration::new("color", "#000"),
            Declaration::new("background", "#fff url(paper.png)"),
            Declaration::new("width", "10px"),
        ],
    )]);
    let (style_node, inline) = doc.add_inline_sheet(
        root,
        vec![CssRule::style(
            ".card",
            vec![Declaration::new("border", "1px solid #fff").important()],
        )],
    )?;
    let mut engine = Recolorizer::new(500, true);

    let first = engine.run_to_completion(&mut doc);
    assert_eq!(first.rules_visited, 2);
    assert_eq!(first.declarations_rewritten, 3);
    assert_eq!(first.sheets_completed, 2);
    assert_eq!(value_of(&doc, linked, 0, "color").as_deref(), Some("rgba(204, 204, 204, 1)"));
    assert_eq!(
        value_of(&doc, linked, 0, "background").as_deref(),
        Some("rgba(41, 41, 41, 1) url(paper.png)")
    );
    assert_eq!(value_of(&doc, linked, 0, "width").as_deref(), Some("10px"));

    let border = doc
        .rules(inline)
        .and_then(|rules| rules[0].declaration("border"))
        .ok_or("border declaration missing")?;
    assert_eq!(border.value, "1px solid rgba(85, 85, 85, 1)");
    assert!(border.important);

    assert!(engine.rewriter().is_processed(linked));
    assert_eq!(doc.attribute(style_node, SHEET_MARKER).as_deref(), Some("true"));

    let second = engine.run_to_completion(&mut doc);
    assert_eq!(second.rules_visited, 0);
    assert_eq!(second.rule_ticks, 0);
    assert_eq!(value_of(&doc, linked, 0, "color").as_deref(), Some("rgba(204, 204, 204, 1)"));
    Ok(())
}

#[test]
fn rules_are_batched() -> TestResult {
    let mut doc = Document::new();
    let rules = (0..5)
        .map(|idx| {
            CssRule::style(
                &format!(".r{idx}"),
                vec![Declaration::new("background-color", "white")],
            )
        })
        .collect();
    let sheet = doc.add_linked_sheet(rules);

    let summary = Recolorizer::new(2, true).run_to_completion(&mut doc);
    assert_eq!(summary.rule_ticks, 3);
    assert_eq!(summary.rules_visited, 5);
    assert_eq!(
        value_of(&doc, sheet, 4, "background-color").as_deref(),
        Some("rgba(41, 41, 41, 1)")
    );
    Ok(())
}

#[test]
fn restricted_sheets_are_blocked_and_pending_ones_retried() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::new();
    let restricted = doc.add_restricted_sheet();
    let pending = doc.add_pending_sheet();
    let mut engine = Recolorizer::new(500, true);

    let first = engine.run_to_completion(&mut doc);
    assert_eq!(first.rules_visited, 0);
    assert!(engine.rewriter().is_blocked(restricted));
    assert!(!engine.rewriter().is_blocked(pending));
    assert!(!engine.rewriter().is_processed(pending));

    doc.finish_loading(
        pending,
        vec![CssRule::style("a", vec![Declaration::new("color", "rgb(0, 0, 0)")])],
    )?;
    let second = engine.run_to_completion(&mut doc);
    assert_eq!(second.rules_visited, 1);
    assert_eq!(second.declarations_rewritten, 1);
    assert!(engine.rewriter().is_processed(pending));
    Ok(())
}

#[test]
fn non_style_rules_are_not_visited() -> TestResult {
    let mut doc = Document::new();
    let sheet = doc.add_linked_sheet(vec![
        CssRule::other(RuleKind::Media, "@media (prefers-color-scheme: dark)"),
        CssRule::other(RuleKind::FontFace, "@font-face"),
        CssRule::style("body", vec![Declaration::new("border-top-color", "#ffffff")]),
        CssRule::other(RuleKind::Keyframes, "@keyframes pulse"),
    ]);

    let summary = Recolorizer::new(500, true).run_to_completion(&mut doc);
    assert_eq!(summary.rules_visited, 1);
    assert_eq!(
        value_of(&doc, sheet, 2, "border-top-color").as_deref(),
        Some("rgba(85, 85, 85, 1)")
    );
    Ok(())
}

#[test]
fn disabled_rewriter_leaves_sheets_untouched() -> TestResult {
    let mut doc = Document::new();
    let sheet = doc.add_linked_sheet(vec![CssRule::style(
        "p",
        vec![Declaration::new("color", "black")],
    )]);

    let summary = Recolorizer::new(500, false).run_to_completion(&mut doc);
    assert_eq!(summary.rules_visited, 0);
    assert_eq!(value_of(&doc, sheet, 0, "color").as_deref(), Some("black"));
    assert!(!Recolorizer::new(500, false).rewriter().is_processed(sheet));
    Ok(())
}

#[test]
fn rule_inserted_mid_pass_is_not_overwritten() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::new();
    let sheet = doc.add_linked_sheet(vec![CssRule::style(
        "p",
        vec![Declaration::new("background", "#fff")],
    )]);
    let mut rewriter = StylesheetRewriter::new(500);

    assert_eq!(rewriter.collect(&doc), 1);
    doc.insert_rule(sheet, 0, CssRule::style("a", Vec::new()))?;
    let report = rewriter.tick(&mut doc);

    assert_eq!(report.declarations_rewritten, 0);
    assert_eq!(report.sheets_completed, 0);
    assert!(rewriter.is_idle());
    assert!(!rewriter.is_processed(sheet));
    assert_eq!(value_of(&doc, sheet, 0, "background"), None);
    assert_eq!(value_of(&doc, sheet, 1, "background").as_deref(), Some("#fff"));

    assert_eq!(rewriter.collect(&doc), 2);
    let retry = rewriter.tick(&mut doc);
    assert_eq!(retry.declarations_rewritten, 1);
    assert_eq!(retry.sheets_completed, 1);
    assert!(rewriter.is_processed(sheet));
    assert_eq!(
        value_of(&doc, sheet, 1, "background").as_deref(),
        Some("rgba(41, 41, 41, 1)")
    );
    Ok(())
}
