use super::{Document, DomNode, FrameContent, NodeKind};
use indextree::NodeId;

use serde_json::{Map, Value, json};

// -----------------------
// Module-scope helpers
// -----------------------

fn sorted_object(pairs: &[(String, String)]) -> Value {
    let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
    sorted.sort_by(|left, right| left.0.cmp(&right.0));
    let mut object = Map::new();
    for (name, value) in sorted {
        object.insert(name.clone(), Value::String(value.clone()));
    }
    Value::Object(object)
}

fn node_to_json(doc: &Document, id: NodeId) -> Value {
    let Some(node_ref) = doc.dom.get(id) else {
        return Value::Null;
    };
    let DomNode {
        kind,
        attrs,
        inline,
        ..
    } = node_ref.get();
    let attr_pairs: Vec<(String, String)> = attrs.iter().cloned().collect();
    let children: Vec<Value> = id
        .children(&doc.dom)
        .map(|child| node_to_json(doc, child))
        .filter(|value| !value.is_null())
        .collect();
    let mut out = json!({
        "tag": node_ref.get().tag(),
        "attrs": sorted_object(&attr_pairs),
        "style": sorted_object(inline),
        "children": children,
    });
    if let NodeKind::Frame { content } = kind {
        out["document"] = match content {
            FrameContent::SameOrigin(inner) => node_to_json(doc, *inner),
            FrameContent::CrossOrigin => Value::String("cross-origin".to_owned()),
        };
    }
    out
}

impl Document {
    /// Deterministic JSON snapshot of the tree: tag, attributes, settable
    /// style, children, and embedded documents.
    pub fn to_json(&self) -> Value {
        node_to_json(self, self.root)
    }
}
