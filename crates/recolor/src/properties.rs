//! The table of color properties the engine rewrites, partitioned into
//! foreground (lightened) and background/border (darkened) categories.

/// Which way a property is pushed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Category {
    /// Text-like colors: lightened when dark.
    Foreground,
    /// Fills and borders: darkened when light.
    Background,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ColorProperty {
    pub name: &'static str,
    pub category: Category,
    /// Skip this property when the node's own value is a default token
    /// (`inherit`, `initial`, `unset`, or empty).
    pub honors_default_tokens: bool,
}

impl ColorProperty {
    const fn background(name: &'static str) -> Self {
        Self {
            name,
            category: Category::Background,
            honors_default_tokens: false,
        }
    }

    const fn foreground(name: &'static str) -> Self {
        Self {
            name,
            category: Category::Foreground,
            honors_default_tokens: false,
        }
    }

    const fn honoring_defaults(mut self) -> Self {
        self.honors_default_tokens = true;
        self
    }
}

/// Node properties, in the order they are processed.
pub const COLOR_PROPERTIES: [ColorProperty; 8] = [
    ColorProperty::background("border-left-color"),
    ColorProperty::background("border-top-color"),
    ColorProperty::background("border-right-color"),
    ColorProperty::background("border-bottom-color"),
    ColorProperty::background("background-color"),
    ColorProperty::foreground("color"),
    ColorProperty::foreground("caret-color"),
    ColorProperty::foreground("-webkit-text-fill-color").honoring_defaults(),
];

/// Shorthands that may carry color literals inside stylesheet declarations.
pub const RULE_SHORTHANDS: [&str; 9] = [
    "background",
    "border",
    "border-color",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "outline",
    "outline-color",
];

const DEFAULT_TOKENS: [&str; 4] = ["inherit", "initial", "unset", ""];

/// True for values that defer to the cascade instead of naming a color.
pub fn is_default_token(value: &str) -> bool {
    let trimmed = value.trim();
    DEFAULT_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

pub fn lookup(name: &str) -> Option<&'static ColorProperty> {
    COLOR_PROPERTIES.iter().find(|property| property.name == name)
}

/// Category for a declaration found in a style rule.
pub fn rule_category(name: &str) -> Option<Category> {
    lookup(name)
        .map(|property| property.category)
        .or_else(|| RULE_SHORTHANDS.contains(&name).then_some(Category::Background))
}
