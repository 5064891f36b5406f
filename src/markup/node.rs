//! Owned markup tree model.
//!
//! Elements keep their attributes in source order. Two attributes get
//! structured treatment beyond a plain string:
//! - the class list (`className` or `class`) is exposed as a token vector
//! - `style={{...}}` objects are parsed into an ordered [`StyleMap`]
//!
//! Everything else round-trips verbatim.

use std::fmt;

/// A parsed markup document. Fragments with multiple roots are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub roots: Vec<Node>,
}

impl Document {
    /// Visit every element in the tree, pre-order.
    pub fn for_each_element_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        for root in &mut self.roots {
            if let Node::Element(elem) = root {
                visit_element(elem, f);
            }
        }
    }

    /// First root element, if any.
    pub fn root_element_mut(&mut self) -> Option<&mut Element> {
        self.roots.iter_mut().find_map(|n| match n {
            Node::Element(e) => Some(e.as_mut()),
            Node::Text(_) => None,
        })
    }
}

fn visit_element(elem: &mut Element, f: &mut impl FnMut(&mut Element)) {
    f(elem);
    for child in &mut elem.children {
        if let Node::Element(child_elem) = child {
            visit_element(child_elem, f);
        }
    }
}

/// One tree node: an element or a text run.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Box<Element>),
    Text(String),
}

impl Node {
    pub fn element(elem: Element) -> Self {
        Self::Element(Box::new(elem))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Attribute value shapes found in JSX markup.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Quoted string value: `src="img.svg"`.
    Literal(String),
    /// Brace expression kept opaque: `onClick={...}`.
    Expr(String),
    /// Parsed `style={{...}}` object.
    Style(StyleMap),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: String,
    pub value: AttrValue,
}

// ============================================================================
// Element
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Literal attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find_map(|a| match &a.value {
            AttrValue::Literal(v) if a.name == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// Set a literal attribute, replacing any existing value under that name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = AttrValue::Literal(value.into());
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attrs.push(Attr {
                name: name.to_string(),
                value,
            });
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|a| a.name != name);
    }

    // ------------------------------------------------------------------------
    // class list
    // ------------------------------------------------------------------------

    /// Name of the class attribute present on this element, if any.
    /// Figma output uses `className`; plain HTML fragments use `class`.
    fn class_attr_name(&self) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == "className" || a.name == "class")
            .map(|a| a.name.as_str())
    }

    /// Class tokens in source order. Empty when no class attribute exists.
    pub fn classes(&self) -> Vec<String> {
        self.class_attr_name()
            .and_then(|name| self.get_attr(name))
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Replace the class list, keeping the original attribute name.
    /// An empty list removes the attribute entirely.
    pub fn set_classes(&mut self, tokens: &[String]) {
        let name = self.class_attr_name().unwrap_or("className").to_string();
        if tokens.is_empty() {
            self.remove_attr(&name);
        } else {
            self.set_attr(&name, tokens.join(" "));
        }
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes().iter().any(|t| t == token)
    }

    pub fn add_class(&mut self, token: &str) {
        let mut tokens = self.classes();
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
            self.set_classes(&tokens);
        }
    }

    // ------------------------------------------------------------------------
    // inline style
    // ------------------------------------------------------------------------

    pub fn style(&self) -> Option<&StyleMap> {
        self.attrs.iter().find_map(|a| match &a.value {
            AttrValue::Style(map) if a.name == "style" => Some(map),
            _ => None,
        })
    }

    /// Mutable style map, creating an empty `style` attribute if absent.
    pub fn style_mut(&mut self) -> &mut StyleMap {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.name == "style" && matches!(a.value, AttrValue::Style(_)));
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.attrs.push(Attr {
                    name: "style".to_string(),
                    value: AttrValue::Style(StyleMap::default()),
                });
                self.attrs.len() - 1
            }
        };
        match &mut self.attrs[pos].value {
            AttrValue::Style(map) => map,
            _ => unreachable!("position found by style match"),
        }
    }

    /// Child elements only (skips text nodes).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

// ============================================================================
// StyleMap
// ============================================================================

/// Ordered key-value inline-style map. Keys stay camelCase as in JSX.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    /// Insert only when the key is not already present.
    /// Returns true when the entry was added.
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.get(key).is_some() {
            return false;
        }
        self.entries.push((key.to_string(), value.into()));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse the inner of a `{{ key: value, ... }}` JSX object literal.
    /// `text` includes the outer double braces. Entries that don't look like
    /// `key: value` are dropped.
    pub fn parse_object(text: &str) -> Self {
        let inner = text
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .trim();

        let mut map = Self::default();
        for part in split_top_level(inner, ',') {
            let Some((key, value)) = split_entry(&part) else {
                continue;
            };
            map.set(&key, value);
        }
        map
    }

    /// Serialize back to a JSX object literal including the outer braces.
    pub fn to_jsx(&self) -> String {
        let mut out = String::from("{{ ");
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(key);
            out.push_str(": ");
            if is_numeric_value(value) {
                out.push_str(value);
            } else if value.contains('\'') && !value.contains('"') {
                // url('/a.png') and friends read better double-quoted
                out.push('"');
                out.push_str(value);
                out.push('"');
            } else {
                out.push('\'');
                for c in value.chars() {
                    if c == '\'' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('\'');
            }
        }
        out.push_str(" }}");
        out
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_jsx())
    }
}

/// Split `key: value`, trimming quotes from both sides.
fn split_entry(part: &str) -> Option<(String, String)> {
    let colon = find_top_level(part, ':')?;
    let key = unquote(part[..colon].trim());
    let value = unquote(part[colon + 1..].trim());
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'\'' && bytes[s.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[s.len() - 1] == b'"')
        {
            let quote = bytes[0] as char;
            let inner = &s[1..s.len() - 1];
            return inner.replace(&format!("\\{quote}"), &quote.to_string());
        }
    }
    s.to_string()
}

/// Numeric JS values stay unquoted when printing (`fontWeight: 700`).
fn is_numeric_value(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

/// Split on `sep` at nesting depth zero, respecting quotes and brackets.
pub fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut current = String::new();

    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                c if c == sep && depth == 0 => {
                    if !current.trim().is_empty() {
                        parts.push(current.trim().to_string());
                    }
                    current = String::new();
                }
                c => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// First occurrence of `sep` at depth zero, quote-aware.
fn find_top_level(text: &str, sep: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                c if c == sep && depth == 0 => return Some(i),
                _ => {}
            },
        }
    }
    None
}
