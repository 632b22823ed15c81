#![forbid(unsafe_code)]

//! A minimal element/text tree with HTML serialization.
//!
//! Views are built as [`Node`] values and only turned into markup at the
//! host edge. Tests inspect the tree directly with [`Node::find_all`] and
//! [`Node::text_content`].

use std::fmt::Write as _;

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// A node in a rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Append a class to the `class` attribute.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        match self.attrs.iter_mut().find(|(n, _)| *n == "class") {
            Some((_, slot)) => {
                slot.push(' ');
                slot.push_str(class);
            }
            None => self.attrs.push(("class", class.to_owned())),
        }
        self
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Attribute value by name.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    #[must_use]
    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_owned())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl Node {
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// All elements in document order (this node included) matching `pred`.
    pub fn find_all<'a>(&'a self, pred: impl Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.walk(&pred, &mut out);
        out
    }

    fn walk<'a>(&'a self, pred: &impl Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if let Node::Element(e) = self {
            if pred(e) {
                out.push(e);
            }
            for child in &e.children {
                child.walk(pred, out);
            }
        }
    }

    /// Serialize to HTML with text and attribute values escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(t) => escape_into(out, t),
            Node::Element(e) => {
                out.push('<');
                out.push_str(e.tag);
                for (name, value) in &e.attrs {
                    let _ = write!(out, " {name}=\"");
                    escape_into(out, value);
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&e.tag) {
                    return;
                }
                for child in &e.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", e.tag);
            }
        }
    }
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_nested_elements() {
        let node: Node = Element::new("div")
            .class("a")
            .class("b")
            .child(Element::new("span").text("hi"))
            .into();
        assert_eq!(node.to_html(), r#"<div class="a b"><span>hi</span></div>"#);
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let node: Node = Element::new("input")
            .attr("type", "checkbox")
            .attr("value", "A")
            .into();
        assert_eq!(node.to_html(), r#"<input type="checkbox" value="A">"#);
    }

    #[test]
    fn escapes_text_and_attributes() {
        let node: Node = Element::new("p")
            .attr("title", "\"quoted\" & <b>")
            .text("<script>alert('x')</script>")
            .into();
        assert_eq!(
            node.to_html(),
            "<p title=\"&quot;quoted&quot; &amp; &lt;b&gt;\">&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn attr_replaces() {
        let el = Element::new("a").attr("href", "x").attr("href", "y");
        assert_eq!(el.get_attr("href"), Some("y"));
    }

    #[test]
    fn find_all_in_document_order() {
        let node: Node = Element::new("ul")
            .child(Element::new("li").text("one"))
            .child(Element::new("li").text("two"))
            .into();
        let items: Vec<String> = node
            .find_all(|e| e.tag() == "li")
            .into_iter()
            .map(Element::text_content)
            .collect();
        assert_eq!(items, vec!["one", "two"]);
        assert_eq!(node.text_content(), "onetwo");
    }
}
