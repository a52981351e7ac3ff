//! N-ary tree used to pretty-print the status of the dotfiles dir.
//!
//! Construction and rendering are the only operations the status view needs;
//! nodes are plain values and the renderer is a single recursive pass.

/// A node in the status tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Display value for this node.
    pub value: String,
    /// Child nodes, printed in insertion order.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a leafless node. An empty value displays as `"."`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let mut value = value.into();
        if value.is_empty() {
            value.push('.');
        }
        Self {
            value,
            children: Vec::new(),
        }
    }

    /// Append `node` as the last child.
    pub fn add(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Return the direct child with `value`, creating it if absent.
    pub fn child_or_insert(&mut self, value: &str) -> &mut Node {
        let idx = match self.children.iter().position(|c| c.value == value) {
            Some(idx) => idx,
            None => {
                self.children.push(Node::new(value));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Render the tree with box-drawing branch guides.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node("", "", &mut out);
        out
    }

    fn render_node(&self, line_prefix: &str, child_prefix: &str, out: &mut String) {
        out.push_str(line_prefix);
        out.push_str(&self.value);
        out.push('\n');

        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            let (connector, continuation) = if i + 1 == count {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            child.render_node(
                &format!("{child_prefix}{connector}"),
                &format!("{child_prefix}{continuation}"),
                out,
            );
        }
    }
}
