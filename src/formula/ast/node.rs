// Math node definitions

use super::types::*;

/// Math node representing a single element in the formula AST
///
/// Every node owns its children; the tree is built once per conversion and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum MathNode {
    /// Identifier, number, operator or literal text
    Symbol(Symbol),

    /// Greek letter command (`\alpha`)
    Greek(GreekLetter),

    /// Superscript (power)
    Superscript {
        base: Box<MathNode>,
        exponent: Box<MathNode>,
    },

    /// Subscript
    Subscript {
        base: Box<MathNode>,
        subscript: Box<MathNode>,
    },

    /// Both subscript and superscript; only built by [`super::FormulaBuilder`]
    SubSup {
        base: Box<MathNode>,
        subscript: Box<MathNode>,
        superscript: Box<MathNode>,
    },

    /// Fraction: numerator / denominator
    Frac {
        numerator: Box<MathNode>,
        denominator: Box<MathNode>,
    },

    /// Square root
    Sqrt(Box<MathNode>),

    /// Nth root
    Root {
        index: Box<MathNode>,
        radicand: Box<MathNode>,
    },

    /// Sum, integral, product, limit, ...
    LargeOp {
        operator: LargeOperator,
        lower: Option<Box<MathNode>>,
        upper: Option<Box<MathNode>>,
        body: Option<Box<MathNode>>,
    },

    /// Accent over base
    Accent {
        accent: AccentType,
        base: Box<MathNode>,
    },

    /// Rectangular matrix, rows of cells
    Matrix {
        rows: Vec<Vec<MathNode>>,
        fence: MatrixFence,
    },

    /// Juxtaposed sequence
    Group(Vec<MathNode>),

    /// Command the parser could not classify
    Unsupported(String),
}

impl MathNode {
    /// The empty group `{}`.
    #[inline]
    pub fn empty() -> Self {
        MathNode::Group(Vec::new())
    }

    #[inline]
    pub fn is_empty_group(&self) -> bool {
        matches!(self, MathNode::Group(children) if children.is_empty())
    }

    /// Name of the first `Unsupported` node in document order, if any.
    pub fn find_unsupported(&self) -> Option<&str> {
        if let MathNode::Unsupported(name) = self {
            return Some(name);
        }
        let mut found = None;
        self.for_each_child(&mut |child| {
            if found.is_none() {
                found = child.find_unsupported();
            }
        });
        found
    }

    /// A tree is well-formed iff it contains no `Unsupported` node.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.find_unsupported().is_none()
    }

    /// Visit the direct children in document order.
    pub fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a MathNode)) {
        match self {
            MathNode::Symbol(_) | MathNode::Greek(_) | MathNode::Unsupported(_) => {},
            MathNode::Superscript { base, exponent } => {
                f(base);
                f(exponent);
            },
            MathNode::Subscript { base, subscript } => {
                f(base);
                f(subscript);
            },
            MathNode::SubSup {
                base,
                subscript,
                superscript,
            } => {
                f(base);
                f(subscript);
                f(superscript);
            },
            MathNode::Frac {
                numerator,
                denominator,
            } => {
                f(numerator);
                f(denominator);
            },
            MathNode::Sqrt(radicand) => f(radicand),
            MathNode::Root { index, radicand } => {
                f(index);
                f(radicand);
            },
            MathNode::LargeOp {
                lower, upper, body, ..
            } => {
                for child in [lower, upper, body].into_iter().flatten() {
                    f(child);
                }
            },
            MathNode::Accent { base, .. } => f(base),
            MathNode::Matrix { rows, .. } => {
                for cell in rows.iter().flatten() {
                    f(cell);
                }
            },
            MathNode::Group(children) => {
                for child in children {
                    f(child);
                }
            },
        }
    }

    /// Total number of nodes in the tree, used for output size estimates.
    pub fn node_count(&self) -> usize {
        let mut count = 1;
        self.for_each_child(&mut |child| count += child.node_count());
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_unsupported_in_document_order() {
        let tree = MathNode::Group(vec![
            MathNode::Symbol(Symbol::identifier("x")),
            MathNode::Frac {
                numerator: Box::new(MathNode::Unsupported("\\foo".to_string())),
                denominator: Box::new(MathNode::Unsupported("\\bar".to_string())),
            },
        ]);
        assert_eq!(tree.find_unsupported(), Some("\\foo"));
        assert!(!tree.is_well_formed());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_well_formed_matrix() {
        let tree = MathNode::Matrix {
            rows: vec![vec![MathNode::Symbol(Symbol::number("1")), MathNode::empty()]],
            fence: MatrixFence::Paren,
        };
        assert!(tree.is_well_formed());
    }
}
