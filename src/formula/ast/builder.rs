use super::node::MathNode;
use super::types::*;
use crate::formula::error::ParseError;

/// Constructors for formula nodes.
///
/// Both the LaTeX parser and the MathML reader build trees exclusively
/// through these functions, so the script merge rule and the matrix
/// rectangularity check hold for every tree regardless of its source.
pub struct FormulaBuilder;

impl FormulaBuilder {
    /// Juxtapose `children`; a single child is returned unwrapped.
    pub fn group(mut children: Vec<MathNode>) -> MathNode {
        if children.len() == 1 {
            children.pop().unwrap_or_else(MathNode::empty)
        } else {
            MathNode::Group(children)
        }
    }

    pub fn symbol(symbol: Symbol) -> MathNode {
        MathNode::Symbol(symbol)
    }

    pub fn frac(numerator: MathNode, denominator: MathNode) -> MathNode {
        MathNode::Frac {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
        }
    }

    pub fn sqrt(radicand: MathNode) -> MathNode {
        MathNode::Sqrt(Box::new(radicand))
    }

    pub fn root(index: MathNode, radicand: MathNode) -> MathNode {
        MathNode::Root {
            index: Box::new(index),
            radicand: Box::new(radicand),
        }
    }

    /// Attach a superscript, merging with an existing subscript.
    pub fn superscript(base: MathNode, exponent: MathNode) -> MathNode {
        match base {
            MathNode::Subscript { base, subscript } => MathNode::SubSup {
                base,
                subscript,
                superscript: Box::new(exponent),
            },
            base => MathNode::Superscript {
                base: Box::new(base),
                exponent: Box::new(exponent),
            },
        }
    }

    /// Attach a subscript, merging with an existing superscript.
    pub fn subscript(base: MathNode, subscript: MathNode) -> MathNode {
        match base {
            MathNode::Superscript { base, exponent } => MathNode::SubSup {
                base,
                subscript: Box::new(subscript),
                superscript: exponent,
            },
            base => MathNode::Subscript {
                base: Box::new(base),
                subscript: Box::new(subscript),
            },
        }
    }

    pub fn large_op(
        operator: LargeOperator,
        lower: Option<MathNode>,
        upper: Option<MathNode>,
        body: Option<MathNode>,
    ) -> MathNode {
        MathNode::LargeOp {
            operator,
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
            body: body.map(Box::new),
        }
    }

    /// Attach a lower script: fills an empty lower bound of a body-less
    /// large operator, otherwise a subscript.
    pub fn attach_lower(base: MathNode, script: MathNode) -> MathNode {
        match base {
            MathNode::LargeOp {
                operator,
                lower: None,
                upper,
                body: None,
            } => MathNode::LargeOp {
                operator,
                lower: Some(Box::new(script)),
                upper,
                body: None,
            },
            base => Self::subscript(base, script),
        }
    }

    /// Attach an upper script: fills an empty upper bound of a body-less
    /// large operator, otherwise a superscript.
    pub fn attach_upper(base: MathNode, script: MathNode) -> MathNode {
        match base {
            MathNode::LargeOp {
                operator,
                lower,
                upper: None,
                body: None,
            } => MathNode::LargeOp {
                operator,
                lower,
                upper: Some(Box::new(script)),
                body: None,
            },
            base => Self::superscript(base, script),
        }
    }

    /// Close a row of juxtaposed nodes.
    ///
    /// A row that is exactly `open, matrix, close` becomes a fenced matrix,
    /// and every body-less large operator takes the following nodes up to
    /// the next relation or additive operator as its body.
    pub fn row(children: Vec<MathNode>) -> MathNode {
        let children = fence_matrix(children);
        Self::group(attach_bodies(children))
    }

    pub fn accent(accent: AccentType, base: MathNode) -> MathNode {
        MathNode::Accent {
            accent,
            base: Box::new(base),
        }
    }

    /// Build a matrix, rejecting ragged rows.
    pub fn matrix(rows: Vec<Vec<MathNode>>, fence: MatrixFence) -> Result<MathNode, ParseError> {
        if let Some(expected) = rows.first().map(Vec::len) {
            for (row, cells) in rows.iter().enumerate() {
                if cells.len() != expected {
                    return Err(ParseError::ColumnCountMismatch {
                        row,
                        expected,
                        found: cells.len(),
                    });
                }
            }
        }
        Ok(MathNode::Matrix { rows, fence })
    }
}

fn operator_text(node: &MathNode) -> Option<&str> {
    match node {
        MathNode::Symbol(s) if s.kind == SymbolKind::Operator => Some(&s.text),
        _ => None,
    }
}

fn fence_matrix(mut children: Vec<MathNode>) -> Vec<MathNode> {
    let (open, close) = match children.as_slice() {
        [open, MathNode::Matrix { fence: MatrixFence::None, .. }] => (operator_text(open), None),
        [open, MathNode::Matrix { fence: MatrixFence::None, .. }, close] => {
            match operator_text(close) {
                Some(close) => (operator_text(open), Some(close)),
                None => return children,
            }
        },
        _ => return children,
    };
    let Some(fence) = open.and_then(|open| MatrixFence::from_delimiters(Some(open), close)) else {
        return children;
    };
    children.truncate(2);
    match children.pop() {
        Some(MathNode::Matrix { rows, .. }) => vec![MathNode::Matrix { rows, fence }],
        _ => children,
    }
}

fn attach_bodies(children: Vec<MathNode>) -> Vec<MathNode> {
    let mut out = Vec::with_capacity(children.len());
    let mut iter = children.into_iter().peekable();
    while let Some(node) = iter.next() {
        match node {
            MathNode::LargeOp {
                operator,
                lower,
                upper,
                body: None,
            } => {
                let mut rest = Vec::new();
                while let Some(next) = iter.next_if(|n| !separates_terms(n)) {
                    rest.push(next);
                }
                // Inner operators claim their own bodies first
                let rest = attach_bodies(fence_matrix(rest));
                let body = if rest.is_empty() {
                    None
                } else {
                    Some(Box::new(FormulaBuilder::group(rest)))
                };
                out.push(MathNode::LargeOp {
                    operator,
                    lower,
                    upper,
                    body,
                });
            },
            other => out.push(other),
        }
    }
    out
}

#[inline]
fn separates_terms(node: &MathNode) -> bool {
    matches!(node, MathNode::Symbol(s) if s.separates_terms())
}
