//! WHERE-clause condition trees.

use std::fmt;

use crate::value::Value;

/// Comparison operators of a `field <op> value` leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// <
    Lt,
    /// <=
    LtEq,
}

impl CompareOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean connective of a compound condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// AND
    And,
    /// OR
    Or,
}

impl LogicalOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A parsed WHERE clause.
///
/// `Compound` always holds at least two children; use [`Condition::combine`]
/// to build one.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field = value`
    Equals { field: String, value: Value },
    /// `field <op> value` for every operator except `=`
    Comparison {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// `field IN (v1, v2, ...)`
    In { field: String, values: Vec<Value> },
    /// `field BETWEEN low AND high`
    Between {
        field: String,
        low: Value,
        high: Value,
    },
    /// `field IS NULL`
    IsNull { field: String },
    /// `field IS NOT NULL`
    IsNotNull { field: String },
    /// Text that matched no structured rule (LIKE, NOT IN, functions...).
    Raw { text: String },
    /// AND/OR over two or more children.
    Compound {
        op: LogicalOp,
        children: Vec<Condition>,
    },
}

impl Condition {
    /// Joins `children` with `op`, collapsing a single child to itself.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn combine(op: LogicalOp, mut children: Vec<Self>) -> Option<Self> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(Self::Compound { op, children }),
        }
    }

    /// Returns the field a leaf condition tests.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Equals { field, .. }
            | Self::Comparison { field, .. }
            | Self::In { field, .. }
            | Self::Between { field, .. }
            | Self::IsNull { field }
            | Self::IsNotNull { field } => Some(field),
            Self::Raw { .. } | Self::Compound { .. } => None,
        }
    }

    /// Returns true for anything but `Compound`.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        !matches!(self, Self::Compound { .. })
    }

    /// Returns the variant name, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Equals { .. } => "EQUALS",
            Self::Comparison { .. } => "COMPARISON",
            Self::In { .. } => "IN",
            Self::Between { .. } => "BETWEEN",
            Self::IsNull { .. } => "IS_NULL",
            Self::IsNotNull { .. } => "IS_NOT_NULL",
            Self::Raw { .. } => "RAW",
            Self::Compound { .. } => "COMPOUND",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{field} = {}", render(value)),
            Self::Comparison { field, op, value } => {
                write!(f, "{field} {op} {}", render(value))
            }
            Self::In { field, values } => {
                let list: Vec<String> = values.iter().map(render).collect();
                write!(f, "{field} IN ({})", list.join(", "))
            }
            Self::Between { field, low, high } => {
                write!(f, "{field} BETWEEN {} AND {}", render(low), render(high))
            }
            Self::IsNull { field } => write!(f, "{field} IS NULL"),
            Self::IsNotNull { field } => write!(f, "{field} IS NOT NULL"),
            Self::Raw { text } => f.write_str(text),
            Self::Compound { op, children } => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|c| {
                        if c.is_leaf() {
                            c.to_string()
                        } else {
                            format!("({c})")
                        }
                    })
                    .collect();
                f.write_str(&parts.join(&format!(" {} ", op.as_str())))
            }
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(field: &str, n: f64) -> Condition {
        Condition::Equals {
            field: field.into(),
            value: Value::Number(n),
        }
    }

    #[test]
    fn test_combine_collapses_single_child() {
        assert_eq!(
            Condition::combine(LogicalOp::And, vec![eq("a", 1.0)]),
            Some(eq("a", 1.0))
        );
        assert_eq!(Condition::combine(LogicalOp::Or, vec![]), None);
        assert!(matches!(
            Condition::combine(LogicalOp::Or, vec![eq("a", 1.0), eq("b", 2.0)]),
            Some(Condition::Compound {
                op: LogicalOp::Or,
                ..
            })
        ));
    }

    #[test]
    fn test_display_nests_compounds() {
        let tree = Condition::Compound {
            op: LogicalOp::Or,
            children: vec![
                eq("a", 1.0),
                Condition::Compound {
                    op: LogicalOp::And,
                    children: vec![eq("b", 2.0), eq("c", 3.0)],
                },
            ],
        };
        assert_eq!(tree.to_string(), "a = 1 OR (b = 2 AND c = 3)");
    }

    #[test]
    fn test_field_of_leaf() {
        assert_eq!(eq("status", 1.0).field(), Some("status"));
        assert_eq!(
            Condition::Raw {
                text: "x LIKE 'a%'".into()
            }
            .field(),
            None
        );
    }
}
