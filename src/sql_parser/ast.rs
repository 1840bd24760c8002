use std::fmt;

/// A SELECT statement carrying a graph pattern:
/// `SELECT ... FROM ... [MATCH ...] [WHERE ...]`
#[derive(Debug, PartialEq, Clone)]
pub struct SelectStatement<'a> {
    pub select_clause: SelectClause<'a>,
    pub from_clause: FromClause<'a>,
    pub match_clause: Option<MatchClause<'a>>,
    pub where_clause: Option<WhereClause<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SelectClause<'a> {
    pub select_items: Vec<SelectItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SelectItem<'a> {
    /// `*`
    Wildcard,
    /// `a.*`
    QualifiedWildcard(&'a str),
    /// Any scalar expression with an optional `AS name`
    Expression {
        expression: Expression<'a>,
        alias: Option<&'a str>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct FromClause<'a> {
    pub table_references: Vec<TableReference<'a>>,
}

/// `Person AS p`, `Person p`, or a bare `Person` (aliased as itself)
#[derive(Debug, PartialEq, Clone)]
pub struct TableReference<'a> {
    pub table_name: &'a str,
    pub alias: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MatchClause<'a> {
    pub paths: Vec<MatchPath<'a>>,
}

/// One comma-separated path of a MATCH clause.
///
/// `a-[knows]->b-[likes]->c` becomes two steps, `(a, knows)` and `(b, likes)`,
/// with `c` as the tail. A path written entirely with `<-[..]-` arrows keeps the
/// textual order of its nodes and sets `is_reversed`.
#[derive(Debug, PartialEq, Clone)]
pub struct MatchPath<'a> {
    pub steps: Vec<PathStep<'a>>,
    pub tail: &'a str,
    pub is_reversed: bool,
}

impl<'a> MatchPath<'a> {
    /// Node aliases in path order, tail included.
    pub fn node_aliases(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.steps
            .iter()
            .map(|step| step.node_alias)
            .chain(std::iter::once(self.tail))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct PathStep<'a> {
    pub node_alias: &'a str,
    pub edge: EdgeReference<'a>,
}

/// The bracketed part of a hop: `[knows]`, `[knows AS e]`, `[e:knows]`,
/// `[knows*1..3 AS e {weight: 1}]`
#[derive(Debug, PartialEq, Clone)]
pub struct EdgeReference<'a> {
    /// Name of the adjacency property the hop follows
    pub edge_column: &'a str,
    pub alias: Option<&'a str>,
    pub min_hops: u32,
    pub max_hops: u32,
    /// Attribute-value constraints for variable-length segments
    pub attributes: Vec<(&'a str, Literal<'a>)>,
}

impl<'a> EdgeReference<'a> {
    pub fn single_hop(edge_column: &'a str, alias: Option<&'a str>) -> Self {
        Self {
            edge_column,
            alias,
            min_hops: 1,
            max_hops: 1,
            attributes: Vec::new(),
        }
    }

    pub fn is_single_hop(&self) -> bool {
        self.min_hops == 1 && self.max_hops == 1
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct WhereClause<'a> {
    pub conditions: Expression<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal<'a> {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(&'a str),
    Null,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    // binary
    Addition,         // +
    Subtraction,      // -
    Multiplication,   // *
    Division,         // /
    ModuloDivision,   // %
    Equal,            // =
    NotEqual,         // != or <>
    LessThan,         // <
    GreaterThan,      // >
    LessThanEqual,    // <=
    GreaterThanEqual, // >=
    And,
    Or,
    In,
    NotIn,
    // unary
    Not,
    Negation, // -x
    // post fix
    IsNull,
    IsNotNull,
}

impl From<Operator> for String {
    fn from(value: Operator) -> String {
        match value {
            Operator::Addition => "+".to_string(),
            Operator::Subtraction | Operator::Negation => "-".to_string(),
            Operator::Multiplication => "*".to_string(),
            Operator::Division => "/".to_string(),
            Operator::ModuloDivision => "%".to_string(),
            Operator::Equal => "=".to_string(),
            Operator::NotEqual => "!=".to_string(),
            Operator::LessThan => "<".to_string(),
            Operator::GreaterThan => ">".to_string(),
            Operator::LessThanEqual => "<=".to_string(),
            Operator::GreaterThanEqual => ">=".to_string(),
            Operator::And => "AND".to_string(),
            Operator::Or => "OR".to_string(),
            Operator::In => "IN".to_string(),
            Operator::NotIn => "NOT IN".to_string(),
            Operator::Not => "NOT".to_string(),
            Operator::IsNull => "IS NULL".to_string(),
            Operator::IsNotNull => "IS NOT NULL".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct OperatorApplication<'a> {
    pub operator: Operator,
    pub operands: Vec<Expression<'a>>,
}

/// `alias.column` or a bare `column` resolved later through the catalogue
#[derive(Debug, PartialEq, Clone)]
pub struct ColumnReference<'a> {
    pub qualifier: Option<&'a str>,
    pub column: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub args: Vec<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression<'a> {
    Literal(Literal<'a>),

    Column(ColumnReference<'a>),

    /// `@name`
    Parameter(&'a str),

    /// Parenthesized value list on the right of `IN`
    List(Vec<Expression<'a>>),

    FunctionCallExp(FunctionCall<'a>),

    OperatorApplicationExp(OperatorApplication<'a>),
}

impl<'a> Expression<'a> {
    pub fn binary(operator: Operator, lhs: Expression<'a>, rhs: Expression<'a>) -> Self {
        Expression::OperatorApplicationExp(OperatorApplication {
            operator,
            operands: vec![lhs, rhs],
        })
    }

    pub fn unary(operator: Operator, operand: Expression<'a>) -> Self {
        Expression::OperatorApplicationExp(OperatorApplication {
            operator,
            operands: vec![operand],
        })
    }
}

impl fmt::Display for SelectStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SelectStatement")?;
        writeln!(f, "├── SelectClause: {:?}", self.select_clause.select_items)?;
        writeln!(f, "├── FromClause: {:?}", self.from_clause.table_references)?;
        if let Some(ref m) = self.match_clause {
            for (i, path) in m.paths.iter().enumerate() {
                writeln!(f, "├── MatchPath[{}]: {:?}", i, path)?;
            }
        }
        if let Some(ref w) = self.where_clause {
            writeln!(f, "└── WhereClause: {:?}", w.conditions)?;
        }
        Ok(())
    }
}
