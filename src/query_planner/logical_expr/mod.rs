use serde::{Deserialize, Serialize};
use std::fmt;

mod ast_conversion;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum LogicalExpr {
    /// A literal, such as a number, string, boolean, or null.
    Literal(Literal),

    /// Column reference, qualified once bound to a pattern alias.
    Column(Column),

    /// A parameter such as `@since`.
    Parameter(String),

    /// Value list on the right of `IN`.
    List(Vec<LogicalExpr>),

    /// A function call, e.g. `IS_DEFINED(a.email)`.
    ScalarFnCall(ScalarFnCall),

    /// An operator application, e.g. `1 + 2` or `a.age > 20`.
    OperatorApplicationExp(OperatorApplication),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Operator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    ModuloDivision,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    And,
    Or,
    In,
    NotIn,
    Not,
    Negation,
    IsNull,
    IsNotNull,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Column {
    pub table_alias: Option<String>,
    pub column: String,
}

impl Column {
    pub fn qualified(table_alias: &str, column: &str) -> Self {
        Column {
            table_alias: Some(table_alias.to_string()),
            column: column.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ScalarFnCall {
    pub name: String,
    pub args: Vec<LogicalExpr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperatorApplication {
    pub operator: Operator,
    pub operands: Vec<LogicalExpr>,
}

impl Operator {
    /// Binding strength used when printing; higher binds tighter.
    fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Not => 3,
            Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::GreaterThan
            | Operator::LessThanEqual
            | Operator::GreaterThanEqual
            | Operator::In
            | Operator::NotIn
            | Operator::IsNull
            | Operator::IsNotNull => 4,
            Operator::Addition | Operator::Subtraction => 5,
            Operator::Multiplication | Operator::Division | Operator::ModuloDivision => 6,
            Operator::Negation => 7,
        }
    }

    fn is_associative(self) -> bool {
        matches!(
            self,
            Operator::And | Operator::Or | Operator::Addition | Operator::Multiplication
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Addition => "+",
            Operator::Subtraction | Operator::Negation => "-",
            Operator::Multiplication => "*",
            Operator::Division => "/",
            Operator::ModuloDivision => "%",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThanEqual => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Not => "NOT",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

const ATOM_PRECEDENCE: u8 = 8;

impl LogicalExpr {
    pub fn binary(operator: Operator, lhs: LogicalExpr, rhs: LogicalExpr) -> Self {
        LogicalExpr::OperatorApplicationExp(OperatorApplication {
            operator,
            operands: vec![lhs, rhs],
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            LogicalExpr::OperatorApplicationExp(op) => op.operator.precedence(),
            _ => ATOM_PRECEDENCE,
        }
    }

    /// True when printing `self` as an operand of `operator` needs parentheses.
    pub fn binds_looser_than(&self, operator: Operator) -> bool {
        self.precedence() < operator.precedence()
    }

    /// Split nested `AND` applications into their conjuncts, left to right.
    /// Any other operator (`OR`, `NOT`, ...) ends the descent.
    pub fn split_conjunction(self) -> Vec<LogicalExpr> {
        let mut conjuncts = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                LogicalExpr::OperatorApplicationExp(OperatorApplication {
                    operator: Operator::And,
                    operands,
                }) => {
                    stack.extend(operands.into_iter().rev());
                }
                other => conjuncts.push(other),
            }
        }
        conjuncts
    }

    /// Every column reference in evaluation order.
    pub fn columns(&self) -> Vec<&Column> {
        let mut found = Vec::new();
        self.collect_columns(&mut found);
        found
    }

    fn collect_columns<'e>(&'e self, found: &mut Vec<&'e Column>) {
        match self {
            LogicalExpr::Column(column) => found.push(column),
            LogicalExpr::List(items) => items.iter().for_each(|item| item.collect_columns(found)),
            LogicalExpr::ScalarFnCall(call) => {
                call.args.iter().for_each(|arg| arg.collect_columns(found))
            }
            LogicalExpr::OperatorApplicationExp(op) => op
                .operands
                .iter()
                .for_each(|operand| operand.collect_columns(found)),
            LogicalExpr::Literal(_) | LogicalExpr::Parameter(_) => {}
        }
    }

    /// Visit every column mutably, stopping at the first error.
    pub fn try_for_each_column_mut<E>(
        &mut self,
        f: &mut impl FnMut(&mut Column) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            LogicalExpr::Column(column) => f(column),
            LogicalExpr::List(items) => items
                .iter_mut()
                .try_for_each(|item| item.try_for_each_column_mut(f)),
            LogicalExpr::ScalarFnCall(call) => call
                .args
                .iter_mut()
                .try_for_each(|arg| arg.try_for_each_column_mut(f)),
            LogicalExpr::OperatorApplicationExp(op) => op
                .operands
                .iter_mut()
                .try_for_each(|operand| operand.try_for_each_column_mut(f)),
            LogicalExpr::Literal(_) | LogicalExpr::Parameter(_) => Ok(()),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &LogicalExpr, min: u8) -> fmt::Result {
    if operand.precedence() < min {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, items: &[LogicalExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table_alias {
            Some(alias) => write!(f, "{}.{}", alias, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

impl fmt::Display for OperatorApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precedence = self.operator.precedence();
        match (self.operator, self.operands.as_slice()) {
            (Operator::Not, [operand]) => {
                write!(f, "NOT ")?;
                write_operand(f, operand, precedence)
            }
            (Operator::Negation, [operand]) => {
                write!(f, "-")?;
                write_operand(f, operand, precedence)
            }
            (Operator::IsNull | Operator::IsNotNull, [operand]) => {
                write_operand(f, operand, precedence + 1)?;
                write!(f, " {}", self.operator.as_str())
            }
            (operator, [lhs, rhs]) => {
                let (lhs_min, rhs_min) = if operator.is_associative() {
                    (precedence, precedence)
                } else if precedence == 4 {
                    (precedence + 1, precedence + 1)
                } else {
                    (precedence, precedence + 1)
                };
                write_operand(f, lhs, lhs_min)?;
                write!(f, " {} ", operator.as_str())?;
                write_operand(f, rhs, rhs_min)
            }
            (operator, operands) => {
                // malformed arity; print as a call so nothing is silently dropped
                write!(f, "{}(", operator.as_str())?;
                write_separated(f, operands)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpr::Literal(literal) => write!(f, "{}", literal),
            LogicalExpr::Column(column) => write!(f, "{}", column),
            LogicalExpr::Parameter(name) => write!(f, "@{}", name),
            LogicalExpr::List(items) => {
                write!(f, "(")?;
                write_separated(f, items)?;
                write!(f, ")")
            }
            LogicalExpr::ScalarFnCall(call) => {
                write!(f, "{}(", call.name)?;
                write_separated(f, &call.args)?;
                write!(f, ")")
            }
            LogicalExpr::OperatorApplicationExp(op) => write!(f, "{}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(alias: &str, name: &str) -> LogicalExpr {
        LogicalExpr::Column(Column::qualified(alias, name))
    }

    fn int(i: i64) -> LogicalExpr {
        LogicalExpr::Literal(Literal::Integer(i))
    }

    #[test]
    fn test_display_simple_comparison() {
        let expr = LogicalExpr::binary(Operator::GreaterThan, col("a", "age"), int(20));
        assert_eq!(expr.to_string(), "a.age > 20");
    }

    #[test]
    fn test_display_parenthesizes_lower_precedence_operands() {
        let or = LogicalExpr::binary(
            Operator::Or,
            LogicalExpr::binary(Operator::Equal, col("a", "x"), int(1)),
            LogicalExpr::binary(Operator::Equal, col("a", "y"), int(2)),
        );
        let and = LogicalExpr::binary(
            Operator::And,
            or,
            LogicalExpr::binary(Operator::LessThan, col("a", "z"), int(3)),
        );
        assert_eq!(and.to_string(), "(a.x = 1 OR a.y = 2) AND a.z < 3");

        let sub = LogicalExpr::binary(
            Operator::Subtraction,
            col("a", "x"),
            LogicalExpr::binary(Operator::Subtraction, col("a", "y"), int(1)),
        );
        assert_eq!(sub.to_string(), "a.x - (a.y - 1)");
    }

    #[test]
    fn test_display_in_list_is_null_and_strings() {
        let expr = LogicalExpr::binary(
            Operator::In,
            col("a", "city"),
            LogicalExpr::List(vec![
                LogicalExpr::Literal(Literal::String("O'Hare".to_string())),
                LogicalExpr::Literal(Literal::Null),
            ]),
        );
        assert_eq!(expr.to_string(), "a.city IN ('O\\'Hare', null)");

        let expr = LogicalExpr::OperatorApplicationExp(OperatorApplication {
            operator: Operator::IsNotNull,
            operands: vec![col("b", "email")],
        });
        assert_eq!(expr.to_string(), "b.email IS NOT NULL");
    }

    #[test]
    fn test_split_conjunction_flattens_nested_and() {
        let p1 = LogicalExpr::binary(Operator::Equal, col("a", "x"), int(1));
        let p2 = LogicalExpr::binary(Operator::Equal, col("b", "y"), int(2));
        let p3 = LogicalExpr::binary(Operator::Equal, col("c", "z"), int(3));
        let or = LogicalExpr::binary(Operator::Or, p2.clone(), p3.clone());
        let expr = LogicalExpr::binary(
            Operator::And,
            LogicalExpr::binary(Operator::And, p1.clone(), p3.clone()),
            or.clone(),
        );
        assert_eq!(expr.split_conjunction(), vec![p1, p3, or]);
    }

    #[test]
    fn test_binds_looser_than() {
        let eq = LogicalExpr::binary(Operator::Equal, col("a", "x"), int(1));
        let or = LogicalExpr::binary(Operator::Or, eq.clone(), eq.clone());
        assert!(or.binds_looser_than(Operator::And));
        assert!(!eq.binds_looser_than(Operator::And));
        assert!(!col("a", "x").binds_looser_than(Operator::And));
    }

    #[test]
    fn test_columns_and_rewrite() {
        let mut expr = LogicalExpr::binary(
            Operator::Equal,
            LogicalExpr::Column(Column {
                table_alias: None,
                column: "age".to_string(),
            }),
            LogicalExpr::ScalarFnCall(ScalarFnCall {
                name: "ABS".to_string(),
                args: vec![col("b", "age")],
            }),
        );
        assert_eq!(expr.columns().len(), 2);

        expr.try_for_each_column_mut(&mut |c: &mut Column| -> Result<(), ()> {
            if c.table_alias.is_none() {
                c.table_alias = Some("a".to_string());
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(expr.to_string(), "a.age = ABS(b.age)");
    }
}
