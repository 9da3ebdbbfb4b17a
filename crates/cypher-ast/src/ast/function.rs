use super::Expression;

/// A function call, `name(DISTINCT arg, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: &'static str,
    pub arguments: Vec<Expression>,
    pub distinct: bool,
}

impl Function {
    pub fn new(name: &'static str, arguments: impl IntoIterator<Item = Expression>) -> Self {
        Self {
            name,
            arguments: arguments.into_iter().collect(),
            distinct: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

pub fn count(expression: impl Into<Expression>) -> Function {
    Function::new("count", [expression.into()])
}

pub fn count_all() -> Function {
    Function::new("count", [Expression::raw("*")])
}

pub fn collect(expression: impl Into<Expression>) -> Function {
    Function::new("collect", [expression.into()])
}

pub fn size(expression: impl Into<Expression>) -> Function {
    Function::new("size", [expression.into()])
}

pub fn head(expression: impl Into<Expression>) -> Function {
    Function::new("head", [expression.into()])
}

pub fn last(expression: impl Into<Expression>) -> Function {
    Function::new("last", [expression.into()])
}

pub fn avg(expression: impl Into<Expression>) -> Function {
    Function::new("avg", [expression.into()])
}

pub fn min(expression: impl Into<Expression>) -> Function {
    Function::new("min", [expression.into()])
}

pub fn max(expression: impl Into<Expression>) -> Function {
    Function::new("max", [expression.into()])
}

pub fn sum(expression: impl Into<Expression>) -> Function {
    Function::new("sum", [expression.into()])
}

pub fn coalesce(expression: impl Into<Expression>, fallback: impl Into<Expression>) -> Function {
    Function::new("coalesce", [expression.into(), fallback.into()])
}

pub fn point(expression: impl Into<Expression>) -> Function {
    Function::new("point", [expression.into()])
}

pub fn point_distance(left: impl Into<Expression>, right: impl Into<Expression>) -> Function {
    Function::new("point.distance", [left.into(), right.into()])
}

pub fn datetime() -> Function {
    Function::new("datetime", [])
}

pub fn random_uuid() -> Function {
    Function::new("randomUUID", [])
}

pub fn element_id(expression: impl Into<Expression>) -> Function {
    Function::new("elementId", [expression.into()])
}
