use super::{Function, Param, Pattern, Variable};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
}

impl CompareOp {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CompareOp::Equals => "=",
            CompareOp::NotEquals => "<>",
            CompareOp::LessThan => "<",
            CompareOp::LessThanOrEquals => "<=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterThanOrEquals => ">=",
            CompareOp::In => "IN",
            CompareOp::Contains => "CONTAINS",
            CompareOp::StartsWith => "STARTS WITH",
            CompareOp::EndsWith => "ENDS WITH",
            CompareOp::Matches => "=~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOp {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Subtract => "-",
            MathOp::Multiply => "*",
            MathOp::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    All,
    Any,
    None,
    Single,
}

impl QuantifierKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            QuantifierKind::All => "all",
            QuantifierKind::Any => "any",
            QuantifierKind::None => "none",
            QuantifierKind::Single => "single",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapProjectionItem {
    /// `.name`
    Property(String),
    /// `key: expression`
    Entry(String, Expression),
    /// `.*`
    All,
}

/// `variable { .a, b: expression }`
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    pub variable: Variable,
    pub items: Vec<MapProjectionItem>,
}

impl MapProjection {
    pub fn new(variable: Variable) -> Self {
        Self {
            variable,
            items: Vec::new(),
        }
    }

    pub fn property(&mut self, name: impl Into<String>) {
        self.items.push(MapProjectionItem::Property(name.into()));
    }

    pub fn entry(&mut self, key: impl Into<String>, value: impl Into<Expression>) {
        self.items.push(MapProjectionItem::Entry(key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `[variable IN list WHERE predicate | projection]`
#[derive(Debug, Clone, PartialEq)]
pub struct ListComprehension {
    pub variable: Variable,
    pub list: Box<Expression>,
    pub predicate: Option<Box<Expression>>,
    pub projection: Option<Box<Expression>>,
}

/// `[(a)-[r]->(b) WHERE predicate | projection]`
#[derive(Debug, Clone, PartialEq)]
pub struct PatternComprehension {
    pub pattern: Pattern,
    pub predicate: Option<Box<Expression>>,
    pub projection: Box<Expression>,
}

/// `any(variable IN list WHERE predicate)` and friends.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub variable: Variable,
    pub list: Box<Expression>,
    pub predicate: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Variable(Variable),
    Param(Param),
    /// A parameter with a fixed name, such as `$jwt`.
    NamedParam(String),
    Literal(Literal),
    Property(Box<Expression>, String),
    Compare(Box<Expression>, CompareOp, Box<Expression>),
    IsNull(Box<Expression>),
    IsNotNull(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Math(Box<Expression>, MathOp, Box<Expression>),
    Negate(Box<Expression>),
    Function(Function),
    List(Vec<Expression>),
    Map(Vec<(String, Expression)>),
    MapProjection(MapProjection),
    ListComprehension(ListComprehension),
    PatternComprehension(PatternComprehension),
    Quantifier(Quantifier),
    Slice(Box<Expression>, Option<Box<Expression>>, Option<Box<Expression>>),
    HasLabel(Variable, String),
    /// `CASE WHEN condition THEN value ELSE otherwise END`
    Case {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    Raw(String),
}

impl Expression {
    pub fn property(self, name: impl Into<String>) -> Expression {
        Expression::Property(Box::new(self), name.into())
    }

    pub fn string(value: impl Into<String>) -> Expression {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Expression {
        Expression::Literal(Literal::Boolean(value))
    }

    pub fn integer(value: i64) -> Expression {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn null() -> Expression {
        Expression::Literal(Literal::Null)
    }

    pub fn raw(value: impl Into<String>) -> Expression {
        Expression::Raw(value.into())
    }

    pub fn named_param(name: impl Into<String>) -> Expression {
        Expression::NamedParam(name.into())
    }

    pub fn map(entries: impl IntoIterator<Item = (String, Expression)>) -> Expression {
        Expression::Map(entries.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Expression>) -> Expression {
        Expression::List(items.into_iter().collect())
    }

    pub fn math(self, op: MathOp, other: impl Into<Expression>) -> Expression {
        Expression::Math(Box::new(self), op, Box::new(other.into()))
    }

    pub fn slice(self, from: Option<Expression>, to: Option<Expression>) -> Expression {
        Expression::Slice(Box::new(self), from.map(Box::new), to.map(Box::new))
    }

    pub fn negate(self) -> Expression {
        Expression::Negate(Box::new(self))
    }

    pub fn has_label(variable: Variable, label: impl Into<String>) -> Expression {
        Expression::HasLabel(variable, label.into())
    }

    pub fn list_comprehension(
        variable: Variable,
        list: impl Into<Expression>,
        predicate: Option<Expression>,
        projection: Option<Expression>,
    ) -> Expression {
        Expression::ListComprehension(ListComprehension {
            variable,
            list: Box::new(list.into()),
            predicate: predicate.map(Box::new),
            projection: projection.map(Box::new),
        })
    }

    pub fn pattern_comprehension(
        pattern: Pattern,
        predicate: Option<Expression>,
        projection: impl Into<Expression>,
    ) -> Expression {
        Expression::PatternComprehension(PatternComprehension {
            pattern,
            predicate: predicate.map(Box::new),
            projection: Box::new(projection.into()),
        })
    }

    pub fn quantifier(
        kind: QuantifierKind,
        variable: Variable,
        list: impl Into<Expression>,
        predicate: impl Into<Expression>,
    ) -> Expression {
        Expression::Quantifier(Quantifier {
            kind,
            variable,
            list: Box::new(list.into()),
            predicate: Box::new(predicate.into()),
        })
    }

    pub fn case(condition: Expression, then: impl Into<Expression>, otherwise: impl Into<Expression>) -> Expression {
        Expression::Case {
            condition: Box::new(condition),
            then: Box::new(then.into()),
            otherwise: Box::new(otherwise.into()),
        }
    }

    /// Negates the expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expression {
        Expression::Not(Box::new(self))
    }
}

/// Combines the predicates into one conjunction. An empty input gives `None`,
/// a single predicate is returned as is.
pub fn and(predicates: impl IntoIterator<Item = Expression>) -> Option<Expression> {
    combine(predicates, Expression::And)
}

/// Combines the predicates into one disjunction, with the same collapsing rules
/// as [`and`].
pub fn or(predicates: impl IntoIterator<Item = Expression>) -> Option<Expression> {
    combine(predicates, Expression::Or)
}

fn combine(
    predicates: impl IntoIterator<Item = Expression>,
    wrap: impl FnOnce(Vec<Expression>) -> Expression,
) -> Option<Expression> {
    let mut predicates: Vec<_> = predicates.into_iter().collect();

    match predicates.len() {
        0 => None,
        1 => predicates.pop(),
        _ => Some(wrap(predicates)),
    }
}

impl From<Variable> for Expression {
    fn from(value: Variable) -> Self {
        Expression::Variable(value)
    }
}

impl From<&Variable> for Expression {
    fn from(value: &Variable) -> Self {
        Expression::Variable(value.clone())
    }
}

impl From<Param> for Expression {
    fn from(value: Param) -> Self {
        Expression::Param(value)
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Expression::Literal(value)
    }
}

impl From<Function> for Expression {
    fn from(value: Function) -> Self {
        Expression::Function(value)
    }
}

impl From<MapProjection> for Expression {
    fn from(value: MapProjection) -> Self {
        Expression::MapProjection(value)
    }
}

/// Comparison helpers available on everything that converts into an expression.
pub trait Comparable: Into<Expression> + Sized {
    fn compare(self, op: CompareOp, other: impl Into<Expression>) -> Expression {
        Expression::Compare(Box::new(self.into()), op, Box::new(other.into()))
    }

    fn equals(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Equals, other)
    }

    fn not_equals(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::NotEquals, other)
    }

    fn less_than(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::LessThan, other)
    }

    fn less_than_or_equals(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::LessThanOrEquals, other)
    }

    fn greater_than(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::GreaterThan, other)
    }

    fn greater_than_or_equals(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::GreaterThanOrEquals, other)
    }

    fn in_list(self, list: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::In, list)
    }

    fn contains(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Contains, other)
    }

    fn starts_with(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::StartsWith, other)
    }

    fn ends_with(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::EndsWith, other)
    }

    fn matches(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Matches, other)
    }

    fn is_null(self) -> Expression {
        Expression::IsNull(Box::new(self.into()))
    }

    fn is_not_null(self) -> Expression {
        Expression::IsNotNull(Box::new(self.into()))
    }
}

impl<T> Comparable for T where T: Into<Expression> {}
