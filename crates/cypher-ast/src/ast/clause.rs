use super::{Expression, Pattern, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expression: Expression,
    pub order: Order,
}

/// `expression AS alias`
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionItem {
    pub expression: Expression,
    pub alias: Option<Variable>,
}

impl ProjectionItem {
    pub fn aliased(expression: impl Into<Expression>, alias: Variable) -> Self {
        Self {
            expression: expression.into(),
            alias: Some(alias),
        }
    }
}

impl From<Variable> for ProjectionItem {
    fn from(variable: Variable) -> Self {
        Self {
            expression: Expression::Variable(variable),
            alias: None,
        }
    }
}

impl From<&Variable> for ProjectionItem {
    fn from(variable: &Variable) -> Self {
        ProjectionItem::from(variable.clone())
    }
}

/// The shared tail of `WITH` and `RETURN`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub distinct: bool,
    pub star: bool,
    pub items: Vec<ProjectionItem>,
    pub order_by: Vec<OrderItem>,
    pub skip: Option<Expression>,
    pub limit: Option<Expression>,
}

impl Projection {
    pub fn star() -> Self {
        Self {
            star: true,
            ..Default::default()
        }
    }

    pub fn items(items: impl IntoIterator<Item = ProjectionItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn item(mut self, item: impl Into<ProjectionItem>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn order_by(mut self, expression: impl Into<Expression>, order: Order) -> Self {
        self.order_by.push(OrderItem {
            expression: expression.into(),
            order,
        });
        self
    }

    pub fn skip(mut self, skip: impl Into<Expression>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Expression>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub optional: bool,
    pub patterns: Vec<Pattern>,
    pub predicate: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub projection: Projection,
    pub predicate: Option<Expression>,
}

/// `SET target = value`
#[derive(Debug, Clone, PartialEq)]
pub struct SetItem {
    pub target: Expression,
    pub value: Expression,
}

impl SetItem {
    pub fn new(target: impl Into<Expression>, value: impl Into<Expression>) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub pattern: Pattern,
    pub on_create: Vec<SetItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallProcedure {
    pub name: String,
    pub arguments: Vec<Expression>,
    pub yields: Vec<(String, Variable)>,
    pub predicate: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Match(Match),
    With(With),
    Return(Projection),
    /// A subquery. More than one query is joined with `UNION`.
    Call(Vec<Query>),
    CallProcedure(CallProcedure),
    Unwind(Expression, Variable),
    Create(Vec<Pattern>),
    Merge(Merge),
    Set(Vec<SetItem>),
    Delete { detach: bool, targets: Vec<Expression> },
    Raw(String),
}

/// A sequence of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn push(&mut self, clause: Clause) -> &mut Self {
        self.clauses.push(clause);
        self
    }

    pub fn extend(&mut self, query: Query) -> &mut Self {
        self.clauses.extend(query.clauses);
        self
    }

    pub fn match_pattern(&mut self, pattern: impl Into<Pattern>, predicate: Option<Expression>) -> &mut Self {
        self.push(Clause::Match(Match {
            optional: false,
            patterns: vec![pattern.into()],
            predicate,
        }))
    }

    pub fn optional_match(&mut self, pattern: impl Into<Pattern>, predicate: Option<Expression>) -> &mut Self {
        self.push(Clause::Match(Match {
            optional: true,
            patterns: vec![pattern.into()],
            predicate,
        }))
    }

    pub fn with(&mut self, projection: Projection) -> &mut Self {
        self.with_where(projection, None)
    }

    pub fn with_where(&mut self, projection: Projection, predicate: Option<Expression>) -> &mut Self {
        self.push(Clause::With(With { projection, predicate }))
    }

    /// `WITH <variables>`, the usual first clause of an importing subquery.
    pub fn import<'a>(&mut self, variables: impl IntoIterator<Item = &'a Variable>) -> &mut Self {
        self.with(Projection::items(variables.into_iter().map(ProjectionItem::from)))
    }

    pub fn call(&mut self, query: Query) -> &mut Self {
        self.push(Clause::Call(vec![query]))
    }

    pub fn call_union(&mut self, queries: Vec<Query>) -> &mut Self {
        self.push(Clause::Call(queries))
    }

    pub fn unwind(&mut self, expression: impl Into<Expression>, alias: Variable) -> &mut Self {
        self.push(Clause::Unwind(expression.into(), alias))
    }

    pub fn create(&mut self, pattern: impl Into<Pattern>) -> &mut Self {
        self.push(Clause::Create(vec![pattern.into()]))
    }

    pub fn merge(&mut self, pattern: impl Into<Pattern>, on_create: Vec<SetItem>) -> &mut Self {
        self.push(Clause::Merge(Merge {
            pattern: pattern.into(),
            on_create,
        }))
    }

    /// Pushes a `SET` clause, skipping it when there is nothing to set.
    pub fn set(&mut self, items: Vec<SetItem>) -> &mut Self {
        if !items.is_empty() {
            self.push(Clause::Set(items));
        }

        self
    }

    pub fn detach_delete(&mut self, target: impl Into<Expression>) -> &mut Self {
        self.push(Clause::Delete {
            detach: true,
            targets: vec![target.into()],
        })
    }

    pub fn delete(&mut self, target: impl Into<Expression>) -> &mut Self {
        self.push(Clause::Delete {
            detach: false,
            targets: vec![target.into()],
        })
    }

    pub fn returning(&mut self, projection: Projection) -> &mut Self {
        self.push(Clause::Return(projection))
    }

    pub fn raw(&mut self, cypher: impl Into<String>) -> &mut Self {
        self.push(Clause::Raw(cypher.into()))
    }
}
