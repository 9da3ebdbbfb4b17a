use super::{Expression, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDirection {
    /// `(a)<-[r]-(b)`
    Left,
    /// `(a)-[r]->(b)`
    Right,
    /// `(a)-[r]-(b)`
    Undirected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub variable: Option<Variable>,
    pub labels: Vec<String>,
    pub properties: Vec<(String, Expression)>,
}

impl NodePattern {
    pub fn new(variable: Variable) -> Self {
        Self {
            variable: Some(variable),
            labels: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            variable: None,
            labels: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Expression>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }
}

impl From<Variable> for NodePattern {
    fn from(variable: Variable) -> Self {
        NodePattern::new(variable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<Variable>,
    pub types: Vec<String>,
    pub direction: PatternDirection,
}

impl RelationshipPattern {
    pub fn new(variable: Option<Variable>, ty: impl Into<String>, direction: PatternDirection) -> Self {
        Self {
            variable,
            types: vec![ty.into()],
            direction,
        }
    }
}

/// A path pattern: a start node followed by relationship hops.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub start: NodePattern,
    pub hops: Vec<(RelationshipPattern, NodePattern)>,
}

impl Pattern {
    pub fn node(start: impl Into<NodePattern>) -> Self {
        Self {
            start: start.into(),
            hops: Vec::new(),
        }
    }

    pub fn related(mut self, relationship: RelationshipPattern, node: impl Into<NodePattern>) -> Self {
        self.hops.push((relationship, node.into()));
        self
    }
}

impl From<NodePattern> for Pattern {
    fn from(node: NodePattern) -> Self {
        Pattern::node(node)
    }
}
