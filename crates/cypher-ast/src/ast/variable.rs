use crate::CypherValue;

use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Node,
    Relationship,
    Value,
}

impl VariableKind {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            VariableKind::Node | VariableKind::Relationship => "this",
            VariableKind::Value => "var",
        }
    }
}

/// A Cypher variable. Generated variables get their textual name from the
/// renderer, in order of first appearance, so the same tree always renders
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Variable {
    Generated(VariableId, VariableKind),
    Named(String),
}

impl Variable {
    pub fn named(name: impl Into<String>) -> Self {
        Variable::Named(name.into())
    }

    pub fn property(&self, name: impl Into<String>) -> Expression {
        Expression::from(self.clone()).property(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u32);

/// An anonymous statement parameter, named `paramN` when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub(crate) id: ParamId,
    pub(crate) value: CypherValue,
}

impl Param {
    pub fn value(&self) -> &CypherValue {
        &self.value
    }
}

/// Hands out fresh variables and parameters for one statement. Never share an
/// allocator between statements.
#[derive(Debug, Default)]
pub struct VariableAllocator {
    next_variable: u32,
    next_param: u32,
}

impl VariableAllocator {
    pub fn node(&mut self) -> Variable {
        self.variable(VariableKind::Node)
    }

    pub fn relationship(&mut self) -> Variable {
        self.variable(VariableKind::Relationship)
    }

    pub fn value(&mut self) -> Variable {
        self.variable(VariableKind::Value)
    }

    pub fn param(&mut self, value: impl Into<CypherValue>) -> Param {
        let id = ParamId(self.next_param);
        self.next_param += 1;

        Param {
            id,
            value: value.into(),
        }
    }

    fn variable(&mut self, kind: VariableKind) -> Variable {
        let id = VariableId(self.next_variable);
        self.next_variable += 1;

        Variable::Generated(id, kind)
    }
}
