mod clause;
mod expression;
pub mod function;
mod pattern;
mod variable;

pub use clause::{
    CallProcedure, Clause, Match, Merge, Order, OrderItem, Projection, ProjectionItem, Query, SetItem, With,
};
pub use expression::{
    and, or, CompareOp, Comparable, Expression, ListComprehension, Literal, MapProjection, MapProjectionItem, MathOp,
    PatternComprehension, Quantifier, QuantifierKind,
};
pub use function::Function;
pub use pattern::{NodePattern, Pattern, PatternDirection, RelationshipPattern};
pub use variable::{Param, ParamId, Variable, VariableAllocator, VariableId, VariableKind};
