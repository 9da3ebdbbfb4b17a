//! The input keys of every generated filter, compiled once per entity when the
//! model is built.
//!
//! The schema generator names the input fields from the same tables the
//! translator uses to look up incoming filter keys, so a key is either found by
//! exact match or does not exist.

use indexmap::IndexMap;

use crate::{Attribute, EntityId, Relationship, RelationshipId, ScalarKind};

/// Which optional string and id operators are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// `_MATCHES` on String.
    pub string_regex: bool,
    /// `_LT`, `_LTE`, `_GT` and `_GTE` on String.
    pub string_comparison: bool,
    pub id_regex: bool,
    pub id_comparison: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    pub const ALL: [LogicalOperator; 3] = [LogicalOperator::And, LogicalOperator::Or, LogicalOperator::Not];

    pub fn key(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(LogicalOperator::And),
            "OR" => Some(LogicalOperator::Or),
            "NOT" => Some(LogicalOperator::Not),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equals,
    In,
    Lt,
    Lte,
    Gt,
    Gte,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Includes,
    Distance,
}

impl ComparisonOperator {
    pub fn suffix(self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "",
            ComparisonOperator::In => "_IN",
            ComparisonOperator::Lt => "_LT",
            ComparisonOperator::Lte => "_LTE",
            ComparisonOperator::Gt => "_GT",
            ComparisonOperator::Gte => "_GTE",
            ComparisonOperator::Contains => "_CONTAINS",
            ComparisonOperator::StartsWith => "_STARTS_WITH",
            ComparisonOperator::EndsWith => "_ENDS_WITH",
            ComparisonOperator::Matches => "_MATCHES",
            ComparisonOperator::Includes => "_INCLUDES",
            ComparisonOperator::Distance => "_DISTANCE",
        }
    }

    pub fn key(self, field: &str) -> String {
        format!("{field}{}", self.suffix())
    }
}

const ORDERING: [ComparisonOperator; 4] = [
    ComparisonOperator::Lt,
    ComparisonOperator::Lte,
    ComparisonOperator::Gt,
    ComparisonOperator::Gte,
];

const STRING_MATCHING: [ComparisonOperator; 3] = [
    ComparisonOperator::Contains,
    ComparisonOperator::StartsWith,
    ComparisonOperator::EndsWith,
];

/// The filter operators of one attribute, in the order they are generated.
pub fn attribute_operators(attribute: &Attribute, options: &FilterOptions) -> Vec<ComparisonOperator> {
    use ComparisonOperator::*;

    if attribute.is_list() {
        return vec![Equals, Includes];
    }

    let mut operators = vec![Equals];

    match attribute.scalar() {
        Some(ScalarKind::Boolean) => (),
        Some(kind @ (ScalarKind::Id | ScalarKind::String)) => {
            let (regex, comparison) = match kind {
                ScalarKind::Id => (options.id_regex, options.id_comparison),
                _ => (options.string_regex, options.string_comparison),
            };

            operators.push(In);
            operators.extend(STRING_MATCHING);

            if regex {
                operators.push(Matches);
            }

            if comparison {
                operators.extend(ORDERING);
            }
        }
        Some(kind) if kind.is_spatial() => {
            operators.push(In);
            operators.extend(ORDERING);
            operators.push(Distance);
        }
        Some(_) => {
            operators.push(In);
            operators.extend(ORDERING);
        }
        None => operators.push(In),
    }

    operators
}

/// The relationship quantifiers of list relationship filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    All,
    None,
    Single,
    Some,
}

impl Quantifier {
    pub const ALL: [Quantifier; 4] = [Quantifier::All, Quantifier::None, Quantifier::Single, Quantifier::Some];

    pub fn suffix(self) -> &'static str {
        match self {
            Quantifier::All => "_ALL",
            Quantifier::None => "_NONE",
            Quantifier::Single => "_SINGLE",
            Quantifier::Some => "_SOME",
        }
    }
}

/// One key of a `<Type>Where` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereKey {
    Logical(LogicalOperator),
    /// Index into the attributes of the filtered type.
    Attribute {
        attribute: usize,
        operator: ComparisonOperator,
    },
    /// `None` for a relationship to one node.
    Relationship {
        relationship: RelationshipId,
        quantifier: Option<Quantifier>,
    },
    Connection {
        relationship: RelationshipId,
        quantifier: Option<Quantifier>,
    },
    Aggregate {
        relationship: RelationshipId,
    },
    /// `id` of a global node.
    GlobalId,
    /// A member of a union.
    Member(EntityId),
    /// `_on` of an interface, one filter per implementation.
    Implementations,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereKeyTable {
    keys: IndexMap<String, WhereKey>,
}

impl WhereKeyTable {
    pub fn get(&self, key: &str) -> Option<WhereKey> {
        self.keys.get(key).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, WhereKey)> + '_ {
        self.keys.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn insert(&mut self, key: String, value: WhereKey) {
        self.keys.insert(key, value);
    }

    fn logical() -> Self {
        let mut table = Self::default();

        for operator in LogicalOperator::ALL {
            table.insert(operator.key().to_string(), WhereKey::Logical(operator));
        }

        table
    }

    pub(crate) fn for_attributes<'a>(
        attributes: impl Iterator<Item = &'a Attribute>,
        options: &FilterOptions,
    ) -> Self {
        let mut table = Self::logical();
        table.add_attributes(attributes, options);
        table
    }

    pub(crate) fn for_entity<'a>(
        attributes: impl Iterator<Item = &'a Attribute>,
        relationships: impl Iterator<Item = (RelationshipId, &'a Relationship)>,
        global_node: bool,
        options: &FilterOptions,
    ) -> Self {
        let mut table = Self::logical();

        if global_node {
            table.insert(String::from("id"), WhereKey::GlobalId);
        }

        table.add_attributes(attributes, options);

        for (id, relationship) in relationships {
            table.add_relationship(id, relationship);
        }

        table
    }

    pub(crate) fn with_implementations(mut self) -> Self {
        self.insert(String::from("_on"), WhereKey::Implementations);
        self
    }

    pub(crate) fn for_union(members: impl Iterator<Item = (EntityId, String)>) -> Self {
        let mut table = Self::default();

        for (id, name) in members {
            table.insert(name, WhereKey::Member(id));
        }

        table
    }

    fn add_attributes<'a>(&mut self, attributes: impl Iterator<Item = &'a Attribute>, options: &FilterOptions) {
        for (index, attribute) in attributes.enumerate() {
            if !attribute.is_filterable() {
                continue;
            }

            for operator in attribute_operators(attribute, options) {
                self.insert(
                    operator.key(attribute.name()),
                    WhereKey::Attribute {
                        attribute: index,
                        operator,
                    },
                );
            }
        }
    }

    fn add_relationship(&mut self, id: RelationshipId, relationship: &Relationship) {
        let name = relationship.name();

        if relationship.is_filterable() {
            if relationship.is_list() {
                for quantifier in Quantifier::ALL {
                    self.insert(
                        format!("{name}{}", quantifier.suffix()),
                        WhereKey::Relationship {
                            relationship: id,
                            quantifier: Some(quantifier),
                        },
                    );
                }

                for quantifier in Quantifier::ALL {
                    self.insert(
                        format!("{name}Connection{}", quantifier.suffix()),
                        WhereKey::Connection {
                            relationship: id,
                            quantifier: Some(quantifier),
                        },
                    );
                }
            } else {
                self.insert(
                    name.to_string(),
                    WhereKey::Relationship {
                        relationship: id,
                        quantifier: None,
                    },
                );

                self.insert(
                    format!("{name}Connection"),
                    WhereKey::Connection {
                        relationship: id,
                        quantifier: None,
                    },
                );
            }
        }

        if relationship.is_aggregation_filterable() {
            self.insert(format!("{name}Aggregate"), WhereKey::Aggregate { relationship: id });
        }
    }
}

/// One key of a `<Rel>ConnectionWhere` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionWhereKey {
    Logical(LogicalOperator),
    Node,
    Edge,
}

impl ConnectionWhereKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "node" => Some(ConnectionWhereKey::Node),
            "edge" => Some(ConnectionWhereKey::Edge),
            other => LogicalOperator::parse(other).map(ConnectionWhereKey::Logical),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationComparison {
    Equal,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl AggregationComparison {
    pub const ALL: [AggregationComparison; 5] = [
        AggregationComparison::Equal,
        AggregationComparison::Gt,
        AggregationComparison::Gte,
        AggregationComparison::Lt,
        AggregationComparison::Lte,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggregationComparison::Equal => "EQUAL",
            AggregationComparison::Gt => "GT",
            AggregationComparison::Gte => "GTE",
            AggregationComparison::Lt => "LT",
            AggregationComparison::Lte => "LTE",
        }
    }
}

/// The Cypher aggregating function behind an aggregation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationFunction {
    Average,
    Min,
    Max,
    Sum,
}

const LENGTH_DEPRECATION: &str = "Please use the explicit _LENGTH version for string aggregation.";
const EACH_DEPRECATION: &str = "Aggregation filters that are not relying on an aggregating function will be deprecated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationOperator {
    AverageLength,
    ShortestLength,
    LongestLength,
    Average,
    Shortest,
    Longest,
    Min,
    Max,
    Sum,
}

impl AggregationOperator {
    pub const ALL: [AggregationOperator; 9] = [
        AggregationOperator::AverageLength,
        AggregationOperator::ShortestLength,
        AggregationOperator::LongestLength,
        AggregationOperator::Average,
        AggregationOperator::Shortest,
        AggregationOperator::Longest,
        AggregationOperator::Min,
        AggregationOperator::Max,
        AggregationOperator::Sum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggregationOperator::AverageLength => "AVERAGE_LENGTH",
            AggregationOperator::ShortestLength => "SHORTEST_LENGTH",
            AggregationOperator::LongestLength => "LONGEST_LENGTH",
            AggregationOperator::Average => "AVERAGE",
            AggregationOperator::Shortest => "SHORTEST",
            AggregationOperator::Longest => "LONGEST",
            AggregationOperator::Min => "MIN",
            AggregationOperator::Max => "MAX",
            AggregationOperator::Sum => "SUM",
        }
    }

    pub fn function(self) -> AggregationFunction {
        match self {
            AggregationOperator::AverageLength | AggregationOperator::Average => AggregationFunction::Average,
            AggregationOperator::ShortestLength | AggregationOperator::Shortest | AggregationOperator::Min => {
                AggregationFunction::Min
            }
            AggregationOperator::LongestLength | AggregationOperator::Longest | AggregationOperator::Max => {
                AggregationFunction::Max
            }
            AggregationOperator::Sum => AggregationFunction::Sum,
        }
    }

    /// String attributes aggregate their length, not their value.
    pub fn measures_length(self) -> bool {
        matches!(
            self,
            AggregationOperator::AverageLength
                | AggregationOperator::ShortestLength
                | AggregationOperator::LongestLength
                | AggregationOperator::Shortest
                | AggregationOperator::Longest
        )
    }

    pub fn key(self, field: &str, comparison: AggregationComparison) -> String {
        format!("{field}_{}_{}", self.name(), comparison.name())
    }
}

/// The aggregation operators an attribute supports, in the order they are generated.
/// The unsuffixed string operators come last and are deprecated.
pub fn aggregation_operators(attribute: &Attribute) -> &'static [AggregationOperator] {
    use AggregationOperator::*;

    if !attribute.is_aggregable() {
        return &[];
    }

    match attribute.scalar() {
        Some(ScalarKind::Id) => &[AverageLength, ShortestLength, LongestLength],
        Some(ScalarKind::String) => &[AverageLength, ShortestLength, LongestLength, Average, Shortest, Longest],
        Some(ScalarKind::Int | ScalarKind::Float | ScalarKind::BigInt) => &[Min, Max, Average, Sum],
        Some(ScalarKind::Duration) => &[Min, Max, Average],
        Some(_) => &[Min, Max],
        None => &[],
    }
}

/// The comparisons against each collected value an attribute gets next to its aggregations.
fn each_comparisons(attribute: &Attribute) -> &'static [AggregationComparison] {
    if !attribute.is_aggregable() {
        return &[];
    }

    match attribute.scalar() {
        Some(ScalarKind::Id) => &[AggregationComparison::Equal],
        Some(ScalarKind::String) => &AggregationComparison::ALL,
        _ => &[],
    }
}

/// One key of a `<Rel>NodeAggregationWhereInput` or `<Rel>EdgeAggregationWhereInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationKey {
    pub attribute: usize,
    /// `None` compares each collected value instead of an aggregate, as in `name_EQUAL`.
    pub operator: Option<AggregationOperator>,
    pub comparison: AggregationComparison,
    /// Compares `size()` of the values.
    pub measures_length: bool,
    pub deprecation: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationKeyTable {
    keys: IndexMap<String, AggregationKey>,
    /// Well-formed keys naming an operator the attribute type does not support.
    unsupported: IndexMap<String, (usize, AggregationOperator)>,
}

impl AggregationKeyTable {
    pub(crate) fn for_attributes<'a>(attributes: impl Iterator<Item = &'a Attribute>) -> Self {
        let mut table = Self::default();

        for (index, attribute) in attributes.enumerate() {
            let filterable = attribute.is_aggregation_filterable();
            let supported = if filterable { aggregation_operators(attribute) } else { &[] };
            let string = attribute.scalar() == Some(ScalarKind::String);

            for &operator in supported {
                let unsuffixed = matches!(
                    operator,
                    AggregationOperator::Average | AggregationOperator::Shortest | AggregationOperator::Longest
                );

                for comparison in AggregationComparison::ALL {
                    table.keys.insert(
                        operator.key(attribute.name(), comparison),
                        AggregationKey {
                            attribute: index,
                            operator: Some(operator),
                            comparison,
                            measures_length: string || operator.measures_length(),
                            deprecation: (string && unsuffixed).then_some(LENGTH_DEPRECATION),
                        },
                    );
                }
            }

            if filterable {
                for &comparison in each_comparisons(attribute) {
                    table.keys.insert(
                        format!("{}_{}", attribute.name(), comparison.name()),
                        AggregationKey {
                            attribute: index,
                            operator: None,
                            comparison,
                            measures_length: string && comparison != AggregationComparison::Equal,
                            deprecation: Some(EACH_DEPRECATION),
                        },
                    );
                }
            }

            for operator in AggregationOperator::ALL.into_iter().filter(|op| !supported.contains(op)) {
                for comparison in AggregationComparison::ALL {
                    table
                        .unsupported
                        .insert(operator.key(attribute.name(), comparison), (index, operator));
                }
            }
        }

        table
    }

    pub fn get(&self, key: &str) -> Option<AggregationKey> {
        self.keys.get(key).copied()
    }

    /// The attribute and operator of a key using an operator the attribute does not support.
    pub fn unsupported(&self, key: &str) -> Option<(usize, AggregationOperator)> {
        self.unsupported.get(key).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, AggregationKey)> + '_ {
        self.keys.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One key of a `<Rel>AggregateInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateWhereKey {
    Count(AggregationComparison),
    Logical(LogicalOperator),
    Node,
    Edge,
}

impl AggregateWhereKey {
    pub const COUNT_KEYS: [(&'static str, AggregationComparison); 5] = [
        ("count", AggregationComparison::Equal),
        ("count_LT", AggregationComparison::Lt),
        ("count_LTE", AggregationComparison::Lte),
        ("count_GT", AggregationComparison::Gt),
        ("count_GTE", AggregationComparison::Gte),
    ];

    pub fn parse(key: &str) -> Option<Self> {
        if let Some((_, comparison)) = Self::COUNT_KEYS.iter().find(|(name, _)| *name == key) {
            return Some(AggregateWhereKey::Count(*comparison));
        }

        match key {
            "node" => Some(AggregateWhereKey::Node),
            "edge" => Some(AggregateWhereKey::Edge),
            other => LogicalOperator::parse(other).map(AggregateWhereKey::Logical),
        }
    }
}

/// A math or list operator of an update input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOperator {
    Increment,
    Decrement,
    Add,
    Subtract,
    Multiply,
    Divide,
    Push,
    Pop,
}

impl UpdateOperator {
    pub fn suffix(self) -> &'static str {
        match self {
            UpdateOperator::Increment => "_INCREMENT",
            UpdateOperator::Decrement => "_DECREMENT",
            UpdateOperator::Add => "_ADD",
            UpdateOperator::Subtract => "_SUBTRACT",
            UpdateOperator::Multiply => "_MULTIPLY",
            UpdateOperator::Divide => "_DIVIDE",
            UpdateOperator::Push => "_PUSH",
            UpdateOperator::Pop => "_POP",
        }
    }

    pub fn key(self, field: &str) -> String {
        format!("{field}{}", self.suffix())
    }

    /// Finds the operator of an update key for the named attribute.
    pub fn parse(key: &str, attribute: &Attribute) -> Option<Self> {
        let suffix = key.strip_prefix(attribute.name())?;

        update_operators(attribute)
            .iter()
            .copied()
            .find(|operator| operator.suffix() == suffix)
    }
}

/// The operators an updatable attribute gets next to plain assignment.
pub fn update_operators(attribute: &Attribute) -> &'static [UpdateOperator] {
    use UpdateOperator::*;

    if attribute.is_list() {
        return &[Push, Pop];
    }

    match attribute.scalar() {
        Some(ScalarKind::Int | ScalarKind::BigInt) => &[Increment, Decrement],
        Some(ScalarKind::Float) => &[Add, Subtract, Multiply, Divide],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotation::Annotations, AttributeKind, AttributeType};

    fn attribute(name: &str, kind: ScalarKind) -> Attribute {
        Attribute {
            name: name.to_string(),
            database_name: name.to_string(),
            description: None,
            ty: AttributeType {
                name: kind.name().to_string(),
                kind: AttributeKind::Scalar(kind),
                nullable: true,
                list: None,
            },
            annotations: Annotations::default(),
            arguments: Vec::new(),
        }
    }

    #[test]
    fn string_keys_depend_on_options() {
        let name = attribute("name", ScalarKind::String);

        let keys = |options| {
            WhereKeyTable::for_attributes(std::iter::once(&name), &options)
                .iter()
                .map(|(key, _)| key.to_string())
                .collect::<Vec<_>>()
        };

        insta::assert_debug_snapshot!(keys(FilterOptions::default()), @r###"
        [
            "AND",
            "OR",
            "NOT",
            "name",
            "name_IN",
            "name_CONTAINS",
            "name_STARTS_WITH",
            "name_ENDS_WITH",
        ]
        "###);

        let with_regex = keys(FilterOptions {
            string_regex: true,
            ..Default::default()
        });

        assert!(with_regex.contains(&String::from("name_MATCHES")));
        assert!(!with_regex.contains(&String::from("name_LT")));
    }

    #[test]
    fn string_aggregations_measure_length() {
        let name = attribute("name", ScalarKind::String);
        let table = AggregationKeyTable::for_attributes(std::iter::once(&name));

        let key = table.get("name_AVERAGE_LENGTH_EQUAL").unwrap();

        assert_eq!(key.operator.map(AggregationOperator::function), Some(AggregationFunction::Average));
        assert!(key.measures_length);
        assert_eq!(key.deprecation, None);

        let average = table.get("name_AVERAGE_EQUAL").unwrap();

        assert_eq!(average.operator, Some(AggregationOperator::Average));
        assert!(average.measures_length);
        assert!(average.deprecation.is_some());

        let shortest = table.get("name_SHORTEST_GT").unwrap();

        assert_eq!(shortest.operator.map(AggregationOperator::function), Some(AggregationFunction::Min));
        assert!(shortest.deprecation.is_some());

        assert_eq!(table.unsupported("name_MIN_EQUAL"), Some((0, AggregationOperator::Min)));
    }

    #[test]
    fn comparisons_without_aggregation() {
        let name = attribute("name", ScalarKind::String);
        let id = attribute("id", ScalarKind::Id);
        let table = AggregationKeyTable::for_attributes([&name, &id].into_iter());

        let equal = table.get("name_EQUAL").unwrap();

        assert_eq!(equal.operator, None);
        assert!(!equal.measures_length);
        assert!(equal.deprecation.is_some());

        assert!(table.get("name_GT").unwrap().measures_length);
        assert!(table.get("id_EQUAL").is_some());
        assert_eq!(table.get("id_GT"), None);
        assert_eq!(table.get("id_AVERAGE_EQUAL"), None);
    }

    #[test]
    fn numeric_aggregations() {
        let age = attribute("age", ScalarKind::Int);
        let table = AggregationKeyTable::for_attributes(std::iter::once(&age));

        let keys: Vec<_> = table.iter().map(|(key, _)| key).take(5).collect();

        assert_eq!(
            keys,
            vec!["age_MIN_EQUAL", "age_MIN_GT", "age_MIN_GTE", "age_MIN_LT", "age_MIN_LTE"]
        );

        assert!(table.unsupported("age_SHORTEST_LENGTH_EQUAL").is_some());
    }

    #[test]
    fn update_operators_follow_the_type() {
        let age = attribute("age", ScalarKind::Int);
        let rating = attribute("rating", ScalarKind::Float);

        assert_eq!(UpdateOperator::parse("age_INCREMENT", &age), Some(UpdateOperator::Increment));
        assert_eq!(UpdateOperator::parse("age_ADD", &age), None);
        assert_eq!(UpdateOperator::parse("rating_DIVIDE", &rating), Some(UpdateOperator::Divide));
        assert_eq!(UpdateOperator::parse("rating", &rating), None);
    }

    #[test]
    fn aggregate_where_keys() {
        assert_eq!(
            AggregateWhereKey::parse("count_GT"),
            Some(AggregateWhereKey::Count(AggregationComparison::Gt))
        );
        assert_eq!(AggregateWhereKey::parse("node"), Some(AggregateWhereKey::Node));
        assert_eq!(
            AggregateWhereKey::parse("AND"),
            Some(AggregateWhereKey::Logical(LogicalOperator::And))
        );
        assert_eq!(AggregateWhereKey::parse("count_NOT"), None);
    }
}
