//! Names of the generated root fields and types.

use inflector::Inflector;

/// The camelCase plural of a type name, keeping leading underscores.
pub fn plural_of(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let underscores = &name[..name.len() - trimmed.len()];

    format!("{underscores}{}", trimmed.to_camel_case().to_plural())
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Names derived from one entity: `Movie` with the plural `movies`.
#[derive(Debug, Clone, Copy)]
pub struct EntityNames<'a> {
    name: &'a str,
    plural: &'a str,
}

impl<'a> EntityNames<'a> {
    pub fn new(name: &'a str, plural: &'a str) -> Self {
        Self { name, plural }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn plural(&self) -> &'a str {
        self.plural
    }

    pub fn pascal_plural(&self) -> String {
        upper_first(self.plural)
    }

    pub fn read_field(&self) -> String {
        self.plural.to_string()
    }

    pub fn aggregate_field(&self) -> String {
        format!("{}Aggregate", self.plural)
    }

    pub fn connection_field(&self) -> String {
        format!("{}Connection", self.plural)
    }

    pub fn create_field(&self) -> String {
        format!("create{}", self.pascal_plural())
    }

    pub fn update_field(&self) -> String {
        format!("update{}", self.pascal_plural())
    }

    pub fn delete_field(&self) -> String {
        format!("delete{}", self.pascal_plural())
    }

    /// The default root field of a fulltext index without a `queryName`.
    pub fn fulltext_field(&self, index_name: &str) -> String {
        format!("{}Fulltext{}", self.plural, upper_first(index_name))
    }

    fn suffixed(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.name)
    }

    pub fn where_input(&self) -> String {
        self.suffixed("Where")
    }

    pub fn sort_input(&self) -> String {
        self.suffixed("Sort")
    }

    pub fn options_input(&self) -> String {
        self.suffixed("Options")
    }

    pub fn unique_where_input(&self) -> String {
        self.suffixed("UniqueWhere")
    }

    pub fn connect_or_create_where_input(&self) -> String {
        self.suffixed("ConnectOrCreateWhere")
    }

    pub fn on_create_input(&self) -> String {
        self.suffixed("OnCreateInput")
    }

    pub fn create_input(&self) -> String {
        self.suffixed("CreateInput")
    }

    pub fn update_input(&self) -> String {
        self.suffixed("UpdateInput")
    }

    pub fn connect_input(&self) -> String {
        self.suffixed("ConnectInput")
    }

    pub fn disconnect_input(&self) -> String {
        self.suffixed("DisconnectInput")
    }

    pub fn delete_input(&self) -> String {
        self.suffixed("DeleteInput")
    }

    pub fn relation_input(&self) -> String {
        self.suffixed("RelationInput")
    }

    pub fn connect_or_create_input(&self) -> String {
        self.suffixed("ConnectOrCreateInput")
    }

    pub fn connect_where_input(&self) -> String {
        self.suffixed("ConnectWhere")
    }

    pub fn aggregate_selection(&self) -> String {
        self.suffixed("AggregateSelection")
    }

    pub fn edge_type(&self) -> String {
        self.suffixed("Edge")
    }

    pub fn connection_type(&self) -> String {
        format!("{}Connection", self.pascal_plural())
    }

    pub fn create_response(&self) -> String {
        format!("Create{}MutationResponse", self.pascal_plural())
    }

    pub fn update_response(&self) -> String {
        format!("Update{}MutationResponse", self.pascal_plural())
    }

    /// The key of the matched node in a fulltext result, `movie` for `Movie`.
    pub fn fulltext_result_field(&self) -> String {
        self.name.to_camel_case()
    }

    pub fn fulltext_result(&self) -> String {
        self.suffixed("FulltextResult")
    }

    pub fn fulltext_where_input(&self) -> String {
        self.suffixed("FulltextWhere")
    }

    pub fn fulltext_sort_input(&self) -> String {
        self.suffixed("FulltextSort")
    }

    pub fn implementations_where_input(&self) -> String {
        self.suffixed("ImplementationsWhere")
    }

    pub fn implementations_update_input(&self) -> String {
        self.suffixed("ImplementationsUpdateInput")
    }

    pub fn implementations_connect_input(&self) -> String {
        self.suffixed("ImplementationsConnectInput")
    }

    pub fn implementations_disconnect_input(&self) -> String {
        self.suffixed("ImplementationsDisconnectInput")
    }

    pub fn implementations_delete_input(&self) -> String {
        self.suffixed("ImplementationsDeleteInput")
    }
}

/// Names derived from one relationship field: `Movie.actors` to `Actor`.
#[derive(Debug, Clone)]
pub struct RelationshipNames {
    prefix: String,
    aggregation_prefix: String,
    field: String,
}

impl RelationshipNames {
    pub fn new(source: &str, field: &str, target: &str) -> Self {
        let pascal_field = upper_first(field);

        Self {
            prefix: format!("{source}{pascal_field}"),
            aggregation_prefix: format!("{source}{target}{pascal_field}"),
            field: field.to_string(),
        }
    }

    /// Input names for one member of a union target: `MovieSearchGenre...`.
    pub fn member(&self, member: &str) -> Self {
        Self {
            prefix: format!("{}{member}", self.prefix),
            aggregation_prefix: self.aggregation_prefix.clone(),
            field: self.field.clone(),
        }
    }

    fn suffixed(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.prefix)
    }

    pub fn connection_field(&self) -> String {
        format!("{}Connection", self.field)
    }

    pub fn aggregate_field(&self) -> String {
        format!("{}Aggregate", self.field)
    }

    pub fn field_input(&self) -> String {
        self.suffixed("FieldInput")
    }

    pub fn create_field_input(&self) -> String {
        self.suffixed("CreateFieldInput")
    }

    pub fn connect_field_input(&self) -> String {
        self.suffixed("ConnectFieldInput")
    }

    pub fn connect_or_create_field_input(&self) -> String {
        self.suffixed("ConnectOrCreateFieldInput")
    }

    pub fn connect_or_create_field_input_on_create(&self) -> String {
        self.suffixed("ConnectOrCreateFieldInputOnCreate")
    }

    pub fn update_field_input(&self) -> String {
        self.suffixed("UpdateFieldInput")
    }

    pub fn update_connection_input(&self) -> String {
        self.suffixed("UpdateConnectionInput")
    }

    pub fn delete_field_input(&self) -> String {
        self.suffixed("DeleteFieldInput")
    }

    pub fn disconnect_field_input(&self) -> String {
        self.suffixed("DisconnectFieldInput")
    }

    pub fn connection_type(&self) -> String {
        self.suffixed("Connection")
    }

    pub fn relationship_type(&self) -> String {
        self.suffixed("Relationship")
    }

    pub fn connection_where_input(&self) -> String {
        self.suffixed("ConnectionWhere")
    }

    pub fn connection_sort_input(&self) -> String {
        self.suffixed("ConnectionSort")
    }

    pub fn aggregate_input(&self) -> String {
        self.suffixed("AggregateInput")
    }

    pub fn node_aggregation_where_input(&self) -> String {
        self.suffixed("NodeAggregationWhereInput")
    }

    pub fn edge_aggregation_where_input(&self) -> String {
        self.suffixed("EdgeAggregationWhereInput")
    }

    /// Union targets group their inputs per member.
    pub fn create_input(&self) -> String {
        self.suffixed("CreateInput")
    }

    pub fn connect_input(&self) -> String {
        self.suffixed("ConnectInput")
    }

    pub fn update_input(&self) -> String {
        self.suffixed("UpdateInput")
    }

    pub fn delete_input(&self) -> String {
        self.suffixed("DeleteInput")
    }

    pub fn disconnect_input(&self) -> String {
        self.suffixed("DisconnectInput")
    }

    pub fn aggregation_selection(&self) -> String {
        format!("{}AggregationSelection", self.aggregation_prefix)
    }

    pub fn node_aggregate_selection(&self) -> String {
        format!("{}NodeAggregateSelection", self.aggregation_prefix)
    }

    pub fn edge_aggregate_selection(&self) -> String {
        format!("{}EdgeAggregateSelection", self.aggregation_prefix)
    }
}

/// Names derived from a `@relationshipProperties` type.
#[derive(Debug, Clone, Copy)]
pub struct PropertiesNames<'a> {
    name: &'a str,
}

impl<'a> PropertiesNames<'a> {
    pub fn new(name: &'a str) -> Self {
        Self { name }
    }

    pub fn where_input(&self) -> String {
        format!("{}Where", self.name)
    }

    pub fn sort_input(&self) -> String {
        format!("{}Sort", self.name)
    }

    pub fn create_input(&self) -> String {
        format!("{}CreateInput", self.name)
    }

    pub fn update_input(&self) -> String {
        format!("{}UpdateInput", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurals() {
        assert_eq!(plural_of("Movie"), "movies");
        assert_eq!(plural_of("Person"), "people");
        assert_eq!(plural_of("UserBlockedUser"), "userBlockedUsers");
        assert_eq!(plural_of("_Internal"), "_internals");
    }

    #[test]
    fn root_field_names() {
        let names = EntityNames::new("Movie", "movies");

        assert_eq!(names.create_field(), "createMovies");
        assert_eq!(names.connection_type(), "MoviesConnection");
        assert_eq!(names.create_response(), "CreateMoviesMutationResponse");
        assert_eq!(names.fulltext_field("movieTitle"), "moviesFulltextMovieTitle");
    }

    #[test]
    fn relationship_type_names() {
        let names = RelationshipNames::new("Movie", "actors", "Actor");

        assert_eq!(names.connection_type(), "MovieActorsConnection");
        assert_eq!(names.aggregation_selection(), "MovieActorActorsAggregationSelection");
        assert_eq!(names.member("Genre").field_input(), "MovieActorsGenreFieldInput");
    }
}
