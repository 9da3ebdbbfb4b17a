use std::fmt::{self, Write};

use super::{DirectiveDefinition, Document, EnumValue, Field, InputValue, ObjectType, TypeDefinition, TypeKind};

const INDENT: &str = "    ";
const BUILTIN_SCALARS: &[&str] = &["ID", "String", "Int", "Float", "Boolean"];

/// Renders the document as GraphQL SDL: the schema definition, the directive
/// definitions, then every type in the order it was added.
pub fn render_sdl(document: &Document) -> Result<String, fmt::Error> {
    let mut sdl = String::new();

    if let Some(roots) = &document.root_names {
        sdl.push_str("schema {\n");
        writeln!(sdl, "{INDENT}query: {}", roots.query)?;

        if let Some(mutation) = &roots.mutation {
            writeln!(sdl, "{INDENT}mutation: {mutation}")?;
        }

        sdl.push_str("}\n\n");
    }

    if !document.schema_directives.is_empty() {
        sdl.push_str("extend schema");
        write_directives(&document.schema_directives, &mut sdl)?;
        sdl.push_str("\n\n");
    }

    for directive in &document.directives {
        write_directive_definition(directive, &mut sdl)?;
    }

    for definition in document.types.values() {
        if matches!(definition.kind, TypeKind::Scalar) && BUILTIN_SCALARS.contains(&definition.name.as_str()) {
            continue;
        }

        if let Some(description) = &definition.description {
            write!(sdl, "{}", Description(description, ""))?;
        }

        match &definition.kind {
            TypeKind::Object(object) => write_object("type", definition, object, &mut sdl)?,
            TypeKind::Interface(object) => write_object("interface", definition, object, &mut sdl)?,
            TypeKind::InputObject(input) => {
                write!(sdl, "input {}", definition.name)?;
                write_directives(&definition.directives, &mut sdl)?;
                sdl.push_str(" {\n");

                for field in input.fields.values() {
                    write_input_value(field, INDENT, &mut sdl)?;
                    sdl.push('\n');
                }

                sdl.push_str("}\n\n");
            }
            TypeKind::Enum(values) => {
                write!(sdl, "enum {}", definition.name)?;
                write_directives(&definition.directives, &mut sdl)?;
                sdl.push_str(" {\n");

                for value in values {
                    write_enum_value(value, &mut sdl)?;
                }

                sdl.push_str("}\n\n");
            }
            TypeKind::Union(members) => {
                write!(sdl, "union {}", definition.name)?;
                write_directives(&definition.directives, &mut sdl)?;
                write!(sdl, " = {}\n\n", members.join(" | "))?;
            }
            TypeKind::Scalar => {
                write!(sdl, "scalar {}", definition.name)?;
                write_directives(&definition.directives, &mut sdl)?;
                sdl.push_str("\n\n");
            }
        }
    }

    let trimmed = sdl.trim_end().len();
    sdl.truncate(trimmed);
    sdl.push('\n');

    Ok(sdl)
}

fn write_object(keyword: &str, definition: &TypeDefinition, object: &ObjectType, sdl: &mut String) -> fmt::Result {
    write!(sdl, "{keyword} {}", definition.name)?;

    if !object.implements.is_empty() {
        write!(sdl, " implements {}", object.implements.join(" & "))?;
    }

    write_directives(&definition.directives, sdl)?;
    sdl.push_str(" {\n");

    for field in object.fields.values() {
        write_field(field, sdl)?;
    }

    sdl.push_str("}\n\n");

    Ok(())
}

fn write_field(field: &Field, sdl: &mut String) -> fmt::Result {
    if let Some(description) = &field.description {
        write!(sdl, "{}", Description(description, INDENT))?;
    }

    write!(sdl, "{INDENT}{}", field.name)?;
    write_arguments(&field.arguments, sdl)?;
    write!(sdl, ": {}", field.ty)?;
    write_directives(&field.directives, sdl)?;
    sdl.push('\n');

    Ok(())
}

fn write_arguments(arguments: &[InputValue], sdl: &mut String) -> fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }

    let described = arguments.iter().any(|argument| argument.description.is_some());

    if !described {
        sdl.push('(');

        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                sdl.push_str(", ");
            }

            write_input_value(argument, "", sdl)?;
        }

        sdl.push(')');
        return Ok(());
    }

    let indentation = format!("{INDENT}{INDENT}");

    sdl.push_str("(\n");

    for argument in arguments {
        write_input_value(argument, &indentation, sdl)?;
        sdl.push('\n');
    }

    write!(sdl, "{INDENT})")
}

fn write_input_value(value: &InputValue, indentation: &str, sdl: &mut String) -> fmt::Result {
    if let Some(description) = &value.description {
        write!(sdl, "{}", Description(description, indentation))?;
    }

    write!(sdl, "{indentation}{}: {}", value.name, value.ty)?;

    if let Some(default) = &value.default_value {
        write!(sdl, " = {default}")?;
    }

    write_directives(&value.directives, sdl)
}

fn write_enum_value(value: &EnumValue, sdl: &mut String) -> fmt::Result {
    if let Some(description) = &value.description {
        write!(sdl, "{}", Description(description, INDENT))?;
    }

    write!(sdl, "{INDENT}{}", value.name)?;
    write_directives(&value.directives, sdl)?;
    sdl.push('\n');

    Ok(())
}

fn write_directive_definition(directive: &DirectiveDefinition, sdl: &mut String) -> fmt::Result {
    if let Some(description) = &directive.description {
        write!(sdl, "{}", Description(description, ""))?;
    }

    write!(sdl, "directive @{}", directive.name)?;
    write_arguments(&directive.arguments, sdl)?;

    if directive.repeatable {
        sdl.push_str(" repeatable");
    }

    write!(sdl, " on {}\n\n", directive.locations.join(" | "))
}

fn write_directives(directives: &[String], sdl: &mut String) -> fmt::Result {
    for directive in directives {
        write!(sdl, " {directive}")?;
    }

    Ok(())
}

fn write_quoted(sdl: &mut impl Write, s: &str) -> fmt::Result {
    sdl.write_char('"')?;
    for c in s.chars() {
        match c {
            '\r' => sdl.write_str("\\r"),
            '\n' => sdl.write_str("\\n"),
            '\t' => sdl.write_str("\\t"),
            '\\' => sdl.write_str("\\\\"),
            '"' => sdl.write_str("\\\""),
            c if c.is_control() => write!(sdl, "\\u{:04X}", c as u32),
            c => sdl.write_char(c),
        }?
    }
    sdl.write_char('"')
}

struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, self.0)
    }
}

/// A string literal, for directive arguments built by the generator.
pub(crate) fn quoted(s: &str) -> String {
    Quoted(s).to_string()
}

struct Description<'a>(&'a str, &'a str);

impl fmt::Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Description(description, indentation) = self;

        writeln!(f, r#"{indentation}""""#)?;

        let mut lines = description.lines().skip_while(|line| line.is_empty()).peekable();

        while let Some(line) = lines.next() {
            let line = line.trim();

            if line.is_empty() && lines.peek().map(|next| next.is_empty()).unwrap_or(true) {
                continue;
            }

            writeln!(f, r#"{indentation}{line}"#)?;
        }

        writeln!(f, r#"{indentation}""""#)
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::sdl::InputObjectType;

    #[test]
    fn renders_types_in_insertion_order() {
        let mut document = Document::default();

        let mut fields = IndexMap::new();
        fields.insert(
            String::from("title"),
            Field::new("title", "String").with_directives([String::from("@deprecated(reason: \"old\")")]),
        );
        fields.insert(
            String::from("actors"),
            Field::new("actors", "[Actor!]!").with_argument(InputValue::new("where", "ActorWhere")),
        );

        document.types.insert(
            String::from("Movie"),
            TypeDefinition::new(
                "Movie",
                TypeKind::Object(ObjectType {
                    implements: vec![String::from("Node")],
                    fields,
                }),
            )
            .with_description("A film."),
        );

        let mut input = InputObjectType::default();
        input
            .fields
            .insert(String::from("limit"), InputValue::new("limit", "Int").with_default("10"));

        document.types.insert(
            String::from("MovieOptions"),
            TypeDefinition::new("MovieOptions", TypeKind::InputObject(input)),
        );

        document
            .types
            .insert(String::from("String"), TypeDefinition::new("String", TypeKind::Scalar));

        insta::assert_snapshot!(render_sdl(&document).unwrap(), @r###"
        """
        A film.
        """
        type Movie implements Node {
            title: String @deprecated(reason: "old")
            actors(where: ActorWhere): [Actor!]!
        }

        input MovieOptions {
            limit: Int = 10
        }
        "###);
    }

    #[test]
    fn quoting() {
        assert_eq!(quoted("say \"hi\"\n"), r#""say \"hi\"\n""#);
        assert_eq!(quoted("esc\u{1b}"), r#""esc\u001B""#);
    }
}
