use crate::{
    primitive::Primitive,
    types::{Field, FieldType, Schema},
    utils::to_title_case,
};

/// Rewrites identifiers into their canonical form in place: model, field and
/// enum names, enum values and references are title-cased, map values that
/// name a primitive are lower-cased. Running it twice is a no-op.
pub fn normalize_schema(schema: &mut Schema) {
    for e in &mut schema.enums {
        e.name = to_title_case(&e.name);
        e.default = to_title_case(&e.default);
        for value in &mut e.values {
            *value = to_title_case(value);
        }
    }

    for model in &mut schema.models {
        model.name = to_title_case(&model.name);
        for field in &mut model.fields {
            normalize_field(field);
        }
    }
}

fn normalize_field(field: &mut Field) {
    field.name = to_title_case(&field.name);

    match &mut field.ty {
        FieldType::Enum(reference) | FieldType::Model(reference) => {
            *reference = to_title_case(reference);
        }
        FieldType::Primitive(_) => {}
    }

    if let Some(value) = &mut field.value {
        let lower = value.to_lowercase();
        *value = if Primitive::from_name(&lower).is_some() {
            lower
        } else {
            to_title_case(value)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Enum, Model, Shape};

    fn sample() -> Schema {
        let mut map = Field::new("counts", Shape::Map, FieldType::Primitive(Primitive::String));
        map.value = Some("Int32".into());
        let mut nested = Field::new("children", Shape::Map, FieldType::Primitive(Primitive::String));
        nested.value = Some("person".into());

        Schema {
            version: "v1alpha".into(),
            name: "types".into(),
            tag: "latest".into(),
            enums: vec![Enum {
                name: "color".into(),
                line: 0,
                column: 0,
                default: "red".into(),
                values: vec!["red".into(), "greenBlue".into()],
            }],
            models: vec![Model {
                name: "person".into(),
                line: 0,
                column: 0,
                description: Some("lower case stays".into()),
                fields: vec![
                    Field::new("firstName", Shape::Single, FieldType::Primitive(Primitive::String)),
                    Field::new("favorite", Shape::Single, FieldType::Enum("color".into())),
                    map,
                    nested,
                ],
            }],
        }
    }

    #[test]
    fn test_normalize_title_cases_identifiers() {
        let mut schema = sample();
        normalize_schema(&mut schema);

        let color = &schema.enums[0];
        assert_eq!(color.name, "Color");
        assert_eq!(color.default, "Red");
        assert_eq!(color.values, ["Red", "GreenBlue"]);

        let person = &schema.models[0];
        assert_eq!(person.name, "Person");
        assert_eq!(person.description.as_deref(), Some("lower case stays"));
        assert_eq!(person.fields[0].name, "FirstName");
        assert_eq!(person.fields[1].ty, FieldType::Enum("Color".into()));
        assert_eq!(person.fields[2].value.as_deref(), Some("int32"));
        assert_eq!(person.fields[3].value.as_deref(), Some("Person"));

        // Schema-level name and tag are not identifiers of the generated code.
        assert_eq!(schema.name, "types");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut once = sample();
        normalize_schema(&mut once);
        let mut twice = once.clone();
        normalize_schema(&mut twice);
        assert_eq!(once, twice);
    }
}
