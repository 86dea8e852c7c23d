use proptest::prelude::*;
use signet_compiler::{
    compile_schema,
    normalize::normalize_schema,
    primitive::PRIMITIVES,
    types::{Enum, Field, FieldType, Model, Schema, Shape},
    CompileError,
};

const HEADER: &str = "version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"\n";

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,10}"
}

fn schema_from(names: Vec<String>, values: Vec<String>) -> Schema {
    let fields = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut field = match i % 3 {
                0 => Field::new(name, Shape::Single, FieldType::Model(name.clone())),
                1 => Field::new(name, Shape::Array, FieldType::Enum(name.clone())),
                _ => Field::new(name, Shape::Map, FieldType::Primitive(PRIMITIVES[i % PRIMITIVES.len()])),
            };
            if field.shape == Shape::Map {
                field.value = Some(if i % 2 == 0 { name.clone() } else { PRIMITIVES[i % 8].name().to_uppercase() });
            }
            field
        })
        .collect();

    Schema {
        version: "v1alpha".into(),
        name: "N".into(),
        tag: "T".into(),
        enums: vec![Enum {
            name: names[0].clone(),
            line: 0,
            column: 0,
            default: values[0].clone(),
            values,
        }],
        models: vec![Model {
            name: names[0].clone(),
            line: 0,
            column: 0,
            description: None,
            fields,
        }],
    }
}

proptest! {
    #[test]
    fn normalization_is_idempotent(
        names in prop::collection::vec(identifier(), 1..8),
        values in prop::collection::vec(identifier(), 1..8),
    ) {
        let mut once = schema_from(names, values);
        normalize_schema(&mut once);
        let mut twice = once.clone();
        normalize_schema(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn enum_default_moves_to_front(
        values in prop::collection::btree_set("[A-Z][a-z0-9]{0,6}", 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let values: Vec<String> = values.into_iter().collect();
        let default = values[pick.index(values.len())].clone();
        let quoted: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
        let text = format!(
            "{}enum E {{\n  default = {:?}\n  values = [{}]\n}}\n",
            HEADER,
            default,
            quoted.join(", ")
        );

        let valid = compile_schema(&text).unwrap();
        let mut expected = vec![default.clone()];
        expected.extend(values.iter().filter(|v| **v != default).cloned());
        prop_assert_eq!(&valid.enums[0].values, &expected);
    }
}

#[test]
fn test_enum_default_promotion_example() {
    let valid = compile_schema(&format!(
        "{}enum E {{\n default = \"B\"\n values = [\"A\", \"B\", \"C\"]\n}}",
        HEADER
    ))
    .unwrap();
    assert_eq!(valid.enums[0].values, ["B", "A", "C"]);
}

#[test]
fn test_duplicate_names_across_kinds() {
    let err = compile_schema(&format!("{}model M {{\n string Id {{ }}\n int32 Id {{ }}\n}}", HEADER)).unwrap_err();
    assert!(matches!(err, CompileError::Name(_)));
    assert_eq!(err.to_string(), "duplicate field name in M: Id");
}

#[test]
fn test_limit_bounds_ignore_default() {
    let err = compile_schema(&format!(
        "{}model M {{\n int32 X {{\n limit_validator {{\n minimum = 10\n maximum = 5\n }}\n }}\n}}",
        HEADER
    ))
    .unwrap_err();
    assert!(matches!(err, CompileError::Constraint(_)));
    assert_eq!(
        err.to_string(),
        "invalid M.X.limit_validator: minimum cannot be greater than maximum"
    );

    compile_schema(&format!(
        "{}model M {{\n int32 X {{\n default = 100\n limit_validator {{\n minimum = 5\n maximum = 10\n }}\n }}\n}}",
        HEADER
    ))
    .unwrap();
}

#[test]
fn test_string_default_must_fit_length() {
    let schema = |default: &str| {
        format!(
            "{}model M {{\n string S {{\n default = {:?}\n length_validator {{\n min = 1\n max = 3\n }}\n }}\n}}",
            HEADER, default
        )
    };
    let err = compile_schema(&schema("hello")).unwrap_err();
    assert_eq!(err.to_string(), "invalid M.S.default: length must be between 1 and 3");
    compile_schema(&schema("hi")).unwrap();
}

#[test]
fn test_map_value_must_name_a_model() {
    let field = format!("{}model M {{\n model_map Items {{\n reference = \"Item\"\n value = \"Price\"\n }}\n}}\nmodel Item {{ }}\n", HEADER);
    let err = compile_schema(&field).unwrap_err();
    assert!(matches!(err, CompileError::Reference(_)));
    assert_eq!(err.to_string(), "unknown M.Items.value: Price");

    compile_schema(&format!("{}model Price {{ }}\n", field)).unwrap();
}

#[test]
fn test_end_to_end_accessor_schema() {
    let valid = compile_schema(&format!(
        r#"{}model M {{
            string S {{
                default = "DefaultValue"
                accessor = true
                regex_validator {{ expression = "^[a-zA-Z0-9]*$" }}
                length_validator {{
                    min = 1
                    max = 20
                }}
                case_modifier {{ kind = "upper" }}
            }}
        }}"#,
        HEADER
    ))
    .unwrap();
    let field = valid.model("M").and_then(|m| m.field("S")).unwrap();
    assert_eq!(field.default.as_ref().and_then(|d| d.as_str()), Some("DEFAULTVALUE"));
    assert!(field.accessor.is_enabled());
}
