//! Target-agnostic generation plan. Backends render a [`Plan`] and never
//! look at the schema directly, so every target sees the same field order,
//! defaults and validator chain.

use crate::{
    compiler::ValidSchema,
    primitive::Primitive,
    types::{CaseKind, Field, FieldType, Literal, Number, Schema, Shape},
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Plan<'a> {
    pub name:   &'a str,
    pub tag:    &'a str,
    pub enums:  Vec<EnumPlan<'a>>,
    pub models: Vec<ModelPlan<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumPlan<'a> {
    pub name:    &'a str,
    /// Variants in wire order; the default is at index 0.
    pub values:  &'a [String],
    pub default: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelPlan<'a> {
    pub name:        &'a str,
    pub description: Option<&'a str>,
    /// Fields in declaration order, which is also wire order.
    pub fields:      Vec<FieldPlan<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan<'a> {
    pub name:         &'a str,
    pub shape:        Shape,
    /// Type of a single value, an array element or a map key.
    pub element:      Element<'a>,
    /// Value type of a map.
    pub value:        Option<Element<'a>>,
    pub default:      Option<&'a Literal>,
    pub initial_size: Option<u32>,
    pub accessor:     bool,
    /// Checks run by the setter, in execution order.
    pub checks:       Vec<Check<'a>>,
    /// A single model reference that the constructor builds right away.
    pub eager:        bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    Primitive(Primitive),
    Enum(&'a str),
    Model(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check<'a> {
    Regex(&'a str),
    Length {
        min: Option<u64>,
        max: Option<u64>,
    },
    Case(CaseKind),
    Limit {
        minimum: Option<Number>,
        maximum: Option<Number>,
    },
}

impl<'a> Plan<'a> {
    pub fn new(valid: &'a ValidSchema) -> Plan<'a> {
        let schema = valid.schema();
        let lazy = lazy_references(schema);

        let enums = schema
            .enums
            .iter()
            .map(|e| EnumPlan {
                name: &e.name,
                values: &e.values,
                default: &e.default,
            })
            .collect();

        let models = schema
            .models
            .iter()
            .map(|model| ModelPlan {
                name: &model.name,
                description: model.description.as_deref(),
                fields: model
                    .fields
                    .iter()
                    .map(|field| {
                        let eager = field.shape == Shape::Single
                            && matches!(field.ty, FieldType::Model(_))
                            && !lazy.contains(&(model.name.as_str(), field.name.as_str()));
                        plan_field(field, eager)
                    })
                    .collect(),
            })
            .collect();

        Plan {
            name: &schema.name,
            tag: &schema.tag,
            enums,
            models,
        }
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumPlan<'a>> {
        self.enums.iter().find(|e| e.name == name)
    }
}

impl<'a> FieldPlan<'a> {
    pub fn is_guarded(&self) -> bool {
        !self.checks.is_empty()
    }

    pub fn has_check(&self, pred: impl Fn(&Check<'a>) -> bool) -> bool {
        self.checks.iter().any(pred)
    }
}

fn plan_field(field: &Field, eager: bool) -> FieldPlan<'_> {
    let element = match &field.ty {
        FieldType::Primitive(p) => Element::Primitive(*p),
        FieldType::Enum(name) => Element::Enum(name),
        FieldType::Model(name) => Element::Model(name),
    };
    let value = match (&field.value, field.shape) {
        (Some(value), Shape::Map) => Some(match Primitive::from_name(value) {
            Some(p) => Element::Primitive(p),
            None => Element::Model(value),
        }),
        _ => None,
    };

    let validators = &field.validators;
    let mut checks = Vec::new();
    if let Some(regex) = &validators.regex {
        checks.push(Check::Regex(&regex.expression));
    }
    if let Some(length) = validators.length {
        checks.push(Check::Length {
            min: length.min,
            max: length.max,
        });
    }
    if let Some(kind) = validators.case.as_ref().and_then(|c| c.case_kind()) {
        if kind != CaseKind::None {
            checks.push(Check::Case(kind));
        }
    }
    if let Some(limit) = validators.limit {
        checks.push(Check::Limit {
            minimum: limit.minimum,
            maximum: limit.maximum,
        });
    }

    FieldPlan {
        name: &field.name,
        shape: field.shape,
        element,
        value,
        default: field.default.as_ref(),
        initial_size: field.initial_size,
        accessor: field.accessor.is_enabled(),
        checks,
        eager,
    }
}

/// Single model references that must start out empty because building them
/// eagerly would never terminate. These are the back edges of a depth-first
/// walk over single model references; every other reference is acyclic.
fn lazy_references(schema: &Schema) -> HashSet<(&str, &str)> {
    let mut graph: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for model in &schema.models {
        let edges = model
            .fields
            .iter()
            .filter(|f| f.shape == Shape::Single)
            .filter_map(|f| match &f.ty {
                FieldType::Model(target) => Some((f.name.as_str(), target.as_str())),
                _ => None,
            })
            .collect();
        graph.insert(model.name.as_str(), edges);
    }

    fn visit<'s>(
        name: &'s str,
        graph: &HashMap<&'s str, Vec<(&'s str, &'s str)>>,
        state: &mut HashMap<&'s str, u8>,
        lazy: &mut HashSet<(&'s str, &'s str)>,
    ) {
        state.insert(name, 1);
        if let Some(edges) = graph.get(name) {
            for &(field, target) in edges {
                match state.get(target) {
                    Some(1) => {
                        lazy.insert((name, field));
                    }
                    Some(_) => {}
                    None => visit(target, graph, state, lazy),
                }
            }
        }
        state.insert(name, 2);
    }

    let mut state = HashMap::new();
    let mut lazy = HashSet::new();
    for model in &schema.models {
        if !state.contains_key(model.name.as_str()) {
            visit(&model.name, &graph, &mut state, &mut lazy);
        }
    }
    lazy
}
