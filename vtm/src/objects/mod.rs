//! Object catalogue
//!
//! Each [`ObjectKind`] describes one configuration object type of the
//! traffic manager: its Terraform name, its REST collection and how its
//! body maps onto Terraform attributes. Resources and data sources are
//! generated from these descriptors.

mod catalogue;
pub mod convert;

pub use catalogue::KINDS;

use std::sync::Arc;
use tfplug::defaults::{AttributeDefault, StaticDefault};
use tfplug::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::Dynamic;
use tfplug::validator::{NumberRangeValidator, OneOfValidator, StringLengthValidator};

/// Section whose keys are used as attribute names without a prefix
pub const BASIC_SECTION: &str = "basic";

/// Attribute holding the body of raw (text) objects
pub const CONTENT_ATTRIBUTE: &str = "content";

#[derive(Debug)]
pub struct ObjectKind {
    /// Terraform type suffix, e.g. `pool` for `vtm_pool`
    pub name: &'static str,
    /// REST collection under `config/active`, e.g. `ssl/server_keys`
    pub path: &'static str,
    pub description: &'static str,
    pub body: Body,
    pub statistics: Option<Statistics>,
}

#[derive(Debug)]
pub enum Body {
    /// JSON object of `properties.<section>.<key>`
    Properties(&'static [Field]),
    /// Opaque text such as TrafficScript rules or monitor scripts
    Raw,
}

#[derive(Debug)]
pub struct Statistics {
    /// Collection under `status/local_tm/statistics`
    pub path: &'static str,
    pub counters: &'static [Counter],
}

#[derive(Debug)]
pub struct Counter {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    String,
    Int,
    Number,
    Bool,
    StringList,
    /// List of rows with fixed columns
    Table(&'static [Column]),
}

#[derive(Debug, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
    pub allowed: &'static [&'static str],
}

impl Column {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            allowed: &[],
        }
    }

    pub const fn allowed(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = values;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
    EmptyList,
}

#[derive(Debug)]
pub struct Field {
    pub section: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub allowed: &'static [&'static str],
    pub range: Option<(i64, i64)>,
    pub sensitive: bool,
}

impl Field {
    pub const fn new(
        section: &'static str,
        key: &'static str,
        kind: FieldKind,
        description: &'static str,
    ) -> Self {
        Self {
            section,
            key,
            kind,
            description,
            required: false,
            default: None,
            allowed: &[],
            range: None,
            sensitive: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn allowed(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = values;
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// `basic` keys are used as is, other sections prefix the key:
    /// `load_balancing.algorithm` becomes `load_balancing_algorithm`
    pub fn attribute_name(&self) -> String {
        if self.section == BASIC_SECTION {
            self.key.to_string()
        } else {
            format!("{}_{}", self.section, self.key)
        }
    }

    fn attribute(&self) -> Attribute {
        let mut builder =
            AttributeBuilder::new(&self.attribute_name(), self.kind.attribute_type())
                .description(self.description);

        builder = if self.required {
            builder.required()
        } else {
            builder.optional()
        };
        if let Some(default) = self.default {
            builder = builder.default(default.to_default(self.kind));
        }
        if !self.allowed.is_empty() {
            builder = builder.validator(OneOfValidator::new(self.allowed.iter().copied()));
        }
        if let Some((min, max)) = self.range {
            builder = builder.validator(NumberRangeValidator {
                min: Some(min as f64),
                max: Some(max as f64),
            });
        }
        if self.sensitive {
            builder = builder.sensitive();
        }
        builder.build()
    }
}

impl FieldKind {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            FieldKind::String => AttributeType::String,
            FieldKind::Int | FieldKind::Number => AttributeType::Number,
            FieldKind::Bool => AttributeType::Bool,
            FieldKind::StringList => AttributeType::List(Box::new(AttributeType::String)),
            FieldKind::Table(columns) => AttributeType::List(Box::new(AttributeType::Object(
                columns
                    .iter()
                    .map(|c| (c.name.to_string(), c.kind.attribute_type()))
                    .collect(),
            ))),
        }
    }
}

impl DefaultValue {
    fn to_default(self, kind: FieldKind) -> Arc<dyn AttributeDefault> {
        match self {
            DefaultValue::Str(s) => StaticDefault::string(s),
            DefaultValue::Int(n) => StaticDefault::number(n as f64),
            DefaultValue::Bool(b) => StaticDefault::bool(b),
            DefaultValue::EmptyList => match kind {
                FieldKind::StringList | FieldKind::Table(_) => StaticDefault::list(Vec::new()),
                _ => StaticDefault::create(Dynamic::Null),
            },
        }
    }
}

impl ObjectKind {
    pub fn resource_type_name(&self) -> String {
        format!("{}_{}", crate::PROVIDER_NAME, self.name)
    }

    pub fn list_type_name(&self) -> String {
        format!("{}_{}_list", crate::PROVIDER_NAME, self.name)
    }

    pub fn stats_type_name(&self) -> String {
        format!("{}_{}_stats", crate::PROVIDER_NAME, self.name)
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.body {
            Body::Properties(fields) => fields,
            Body::Raw => &[],
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.body, Body::Raw)
    }

    /// Resource schema: `id`, `name`, then one attribute per field (or
    /// `content` for raw objects)
    pub fn resource_schema(&self) -> Schema {
        let mut builder = SchemaBuilder::new()
            .version(0)
            .description(self.description)
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Identifier of the object, same as its name")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the object")
                    .required()
                    .validator(StringLengthValidator::non_empty())
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            );

        builder = match self.body {
            Body::Properties(fields) => builder.attributes(fields.iter().map(Field::attribute)),
            Body::Raw => builder.attribute(
                AttributeBuilder::new(CONTENT_ATTRIBUTE, AttributeType::String)
                    .description("Text content of the object")
                    .required()
                    .build(),
            ),
        };
        builder.build()
    }
}

/// Look up a kind by its Terraform type suffix
pub fn find(name: &str) -> Option<&'static ObjectKind> {
    KINDS.iter().find(|kind| kind.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn attribute_names_prefix_non_basic_sections() {
        let pool = find("pool").unwrap();
        let schema = pool.resource_schema();
        assert!(schema.attribute("monitors").is_some());
        assert!(schema.attribute("load_balancing_algorithm").is_some());
        assert!(schema.attribute("algorithm").is_none());
    }

    #[test]
    fn every_resource_schema_has_exactly_one_mode_per_attribute() {
        for kind in KINDS {
            for attr in kind.resource_schema().attributes {
                let optional_or_computed = attr.optional || attr.computed;
                assert!(
                    attr.required != optional_or_computed,
                    "{}.{} mixes required with optional/computed",
                    kind.name,
                    attr.name
                );
                if attr.default.is_some() {
                    assert!(attr.optional && attr.computed, "{}.{}", kind.name, attr.name);
                }
            }
        }
    }

    #[test]
    fn attribute_names_are_unique_per_kind() {
        for kind in KINDS {
            let schema = kind.resource_schema();
            let names: HashSet<_> = schema.attributes.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names.len(), schema.attributes.len(), "{}", kind.name);
        }
    }

    #[test]
    fn kind_names_and_paths_are_unique() {
        let names: HashSet<_> = KINDS.iter().map(|k| k.name).collect();
        let paths: HashSet<_> = KINDS.iter().map(|k| k.path).collect();
        assert_eq!(names.len(), KINDS.len());
        assert_eq!(paths.len(), KINDS.len());
    }

    #[test]
    fn raw_kinds_expose_required_content() {
        let rule = find("rule").unwrap();
        assert!(rule.is_raw());
        let schema = rule.resource_schema();
        assert!(schema.attribute(CONTENT_ATTRIBUTE).unwrap().required);
        assert_eq!(schema.attributes.len(), 3);
    }

    #[test]
    fn field_options_reach_the_schema() {
        let key = find("ssl_server_key").unwrap().resource_schema();
        let private = key.attribute("private").unwrap();
        assert!(private.sensitive);
        assert!(private.required);

        let pool = find("pool").unwrap().resource_schema();
        let algorithm = pool.attribute("load_balancing_algorithm").unwrap();
        assert_eq!(algorithm.validators.len(), 1);
        assert!(algorithm.default.is_some());
    }

    #[test]
    fn type_names() {
        let pool = find("pool").unwrap();
        assert_eq!(pool.resource_type_name(), "vtm_pool");
        assert_eq!(pool.list_type_name(), "vtm_pool_list");
        assert_eq!(pool.stats_type_name(), "vtm_pool_stats");
        assert!(find("no_such_kind").is_none());
    }
}
