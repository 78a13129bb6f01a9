//! Data source schemas derived from resource schemas

use tfplug::schema::{Attribute, Schema};

/// The attribute that identifies the object to read
pub const NAME_ATTRIBUTE: &str = "name";

/// Turn a resource schema into the schema of the data source that reads the
/// same object.
///
/// Every attribute except `name` becomes optional and computed, and loses
/// its default and plan modifiers. `name` stays required. Validators and
/// sensitivity are kept. Applying `relax` twice gives the same schema as
/// applying it once.
pub fn relax(schema: &Schema) -> Schema {
    Schema {
        version: schema.version,
        description: schema.description.clone(),
        attributes: schema.attributes.iter().map(relax_attribute).collect(),
    }
}

fn relax_attribute(attribute: &Attribute) -> Attribute {
    let mut relaxed = attribute.clone();
    if relaxed.name == NAME_ATTRIBUTE {
        return relaxed;
    }

    relaxed.required = false;
    relaxed.optional = true;
    relaxed.computed = true;
    relaxed.default = None;
    relaxed.plan_modifiers.clear();
    relaxed
}
