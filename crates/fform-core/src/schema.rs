#![forbid(unsafe_code)]

//! Record schemas and attribute metadata.
//!
//! A [`Schema`] is a named, ordered set of attributes. Value attributes carry
//! an [`AttributeDescriptor`]; reference attributes point at another schema
//! and make nested paths (`customer.city`) resolvable.
//!
//! Schemas are immutable after [`SchemaBuilder::build`] and shared via `Arc`.

use std::fmt;
use std::sync::Arc;

use crate::error::InvalidPathError;
use crate::path::AttributePath;
use crate::value::ValueType;

/// Metadata for the terminal attribute of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    name: String,
    value_type: ValueType,
    mandatory: bool,
}

impl AttributeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType, mandatory: bool) -> Self {
        Self {
            name: name.into(),
            value_type,
            mandatory,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the attribute.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }
}

/// One attribute of a schema.
#[derive(Debug, Clone)]
pub(crate) enum Attribute {
    Value(AttributeDescriptor),
    Reference { name: String, target: Arc<Schema> },
}

impl Attribute {
    fn name(&self) -> &str {
        match self {
            Self::Value(d) => d.name(),
            Self::Reference { name, .. } => name,
        }
    }
}

/// Named set of attributes describing a record.
#[derive(Clone)]
pub struct Schema {
    name: String,
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Start building a schema called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Schema {
                name: name.into(),
                attributes: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of all attributes, in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(Attribute::name)
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Schema of the reference attribute `name`, if it is one.
    #[must_use]
    pub fn reference_target(&self, name: &str) -> Option<&Arc<Schema>> {
        match self.attribute(name) {
            Some(Attribute::Reference { target, .. }) => Some(target),
            _ => None,
        }
    }

    /// Describe the terminal attribute of `path`.
    ///
    /// Every segment but the last must name a reference attribute; the last
    /// must name a value attribute.
    pub fn describe(&self, path: &AttributePath) -> Result<AttributeDescriptor, InvalidPathError> {
        match self.walk(path)? {
            Attribute::Value(descriptor) => Ok(descriptor.clone()),
            Attribute::Reference { .. } => Err(InvalidPathError::NotAValue {
                path: path.to_string(),
            }),
        }
    }

    /// Schema of the records addressed by the reference path `path`.
    pub fn describe_reference(&self, path: &AttributePath) -> Result<Arc<Schema>, InvalidPathError> {
        match self.walk(path)? {
            Attribute::Reference { target, .. } => Ok(Arc::clone(target)),
            Attribute::Value(_) => Err(InvalidPathError::NotAReference {
                path: path.to_string(),
                segment: path.terminal().to_owned(),
            }),
        }
    }

    /// Follow `path` through reference attributes and return its terminal attribute.
    fn walk(&self, path: &AttributePath) -> Result<&Attribute, InvalidPathError> {
        let mut schema = self;
        let last = path.len() - 1;
        for (i, segment) in path.segments().iter().enumerate() {
            let attribute =
                schema
                    .attribute(segment)
                    .ok_or_else(|| InvalidPathError::UnknownAttribute {
                        schema: schema.name.clone(),
                        path: path.to_string(),
                        segment: segment.clone(),
                    })?;
            if i == last {
                return Ok(attribute);
            }
            match attribute {
                Attribute::Reference { target, .. } => schema = target,
                Attribute::Value(_) => {
                    return Err(InvalidPathError::NotAReference {
                        path: path.to_string(),
                        segment: segment.clone(),
                    });
                }
            }
        }
        // Paths are never empty, so the loop always returns.
        Err(InvalidPathError::Empty)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

/// Builder for [`Schema`].
///
/// Redeclaring an attribute name replaces the earlier declaration.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Declare an optional value attribute.
    #[must_use]
    pub fn attribute(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.push(Attribute::Value(AttributeDescriptor::new(
            name, value_type, false,
        )))
    }

    /// Declare a mandatory value attribute.
    #[must_use]
    pub fn mandatory(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.push(Attribute::Value(AttributeDescriptor::new(
            name, value_type, true,
        )))
    }

    /// Declare a reference attribute to records of `target`.
    #[must_use]
    pub fn reference(self, name: impl Into<String>, target: Arc<Schema>) -> Self {
        self.push(Attribute::Reference {
            name: name.into(),
            target,
        })
    }

    fn push(mut self, attribute: Attribute) -> Self {
        self.schema
            .attributes
            .retain(|existing| existing.name() != attribute.name());
        self.schema.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<Schema> {
        Arc::new(self.schema)
    }
}
