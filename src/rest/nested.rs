//! Nested association data.
//!
//! Two paths feed association data into a parent resource:
//!
//! - [`load_payload`] runs when a resource is instantiated from server data.
//!   For each declared association whose data key is present, the nested
//!   JSON is parsed with the target model's rules and stored under the
//!   association name as a [`Resource`] or [`Collection`].
//! - [`NestedAssigner`] handles `<name>_attributes`-style assignment from
//!   caller code: it creates the nested resource when the parent has none,
//!   or merges into the existing one.

use serde_json::{Map, Value};

use crate::rest::association::{AssociationDecl, AssociationKind};
use crate::rest::errors::ResourceError;
use crate::rest::registry::Model;
use crate::rest::resource::Resource;
use crate::rest::shape::{self, RawPayload, Shape};
use crate::rest::value::{AttrValue, Collection};

/// Assigns nested attributes to one single-valued association.
#[derive(Debug, Clone)]
pub struct NestedAssigner {
    decl: AssociationDecl,
    target: Model,
}

impl NestedAssigner {
    /// Creates an assigner for the association `name` declared on `model`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAssociation`] if `model` declares no
    /// such association, and [`ResourceError::UnknownModel`] if its target
    /// is not registered.
    pub fn for_association(model: &Model, name: &str) -> Result<Self, ResourceError> {
        let decl = model
            .config()
            .association(name)
            .cloned()
            .ok_or_else(|| ResourceError::UnknownAssociation {
                model: model.name().to_string(),
                name: name.to_string(),
            })?;
        let target = model.resolve_target(&decl)?;
        Ok(Self { decl, target })
    }

    /// Assigns `attrs` to the association on `parent`.
    ///
    /// When the parent holds no value, a new target resource is built from
    /// `attrs` (after root parsing) and stored without marking the parent
    /// changed. When the parent already holds a resource, `attrs` are merged
    /// into it in place and the merged keys are marked changed on the nested
    /// resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NestedAssignment`] if the parent holds a
    /// non-blank value that is not a single resource.
    pub fn assign(&self, parent: &mut Resource, attrs: Map<String, Value>) -> Result<(), ResourceError> {
        let name = self.decl.name();
        let existing_is_blank = parent.get(name).map_or(true, AttrValue::is_blank);

        if existing_is_blank {
            let data = match self.target.parse(Value::Object(attrs)) {
                Value::Object(data) => data,
                other => {
                    return Err(ResourceError::NestedAssignment {
                        association: name.to_string(),
                        reason: format!("expected an object after root parsing, got {other}"),
                    });
                }
            };
            let nested = self.target.build(data);
            parent.attributes_mut().load(name, nested);
            return Ok(());
        }

        match parent.attributes_mut().get_mut(name) {
            Some(AttrValue::Resource(nested)) => {
                nested.assign_attributes(attrs);
                Ok(())
            }
            _ => Err(ResourceError::NestedAssignment {
                association: name.to_string(),
                reason: "existing value is not a single resource".to_string(),
            }),
        }
    }
}

/// Loads server data into `resource`, resolving declared associations.
///
/// Raw keys are loaded first. Then every association whose data key holds a
/// non-null value is parsed with its target model and stored under the
/// association name. A target that is not registered leaves the raw value
/// in place.
pub(crate) fn load_payload(resource: &mut Resource, data: Map<String, Value>) {
    let model = resource.model().clone();

    let nested: Vec<(&AssociationDecl, Value)> = model
        .config()
        .associations()
        .iter()
        .filter_map(|decl| match data.get(decl.data_key_name()) {
            None | Some(Value::Null) => None,
            Some(value) => Some((decl, value.clone())),
        })
        .collect();

    for (key, value) in data {
        resource.attributes_mut().load(key, value);
    }

    for (decl, raw) in nested {
        let target = match model.resolve_target(decl) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(
                    model = %model.name(),
                    association = %decl.name(),
                    "Keeping raw association data: {}",
                    e
                );
                continue;
            }
        };

        let parsed = parse_nested(decl, &target, raw);
        resource.attributes_mut().load(decl.name(), parsed);
    }
}

fn parse_nested(decl: &AssociationDecl, target: &Model, raw: Value) -> AttrValue {
    match decl.kind() {
        AssociationKind::HasMany => match shape::resolve(target.config(), raw, Shape::Collection) {
            RawPayload::Many(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(data) => Some(target.instantiate(data)),
                    _ => None,
                })
                .collect::<Collection>()
                .into(),
            RawPayload::One(other) => {
                tracing::debug!(
                    association = %decl.name(),
                    "Nested has_many data is not a list, keeping it as-is"
                );
                AttrValue::Json(other)
            }
        },
        AssociationKind::HasOne | AssociationKind::BelongsTo => match raw {
            Value::Object(data) => target.instantiate(data).into(),
            other => AttrValue::Json(other),
        },
    }
}
