//! Converts captured raw values into typed settings.
//!
//! Values are grouped per parameter in arrival order and shaped by the
//! parameter's declared [`TargetShape`]. Binding reads the tree only; the
//! same tree bound twice into fresh targets gives equal results.

use std::collections::BTreeMap;

use tracing::{debug, instrument, trace};

use crate::application::error::BindError;
use crate::application::settings::SettingsTarget;
use crate::application::tree::{CommandTree, CommandTreeNode};
use crate::domain::{CommandModel, NodeId, ParameterDefinition, TargetShape, Value};
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::traits::TypeResolver;

/// Settings produced for one step of the command path.
pub struct BoundCommand {
    pub command: NodeId,
    /// Key the settings were resolved with
    pub key: String,
    pub settings: Box<dyn SettingsTarget>,
}

impl std::fmt::Debug for BoundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCommand")
            .field("command", &self.command)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Binder<'m> {
    model: &'m CommandModel,
}

impl<'m> Binder<'m> {
    pub fn new(model: &'m CommandModel) -> Self {
        Self { model }
    }

    /// Bind the values captured on one step.
    #[instrument(level = "debug", skip_all, fields(command = %self.model.node(step.command)))]
    pub fn bind(
        &self,
        step: &CommandTreeNode,
        target: &mut dyn SettingsTarget,
    ) -> Result<(), BindError> {
        let node = self.model.node(step.command);
        for (index, parameter) in node.parameters.iter().enumerate() {
            let raws: Vec<&str> = step.values_for(index).collect();
            if raws.is_empty() {
                continue;
            }
            let value = shape_values(parameter, &raws)?;
            trace!("{} = {}", parameter.property, value);
            target
                .assign(&parameter.property, value)
                .map_err(|reason| BindError::Assignment {
                    property: parameter.property.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Bind every step from root to leaf into one target, so values of
    /// inherited options sit next to the command's own.
    #[instrument(level = "debug", skip_all)]
    pub fn bind_path(
        &self,
        tree: &CommandTree,
        target: &mut dyn SettingsTarget,
    ) -> Result<(), BindError> {
        tree.iter().try_for_each(|step| self.bind(step, target))
    }

    /// One fresh settings instance per step that names a settings key.
    ///
    /// Each instance receives the values of its own step and of every
    /// ancestor step.
    #[instrument(level = "debug", skip_all)]
    pub fn bind_each(
        &self,
        tree: &CommandTree,
        resolver: &dyn TypeResolver,
    ) -> InfraResult<Vec<BoundCommand>> {
        let steps: Vec<&CommandTreeNode> = tree.iter().collect();
        let mut bound = Vec::new();

        for (depth, step) in steps.iter().enumerate() {
            let Some(key) = self.model.node(step.command).settings.as_deref() else {
                continue;
            };
            let mut settings = resolver.resolve(key)?;
            for ancestor in &steps[..=depth] {
                self.bind(ancestor, settings.as_mut())?;
            }
            debug!("bound '{}' for {}", key, self.model.node(step.command));
            bound.push(BoundCommand {
                command: step.command,
                key: key.to_string(),
                settings,
            });
        }

        Ok(bound)
    }
}

fn convert_one(parameter: &ParameterDefinition, raw: &str) -> Result<Value, BindError> {
    parameter
        .converter()
        .convert(raw)
        .map_err(|e| BindError::Conversion {
            property: parameter.property.clone(),
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}

fn decompose(parameter: &ParameterDefinition, raw: &str) -> Result<(String, String), BindError> {
    let decomposer = parameter
        .decomposer()
        .ok_or_else(|| BindError::Decomposition {
            property: parameter.property.clone(),
            raw: raw.to_string(),
            reason: "no pair decomposition declared".to_string(),
        })?;
    decomposer
        .decompose(raw)
        .map_err(|e| BindError::Decomposition {
            property: parameter.property.clone(),
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Convert `raws` according to the parameter's target shape.
fn shape_values(parameter: &ParameterDefinition, raws: &[&str]) -> Result<Value, BindError> {
    match parameter.shape {
        TargetShape::Scalar => match raws {
            [raw] => convert_one(parameter, raw),
            _ => Err(BindError::ArityMismatch {
                property: parameter.property.clone(),
                count: raws.len(),
            }),
        },
        TargetShape::Sequence => raws
            .iter()
            .map(|raw| convert_one(parameter, raw))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        TargetShape::Mapping => {
            let mut map = BTreeMap::new();
            for raw in raws {
                let (key, value) = decompose(parameter, raw)?;
                // last write wins
                map.insert(key, convert_one(parameter, &value)?);
            }
            Ok(Value::Map(map))
        }
        TargetShape::MultiMapping => {
            let mut lookup: BTreeMap<String, Vec<Value>> = BTreeMap::new();
            for raw in raws {
                let (key, value) = decompose(parameter, raw)?;
                lookup
                    .entry(key)
                    .or_default()
                    .push(convert_one(parameter, &value)?);
            }
            Ok(Value::Lookup(lookup))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::parser::CommandTreeParser;
    use crate::application::settings::BoundSettings;
    use crate::config::ParserSettings;
    use crate::domain::CommandModelBuilder;

    fn model() -> CommandModel {
        let mut builder = CommandModelBuilder::new();
        builder.command("run", |run| {
            run.option("-v|--var <PAIR>", "vars").of_type("int").mapping();
            run.option("-t|--tag <TAG>", "tags").sequence();
            run.option("-c|--count <N>", "count").of_type("int");
        });
        builder.build().unwrap()
    }

    fn bind(args: &[&str]) -> Result<BoundSettings, BindError> {
        let model = model();
        let settings = ParserSettings::default();
        let result = CommandTreeParser::new(&model, &settings)
            .parse_args(args)
            .unwrap();
        let mut bound = BoundSettings::new();
        Binder::new(&model).bind_path(&result.tree, &mut bound)?;
        Ok(bound)
    }

    #[test]
    fn test_sequence_keeps_arrival_order() {
        let bound = bind(&["run", "-t", "b", "-t", "a"]).unwrap();
        assert_eq!(
            bound.get_list("tags").unwrap(),
            &[Value::Str("b".into()), Value::Str("a".into())]
        );
    }

    #[test]
    fn test_scalar_with_two_values_is_arity_mismatch() {
        let err = bind(&["run", "-c", "1", "-c", "2"]).unwrap_err();
        assert_eq!(
            err,
            BindError::ArityMismatch {
                property: "count".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_unconvertible_value_names_property_and_raw() {
        let err = bind(&["run", "--var", "a=x"]).unwrap_err();
        assert!(matches!(err, BindError::Conversion { ref property, ref raw, .. } if property == "vars" && raw == "x"));
    }

    #[test]
    fn test_missing_pair_separator_is_decomposition_error() {
        let err = bind(&["run", "--var", "novalue"]).unwrap_err();
        assert!(matches!(err, BindError::Decomposition { .. }));
    }

    #[test]
    fn test_absent_parameters_are_not_assigned() {
        let bound = bind(&["run"]).unwrap();
        assert!(bound.is_empty());
    }
}
