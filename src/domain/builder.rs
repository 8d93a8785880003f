//! Declarative construction of the command model.
//!
//! The host describes branches, commands and their parameters once at
//! startup; [`CommandModelBuilder::build`] validates every template and
//! resolves every converter up front, so parsing never meets a
//! configuration problem.
//!
//! ```
//! use argtree::domain::{CommandModelBuilder, TargetShape};
//!
//! let mut builder = CommandModelBuilder::new();
//! builder.branch("animal", |animal| {
//!     animal.option("-a|--alive", "is_alive");
//!     animal.command("dog", |dog| {
//!         dog.argument("<AGE>", "age").of_type("int");
//!         dog.option("-n|--name <NAME>", "name");
//!     });
//! });
//! let model = builder.build().unwrap();
//! assert_eq!(model.leaf_commands(), vec!["animal dog"]);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::arena::{CommandModel, CommandNode, NodeId};
use crate::domain::convert::{types, Converter, ConverterRegistry, Decomposer};
use crate::domain::error::{ConfigResult, ConfigurationError};
use crate::domain::parameter::{ParameterDefinition, ParameterKind, TargetShape};
use crate::domain::template::{parse_argument, parse_option};

/// Declaration of one argument or option, resolved by the builder.
#[derive(Clone)]
pub struct ParameterDeclaration {
    template: String,
    property: String,
    is_argument: bool,
    shape: TargetShape,
    value_type: Option<String>,
    description: Option<String>,
    converter: Option<Arc<dyn Converter>>,
    decomposer: Option<Arc<dyn Decomposer>>,
}

impl ParameterDeclaration {
    fn new(template: &str, property: &str, is_argument: bool) -> Self {
        Self {
            template: template.to_string(),
            property: property.to_string(),
            is_argument,
            shape: TargetShape::Scalar,
            value_type: None,
            description: None,
            converter: None,
            decomposer: None,
        }
    }

    /// Registered type name of the value (default `string`, `bool` for flags).
    pub fn of_type(&mut self, value_type: &str) -> &mut Self {
        self.value_type = Some(value_type.to_string());
        self
    }

    pub fn shape(&mut self, shape: TargetShape) -> &mut Self {
        self.shape = shape;
        self
    }

    pub fn sequence(&mut self) -> &mut Self {
        self.shape(TargetShape::Sequence)
    }

    pub fn mapping(&mut self) -> &mut Self {
        self.shape(TargetShape::Mapping)
    }

    pub fn multi_mapping(&mut self) -> &mut Self {
        self.shape(TargetShape::MultiMapping)
    }

    pub fn describe(&mut self, description: &str) -> &mut Self {
        self.description = Some(description.to_string());
        self
    }

    /// Per-parameter converter, replacing the registry lookup.
    pub fn with_converter<C: Converter + 'static>(&mut self, converter: C) -> &mut Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    /// Per-parameter pair decomposition for mapping targets.
    pub fn with_decomposer<D: Decomposer + 'static>(&mut self, decomposer: D) -> &mut Self {
        self.decomposer = Some(Arc::new(decomposer));
        self
    }
}

/// Declaration of a branch, command or the implicit root.
#[derive(Clone)]
pub struct CommandDeclaration {
    name: String,
    description: Option<String>,
    is_leaf: bool,
    parameters: Vec<ParameterDeclaration>,
    children: Vec<CommandDeclaration>,
    default_child: Option<String>,
    settings: Option<String>,
}

impl CommandDeclaration {
    fn new(name: &str, is_leaf: bool) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            is_leaf,
            parameters: Vec::new(),
            children: Vec::new(),
            default_child: None,
            settings: None,
        }
    }

    /// Positional argument from a `<NAME>` / `[NAME]` template.
    pub fn argument(&mut self, template: &str, property: &str) -> &mut ParameterDeclaration {
        self.parameters
            .push(ParameterDeclaration::new(template, property, true));
        let last = self.parameters.len() - 1;
        &mut self.parameters[last]
    }

    /// Named option from a `-x|--long <VALUE>` template.
    pub fn option(&mut self, template: &str, property: &str) -> &mut ParameterDeclaration {
        self.parameters
            .push(ParameterDeclaration::new(template, property, false));
        let last = self.parameters.len() - 1;
        &mut self.parameters[last]
    }

    /// Add an executable leaf command.
    pub fn command<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut CommandDeclaration),
    {
        let mut command = CommandDeclaration::new(name, true);
        configure(&mut command);
        self.children.push(command);
        self
    }

    /// Add a branch grouping further commands.
    pub fn branch<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut CommandDeclaration),
    {
        let mut branch = CommandDeclaration::new(name, false);
        configure(&mut branch);
        self.children.push(branch);
        self
    }

    /// Child invoked when the command line does not name one.
    pub fn default_command(&mut self, name: &str) -> &mut Self {
        self.default_child = Some(name.to_string());
        self
    }

    /// Key the type resolver uses to create this node's settings.
    pub fn settings(&mut self, key: &str) -> &mut Self {
        self.settings = Some(key.to_string());
        self
    }

    pub fn describe(&mut self, description: &str) -> &mut Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Builds an immutable [`CommandModel`] from declarations.
pub struct CommandModelBuilder {
    root: CommandDeclaration,
    registry: ConverterRegistry,
}

impl Default for CommandModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandModelBuilder {
    pub fn new() -> Self {
        Self::with_registry(ConverterRegistry::new())
    }

    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self {
            root: CommandDeclaration::new("", false),
            registry,
        }
    }

    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// The implicit root, for parameters visible to every command.
    pub fn root(&mut self) -> &mut CommandDeclaration {
        &mut self.root
    }

    pub fn command<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut CommandDeclaration),
    {
        self.root.command(name, configure);
        self
    }

    pub fn branch<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut CommandDeclaration),
    {
        self.root.branch(name, configure);
        self
    }

    pub fn default_command(&mut self, name: &str) -> &mut Self {
        self.root.default_command(name);
        self
    }

    /// Validate all declarations and produce the model.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self) -> ConfigResult<CommandModel> {
        let mut model = CommandModel::new();
        let root_idx = model.root();

        let parameters = self.resolve_parameters(&self.root)?;
        let inherited = properties_on_path(&self.root, &parameters, &[])?;
        if let Some(root) = model.get_node_mut(root_idx) {
            root.parameters = parameters;
            root.description = self.root.description.clone();
            root.settings = self.root.settings.clone();
        }

        self.build_children(&mut model, root_idx, &self.root, &inherited)?;
        debug!("build: model with {} nodes", model.len());
        Ok(model)
    }

    fn build_children(
        &self,
        model: &mut CommandModel,
        parent_idx: NodeId,
        declaration: &CommandDeclaration,
        inherited: &[String],
    ) -> ConfigResult<()> {
        let parent_name = display_name(&declaration.name);

        if declaration.is_leaf && !declaration.children.is_empty() {
            return Err(ConfigurationError::LeafWithChildren {
                command: parent_name.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for child in &declaration.children {
            validate_command_name(&child.name)?;
            if !seen.insert(child.name.as_str()) {
                return Err(ConfigurationError::DuplicateCommand {
                    parent: parent_name.to_string(),
                    name: child.name.clone(),
                });
            }

            let parameters = self.resolve_parameters(child)?;
            let properties = properties_on_path(child, &parameters, inherited)?;
            let node = CommandNode {
                name: child.name.clone(),
                description: child.description.clone(),
                parent: None,
                children: Vec::new(),
                is_leaf: child.is_leaf,
                parameters,
                default_child: None,
                settings: child.settings.clone(),
            };
            let child_idx = model.insert_node(node, parent_idx);
            self.build_children(model, child_idx, child, &properties)?;
        }

        if let Some(default_name) = &declaration.default_child {
            if declaration.is_leaf {
                return Err(ConfigurationError::DefaultCommandOnLeaf {
                    command: parent_name.to_string(),
                });
            }
            let default_idx = model.find_child(parent_idx, default_name, true).ok_or_else(|| {
                ConfigurationError::UnknownDefaultCommand {
                    parent: parent_name.to_string(),
                    name: default_name.clone(),
                }
            })?;
            if let Some(parent) = model.get_node_mut(parent_idx) {
                parent.default_child = Some(default_idx);
            }
        }

        Ok(())
    }

    fn resolve_parameters(
        &self,
        declaration: &CommandDeclaration,
    ) -> ConfigResult<Vec<ParameterDefinition>> {
        let command = display_name(&declaration.name);
        let mut resolved: Vec<ParameterDefinition> = Vec::new();
        let mut position = 0;
        let mut seen_optional = false;
        let mut seen_variadic = false;

        for p in &declaration.parameters {
            let (kind, required) = if p.is_argument {
                let template = parse_argument(&p.template)?;
                if seen_variadic {
                    return Err(ConfigurationError::VariadicArgumentNotLast {
                        command: command.to_string(),
                        argument: resolved
                            .iter()
                            .rev()
                            .find(|d| d.is_argument())
                            .map(|d| d.display_name())
                            .unwrap_or_default(),
                    });
                }
                if template.required && seen_optional {
                    return Err(ConfigurationError::RequiredArgumentAfterOptional {
                        command: command.to_string(),
                        argument: template.value_name,
                    });
                }
                seen_optional |= !template.required;
                seen_variadic |= p.shape != TargetShape::Scalar;
                let kind = ParameterKind::Argument {
                    position,
                    value_name: template.value_name,
                };
                position += 1;
                (kind, template.required)
            } else {
                let template = parse_option(&p.template)?;
                let clash = resolved.iter().find(|d| {
                    template.short.is_some() && d.short_name() == template.short
                        || template.long.is_some() && d.long_name() == template.long.as_deref()
                });
                if clash.is_some() {
                    return Err(ConfigurationError::DuplicateOption {
                        command: command.to_string(),
                        option: template.display_name(),
                    });
                }
                let required = template.value_name.is_some();
                let kind = ParameterKind::Option {
                    short: template.short,
                    long: template.long,
                    value_name: template.value_name,
                };
                (kind, required)
            };

            let is_flag = matches!(
                kind,
                ParameterKind::Option {
                    value_name: None,
                    ..
                }
            );
            let default_type = if is_flag { types::BOOL } else { types::STRING };
            let value_type = p
                .value_type
                .clone()
                .unwrap_or_else(|| default_type.to_string());
            if is_flag && value_type != types::BOOL {
                return Err(ConfigurationError::FlagMustBeBoolean {
                    property: p.property.clone(),
                    value_type,
                });
            }

            let (converter, decomposer) = self.resolve_capabilities(p, &value_type)?;
            resolved.push(ParameterDefinition {
                property: p.property.clone(),
                kind,
                required,
                shape: p.shape,
                value_type,
                description: p.description.clone(),
                converter,
                decomposer,
            });
        }

        Ok(resolved)
    }

    fn resolve_capabilities(
        &self,
        p: &ParameterDeclaration,
        value_type: &str,
    ) -> ConfigResult<(Arc<dyn Converter>, Option<Arc<dyn Decomposer>>)> {
        if p.decomposer.is_some() && p.converter.is_some() {
            return Err(ConfigurationError::AmbiguousPairDecomposition {
                property: p.property.clone(),
            });
        }
        if p.decomposer.is_some() && !p.shape.is_decomposable() {
            return Err(ConfigurationError::NotDecomposable {
                property: p.property.clone(),
            });
        }

        let converter = p
            .converter
            .clone()
            .or_else(|| self.registry.converter(value_type))
            .ok_or_else(|| ConfigurationError::NoConverterFound {
                property: p.property.clone(),
                value_type: value_type.to_string(),
            })?;

        let decomposer = if p.shape.is_decomposable() {
            let decomposer = p
                .decomposer
                .clone()
                .or_else(|| self.registry.decomposer(value_type))
                .ok_or_else(|| ConfigurationError::MissingDecomposer {
                    property: p.property.clone(),
                    value_type: value_type.to_string(),
                })?;
            Some(decomposer)
        } else {
            None
        };

        Ok((converter, decomposer))
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<root>"
    } else {
        name
    }
}

/// Property names visible on the path down to `declaration`.
///
/// Settings along one path are bound into a single target, so a property
/// may be declared only once per path.
fn properties_on_path(
    declaration: &CommandDeclaration,
    parameters: &[ParameterDefinition],
    inherited: &[String],
) -> ConfigResult<Vec<String>> {
    let mut properties = inherited.to_vec();
    for parameter in parameters {
        if properties.contains(&parameter.property) {
            return Err(ConfigurationError::DuplicateProperty {
                command: display_name(&declaration.name).to_string(),
                property: parameter.property.clone(),
            });
        }
        properties.push(parameter.property.clone());
    }
    Ok(properties)
}

fn validate_command_name(name: &str) -> ConfigResult<()> {
    let invalid = name.is_empty()
        || name.starts_with('-')
        || name.chars().any(|c| c.is_whitespace() || c == '"');
    if invalid {
        return Err(ConfigurationError::InvalidCommandName {
            name: name.to_string(),
        });
    }
    Ok(())
}
