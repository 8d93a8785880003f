//! Integration tests for building the command model

use rstest::rstest;

use argtree::domain::{
    CommandModelBuilder, ConfigurationError, TargetShape, TemplateError, TreeNodeConvert,
};

fn zoo() -> CommandModelBuilder {
    let mut builder = CommandModelBuilder::new();
    builder.root().option("-v|--verbose", "verbose");
    builder.branch("animal", |animal| {
        animal.branch("mammal", |mammal| {
            mammal.command("dog", |dog| {
                dog.argument("<AGE>", "age").of_type("int");
            });
            mammal.command("horse", |_| {});
            mammal.default_command("dog");
        });
        animal.command("bird", |bird| {
            bird.argument("[WORDS]", "words").sequence();
        });
    });
    builder
}

#[test]
fn given_declarations_when_building_then_preserves_declaration_order() {
    // Act
    let model = zoo().build().unwrap();

    // Assert
    assert_eq!(
        model.leaf_commands(),
        vec!["animal mammal dog", "animal mammal horse", "animal bird"]
    );
    assert_eq!(model.depth(), 4);
    assert_eq!(model.len(), 6);
}

#[test]
fn given_built_model_when_navigating_then_parents_and_defaults_resolve() {
    // Arrange
    let model = zoo().build().unwrap();
    let mammal = model.lookup(&["animal", "mammal"]).unwrap();
    let dog = model.lookup(&["animal", "mammal", "dog"]).unwrap();

    // Act
    let ancestors: Vec<_> = model.ancestors(dog).collect();

    // Assert
    assert_eq!(model.node(mammal).default_child, Some(dog));
    assert_eq!(ancestors.len(), 4);
    assert_eq!(ancestors[1], mammal);
    assert_eq!(*ancestors.last().unwrap(), model.root());
    assert_eq!(model.path(dog), vec!["animal", "mammal", "dog"]);
}

#[test]
fn given_case_insensitive_lookup_when_finding_child_then_ignores_case() {
    let model = zoo().build().unwrap();
    let animal = model.lookup(&["animal"]).unwrap();

    assert!(model.find_child(animal, "BIRD", true).is_none());
    assert!(model.find_child(animal, "BIRD", false).is_some());
}

#[test]
fn given_sequence_declaration_when_building_then_shape_is_kept() {
    let model = zoo().build().unwrap();
    let bird = model.lookup(&["animal", "bird"]).unwrap();

    let words = &model.node(bird).parameters[0];

    assert_eq!(words.shape, TargetShape::Sequence);
    assert!(words.allows_multiple());
    assert!(!words.required);
}

#[test]
fn given_bad_option_template_when_building_then_template_error_surfaces() {
    // Arrange
    let mut builder = CommandModelBuilder::new();
    builder.command("run", |run| {
        run.option("--1st", "first");
    });

    // Act
    let err = builder.build().unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ConfigurationError::Template(TemplateError::OptionNamesCannotStartWithDigit { .. })
    ));
}

#[rstest]
#[case::duplicate_command("duplicate_command")]
#[case::duplicate_option("duplicate_option")]
#[case::unknown_default("unknown_default")]
#[case::required_after_optional("required_after_optional")]
#[case::variadic_not_last("variadic_not_last")]
#[case::invalid_name("invalid_name")]
#[case::duplicate_property("duplicate_property")]
fn given_inconsistent_model_when_building_then_fails(#[case] problem: &str) {
    // Arrange
    let mut builder = CommandModelBuilder::new();
    match problem {
        "duplicate_command" => {
            builder.command("dog", |_| {});
            builder.command("dog", |_| {});
        }
        "duplicate_option" => {
            builder.command("dog", |dog| {
                dog.option("-n|--name <NAME>", "name");
                dog.option("--name <OTHER>", "other");
            });
        }
        "unknown_default" => {
            builder.branch("animal", |animal| {
                animal.command("dog", |_| {});
                animal.default_command("cat");
            });
        }
        "required_after_optional" => {
            builder.command("dog", |dog| {
                dog.argument("[AGE]", "age");
                dog.argument("<NAME>", "name");
            });
        }
        "variadic_not_last" => {
            builder.command("dog", |dog| {
                dog.argument("[TRICKS]", "tricks").sequence();
                dog.argument("[NAME]", "name");
            });
        }
        "duplicate_property" => {
            builder.branch("animal", |animal| {
                animal.option("-n|--name <NAME>", "name");
                animal.command("dog", |dog| {
                    dog.argument("<NAME>", "name");
                });
            });
        }
        _ => {
            builder.command("-dog", |_| {});
        }
    }

    // Act
    let err = builder.build().unwrap_err();

    // Assert
    let matched = match problem {
        "duplicate_command" => matches!(err, ConfigurationError::DuplicateCommand { .. }),
        "duplicate_option" => matches!(err, ConfigurationError::DuplicateOption { .. }),
        "unknown_default" => matches!(err, ConfigurationError::UnknownDefaultCommand { .. }),
        "required_after_optional" => {
            matches!(err, ConfigurationError::RequiredArgumentAfterOptional { .. })
        }
        "variadic_not_last" => matches!(err, ConfigurationError::VariadicArgumentNotLast { .. }),
        "duplicate_property" => matches!(
            err,
            ConfigurationError::DuplicateProperty { ref command, ref property }
                if command == "dog" && property == "name"
        ),
        _ => matches!(err, ConfigurationError::InvalidCommandName { .. }),
    };
    assert!(matched, "{problem}: {err}");
}

#[test]
fn given_model_when_rendering_then_shows_parameters_and_defaults() {
    // Act
    let rendered = zoo().build().unwrap().to_tree_string().to_string();

    // Assert
    assert!(rendered.starts_with("<root> [--verbose]"));
    assert!(rendered.contains("mammal (default: dog)"));
    assert!(rendered.contains("dog <AGE>"));
    assert!(rendered.contains("bird [WORDS]"));
}

#[test]
fn given_same_property_on_sibling_commands_when_building_then_succeeds() {
    // Arrange
    let mut builder = CommandModelBuilder::new();
    builder.command("dog", |dog| {
        dog.option("-n|--name <NAME>", "name");
    });
    builder.command("cat", |cat| {
        cat.option("-n|--name <NAME>", "name");
    });

    // Act
    let model = builder.build();

    // Assert
    assert!(model.is_ok());
}
