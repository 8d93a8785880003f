//! Integration tests for the command tree parser

use rstest::rstest;

use argtree::application::{CommandTreeParser, ParseError, ParseResult};
use argtree::config::ParserSettings;
use argtree::domain::{CommandModel, CommandModelBuilder};

fn animal_model() -> CommandModel {
    let mut builder = CommandModelBuilder::new();
    builder.root().option("-v|--verbose", "verbose");
    builder.branch("animal", |animal| {
        animal.option("-a|--alive", "is_alive");
        animal.branch("mammal", |mammal| {
            mammal.command("dog", |dog| {
                dog.argument("<AGE>", "age").of_type("int");
                dog.argument("[LEGS]", "legs").of_type("int");
                dog.option("-n|--name <NAME>", "name");
                dog.option("-g|--good", "good_boy");
            });
            mammal.command("horse", |_| {});
            mammal.default_command("dog");
        });
        animal.command("bird", |bird| {
            bird.argument("[WORDS]", "words").sequence();
        });
    });
    builder.build().unwrap()
}

fn parse_with(settings: &ParserSettings, args: &[&str]) -> Result<(CommandModel, ParseResult), ParseError> {
    let model = animal_model();
    let result = CommandTreeParser::new(&model, settings).parse_args(args)?;
    Ok((model, result))
}

fn parse(args: &[&str]) -> Result<(CommandModel, ParseResult), ParseError> {
    parse_with(&ParserSettings::default(), args)
}

fn captured(model: &CommandModel, result: &ParseResult) -> Vec<(String, String)> {
    result
        .tree
        .captured(model)
        .map(|(p, v)| (p.property.clone(), v.to_string()))
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn given_full_path_when_parsing_then_reaches_leaf_with_values() {
    // Act
    let (model, result) = parse(&["animal", "mammal", "dog", "--name", "Rufus", "7"]).unwrap();

    // Assert
    assert_eq!(result.tree.path(&model), vec!["animal", "mammal", "dog"]);
    assert_eq!(
        captured(&model, &result),
        pairs(&[("name", "Rufus"), ("age", "7")])
    );
    assert!(result.remaining.is_empty());
}

#[test]
fn given_inherited_options_when_parsing_then_recorded_on_declaring_nodes() {
    // Act
    let (model, result) = parse(&["animal", "mammal", "dog", "-v", "-a", "3"]).unwrap();

    // Assert
    assert_eq!(result.tree.root().mapped.len(), 1);
    assert_eq!(result.tree.get(1).unwrap().mapped.len(), 1);
    assert_eq!(
        captured(&model, &result),
        pairs(&[("verbose", "true"), ("is_alive", "true"), ("age", "3")])
    );
}

#[test]
fn given_grouped_flags_when_parsing_then_each_flag_is_set() {
    let (model, result) = parse(&["animal", "mammal", "dog", "-ga", "3"]).unwrap();
    assert_eq!(
        captured(&model, &result),
        pairs(&[("is_alive", "true"), ("good_boy", "true"), ("age", "3")])
    );
}

#[test]
fn given_flag_with_inline_boolean_when_parsing_then_value_is_used() {
    let (model, result) = parse(&["animal", "--alive=false", "bird"]).unwrap();
    assert_eq!(captured(&model, &result), pairs(&[("is_alive", "false")]));
    assert_eq!(result.tree.path(&model), vec!["animal", "bird"]);
}

#[test]
fn given_flag_followed_by_word_when_parsing_then_word_is_not_swallowed() {
    let (model, result) = parse(&["animal", "--alive", "bird"]).unwrap();
    assert_eq!(result.tree.path(&model), vec!["animal", "bird"]);
}

#[test]
fn given_branch_with_default_when_command_omitted_then_default_receives_arguments() {
    // Act
    let (model, result) = parse(&["animal", "mammal", "5", "4"]).unwrap();

    // Assert
    assert_eq!(result.tree.path(&model), vec!["animal", "mammal", "dog"]);
    assert_eq!(captured(&model, &result), pairs(&[("age", "5"), ("legs", "4")]));
}

#[test]
fn given_input_ending_on_branch_with_default_then_default_arguments_are_checked() {
    let err = parse(&["animal", "mammal"]).unwrap_err();
    // dog still needs its AGE
    assert_eq!(
        err,
        ParseError::MissingRequiredArgument {
            command: "dog".to_string(),
            argument: "AGE".to_string(),
            position: 13,
        }
    );
}

#[test]
fn given_input_ending_on_branch_without_default_then_missing_command() {
    let err = parse(&["animal"]).unwrap_err();
    assert!(matches!(err, ParseError::MissingCommand { ref branch, .. } if branch == "animal"));
}

#[test]
fn given_typo_in_command_when_parsing_then_suggests_closest_child() {
    // Arrange
    let settings = ParserSettings::default();

    // Act
    let err = parse_with(&settings, &["animal", "mamal", "dog"]).unwrap_err();

    // Assert
    assert_eq!(
        err,
        ParseError::UnknownCommand {
            name: "mamal".to_string(),
            position: 7,
            suggestion: Some("mammal".to_string()),
        }
    );
    assert_eq!(
        err.to_string(),
        "unknown command 'mamal', did you mean 'mammal'?"
    );
}

#[test]
fn given_suggestions_disabled_when_typo_then_no_suggestion() {
    let settings = ParserSettings {
        suggestions: false,
        ..ParserSettings::default()
    };
    let err = parse_with(&settings, &["animal", "mamal"]).unwrap_err();
    assert_eq!(err.suggestion(), None);
}

#[test]
fn given_unknown_option_when_parsing_then_fails_with_suggestion() {
    let err = parse(&["animal", "mammal", "dog", "3", "--nmae", "x"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownOption {
            name: "--nmae".to_string(),
            position: 20,
            suggestion: Some("--name".to_string()),
        }
    );
}

#[test]
fn given_option_of_sibling_when_parsing_then_is_unknown() {
    let err = parse(&["animal", "bird", "--name", "x"]).unwrap_err();
    assert!(matches!(err, ParseError::UnknownOption { .. }));
}

#[test]
fn given_option_without_value_when_followed_by_option_then_fails() {
    let err = parse(&["animal", "mammal", "dog", "--name", "-a", "3"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingRequiredOptionValue {
            option: "--name".to_string(),
            position: 18,
        }
    );
}

#[test]
fn given_missing_required_argument_when_parsing_then_names_command() {
    let err = parse(&["animal", "mammal", "dog"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "command 'dog' is missing required argument 'AGE'"
    );
}

#[test]
fn given_repeated_option_when_parsing_then_values_accumulate() {
    let (model, result) = parse(&["animal", "mammal", "dog", "1", "-n", "a", "-n", "b"]).unwrap();
    assert_eq!(
        captured(&model, &result),
        pairs(&[("age", "1"), ("name", "a"), ("name", "b")])
    );
}

#[test]
fn given_variadic_argument_when_parsing_then_extra_words_extend_it() {
    let (model, result) = parse(&["animal", "bird", "tweet", "chirp", "caw"]).unwrap();
    assert_eq!(
        captured(&model, &result),
        pairs(&[("words", "tweet"), ("words", "chirp"), ("words", "caw")])
    );
    assert!(result.remaining.is_empty());
}

#[test]
fn given_surplus_words_when_not_strict_then_they_remain() {
    // Act
    let (_, result) = parse(&["animal", "mammal", "dog", "1", "4", "extra"]).unwrap();

    // Assert
    assert_eq!(result.remaining.raw, vec!["extra"]);
}

#[test]
fn given_surplus_words_when_strict_then_fails() {
    let settings = ParserSettings {
        strict: true,
        ..ParserSettings::default()
    };
    let err = parse_with(&settings, &["animal", "mammal", "dog", "1", "4", "extra"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedTrailingArgument {
            value: "extra".to_string(),
            position: 22,
        }
    );
}

#[test]
fn given_remaining_marker_when_parsing_then_tail_is_parsed_into_pairs() {
    // Act
    let (_, result) = parse(&[
        "animal", "mammal", "dog", "1", "--", "--foo", "x", "--foo=y", "--bar", "plain",
    ])
    .unwrap();

    // Assert
    assert_eq!(
        result.remaining.raw,
        vec!["--foo", "x", "--foo=y", "--bar", "plain"]
    );
    assert_eq!(result.remaining.values("--foo"), ["x", "y"]);
    assert_eq!(result.remaining.values("--bar"), ["plain"]);
    assert!(result.remaining.values("--baz").is_empty());
}

#[test]
fn given_pair_parsing_disabled_when_marker_then_only_raw_is_kept() {
    let settings = ParserSettings {
        parse_remaining_pairs: false,
        ..ParserSettings::default()
    };
    let (_, result) = parse_with(&settings, &["animal", "bird", "--", "--foo", "x"]).unwrap();
    assert_eq!(result.remaining.raw, vec!["--foo", "x"]);
    assert!(result.remaining.parsed.is_empty());
}

fn defaults_model() -> CommandModel {
    let mut builder = CommandModelBuilder::new();
    builder.branch("mammal", |mammal| {
        mammal.command("dog", |dog| {
            dog.option("-n|--name <NAME>", "name");
            dog.option("-g|--good", "good_boy");
        });
        mammal.command("horse", |_| {});
        mammal.default_command("dog");
    });
    builder.command("run", |run| {
        run.option("-c|--count <N>", "count").of_type("int");
    });
    builder.default_command("run");
    builder.build().unwrap()
}

fn parse_defaults(args: &[&str]) -> Result<(CommandModel, ParseResult), ParseError> {
    let model = defaults_model();
    let result = CommandTreeParser::new(&model, &ParserSettings::default()).parse_args(args)?;
    Ok((model, result))
}

#[rstest]
#[case(&["mammal", "--name", "Rufus"], &["mammal", "dog"], ("name", "Rufus"))]
#[case(&["mammal", "-g"], &["mammal", "dog"], ("good_boy", "true"))]
#[case(&["--count", "3"], &["run"], ("count", "3"))]
#[case(&["-c", "3"], &["run"], ("count", "3"))]
fn given_option_of_default_command_first_when_parsing_then_enters_default(
    #[case] args: &[&str],
    #[case] path: &[&str],
    #[case] value: (&str, &str),
) {
    // Act
    let (model, result) = parse_defaults(args).unwrap();

    // Assert
    assert_eq!(result.tree.path(&model), path);
    assert_eq!(captured(&model, &result), pairs(&[value]));
}

#[test]
fn given_option_unknown_to_default_command_when_parsing_then_fails() {
    let err = parse_defaults(&["mammal", "--speed", "3"]).unwrap_err();
    assert!(matches!(err, ParseError::UnknownOption { ref name, position: 7, .. } if name == "--speed"));
}

#[test]
fn given_unknown_short_option_when_parsing_then_offers_no_long_name() {
    // Act
    let err = parse(&["animal", "mammal", "dog", "3", "-q"]).unwrap_err();

    // Assert
    assert_eq!(
        err,
        ParseError::UnknownOption {
            name: "-q".to_string(),
            position: 20,
            suggestion: None,
        }
    );
}

#[test]
fn given_negative_number_after_key_when_parsing_remaining_then_it_is_the_value() {
    let (_, result) = parse(&["animal", "bird", "--", "--offset", "-5", "--x"]).unwrap();

    assert_eq!(result.remaining.values("--offset"), ["-5"]);
    assert_eq!(result.remaining.values("--x"), [""]);
    assert!(result.remaining.values("-5").is_empty());
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
fn given_upper_case_command_when_parsing_then_matches_only_when_case_insensitive(
    #[case] case_sensitive: bool,
    #[case] matches: bool,
) {
    let settings = ParserSettings {
        case_sensitive,
        ..ParserSettings::default()
    };
    let result = parse_with(&settings, &["ANIMAL", "BIRD"]);
    assert_eq!(result.is_ok(), matches);
}

#[test]
fn given_same_model_when_parsing_concurrently_then_results_are_independent() {
    // Arrange
    let model = std::sync::Arc::new(animal_model());
    let settings = std::sync::Arc::new(ParserSettings::default());

    // Act
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let model = model.clone();
            let settings = settings.clone();
            std::thread::spawn(move || {
                let age = i.to_string();
                let result = CommandTreeParser::new(&model, &settings)
                    .parse_args(&["animal", "mammal", "dog", age.as_str()])
                    .unwrap();
                result.tree.leaf().mapped[0].value.clone()
            })
        })
        .collect();

    // Assert
    let ages: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ages, vec!["0", "1", "2", "3"]);
}
