//! "Did you mean" lookup for mistyped command and option names.
//!
//! Purely cosmetic: results only enrich error messages and never influence
//! which command is selected.

use tracing::{instrument, trace};

use crate::domain::{CommandModel, NodeId};

/// Edit distance with unit cost for insertion, deletion and substitution.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        current[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// First candidate with the smallest distance, if within `max_distance`.
fn closest<'a, I>(candidates: I, attempted: &str, max_distance: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let attempted = attempted.to_lowercase();
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let distance = levenshtein_distance(&candidate.to_lowercase(), &attempted);
        trace!("candidate '{}' at distance {}", candidate, distance);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.filter(|(_, d)| *d <= max_distance).map(|(c, _)| c)
}

/// Closest declared child of `node` to `attempted`.
///
/// Leaves and default commands have no children worth suggesting, so the
/// search moves to the model root for them, as it does when `node` is None.
#[instrument(level = "debug", skip(model))]
pub fn suggest(
    model: &CommandModel,
    node: Option<NodeId>,
    attempted: &str,
    max_distance: usize,
) -> Option<NodeId> {
    let scope = match node {
        Some(idx) if !is_leaf_or_default(model, idx) => idx,
        _ => model.root(),
    };

    let children = &model.node(scope).children;
    let name = closest(
        children.iter().map(|&child| model.node(child).name.as_str()),
        attempted,
        max_distance,
    )?;
    children
        .iter()
        .copied()
        .find(|&child| model.node(child).name == name)
}

/// Closest long option name visible from `node` (its own and inherited).
#[instrument(level = "debug", skip(model))]
pub fn suggest_option(
    model: &CommandModel,
    node: NodeId,
    attempted: &str,
    max_distance: usize,
) -> Option<String> {
    let names = model
        .ancestors(node)
        .flat_map(|idx| model.node(idx).options())
        .filter_map(|(_, p)| p.long_name());
    closest(names, attempted, max_distance).map(str::to_string)
}

fn is_leaf_or_default(model: &CommandModel, idx: NodeId) -> bool {
    let node = model.node(idx);
    node.is_leaf
        || node
            .parent
            .map_or(false, |parent| model.node(parent).default_child == Some(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandModelBuilder;
    use rstest::rstest;

    #[rstest]
    #[case("", "abc", 3)]
    #[case("mammal", "mammal", 0)]
    #[case("mamal", "mammal", 1)]
    #[case("kitten", "sitting", 3)]
    #[case("flaw", "lawn", 2)]
    fn test_levenshtein_distance(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(levenshtein_distance(a, b), expected);
    }

    fn model() -> CommandModel {
        let mut builder = CommandModelBuilder::new();
        builder.branch("animal", |animal| {
            animal.option("-a|--alive", "is_alive");
            animal.branch("mammal", |mammal| {
                mammal.command("dog", |_| {});
                mammal.command("horse", |_| {});
            });
            animal.command("bird", |_| {});
        });
        builder.build().unwrap()
    }

    #[test]
    fn test_suggest_child_within_distance() {
        let model = model();
        let animal = model.lookup(&["animal"]).unwrap();

        let found = suggest(&model, Some(animal), "mamal", 2);

        assert_eq!(found, model.lookup(&["animal", "mammal"]));
    }

    #[test]
    fn test_suggest_nothing_beyond_distance() {
        let model = model();
        let animal = model.lookup(&["animal"]).unwrap();
        assert_eq!(suggest(&model, Some(animal), "reptile", 2), None);
    }

    #[test]
    fn test_suggest_from_leaf_searches_root() {
        let model = model();
        let dog = model.lookup(&["animal", "mammal", "dog"]).unwrap();

        let found = suggest(&model, Some(dog), "animl", 2);

        assert_eq!(found, model.lookup(&["animal"]));
    }

    #[test]
    fn test_suggest_is_case_insensitive() {
        let model = model();
        let mammal = model.lookup(&["animal", "mammal"]).unwrap();
        assert_eq!(
            suggest(&model, Some(mammal), "DOG", 0),
            model.lookup(&["animal", "mammal", "dog"])
        );
    }

    #[test]
    fn test_suggest_option_includes_inherited() {
        let model = model();
        let dog = model.lookup(&["animal", "mammal", "dog"]).unwrap();
        assert_eq!(suggest_option(&model, dog, "alvie", 2), Some("alive".to_string()));
    }
}
