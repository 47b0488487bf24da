use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::io::{self, BufRead, Write};

use crate::models::{Task, TaskId};
use crate::state::TaskCollection;

#[derive(Debug, PartialEq)]
pub enum Resolution<'a> {
    Exact(&'a Task),
    Suggested { task: &'a Task, score: i64 },
    Missing,
}

/// Matches a reference against ids first, then names, then fuzzily.
pub fn resolve<'a>(collection: &'a TaskCollection, reference: &str) -> Resolution<'a> {
    let reference = reference.trim();
    if let Some(task) = collection.get(&TaskId::new(reference)) {
        return Resolution::Exact(task);
    }
    if let Some(task) = collection.iter().find(|task| task.name == reference) {
        return Resolution::Exact(task);
    }
    if let Some(task) = collection
        .iter()
        .find(|task| task.name.eq_ignore_ascii_case(reference))
    {
        return Resolution::Exact(task);
    }

    let matcher = SkimMatcherV2::default();
    let mut best: Option<(i64, &Task)> = None;
    for task in collection.iter() {
        if let Some(score) = matcher.fuzzy_match(&task.name, reference) {
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, task));
            }
        }
    }

    match best {
        Some((score, task)) => Resolution::Suggested { task, score },
        None => Resolution::Missing,
    }
}

/// Asks on the terminal whether a suggested task is the one meant.
pub fn ask_user_confirmation(reference: &str, suggestion: &Task) -> io::Result<bool> {
    print!(
        "'{}' not found. Did you mean '{}' ({})? (y/n): ",
        reference, suggestion.name, suggestion.id
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
