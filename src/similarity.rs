//! Pairwise string-distance matrices over test inputs and outputs
//!
//! Used to cluster test cases whose inputs (or expected outputs) look alike.
//! Distances are normalized Levenshtein distances in `[0, 1]`.

use crate::error::{PrioritizerError, PrioritizerResult};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub type DistanceMatrix = IndexMap<String, IndexMap<String, f64>>;

/// Test cases keyed by id, in file order.
pub type TestCases = IndexMap<String, Value>;

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (long, short): (Vec<char>, Vec<char>) = if a.chars().count() >= b.chars().count() {
        (a.chars().collect(), b.chars().collect())
    } else {
        (b.chars().collect(), a.chars().collect())
    };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];
    for (i, c1) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, c2) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(c1 != c2);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// Levenshtein distance divided by the longer length; 0.0 for two empty strings.
pub fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    levenshtein(a, b) as f64 / max_len as f64
}

/// Smallest normalized distance over all pairs; 0.0 if either side is empty.
pub fn min_normalized_levenshtein(xs: &[String], ys: &[String]) -> f64 {
    xs.iter()
        .flat_map(|x| ys.iter().map(move |y| normalized_levenshtein(x, y)))
        .fold(None, |min: Option<f64>, d| Some(min.map_or(d, |m| m.min(d))))
        .unwrap_or(0.0)
}

/// Symmetric `id -> id -> distance` map with a zero diagonal.
///
/// Ids absent from `values` compare as an empty list.
pub fn distance_matrix(ids: &[String], values: &IndexMap<String, Vec<String>>) -> DistanceMatrix {
    let lists: Vec<&[String]> = ids
        .iter()
        .map(|id| values.get(id).map(Vec::as_slice).unwrap_or(&[]))
        .collect();

    // upper triangle, one row per id
    let rows: Vec<Vec<f64>> = (0..ids.len())
        .into_par_iter()
        .map(|i| {
            lists[i + 1..]
                .iter()
                .map(|other| min_normalized_levenshtein(lists[i], other))
                .collect()
        })
        .collect();

    let mut matrix: DistanceMatrix = ids
        .iter()
        .map(|id| (id.clone(), IndexMap::with_capacity(ids.len())))
        .collect();

    for (i, row) in rows.into_iter().enumerate() {
        matrix[i].insert(ids[i].clone(), 0.0);
        for (offset, dist) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            matrix[i].insert(ids[j].clone(), dist);
            matrix[j].insert(ids[i].clone(), dist);
        }
    }
    matrix
}

/// String forms of a JSON value: arrays yield one entry per element.
///
/// Scalars are spelled the way the test-case tooling prints them: `null` is
/// `None` and booleans are `True`/`False`. Nested arrays and objects use
/// their JSON text.
pub fn value_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar_string).collect(),
        other => vec![scalar_string(other)],
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Input and (when any test declares one) output distance matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrices {
    pub input: DistanceMatrix,
    pub output: Option<DistanceMatrix>,
}

/// Parse a JSON object `test_id -> { "input": .., "output": .., "script": .. }`.
///
/// An empty object is rejected.
pub fn parse_test_cases(json: &str) -> PrioritizerResult<TestCases> {
    let cases: TestCases = serde_json::from_str(json)?;
    if cases.is_empty() {
        return Err(PrioritizerError::NoTestCases);
    }
    Ok(cases)
}

/// Parse `json` and compute its distance matrices.
pub fn test_case_distances(json: &str) -> PrioritizerResult<DistanceMatrices> {
    Ok(case_distances(&parse_test_cases(json)?))
}

/// Ids whose script is missing from `scripts_dir`.
///
/// A case names its script with `"script"`; otherwise `<id>.py` is expected.
pub fn missing_test_scripts(cases: &TestCases, scripts_dir: &Path) -> Vec<String> {
    cases
        .iter()
        .filter(|(id, case)| {
            let script = match case.get("script").and_then(Value::as_str) {
                Some(name) if !name.is_empty() => scripts_dir.join(name),
                _ => scripts_dir.join(format!("{}.py", id)),
            };
            !script.is_file()
        })
        .map(|(id, _)| id.clone())
        .collect()
}

/// Input and, when any case declares a non-empty output, output matrices.
pub fn case_distances(cases: &TestCases) -> DistanceMatrices {
    let ids: Vec<String> = cases.keys().cloned().collect();

    let inputs: IndexMap<String, Vec<String>> = cases
        .iter()
        .map(|(id, case)| {
            let input = case.get("input").cloned().unwrap_or_else(|| Value::String(String::new()));
            (id.clone(), value_strings(&input))
        })
        .collect();

    let outputs: IndexMap<String, Vec<String>> = cases
        .iter()
        .filter_map(|(id, case)| match case.get("output") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(output) => Some((id.clone(), value_strings(output))),
        })
        .collect();

    info!("Calculating input distance matrix for {} cases", ids.len());
    let input = distance_matrix(&ids, &inputs);

    let output = if outputs.is_empty() {
        info!("No test case declares an output; skipping output distance matrix");
        None
    } else {
        info!("Calculating output distance matrix for {} cases", ids.len());
        Some(distance_matrix(&ids, &outputs))
    };

    DistanceMatrices { input, output }
}
