//! Result emission
//!
//! Read-only projections of a [`Prioritization`] over the amplitude set it was
//! computed from: a ranked view, a markdown report and a JSON report.

use crate::amplitude::{Amplitude, AmplitudeSet};
use crate::error::PrioritizerResult;
use crate::prioritizer::Prioritization;
use serde::Serialize;
use std::fmt::Write as _;

/// One row of the ranked view. `priority` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedTest<'a> {
    pub priority: usize,
    #[serde(flatten)]
    pub amplitude: &'a Amplitude,
}

/// Pair each index of `order` with its amplitude, in order.
pub fn rank<'a>(order: &[usize], amplitudes: &'a AmplitudeSet) -> Vec<RankedTest<'a>> {
    order
        .iter()
        .filter_map(|&idx| amplitudes.get(idx))
        .enumerate()
        .map(|(rank, amplitude)| RankedTest {
            priority: rank + 1,
            amplitude,
        })
        .collect()
}

/// Markdown table of the ranking followed by run statistics.
pub fn render_markdown(result: &Prioritization, amplitudes: &AmplitudeSet) -> String {
    let mut report = String::from("# QI-PSO Test Case Prioritization Results\n\n");
    report.push_str("| Priority | Test Case ID | Magnitude | Phase (rad) | Semantics |\n");
    report.push_str("|---|---|---|---|---|\n");

    for row in result.ranking(amplitudes) {
        let a = row.amplitude;
        let _ = writeln!(
            report,
            "| {} | {} | {} | {} | {} |",
            row.priority,
            escape_cell(&a.id),
            a.magnitude,
            a.phase,
            escape_cell(&a.metadata)
        );
    }

    report.push_str("\n\n**Algorithm Stats:**\n");
    let _ = writeln!(report, "- Population: {}", result.population_size);
    let _ = writeln!(report, "- Iterations: {}", result.iterations);
    let _ = writeln!(report, "- Alpha: {}", result.alpha);
    let _ = writeln!(report, "- Fitness: {:.4}", result.fitness);
    let _ = writeln!(report, "- Input-order fitness: {:.4}", result.baseline_fitness);
    report
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    fitness: f64,
    baseline_fitness: f64,
    iterations: usize,
    population_size: usize,
    alpha: f64,
    ranking: Vec<RankedTest<'a>>,
}

/// Pretty-printed JSON report with the ranking and run statistics.
pub fn render_json(result: &Prioritization, amplitudes: &AmplitudeSet) -> PrioritizerResult<String> {
    let report = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        fitness: result.fitness,
        baseline_fitness: result.baseline_fitness,
        iterations: result.iterations,
        population_size: result.population_size,
        alpha: result.alpha,
        ranking: result.ranking(amplitudes),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (AmplitudeSet, Prioritization) {
        let set = AmplitudeSet::new(vec![
            Amplitude::new("TestA", 0.2, 0.0, "ui_update"),
            Amplitude::new("TestB", 0.9, 1.5, "bugfix|parsing"),
            Amplitude::new("TestC", 0.5, 3.1, "none"),
        ])
        .unwrap();
        let result = Prioritization {
            order: vec![1, 2, 0],
            ids: vec!["TestB".into(), "TestC".into(), "TestA".into()],
            fitness: 1.3,
            baseline_fitness: 0.9,
            history: vec![1.2, 1.3],
            iterations: 2,
            population_size: 20,
            alpha: 0.5,
        };
        (set, result)
    }

    #[test]
    fn test_ranking_follows_order() {
        let (set, result) = fixture();
        let ranking = result.ranking(&set);
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].priority, 1);
        assert_eq!(ranking[0].amplitude.id, "TestB");
        assert_eq!(ranking[2].priority, 3);
        assert_eq!(ranking[2].amplitude.id, "TestA");
    }

    #[test]
    fn test_markdown_report() {
        let (set, result) = fixture();
        let md = render_markdown(&result, &set);
        assert!(md.starts_with("# QI-PSO Test Case Prioritization Results"));
        assert!(md.contains("| 1 | TestB | 0.9 | 1.5 | bugfix\\|parsing |"));
        assert!(md.contains("| 3 | TestA | 0.2 | 0 | ui_update |"));
        assert!(md.contains("- Population: 20"));
        assert!(md.contains("- Iterations: 2"));
    }

    #[test]
    fn test_json_report() {
        let (set, result) = fixture();
        let json = render_json(&result, &set).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fitness"], 1.3);
        assert_eq!(value["ranking"][0]["priority"], 1);
        assert_eq!(value["ranking"][0]["test_id"], "TestB");
        assert_eq!(value["ranking"][1]["original_semantics"], "none");
    }
}
