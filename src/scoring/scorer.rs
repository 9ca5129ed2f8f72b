use tracing::debug;

use super::types::{
    CitationMetrics, CitationScore, CitationSet, EvalExample, MetricDelta, RerankScoreDistribution,
    RerankScoreStats,
};

/// Harmonic mean; 0 when both rates are 0.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Set-based precision, recall and F1 for one example.
pub fn score(expected: &CitationSet, returned: &CitationSet) -> CitationScore {
    let hits = expected.intersection_len(returned) as f64;

    let precision = if returned.is_empty() {
        0.0
    } else {
        hits / returned.len() as f64
    };
    let recall = if expected.is_empty() {
        0.0
    } else {
        hits / expected.len() as f64
    };

    CitationScore {
        precision,
        recall,
        f1: f1_score(precision, recall),
    }
}

/// Macro average over examples. Examples with both sets empty are excluded;
/// F1 is computed from the averaged precision and recall.
pub fn aggregate<'a, I>(examples: I) -> CitationMetrics
where
    I: IntoIterator<Item = &'a EvalExample>,
{
    let mut total_precision = 0.0;
    let mut total_recall = 0.0;
    let mut scored = 0usize;
    let mut skipped = 0usize;

    for example in examples {
        if example.expected.is_empty() && example.returned.is_empty() {
            skipped += 1;
            continue;
        }
        let s = score(&example.expected, &example.returned);
        total_precision += s.precision;
        total_recall += s.recall;
        scored += 1;
    }

    debug!(scored = scored, skipped = skipped, "Aggregated citation metrics");

    if scored == 0 {
        return CitationMetrics::default();
    }

    let precision = total_precision / scored as f64;
    let recall = total_recall / scored as f64;
    CitationMetrics {
        precision,
        recall,
        f1: f1_score(precision, recall),
        examples_scored: scored,
    }
}

/// Statistics over every present score across all batches. Quartiles use the
/// lower index (`sorted[n/4]`, `sorted[n/2]`, `sorted[3n/4]`), no interpolation.
pub fn rerank_score_distribution<I, B>(batches: I) -> RerankScoreDistribution
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = Option<f32>>,
{
    let mut scores: Vec<f64> = batches
        .into_iter()
        .flatten()
        .flatten()
        .map(f64::from)
        .filter(|s| !s.is_nan())
        .collect();

    if scores.is_empty() {
        return RerankScoreDistribution::NoScores;
    }

    scores.sort_by(|a, b| a.total_cmp(b));
    let n = scores.len();

    RerankScoreDistribution::Scores(RerankScoreStats {
        count: n,
        mean: scores.iter().sum::<f64>() / n as f64,
        min: scores[0],
        max: scores[n - 1],
        median: scores[n / 2],
        q1: scores[n / 4],
        q3: scores[3 * n / 4],
    })
}

/// Compares two runs metric by metric.
pub fn compare_metrics(
    baseline: &CitationMetrics,
    candidate: &CitationMetrics,
) -> Vec<MetricDelta> {
    baseline
        .named()
        .into_iter()
        .zip(candidate.named())
        .map(|((metric, base), (_, cand))| metric_delta(metric, base, cand))
        .collect()
}

pub fn metric_delta(metric: &str, baseline: f64, candidate: f64) -> MetricDelta {
    let absolute_diff = candidate - baseline;
    let relative_improvement_pct = if baseline != 0.0 {
        absolute_diff / baseline * 100.0
    } else if absolute_diff > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    MetricDelta {
        metric: metric.to_string(),
        baseline,
        candidate,
        absolute_diff,
        relative_improvement_pct,
        better: absolute_diff > 0.0,
    }
}
