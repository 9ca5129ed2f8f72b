use super::*;

fn set(pairs: &[(&str, u32)]) -> CitationSet {
    pairs.iter().map(|(d, p)| Citation::new(*d, *p)).collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_perfect_match() {
    let s = score(&set(&[("d", 1)]), &set(&[("d", 1)]));
    assert_eq!(s.precision, 1.0);
    assert_eq!(s.recall, 1.0);
    assert_eq!(s.f1, 1.0);
}

#[test]
fn test_partial_recall() {
    let s = score(&set(&[("d", 1), ("d", 2)]), &set(&[("d", 1)]));
    assert_eq!(s.precision, 1.0);
    assert_eq!(s.recall, 0.5);
    assert!(approx(s.f1, 0.667));
}

#[test]
fn test_empty_sides_score_zero() {
    let s = score(&set(&[("d", 1)]), &CitationSet::new());
    assert_eq!((s.precision, s.recall, s.f1), (0.0, 0.0, 0.0));

    let s = score(&CitationSet::new(), &set(&[("d", 1)]));
    assert_eq!((s.precision, s.recall, s.f1), (0.0, 0.0, 0.0));
}

#[test]
fn test_aggregate_excludes_both_empty() {
    let examples = vec![
        EvalExample::new(set(&[("d", 1)]), set(&[("d", 1)])),
        EvalExample::new(CitationSet::new(), CitationSet::new()),
    ];

    let metrics = aggregate(&examples);
    assert_eq!(metrics.examples_scored, 1);
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.f1, 1.0);
}

#[test]
fn test_aggregate_is_macro_average() {
    // Micro-averaging would give recall 2/5; macro gives (1/1 + 1/4) / 2.
    let examples = vec![
        EvalExample::new(set(&[("a", 1)]), set(&[("a", 1)])),
        EvalExample::new(
            set(&[("b", 1), ("b", 2), ("b", 3), ("b", 4)]),
            set(&[("b", 1)]),
        ),
    ];

    let metrics = aggregate(&examples);
    assert_eq!(metrics.examples_scored, 2);
    assert_eq!(metrics.precision, 1.0);
    assert!(approx(metrics.recall, 0.625));
    assert!(approx(metrics.f1, f1_score(1.0, 0.625)));
}

#[test]
fn test_aggregate_counts_empty_expected_with_returned() {
    let examples = vec![EvalExample::new(CitationSet::new(), set(&[("x", 3)]))];
    let metrics = aggregate(&examples);
    assert_eq!(metrics.examples_scored, 1);
    assert_eq!(metrics.f1, 0.0);
}

#[test]
fn test_aggregate_nothing_scored_is_zero() {
    let metrics = aggregate(&Vec::<EvalExample>::new());
    assert_eq!(metrics, CitationMetrics::default());
}

#[test]
fn test_parse_citations() {
    let parsed = CitationSet::parse(" doc-a:3, doc:b:12 ,,doc-a:3").unwrap();
    assert_eq!(parsed.len(), 2);
    assert!(parsed.contains(&Citation::new("doc-a", 3)));
    assert!(parsed.contains(&Citation::new("doc:b", 12)));

    assert!(CitationSet::parse("").unwrap().is_empty());
}

#[test]
fn test_parse_citation_errors() {
    assert!("no-page".parse::<Citation>().is_err());
    assert!(":4".parse::<Citation>().is_err());
    assert!("doc:four".parse::<Citation>().is_err());
    assert!(CitationSet::parse("doc:1,bad").is_err());
}

#[test]
fn test_citation_display_round_trip() {
    let c = Citation::new("doc-7", 9);
    assert_eq!(c.to_string(), "doc-7:9");
    assert_eq!(c.to_string().parse::<Citation>().unwrap(), c);
}

#[test]
fn test_from_returned_skips_incomplete() {
    let returned = CitationSet::from_returned(vec![("d", 1), ("", 2), ("d", 0), ("d", 1)]);
    assert_eq!(returned.len(), 1);
}

#[test]
fn test_rerank_distribution_no_scores() {
    let batches: Vec<Vec<Option<f32>>> = vec![vec![None, None], vec![]];
    assert_eq!(
        rerank_score_distribution(batches),
        RerankScoreDistribution::NoScores
    );
}

#[test]
fn test_rerank_distribution_stats() {
    let batches: Vec<Vec<Option<f32>>> = vec![
        vec![Some(0.5), None, Some(0.1)],
        vec![Some(0.9), Some(0.3)],
    ];

    let dist = rerank_score_distribution(batches);
    let stats = dist.stats().expect("scores present");

    // sorted: 0.1, 0.3, 0.5, 0.9
    assert_eq!(stats.count, 4);
    assert!(approx(stats.mean, 0.45));
    assert!(approx(stats.min, 0.1));
    assert!(approx(stats.max, 0.9));
    assert!(approx(stats.median, 0.5));
    assert!(approx(stats.q1, 0.3));
    assert!(approx(stats.q3, 0.9));
}

#[test]
fn test_distribution_serializes_with_status() {
    let value = serde_json::to_value(RerankScoreDistribution::NoScores).unwrap();
    assert_eq!(value, serde_json::json!({"status": "no_scores"}));
}

#[test]
fn test_compare_metrics() {
    let baseline = CitationMetrics {
        precision: 0.5,
        recall: 0.0,
        f1: 0.4,
        examples_scored: 10,
    };
    let candidate = CitationMetrics {
        precision: 0.6,
        recall: 0.2,
        f1: 0.4,
        examples_scored: 10,
    };

    let deltas = compare_metrics(&baseline, &candidate);
    assert_eq!(deltas.len(), 3);

    assert_eq!(deltas[0].metric, "citation_precision");
    assert!(approx(deltas[0].absolute_diff, 0.1));
    assert!(approx(deltas[0].relative_improvement_pct, 20.0));
    assert!(deltas[0].better);

    assert!(deltas[1].relative_improvement_pct.is_infinite());
    assert!(deltas[1].better);

    assert_eq!(deltas[2].relative_improvement_pct, 0.0);
    assert!(!deltas[2].better);
}

#[test]
fn test_metric_delta_zero_baseline_no_change() {
    let delta = metric_delta("m", 0.0, 0.0);
    assert_eq!(delta.relative_improvement_pct, 0.0);
    assert!(!delta.better);
}
