use super::*;
use crate::document::{NormalizedPage, TableGrid};
use crate::lang::Language;

fn page(number: u32, text: &str, tables: Vec<TableGrid>) -> NormalizedPage {
    NormalizedPage {
        page_number: number,
        language: Language::English,
        text: text.to_string(),
        lines: Vec::new(),
        tables,
    }
}

fn grid(rows: &[&[&str]]) -> TableGrid {
    let cells = rows.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .map(move |(c, text)| (((r + 1) as u32, (c + 1) as u32), text.to_string()))
    });
    TableGrid::from_cells(cells).expect("non-empty grid")
}

fn chunker(max: usize, overlap: usize) -> Chunker {
    Chunker::new(ChunkerConfig::new(max, overlap)).expect("valid config")
}

#[test]
fn test_rejects_zero_max_length() {
    let err = Chunker::new(ChunkerConfig::new(0, 0)).unwrap_err();
    assert!(matches!(err, ChunkingError::InvalidConfig { .. }));
}

#[test]
fn test_rejects_overlap_not_below_max() {
    assert!(Chunker::new(ChunkerConfig::new(10, 10)).is_err());
    assert!(Chunker::new(ChunkerConfig::new(10, 11)).is_err());
    assert!(Chunker::new(ChunkerConfig::new(10, 9)).is_ok());
}

#[test]
fn test_default_config_is_valid() {
    let config = ChunkerConfig::default();
    assert_eq!(config.max_segment_length, 1200);
    assert_eq!(config.overlap_length, 200);
    assert!(config.validate().is_ok());
}

#[test]
fn test_split_paragraphs_on_blank_lines() {
    let paragraphs = split_paragraphs("  alpha\nbeta \n\n\n gamma\n \t \ndelta\n");
    assert_eq!(paragraphs, vec!["alpha\nbeta", "gamma", "delta"]);

    assert!(split_paragraphs("").is_empty());
    assert!(split_paragraphs("\n \n\n").is_empty());
}

#[test]
fn test_pack_paragraphs_greedily() {
    let paragraphs = vec!["aaaa".to_string(), "bbbb".to_string(), "cccc".to_string()];

    // 4 + 1 + 4 = 9 fits, adding 1 + 4 more would reach 14.
    let units = pack_paragraphs(paragraphs, 10);

    assert_eq!(units, vec!["aaaa\nbbbb", "cccc"]);
}

#[test]
fn test_pack_keeps_oversized_paragraph_whole() {
    let units = pack_paragraphs(vec!["x".repeat(25), "y".to_string()], 10);
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].len(), 25);
    assert_eq!(units[1], "y");
}

#[test]
fn test_sliding_window_overlap_is_exact() {
    let unit: String = (0..95).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let windows = sliding_window(&unit, 30, 10);

    assert!(windows.iter().all(|w| w.chars().count() <= 30));
    for pair in windows.windows(2) {
        let prev: Vec<char> = pair[0].chars().collect();
        let next: Vec<char> = pair[1].chars().collect();
        assert_eq!(prev.len(), 30, "only the final window may be shorter");
        assert_eq!(&prev[prev.len() - 10..], &next[..10]);
    }

    // Starts: 0, 20, 40, 60, 80; the last window holds the final 15 chars.
    assert_eq!(windows.len(), 5);
    assert_eq!(windows[4].chars().count(), 15);
    assert!(unit.ends_with(windows.last().expect("last window").as_str()));
}

#[test]
fn test_sliding_window_short_unit_untouched() {
    assert_eq!(sliding_window("short", 30, 10), vec!["short"]);
}

#[test]
fn test_sliding_window_counts_chars_not_bytes() {
    let unit = "é".repeat(25);
    let windows = sliding_window(&unit, 10, 2);
    assert!(windows.iter().all(|w| w.chars().count() <= 10));
    assert_eq!(windows[0].chars().count(), 10);
}

#[test]
fn test_flatten_table_skips_blank_rows() {
    let table = grid(&[&["Name", " Amount "], &["", "  "], &["Roads", "12"]]);
    assert_eq!(flatten_table(&table), "- Name | Amount\n- Roads | 12");
}

#[test]
fn test_every_segment_within_limit() {
    let long_paragraph = "word ".repeat(60);
    let text = format!("Intro line.\n\n{long_paragraph}\n\nShort closing paragraph.");
    let table = grid(&[&["k".repeat(40).as_str(), "v".repeat(40).as_str()]]);

    let segments = chunker(50, 10).chunk_page("doc", &page(1, &text, vec![table]));

    assert!(!segments.is_empty());
    for segment in &segments {
        assert!(
            segment.text.chars().count() <= 50,
            "segment {} has {} chars",
            segment.id,
            segment.text.chars().count()
        );
    }
}

#[test]
fn test_segment_ids_are_deterministic() {
    let text = "First paragraph.\n\nSecond paragraph that is a little longer than the first one.";
    let table = grid(&[&["a", "b"], &["c", "d"]]);
    let page = page(4, text, vec![table]);
    let chunker = chunker(40, 5);

    let first: Vec<String> = chunker.chunk_page("doc-x", &page).into_iter().map(|s| s.id).collect();
    let second: Vec<String> = chunker.chunk_page("doc-x", &page).into_iter().map(|s| s.id).collect();

    assert_eq!(first, second);
    assert_eq!(first[0], "doc-x-p4-seg0");
    assert!(first.iter().any(|id| id == "doc-x-p4-table0-seg0"));
}

#[test]
fn test_segments_carry_page_metadata() {
    let mut page = page(2, "Bonjour tout le monde.", Vec::new());
    page.language = Language::French;

    let segments = chunker(100, 10).chunk_page("rapport", &page);

    assert_eq!(segments.len(), 1);
    let segment = &segments[0];
    assert_eq!(segment.id, "rapport-p2-seg0");
    assert_eq!(segment.doc_id, "rapport");
    assert_eq!(segment.page, 2);
    assert_eq!(segment.language, Language::French);
    assert_eq!(segment.source_kind, SourceKind::Text);
}

#[test]
fn test_table_ordinal_counts_skipped_tables() {
    let blank = grid(&[&["", " "]]);
    let filled = grid(&[&["x", "y"]]);

    let segments = chunker(100, 10).chunk_page("d", &page(1, "", vec![blank, filled]));

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].id, "d-p1-table1-seg0");
    assert_eq!(segments[0].text, "- x | y");
    assert_eq!(segments[0].source_kind, SourceKind::Table);
}

#[test]
fn test_oversized_table_is_windowed_without_packing() {
    let rows: Vec<Vec<String>> = (0..6)
        .map(|i| vec![format!("row{i}"), "value".to_string()])
        .collect();
    let row_refs: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();
    let table = grid(&slices);

    let segments = chunker(30, 5).chunk_page("d", &page(1, "", vec![table]));

    assert!(segments.len() > 1);
    for (i, segment) in segments.iter().enumerate() {
        assert_eq!(segment.id, format!("d-p1-table0-seg{i}"));
        assert!(segment.text.chars().count() <= 30);
    }
}

#[test]
fn test_segment_serialized_shape() {
    let segment = Segment {
        id: "d-p1-seg0".to_string(),
        text: "hello".to_string(),
        doc_id: "d".to_string(),
        page: 1,
        language: Language::French,
        source_kind: SourceKind::Table,
    };

    let value = serde_json::to_value(&segment).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({
            "id": "d-p1-seg0",
            "text": "hello",
            "doc_id": "d",
            "page": 1,
            "language": "fr",
            "source_kind": "table"
        })
    );
}

#[test]
fn test_source_kind_parse() {
    assert_eq!(SourceKind::parse("text"), Some(SourceKind::Text));
    assert_eq!(SourceKind::parse("table"), Some(SourceKind::Table));
    assert_eq!(SourceKind::parse("figure"), None);
    assert_eq!(SourceKind::Table.as_str(), "table");
}
