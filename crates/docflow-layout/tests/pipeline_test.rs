use docflow_layout::request::SectionLayout;
use docflow_layout::text::HeuristicTextMeasurer;
use docflow_layout::{Error, LayoutOptions, layout_document_json};
use std::path::PathBuf;
use std::sync::Arc;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root().join("fixtures").join("requests").join(name);
    std::fs::read_to_string(&path).expect("fixture")
}

#[test]
fn avatar_strip_packs_and_centers_rows() {
    let doc = layout_document_json(&fixture("avatars.json"), &LayoutOptions::default())
        .expect("layout ok");
    let SectionLayout::Flow { block } = &doc.sections[0] else {
        panic!("expected a flow section");
    };

    let counts: Vec<usize> = block.rows.iter().map(|r| r.items.len()).collect();
    assert_eq!(counts, vec![5, 4]);
    assert_eq!(block.width, 192.0);
    assert_eq!(block.rows[1].x, 20.0);
    assert_eq!(block.height, 72.0);

    let order: Vec<usize> = block.items().map(|p| p.index).collect();
    assert_eq!(order, (0..9).collect::<Vec<_>>());

    assert_eq!(doc.canvas.width, 232.0);
    assert_eq!(doc.canvas.height, 112.0);
}

#[test]
fn honeycomb_fixture_scales_only_the_physical_size() {
    let doc = layout_document_json(&fixture("honeycomb.json"), &LayoutOptions::default())
        .expect("layout ok");
    let SectionLayout::Grid { positions, .. } = &doc.sections[0] else {
        panic!("expected a grid section");
    };
    let row0: Vec<f64> = positions.iter().filter(|p| p.row == 0).map(|p| p.x).collect();
    let row1: Vec<f64> = positions.iter().filter(|p| p.row == 1).map(|p| p.x).collect();
    assert_eq!(row0, vec![0.0, 100.0, 200.0]);
    assert_eq!(row1, vec![50.0, 150.0]);

    assert_eq!(doc.canvas.view_box.to_string(), "0 0 300 160");
    assert_eq!((doc.canvas.width, doc.canvas.height), (150.0, 80.0));
}

#[test]
fn adr_card_keeps_links_whole_and_respects_budgets() {
    let doc = layout_document_json(&fixture("adr_card.json"), &LayoutOptions::default())
        .expect("layout ok");
    assert_eq!(doc.sections.len(), 3);
    assert!(doc.canvas.width >= 600.0);

    let SectionLayout::Text { lines, .. } = &doc.sections[1] else {
        panic!("expected a text section");
    };
    assert!(lines.len() > 1);
    let link_lines: Vec<_> = lines
        .iter()
        .filter(|l| l.text.contains("[[https://adr.example/7"))
        .collect();
    assert_eq!(link_lines.len(), 1);
    assert!(link_lines[0].text.contains("[[https://adr.example/7 the original discussion]]"));
    for line in lines {
        if line.tokens.len() > 1 {
            assert!(line.width <= 320.0, "{:?} is {} wide", line.text, line.width);
        }
    }

    let SectionLayout::Flow { block } = &doc.sections[2] else {
        panic!("expected a flow section");
    };
    assert_eq!(block.item_count(), 4);
    for row in &block.rows {
        if row.items.len() > 1 {
            assert!(row.width <= 300.0);
        }
        let offset = (block.width - row.width) / 2.0;
        assert!((row.x - offset).abs() < 1e-9);
    }

    // Blocks are stacked top to bottom inside the padding.
    let ys: Vec<f64> = doc.canvas.placements.iter().map(|p| p.y).collect();
    assert_eq!(ys[0], 24.0);
    assert!(ys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn invalid_width_is_reported_not_coerced() {
    let err = layout_document_json(&fixture("invalid_width.json"), &LayoutOptions::default())
        .unwrap_err();
    assert!(
        matches!(err, Error::InvalidConfiguration { field: "text.maxWidth", .. }),
        "{err:?}"
    );
}

#[test]
fn oversized_grid_count_is_rejected_up_front() {
    let input = r#"{
        "sections": [
            { "type": "grid", "count": 18446744073709551615, "columns": 3, "cellWidth": 10, "cellHeight": 10 }
        ]
    }"#;
    let err = layout_document_json(input, &LayoutOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }), "{err:?}");
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = layout_document_json("{ \"sections\": [", &LayoutOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn layout_is_deterministic_across_measurers() {
    let input = fixture("adr_card.json");
    let heuristic = LayoutOptions::with_measurer(Arc::new(HeuristicTextMeasurer::default()));
    for options in [LayoutOptions::default(), heuristic] {
        let a = layout_document_json(&input, &options).expect("layout ok");
        let b = layout_document_json(&input, &options).expect("layout ok");
        assert_eq!(a, b);
        let json_a = serde_json::to_string(&a).expect("serialize");
        let json_b = serde_json::to_string(&b).expect("serialize");
        assert_eq!(json_a, json_b);
    }
}

#[test]
fn pipelines_run_in_parallel_without_coordination() {
    let inputs = [
        fixture("adr_card.json"),
        fixture("avatars.json"),
        fixture("honeycomb.json"),
    ];
    let options = LayoutOptions::default();
    let expected: Vec<_> = inputs
        .iter()
        .map(|i| layout_document_json(i, &options).expect("layout ok"))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let input = &inputs[t % inputs.len()];
                let options = options.clone();
                scope.spawn(move || layout_document_json(input, &options).expect("layout ok"))
            })
            .collect();
        for (t, handle) in handles.into_iter().enumerate() {
            let doc = handle.join().expect("thread");
            assert_eq!(doc, expected[t % inputs.len()]);
        }
    });
}
