//! End-to-end properties of the capture → cache → render pipeline.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use vela_error::{
    ErrorCode, ResolvedFrame, ResolvedStack, Tracer, VelaError, Unwrapped, capture, coded,
    with_recovery, wrap,
};

#[test]
fn capture_respects_depth_bounds() {
    for skip in 0..4 {
        for depth in [1, 2, 8, 32] {
            let fp = capture(skip, depth);
            assert!(
                fp.len() <= depth,
                "capture(skip={skip}, depth={depth}) gave {} frames",
                fp.len()
            );
        }
    }
}

#[test]
fn concurrent_resolution_is_idempotent() {
    let tracer = Arc::new(Tracer::default());
    let fp = capture(0, 8);

    let renders: Vec<String> = (0..8)
        .map(|_| {
            let tracer = Arc::clone(&tracer);
            let fp = fp.clone();
            std::thread::spawn(move || {
                let stack = tracer.resolve(&fp);
                VelaError::from_resolved(ErrorCode::new(1), "m", stack).render_text()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|t| t.join().unwrap())
        .collect();

    for render in &renders[1..] {
        assert_eq!(render, &renders[0], "renders must be byte-identical");
    }
    if !fp.is_empty() {
        assert_eq!(tracer.cache().len(), 1, "all threads share one entry");
    }
}

#[test]
fn structured_form_round_trips() {
    let err = VelaError::new(ErrorCode::new(5), "x");
    let value: serde_json::Value = serde_json::from_str(&err.to_json()).unwrap();
    assert_eq!(value["code"], 5);
    assert_eq!(value["msg"], "x");
}

#[test]
fn identity_ignores_messages_and_sentinels() {
    assert!(coded!(100, "a").is(&coded!(100, "b")));
    let g1 = VelaError::generic("a");
    let g2 = VelaError::generic("a");
    assert!(!g1.is(&g2), "sentinel code never self-matches");
}

#[test]
fn chain_renders_root_then_labels_in_attach_order() {
    let chain = wrap(wrap(VelaError::new(ErrorCode::new(0), "root"), "mid"), "outer");
    let text = chain.render_text();
    let root_at = text.find("root").unwrap();
    let mid_at = text.find("mid").unwrap();
    let outer_at = text.find("outer").unwrap();
    assert!(root_at < mid_at && mid_at < outer_at);

    let Unwrapped::Chain(peeled) = chain.unwrap_one() else {
        panic!("mid should remain");
    };
    assert_eq!(peeled.crumbs().last().unwrap().label(), "mid");
}

#[test]
fn nested_boundaries_keep_outer_registration() {
    vela_error::install_panic_filter();
    let registry = vela_error::BoundaryRegistry::global();

    let outer = with_recovery(|| {
        let inner = with_recovery(|| {
            vela_error::must(false);
        });
        assert!(inner.is_err(), "inner boundary catches the raise");
        assert!(
            registry.is_registered(),
            "outer boundary still registered after inner exit"
        );
    });
    assert!(outer.is_ok());
    assert!(!registry.is_registered(), "outer exit clears the entry");
}

#[test]
fn literal_scenario_renders_both_forms() {
    let stack = Arc::new(ResolvedStack::from_frames(vec![ResolvedFrame::new(
        "file.go", 10, "f",
    )]));
    let err = VelaError::from_resolved(ErrorCode::new(42), "boom", stack);

    assert_eq!(err.render_text(), "42, boom;\n    (file.go:10) f;");
    assert_eq!(
        err.to_json(),
        r#"{"code":42,"msg":"boom","stack":["(file.go:10) f"]}"#
    );
}

#[test]
fn warm_call_site_reuses_the_resolved_stack() {
    fn here() -> VelaError {
        VelaError::new(ErrorCode::new(3), "warm")
    }
    // One textual call site, exercised twice, so both captures walk the same
    // return addresses.
    let errors: Vec<VelaError> = (0..2).map(|_| here()).collect();
    if !errors[0].stack().is_empty() {
        assert!(
            std::ptr::eq(errors[0].stack(), errors[1].stack()),
            "same call site must share one resolved stack"
        );
    }
}
