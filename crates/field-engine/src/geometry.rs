//! Span ordering by position on the page

use serde::{Deserialize, Serialize};
use shared_types::TextSpan;

/// How to order spans for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanOrder {
    /// Order the engine emitted them
    #[default]
    Emitted,
    /// Top-to-bottom, then left-to-right
    TopToBottom,
    /// Left-to-right, then top-to-bottom
    LeftToRight,
    /// Highest confidence first
    Confidence,
}

/// Indices of `spans` in reading order: top-to-bottom, then left-to-right,
/// keyed on each bbox's top-left corner. Ties keep input order.
pub fn reading_order(spans: &[TextSpan]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&i| {
        let (x, y) = spans[i].bbox.top_left();
        (y, x, i)
    });
    order
}

/// Return a reordered copy of `spans`
pub fn sort_spans(spans: &[TextSpan], order: SpanOrder) -> Vec<TextSpan> {
    let mut indices: Vec<usize> = (0..spans.len()).collect();
    match order {
        SpanOrder::Emitted => {}
        SpanOrder::TopToBottom => indices = reading_order(spans),
        SpanOrder::LeftToRight => indices.sort_by_key(|&i| {
            let (x, y) = spans[i].bbox.top_left();
            (x, y, i)
        }),
        SpanOrder::Confidence => indices.sort_by(|&a, &b| {
            spans[b]
                .confidence
                .total_cmp(&spans[a].confidence)
                .then(a.cmp(&b))
        }),
    }
    indices.into_iter().map(|i| spans[i].clone()).collect()
}
