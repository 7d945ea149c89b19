//! Field matching
//!
//! Assigns spans to catalog fields. Fields are processed in catalog order and
//! each span can be claimed by at most one field; the first field to claim a
//! span keeps it. How a single field finds its span is delegated to a
//! [`FieldLocator`], so the keyword heuristic can be swapped out.

pub mod keyword;

use serde::{Deserialize, Serialize};
use shared_types::{FieldMatch, TextSpan};
use tracing::{debug, warn};

use crate::catalog::{CatalogField, FieldCatalog};
use crate::geometry::reading_order;

pub use crate::patterns::KeywordMode;
pub use keyword::KeywordLocator;

/// Where the value for a labelled field comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Text after the keyword in the same span; the next span when there is none
    #[default]
    ResidualThenNext,
    /// Only text after the keyword in the same span
    ResidualOnly,
    /// Always the next span in reading order
    NextOnly,
}

/// Matching knobs passed to every locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    pub keyword_mode: KeywordMode,
    pub value_source: ValueSource,
}

/// Read-only view of the spans plus which of them are already claimed
pub struct SpanView<'a> {
    spans: &'a [TextSpan],
    order: Vec<usize>,
    rank: Vec<usize>,
    claimed: Vec<bool>,
    policy: MatchPolicy,
}

impl<'a> SpanView<'a> {
    pub fn new(spans: &'a [TextSpan], policy: MatchPolicy) -> Self {
        let order = reading_order(spans);
        let mut rank = vec![0; spans.len()];
        for (position, &index) in order.iter().enumerate() {
            rank[index] = position;
        }
        Self {
            spans,
            order,
            rank,
            claimed: vec![false; spans.len()],
            policy,
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, index: usize) -> &'a TextSpan {
        &self.spans[index]
    }

    /// Position of a span in reading order
    pub fn rank(&self, index: usize) -> usize {
        self.rank[index]
    }

    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed[index]
    }

    /// Unclaimed span indices in reading order
    pub fn unclaimed(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied().filter(|&i| !self.claimed[i])
    }

    /// First unclaimed span after `index` in reading order
    pub fn next_unclaimed_after(&self, index: usize) -> Option<usize> {
        self.order[self.rank[index] + 1..]
            .iter()
            .copied()
            .find(|&i| !self.claimed[i])
    }

    fn claim(&mut self, index: usize) {
        self.claimed[index] = true;
    }
}

/// A located value and the spans it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub value: String,
    /// Span carrying the value; confidence is taken from here
    pub value_span: usize,
    /// Span carrying the keyword; equals `value_span` for same-span values
    pub keyword_span: usize,
}

/// Strategy for finding one field among the unclaimed spans
pub trait FieldLocator: Send + Sync {
    fn locate(&self, view: &SpanView, field: &CatalogField) -> Option<Located>;
}

/// Matches for a whole catalog
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    /// One per catalog field, in catalog order
    pub matches: Vec<FieldMatch>,
    /// Per span, the catalog index of the field that claimed it
    pub claims: Vec<Option<usize>>,
}

/// Run `locator` for every catalog field in order, claiming spans as it goes
pub fn match_fields(
    spans: &[TextSpan],
    catalog: &FieldCatalog,
    locator: &dyn FieldLocator,
    policy: MatchPolicy,
) -> MatchReport {
    let mut view = SpanView::new(spans, policy);
    let mut claims = vec![None; spans.len()];
    let mut matches = Vec::with_capacity(catalog.len());

    for (field_index, field) in catalog.iter().enumerate() {
        let located = locator.locate(&view, field).filter(|found| {
            let usable = [found.keyword_span, found.value_span]
                .iter()
                .all(|&i| i < view.len() && !view.is_claimed(i));
            if !usable {
                warn!(
                    "Locator returned a claimed or unknown span for field '{}'",
                    field.name()
                );
            }
            usable
        });

        match located {
            Some(found) => {
                debug!(
                    "Field '{}' matched span {} -> '{}'",
                    field.name(),
                    found.value_span,
                    found.value
                );
                for index in [found.keyword_span, found.value_span] {
                    view.claim(index);
                    claims[index] = Some(field_index);
                }
                matches.push(FieldMatch {
                    field_name: field.name().to_string(),
                    matched_span: Some(spans[found.value_span].clone()),
                    extracted_value: Some(found.value),
                });
            }
            None => {
                debug!("Field '{}' not found", field.name());
                matches.push(FieldMatch::unmatched(field.name()));
            }
        }
    }

    MatchReport { matches, claims }
}
