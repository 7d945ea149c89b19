//! Keyword-proximity locator
//!
//! A span matches a field when its text contains one of the field's keywords.
//! The value is whatever follows the keyword in the same span, or the next
//! unclaimed span in reading order, depending on the [`ValueSource`].

use crate::catalog::CatalogField;
use crate::extractors::value::{clean_value, narrow_to_pattern, residual_after};
use crate::patterns::find_keyword;

use super::{FieldLocator, Located, SpanView, ValueSource};

/// Default locator: keyword hit plus residual or next-span value
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordLocator;

impl KeywordLocator {
    pub fn new() -> Self {
        Self
    }

    /// Candidate for one keyword-bearing span, if it yields a value
    fn candidate(&self, view: &SpanView, field: &CatalogField, index: usize) -> Option<Located> {
        let policy = view.policy();
        let text = &view.span(index).text;
        let hit = find_keyword(text, field.keywords(), policy.keyword_mode)?;

        let residual = match policy.value_source {
            ValueSource::NextOnly => None,
            _ => residual_after(text, hit.end),
        };

        let (raw, value_span) = match (residual, policy.value_source) {
            (Some(residual), _) => (residual, index),
            (None, ValueSource::ResidualOnly) => return None,
            (None, _) => {
                let next = view.next_unclaimed_after(index)?;
                (clean_value(&view.span(next).text)?, next)
            }
        };

        let value = match field.pattern() {
            Some(pattern) => narrow_to_pattern(&raw, pattern)?,
            None => raw,
        };

        Some(Located {
            value,
            value_span,
            keyword_span: index,
        })
    }
}

impl FieldLocator for KeywordLocator {
    fn locate(&self, view: &SpanView, field: &CatalogField) -> Option<Located> {
        let mut best: Option<Located> = None;

        // Reading order, so on equal confidence the earliest candidate stays
        for index in view.unclaimed() {
            let Some(candidate) = self.candidate(view, field, index) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    view.span(candidate.value_span).confidence
                        > view.span(current.value_span).confidence
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        best
    }
}
