use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::info;

use crate::data::MergedCollection;
use crate::types::SourceTag;

/// Allowed `source` tags, or no constraint at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceFilter {
    allowed: BTreeSet<SourceTag>,
}

impl SourceFilter {
    /// A filter that keeps everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// A filter that keeps only the given tags. An empty set keeps everything.
    pub fn only<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceTag>,
    {
        Self {
            allowed: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this filter keeps everything.
    pub fn is_unconstrained(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether a record with `source` passes. Records without a source only
    /// pass an unconstrained filter.
    pub fn allows(&self, source: Option<&str>) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        source.is_some_and(|tag| self.allowed.contains(tag))
    }

    /// Allowed tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

/// Restrict `collection` to records whose `source` passes `filter`.
///
/// An unconstrained filter borrows the input back unchanged; otherwise a new
/// collection is built in the input's order. The input is never modified.
pub fn filter_by_source<'a>(
    collection: &'a MergedCollection,
    filter: &SourceFilter,
) -> Cow<'a, MergedCollection> {
    if filter.is_unconstrained() {
        return Cow::Borrowed(collection);
    }

    let mut filtered = MergedCollection::new();
    for (id, record) in collection {
        if filter.allows(record.source()) {
            filtered.insert_accepted(id.clone(), record.clone());
        }
    }
    info!(
        sources = ?filter.tags().collect::<Vec<_>>(),
        "filtered to {} documents",
        filtered.len()
    );
    Cow::Owned(filtered)
}
