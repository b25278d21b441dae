#![forbid(unsafe_code)]

//! Identifier-space tags.

use std::fmt;
use std::sync::Arc;

/// Raw identifier. Only meaningful together with an [`IdType`].
pub type Id = u32;

/// Placeholder for "no identifier at this position".
///
/// Reserved: data sources must not hand out this value as a real id.
pub const INVALID_ID: Id = Id::MAX;

#[derive(Debug, PartialEq, Eq, Hash)]
struct CategoryInner {
    name: Arc<str>,
    parent: Option<IdCategory>,
}

/// A category of identifier spaces, e.g. "gene" or "sample".
///
/// Categories may be nested; a category subsumes itself and every category
/// below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdCategory(Arc<CategoryInner>);

impl IdCategory {
    /// Create a root category.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(Arc::new(CategoryInner {
            name: name.into(),
            parent: None,
        }))
    }

    /// Create a sub-category of `self`.
    #[must_use]
    pub fn child(&self, name: impl Into<Arc<str>>) -> Self {
        Self(Arc::new(CategoryInner {
            name: name.into(),
            parent: Some(self.clone()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&IdCategory> {
        self.0.parent.as_ref()
    }

    /// `true` if `other` is this category or one of its descendants.
    pub fn subsumes(&self, other: &IdCategory) -> bool {
        let mut current = Some(other);
        while let Some(c) = current {
            if c == self {
                return true;
            }
            current = c.parent();
        }
        false
    }
}

impl fmt::Display for IdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}/")?;
        }
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct IdTypeInner {
    name: Arc<str>,
    category: IdCategory,
}

/// Identifier-space tag: names the domain an integer id belongs to.
///
/// Cheap to clone. Two tags are equal when both name and category match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdType(Arc<IdTypeInner>);

impl IdType {
    pub fn new(name: impl Into<Arc<str>>, category: IdCategory) -> Self {
        Self(Arc::new(IdTypeInner {
            name: name.into(),
            category,
        }))
    }

    /// Tag used for placeholder collections that belong to no real space.
    pub fn invalid() -> Self {
        Self::new("_invalid", IdCategory::new("_invalid"))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn category(&self) -> &IdCategory {
        &self.0.category
    }

    /// `true` for the placeholder tag returned by [`IdType::invalid`].
    pub fn is_invalid(&self) -> bool {
        self.name() == "_invalid" && self.category().name() == "_invalid"
    }

    /// Compatibility: either category subsumes the other.
    pub fn is_compatible(&self, other: &IdType) -> bool {
        self.category().subsumes(other.category()) || other.category().subsumes(self.category())
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_category_is_compatible() {
        let gene = IdCategory::new("gene");
        let symbol = IdType::new("gene_symbol", gene.clone());
        let entrez = IdType::new("entrez", gene);
        assert!(symbol.is_compatible(&entrez));
        assert_ne!(symbol, entrez);
    }

    #[test]
    fn nested_category_subsumption_is_symmetric_for_compatibility() {
        let sample = IdCategory::new("sample");
        let tumor = sample.child("tumor");
        let a = IdType::new("sample_id", sample.clone());
        let b = IdType::new("tumor_id", tumor.clone());
        assert!(sample.subsumes(&tumor));
        assert!(!tumor.subsumes(&sample));
        assert!(a.is_compatible(&b));
        assert!(b.is_compatible(&a));
    }

    #[test]
    fn unrelated_categories_are_incompatible() {
        let a = IdType::new("gene", IdCategory::new("gene"));
        let b = IdType::new("patient", IdCategory::new("patient"));
        assert!(!a.is_compatible(&b));
        assert!(IdType::invalid().is_invalid());
        assert!(!a.is_invalid());
    }

    #[test]
    fn equal_by_value() {
        let a = IdType::new("x", IdCategory::new("c"));
        let b = IdType::new("x", IdCategory::new("c"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "x (c)");
    }
}
