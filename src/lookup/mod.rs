//! Bibliographic metadata lookup
//!
//! The [`MetadataSource`] trait is the boundary to the external lookup
//! service. The contract is uniform degradation: any failure — network,
//! not-found, malformed payload — surfaces as `None`, and the resolver
//! treats all absences identically. [`CrossrefClient`] is the CrossRef
//! REST implementation.

mod crossref;

pub use crossref::CrossrefClient;

use async_trait::async_trait;

/// A single cited-work record from a lookup response.
///
/// The identifier is optional; entries without one are skipped by the
/// resolver.
#[derive(Debug, Clone)]
pub struct WorkReference {
    /// DOI of the cited work, when the service knows it
    pub doi: Option<String>,
}

/// Structured metadata for one looked-up work.
#[derive(Debug, Clone, Default)]
pub struct WorkMetadata {
    /// Ordered list of cited-work records
    pub references: Vec<WorkReference>,
    /// Publication year, when the service reports one
    pub issued_year: Option<i32>,
}

/// Trait for bibliographic lookup backends
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up a work by identifier.
    ///
    /// Returns `None` on any failure, uniformly — callers cannot and must
    /// not distinguish a network error from a missing record.
    async fn lookup(&self, doi: &str) -> Option<WorkMetadata>;
}
