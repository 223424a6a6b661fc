//! Domain types for the soft-404 classifier. No IO, no async — the classifier
//! engine and its collaborators build everything they need on top of these.

pub mod doc_type;
pub mod http_response;
pub mod signature;
pub mod url;

pub use doc_type::DocType;
pub use http_response::{Headers, HttpResponse};
pub use signature::FourOhFourResponse;
pub use url::{DomainPath, NormalizedPath, Url, UrlError};
