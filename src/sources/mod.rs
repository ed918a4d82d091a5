//! Feed fetching
//!
//! [`SourceFetcher`] is the seam between the refresh orchestrator and the
//! network. [`XmltvSourceFetcher`] is the HTTP implementation used in
//! production; tests substitute in-memory fetchers.

pub mod traits;
pub mod xmltv;

pub use traits::SourceFetcher;
pub use xmltv::XmltvSourceFetcher;
