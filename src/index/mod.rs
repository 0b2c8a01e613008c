//! Catalog snapshots and the sources they are loaded from.

pub mod loader;
pub mod memory;
pub mod source;

pub use loader::{read_catalog, CatalogLoader, JsonCatalogLoader, LazyCatalog};
pub use memory::CatalogSnapshot;
pub use source::CatalogSource;
