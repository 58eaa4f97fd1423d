pub mod grid_reader;
pub mod scanner;

pub use grid_reader::GridReader;
pub use scanner::{ArchiveListing, ArchiveScanner, ScannedFile};
