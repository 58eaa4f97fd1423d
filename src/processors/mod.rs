pub mod auditor;
pub mod batch;
pub mod corrector;
pub mod reconciler;
pub mod resampler;

pub use auditor::{AuditReport, FileAuditor, SizeAuditor, SizeReport};
pub use batch::{ConvertProcessor, ConvertReport};
pub use corrector::{ElevationSource, LapseRateCorrector, SyntheticElevation, UniformElevation};
pub use reconciler::{MissingReport, Reconciler};
pub use resampler::{NearestIndex, PointSample, Resampler};
