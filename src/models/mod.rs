pub mod region;
pub mod report;
pub mod snapshot;
pub mod timestamp;
pub mod variable;

pub use region::{Region, RegionSet};
pub use report::{
    AuditRecord, BatchSummary, ConvertRecord, MissingReason, MissingRecord, MonthlyCount,
    SizeRecord, UnitFailure,
};
pub use snapshot::{GridGeometry, GridSnapshot, GridStats};
pub use timestamp::FileTimestamp;
pub use variable::GridVariable;
