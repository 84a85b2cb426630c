pub mod contract;
pub mod queue;
pub mod sectioned;
pub mod snapshot;

pub use contract::{
    ObjectChange,
    ResultsController,
    ResultsControllerDelegate,
    SectionChange,
};
pub use queue::{EventSender, ObjectEvent};
pub use sectioned::{ControllerBuilder, SectionedResultsController};
pub use snapshot::{ResultsSnapshot, SnapshotReader};
