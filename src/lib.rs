pub mod errors;
pub mod result;
pub mod model;
pub mod config;
pub mod sort;
pub mod ordered_set;
pub mod indexed_set;
pub mod change_set;
pub mod section;
pub mod controller;

pub use change_set::{ChangeSet, Positioned, Relocation};
pub use config::{ControllerConfig, ViolationPolicy};
pub use controller::{
    ObjectChange,
    ObjectEvent,
    ResultsController,
    ResultsControllerDelegate,
    SectionChange,
    SectionedResultsController,
};
pub use errors::{ControllerError, ProtocolViolation};
pub use indexed_set::IndexedSet;
pub use model::{BatchStats, IndexPath};
pub use ordered_set::{Element, OrderedSet};
pub use section::SectionInfo;
pub use sort::{SortDescriptor, SortDescriptors};
