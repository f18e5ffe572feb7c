pub mod filter;
pub mod focus;
pub mod markers;
pub mod polygon;
pub mod session;
pub mod store;
pub mod viewport;

pub use crate::domain::model::{Address, FilterState, ListMembership, LngLat, Unit, UnitStatus};
pub use crate::domain::ports::{
    AddressSource, AssignmentOutcome, BatchAssignment, MapSurface, MembershipResolver, Notifier,
};
pub use crate::utils::error::Result;
