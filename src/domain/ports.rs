use crate::domain::model::{Address, ListId, ListMembership};
use crate::domain::view::{CameraTransition, MarkerDescriptor};
use crate::utils::error::{MapError, Result};
use async_trait::async_trait;

/// Backend that owns the canonical address data.
#[async_trait]
pub trait AddressSource: Send + Sync {
    async fn load_addresses(&self) -> Result<Vec<Address>>;

    /// Every address/list join row, used for assignment filtering and colors.
    async fn load_memberships(&self) -> Result<Vec<ListMembership>>;
}

/// Resolves list ids into their member rows.
#[async_trait]
pub trait MembershipResolver: Send + Sync {
    async fn list_membership(&self, list_ids: &[ListId]) -> Result<Vec<ListMembership>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Accepted,
    Cancelled,
}

/// Receives a polygon selection and decides what to do with it.
#[async_trait]
pub trait BatchAssignment: Send + Sync {
    async fn assign(&self, selection: &[Address]) -> Result<AssignmentOutcome>;
}

/// Rendering substrate. It receives declarative commands and owns all drawing.
pub trait MapSurface {
    fn replace_markers(&mut self, markers: &[MarkerDescriptor]);

    fn transition_camera(&mut self, transition: &CameraTransition);

    fn clear(&mut self);
}

/// Log/toast sink for failures that must reach the user.
pub trait Notifier {
    fn report_error(&self, context: &str, error: &MapError);
}
