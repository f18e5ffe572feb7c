use crate::core::store::AddressStore;
use crate::domain::model::{Address, LngLat};
use crate::domain::ports::{AssignmentOutcome, BatchAssignment};
use crate::domain::view::Bounds;
use crate::utils::error::{MapError, Result};

/// Even-odd ray casting. The ring is implicitly closed and may wind either way.
///
/// A horizontal ray runs from `point` towards +x; an edge counts when it
/// straddles the point's y (half-open: `(yi > y) != (yj > y)`) and its
/// x-intercept lies strictly right of the point. Consequently points on a
/// left or bottom edge count as inside and points on a right or top edge as
/// outside.
pub fn ring_contains(ring: &[LngLat], point: LngLat) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);
        if (yi > y) != (yj > y) {
            let intercept = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < intercept {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPolicy {
    /// Stores smaller than this are scanned on the calling thread.
    pub threshold: usize,
    pub max_shards: usize,
}

impl Default for ShardPolicy {
    fn default() -> Self {
        Self {
            threshold: 20_000,
            max_shards: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl ShardPolicy {
    pub fn sequential() -> Self {
        Self {
            threshold: usize::MAX,
            max_shards: 1,
        }
    }
}

/// Placeable addresses inside `ring`, in `addresses` order.
pub fn select_within(ring: &[LngLat], addresses: &[Address], policy: ShardPolicy) -> Vec<Address> {
    if ring.len() < 3 || addresses.is_empty() {
        return Vec::new();
    }

    let mut envelope = Bounds::from_point(ring[0]);
    for vertex in &ring[1..] {
        envelope.extend(*vertex);
    }
    let hit = |address: &Address| {
        address.is_placeable()
            && envelope.contains(address.coordinates)
            && ring_contains(ring, address.coordinates)
    };

    let shards = policy.max_shards.max(1);
    if addresses.len() < policy.threshold || shards == 1 {
        return addresses.iter().filter(|a| hit(a)).cloned().collect();
    }

    let chunk_size = addresses.len().div_ceil(shards);
    tracing::debug!(
        "Sharding containment scan of {} addresses into chunks of {}",
        addresses.len(),
        chunk_size
    );
    // 各分片依序合併，保持 store 原本的順序
    std::thread::scope(|scope| {
        let handles: Vec<_> = addresses
            .chunks(chunk_size)
            .map(|chunk| {
                let hit = &hit;
                scope.spawn(move || chunk.iter().filter(|a| hit(a)).cloned().collect::<Vec<_>>())
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(part) => part,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing { vertices: Vec<LngLat> },
    /// Ring closed; waiting for the batch-assignment collaborator.
    AwaitingAssignment {
        ring: Vec<LngLat>,
        selection: Vec<Address>,
    },
}

/// Interactive polygon drawing session over the address store.
#[derive(Debug, Default)]
pub struct PolygonSelector {
    state: DrawState,
    policy: ShardPolicy,
}

impl PolygonSelector {
    pub fn new(policy: ShardPolicy) -> Self {
        Self {
            state: DrawState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    pub fn vertices(&self) -> &[LngLat] {
        match &self.state {
            DrawState::Drawing { vertices } => vertices,
            DrawState::AwaitingAssignment { ring, .. } => ring,
            DrawState::Idle => &[],
        }
    }

    /// Flips draw mode and returns whether it is now on. Turning it off
    /// discards an unfinished ring.
    pub fn toggle_draw(&mut self) -> Result<bool> {
        match self.state {
            DrawState::Idle => {
                self.state = DrawState::Drawing {
                    vertices: Vec::new(),
                };
                Ok(true)
            }
            DrawState::Drawing { .. } => {
                self.state = DrawState::Idle;
                Ok(false)
            }
            DrawState::AwaitingAssignment { .. } => Err(MapError::invalid_state(
                "a selection is waiting for batch assignment",
            )),
        }
    }

    pub fn add_vertex(&mut self, vertex: LngLat) -> Result<usize> {
        match &mut self.state {
            DrawState::Drawing { vertices } => {
                vertices.push(vertex);
                Ok(vertices.len())
            }
            _ => Err(MapError::invalid_state("draw mode is not active")),
        }
    }

    /// Escape key. Only an unfinished ring is discarded.
    pub fn escape(&mut self) -> bool {
        if self.is_drawing() {
            self.state = DrawState::Idle;
            true
        } else {
            false
        }
    }

    /// Closes the ring and tests every store address. Rings with fewer than
    /// three vertices select nothing.
    pub fn close_ring(&mut self, store: &AddressStore) -> Result<&[Address]> {
        let vertices = match std::mem::take(&mut self.state) {
            DrawState::Drawing { vertices } => vertices,
            other => {
                self.state = other;
                return Err(MapError::invalid_state("draw mode is not active"));
            }
        };

        let selection = select_within(&vertices, store.addresses(), self.policy);
        tracing::info!(
            "✏️ Polygon closed with {} vertices, {} addresses selected",
            vertices.len(),
            selection.len()
        );
        self.state = DrawState::AwaitingAssignment {
            ring: vertices,
            selection,
        };
        Ok(self.pending_selection().unwrap_or_default())
    }

    pub fn pending_selection(&self) -> Option<&[Address]> {
        match &self.state {
            DrawState::AwaitingAssignment { selection, .. } => Some(selection),
            _ => None,
        }
    }

    /// Applies the collaborator's verdict and leaves draw mode.
    pub fn finish_handoff(&mut self, outcome: AssignmentOutcome) -> Result<Vec<Address>> {
        match std::mem::take(&mut self.state) {
            DrawState::AwaitingAssignment { selection, .. } => {
                tracing::info!(
                    "Polygon selection of {} addresses {:?}",
                    selection.len(),
                    outcome
                );
                Ok(selection)
            }
            other => {
                self.state = other;
                Err(MapError::invalid_state("no selection is awaiting assignment"))
            }
        }
    }

    /// Passes the pending selection to `collaborator`. A collaborator error
    /// keeps the selection pending so the user can retry or cancel.
    pub async fn hand_off<B: BatchAssignment + ?Sized>(
        &mut self,
        collaborator: &B,
    ) -> Result<AssignmentOutcome> {
        let selection = self
            .pending_selection()
            .ok_or_else(|| MapError::invalid_state("no selection is awaiting assignment"))?;
        let outcome = collaborator.assign(selection).await?;
        self.finish_handoff(outcome)?;
        Ok(outcome)
    }
}
