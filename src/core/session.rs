use crate::config::MapConfig;
use crate::core::filter::{FilterOptions, FilterPipeline, ListScope, StatusSummary};
use crate::core::focus::{FocusCommand, FocusRequest, FocusState, FocusTransition, ListFocusManager};
use crate::core::markers::{ColorResolver, MarkerRenderer};
use crate::core::polygon::PolygonSelector;
use crate::core::store::AddressStore;
use crate::core::viewport::{ViewportController, ViewportSize};
use crate::domain::model::{Address, CameraState, FilterState, ListId, ListMembership, LngLat};
use crate::domain::ports::{
    AddressSource, AssignmentOutcome, BatchAssignment, MapSurface, MembershipResolver, Notifier,
};
use crate::domain::view::{CameraTransition, MarkerDescriptor};
use crate::utils::error::{MapError, Result};

/// What changed since the last pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Addresses,
    Filter,
    FocusSet,
    SidebarVisibility,
}

/// One live map view: owns the camera and marker state and pushes
/// declarative commands to its surface until [`MapSession::dispose`].
pub struct MapSession<S: MapSurface, N: Notifier> {
    config: MapConfig,
    store: AddressStore,
    filter: FilterState,
    pipeline: FilterPipeline,
    focus: ListFocusManager,
    markers: MarkerRenderer,
    viewport: ViewportController,
    polygon: PolygonSelector,
    sidebar_visible: bool,
    surface: Option<S>,
    notifier: N,
}

impl<S: MapSurface, N: Notifier> MapSession<S, N> {
    pub fn new(config: MapConfig, surface: S, notifier: N) -> Self {
        let viewport = ViewportController::new(
            config.initial_camera(),
            config.viewport_size(),
            config.drill_in(),
            config.viewport.min_zoom,
        );
        Self {
            pipeline: config.filter_pipeline(),
            polygon: PolygonSelector::new(config.shard_policy()),
            store: AddressStore::default(),
            filter: FilterState::default(),
            focus: ListFocusManager::new(),
            markers: MarkerRenderer::new(),
            viewport,
            sidebar_visible: false,
            surface: Some(surface),
            notifier,
            config,
        }
    }

    pub fn store(&self) -> &AddressStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn focus_state(&self) -> &FocusState {
        self.focus.state()
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        self.markers.markers()
    }

    pub fn camera(&self) -> CameraState {
        self.viewport.camera()
    }

    pub fn polygon(&self) -> &PolygonSelector {
        &self.polygon
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.surface.is_none()
    }

    pub async fn reload<A: AddressSource + ?Sized>(&mut self, source: &A) -> Result<()> {
        if let Err(e) = self.store.reload(source).await {
            self.notifier.report_error("reload addresses", &e);
            return Err(e);
        }
        self.recompute(Invalidation::Addresses);
        Ok(())
    }

    pub fn load(&mut self, addresses: Vec<Address>, memberships: Vec<ListMembership>) {
        self.store = AddressStore::new(addresses, memberships);
        self.recompute(Invalidation::Addresses);
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        if self.filter != filter {
            self.filter = filter;
            self.recompute(Invalidation::Filter);
        }
    }

    pub fn set_sidebar_visible(&mut self, visible: bool) {
        if self.sidebar_visible != visible {
            self.sidebar_visible = visible;
            self.recompute(Invalidation::SidebarVisibility);
        }
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.viewport.resize(size);
    }

    /// Changes the focused list set and awaits the membership lookup.
    pub async fn select_lists<R, I>(&mut self, resolver: &R, list_ids: I) -> Result<FocusTransition>
    where
        R: MembershipResolver + ?Sized,
        I: IntoIterator<Item = ListId>,
    {
        match self.begin_focus(list_ids) {
            FocusCommand::Done(transition) => Ok(transition),
            FocusCommand::Resolve(request) => {
                match resolver.list_membership(&request.list_ids).await {
                    Ok(rows) => Ok(self.finish_focus(&request, rows)),
                    Err(e) => self.fail_focus(&request, e),
                }
            }
        }
    }

    /// First half of a focus change for callers that run the lookup themselves.
    pub fn begin_focus<I: IntoIterator<Item = ListId>>(&mut self, list_ids: I) -> FocusCommand {
        let command = self.focus.request(list_ids, &mut self.viewport);
        if let FocusCommand::Done(transition) = &command {
            self.apply_focus_transition(transition);
        }
        command
    }

    pub fn finish_focus(&mut self, request: &FocusRequest, rows: Vec<ListMembership>) -> FocusTransition {
        let transition = self.focus.complete(request, rows, &self.viewport);
        self.apply_focus_transition(&transition);
        transition
    }

    /// Failed lookups leave the focus untouched and always reach the notifier
    /// when they belong to the latest request.
    pub fn fail_focus(&mut self, request: &FocusRequest, error: MapError) -> Result<FocusTransition> {
        if self.focus.fail(request, &error) {
            self.notifier.report_error("focus lists", &error);
            Err(error)
        } else {
            Ok(FocusTransition::Superseded)
        }
    }

    fn apply_focus_transition(&mut self, transition: &FocusTransition) {
        match transition {
            FocusTransition::Entered | FocusTransition::Updated => {
                self.recompute(Invalidation::FocusSet);
            }
            FocusTransition::Exited { restore } => {
                if let (Some(surface), Some(restore)) = (self.surface.as_mut(), restore) {
                    surface.transition_camera(restore);
                }
                self.recompute(Invalidation::FocusSet);
            }
            FocusTransition::Superseded | FocusTransition::Unchanged => {}
        }
    }

    /// Marker click: camera drill-in only. Filter and focus stay as they are.
    pub fn marker_clicked(&mut self, address_id: &str) -> Option<CameraTransition> {
        let position = self.markers.find(address_id)?.position;
        let transition = self.viewport.drill_in(position);
        self.emit_camera(&transition);
        Some(transition)
    }

    pub fn camera_moved(&mut self, camera: CameraState) {
        self.viewport.camera_moved(camera);
    }

    pub fn animation_finished(&mut self, id: u64) {
        self.viewport.animation_finished(id);
    }

    pub fn toggle_draw(&mut self) -> Result<bool> {
        self.polygon.toggle_draw()
    }

    pub fn add_polygon_vertex(&mut self, vertex: LngLat) -> Result<usize> {
        self.polygon.add_vertex(vertex)
    }

    pub fn escape(&mut self) -> bool {
        self.polygon.escape()
    }

    pub fn close_polygon(&mut self) -> Result<Vec<Address>> {
        self.polygon.close_ring(&self.store).map(<[Address]>::to_vec)
    }

    /// Hands the closed polygon's selection to the batch-assignment collaborator.
    pub async fn assign_selection<B: BatchAssignment + ?Sized>(
        &mut self,
        collaborator: &B,
    ) -> Result<AssignmentOutcome> {
        match self.polygon.hand_off(collaborator).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.notifier.report_error("assign selection", &e);
                Err(e)
            }
        }
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_addresses(self.store.addresses())
    }

    pub fn status_summary(&self) -> StatusSummary {
        StatusSummary::from_addresses(self.store.addresses())
    }

    /// Rebuilds the marker set and, while focused, reframes the focus set.
    pub fn recompute(&mut self, event: Invalidation) {
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!("Ignoring {:?} on a disposed map session", event);
            return;
        };

        let scope = ListScope {
            memberships: self.store.memberships(),
            focus: self.focus.focus_set(),
        };
        let filtered = self.pipeline.apply(self.store.addresses(), &self.filter, scope);
        let colors = ColorResolver::resolve(
            self.store.memberships(),
            filtered.iter().map(|f| f.address),
            &self.config.markers.neutral_color,
        );
        let markers = self.markers.recompute(&filtered, &colors);
        surface.replace_markers(markers);

        let refit = match event {
            Invalidation::FocusSet | Invalidation::SidebarVisibility => self.focus.is_focused(),
            Invalidation::Addresses | Invalidation::Filter => false,
        };
        if refit {
            let options = self.config.fit_options(self.sidebar_visible);
            let focus_ids = &self.focus.state().resolved_address_ids;
            if let Some(transition) = self
                .viewport
                .fit_to_addresses(self.store.select_ids(focus_ids), options)
            {
                surface.transition_camera(&transition);
            }
        }

        tracing::debug!(
            "Recomputed after {:?}: {} of {} addresses visible",
            event,
            filtered.len(),
            self.store.len()
        );
    }

    fn emit_camera(&mut self, transition: &CameraTransition) {
        if let Some(surface) = self.surface.as_mut() {
            surface.transition_camera(transition);
        }
    }

    /// Tears down the surface state. Later events are ignored.
    pub fn dispose(&mut self) -> Option<S> {
        self.polygon = PolygonSelector::new(self.config.shard_policy());
        self.markers.clear();
        let mut surface = self.surface.take()?;
        surface.clear();
        tracing::info!("Map session disposed");
        Some(surface)
    }
}

impl<S: MapSurface, N: Notifier> Drop for MapSession<S, N> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }
}
