use crate::core::store::MembershipIndex;
use crate::core::viewport::ViewportController;
use crate::domain::model::{AddressId, ListId, ListMembership, SavedView};
use crate::domain::view::CameraTransition;
use crate::utils::error::MapError;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPhase {
    Unfocused,
    Focused,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FocusState {
    pub selected_list_ids: BTreeSet<ListId>,
    pub resolved_address_ids: HashSet<AddressId>,
    pub saved_view: Option<SavedView>,
}

/// A membership lookup that must be awaited before the new focus set is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub sequence: u64,
    pub list_ids: Vec<ListId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FocusTransition {
    /// Unfocused → Focused. The camera before the focus was saved.
    Entered,
    /// Focused → Focused with a different list set.
    Updated,
    /// Focused → Unfocused, with the camera move back to the saved view.
    Exited { restore: Option<CameraTransition> },
    /// A newer request was issued; this response was dropped.
    Superseded,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FocusCommand {
    /// Ask the membership collaborator, then call [`ListFocusManager::complete`].
    Resolve(FocusRequest),
    /// Nothing to resolve; the transition already happened.
    Done(FocusTransition),
}

/// Turns list selections into focus sets. Responses are tagged with a
/// sequence number and only the latest request may change the state.
#[derive(Debug, Default)]
pub struct ListFocusManager {
    state: FocusState,
    sequence: u64,
}

impl ListFocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn phase(&self) -> FocusPhase {
        if self.state.selected_list_ids.is_empty() {
            FocusPhase::Unfocused
        } else {
            FocusPhase::Focused
        }
    }

    pub fn is_focused(&self) -> bool {
        self.phase() == FocusPhase::Focused
    }

    /// The focus set, or `None` while unfocused.
    pub fn focus_set(&self) -> Option<&HashSet<AddressId>> {
        self.is_focused().then_some(&self.state.resolved_address_ids)
    }

    pub fn latest_sequence(&self) -> u64 {
        self.sequence
    }

    /// Starts a change of the selected list set. Every call supersedes the
    /// requests issued before it, including an empty selection.
    pub fn request<I: IntoIterator<Item = ListId>>(
        &mut self,
        list_ids: I,
        viewport: &mut ViewportController,
    ) -> FocusCommand {
        self.sequence += 1;
        let selected: BTreeSet<ListId> = list_ids.into_iter().collect();

        if !selected.is_empty() {
            return FocusCommand::Resolve(FocusRequest {
                sequence: self.sequence,
                list_ids: selected.into_iter().collect(),
            });
        }

        if !self.is_focused() {
            return FocusCommand::Done(FocusTransition::Unchanged);
        }

        let saved = self.state.saved_view.take();
        self.state = FocusState::default();
        let restore = saved.map(|view| viewport.restore_view(view));
        tracing::info!("🎯 List focus cleared (view restored: {})", restore.is_some());
        FocusCommand::Done(FocusTransition::Exited { restore })
    }

    /// Applies a membership response. Stale responses change nothing.
    pub fn complete(
        &mut self,
        request: &FocusRequest,
        rows: Vec<ListMembership>,
        viewport: &ViewportController,
    ) -> FocusTransition {
        if request.sequence != self.sequence {
            tracing::warn!(
                "Discarding stale membership response #{} (latest is #{})",
                request.sequence,
                self.sequence
            );
            return FocusTransition::Superseded;
        }

        let resolved = MembershipIndex::from_rows(rows).member_ids(&request.list_ids);

        let was_focused = self.is_focused();
        self.state.selected_list_ids = request.list_ids.iter().cloned().collect();
        self.state.resolved_address_ids = resolved;

        // saved on entry only; held until the selection is cleared
        if !was_focused {
            self.state.saved_view = Some(viewport.save_view());
        }

        tracing::info!(
            "🎯 Focus on {} list(s) resolved to {} addresses",
            self.state.selected_list_ids.len(),
            self.state.resolved_address_ids.len()
        );

        if was_focused {
            FocusTransition::Updated
        } else {
            FocusTransition::Entered
        }
    }

    /// Records a failed lookup. The current focus state is kept as it was.
    /// Returns whether the failed request was still the latest one.
    pub fn fail(&mut self, request: &FocusRequest, error: &MapError) -> bool {
        let current = request.sequence == self.sequence;
        tracing::error!(
            "❌ Membership lookup #{} for {:?} failed: {} (current: {})",
            request.sequence,
            request.list_ids,
            error,
            current
        );
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::{DrillIn, ViewportSize};
    use crate::domain::model::{CameraState, LngLat};

    fn viewport() -> ViewportController {
        ViewportController::new(
            CameraState {
                center: LngLat::new(6.95, 50.94),
                zoom: 12.0,
                pitch: 0.0,
            },
            ViewportSize {
                width_px: 1000.0,
                height_px: 800.0,
            },
            DrillIn {
                zoom: 18.0,
                pitch: 45.0,
            },
            0.0,
        )
    }

    fn row(address: &str, list: &str) -> ListMembership {
        ListMembership {
            address_id: address.to_string(),
            list_id: list.to_string(),
            list_color: "#ff0000".to_string(),
            list_name: None,
            assigned_to: None,
            assigned_at: None,
        }
    }

    fn expect_request(command: FocusCommand) -> FocusRequest {
        match command {
            FocusCommand::Resolve(request) => request,
            other => panic!("expected a resolve request, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_selection_while_unfocused_is_unchanged() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        assert_eq!(
            manager.request(Vec::new(), &mut view),
            FocusCommand::Done(FocusTransition::Unchanged)
        );
        assert_eq!(manager.phase(), FocusPhase::Unfocused);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        let first = expect_request(manager.request(vec!["a".to_string()], &mut view));
        let second = expect_request(manager.request(vec!["b".to_string()], &mut view));

        let applied = manager.complete(&second, vec![row("x2", "b")], &view);
        assert_eq!(applied, FocusTransition::Entered);
        let stale = manager.complete(&first, vec![row("x1", "a")], &view);
        assert_eq!(stale, FocusTransition::Superseded);

        let focus = manager.focus_set().unwrap();
        assert!(focus.contains("x2"));
        assert!(!focus.contains("x1"));
    }

    #[test]
    fn test_clearing_supersedes_in_flight_request() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        let pending = expect_request(manager.request(vec!["a".to_string()], &mut view));
        manager.request(Vec::new(), &mut view);
        assert_eq!(
            manager.complete(&pending, vec![row("x1", "a")], &view),
            FocusTransition::Superseded
        );
        assert!(!manager.is_focused());
    }

    #[test]
    fn test_failure_keeps_previous_state() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        let first = expect_request(manager.request(vec!["a".to_string()], &mut view));
        manager.complete(&first, vec![row("x1", "a")], &view);
        let before = manager.state().clone();

        let second = expect_request(manager.request(vec!["a".to_string(), "b".to_string()], &mut view));
        assert!(manager.fail(&second, &MapError::membership("offline")));
        assert_eq!(manager.state(), &before);
    }

    #[test]
    fn test_union_ignores_rows_of_other_lists() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        let request = expect_request(manager.request(
            vec!["a".to_string(), "b".to_string(), "a".to_string()],
            &mut view,
        ));
        assert_eq!(request.list_ids, vec!["a".to_string(), "b".to_string()]);
        manager.complete(
            &request,
            vec![row("x1", "a"), row("x2", "b"), row("x1", "b"), row("x9", "z")],
            &view,
        );
        assert_eq!(manager.state().resolved_address_ids.len(), 2);
    }

    #[test]
    fn test_entering_empty_lists_still_saves_view() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        let request = expect_request(manager.request(vec!["empty".to_string()], &mut view));
        assert_eq!(manager.complete(&request, vec![], &view), FocusTransition::Entered);
        assert!(manager.is_focused());
        assert!(manager.state().resolved_address_ids.is_empty());
        assert_eq!(manager.state().saved_view, Some(view.save_view()));

        match manager.request(Vec::new(), &mut view) {
            FocusCommand::Done(FocusTransition::Exited { restore }) => assert!(restore.is_some()),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(manager.state().saved_view, None);
    }

    #[test]
    fn test_update_never_resaves_view() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        let first = expect_request(manager.request(vec!["empty".to_string()], &mut view));
        manager.complete(&first, vec![], &view);
        let saved = manager.state().saved_view;

        view.drill_in(LngLat::new(6.93, 50.94));
        let second = expect_request(manager.request(vec!["a".to_string()], &mut view));
        assert_eq!(
            manager.complete(&second, vec![row("x1", "a")], &view),
            FocusTransition::Updated
        );
        assert_eq!(manager.state().saved_view, saved);
    }

    #[test]
    fn test_every_request_bumps_sequence() {
        let mut manager = ListFocusManager::new();
        let mut view = viewport();
        assert_eq!(manager.latest_sequence(), 0);
        let request = expect_request(manager.request(vec!["a".to_string()], &mut view));
        assert_eq!(request.sequence, manager.latest_sequence());
        manager.request(Vec::new(), &mut view);
        manager.request(Vec::new(), &mut view);
        assert_eq!(manager.latest_sequence(), 3);
    }
}
