use crate::domain::ports::{MapSurface, Notifier};
use crate::domain::view::{CameraTransition, MarkerDescriptor};
use crate::utils::error::MapError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum SurfaceCommand {
    ReplaceMarkers { markers: Vec<MarkerDescriptor> },
    TransitionCamera { transition: CameraTransition },
    Clear,
}

/// Keeps every command it receives. Used headless by the CLI and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn last_markers(&self) -> Option<&[MarkerDescriptor]> {
        self.commands.iter().rev().find_map(|command| match command {
            SurfaceCommand::ReplaceMarkers { markers } => Some(markers.as_slice()),
            _ => None,
        })
    }

    pub fn camera_transitions(&self) -> Vec<&CameraTransition> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                SurfaceCommand::TransitionCamera { transition } => Some(transition),
                _ => None,
            })
            .collect()
    }
}

impl MapSurface for RecordingSurface {
    fn replace_markers(&mut self, markers: &[MarkerDescriptor]) {
        self.commands.push(SurfaceCommand::ReplaceMarkers {
            markers: markers.to_vec(),
        });
    }

    fn transition_camera(&mut self, transition: &CameraTransition) {
        self.commands.push(SurfaceCommand::TransitionCamera {
            transition: transition.clone(),
        });
    }

    fn clear(&mut self) {
        self.commands.push(SurfaceCommand::Clear);
    }
}

/// Sends failures to the log; the toast layer reads them from there.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn report_error(&self, context: &str, error: &MapError) {
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            context,
            error,
            error.category(),
            error.severity()
        );
        tracing::error!("💡 {}", error.recovery_suggestion());
    }
}
