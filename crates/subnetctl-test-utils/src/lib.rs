pub mod helpers;
pub mod mock_collaborators;
pub mod mock_control_plane;

pub use helpers::*;
pub use mock_collaborators::{MockInspector, MockPublisher, ScriptedConfirmer};
pub use mock_control_plane::MockControlPlane;
