//! Callbacks from the timeline to its container screen.

/// Receiver of timeline navigation requests. The timeline holds it weakly.
pub trait TimelineDelegate: Send + Sync {
    /// The side menu button was tapped.
    fn did_tap_side_menu(&self);

    /// The new project button was tapped.
    fn did_tap_new_project(&self);
}
