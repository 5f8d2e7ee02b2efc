// ABOUTME: Form view surface provided by the host framework.
// ABOUTME: Open trait so any form renderer can host the controller.

/// Actions the controller can attach to a registered button.
///
/// The host maps the action back to the matching click handler when the
/// button fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    RollbackChanges,
}

/// The form surface the host framework exposes to controllers.
///
/// Deliberately not sealed: the host form renderer implements this.
pub trait FormView {
    /// Register a clickable button on the form's action bar.
    fn add_custom_button(&mut self, label: &str, action: FormAction);

    /// Display a message prompt to the user.
    fn msgprint(&self, message: &str);
}
