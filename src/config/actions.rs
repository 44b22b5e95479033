#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    ToggleReducedMotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    /// Focus the next field or button.
    Next,
    Previous,
    /// Move along the button row.
    Left,
    Right,
    Activate,
    Cancel,
}
