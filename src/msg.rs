use crossterm::event::{KeyEvent, MouseEvent};

/// All possible messages that drive state transitions.
#[derive(Debug)]
#[allow(dead_code)] // Activate/Quit are injected by tests; Resize payload is informational.
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // -- View
    Activate,

    // -- System
    Tick,
    Quit,
}
