//! Player input for an open dialogue box.

use crate::graph::DialogGraph;

/// Keys the dialogue box listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogInput {
    /// Enter: continue a node without choices
    Accept,
    /// Number key 1-9 selecting a choice
    Select(u8),
    /// Escape: close the dialogue
    Cancel,
}

impl DialogInput {
    /// Maps a key character, `None` for keys the dialogue box ignores.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '\n' | '\r' => Some(Self::Accept),
            '\u{1b}' => Some(Self::Cancel),
            '1'..='9' => key.to_digit(10).map(|d| Self::Select(d as u8)),
            _ => None,
        }
    }
}

/// What the presentation layer should do after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Cursor moved; redraw the current node
    Refresh,
    /// Input did not apply to the current node
    Ignored,
    /// Dialogue is over; remove the dialogue box
    Closed,
}

/// Applies one input to the graph.
pub fn handle_input(graph: &mut DialogGraph, input: DialogInput) -> InputOutcome {
    if !graph.is_active() {
        return InputOutcome::Closed;
    }

    match input {
        DialogInput::Accept => {
            if graph.has_choices() {
                return InputOutcome::Ignored;
            }
            graph.advance(None);
        }
        DialogInput::Select(number) => {
            if !graph.has_choices() || number == 0 {
                return InputOutcome::Ignored;
            }
            if !graph.advance(Some(usize::from(number - 1))) && graph.is_active() {
                return InputOutcome::Ignored;
            }
        }
        DialogInput::Cancel => {
            graph.end_dialogue();
        }
    }

    if graph.is_active() {
        InputOutcome::Refresh
    } else {
        InputOutcome::Closed
    }
}
