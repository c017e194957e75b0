//! Dialogue node model.

/// Node identifier. `0` is reserved for "end of dialogue".
pub type NodeId = i64;

/// A selectable answer leading to another node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogChoice {
    pub text: String,
    /// Target node, `0` ends the dialogue
    pub next_id: NodeId,
}

/// One line of dialogue with optional choices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogNode {
    pub id: NodeId,
    /// Empty when narration
    pub speaker: String,
    pub text: String,
    pub choices: Vec<DialogChoice>,
    /// Successor when the node has no choices; load order is used when absent
    pub next_id: Option<NodeId>,
}

impl DialogNode {
    /// Text as shown in the dialogue box: `"speaker: text"`, or just the text.
    pub fn display_line(&self) -> String {
        if self.speaker.is_empty() {
            self.text.clone()
        } else {
            format!("{}: {}", self.speaker, self.text)
        }
    }

    /// Numbered choice labels, `"1) text"`, matching the number keys.
    pub fn choice_labels(&self) -> Vec<String> {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, choice)| format!("{}) {}", i + 1, choice.text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let mut node = DialogNode {
            id: 1,
            text: "The docks are quiet.".to_string(),
            ..Default::default()
        };
        assert_eq!(node.display_line(), "The docks are quiet.");

        node.speaker = "Nova".to_string();
        assert_eq!(node.display_line(), "Nova: The docks are quiet.");
    }

    #[test]
    fn test_choice_labels() {
        let node = DialogNode {
            id: 1,
            choices: vec![
                DialogChoice {
                    text: "Board".to_string(),
                    next_id: 2,
                },
                DialogChoice {
                    text: "Leave".to_string(),
                    next_id: 0,
                },
            ],
            ..Default::default()
        };
        assert_eq!(node.choice_labels(), vec!["1) Board", "2) Leave"]);
    }
}
