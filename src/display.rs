//! Presentation metadata for [`Choice`], kept outside the domain enum.

use crate::models::Choice;

pub struct ChoiceDisplay {
    pub choice: Choice,
    pub symbol: &'static str,
    pub label_key: &'static str,
    pub css_class: &'static str,
}

static TABLE: [ChoiceDisplay; 3] = [
    ChoiceDisplay {
        choice: Choice::Up,
        symbol: "↑",
        label_key: "better_choice_up",
        css_class: "up",
    },
    ChoiceDisplay {
        choice: Choice::Same,
        symbol: "→",
        label_key: "better_choice_same",
        css_class: "same",
    },
    ChoiceDisplay {
        choice: Choice::Down,
        symbol: "↓",
        label_key: "better_choice_down",
        css_class: "down",
    },
];

pub fn display(choice: Choice) -> &'static ChoiceDisplay {
    match choice {
        Choice::Up => &TABLE[0],
        Choice::Same => &TABLE[1],
        Choice::Down => &TABLE[2],
    }
}

/// Human label for a label key; the page has no localisation catalog.
pub fn label(label_key: &str) -> &'static str {
    match label_key {
        "better_choice_up" => "Better",
        "better_choice_same" => "Same",
        "better_choice_down" => "Worse",
        _ => "",
    }
}
