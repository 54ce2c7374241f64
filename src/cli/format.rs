//! Terminal rendering shared by the commands.

use ansi_term::{Colour, Style};

use crate::{catalog::Category, sync::SyncOutcome, utils::percentage::Percentage};

pub fn category_style(category: Category) -> Style {
    let colour = match category {
        Category::Work => Colour::Blue,
        Category::Learning => Colour::Purple,
        Category::Health => Colour::Green,
        Category::Leisure => Colour::Fixed(208),
    };
    colour.bold()
}

pub fn checkbox(completed: bool) -> String {
    if completed {
        Colour::Green.paint("[x]").to_string()
    } else {
        Style::new().dimmed().paint("[ ]").to_string()
    }
}

pub fn percentage(value: Percentage) -> String {
    let colour = match *value {
        v if v >= 80. => Colour::Green,
        v if v >= 50. => Colour::Yellow,
        _ => Colour::Red,
    };
    colour.paint(value.to_string()).to_string()
}

pub fn optional_percentage(value: Option<Percentage>) -> String {
    value
        .map(percentage)
        .unwrap_or_else(|| Style::new().dimmed().paint("n/a").to_string())
}

pub fn heading(text: &str) -> String {
    Style::new().bold().underline().paint(text).to_string()
}

pub fn warning(text: &str) -> String {
    Colour::Yellow.paint(text).to_string()
}

/// Tells the user when a change didn't stick.
pub fn report_sync(outcome: SyncOutcome) {
    if outcome == SyncOutcome::RolledBack {
        eprintln!("{}", warning("Sync failed, the change was rolled back"));
    }
}
