use anyhow::Result;
use ansi_term::{Colour, Style};
use clap::Subcommand;

use crate::{
    app::App,
    preferences::{system_prefers_dark, ColorThemeId, Theme},
    storage::KeyValueStore,
};

use super::format::report_sync;

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    #[command(about = "Show the theme preference and what it resolves to")]
    Show,
    #[command(about = "Set the theme preference")]
    Set { theme: Theme },
    #[command(about = "Switch to the opposite of the current theme")]
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum ColorCommand {
    #[command(about = "List color themes")]
    Show,
    #[command(about = "Select a color theme")]
    Set { color: ColorThemeId },
}

pub async fn process_theme_command(
    app: &App<impl KeyValueStore>,
    command: ThemeCommand,
) -> Result<()> {
    let system_is_dark = system_prefers_dark();
    let theme = match command {
        ThemeCommand::Show => app.theme().await?,
        ThemeCommand::Set { theme } => {
            let synced = app.set_theme(theme).await?;
            report_sync(synced.outcome);
            synced.value
        }
        ThemeCommand::Toggle => {
            let synced = app.toggle_theme(system_is_dark).await?;
            report_sync(synced.outcome);
            synced.value
        }
    };
    println!("{theme} ({})", theme.resolve(system_is_dark));
    Ok(())
}

pub async fn process_color_command(
    app: &App<impl KeyValueStore>,
    command: ColorCommand,
) -> Result<()> {
    let preference = match command {
        ColorCommand::Show => app.color_theme().await?,
        ColorCommand::Set { color } => {
            let synced = app.set_color_theme(color).await?;
            report_sync(synced.outcome);
            synced.value
        }
    };

    for id in ColorThemeId::ALL {
        let marker = if id == preference.color_theme { "*" } else { " " };
        let state = if preference.is_unlocked(id) {
            Style::new()
        } else {
            Style::new().dimmed()
        };
        println!(
            "{marker} {} {}",
            state.paint(id.name()),
            Colour::White.dimmed().paint(id.primary())
        );
    }
    Ok(())
}
