mod cli;
mod models;
mod render;
mod store;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use store::Store;
use ui::run_tui;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            use clap_complete::{generate, Shell};
            let shell = shell.to_lowercase();
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "elvish" => Shell::Elvish,
                "powershell" => Shell::PowerShell,
                _ => {
                    println!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "shoplist", &mut std::io::stdout());
        }
        None => {
            let mut store = if cli.empty {
                Store::new()
            } else {
                Store::seeded()
            };
            if cli.hide_checked {
                store.toggle_filter();
            }
            run_tui(store)?;
        }
    }

    Ok(())
}
