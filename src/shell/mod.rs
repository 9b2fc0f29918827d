pub mod command;
pub mod parse;

use crate::{
    fs::FileSystem,
    shell::{command::execute_command, parse::parse_command},
};
use anyhow::{Context, Result};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::{io::stdout, path::PathBuf};

const COMMANDS: [&str; 11] = [
    "help", "ls", "stat", "map", "frag", "create", "rm", "rename", "mv", "format", "exit",
];

pub fn start_shell(mut fs: FileSystem) -> Result<()> {
    banner(&fs)?;

    let username = whoami::username();
    let hostname = whoami::hostname();

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".contigfs_history");
    let history = FileBackedHistory::with_file(100, history_path)
        .context("Failed to open shell history")?;

    let completer = DefaultCompleter::new_with_wordlen(
        COMMANDS.iter().map(|c| c.to_string()).collect(),
        2,
    );
    let mut line_editor = Reedline::create()
        .with_history(Box::new(history))
        .with_completer(Box::new(completer));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(format!(
            "{}@{}",
            username.green().bold(),
            hostname.cyan().bold()
        )),
        DefaultPromptSegment::Basic("ContigFS".bright_blue().bold().to_string()),
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut fs) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, command::Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command or bad arguments. Type 'help' for command list."
                            .yellow()
                    ),
                }
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting...".yellow());
                break;
            }
            Ok(_) => {
                println!();
                continue;
            }
            Err(e) => return Err(e).context("Failed to read line"),
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
    Ok(())
}

fn banner(fs: &FileSystem) -> Result<()> {
    let config = fs.config();
    execute!(
        stdout(),
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to ContigFS v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    )?;
    println!(
        "{}",
        format!(
            "Disk: {} bytes, {} blocks of {} bytes",
            config.disk_size,
            config.total_blocks(),
            config.block_size
        )
        .bright_black()
    );
    Ok(())
}
