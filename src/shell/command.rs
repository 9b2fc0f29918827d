use anyhow::{bail, Result};
use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::{thread, time::Duration};

use crate::fs::{
    error::FsError,
    file::{File, FileId},
    render::BlockState,
    Command as FsCommand, FileSystem, Outcome,
};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Ls,
    Stat(FileId),
    Map,
    Frag,
    Create(String, u64),
    Rm(FileId),
    Rename(FileId, String),
    Mv(FileId, i64),
    Format,
    Exit,
}

pub fn execute_command(cmd: &Command, fs: &mut FileSystem) -> Result<()> {
    match cmd {
        Command::Help => print_help(),
        Command::Ls => {
            if fs.files().next().is_none() {
                println!("{}", "(no files)".bright_black());
            }
            for file in fs.files() {
                println!(
                    "📄  {:<5} {:<16} blocks {}",
                    file.id.to_string().cyan(),
                    file.name,
                    format!("{}..{}", file.start_block, file.start_block + file.block_count)
                        .bright_black()
                );
            }
        }
        Command::Stat(id) => match fs.file(*id) {
            Some(file) => print_stat(file),
            None => return Err(FsError::FileNotFound(*id).into()),
        },
        Command::Map => print_map(fs),
        Command::Frag => {
            let report = fs.fragmentation_report();
            println!(
                "{}\n{}: {}\n{}: {}\n{}: {}\n{}: {:.2}\n",
                "📊 Free Space".bright_yellow().bold(),
                "Free blocks".blue(),
                report.free_blocks,
                "Fragments".blue(),
                report.fragments,
                "Largest run".blue(),
                report.largest_free_run,
                "Score".blue(),
                report.score
            );
        }
        Command::Create(name, size) => {
            let command = FsCommand::CreateFile {
                name: name.clone(),
                size_bytes: *size,
            };
            report(fs, command)?;
        }
        Command::Rm(id) => report(fs, FsCommand::DeleteFile(*id))?,
        Command::Rename(id, name) => report(fs, FsCommand::RenameFile(*id, name.clone()))?,
        Command::Mv(id, target) => {
            let Ok(target) = usize::try_from(*target) else {
                bail!("Invalid start block: {}", target);
            };
            report(fs, FsCommand::MoveFile(*id, target))?;
        }
        Command::Format => {
            let confirmed = Confirm::new()
                .with_prompt("Erase every file on the disk?")
                .default(false)
                .interact()?;
            if !confirmed {
                println!("{}", "Format cancelled.".bright_black());
                return Ok(());
            }

            println!("💾 Formatting virtual disk...");
            let pb = ProgressBar::new(FORMAT_STEPS);
            pb.set_style(
                ProgressStyle::with_template("[{bar:40.green/black}] {pos:>3}% {msg}")?
                    .progress_chars("#>-"),
            );
            format_with_progress(fs, &pb, Duration::from_millis(20));
        }
        Command::Exit => println!("{}", "👋 Exiting shell...".yellow().bold()),
    }

    Ok(())
}

// Independent of disk size.
const FORMAT_STEPS: u64 = 100;

fn format_with_progress(fs: &mut FileSystem, pb: &ProgressBar, step_delay: Duration) {
    pb.set_length(FORMAT_STEPS);
    for i in 0..=FORMAT_STEPS {
        pb.set_position(i);
        thread::sleep(step_delay);
    }
    fs.format();
    pb.finish_with_message("✅ Disk formatted successfully!");
}

/// Runs a state-changing command, then prints the block map and the
/// fragmentation score.
fn report(fs: &mut FileSystem, command: FsCommand) -> Result<()> {
    match fs.execute(command)? {
        Outcome::Created(file) => println!(
            "📝 Created {} {} at block {}",
            file.id.to_string().cyan(),
            file.name.green(),
            file.start_block
        ),
        Outcome::Deleted(file) => {
            println!("❌ Deleted {} {}", file.id.to_string().cyan(), file.name.red())
        }
        Outcome::Renamed { id, old, new } => println!(
            "✏️  Renamed {} {} → {}",
            id.to_string().cyan(),
            old,
            new.green()
        ),
        Outcome::Moved { id, from, to } => println!(
            "📦 Moved {} from block {} to block {}",
            id.to_string().cyan(),
            from,
            to
        ),
    }

    print_map(fs);
    println!("Fragmentation: {:.2}", fs.fragmentation_score());
    Ok(())
}

fn print_map(fs: &FileSystem) {
    for row in fs.render().rows {
        let cells: Vec<String> = row
            .iter()
            .map(|state| match state {
                BlockState::Used => state.marker().to_string().red().to_string(),
                BlockState::Free => state.marker().to_string().green().to_string(),
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn print_stat(file: &File) {
    println!(
        "{}\n{}: {}\n{}: {}\n{}: {} bytes\n{}: {}\n{}: {}\n",
        "📊 File Info".bright_yellow().bold(),
        "Id".blue(),
        file.id,
        "Name".blue(),
        file.name,
        "Size".blue(),
        file.size_bytes,
        "Start block".blue(),
        file.start_block,
        "Blocks".blue(),
        file.block_count
    );
}

fn print_help() {
    println!("{}", "📘 Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  create <name> <bytes>  Allocate a contiguous file
  rm <id>                Delete a file
  rename <id> <name>     Rename a file
  mv <id> <block>        Move a file to a new start block
  ls                     List files
  stat <id>              Show file info
  map                    Print the block map
  frag                   Show free-space fragmentation
  format                 Erase every file
  help                   Show this help message
  exit                   Quit the shell
"
        .bright_black()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::config::DiskConfig;

    #[test]
    fn missing_id_reports_file_not_found() {
        let mut fs = FileSystem::new(DiskConfig::default()).unwrap();
        let missing = FileId(9);

        for cmd in [
            Command::Stat(missing),
            Command::Rm(missing),
            Command::Rename(missing, "b".into()),
            Command::Mv(missing, 0),
        ] {
            let err = execute_command(&cmd, &mut fs).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<FsError>(), Some(FsError::FileNotFound(id)) if *id == missing),
                "{cmd:?} gave {err}"
            );
        }
    }

    #[test]
    fn format_progress_does_not_scale_with_disk() {
        let config = DiskConfig {
            disk_size: 1 << 24,
            block_size: 1,
            row_width: 64,
        };
        let mut fs = FileSystem::new(config).unwrap();
        fs.create_file("big", 4096).unwrap();

        let pb = ProgressBar::hidden();
        format_with_progress(&mut fs, &pb, Duration::ZERO);

        assert_eq!(pb.length(), Some(FORMAT_STEPS));
        assert_eq!(pb.position(), FORMAT_STEPS);
        assert_eq!(fs.files().count(), 0);
        assert_eq!(fs.store().free_blocks(), 1 << 24);
    }
}
