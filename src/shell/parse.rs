use crate::fs::file::FileId;
use crate::shell::command::Command;

/// Accepts `3` or `#3`.
fn parse_id(token: &str) -> Option<FileId> {
    token.trim_start_matches('#').parse().ok().map(FileId)
}

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "help" => Some(Command::Help),
        "ls" => Some(Command::Ls),
        "map" => Some(Command::Map),
        "frag" => Some(Command::Frag),
        "stat" => args.first().and_then(|&id| parse_id(id)).map(Command::Stat),
        "rm" => args.first().and_then(|&id| parse_id(id)).map(Command::Rm),
        "create" => match args {
            [name, size] => Some(Command::Create(name.to_string(), size.parse().ok()?)),
            _ => None,
        },
        "rename" => match args {
            [id, name] => Some(Command::Rename(parse_id(id)?, name.to_string())),
            _ => None,
        },
        "mv" => match args {
            [id, block] => Some(Command::Mv(parse_id(id)?, block.parse().ok()?)),
            _ => None,
        },
        "format" => Some(Command::Format),
        "exit" => Some(Command::Exit),
        _ => None,
    }
}
