use std::{fmt, path::PathBuf};

use voidworld_core::Facing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCoordArg {
    Absolute(i32),
    Relative(i32),
}

impl BlockCoordArg {
    pub fn resolve(self, base: i32) -> i32 {
        match self {
            Self::Absolute(v) => v,
            Self::Relative(delta) => base.saturating_add(delta),
        }
    }
}

/// Three block coordinates, each absolute or `~`-relative to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordTriple {
    pub x: BlockCoordArg,
    pub y: BlockCoordArg,
    pub z: BlockCoordArg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapTarget {
    All,
    Dimension(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Status,
    LocationCreate {
        id: String,
        kind: String,
        name_key: Option<String>,
    },
    LocationList,
    LocationInfo,
    LocationExport {
        path: Option<PathBuf>,
    },
    LocationImport {
        path: PathBuf,
    },
    LocationTp {
        id: String,
    },
    Wand {
        at: CoordTriple,
    },
    Bootstrap {
        target: BootstrapTarget,
    },
    StructureList,
    StructurePlace {
        id: String,
        at: CoordTriple,
        facing: Option<Facing>,
    },
    Undo,
    History,
    Tick {
        count: u32,
    },
    Tp {
        at: CoordTriple,
    },
    Dim {
        name: String,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

impl CommandOutput {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn error(&mut self, err: impl fmt::Display) {
        self.lines.push(format!("Error: {err}"));
    }
}

pub fn parse_command(input: &str) -> Result<ConsoleCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();
    if input.is_empty() {
        return Ok(ConsoleCommand::Help);
    }

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "help" | "?" => Ok(ConsoleCommand::Help),
        "vw" => parse_vw_command(&args),
        "tp" | "teleport" => {
            if args.len() != 3 {
                return Err(CommandError::new("Usage: /tp <x> <y> <z>"));
            }
            Ok(ConsoleCommand::Tp {
                at: parse_coords(&args)?,
            })
        }
        "dim" | "dimension" => match args.as_slice() {
            [name] => Ok(ConsoleCommand::Dim {
                name: name.to_string(),
            }),
            _ => Err(CommandError::new("Usage: /dim <dimension>")),
        },
        _ => Err(CommandError::new(format!(
            "Unknown command: {cmd}. Try /help"
        ))),
    }
}

fn parse_vw_command(args: &[&str]) -> Result<ConsoleCommand, CommandError> {
    let Some((sub, rest)) = args.split_first() else {
        return Ok(ConsoleCommand::Status);
    };
    match sub.to_ascii_lowercase().as_str() {
        "status" => Ok(ConsoleCommand::Status),
        "help" => Ok(ConsoleCommand::Help),
        "location" | "loc" => parse_location_command(rest),
        "wand" => {
            if rest.len() != 3 {
                return Err(CommandError::new("Usage: /vw wand <x> <y> <z>"));
            }
            Ok(ConsoleCommand::Wand {
                at: parse_coords(rest)?,
            })
        }
        "world" => match rest {
            [action] if action.eq_ignore_ascii_case("bootstrap") => Ok(ConsoleCommand::Bootstrap {
                target: BootstrapTarget::All,
            }),
            [action, target] if action.eq_ignore_ascii_case("bootstrap") => {
                let target = if target.eq_ignore_ascii_case("all") {
                    BootstrapTarget::All
                } else {
                    BootstrapTarget::Dimension(target.to_ascii_lowercase())
                };
                Ok(ConsoleCommand::Bootstrap { target })
            }
            _ => Err(CommandError::new("Usage: /vw world bootstrap [dimension|all]")),
        },
        "structure" => parse_structure_command(rest),
        "undo" => Ok(ConsoleCommand::Undo),
        "history" => Ok(ConsoleCommand::History),
        "tick" => {
            let count = match rest {
                [] => 1,
                [n] => parse_positive_u32(n).map_err(|_| CommandError::new("Invalid tick count"))?,
                _ => return Err(CommandError::new("Usage: /vw tick [count]")),
            };
            Ok(ConsoleCommand::Tick { count })
        }
        other => Err(CommandError::new(format!(
            "Unknown subcommand: {other}. Try /help"
        ))),
    }
}

fn parse_location_command(args: &[&str]) -> Result<ConsoleCommand, CommandError> {
    const USAGE: &str = "Usage: /vw location <create|list|info|export|import|tp>";
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::new(USAGE));
    };
    match action.to_ascii_lowercase().as_str() {
        "create" => match rest {
            [id, kind] => Ok(ConsoleCommand::LocationCreate {
                id: id.to_string(),
                kind: kind.to_string(),
                name_key: None,
            }),
            [id, kind, name_key] => Ok(ConsoleCommand::LocationCreate {
                id: id.to_string(),
                kind: kind.to_string(),
                name_key: Some(name_key.to_string()),
            }),
            _ => Err(CommandError::new(
                "Usage: /vw location create <id> <type> [nameKey]",
            )),
        },
        "list" => Ok(ConsoleCommand::LocationList),
        "info" => Ok(ConsoleCommand::LocationInfo),
        "export" => match rest {
            [] => Ok(ConsoleCommand::LocationExport { path: None }),
            [path] => Ok(ConsoleCommand::LocationExport {
                path: Some(PathBuf::from(path)),
            }),
            _ => Err(CommandError::new("Usage: /vw location export [path]")),
        },
        "import" => match rest {
            [path] => Ok(ConsoleCommand::LocationImport {
                path: PathBuf::from(path),
            }),
            _ => Err(CommandError::new("Usage: /vw location import <path>")),
        },
        "tp" => {
            if rest.is_empty() {
                return Err(CommandError::new("Usage: /vw location tp <id>"));
            }
            Ok(ConsoleCommand::LocationTp { id: rest.join(" ") })
        }
        _ => Err(CommandError::new(USAGE)),
    }
}

fn parse_structure_command(args: &[&str]) -> Result<ConsoleCommand, CommandError> {
    const USAGE: &str = "Usage: /vw structure place <id> <x> <y> <z> [facing]";
    match args.split_first() {
        Some((action, [])) if action.eq_ignore_ascii_case("list") => Ok(ConsoleCommand::StructureList),
        Some((action, rest)) if action.eq_ignore_ascii_case("place") => {
            if !(4..=5).contains(&rest.len()) {
                return Err(CommandError::new(USAGE));
            }
            let facing = match rest.get(4) {
                Some(token) => Some(token.parse::<Facing>().map_err(CommandError::new)?),
                None => None,
            };
            Ok(ConsoleCommand::StructurePlace {
                id: rest[0].to_string(),
                at: parse_coords(&rest[1..4])?,
                facing,
            })
        }
        _ => Err(CommandError::new("Usage: /vw structure <list|place>")),
    }
}

fn parse_positive_u32(s: &str) -> Result<u32, ()> {
    let value = s.parse::<u32>().map_err(|_| ())?;
    if value == 0 {
        return Err(());
    }
    Ok(value)
}

fn parse_coords(args: &[&str]) -> Result<CoordTriple, CommandError> {
    Ok(CoordTriple {
        x: parse_block_coord(args[0])?,
        y: parse_block_coord(args[1])?,
        z: parse_block_coord(args[2])?,
    })
}

fn parse_block_coord(s: &str) -> Result<BlockCoordArg, CommandError> {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix('~') {
        if rest.is_empty() {
            return Ok(BlockCoordArg::Relative(0));
        }
        let delta = rest
            .parse::<i32>()
            .map_err(|_| CommandError::new(format!("Invalid relative block coordinate: {s}")))?;
        return Ok(BlockCoordArg::Relative(delta));
    }
    let value = s
        .parse::<i32>()
        .map_err(|_| CommandError::new(format!("Invalid block coordinate: {s}")))?;
    Ok(BlockCoordArg::Absolute(value))
}

pub fn help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  /help".to_string(),
        "  /vw [status]".to_string(),
        "  /vw location create <id> <type> [nameKey]   (uses the wand selection)".to_string(),
        "  /vw location list | info | export [path] | import <path> | tp <id>".to_string(),
        "  /vw wand <x> <y> <z>        mark a selection corner (supports ~offset)".to_string(),
        "  /vw world bootstrap [dimension|all]".to_string(),
        "  /vw structure list".to_string(),
        "  /vw structure place <id> <x> <y> <z> [north|south|east|west]".to_string(),
        "  /vw undo | /vw history".to_string(),
        "  /vw tick [count]".to_string(),
        "  /tp <x> <y> <z>             (supports ~offset)".to_string(),
        "  /dim <dimension>".to_string(),
    ]
}
