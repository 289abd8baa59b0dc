use std::str::FromStr;

use anyhow::{bail, ensure, Context, Error, Result};

use crate::core::{Loc, UnitId, UnitKind};

/// Strip a raw input line; blank lines carry no command
pub fn parse_command(input: &str) -> Option<&str> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    Some(input)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewGame(Option<u64>),
    Show,
    State,
    Shop,
    Reachable(UnitId),
    Targets(UnitId),
    Spawn(UnitKind, Loc),
    Move(UnitId, Loc),
    Attack(UnitId, Loc),
    Ability(UnitId, usize, Option<Loc>),
    Target(UnitId, usize),
    Commit(Loc),
    Cancel,
    EndTurn,
    Ai,
    SetOption(String, String),
    IsReady,
    Quit,
}

fn arg<'a>(args: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    args.get(index)
        .copied()
        .with_context(|| format!("Missing {}", what))
}

fn unit_arg(args: &[&str], index: usize) -> Result<UnitId> {
    arg(args, index, "unit id")?
        .parse()
        .context("Invalid unit id")
}

fn loc_arg(args: &[&str], index: usize) -> Result<Loc> {
    arg(args, index, "tile")?.parse()
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            bail!("Empty command");
        };

        let (min, max) = match name {
            "show" | "state" | "shop" | "cancel" | "endturn" | "ai" | "isready" | "quit" => (0, 0),
            "newgame" => (0, 1),
            "reachable" | "targets" | "commit" => (1, 1),
            "spawn" | "move" | "attack" | "target" => (2, 2),
            "ability" => (2, 3),
            "setoption" => (4, 4),
            _ => bail!("Unknown command: {}", name),
        };
        ensure!(
            (min..=max).contains(&args.len()),
            "Wrong number of arguments for {}",
            name
        );

        let command = match name {
            "newgame" => match args.first() {
                Some(seed) => Self::NewGame(Some(seed.parse().context("Invalid seed")?)),
                None => Self::NewGame(None),
            },
            "show" => Self::Show,
            "state" => Self::State,
            "shop" => Self::Shop,
            "reachable" => Self::Reachable(unit_arg(args, 0)?),
            "targets" => Self::Targets(unit_arg(args, 0)?),
            "spawn" => Self::Spawn(arg(args, 0, "unit kind")?.parse()?, loc_arg(args, 1)?),
            "move" => Self::Move(unit_arg(args, 0)?, loc_arg(args, 1)?),
            "attack" => Self::Attack(unit_arg(args, 0)?, loc_arg(args, 1)?),
            "ability" => {
                let index = arg(args, 1, "ability index")?
                    .parse()
                    .context("Invalid ability index")?;
                let target = args.get(2).map(|loc| loc.parse()).transpose()?;
                Self::Ability(unit_arg(args, 0)?, index, target)
            }
            "target" => Self::Target(
                unit_arg(args, 0)?,
                arg(args, 1, "ability index")?
                    .parse()
                    .context("Invalid ability index")?,
            ),
            "commit" => Self::Commit(loc_arg(args, 0)?),
            "cancel" => Self::Cancel,
            "endturn" => Self::EndTurn,
            "ai" => Self::Ai,
            "setoption" => {
                ensure!(
                    args[0] == "name" && args[2] == "value",
                    "Expected setoption name <name> value <value>"
                );
                Self::SetOption(args[1].to_string(), args[3].to_string())
            }
            "isready" => Self::IsReady,
            "quit" => Self::Quit,
            _ => bail!("Unknown command: {}", name),
        };
        Ok(command)
    }
}
