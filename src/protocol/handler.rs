use std::io::Write;

use anyhow::Result;

use crate::{ai::Opponent, core::Loc, engine::Engine};

use super::command::Command;

/// Whether the driver should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn verdict(accepted: bool) -> &'static str {
    if accepted {
        "ok"
    } else {
        "rejected"
    }
}

fn join_locs(locs: &[Loc]) -> String {
    locs.iter()
        .map(Loc::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn report_winner(engine: &Engine, out: &mut impl Write) -> Result<()> {
    if let Some(winner) = engine.winner() {
        writeln!(out, "info result winner {}", winner)?;
    }
    Ok(())
}

fn play_opponent(engine: &mut Engine, out: &mut impl Write) -> Result<()> {
    let summary = Opponent::new(engine.options.ai_spawns).play_turn(engine);
    writeln!(
        out,
        "info ai spawns {} actions {}",
        summary.spawns, summary.actions
    )?;
    report_winner(engine, out)
}

/// Play and end the turn when it belongs to the autoplay side
fn run_autoplay(engine: &mut Engine, out: &mut impl Write) -> Result<()> {
    if engine.winner().is_none() && engine.options.autoplay == Some(engine.side_to_move()) {
        play_opponent(engine, out)?;
        engine.end_turn();
        report_winner(engine, out)?;
    }
    Ok(())
}

/// Handle a protocol command. Rule violations are replied to with
/// `rejected`; malformed commands are errors.
pub fn handle_command(cmd: &str, engine: &mut Engine, out: &mut impl Write) -> Result<Flow> {
    let command: Command = cmd.parse()?;

    match command {
        Command::NewGame(seed) => {
            engine.new_game(seed.or(engine.options.seed));
            writeln!(out, "info seed {}", engine.seed())?;
            run_autoplay(engine, out)?;
        }
        Command::Show => {
            writeln!(out, "{}", engine.state)?;
        }
        Command::State => {
            writeln!(out, "{}", engine.snapshot().to_json()?)?;
        }
        Command::Shop => {
            let side = engine.side_to_move();
            let energy = engine.snapshot().players[side].energy;
            writeln!(out, "info shop {} energy {}", side, energy)?;
            for def in engine.purchasable(side) {
                writeln!(
                    out,
                    "unit {} cost {} hp {} attack {} range {} move {}",
                    def.kind, def.cost, def.hp, def.attack, def.range, def.speed
                )?;
            }
        }
        Command::Reachable(id) => {
            writeln!(out, "reachable {}", join_locs(&engine.reachable(id)))?;
        }
        Command::Targets(id) => {
            writeln!(out, "targets {}", join_locs(&engine.attack_targets(id)))?;
        }
        Command::Spawn(kind, loc) => {
            let side = engine.side_to_move();
            writeln!(out, "{}", verdict(engine.spawn(kind, loc, side)))?;
        }
        Command::Move(id, loc) => {
            writeln!(out, "{}", verdict(engine.move_unit(id, loc)))?;
        }
        Command::Attack(id, loc) => {
            let accepted = engine.attack(id, loc);
            writeln!(out, "{}", verdict(accepted))?;
            report_winner(engine, out)?;
        }
        Command::Ability(id, index, target) => {
            let accepted = engine.use_ability(id, index, target);
            writeln!(out, "{}", verdict(accepted))?;
            report_winner(engine, out)?;
        }
        Command::Target(id, index) => {
            writeln!(out, "{}", verdict(engine.begin_targeting(id, index)))?;
        }
        Command::Commit(loc) => {
            let accepted = engine.commit_targeting(loc);
            writeln!(out, "{}", verdict(accepted))?;
            report_winner(engine, out)?;
        }
        Command::Cancel => {
            engine.cancel_targeting();
            writeln!(out, "ok")?;
        }
        Command::EndTurn => {
            let over = engine.winner().is_some();
            engine.end_turn();
            writeln!(out, "{}", verdict(!over))?;
            report_winner(engine, out)?;
            run_autoplay(engine, out)?;
        }
        Command::Ai => play_opponent(engine, out)?,
        Command::SetOption(name, value) => {
            engine.set_option(&name, &value)?;
        }
        Command::IsReady => {
            writeln!(out, "readyok")?;
        }
        Command::Quit => return Ok(Flow::Quit),
    }

    out.flush()?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, GameConfig, GameState, Realm, Side, UnitKind};
    use crate::engine::EngineOptions;

    fn run(engine: &mut Engine, cmd: &str) -> String {
        let mut out = Vec::new();
        handle_command(cmd, engine, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn skirmish() -> Engine {
        let mut state = GameState::new(GameConfig::default(), Board::new());
        state
            .place_unit(UnitKind::Soldier, Side::P1, Loc::new(5, 5), Realm::Overworld)
            .unwrap();
        state
            .place_unit(UnitKind::Archer, Side::P2, Loc::new(5, 4), Realm::Overworld)
            .unwrap();
        Engine::from_state(state, EngineOptions::default())
    }

    #[test]
    fn test_commands_reply_ok_or_rejected() {
        let mut engine = skirmish();
        assert_eq!(run(&mut engine, "isready"), "readyok\n");
        assert_eq!(run(&mut engine, "attack 1 5,4"), "ok\n");
        assert_eq!(run(&mut engine, "move 2 5,3"), "rejected\n");
        assert_eq!(run(&mut engine, "targets 1"), "targets 5,4\n");
        assert_eq!(run(&mut engine, "endturn"), "ok\n");
        assert_eq!(run(&mut engine, "move 2 5,3"), "ok\n");
    }

    #[test]
    fn test_two_step_targeting() {
        let mut engine = skirmish();
        assert_eq!(run(&mut engine, "target 1 0"), "ok\n");
        assert_eq!(run(&mut engine, "commit 9,9"), "rejected\n");
        assert_eq!(run(&mut engine, "commit 5,4"), "ok\n");
        assert_eq!(engine.snapshot().unit(2).unwrap().hp, 2);
        assert_eq!(run(&mut engine, "cancel"), "ok\n");
    }

    #[test]
    fn test_setoption_and_errors() {
        let mut engine = skirmish();
        run(&mut engine, "setoption name aispawns value 1");
        assert_eq!(engine.options.ai_spawns, 1);

        let mut out = Vec::new();
        assert!(handle_command("setoption name colour value red", &mut engine, &mut out).is_err());
        assert!(handle_command("fly 1 2,2", &mut engine, &mut out).is_err());
        assert_eq!(handle_command("quit", &mut engine, &mut out).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_endturn_runs_autoplay() {
        let mut engine = skirmish();
        engine.options.autoplay = Some(Side::P2);
        let reply = run(&mut engine, "endturn");
        assert!(reply.starts_with("ok\ninfo ai spawns 0 actions 1\n"));
        assert_eq!(engine.side_to_move(), Side::P1);
        assert_eq!(engine.snapshot().unit(1).unwrap().hp, 6 - 2);
    }

    #[test]
    fn test_newgame_reports_seed() {
        let mut engine = skirmish();
        assert_eq!(run(&mut engine, "newgame 7"), "info seed 7\n");
        assert_eq!(engine.snapshot().turn, 1);
        assert!(engine.snapshot().players[Side::P1].spawner.is_some());
    }
}
