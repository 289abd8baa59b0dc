use std::io::{self, BufRead};

use clap::Parser;
use nexus::{
    core::{GameConfig, Side},
    protocol::{handle_command, parse_command, Flow},
    Engine, EngineOptions,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Seed for map generation
    #[arg(long)]
    seed: Option<u64>,
    /// Side played by the built-in opponent (1 or 2)
    #[arg(long)]
    autoplay: Option<Side>,
    /// Exit on the first malformed command
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!("Nexus - tactics engine");

    let options = EngineOptions::new(cli.seed, cli.strict, cli.autoplay);
    let mut engine = Engine::with_options(GameConfig::default(), options);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for input in stdin.lock().lines().map_while(Result::ok) {
        let Some(cmd) = parse_command(&input) else {
            continue;
        };

        match handle_command(cmd, &mut engine, &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => {
                eprintln!("{:#}", err);
                if engine.options.strict_mode {
                    std::process::exit(1);
                }
            }
        }
    }
}
