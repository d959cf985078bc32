//! Storyweave terminal reader entry point.

use std::error::Error;

use clap::Parser;
use storyweave_navigation::application::engine::NavigationEngine;
use storyweave_navigation::domain::input::InputEvent;
use storyweave_navigation::domain::state::{Phase, Transition};
use storyweave_play::cli::Cli;
use storyweave_play::command::{self, Command, HELP};
use storyweave_play::render::render;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(story = %cli.story, telemetry = ?cli.telemetry_url, "starting reader");

    let engine = NavigationEngine::new(cli.story_source(), cli.telemetry(), cli.engine_config());

    println!("Type `help` for commands.\n");
    show(&engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match command::parse(&line) {
            Ok(Command::Event(event)) => event,
            Ok(Command::Help) => {
                println!("{HELP}\n");
                continue;
            }
            Ok(Command::Quit) => break,
            Err(err) => {
                println!("({err})\n");
                continue;
            }
        };

        if let InputEvent::DownloadReward(reward_id) = &event {
            match engine.download_reward(reward_id) {
                Ok(reward) => println!(
                    "Saving \"{}\" from {}\n",
                    reward.download_name(),
                    cli.asset_location(&reward.file)
                ),
                Err(rejection) => println!("({rejection})\n"),
            }
            continue;
        }

        if let Transition::Rejected(rejection) = engine.dispatch(event).await {
            debug!(%rejection, "input ignored");
            println!("({rejection})\n");
            continue;
        }
        show(&engine);

        if at_terminal_scene(&engine) {
            engine.dispatch(InputEvent::Continue).await;
            show(&engine);
        }
    }

    Ok(())
}

fn show(engine: &NavigationEngine) {
    let state = engine.state();
    let graph = engine.graph();
    println!("{}", render(&state, graph.as_deref()));
}

fn at_terminal_scene(engine: &NavigationEngine) -> bool {
    let state = engine.state();
    if state.phase != Phase::Ready {
        return false;
    }
    engine
        .graph()
        .zip(state.current_scene)
        .is_some_and(|(graph, id)| graph.scene(&id).is_some_and(|scene| scene.is_terminal()))
}
