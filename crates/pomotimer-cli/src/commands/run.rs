use std::rc::Rc;
use std::time::Instant;

use clap::Args;
use pomotimer_core::timer::ProgressRing;
use pomotimer_core::{
    Config, Database, Input, Mode, NotificationEmitter, StatsTracker, SystemClock, TaskQueue,
    TimerController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::terminal::{PermissionPrompt, Screen, TerminalBell, TerminalNotifier};

const HELP: &str = "\
commands:
  s / <enter>        start, pause or resume
  r                  reset
  w | b | l          work, short break, long break
  m <mode> <min>     select a mode with a custom duration
  hide / show        simulate leaving and returning to the timer
  q                  quit";

#[derive(Args)]
pub struct RunArgs {
    /// Mode to start in (work, short-break, long-break)
    #[arg(long, default_value = "work")]
    mode: String,
    /// Override the configured duration for the starting mode
    #[arg(long)]
    minutes: Option<u64>,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Input(Input),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str, config: &Config) -> Command {
    let mut words = line.split_whitespace();
    let select = |mode: Mode| {
        Command::Input(Input::ModeSelected {
            mode,
            duration_min: config.minutes_for(mode),
        })
    };
    match words.next() {
        None | Some("s") | Some("start") | Some("pause") => Command::Input(Input::StartPausePressed),
        Some("r") | Some("reset") => Command::Input(Input::ResetPressed),
        Some("w") => select(Mode::Work),
        Some("b") => select(Mode::ShortBreak),
        Some("l") => select(Mode::LongBreak),
        Some("m") => {
            let mode = words.next().and_then(|m| m.parse::<Mode>().ok());
            let minutes = words.next().and_then(|m| m.parse::<u64>().ok());
            match (mode, minutes) {
                (Some(mode), Some(duration_min)) => {
                    Command::Input(Input::ModeSelected { mode, duration_min })
                }
                (Some(mode), None) => select(mode),
                _ => Command::Unknown(line.trim().to_string()),
            }
        }
        Some("hide") => Command::Input(Input::VisibilityChanged { hidden: true }),
        Some("show") => Command::Input(Input::VisibilityChanged { hidden: false }),
        Some("h") | Some("help") | Some("?") => Command::Help,
        Some("q") | Some("quit") | Some("exit") => Command::Quit,
        Some(_) => Command::Unknown(line.trim().to_string()),
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let mode: Mode = args.mode.parse()?;
    let minutes = args.minutes.unwrap_or_else(|| config.minutes_for(mode));

    let prompt = PermissionPrompt::new(config.notifications.permission);
    let emitter = NotificationEmitter::new(
        Box::new(TerminalBell),
        Box::new(TerminalNotifier::new(Rc::clone(&prompt))),
    )
    .configured(&config);

    let mut timer = TimerController::new(
        TaskQueue::new(Instant::now()),
        Box::new(SystemClock),
        StatsTracker::new(Box::new(Database::open()?)),
        emitter,
    )
    .with_ring(ProgressRing::new(config.ui.progress_radius))
    .with_mode(mode, minutes);

    let mut stdout = std::io::stdout();
    let mut screen = Screen::default();
    println!("{HELP}\n");
    screen.render(&timer.drain_events(), &mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = timer
            .scheduler()
            .next_due()
            .map(tokio::time::Instant::from_std);

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                timer.scheduler_mut().sync(Instant::now());

                if prompt.is_pending() {
                    if let Some(permission) = prompt.answer(&line) {
                        config.notifications.permission = permission;
                        if let Err(e) = config.save() {
                            warn!(error = %e, "could not remember notification permission");
                        }
                        screen.render(&timer.drain_events(), &mut stdout)?;
                        continue;
                    }
                }

                timer.handle(Input::FirstInteraction);
                match parse_command(&line, &config) {
                    Command::Input(input) => {
                        debug!(?input, "user input");
                        timer.handle(input);
                    }
                    Command::Help => println!("\n{HELP}"),
                    Command::Quit => break,
                    Command::Unknown(cmd) => println!("\nunknown command: {cmd} (h for help)"),
                }
            }
            _ = sleep_until(deadline) => {
                timer.run_due(Instant::now());
            }
        }

        screen.render(&timer.drain_events(), &mut stdout)?;
    }

    println!();
    Ok(())
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_toggles() {
        let config = Config::default();
        assert_eq!(
            parse_command("", &config),
            Command::Input(Input::StartPausePressed)
        );
        assert_eq!(
            parse_command("  s ", &config),
            Command::Input(Input::StartPausePressed)
        );
    }

    #[test]
    fn mode_shortcuts_use_configured_minutes() {
        let mut config = Config::default();
        config.schedule.short_break = 7;
        assert_eq!(
            parse_command("b", &config),
            Command::Input(Input::ModeSelected {
                mode: Mode::ShortBreak,
                duration_min: 7
            })
        );
    }

    #[test]
    fn explicit_mode_and_minutes() {
        let config = Config::default();
        assert_eq!(
            parse_command("m long-break 20", &config),
            Command::Input(Input::ModeSelected {
                mode: Mode::LongBreak,
                duration_min: 20
            })
        );
        assert_eq!(
            parse_command("m work", &config),
            Command::Input(Input::ModeSelected {
                mode: Mode::Work,
                duration_min: 25
            })
        );
        assert!(matches!(
            parse_command("m nap 3", &config),
            Command::Unknown(_)
        ));
    }

    #[test]
    fn visibility_and_quit() {
        let config = Config::default();
        assert_eq!(
            parse_command("hide", &config),
            Command::Input(Input::VisibilityChanged { hidden: true })
        );
        assert_eq!(parse_command("q", &config), Command::Quit);
        assert_eq!(parse_command("?", &config), Command::Help);
    }
}
