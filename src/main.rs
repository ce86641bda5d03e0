use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cliout::{
    console, quoted_console, ConsoleInterpreter, Interpreter, OutputMode, RenderConfig, Script,
    SharedWriter, Sink,
};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn cli() -> Command {
    Command::new("cliout")
        .about("Replay a render script through the console renderer")
        .arg(
            Arg::new("script")
                .help("Render script (JSON); reads stdin when omitted or `-`")
                .index(1),
        )
        .arg(
            Arg::new("quoted")
                .long("quoted")
                .help("Emit escaped, marker-framed records instead of plain text")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .long("verbosity")
                .help("Show messages up to this verbosity level")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON render configuration")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write to this file instead of stdout")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("prompt")
                .long("prompt")
                .help("Prompt to show before each command"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Debug logging on stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue),
        )
}

fn initialize_logging(verbose: bool, quiet: bool) -> Result<()> {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<RenderConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(verbosity) = matches.get_one::<u32>("verbosity") {
        config.verbosity = *verbosity;
    }
    if matches.get_flag("quoted") {
        config.mode = OutputMode::Quoted;
    }
    Ok(config)
}

fn load_script(path: Option<&String>) -> Result<Script> {
    match path.map(String::as_str) {
        None | Some("-") => Script::from_reader(io::stdin().lock()),
        Some(path) => Script::load(Path::new(path)),
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    })
}

/// Run every command in order. Returns whether all of them succeeded.
///
/// The interpreter is suspended even when the loop stops early, so buffered
/// output still reaches the destination.
fn drive<S: Sink>(
    interp: &mut ConsoleInterpreter<S>,
    commands: &[String],
    prompt: Option<&str>,
) -> Result<bool> {
    interp.init()?;
    interp.resume()?;

    let outcome = run_commands(interp, commands, prompt);
    let suspended = interp.suspend();
    let all_ok = outcome?;
    suspended?;
    Ok(all_ok)
}

fn run_commands<S: Sink>(
    interp: &mut ConsoleInterpreter<S>,
    commands: &[String],
    prompt: Option<&str>,
) -> Result<bool> {
    let mut all_ok = true;
    for command in commands {
        if let Some(prompt) = prompt {
            interp.display_prompt(prompt)?;
        }
        if let Err(err) = interp.exec(command) {
            // Already reported on the console's log stream.
            debug!(command = %command, "command failed: {err:#}");
            all_ok = false;
        }
    }
    Ok(all_ok)
}

fn run(matches: &ArgMatches) -> Result<bool> {
    let config = load_config(matches)?;
    let script = load_script(matches.get_one::<String>("script"))?;
    let commands: Vec<String> = script.command_lines().map(str::to_string).collect();
    let prompt = matches.get_one::<String>("prompt").map(String::as_str);
    let out = open_output(matches.get_one::<PathBuf>("output"))?;

    match config.mode {
        OutputMode::Plain => {
            let mut interp = console(out, io::stderr(), &config, script);
            drive(&mut interp, &commands, prompt)
        }
        OutputMode::Quoted => {
            let mut interp = quoted_console(SharedWriter::new(out), &config, script);
            drive(&mut interp, &commands, prompt)
        }
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    if let Err(err) = initialize_logging(matches.get_flag("verbose"), matches.get_flag("quiet")) {
        eprintln!("cliout: failed to initialize logging: {err}");
    }

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
