use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rtttl::clock::SystemClock;
use rtttl::header::{title_bounded, title_with_limit};
use rtttl::settings::parse_style;
use rtttl::tone::LogTone;
use rtttl::{decode_melody, songs, Completion, MelodySource, PlayerSettings, Sequencer};

/// Room for the title in the "Now playing" line
const TITLE_CAPACITY: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "rtttl", version, about = "Play RTTTL and RTX melodies")]
struct Args {
    /// Melody file in RTTTL or RTX format
    #[arg(required_unless_present_any = ["builtin", "random", "list"])]
    file: Option<PathBuf>,

    /// Play a built-in melody by title
    #[arg(long, conflicts_with_all = ["file", "random"])]
    builtin: Option<String>,

    /// Play a random built-in melody
    #[arg(long, conflicts_with = "file")]
    random: bool,

    /// List the built-in melodies
    #[arg(long)]
    list: bool,

    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of passes, 0 for forever
    #[arg(long)]
    loops: Option<u32>,

    /// Default style: S, N, C or a divisor
    #[arg(long)]
    style: Option<String>,

    /// Hold the output high while silent
    #[arg(long)]
    inverted: bool,

    /// Print the title and exit
    #[arg(long)]
    title_only: bool,

    /// Print the decoded melody as JSON and exit
    #[arg(long, conflicts_with = "title_only")]
    dump: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.list {
        for name in songs::titles() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut settings = match &args.config {
        Some(path) => PlayerSettings::from_file(path)?,
        None => PlayerSettings::default(),
    };
    if let Some(loops) = args.loops {
        settings.loops = Some(loops);
    }
    if let Some(style) = &args.style {
        settings.default_style = parse_style(style)?;
    }
    if args.inverted {
        settings.tone_pin_inverted = true;
    }

    if args.random && !args.title_only && !args.dump {
        let mut sequencer = Sequencer::with_settings(LogTone, SystemClock::new(), settings);
        let name = sequencer.start_random(songs::SAMPLES, &mut rand::thread_rng(), Completion::none())?;
        println!("Now playing: {}", name);
        while sequencer.advance() {
            thread::sleep(Duration::from_millis(1));
        }
        return Ok(());
    }

    let file_text;
    let stored: &'static str;
    let source = if let Some(path) = &args.file {
        file_text = fs::read_to_string(path)?.trim().to_string();
        MelodySource::from(file_text.as_str())
    } else {
        stored = match &args.builtin {
            Some(name) => songs::find(name).ok_or_else(|| format!("No built-in melody named '{}'", name))?,
            None => songs::choose(songs::SAMPLES, &mut rand::thread_rng()).copied().ok_or("No built-in melodies")?,
        };
        MelodySource::Store(&stored)
    };

    if args.title_only {
        println!("{}", title_with_limit(&source, settings.max_header_len)?);
        return Ok(());
    }

    if args.dump {
        let melody = decode_melody(source, &settings.header_options())?;
        println!("{}", serde_json::to_string_pretty(&melody)?);
        return Ok(());
    }

    let mut sequencer = Sequencer::with_settings(LogTone, SystemClock::new(), settings);
    println!("Now playing: {}", title_bounded(&source, TITLE_CAPACITY));
    sequencer.play_blocking(source)?;
    Ok(())
}
