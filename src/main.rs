//! Relative Layout CLI
//!
//! Usage:
//!   relative-layout [OPTIONS] [FILE]
//!
//! Options:
//!   --svg          Print an SVG preview instead of the frame list
//!   --dump         Print the root container's debug dump
//!   --lint         Report ignored or malformed configuration
//!   --strict       Fail on dependency loops and lint findings
//!   --rtl          Lay out the root container right-to-left
//!   -v             Raise log verbosity (repeatable)
//!   -h, --help     Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::LevelFilter;

use relative_layout::layout::{LayoutError, TextDirection};
use relative_layout::{render_svg, Scene, SceneError, SvgConfig};

#[derive(Parser)]
#[command(name = "relative-layout")]
#[command(about = "Lay out a relative container scene described in TOML")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Print an SVG preview of the layout
    #[arg(long)]
    svg: bool,

    /// Print the visiting order, loop nodes and chains of the root container
    #[arg(long)]
    dump: bool,

    /// Report configuration the layout ignores
    #[arg(long)]
    lint: bool,

    /// Exit with an error on dependency loops or lint findings
    #[arg(long)]
    strict: bool,

    /// Force right-to-left on the root container
    #[arg(long)]
    rtl: bool,

    /// Raise log verbosity: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let source = match read_source(cli.input.as_ref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e.format("", &filename));
            process::exit(1);
        }
    };

    let mut scene = match Scene::from_toml(&source) {
        Ok(scene) => scene.with_debug(cli.dump),
        Err(e) => {
            eprintln!("{}", e.format(&source, &filename));
            process::exit(1);
        }
    };
    if cli.rtl {
        scene = scene.with_direction(TextDirection::Rtl);
    }

    let report = scene.run();

    let warnings = if cli.lint || cli.strict {
        scene.lint()
    } else {
        Vec::new()
    };
    if cli.lint {
        for warning in &warnings {
            eprintln!("warning: {}", warning);
        }
    }

    if cli.svg {
        println!("{}", render_svg(&scene, &SvgConfig::default()));
    } else {
        for (id, frame) in scene.frames() {
            println!(
                "{}: x={} y={} w={} h={}",
                id, frame.x, frame.y, frame.width, frame.height
            );
        }
    }

    if cli.dump {
        if let Some(pattern) = scene.pattern() {
            print!("{}", pattern.dump_info());
        }
    }

    if cli.strict {
        if let Err(e) = report.into_result() {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
        if !warnings.is_empty() {
            eprintln!("Error: {}", LayoutError::lint(warnings));
            process::exit(2);
        }
    }
}

/// `RUST_LOG` wins over `-v` when set
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_source(input: Option<&PathBuf>) -> Result<String, SceneError> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.clone(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| SceneError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(buffer)
        }
    }
}
