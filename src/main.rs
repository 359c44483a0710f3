use armature::chart::{Chart, CsvChart};
use armature::config::MotorConfig;
use armature::error::ArmatureError;
use armature::ir::Command;
use armature::motor::DcMotor;
use armature::noise::{GaussianNoise, NoiseSource};
use armature::parser;
use armature::session::SessionController;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

/// DC motor speed-current characteristic bench
///
/// Each slider move takes a fresh ammeter reading; `sample` records the
/// reading on display, so sampling twice without moving a slider records
/// the same point twice. Readouts go to stderr while the chart is on stdout.
#[derive(Parser)]
#[command(name = "armature", version)]
struct Cli {
    /// Motor nameplate file (TOML)
    #[arg(default_value = "motor-config.toml")]
    config: PathBuf,

    /// Seed for the current-reading noise
    #[arg(long)]
    seed: Option<u64>,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write chart data to a file instead of stdout
    #[arg(long)]
    chart_out: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = MotorConfig::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let noise = match cli.seed {
        Some(seed) => GaussianNoise::with_seed(config.error_sigma, seed),
        None => GaussianNoise::new(config.error_sigma),
    }
    .unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let motor = DcMotor::new(&config, noise).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let chart: Box<dyn Chart> = match &cli.chart_out {
        Some(path) => {
            let file = File::create(path).unwrap_or_else(|e| {
                eprintln!("Error creating {}: {}", path.display(), e);
                std::process::exit(1);
            });
            Box::new(CsvChart::new(io::BufWriter::new(file)))
        }
        None => Box::new(CsvChart::new(io::stdout())),
    };

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => {
            let file = File::open(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {}", path.display(), e);
                std::process::exit(1);
            });
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    // Keep stdout pure CSV when the chart is written there.
    let mut status: Box<dyn Write> = match &cli.chart_out {
        Some(_) => Box::new(io::stdout()),
        None => Box::new(io::stderr()),
    };

    let mut controller = SessionController::new(motor, chart);
    show(&controller, &mut status);

    for (line_num, line) in input.lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("Input error: {}", e);
            std::process::exit(1);
        });

        let command = match parser::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("line {}: {}", line_num + 1, e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Show => show(&controller, &mut status),
            _ => match controller.apply(command) {
                Ok(()) => {
                    if let Command::Set(..) = command {
                        show(&controller, &mut status);
                    }
                }
                Err(e @ ArmatureError::Io(_)) => {
                    eprintln!("Output error: {}", e);
                    std::process::exit(1);
                }
                Err(e) => eprintln!("line {}: {}", line_num + 1, e),
            },
        }
    }
}

fn show<N, C>(controller: &SessionController<N, C>, out: &mut dyn Write)
where
    N: NoiseSource,
    C: Chart,
{
    if let Err(e) = controller.write_status(out) {
        eprintln!("Output error: {}", e);
        std::process::exit(1);
    }
}
