mod test_runner;

use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use converter::{ConvertError, Generator, Options, Strategy};
use nsc::digits::{DEFAULT_BLOCK_CAPACITY, StoreConfig};
use nsc::parser::DEFAULT_CHUNK_SIZE;

const SUBCOMMANDS: &[&str] = &["convert", "generate", "test", "help"];

#[derive(Parser)]
#[command(
    name = "nsc",
    version,
    about = "Convert arbitrarily large numbers between bases 2-36"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a `[digits]base1=base2` request (the default)
    Convert(ConvertArgs),

    /// Generate a random conversion request
    Generate(GenerateArgs),

    /// Run .case files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// File holding the request; standard input when omitted or `-`
    input: Option<PathBuf>,

    /// Digits stored per block
    #[arg(long, default_value_t = DEFAULT_BLOCK_CAPACITY)]
    block_size: usize,

    /// Bytes requested per read
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Fail with an out-of-memory error once a number needs more blocks than this
    #[arg(long)]
    max_blocks: Option<usize>,

    /// Use the universal converter even for power-related bases
    #[arg(long)]
    universal: bool,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Base of the generated digits
    from_base: u32,

    /// Base requested in the generated request
    to_base: u32,

    /// Number of digits to generate
    count: u64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .case file or a directory containing them
    path: String,

    /// Run only cases in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `nsc < request` and `nsc file` behave like `nsc convert ...`.
    let mut args: Vec<String> = std::env::args().collect();
    let has_subcommand = args
        .iter()
        .skip(1)
        .any(|a| SUBCOMMANDS.contains(&a.as_str()));
    let asks_for_info = args
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "-h" | "--help" | "-V" | "--version"));
    if !has_subcommand && !asks_for_info {
        args.insert(1, "convert".to_string());
    }

    let cli = Cli::parse_from(&args);

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::builder().filter_level(log_level).init();

    match cli.command {
        Command::Convert(convert_args) => do_convert(convert_args, cli.no_color),
        Command::Generate(generate_args) => do_generate(generate_args),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_convert(args: ConvertArgs, no_color: bool) {
    let options = Options {
        store: StoreConfig {
            block_capacity: args.block_size,
            max_blocks: args.max_blocks,
        },
        chunk_size: args.chunk_size,
        strategy: if args.universal {
            Strategy::Universal
        } else {
            Strategy::Auto
        },
        drain_trailing: true,
    };
    debug!("convert options: {:?}", options);

    let reader: Box<dyn Read> = match args.input.as_deref() {
        None => Box::new(io::stdin().lock()),
        Some(path) if path == Path::new("-") => Box::new(io::stdin().lock()),
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                let error = ConvertError::Parse(nsc::parser::ParseError::Read(e));
                emit_error(&error, no_color);
                process::exit(error.exit_code());
            }
        },
    };

    let stdout = io::stdout().lock();
    if let Err(error) = converter::execute(reader, BufWriter::new(stdout), &options) {
        emit_error(&error, no_color);
        process::exit(error.exit_code());
    }
}

fn do_generate(args: GenerateArgs) {
    let generator = match Generator::new(args.from_base, args.to_base, args.count) {
        Ok(g) => g,
        Err(error) => {
            eprintln!("{}", error.message());
            debug!("{}", error);
            process::exit(error.exit_code());
        }
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut out = BufWriter::new(io::stdout().lock());
    if let Err(e) = generator.write_to(&mut out, &mut rng) {
        let error = converter::GenerateError::from(e);
        eprintln!("{}", error.message());
        debug!("{}", error);
        process::exit(error.exit_code());
    }
}

fn emit_error(error: &ConvertError, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let files: SimpleFiles<String, String> = SimpleFiles::new();
    let diagnostic = error.to_diagnostic();
    if term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic).is_err() {
        eprintln!("{}", error.kind().message());
    }
}
