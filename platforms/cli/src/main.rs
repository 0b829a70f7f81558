use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use typing_machines::{
    compile, compile_query, render_artifact, render_graph, render_json, word_from_str, Algorithm,
    Checker, CommandChecker, MachineLoader, MachineRegistry, TuringMachine, TypingMachineError,
    Verdict,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Python,
    Json,
}

/// Compiles a Turing machine into type declarations whose subtype check runs the machine.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  typing-machines --machine palindromes --word abbabba --check mypy
  typing-machines --file machine.tm --algorithm real-time --word aabb
  cat machine.tm | typing-machines --format json")]
struct Cli {
    /// Construction to use: canonical (grigore) or real-time (roth)
    #[clap(short, long, default_value = "canonical")]
    algorithm: String,

    /// Name of a built-in machine, see --list
    #[clap(short, long, conflicts_with = "file")]
    machine: Option<String>,

    /// Path to a machine definition file (.tm). Machine text can also be piped via stdin.
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// Input word. Characters are symbols unless the word is whitespace separated.
    #[clap(short, long)]
    word: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value = "python")]
    format: OutputFormat,

    /// Write the artifact to this path instead of stdout
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Type checker to run on the artifact, e.g. mypy. Requires --word.
    #[clap(short, long, requires = "word")]
    check: Option<String>,

    /// Give up on the checker after this many seconds
    #[clap(long, requires = "check")]
    timeout: Option<u64>,

    /// List the built-in machines
    #[clap(short, long)]
    list: bool,

    /// Log debug information to stderr
    #[clap(short = 'd', long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, TypingMachineError> {
    if cli.list {
        list_machines()?;
        return Ok(ExitCode::SUCCESS);
    }

    let algorithm: Algorithm = cli.algorithm.parse()?;
    let machine = load_machine(cli)?;
    let word = cli.word.as_deref().map(word_from_str);

    let graph = compile(algorithm, &machine)?;
    let query = word
        .as_deref()
        .map(|word| compile_query(algorithm, &machine, word))
        .transpose()?;

    let artifact = match cli.format {
        OutputFormat::Json => render_json(algorithm, &graph, query.as_ref())?,
        OutputFormat::Python => match &query {
            Some(query) => render_artifact(&graph, query),
            None => render_graph(&graph),
        },
    };

    match &cli.output {
        Some(path) => write_output(path, &artifact)?,
        None if cli.check.is_none() => println!("{artifact}"),
        None => {}
    }

    let Some(program) = &cli.check else {
        return Ok(ExitCode::SUCCESS);
    };

    // The checker always receives Python, whatever was printed.
    let checked = match (&cli.format, &query) {
        (OutputFormat::Python, _) => artifact,
        (OutputFormat::Json, Some(query)) => render_artifact(&graph, query),
        (OutputFormat::Json, None) => render_graph(&graph),
    };

    let mut checker = CommandChecker::new(program);
    if let Some(seconds) = cli.timeout {
        checker = checker.with_timeout(Duration::from_secs(seconds));
    }

    let verdict = checker.check(&checked)?;
    info!(%verdict, machine = %machine.name(), "checked artifact");
    println!("{verdict}");

    Ok(match verdict {
        Verdict::Accept => ExitCode::SUCCESS,
        Verdict::Reject => ExitCode::from(1),
        Verdict::ResourceExhausted => ExitCode::from(3),
    })
}

/// Loads the machine from --machine, then --file, then stdin.
fn load_machine(cli: &Cli) -> Result<TuringMachine, TypingMachineError> {
    if let Some(name) = &cli.machine {
        MachineRegistry::get_machine_by_name(name)
    } else if let Some(path) = &cli.file {
        MachineLoader::load_machine(path)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| {
                TypingMachineError::FileError(format!("Failed to read from stdin: {}", e))
            })?;
        MachineLoader::load_machine_from_string(&buffer)
    } else {
        Err(TypingMachineError::ValidationError(format!(
            "No machine given: use --machine <{}>, --file, or pipe a definition",
            MachineRegistry::list_machine_names().join("|")
        )))
    }
}

fn list_machines() -> Result<(), TypingMachineError> {
    for index in 0..MachineRegistry::get_machine_count() {
        let info = MachineRegistry::get_machine_info(index)?;
        println!(
            "{:<14} start={} halt={} states={} transitions={} alphabet={{{}}}",
            info.name,
            info.initial_state,
            info.halting_state,
            info.state_count,
            info.transition_count,
            info.alphabet.join(", ")
        );
    }
    Ok(())
}

fn write_output(path: &Path, artifact: &str) -> Result<(), TypingMachineError> {
    std::fs::write(path, artifact).map_err(|e| {
        TypingMachineError::FileError(format!("Failed to write {}: {}", path.display(), e))
    })
}
