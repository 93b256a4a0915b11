use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use apollo_compiler::parser::SourceMap;
use clap::Parser;
use sdl_compiler::CancellationToken;
use sdl_compiler::Diagnostic;
use sdl_compiler::RuntimeWiring;
use sdl_compiler::SchemaGenerator;
use sdl_compiler::SchemaGeneratorOptions;
use sdl_compiler::SchemaParser;
use sdl_compiler::SchemaTypeChecker;
use sdl_compiler::TypeDefinitionRegistry;
use tracing_subscriber::EnvFilter;

/// CLI arguments. See <https://docs.rs/clap/latest/clap/_derive/index.html>
#[derive(Parser)]
struct Args {
    /// Generator options as JSON, for example `{"strict_mode": true}`
    #[arg(long, global = true)]
    options: Option<String>,

    /// Print problems as JSON, one per line
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Reports every problem in the given SDL files
    Validate {
        /// The SDL files, or `-` for stdin
        files: Vec<PathBuf>,
    },
    /// Builds a schema from the given SDL files and prints it back
    Print {
        /// The SDL files, or `-` for stdin
        files: Vec<PathBuf>,
    },
    /// Prints the JSON schema of the generator options
    OptionsSchema,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = match &args.options {
        Some(json) => serde_json::from_str::<SchemaGeneratorOptions>(json)
            .context("invalid --options")?,
        None => SchemaGeneratorOptions::default(),
    };
    match args.command {
        Command::Validate { files } => validate(&files, options, args.json),
        Command::Print { files } => print(&files, options, args.json),
        Command::OptionsSchema => {
            let schema = schemars::schema_for!(SchemaGeneratorOptions);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        io::read_to_string(io::stdin()).context("cannot read stdin")
    } else {
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
    }
}

fn parse(files: &[PathBuf]) -> anyhow::Result<TypeDefinitionRegistry> {
    let documents = files
        .iter()
        .map(|path| Ok((read_input(path)?, path.clone())))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(SchemaParser::parse_all(documents)?)
}

fn report(
    out: &mut impl Write,
    problems: &[Diagnostic],
    sources: &[SourceMap],
    json: bool,
) -> io::Result<()> {
    for problem in problems {
        if json {
            writeln!(out, "{}", problem.to_json(sources))?;
            continue;
        }
        let location = problem
            .line_column_ranges(sources)
            .first()
            .map(|range| format!("{}:{}: ", range.start.line, range.start.column))
            .unwrap_or_default();
        writeln!(out, "{location}{problem}")?;
    }
    Ok(())
}

fn validate(
    files: &[PathBuf],
    options: SchemaGeneratorOptions,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let mut registry = parse(files)?;
    registry.add_builtin_directives();
    let problems = SchemaTypeChecker::new()
        .enforce_wiring(options.enforce_wiring)
        .check_type_registry(&registry, &RuntimeWiring::default(), &CancellationToken::new())?;
    report(&mut io::stdout(), &problems, registry.sources(), json)?;
    if problems.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("found {} problem(s)", problems.len());
        Ok(ExitCode::FAILURE)
    }
}

fn print(
    files: &[PathBuf],
    options: SchemaGeneratorOptions,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let registry = parse(files)?;
    let schema = SchemaGenerator::new(options).make_unexecutable_schema(registry)?;
    report(&mut io::stderr(), schema.problems(), schema.sources(), json)?;
    print!("{schema}");
    Ok(if schema.problems().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
