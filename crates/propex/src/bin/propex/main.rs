mod cli;

use propex::lookup::Environment;
use propex::property_store::{self, PropertyStore};
use propex::resolver::Resolver;
use std::io::{BufWriter, Write};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("PROPEX_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Resolve(resolve_cli) => resolve(resolve_cli),
        cli::Command::Get(get_cli) => get(get_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn resolve(cli: cli::ResolveCommand) -> anyhow::Result<()> {
    let mut store = load(&cli.input)?;
    let resolver = resolver(&cli.resolution, &store);

    resolver.resolve_all(&mut store)?;

    output(&cli.output, &store)?;
    Ok(())
}

pub fn get(cli: cli::GetCommand) -> anyhow::Result<()> {
    let mut store = load(&cli.input)?;
    let resolver = resolver(&cli.resolution, &store);

    let value = resolver.resolve(&cli.key, &mut store)?;
    println!("{value}");
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<PropertyStore> {
    if input.files.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        return Ok(stdin.parse()?);
    }

    let mut store = PropertyStore::default();

    for file_path in &input.files {
        if input.quiet {
            store.load_file_quiet(file_path)?;
        } else {
            anyhow::ensure!(
                file_path.exists(),
                "Properties file not found: {}",
                file_path.display()
            );
            store.load_file(file_path)?;
        }
    }

    Ok(store)
}

fn resolver(args: &cli::ResolutionArgs, store: &PropertyStore) -> Resolver {
    let mut resolver = Resolver::default()
        .allow_defaults(args.defaults)
        .with_system_properties(args.system_properties.iter().cloned().collect());

    // reading the environment is only worth it when something refers to it
    if store.references_environment() {
        resolver = resolver.with_environment(Environment::from_process());
    }

    resolver
}

fn output(output: &cli::OutputArgs, store: &PropertyStore) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match &output.file {
        Some(file_path) => Box::new(BufWriter::new(property_store::create_output_file(file_path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    match output.format {
        cli::OutputFormat::Properties => {
            store.write_properties(&mut writer, output.comment.as_deref())?
        }
        cli::OutputFormat::Yaml => serde_yaml::to_writer(&mut writer, store)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, store)?;
            writeln!(writer)?;
        }
    };

    writer.flush()?;
    Ok(())
}
