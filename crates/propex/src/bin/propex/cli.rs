//! propex cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; propex ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve all properties and print them
    ///
    /// Reads properties from stdin unless any file is provided (via --input-file)
    Resolve(ResolveCommand),

    /// Resolve a single property and print its value
    Get(GetCommand),
}

#[derive(Parser, Debug)]
pub struct ResolveCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolution: ResolutionArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolution: ResolutionArgs,

    /// Property key, may contain placeholders itself
    pub key: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a .properties, .yml or .yaml file
    ///
    /// Can be specified multiple times. Later files override
    /// properties of earlier ones.
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Skip input files that do not exist
    #[clap(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(Parser, Debug)]
pub struct ResolutionArgs {
    /// Enable ${key:default} syntax
    #[clap(long = "defaults")]
    pub defaults: bool,

    /// Add a system property (KEY=VALUE)
    ///
    /// System properties are consulted for placeholders
    /// the loaded properties do not define.
    #[clap(short = 'D', long = "system-property", value_parser = parse_key_value)]
    pub system_properties: Vec<(String, String)>,
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{arg}`"))
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    ///
    /// Missing parent directories are created.
    #[arg(short = 'o', long = "output-file")]
    pub file: Option<PathBuf>,

    /// Start properties output with a comment header
    ///
    /// Defaults to "Properties" when given without text. Ignored for json and yaml.
    #[arg(long = "comment", num_args = 0..=1, default_missing_value = "Properties")]
    pub comment: Option<String>,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Properties,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Properties => f.write_str("properties"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolve_command(args: &[&str]) -> ResolveCommand {
        let cli = Cli::try_parse_from(["propex", "resolve"].iter().chain(args)).expect("valid args");
        match cli.command {
            Command::Resolve(resolve) => resolve,
            Command::Get(_) => panic!("expected resolve"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn output_file_and_comment() {
        let resolve = resolve_command(&["-o", "target/out.properties", "--comment"]);
        assert_eq!(resolve.output.file, Some(PathBuf::from("target/out.properties")));
        assert_eq!(resolve.output.comment.as_deref(), Some("Properties"));

        let resolve = resolve_command(&["--comment", "generated"]);
        assert_eq!(resolve.output.file, None);
        assert_eq!(resolve.output.comment.as_deref(), Some("generated"));

        let resolve = resolve_command(&[]);
        assert_eq!(resolve.output.comment, None);
    }

    #[test]
    fn system_properties() {
        let resolve = resolve_command(&["-D", "a=1", "-D", "b=x=y", "--defaults"]);
        assert!(resolve.resolution.defaults);
        assert_eq!(
            resolve.resolution.system_properties,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "x=y".to_string())]
        );

        assert!(Cli::try_parse_from(["propex", "resolve", "-D", "novalue"]).is_err());
    }
}
