use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use pob_core::core_api::{Engine, EngineOptions, Session, UnknownOptionPolicy};
use pob_core::transport::DEFAULT_FETCH_TIMEOUT;
use pob_render::{FieldSelection, render_json_full, render_json_selected, render_summary};
use serde_json::Value as JsonValue;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["code", "url", "file"])))]
struct Cli {
    /// Export code as copied from the planner.
    #[arg(value_name = "CODE")]
    code: Option<String>,
    /// Paste link holding an export code.
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// File holding an export code; `-` reads standard input.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Paste host request timeout in seconds.
    #[arg(long, value_name = "SECS", requires = "url")]
    timeout: Option<u64>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    build: bool,
    #[arg(long = "main-skill")]
    main_skill: bool,
    #[arg(long)]
    stats: bool,
    #[arg(long)]
    skills: bool,
    #[arg(long)]
    items: bool,
    #[arg(long)]
    tree: bool,
    #[arg(long)]
    config: bool,
    /// Fail on config options this tool does not know.
    #[arg(long = "strict-config")]
    strict_config: bool,
    /// Print the decoded build re-encoded as an export code.
    #[arg(long, conflicts_with = "json")]
    reencode: bool,
    /// Raise log verbosity; repeat for more. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            build: self.build,
            main_skill: self.main_skill,
            stats: self.stats,
            skills: self.skills,
            items: self.items,
            tree: self.tree,
            config: self.config,
        }
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            unknown_options: if self.strict_config {
                UnknownOptionPolicy::Reject
            } else {
                UnknownOptionPolicy::Ignore
            },
            fetch_timeout: self
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn read_code_file(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut code = String::new();
        io::stdin().read_to_string(&mut code)?;
        Ok(code)
    } else {
        fs::read_to_string(path)
    }
}

fn open_session(cli: &Cli, engine: &Engine) -> Session {
    let opened = if let Some(url) = &cli.url {
        debug!(url = %url, "fetching build code");
        engine.open_url(url)
    } else if let Some(path) = &cli.file {
        let code = read_code_file(path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        });
        engine.open_code(&code)
    } else if let Some(code) = &cli.code {
        engine.open_code(code)
    } else {
        eprintln!("one of CODE, --url or --file is required");
        process::exit(2);
    };

    opened.unwrap_or_else(|e| {
        eprintln!("Error decoding build code:");
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn print_pairs(value: &JsonValue) {
    let Some(object) = value.as_object() else {
        return;
    };
    for (key, value) in object {
        match value {
            JsonValue::String(s) => println!("{key}={s}"),
            other => println!("{key}={other}"),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = Engine::with_options(cli.engine_options());
    let session = open_session(&cli, &engine);
    let fields = cli.field_selection();

    if cli.strict_config
        && let Err(e) = session.config()
    {
        eprintln!("Error reading config: {e}");
        process::exit(1);
    }

    if cli.reencode {
        let code = session.to_build_code().unwrap_or_else(|e| {
            eprintln!("Error encoding build code: {e}");
            process::exit(1);
        });
        println!("{code}");
        return;
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields)
        } else {
            render_json_full(&session)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        print_pairs(&render_json_selected(&session, &fields));
        return;
    }

    print!("{}", render_summary(&session));
}
