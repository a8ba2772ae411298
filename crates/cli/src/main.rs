use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use impact_resolver::{
    build_index, Change, ImpactExpander, ImpactResolver, StaticSymbolService, SymbolSession,
};
use impact_syntax_index::Language;
use std::path::{Path, PathBuf};

mod input;

#[derive(Parser)]
#[command(name = "impact")]
#[command(about = "Resolve which code blocks an AST edit script affects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the affected blocks of one diff against its source file
    Resolve(ResolveArgs),

    /// Parse an edit script and print its operations and skipped sections
    Parse(ParseArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Edit script produced by the AST diff tool
    #[arg(long)]
    diff: PathBuf,

    /// Source file version the diff offsets refer to
    #[arg(long)]
    source: PathBuf,

    /// URI reported for the source file (default: file:// URI of --source)
    #[arg(long)]
    uri: Option<String>,

    /// Language override (default: detected from the --source extension)
    #[arg(long)]
    language: Option<String>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `max_hops` from the config
    #[arg(long)]
    max_hops: Option<usize>,

    /// JSON relation table used as the symbol backend
    #[arg(long, conflicts_with = "graph")]
    relations: Option<PathBuf>,

    /// Source files to build a local symbol graph from
    #[arg(long, num_args = 1..)]
    graph: Vec<PathBuf>,

    /// JSON history of previously resolved changes
    #[arg(long)]
    history: Option<PathBuf>,

    /// Append this change and its blocks to the --history file
    #[arg(long, requires = "history")]
    record: bool,

    /// Free-form description stored with the change
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Args)]
struct ParseArgs {
    /// Edit script produced by the AST diff tool
    #[arg(long)]
    diff: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Resolve(args) => run_resolve(args).await,
        Commands::Parse(args) => run_parse(&args),
    }
}

fn run_parse(args: &ParseArgs) -> Result<()> {
    let raw = input::read_text(&args.diff, "diff")?;
    let parsed = impact_edit_script::parse_with_diagnostics(&raw)
        .with_context(|| format!("Invalid edit script {}", args.diff.display()))?;
    if !parsed.skipped.is_empty() {
        log::warn!("Skipped {} malformed section(s)", parsed.skipped.len());
    }
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

async fn run_resolve(args: ResolveArgs) -> Result<()> {
    let mut config = input::load_config(args.config.as_deref())?;
    if let Some(max_hops) = args.max_hops {
        config.max_hops = max_hops;
    }

    let language = match &args.language {
        Some(name) => Language::from_name(name),
        None => Language::from_path(&args.source),
    };
    if !language.supports_ast() {
        bail!(
            "Cannot detect a supported language for {} (use --language)",
            args.source.display()
        );
    }

    let uri = match &args.uri {
        Some(uri) => uri.clone(),
        None => input::file_uri(&args.source)?,
    };
    let source = input::read_text(&args.source, "source")?;
    let diff = input::read_text(&args.diff, "diff")?;
    let mut history = input::load_history(args.history.as_deref())?;

    let index = build_index(uri.clone(), source, language, &config)
        .await
        .with_context(|| format!("Failed to index {}", args.source.display()))?;

    let root = project_root(&args.source);
    let mut expander = ImpactExpander::new(config.clone());
    let session = if let Some(path) = &args.relations {
        SymbolSession::open(root, input::load_relations(path)?, &config)
    } else if !args.graph.is_empty() {
        let backend = input::load_graph(&args.graph, &config, &mut expander).await?;
        SymbolSession::open(root, backend, &config)
    } else {
        log::debug!("No symbol backend given; transitive expansion finds nothing");
        SymbolSession::open(root, StaticSymbolService::new(), &config)
    };

    let change = Change::new(uri, diff)
        .with_description(args.description)
        .with_temporal(history.clone());
    let resolver = ImpactResolver::with_expander(expander);
    let result = resolver.resolve_change(&change, &index, &session).await;
    session.close().await;
    let report = result.with_context(|| format!("Failed to resolve {}", args.diff.display()))?;

    if report.partial {
        log::warn!("Symbol service failed; transitive impact is incomplete");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.record {
        if let Some(path) = &args.history {
            history.record(change, report.blocks);
            input::save_history(path, &history)?;
        }
    }

    Ok(())
}

fn project_root(source: &Path) -> PathBuf {
    source
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
