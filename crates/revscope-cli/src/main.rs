#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use revscope_core::config::SharedConfig;
use revscope_core::git::LocalGitBackend;
use revscope_core::http::HttpIndexClient;
use revscope_core::patterns::exactly_one_repo;
use revscope_core::store::{Catalog, MemoryRepoStore, StaticIndex, StaticSearchContexts};
use revscope_core::traits::IndexBackend;
use revscope_core::{
    search_limits, Options, QueryParams, Resolved, Resolver, Settings, SiteConfig, YesNoOnly,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "revscope", version, about = "Repository and revision scope resolution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Resolve the repositories and revisions a query searches
    Resolve(ResolveArgs),
    /// Print the effective search limits
    Limits(LimitsArgs),
}

#[derive(clap::Args)]
struct ResolveArgs {
    /// Include patterns, optionally `pattern@rev1:rev2` (comma-separated)
    #[arg(short = 'r', long = "repo", env = "REVSCOPE_REPO", value_delimiter = ',')]
    repos: Vec<String>,

    /// Exclude patterns (comma-separated)
    #[arg(long, env = "REVSCOPE_EXCLUDE", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Repo groups from the settings file (comma-separated)
    #[arg(long = "repo-group", env = "REVSCOPE_REPO_GROUP", value_delimiter = ',')]
    repo_groups: Vec<String>,

    /// Search context: global, @user or @user/name
    #[arg(long, env = "REVSCOPE_CONTEXT", default_value = "")]
    context: String,

    /// Version context name from the site configuration
    #[arg(long, env = "REVSCOPE_VERSION_CONTEXT", default_value = "")]
    version_context: String,

    /// Keep only revisions with a commit after this time
    #[arg(long, env = "REVSCOPE_COMMIT_AFTER")]
    commit_after: Option<String>,

    /// Forks: yes, no or only (default: no, unless one repository is named)
    #[arg(long, env = "REVSCOPE_FORK")]
    fork: Option<String>,

    /// Archived repositories: yes, no or only
    #[arg(long, env = "REVSCOPE_ARCHIVED")]
    archived: Option<String>,

    /// Visibility: any, public or private
    #[arg(long, env = "REVSCOPE_VISIBILITY", default_value = "any")]
    visibility: String,

    /// Maximum number of repositories (0: configured limit)
    #[arg(long, env = "REVSCOPE_LIMIT", default_value_t = 0)]
    limit: usize,

    /// Order repositories by stars
    #[arg(long, env = "REVSCOPE_RANKED")]
    ranked: bool,

    /// The query is a `type:repo` query
    #[arg(long, env = "REVSCOPE_TYPE_REPO")]
    type_repo: bool,

    /// Site configuration file (JSON or YAML)
    #[arg(long, env = "REVSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// User settings file (JSON or YAML)
    #[arg(long, env = "REVSCOPE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Repository catalog file (JSON or YAML)
    #[arg(long, env = "REVSCOPE_CATALOG")]
    catalog: PathBuf,

    /// Directory holding the git repositories (default: current directory)
    #[arg(long, env = "REVSCOPE_GIT_ROOT")]
    git_root: Option<PathBuf>,

    /// Base URL of the code index (default: the catalog's indexed list)
    #[arg(long, env = "REVSCOPE_INDEX_URL")]
    index_url: Option<String>,

    /// Output format: json or text
    #[arg(long, env = "REVSCOPE_OUTPUT_FORMAT", default_value = "text")]
    output_format: String,
}

#[derive(clap::Args)]
struct LimitsArgs {
    /// Site configuration file (JSON or YAML)
    #[arg(long, env = "REVSCOPE_CONFIG")]
    config: Option<PathBuf>,
}

/// Output format for the CLI
enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Resolve(args) => run_resolve(args),
        Commands::Limits(args) => run_limits(args),
    };
    std::process::exit(code);
}

/// Filter empty strings (env vars may produce [""] for empty values)
fn clean_vec(v: Vec<String>) -> Vec<String> {
    v.into_iter().filter(|s| !s.is_empty()).collect()
}

fn parse_yes_no_only(flag: &str, value: Option<&str>) -> Result<Option<YesNoOnly>, String> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => YesNoOnly::parse(v)
            .map(Some)
            .ok_or_else(|| format!("invalid --{flag} value {v:?} (expected yes, no or only)")),
    }
}

fn load_config(path: Option<&PathBuf>) -> revscope_core::Result<SiteConfig> {
    let config = match path {
        Some(path) => SiteConfig::from_path(path)?,
        None => SiteConfig::default(),
    };
    Ok(config.apply_env())
}

fn build_options(args: &ResolveArgs) -> Result<Options, String> {
    let repo_filters = clean_vec(args.repos.clone());

    let fork = parse_yes_no_only("fork", args.fork.as_deref())?;
    let archived = parse_yes_no_only("archived", args.archived.as_deref())?;

    // Unset means "no", except when a single repository is named exactly.
    let hide_by_default = !exactly_one_repo(&repo_filters);
    let (no_forks, only_forks) = match fork {
        Some(YesNoOnly::Yes) => (false, false),
        Some(YesNoOnly::No) => (true, false),
        Some(YesNoOnly::Only) => (false, true),
        None => (hide_by_default, false),
    };
    let (no_archived, only_archived) = match archived {
        Some(YesNoOnly::Yes) => (false, false),
        Some(YesNoOnly::No) => (true, false),
        Some(YesNoOnly::Only) => (false, true),
        None => (hide_by_default, false),
    };

    let (only_public, only_private) = match args.visibility.to_ascii_lowercase().as_str() {
        "" | "any" => (false, false),
        "public" => (true, false),
        "private" => (false, true),
        other => {
            return Err(format!(
                "invalid --visibility value {other:?} (expected any, public or private)"
            ))
        }
    };

    Ok(Options {
        repo_filters,
        minus_repo_filters: clean_vec(args.exclude.clone()),
        repo_group_filters: clean_vec(args.repo_groups.clone()),
        search_context_spec: args.context.clone(),
        version_context_name: args.version_context.clone(),
        user_settings: None,
        no_forks,
        only_forks,
        no_archived,
        only_archived,
        commit_after: args.commit_after.clone().filter(|s| !s.is_empty()),
        only_private,
        only_public,
        ranked: args.ranked,
        limit: args.limit,
        query: Some(QueryParams {
            fork,
            archived,
            type_repo: args.type_repo,
        }),
    })
}

fn run_resolve(args: ResolveArgs) -> i32 {
    let mut op = match build_options(&args) {
        Ok(op) => op,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return 2;
        }
    };

    let setup = (|| {
        let config = load_config(args.config.as_ref())?;
        let catalog = Catalog::from_path(&args.catalog)?;
        let settings = args.settings.as_ref().map(Settings::from_path).transpose()?;
        Ok::<_, revscope_core::Error>((config, catalog, settings))
    })();
    let (config, catalog, settings) = match setup {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    op.user_settings = settings;

    let git_root = args
        .git_root
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build();
    let rt = match rt {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {e}");
            return 1;
        }
    };

    let collaborators = Collaborators {
        store: MemoryRepoStore::from_catalog(&catalog),
        contexts: StaticSearchContexts::from_catalog(&catalog),
        vcs: LocalGitBackend::new(git_root),
        config: SharedConfig::new(config),
    };

    let result = rt.block_on(async {
        match args.index_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => collaborators.resolve(&HttpIndexClient::new(url), &op).await,
            None => {
                collaborators
                    .resolve(&StaticIndex::from_catalog(&catalog), &op)
                    .await
            }
        }
    });

    let resolved = match result {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {e}");
            return if e.is_bad_request() { 2 } else { 1 };
        }
    };

    match OutputFormat::parse(&args.output_format) {
        OutputFormat::Json => write_json_output(&resolved),
        OutputFormat::Text => write_text_output(&resolved),
    }
    0
}

/// Everything a resolution needs except the index
struct Collaborators {
    store: MemoryRepoStore,
    contexts: StaticSearchContexts,
    vcs: LocalGitBackend,
    config: SharedConfig,
}

impl Collaborators {
    async fn resolve<I: IndexBackend>(
        &self,
        index: &I,
        op: &Options,
    ) -> revscope_core::Result<Resolved> {
        Resolver::new(&self.store, &self.vcs, index, &self.contexts, &self.config)
            .resolve(op)
            .await
    }
}

fn run_limits(args: LimitsArgs) -> i32 {
    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let limits = search_limits(&config);
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = serde_json::to_writer_pretty(&mut lock, &limits);
    let _ = writeln!(lock);
    0
}

/// Write the resolution as JSON to stdout
fn write_json_output(resolved: &Resolved) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = serde_json::to_writer(&mut lock, resolved);
    let _ = writeln!(lock);
}

/// Write human-readable text to stdout
fn write_text_output(resolved: &Resolved) {
    let stdout = std::io::stdout();
    let mut w = stdout.lock();

    let _ = writeln!(w, "Repositories: {}", resolved.repo_revs.len());
    for rr in &resolved.repo_revs {
        let revs: Vec<String> = rr.revs.iter().map(display_rev).collect();
        let _ = writeln!(w, "  {} @ {}", rr.repo.name, revs.join(", "));
    }

    if !resolved.missing_repo_revs.is_empty() {
        let _ = writeln!(w, "\nMissing ({}):", resolved.missing_repo_revs.len());
        for rr in &resolved.missing_repo_revs {
            let revs: Vec<String> = rr.revs.iter().map(display_rev).collect();
            let _ = writeln!(w, "  {} @ {}", rr.repo.name, revs.join(", "));
        }
    }

    let excluded = resolved.excluded_repos;
    if excluded.forks > 0 || excluded.archived > 0 {
        let _ = writeln!(
            w,
            "\nExcluded: {} forks, {} archived",
            excluded.forks, excluded.archived
        );
    }
    if resolved.over_limit {
        let _ = writeln!(w, "\nMore repositories matched than the limit allows");
    }
}

fn display_rev(rev: &revscope_core::RevisionSpecifier) -> String {
    if rev.is_default() {
        "HEAD".to_string()
    } else {
        rev.to_string()
    }
}
