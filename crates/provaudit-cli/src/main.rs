//! CLI entry point for provaudit.
//!
//! This module is intentionally thin: argument parsing, terminal output, and
//! exit codes. The audit workflow itself lives in the library crates.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use provaudit_app::{default_csv_destination, ExportLauncher};
use provaudit_export::{BranchResolver, FixedBranch, FALLBACK_REVISION};
use provaudit_remote::{ContentClient, GithubApi};
use provaudit_store::{AuditError, ScanStore};
use provaudit_types::{is_valid_file_url, Outcome};
use provaudit_views::{
    audit_progress, directory_files, entry_files, matched_path_suffix, ComponentRanking,
    DirectoryTree, FilterMode, FilterState, Summary, TreeState, ViewMode,
};

#[derive(Parser, Debug)]
#[command(
    name = "provaudit",
    version,
    about = "Audit workbench for open-source provenance scan results"
)]
struct Cli {
    /// Preference file location (defaults to ~/.provaudit.toml).
    #[arg(long, global = true)]
    prefs: Option<Utf8PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dataset totals and audit progress.
    Summary {
        /// Scan-result JSON file.
        result: Utf8PathBuf,
    },

    /// Directory view with filtered file counts.
    Tree {
        result: Utf8PathBuf,

        /// Visibility filter (all|matched|pending).
        #[arg(long)]
        filter: Option<FilterMode>,
    },

    /// Component ranking by matched file count.
    Rank {
        result: Utf8PathBuf,

        /// Visibility filter (matched|pending; `all` falls back to matched).
        #[arg(long)]
        filter: Option<FilterMode>,
    },

    /// File listing with status markers.
    Files {
        result: Utf8PathBuf,

        /// Restrict to a directory (its whole subtree).
        #[arg(long)]
        dir: Option<String>,

        /// Restrict to the files of one ranked component.
        #[arg(long, conflicts_with = "dir")]
        purl: Option<String>,

        #[arg(long)]
        filter: Option<FilterMode>,
    },

    /// Record an accept (identified) decision for a file.
    Accept {
        result: Utf8PathBuf,

        /// File path as it appears in the scan result.
        path: String,

        /// Optional assessment text.
        #[arg(long)]
        comment: Option<String>,
    },

    /// Record an ignore decision for a file.
    Ignore {
        result: Utf8PathBuf,
        path: String,
        #[arg(long)]
        comment: Option<String>,
    },

    /// Export the audit report as CSV.
    Export {
        result: Utf8PathBuf,

        /// Report destination (defaults to the result path with `.csv`).
        #[arg(long)]
        out: Option<Utf8PathBuf>,

        /// Skip remote branch lookups; unpinned links use the fallback
        /// revision.
        #[arg(long)]
        offline: bool,
    },

    /// Match metadata for one file, plus its content when a credential is
    /// configured.
    Show {
        result: Utf8PathBuf,
        path: String,
    },

    /// Credential maintenance.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Report whether an API key is configured.
    ApiKeyStatus,
    /// Remove the stored API key, keeping other preferences.
    ResetApiKey,
    /// Store an API key.
    SetApiKey { key: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let prefs_path = cli.prefs.clone().unwrap_or_else(provaudit_settings::default_path);

    match cli.cmd {
        Commands::Summary { result } => cmd_summary(&result),
        Commands::Tree { result, filter } => {
            cmd_tree(&result, effective_filter(&prefs_path, filter)?)
        }
        Commands::Rank { result, filter } => {
            cmd_rank(&result, effective_filter(&prefs_path, filter)?)
        }
        Commands::Files {
            result,
            dir,
            purl,
            filter,
        } => cmd_files(&result, dir, purl, effective_filter(&prefs_path, filter)?),
        Commands::Accept {
            result,
            path,
            comment,
        } => cmd_decide(&result, &path, Outcome::Identified, comment),
        Commands::Ignore {
            result,
            path,
            comment,
        } => cmd_decide(&result, &path, Outcome::Ignored, comment),
        Commands::Export {
            result,
            out,
            offline,
        } => cmd_export(&result, out, offline),
        Commands::Show { result, path } => cmd_show(&result, &path, &prefs_path),
        Commands::Config { cmd } => cmd_config(cmd, &prefs_path),
    }
}

/// `--filter` wins over the persisted preference; using it also updates the
/// preference, best effort, like the interactive filter toggle did.
fn effective_filter(
    prefs_path: &camino::Utf8Path,
    flag: Option<FilterMode>,
) -> anyhow::Result<FilterMode> {
    let mut prefs = provaudit_settings::load(prefs_path).context("load preferences")?;
    match flag {
        Some(mode) => {
            prefs.view_filter = mode.as_str().to_string();
            if let Err(err) = provaudit_settings::save(prefs_path, &prefs) {
                eprintln!("warning: preferences not saved: {err:#}");
            }
            Ok(mode)
        }
        None => Ok(prefs.view_filter.parse().unwrap_or(FilterMode::All)),
    }
}

fn load_store(result: &camino::Utf8Path) -> anyhow::Result<ScanStore> {
    ScanStore::load(result).context("load scan result")
}

fn cmd_summary(result: &camino::Utf8Path) -> anyhow::Result<()> {
    let store = load_store(result)?;
    let summary = Summary::compute(store.result());
    let progress = audit_progress(store.result());

    println!(
        "Total files: {} | Matches: {} ({} file / {} snippet) | No match: {}",
        summary.total_paths,
        summary.matched,
        summary.file_matches,
        summary.snippet_matches,
        summary.no_match
    );
    println!(
        "Pending: {} | Identified: {} | Ignored: {}",
        summary.pending, summary.accepted, summary.ignored
    );
    println!(
        "{}% done ({}/{})",
        progress.percent, progress.decided, progress.total
    );
    if !store.result().generated_with_credentials() {
        println!("Scan generated without an API key; file contents are not fetchable.");
    }
    Ok(())
}

fn cmd_tree(result: &camino::Utf8Path, filter: FilterMode) -> anyhow::Result<()> {
    let store = load_store(result)?;
    let tree = DirectoryTree::build(store.result());

    let mut state = TreeState::new();
    state.expand_all(&tree);

    for row in tree.rows(store.result(), &state, filter) {
        println!("{}{} ({})", "  ".repeat(row.depth), row.name, row.count);
    }
    Ok(())
}

fn cmd_rank(result: &camino::Utf8Path, filter: FilterMode) -> anyhow::Result<()> {
    let store = load_store(result)?;
    let state = FilterState::new(ViewMode::Ranking, filter);
    let ranking = ComponentRanking::build(store.result());

    for (entry, count) in ranking.visible(store.result(), state.filter()) {
        println!("{} ({})", entry.purl, count);
    }
    Ok(())
}

fn cmd_files(
    result: &camino::Utf8Path,
    dir: Option<String>,
    purl: Option<String>,
    filter: FilterMode,
) -> anyhow::Result<()> {
    let store = load_store(result)?;

    let entries = if let Some(purl) = purl {
        let ranking = ComponentRanking::build(store.result());
        let entry = ranking
            .entry(&purl)
            .with_context(|| format!("no ranked component: {purl}"))?;
        entry_files(store.result(), &entry.files, filter)
    } else if let Some(dir) = dir {
        let tree = DirectoryTree::build(store.result());
        if tree.find(&dir).is_none() {
            anyhow::bail!("no directory '{dir}' in the scan result");
        }
        directory_files(store.result(), &dir, filter)
    } else {
        let all: Vec<String> = store.result().files.keys().cloned().collect();
        entry_files(store.result(), &all, filter)
    };

    for entry in entries {
        println!("{} {}", entry.marker(), entry.path);
    }
    Ok(())
}

fn cmd_decide(
    result: &camino::Utf8Path,
    path: &str,
    outcome: Outcome,
    comment: Option<String>,
) -> anyhow::Result<()> {
    let mut store = load_store(result)?;

    match store.record_decision(path, outcome, comment) {
        Ok(()) => {
            let verb = match outcome {
                Outcome::Identified => "accepted",
                Outcome::Ignored => "ignored",
                Outcome::Unknown => "recorded",
            };
            println!("{path}: {verb}");
            Ok(())
        }
        Err(err @ AuditError::NoAuditableMatch { .. }) => {
            anyhow::bail!("{err}; select a file with matches to audit");
        }
        Err(err @ AuditError::Persist { .. }) => {
            // The decision is applied in memory only; without a place to
            // retry from, the CLI must fail loudly.
            anyhow::bail!("{err}; the decision is NOT saved on disk");
        }
    }
}

fn cmd_export(
    result: &camino::Utf8Path,
    out: Option<Utf8PathBuf>,
    offline: bool,
) -> anyhow::Result<()> {
    let store = load_store(result)?;
    let destination = out.unwrap_or_else(|| default_csv_destination(result));

    let resolver: Box<dyn BranchResolver + Send> = if offline {
        Box::new(FixedBranch(FALLBACK_REVISION.to_string()))
    } else {
        match GithubApi::new() {
            Ok(api) => Box::new(api),
            Err(err) => {
                eprintln!("warning: branch lookups disabled: {err}");
                Box::new(FixedBranch(FALLBACK_REVISION.to_string()))
            }
        }
    };

    let launcher = ExportLauncher::new();
    let task = launcher
        .spawn(store.snapshot(), destination.clone(), resolver)
        .context("start export")?;

    for update in task.progress().iter() {
        eprint!("\rProcessing file {} of {}...", update.processed, update.total);
    }
    eprintln!();

    let summary = task.join().context("export")?;
    println!("Exported {} rows to {}", summary.rows, summary.destination);
    Ok(())
}

fn cmd_show(
    result: &camino::Utf8Path,
    path: &str,
    prefs_path: &camino::Utf8Path,
) -> anyhow::Result<()> {
    let store = load_store(result)?;
    let Some(m) = store.result().first_valid(path) else {
        anyhow::bail!("no auditable match for '{path}'");
    };

    let component = m.purl.first().map(String::as_str).unwrap_or("-");
    println!("Type: {} | Component: {}", m.id.as_str().to_uppercase(), component);

    if !m.licenses.is_empty() {
        let names: Vec<&str> = m.licenses.iter().map(|l| l.name.as_str()).collect();
        println!("Licenses: {}", names.join(", "));
    }

    let status = m.audit_status().as_str();
    match m.latest_assessment() {
        Some(assessment) => println!("Audit: {status} ({assessment})"),
        None => println!("Audit: {status}"),
    }

    if let Some(spec) = &m.oss_lines {
        println!("Lines: {spec}");
    }
    if !m.file.is_empty() {
        println!("Upstream path: {}", m.file);
        if let Some(suffix) = matched_path_suffix(path, &m.file) {
            println!("Shared suffix: {suffix}");
        }
    }

    let prefs = provaudit_settings::load(prefs_path).context("load preferences")?;
    let Some(api_key) = prefs.api_key else {
        println!();
        println!("API key required to fetch file contents; run `provaudit config set-api-key`.");
        println!("Navigation, review, and audit decisions work without one.");
        return Ok(());
    };

    let url = m.file_url.as_deref().unwrap_or("");
    if !is_valid_file_url(url) {
        println!();
        println!("No content locator for this file; the scan ran without an API key.");
        return Ok(());
    }

    let client = ContentClient::new(api_key).context("build content client")?;
    match client.fetch(url.trim()) {
        Ok(content) => {
            println!();
            for (index, line) in content.lines().enumerate() {
                let line_no = (index + 1) as u32;
                let matched = m
                    .oss_lines
                    .as_ref()
                    .map(|spec| spec.contains_line(line_no))
                    .unwrap_or(m.id == provaudit_types::MatchKind::File);
                let marker = if matched { '>' } else { ' ' };
                println!("{marker}{line_no:4}: {line}");
            }
        }
        Err(err) => {
            // Content fetch failures degrade this file to an explanation.
            println!();
            println!("Error fetching file content: {err}");
            println!("This may indicate an invalid API key or a network problem.");
        }
    }
    Ok(())
}

fn cmd_config(cmd: ConfigCommands, prefs_path: &camino::Utf8Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::ApiKeyStatus => {
            let prefs = provaudit_settings::load(prefs_path).context("load preferences")?;
            match prefs.api_key {
                Some(key) if !key.is_empty() => {
                    println!("API key: configured ({} characters)", key.len());
                    println!("Preference file: {prefs_path}");
                }
                _ => {
                    println!("API key: not configured");
                    println!("Preference file: {prefs_path}");
                    println!("Run `provaudit config set-api-key <KEY>` to store one.");
                }
            }
        }
        ConfigCommands::ResetApiKey => {
            let mut prefs = provaudit_settings::load(prefs_path).context("load preferences")?;
            prefs.api_key = None;
            provaudit_settings::save(prefs_path, &prefs).context("save preferences")?;
            println!("API key removed from {prefs_path}");
        }
        ConfigCommands::SetApiKey { key } => {
            provaudit_settings::validate_api_key(&key)?;
            let mut prefs = provaudit_settings::load(prefs_path).context("load preferences")?;
            prefs.api_key = Some(key);
            provaudit_settings::save(prefs_path, &prefs).context("save preferences")?;
            println!("API key saved to {prefs_path}");
        }
    }
    Ok(())
}
