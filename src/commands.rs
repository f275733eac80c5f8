use crate::approval;
use crate::config::{load_settings, resolve_vault_root, VaultPaths};
use crate::dashboard;
use crate::pipeline::{run_pipeline, RunSummary};
use crate::router::{CommandReasoner, FallbackReasoner, Reasoner};
use crate::shared::time::{now_utc, today_str};
use std::time::Duration;

const USAGE: &str = "usage: vaultkeeper <command> [options]\n\
\n\
commands:\n\
  run [--dry-run] [--vault <dir>]   one pipeline pass over the vault inbox\n\
  status [--vault <dir>]            counters and pending approvals, read-only\n\
  version                           print the crate version\n\
  help                              show this message";

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let mut iter = args.into_iter();
    let Some(command) = iter.next() else {
        return Err(USAGE.to_string());
    };
    let rest: Vec<String> = iter.collect();

    match command.as_str() {
        "run" => {
            let options = parse_options(&rest, true)?;
            run_pass(&options)
        }
        "status" => {
            let options = parse_options(&rest, false)?;
            run_status(&options)
        }
        "version" => Ok(format!("vaultkeeper {}", env!("CARGO_PKG_VERSION"))),
        "help" | "--help" | "-h" => Ok(USAGE.to_string()),
        other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    dry_run: bool,
    vault: Option<String>,
}

fn parse_options(args: &[String], allow_dry_run: bool) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dry-run" if allow_dry_run => options.dry_run = true,
            "--vault" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("--vault requires a directory\n\n{USAGE}"))?;
                options.vault = Some(value.clone());
            }
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }
    Ok(options)
}

fn vault_paths(options: &Options) -> VaultPaths {
    VaultPaths::from_vault_root(&resolve_vault_root(options.vault.as_deref()))
}

fn run_pass(options: &Options) -> Result<String, String> {
    let paths = vault_paths(options);
    let settings = load_settings(&paths).map_err(|e| e.to_string())?;

    let reasoner: Box<dyn Reasoner> = match &settings.reasoner_command {
        Some(binary) => Box::new(CommandReasoner::new(
            binary.clone(),
            Duration::from_secs(settings.reasoner_timeout_secs),
        )),
        None => Box::new(FallbackReasoner),
    };

    let summary = run_pipeline(&paths, &settings, reasoner.as_ref(), options.dry_run)
        .map_err(|e| e.to_string())?;
    Ok(render_summary(&summary, options.dry_run))
}

fn render_summary(summary: &RunSummary, dry_run: bool) -> String {
    let mode = if dry_run {
        " (dry run — no documents were modified)"
    } else {
        ""
    };
    format!(
        "Pipeline pass complete{mode}\n\
        \n\
        Processed:        {}\n\
        Pending Approval: {}\n\
        Failed:           {}\n\
        Archived:         {}",
        summary.processed, summary.pending_approval, summary.failed, summary.archived,
    )
}

fn run_status(options: &Options) -> Result<String, String> {
    let paths = vault_paths(options);
    let now = now_utc();

    let mut lines = vec![
        format!(
            "Pending tasks:     {}",
            dashboard::count_markdown_files(&paths.needs_action)
        ),
        format!(
            "Completed today:   {}",
            dashboard::count_completed_today(&paths.done, &today_str(now))
        ),
    ];

    let approvals = approval::list_pending(&paths).map_err(|e| e.to_string())?;
    lines.push(format!("Approval requests: {}", approvals.len()));
    if !approvals.is_empty() {
        lines.push(String::new());
        lines.push("file | action | risk | status | expires".to_string());
        for entry in approvals {
            let expired = if entry.expired { " (expired)" } else { "" };
            lines.push(format!(
                "{} | {} | {} | {} | {}{expired}",
                entry.file, entry.action_type, entry.risk_level, entry.status, entry.expires,
            ));
        }
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_invocation_prints_usage() {
        let err = run_cli(vec![]).expect_err("usage");
        assert!(err.contains("usage: vaultkeeper"));
    }

    #[test]
    fn unknown_command_and_option_are_rejected() {
        assert!(run_cli(vec!["frobnicate".to_string()]).is_err());
        assert!(run_cli(vec!["run".to_string(), "--frobnicate".to_string()]).is_err());
        // --dry-run is a run-only flag.
        assert!(run_cli(vec!["status".to_string(), "--dry-run".to_string()]).is_err());
    }

    #[test]
    fn version_reports_the_crate_version() {
        let output = run_cli(vec!["version".to_string()]).expect("version");
        assert_eq!(output, format!("vaultkeeper {}", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn parse_options_reads_vault_flag() {
        let options = parse_options(
            &["--vault".to_string(), "/tmp/vault".to_string()],
            false,
        )
        .expect("parse");
        assert_eq!(options.vault.as_deref(), Some("/tmp/vault"));
        assert!(!options.dry_run);
    }
}
