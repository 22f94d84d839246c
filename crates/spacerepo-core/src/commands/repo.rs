//! Repository commands.
//!
//! Each handler takes the raw argument string of its command. Missing
//! arguments run the command's help callback; malformed filters are logged.
//! Neither case is an `Err`: only failures of the remote service propagate.

use clap::Parser;
use tracing::{debug, error};

use crate::{
    help::RepoCommand,
    types::{NewRepo, RepoDetails, RepoFilter, SslDescriptors},
    Shell, SpaceResult,
};

const SEPARATOR: &str = "----------";

/// Returns all user repository labels in ascending order.
pub fn repo_labels(shell: &Shell) -> SpaceResult<Vec<String>> {
    let mut labels = shell
        .api()
        .list_user_repos(shell.session())?
        .into_iter()
        .map(|repo| repo.label)
        .collect::<Vec<_>>();
    labels.sort();
    Ok(labels)
}

/// Lists user repositories.
///
/// With `doreturn` the sorted labels are returned instead of printed.
pub fn repo_list(shell: &Shell, _args: &str, doreturn: bool) -> SpaceResult<Option<Vec<String>>> {
    let labels = repo_labels(shell)?;

    if doreturn {
        return Ok(Some(labels));
    }

    for label in &labels {
        shell.print(label);
    }
    Ok(None)
}

/// Labels matching any of the glob patterns in `args`, in listing order.
fn matching_labels<S: AsRef<str>>(shell: &Shell, patterns: &[S]) -> SpaceResult<Vec<String>> {
    Ok(repo_labels(shell)?
        .into_iter()
        .filter(|label| {
            patterns
                .iter()
                .any(|p| fast_glob::glob_match(p.as_ref(), label))
        })
        .collect())
}

fn print_details(shell: &Shell, details: &RepoDetails) {
    let or_none = |desc: &Option<String>| desc.clone().unwrap_or_else(|| "None".to_string());

    shell.print(&format!("Repository Label:                  {}", details.label));
    shell.print(&format!("Repository URL:                    {}", details.source_url));
    shell.print(&format!("Repository Type:                   {}", details.repo_type));
    shell.print(&format!("Repository SSL Ca Certificate:     {}", or_none(&details.ssl.ca)));
    shell.print(&format!("Repository SSL Client Certificate: {}", or_none(&details.ssl.cert)));
    shell.print(&format!("Repository SSL Client Key:         {}", or_none(&details.ssl.key)));
}

/// Shows the details of every repository matching the given patterns.
pub fn repo_details(shell: &Shell, args: &str) -> SpaceResult<()> {
    let args = args.trim();
    if args.is_empty() {
        shell.help(RepoCommand::Details);
        return Ok(());
    }

    let patterns = args.split_whitespace().collect::<Vec<_>>();
    let labels = matching_labels(shell, &patterns)?;
    if labels.is_empty() {
        shell.print(&format!("No repositories found for '{args}' query"));
        return Ok(());
    }

    for (idx, label) in labels.iter().enumerate() {
        debug!(repo = %label, "fetching repository details");
        let details = shell.api().get_repo_details(shell.session(), label)?;

        if idx > 0 {
            shell.print(SEPARATOR);
        }
        print_details(shell, &details);
    }

    Ok(())
}

pub fn repo_listfilters(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some(label) = args.split_whitespace().next() else {
        shell.help(RepoCommand::ListFilters);
        return Ok(());
    };

    let filters = shell.api().list_repo_filters(shell.session(), label)?;
    if filters.is_empty() {
        shell.print("No filters found");
        return Ok(());
    }

    for filter in &filters {
        shell.print(&filter.to_string());
    }
    Ok(())
}

/// Splits `repo <filter ...>` arguments.
///
/// Runs the help callback when there is no filter and logs the syntax error
/// for the first filter without a `+`/`-` flag; both yield `None`.
fn filter_args<'a>(
    shell: &Shell,
    cmd: RepoCommand,
    args: &'a str,
) -> Option<(&'a str, Vec<RepoFilter>)> {
    let mut tokens = args.split_whitespace();
    let label = tokens.next();
    let specs = tokens.collect::<Vec<_>>();

    let Some(label) = label.filter(|_| !specs.is_empty()) else {
        shell.help(cmd);
        return None;
    };

    match specs
        .iter()
        .map(|spec| spec.parse::<RepoFilter>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(filters) => Some((label, filters)),
        Err(err) => {
            error!("{err}");
            None
        }
    }
}

/// Adds filters one call at a time; a failure leaves earlier ones applied.
pub fn repo_addfilters(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some((label, filters)) = filter_args(shell, RepoCommand::AddFilters, args) else {
        return Ok(());
    };

    for filter in &filters {
        debug!(repo = label, filter = %filter, "adding filter");
        shell.api().add_repo_filter(shell.session(), label, filter)?;
    }
    Ok(())
}

/// Removes filters one call at a time; a failure leaves earlier ones removed.
pub fn repo_removefilters(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some((label, filters)) = filter_args(shell, RepoCommand::RemoveFilters, args) else {
        return Ok(());
    };

    for filter in &filters {
        debug!(repo = label, filter = %filter, "removing filter");
        shell
            .api()
            .remove_repo_filter(shell.session(), label, filter)?;
    }
    Ok(())
}

/// Replaces the repository's filters with the given list in a single call.
pub fn repo_setfilters(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some((label, filters)) = filter_args(shell, RepoCommand::SetFilters, args) else {
        return Ok(());
    };

    debug!(repo = label, count = filters.len(), "setting filters");
    shell
        .api()
        .set_repo_filters(shell.session(), label, &filters)
}

pub fn repo_clearfilters(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some(label) = args.split_whitespace().next() else {
        shell.help(RepoCommand::ClearFilters);
        return Ok(());
    };

    debug!(repo = label, "clearing filters");
    shell.api().clear_repo_filters(shell.session(), label)
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct CreateArgs {
    label: String,

    url: String,

    #[arg(short = 't', long = "type", default_value = "yum")]
    repo_type: String,

    #[arg(long)]
    ca: Option<String>,

    #[arg(long)]
    cert: Option<String>,

    #[arg(long)]
    key: Option<String>,
}

pub fn repo_create(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Ok(parsed) = CreateArgs::try_parse_from(args.split_whitespace()) else {
        shell.help(RepoCommand::Create);
        return Ok(());
    };

    let repo = NewRepo {
        label: parsed.label,
        url: parsed.url,
        repo_type: parsed.repo_type,
        ssl: SslDescriptors {
            ca: parsed.ca,
            cert: parsed.cert,
            key: parsed.key,
        },
    };

    debug!(
        repo = %repo.label,
        url = %repo.url,
        repo_type = %repo.repo_type,
        "creating repository"
    );
    shell.api().create_repo(shell.session(), &repo)
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct DeleteArgs {
    #[arg(short, long)]
    yes: bool,

    #[arg(required = true)]
    patterns: Vec<String>,
}

/// Deletes every repository matching the given patterns, one call each.
///
/// The matches are listed and confirmed through the shell unless `--yes` is
/// given.
pub fn repo_delete(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Ok(parsed) = DeleteArgs::try_parse_from(args.split_whitespace()) else {
        shell.help(RepoCommand::Delete);
        return Ok(());
    };

    let labels = matching_labels(shell, &parsed.patterns)?;
    if labels.is_empty() {
        shell.print(&format!(
            "No repositories found for '{}' query",
            parsed.patterns.join(" ")
        ));
        return Ok(());
    }

    if !parsed.yes {
        shell.print("Repositories to delete:");
        for label in &labels {
            shell.print(&format!("  {label}"));
        }
        if !shell.confirm("Delete these repositories?")? {
            shell.print("No repositories deleted");
            return Ok(());
        }
    }

    for label in &labels {
        debug!(repo = %label, "removing repository");
        shell.api().remove_repo(shell.session(), label)?;
    }
    Ok(())
}

/// Splits arguments that must be exactly two tokens.
fn exactly_two(args: &str) -> Option<(&str, &str)> {
    let mut tokens = args.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(first), Some(second), None) => Some((first, second)),
        _ => None,
    }
}

pub fn repo_rename(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some((label, new_label)) = exactly_two(args) else {
        shell.help(RepoCommand::Rename);
        return Ok(());
    };

    debug!(repo = label, new_label, "renaming repository");
    shell
        .api()
        .update_repo_label(shell.session(), label, new_label)
}

pub fn repo_updateurl(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Some((label, url)) = exactly_two(args) else {
        shell.help(RepoCommand::UpdateUrl);
        return Ok(());
    };

    debug!(repo = label, url, "updating repository url");
    shell.api().update_repo_url(shell.session(), label, url)
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct UpdateSslArgs {
    label: String,

    #[arg(long)]
    ca: Option<String>,

    #[arg(long)]
    cert: Option<String>,

    #[arg(long)]
    key: Option<String>,
}

pub fn repo_updatessl(shell: &Shell, args: &str) -> SpaceResult<()> {
    let Ok(parsed) = UpdateSslArgs::try_parse_from(args.split_whitespace()) else {
        shell.help(RepoCommand::UpdateSsl);
        return Ok(());
    };

    let ssl = SslDescriptors {
        ca: parsed.ca,
        cert: parsed.cert,
        key: parsed.key,
    };

    debug!(repo = %parsed.label, "updating repository ssl");
    shell
        .api()
        .update_repo_ssl(shell.session(), &parsed.label, &ssl)
}

/// Runs `cmd` with `args`. `repo_list` prints rather than returns.
pub fn dispatch(shell: &Shell, cmd: RepoCommand, args: &str) -> SpaceResult<()> {
    match cmd {
        RepoCommand::List => repo_list(shell, args, false).map(|_| ()),
        RepoCommand::Details => repo_details(shell, args),
        RepoCommand::ListFilters => repo_listfilters(shell, args),
        RepoCommand::AddFilters => repo_addfilters(shell, args),
        RepoCommand::RemoveFilters => repo_removefilters(shell, args),
        RepoCommand::SetFilters => repo_setfilters(shell, args),
        RepoCommand::ClearFilters => repo_clearfilters(shell, args),
        RepoCommand::Create => repo_create(shell, args),
        RepoCommand::Delete => repo_delete(shell, args),
        RepoCommand::Rename => repo_rename(shell, args),
        RepoCommand::UpdateUrl => repo_updateurl(shell, args),
        RepoCommand::UpdateSsl => repo_updatessl(shell, args),
    }
}
