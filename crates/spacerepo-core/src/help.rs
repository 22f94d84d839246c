//! Contextual help for the repository commands.
//!
//! Handlers never print usage themselves: when their arguments are missing
//! they ask the [`HelpRegistry`] to run whatever callback the frontend
//! registered for that command.

use std::{collections::HashMap, fmt};

use tracing::debug;

use crate::output::OutputHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepoCommand {
    List,
    Details,
    ListFilters,
    AddFilters,
    RemoveFilters,
    SetFilters,
    ClearFilters,
    Create,
    Delete,
    Rename,
    UpdateUrl,
    UpdateSsl,
}

impl RepoCommand {
    pub const ALL: [RepoCommand; 12] = [
        Self::List,
        Self::Details,
        Self::ListFilters,
        Self::AddFilters,
        Self::RemoveFilters,
        Self::SetFilters,
        Self::ClearFilters,
        Self::Create,
        Self::Delete,
        Self::Rename,
        Self::UpdateUrl,
        Self::UpdateSsl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::List => "repo_list",
            Self::Details => "repo_details",
            Self::ListFilters => "repo_listfilters",
            Self::AddFilters => "repo_addfilters",
            Self::RemoveFilters => "repo_removefilters",
            Self::SetFilters => "repo_setfilters",
            Self::ClearFilters => "repo_clearfilters",
            Self::Create => "repo_create",
            Self::Delete => "repo_delete",
            Self::Rename => "repo_rename",
            Self::UpdateUrl => "repo_updateurl",
            Self::UpdateSsl => "repo_updatessl",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Self::List => "repo_list: List all available user repos\nusage: repo_list",
            Self::Details => {
                "repo_details: Show the details of a user repo\nusage: repo_details <repo ...>"
            }
            Self::ListFilters => {
                "repo_listfilters: Show the filters for a user repo\nusage: repo_listfilters repo"
            }
            Self::AddFilters => {
                "repo_addfilters: Add filters for a user repo\n\
                 usage: repo_addfilters repo <filter ...>\n\n\
                 Each filter starts with + (include) or - (exclude)"
            }
            Self::RemoveFilters => {
                "repo_removefilters: Remove filters from a user repo\n\
                 usage: repo_removefilters repo <filter ...>"
            }
            Self::SetFilters => {
                "repo_setfilters: Set the filters for a user repo, replacing existing ones\n\
                 usage: repo_setfilters repo <filter ...>"
            }
            Self::ClearFilters => {
                "repo_clearfilters: Clears the filters for a user repo\n\
                 usage: repo_clearfilters repo"
            }
            Self::Create => {
                "repo_create: Create a user repository\n\
                 usage: repo_create <label> <url> [options]\n\n\
                 options:\n  \
                 -t, --type TYPE  repository type (default: yum)\n  \
                 --ca DESC        SSL CA certificate description\n  \
                 --cert DESC      SSL client certificate description\n  \
                 --key DESC       SSL client key description"
            }
            Self::Delete => {
                "repo_delete: Delete a user repo\n\
                 usage: repo_delete [-y|--yes] <repo ...>\n\n\
                 Matching repos are listed and confirmed unless --yes is given"
            }
            Self::Rename => "repo_rename: Rename a user repository\nusage: repo_rename OLDLABEL NEWLABEL",
            Self::UpdateUrl => {
                "repo_updateurl: Change the URL of a user repository\nusage: repo_updateurl <repo> <url>"
            }
            Self::UpdateSsl => {
                "repo_updatessl: Change the SSL certificates of a user repository\n\
                 usage: repo_updatessl <repo> [--ca DESC] [--cert DESC] [--key DESC]\n\n\
                 Omitted descriptors are cleared"
            }
        }
    }
}

impl fmt::Display for RepoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type HelpCallback = Box<dyn Fn() + Send + Sync>;

/// Maps each command to the help callback the frontend registered for it.
#[derive(Default)]
pub struct HelpRegistry {
    callbacks: HashMap<RepoCommand, HelpCallback>,
}

impl HelpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose callbacks print each command's usage text to `out`.
    pub fn with_usage(out: OutputHandle) -> Self {
        let mut registry = Self::new();
        for cmd in RepoCommand::ALL {
            let out = out.clone();
            registry.register(cmd, move || {
                for line in cmd.usage().lines() {
                    out.print(line);
                }
            });
        }
        registry
    }

    pub fn register<F>(&mut self, cmd: RepoCommand, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.insert(cmd, Box::new(callback));
    }

    pub fn invoke(&self, cmd: RepoCommand) {
        match self.callbacks.get(&cmd) {
            Some(callback) => callback(),
            None => debug!(command = cmd.name(), "no help registered"),
        }
    }
}
