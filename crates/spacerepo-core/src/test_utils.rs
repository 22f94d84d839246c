use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use httpmock::MockServer;
use spacerepo_rpc::{Client, ClientConfig, RpcError};
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer, Registry,
};

use crate::{
    api::SoftwareApi,
    help::{HelpRegistry, RepoCommand},
    output::CollectorSink,
    types::{NewRepo, RepoDetails, RepoFilter, Repository, SslDescriptors},
    Shell, SpaceResult,
};
use url::Url;

pub const SESSION: &str = "test-session";

/// A remote call as seen by [`FakeApi`], without the session key.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ListUserRepos,
    GetRepoDetails(String),
    ListRepoFilters(String),
    AddRepoFilter(String, RepoFilter),
    RemoveRepoFilter(String, RepoFilter),
    SetRepoFilters(String, Vec<RepoFilter>),
    ClearRepoFilters(String),
    CreateRepo(NewRepo),
    RemoveRepo(String),
    UpdateRepoLabel(String, String),
    UpdateRepoUrl(String, String),
    UpdateRepoSsl(String, SslDescriptors),
}

/// In-memory [`SoftwareApi`] that records every call.
#[derive(Default)]
pub struct FakeApi {
    pub repos: Vec<String>,
    pub details: HashMap<String, RepoDetails>,
    pub filters: Vec<RepoFilter>,
    /// Calls to this method fail with a server fault once this many
    /// successful calls to it have been made.
    pub fail_on: Option<(&'static str, usize)>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn with_repos(repos: &[&str]) -> Self {
        Self {
            repos: repos.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, session: &str, method: &'static str, call: Call) -> SpaceResult<()> {
        assert_eq!(session, SESSION);

        let mut calls = self.calls.lock().unwrap();
        let previous = calls
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(&call))
            .count();
        calls.push(call);

        match self.fail_on {
            Some((name, after)) if name == method && previous >= after => {
                Err(RpcError::Fault {
                    code: -1,
                    message: format!("{method} failed"),
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}

impl SoftwareApi for FakeApi {
    fn list_user_repos(&self, session: &str) -> SpaceResult<Vec<Repository>> {
        self.record(session, "listUserRepos", Call::ListUserRepos)?;
        Ok(self
            .repos
            .iter()
            .map(|label| {
                Repository {
                    label: label.clone(),
                }
            })
            .collect())
    }

    fn get_repo_details(&self, session: &str, label: &str) -> SpaceResult<RepoDetails> {
        self.record(session, "getRepoDetails", Call::GetRepoDetails(label.into()))?;
        self.details
            .get(label)
            .cloned()
            .ok_or_else(|| {
                RpcError::Fault {
                    code: 2850,
                    message: format!("No such repository: {label}"),
                }
                .into()
            })
    }

    fn list_repo_filters(&self, session: &str, label: &str) -> SpaceResult<Vec<RepoFilter>> {
        self.record(
            session,
            "listRepoFilters",
            Call::ListRepoFilters(label.into()),
        )?;
        Ok(self.filters.clone())
    }

    fn add_repo_filter(&self, session: &str, label: &str, filter: &RepoFilter) -> SpaceResult<()> {
        self.record(
            session,
            "addRepoFilter",
            Call::AddRepoFilter(label.into(), filter.clone()),
        )
    }

    fn remove_repo_filter(
        &self,
        session: &str,
        label: &str,
        filter: &RepoFilter,
    ) -> SpaceResult<()> {
        self.record(
            session,
            "removeRepoFilter",
            Call::RemoveRepoFilter(label.into(), filter.clone()),
        )
    }

    fn set_repo_filters(
        &self,
        session: &str,
        label: &str,
        filters: &[RepoFilter],
    ) -> SpaceResult<()> {
        self.record(
            session,
            "setRepoFilters",
            Call::SetRepoFilters(label.into(), filters.to_vec()),
        )
    }

    fn clear_repo_filters(&self, session: &str, label: &str) -> SpaceResult<()> {
        self.record(
            session,
            "clearRepoFilters",
            Call::ClearRepoFilters(label.into()),
        )
    }

    fn create_repo(&self, session: &str, repo: &NewRepo) -> SpaceResult<()> {
        self.record(session, "createRepo", Call::CreateRepo(repo.clone()))
    }

    fn remove_repo(&self, session: &str, label: &str) -> SpaceResult<()> {
        self.record(session, "removeRepo", Call::RemoveRepo(label.into()))
    }

    fn update_repo_label(&self, session: &str, label: &str, new_label: &str) -> SpaceResult<()> {
        self.record(
            session,
            "updateRepoLabel",
            Call::UpdateRepoLabel(label.into(), new_label.into()),
        )
    }

    fn update_repo_url(&self, session: &str, label: &str, url: &str) -> SpaceResult<()> {
        self.record(
            session,
            "updateRepoUrl",
            Call::UpdateRepoUrl(label.into(), url.into()),
        )
    }

    fn update_repo_ssl(
        &self,
        session: &str,
        label: &str,
        ssl: &SslDescriptors,
    ) -> SpaceResult<()> {
        self.record(
            session,
            "updateRepoSsl",
            Call::UpdateRepoSsl(label.into(), ssl.clone()),
        )
    }
}

/// Counts help callback invocations per command.
#[derive(Clone, Default)]
pub struct HelpCounter {
    counts: Arc<Mutex<HashMap<RepoCommand, Arc<AtomicUsize>>>>,
}

impl HelpCounter {
    pub fn registry(&self) -> HelpRegistry {
        let mut registry = HelpRegistry::new();
        for cmd in RepoCommand::ALL {
            let count = Arc::new(AtomicUsize::new(0));
            self.counts.lock().unwrap().insert(cmd, count.clone());
            registry.register(cmd, move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        registry
    }

    pub fn count(&self, cmd: RepoCommand) -> usize {
        self.counts
            .lock()
            .unwrap()
            .get(&cmd)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        RepoCommand::ALL.iter().map(|cmd| self.count(*cmd)).sum()
    }
}

/// A shell over `api` with collected output and counted help.
pub fn test_shell(api: Arc<FakeApi>) -> (Shell, Arc<CollectorSink>, HelpCounter) {
    let out = Arc::new(CollectorSink::default());
    let help = HelpCounter::default();
    let shell = Shell::new(api, SESSION, help.registry(), out.clone());
    (shell, out, help)
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

type Captured = Arc<Mutex<Vec<(Level, String)>>>;

struct CaptureLayer {
    events: Captured,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.message));
    }
}

/// Runs `f` and returns its result with every log message it emitted.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    let events = Captured::default();
    let subscriber = Registry::default().with(CaptureLayer {
        events: events.clone(),
    });

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = events.lock().unwrap().clone();
    (result, logs)
}

/// Messages logged at `ERROR`.
pub fn errors(logs: &[(Level, String)]) -> Vec<String> {
    logs.iter()
        .filter(|(level, _)| *level == Level::ERROR)
        .map(|(_, message)| message.clone())
        .collect()
}

/// A client for the XML-RPC endpoint of `server`.
pub fn mock_client(server: &MockServer) -> Client {
    Client::new(
        Url::parse(&server.url("/rpc/api")).unwrap(),
        &ClientConfig::default(),
    )
}
