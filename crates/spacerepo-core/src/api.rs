//! The remote `channel.software` service and session handling.

use spacerepo_rpc::{Client, Value};
use tracing::debug;

use crate::{
    error::SpaceError,
    types::{NewRepo, RepoDetails, RepoFilter, Repository, SslDescriptors},
    SpaceResult,
};

/// Repository operations of the management server's software service.
///
/// Every call carries the session key obtained from `auth.login`.
pub trait SoftwareApi: Send + Sync {
    fn list_user_repos(&self, session: &str) -> SpaceResult<Vec<Repository>>;

    fn get_repo_details(&self, session: &str, label: &str) -> SpaceResult<RepoDetails>;

    fn list_repo_filters(&self, session: &str, label: &str) -> SpaceResult<Vec<RepoFilter>>;

    fn add_repo_filter(&self, session: &str, label: &str, filter: &RepoFilter) -> SpaceResult<()>;

    fn remove_repo_filter(
        &self,
        session: &str,
        label: &str,
        filter: &RepoFilter,
    ) -> SpaceResult<()>;

    fn set_repo_filters(
        &self,
        session: &str,
        label: &str,
        filters: &[RepoFilter],
    ) -> SpaceResult<()>;

    fn clear_repo_filters(&self, session: &str, label: &str) -> SpaceResult<()>;

    fn create_repo(&self, session: &str, repo: &NewRepo) -> SpaceResult<()>;

    fn remove_repo(&self, session: &str, label: &str) -> SpaceResult<()>;

    fn update_repo_label(&self, session: &str, label: &str, new_label: &str) -> SpaceResult<()>;

    fn update_repo_url(&self, session: &str, label: &str, url: &str) -> SpaceResult<()>;

    fn update_repo_ssl(&self, session: &str, label: &str, ssl: &SslDescriptors)
        -> SpaceResult<()>;
}

/// [`SoftwareApi`] over XML-RPC.
pub struct RpcSoftwareApi {
    client: Client,
}

impl RpcSoftwareApi {
    pub fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    fn call(&self, method: &str, params: &[Value]) -> SpaceResult<Value> {
        Ok(self
            .client
            .call(&format!("channel.software.{method}"), params)?)
    }
}

impl SoftwareApi for RpcSoftwareApi {
    fn list_user_repos(&self, session: &str) -> SpaceResult<Vec<Repository>> {
        let value = self.call("listUserRepos", &[session.into()])?;
        value
            .as_array()?
            .iter()
            .map(|repo| Repository::try_from(repo).map_err(SpaceError::from))
            .collect()
    }

    fn get_repo_details(&self, session: &str, label: &str) -> SpaceResult<RepoDetails> {
        let value = self.call("getRepoDetails", &[session.into(), label.into()])?;
        Ok(RepoDetails::try_from(&value)?)
    }

    fn list_repo_filters(&self, session: &str, label: &str) -> SpaceResult<Vec<RepoFilter>> {
        let value = self.call("listRepoFilters", &[session.into(), label.into()])?;
        value
            .as_array()?
            .iter()
            .map(|filter| RepoFilter::try_from(filter).map_err(SpaceError::from))
            .collect()
    }

    fn add_repo_filter(&self, session: &str, label: &str, filter: &RepoFilter) -> SpaceResult<()> {
        self.call(
            "addRepoFilter",
            &[session.into(), label.into(), filter.to_value()],
        )?;
        Ok(())
    }

    fn remove_repo_filter(
        &self,
        session: &str,
        label: &str,
        filter: &RepoFilter,
    ) -> SpaceResult<()> {
        self.call(
            "removeRepoFilter",
            &[session.into(), label.into(), filter.to_value()],
        )?;
        Ok(())
    }

    fn set_repo_filters(
        &self,
        session: &str,
        label: &str,
        filters: &[RepoFilter],
    ) -> SpaceResult<()> {
        let filters = filters.iter().map(RepoFilter::to_value).collect::<Vec<_>>();
        self.call(
            "setRepoFilters",
            &[session.into(), label.into(), filters.into()],
        )?;
        Ok(())
    }

    fn clear_repo_filters(&self, session: &str, label: &str) -> SpaceResult<()> {
        self.call("clearRepoFilters", &[session.into(), label.into()])?;
        Ok(())
    }

    fn create_repo(&self, session: &str, repo: &NewRepo) -> SpaceResult<()> {
        let [ca, cert, key] = repo.ssl.to_values();
        self.call(
            "createRepo",
            &[
                session.into(),
                repo.label.as_str().into(),
                repo.repo_type.as_str().into(),
                repo.url.as_str().into(),
                ca,
                cert,
                key,
            ],
        )?;
        Ok(())
    }

    fn remove_repo(&self, session: &str, label: &str) -> SpaceResult<()> {
        self.call("removeRepo", &[session.into(), label.into()])?;
        Ok(())
    }

    fn update_repo_label(&self, session: &str, label: &str, new_label: &str) -> SpaceResult<()> {
        self.call(
            "updateRepoLabel",
            &[session.into(), label.into(), new_label.into()],
        )?;
        Ok(())
    }

    fn update_repo_url(&self, session: &str, label: &str, url: &str) -> SpaceResult<()> {
        self.call("updateRepoUrl", &[session.into(), label.into(), url.into()])?;
        Ok(())
    }

    fn update_repo_ssl(
        &self,
        session: &str,
        label: &str,
        ssl: &SslDescriptors,
    ) -> SpaceResult<()> {
        let [ca, cert, key] = ssl.to_values();
        self.call(
            "updateRepoSsl",
            &[session.into(), label.into(), ca, cert, key],
        )?;
        Ok(())
    }
}

/// Logs in and returns the session key.
pub fn login(client: &Client, username: &str, password: &str) -> SpaceResult<String> {
    debug!(username, endpoint = %client.endpoint(), "logging in");

    let value = client
        .call("auth.login", &[username.into(), password.into()])
        .map_err(|source| {
            SpaceError::LoginFailed {
                server: client.endpoint().to_string(),
                source,
            }
        })?;

    Ok(value.as_str()?.to_string())
}

pub fn logout(client: &Client, session: &str) -> SpaceResult<()> {
    debug!("logging out");
    client.call("auth.logout", &[session.into()])?;
    Ok(())
}
