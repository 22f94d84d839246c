use std::{collections::BTreeMap, fmt, str::FromStr};

use spacerepo_rpc::{RpcError, Value};

use crate::error::SpaceError;

/// Whether a filter includes or excludes the packages it matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterFlag {
    Include,
    Exclude,
}

impl FilterFlag {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Include),
            '-' => Some(Self::Exclude),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Include => "+",
            Self::Exclude => "-",
        }
    }
}

impl fmt::Display for FilterFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged package name pattern attached to a repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoFilter {
    pub flag: FilterFlag,
    pub filter: String,
}

impl RepoFilter {
    pub fn new(flag: FilterFlag, filter: impl Into<String>) -> Self {
        Self {
            flag,
            filter: filter.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Struct(BTreeMap::from([
            ("flag".to_string(), Value::from(self.flag.as_str())),
            ("filter".to_string(), Value::from(self.filter.as_str())),
        ]))
    }
}

/// Parses the command line form, `+pattern` or `-pattern`.
impl FromStr for RepoFilter {
    type Err = SpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let flag = chars.next().and_then(FilterFlag::from_char);
        let filter = chars.as_str();

        match flag {
            Some(flag) if !filter.is_empty() => Ok(Self::new(flag, filter)),
            _ => Err(SpaceError::InvalidFilter(s.to_string())),
        }
    }
}

impl fmt::Display for RepoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.flag, self.filter)
    }
}

impl TryFrom<&Value> for RepoFilter {
    type Error = RpcError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let flag = value.member_str("flag")?;
        let flag = match flag {
            "+" => FilterFlag::Include,
            "-" => FilterFlag::Exclude,
            other => {
                return Err(RpcError::InvalidResponse(format!(
                    "unknown filter flag '{other}'"
                )))
            }
        };
        Ok(Self::new(flag, value.member_str("filter")?))
    }
}

/// Entry of `listUserRepos`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repository {
    pub label: String,
}

impl TryFrom<&Value> for Repository {
    type Error = RpcError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(Self {
            label: value.member_str("label")?.to_string(),
        })
    }
}

/// SSL descriptions attached to a repository. `None` means unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SslDescriptors {
    pub ca: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
}

impl SslDescriptors {
    /// Parameters in API order; unset descriptors are sent as empty strings.
    pub fn to_values(&self) -> [Value; 3] {
        [&self.ca, &self.cert, &self.key].map(|desc| Value::from(desc.clone().unwrap_or_default()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoDetails {
    pub label: String,
    pub source_url: String,
    pub repo_type: String,
    pub ssl: SslDescriptors,
}

impl TryFrom<&Value> for RepoDetails {
    type Error = RpcError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let opt = |name: &str| -> Result<Option<String>, RpcError> {
            Ok(value.member_opt_str(name)?.map(str::to_string))
        };

        Ok(Self {
            label: value.member_str("label")?.to_string(),
            source_url: value.member_str("sourceUrl")?.to_string(),
            repo_type: value.member_str("type")?.to_string(),
            ssl: SslDescriptors {
                ca: opt("sslCaDesc")?,
                cert: opt("sslCertDesc")?,
                key: opt("sslKeyDesc")?,
            },
        })
    }
}

/// Parameters of `createRepo`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRepo {
    pub label: String,
    pub url: String,
    pub repo_type: String,
    pub ssl: SslDescriptors,
}
