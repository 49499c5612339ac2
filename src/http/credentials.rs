//! Credential resolution for each service
//!
//! Sources, in order:
//! - the selected profile from the config file
//! - environment variables for anything the profile leaves out
//!
//! Jira resolves different secrets depending on the selected API version:
//! cloud uses e-mail + API token, server uses username + password and
//! serverPat a personal access token.

use crate::config::ProfileConfig;
use crate::connector::Service;
use crate::services::jira::JiraVersion;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::env;
use thiserror::Error;
use tracing::debug;

const RAINDROP_BASE_URL: &str = "https://api.raindrop.io/rest/v1";
const LEMLIST_BASE_URL: &str = "https://api.lemlist.com/api";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("missing credential '{field}' for {service}: set it in the profile or export {env}")]
    Missing {
        service: &'static str,
        field: &'static str,
        env: &'static str,
    },

    #[error("profile is configured for {actual}, but the operation targets {expected}")]
    WrongService {
        expected: &'static str,
        actual: &'static str,
    },
}

/// How requests are authenticated
#[derive(Clone)]
pub enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

impl Auth {
    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            Auth::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
            }
            Auth::Bearer(token) => format!("Bearer {}", token),
        }
    }

    /// Loggable description with secrets masked
    pub fn describe(&self) -> String {
        match self {
            Auth::Basic { username, password } => {
                format!("basic user={} password={}", username, mask_credential(password))
            }
            Auth::Bearer(token) => format!("bearer {}", mask_credential(token)),
        }
    }
}

/// Base URL plus authentication for one service
#[derive(Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub auth: Auth,
}

/// Mask sensitive credential values for logging
pub fn mask_credential(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Resolve the endpoint for a service from a profile and the process environment
pub fn resolve_endpoint(
    service: Service,
    profile: Option<&ProfileConfig>,
    jira_version: JiraVersion,
) -> Result<Endpoint, CredentialsError> {
    resolve_endpoint_with(service, profile, jira_version, &|key| env::var(key).ok())
}

/// Resolve the endpoint using an explicit variable lookup
pub fn resolve_endpoint_with(
    service: Service,
    profile: Option<&ProfileConfig>,
    jira_version: JiraVersion,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Endpoint, CredentialsError> {
    if let Some(profile) = profile {
        if profile.service() != service {
            return Err(CredentialsError::WrongService {
                expected: service.name(),
                actual: profile.service().name(),
            });
        }
    }

    let name = service.name();
    let pick = |from_profile: Option<&String>, field: &'static str, env_key: &'static str| {
        from_profile
            .cloned()
            .filter(|v| !v.is_empty())
            .or_else(|| lookup(env_key).filter(|v| !v.is_empty()))
            .ok_or(CredentialsError::Missing {
                service: name,
                field,
                env: env_key,
            })
    };

    let endpoint = match (service, profile) {
        (Service::Elasticsearch, p) => {
            let (url, user, pass) = match p {
                Some(ProfileConfig::Elasticsearch {
                    base_url,
                    username,
                    password,
                }) => (base_url.as_ref(), username.as_ref(), password.as_ref()),
                _ => (None, None, None),
            };
            Endpoint {
                base_url: pick(url, "base_url", "ELASTICSEARCH_URL")?,
                auth: Auth::Basic {
                    username: pick(user, "username", "ELASTICSEARCH_USERNAME")?,
                    password: pick(pass, "password", "ELASTICSEARCH_PASSWORD")?,
                },
            }
        }
        (Service::Jira, p) => {
            let empty = JiraProfile::default();
            let jira = match p {
                Some(ProfileConfig::Jira {
                    domain,
                    email,
                    api_token,
                    username,
                    password,
                    access_token,
                }) => JiraProfile {
                    domain: domain.as_ref(),
                    email: email.as_ref(),
                    api_token: api_token.as_ref(),
                    username: username.as_ref(),
                    password: password.as_ref(),
                    access_token: access_token.as_ref(),
                },
                _ => empty,
            };
            let domain = pick(jira.domain, "domain", "JIRA_DOMAIN")?;
            let auth = match jira_version {
                JiraVersion::Cloud => Auth::Basic {
                    username: pick(jira.email, "email", "JIRA_EMAIL")?,
                    password: pick(jira.api_token, "api_token", "JIRA_API_TOKEN")?,
                },
                JiraVersion::Server => Auth::Basic {
                    username: pick(jira.username, "username", "JIRA_USERNAME")?,
                    password: pick(jira.password, "password", "JIRA_PASSWORD")?,
                },
                JiraVersion::ServerPat => {
                    Auth::Bearer(pick(jira.access_token, "access_token", "JIRA_ACCESS_TOKEN")?)
                }
            };
            Endpoint {
                base_url: format!("{}/rest", domain.trim_end_matches('/')),
                auth,
            }
        }
        (Service::Raindrop, p) => {
            let token = match p {
                Some(ProfileConfig::Raindrop { access_token }) => access_token.as_ref(),
                _ => None,
            };
            Endpoint {
                base_url: RAINDROP_BASE_URL.to_string(),
                auth: Auth::Bearer(pick(token, "access_token", "RAINDROP_ACCESS_TOKEN")?),
            }
        }
        (Service::Lemlist, p) => {
            let key = match p {
                Some(ProfileConfig::Lemlist { api_key }) => api_key.as_ref(),
                _ => None,
            };
            Endpoint {
                base_url: LEMLIST_BASE_URL.to_string(),
                auth: Auth::Basic {
                    username: String::new(),
                    password: pick(key, "api_key", "LEMLIST_API_KEY")?,
                },
            }
        }
    };

    debug!(
        "Resolved {} endpoint {} ({})",
        name,
        endpoint.base_url,
        endpoint.auth.describe()
    );
    Ok(endpoint)
}

#[derive(Default)]
struct JiraProfile<'a> {
    domain: Option<&'a String>,
    email: Option<&'a String>,
    api_token: Option<&'a String>,
    username: Option<&'a String>,
    password: Option<&'a String>,
    access_token: Option<&'a String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("short"), "*****");
        assert_eq!(mask_credential("abcdefghijkl"), "abcd...ijkl");
    }

    #[test]
    fn test_basic_header_value() {
        let auth = Auth::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(auth.header_value(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_jira_cloud_from_profile() {
        let profile = ProfileConfig::Jira {
            domain: Some("https://acme.atlassian.net/".to_string()),
            email: Some("me@acme.io".to_string()),
            api_token: Some("tok".to_string()),
            username: None,
            password: None,
            access_token: None,
        };
        let endpoint = resolve_endpoint_with(
            Service::Jira,
            Some(&profile),
            JiraVersion::Cloud,
            &lookup_from(&[]),
        )
        .unwrap();
        assert_eq!(endpoint.base_url, "https://acme.atlassian.net/rest");
        assert!(matches!(endpoint.auth, Auth::Basic { ref username, .. } if username == "me@acme.io"));
    }

    #[test]
    fn test_jira_server_pat_falls_back_to_env() {
        let endpoint = resolve_endpoint_with(
            Service::Jira,
            None,
            JiraVersion::ServerPat,
            &lookup_from(&[
                ("JIRA_DOMAIN", "https://jira.internal"),
                ("JIRA_ACCESS_TOKEN", "pat-123"),
            ]),
        )
        .unwrap();
        assert_eq!(endpoint.auth.header_value(), "Bearer pat-123");
    }

    #[test]
    fn test_missing_secret_names_env_var() {
        let err = resolve_endpoint_with(
            Service::Lemlist,
            None,
            JiraVersion::Cloud,
            &lookup_from(&[]),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("LEMLIST_API_KEY"));
    }

    #[test]
    fn test_profile_for_other_service_is_rejected() {
        let profile = ProfileConfig::Raindrop {
            access_token: Some("t".to_string()),
        };
        let err = resolve_endpoint_with(
            Service::Lemlist,
            Some(&profile),
            JiraVersion::Cloud,
            &lookup_from(&[]),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CredentialsError::WrongService { .. }));
    }

    #[test]
    fn test_lemlist_uses_empty_basic_user() {
        let endpoint = resolve_endpoint_with(
            Service::Lemlist,
            None,
            JiraVersion::Cloud,
            &lookup_from(&[("LEMLIST_API_KEY", "key")]),
        )
        .unwrap();
        assert_eq!(endpoint.base_url, LEMLIST_BASE_URL);
        assert_eq!(endpoint.auth.header_value(), format!("Basic {}", STANDARD.encode(":key")));
    }
}
