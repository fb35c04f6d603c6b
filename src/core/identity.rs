//! Host and actor captured on every entry

/// Environment variables consulted for the host name, in order.
pub const HOST_ENV_VARS: [&str; 2] = ["HOSTNAME", "COMPUTERNAME"];

/// Environment variables consulted for the acting user, in order.
pub const ACTOR_ENV_VARS: [&str; 2] = ["USER", "USERNAME"];

pub const UNKNOWN_HOST: &str = "localhost";
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Who and where, resolved once per provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub host: String,
    pub actor: String,
}

impl ProcessIdentity {
    pub fn new(host: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            actor: actor.into(),
        }
    }

    /// Resolve from the process environment
    pub fn from_env() -> Self {
        Self {
            host: first_env(&HOST_ENV_VARS).unwrap_or_else(|| UNKNOWN_HOST.to_string()),
            actor: first_env(&ACTOR_ENV_VARS).unwrap_or_else(|| UNKNOWN_ACTOR.to_string()),
        }
    }
}

impl Default for ProcessIdentity {
    fn default() -> Self {
        Self::from_env()
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_never_blank() {
        let identity = ProcessIdentity::from_env();
        assert!(!identity.host.is_empty());
        assert!(!identity.actor.is_empty());
    }

    #[test]
    fn test_explicit_identity() {
        let identity = ProcessIdentity::new("web-01", "svc-billing");
        assert_eq!(identity.host, "web-01");
        assert_eq!(identity.actor, "svc-billing");
    }
}
