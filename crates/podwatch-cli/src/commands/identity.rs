//! Candidate identities of the local node.
//!
//! Collects the node's hostname, the aliases and addresses the hosts file
//! lists for it, the addresses the system resolver returns for it, and the
//! canonical names those addresses reverse-resolve to.

use std::net::IpAddr;
use std::path::Path;

use tracing::{debug, warn};

use podwatch_core::Identities;

pub const HOSTS_FILE: &str = "/etc/hosts";

/// Addresses and aliases sharing a hosts-file line with `name`.
///
/// Each non-comment line has the form `<IP> <hostname1> [hostname2 ...]`.
/// `name` may be either the address or one of the hostnames.
pub fn hosts_aliases(content: &str, name: &str) -> Vec<String> {
    let mut found = Vec::new();

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut parts = line.split_whitespace();
        let Some(ip) = parts.next() else {
            continue;
        };
        if ip.parse::<IpAddr>().is_err() {
            debug!(line, "skipping hosts line with invalid IP");
            continue;
        }

        let names: Vec<&str> = parts.collect();
        if ip == name || names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            found.push(ip.to_string());
            found.extend(names.iter().map(|n| n.to_string()));
        }
    }

    found
}

/// The local hostname, if the OS reports a valid UTF-8 one.
fn local_hostname() -> Option<String> {
    match hostname::get() {
        Ok(name) => name.into_string().ok(),
        Err(e) => {
            warn!(error = %e, "failed to read local hostname");
            None
        }
    }
}

/// Addresses the system resolver returns for `name`.
async fn resolve(name: &str) -> Vec<IpAddr> {
    match tokio::net::lookup_host((name, 0)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            debug!(name, error = %e, "hostname did not resolve");
            Vec::new()
        }
    }
}

/// Canonical names the system resolver maps `addrs` back to.
async fn reverse(addrs: Vec<IpAddr>) -> Vec<String> {
    let lookup = tokio::task::spawn_blocking(move || {
        addrs
            .iter()
            .filter_map(|addr| match dns_lookup::lookup_addr(addr) {
                Ok(name) if name.parse::<IpAddr>().is_err() => Some(name),
                Ok(_) => None,
                Err(e) => {
                    debug!(%addr, error = %e, "address did not reverse-resolve");
                    None
                }
            })
            .collect()
    });

    match lookup.await {
        Ok(names) => names,
        Err(e) => {
            warn!(error = %e, "reverse lookup task failed");
            Vec::new()
        }
    }
}

/// Build the candidate identities for a check.
///
/// Uses `hostname` when given, otherwise the local hostname. `extra`
/// identities are appended verbatim.
pub async fn discover(hostname: Option<&str>, extra: &[String], hosts_file: &Path) -> Identities {
    let mut identities = Identities::new();

    let base = match hostname {
        Some(name) => Some(name.to_string()),
        None => local_hostname(),
    };

    if let Some(base) = base.filter(|b| !b.trim().is_empty()) {
        identities.push(base.as_str());

        match std::fs::read_to_string(hosts_file) {
            Ok(content) => identities.extend(hosts_aliases(&content, &base)),
            Err(e) => debug!(path = %hosts_file.display(), error = %e, "hosts file unavailable"),
        }

        let addrs = resolve(&base).await;
        identities.extend(addrs.iter().map(IpAddr::to_string));
        identities.extend(reverse(addrs).await);
    }

    identities.extend(extra.iter().cloned());
    debug!(count = identities.len(), identities = ?identities, "candidate identities");
    identities
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTS: &str = "\
127.0.0.1   localhost
# 10.0.0.9 worker-1 (old address)
10.10.1.11  worker-1.cluster.local  worker-1   # primary
10.10.1.12  worker-2.cluster.local  worker-2
not-an-ip   worker-1
";

    #[test]
    fn test_hosts_aliases_collects_line() {
        assert_eq!(
            hosts_aliases(HOSTS, "worker-1"),
            vec!["10.10.1.11", "worker-1.cluster.local", "worker-1"]
        );
    }

    #[test]
    fn test_hosts_aliases_matches_fqdn() {
        assert_eq!(
            hosts_aliases(HOSTS, "worker-2.cluster.local"),
            vec!["10.10.1.12", "worker-2.cluster.local", "worker-2"]
        );
    }

    #[test]
    fn test_hosts_aliases_matches_address() {
        assert_eq!(hosts_aliases(HOSTS, "127.0.0.1"), vec!["127.0.0.1", "localhost"]);
    }

    #[test]
    fn test_hosts_aliases_unknown_name() {
        assert!(hosts_aliases(HOSTS, "worker-9").is_empty());
    }

    #[tokio::test]
    async fn test_discover_with_explicit_hostname() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, HOSTS).unwrap();

        let ids = discover(Some("127.0.0.1"), &["worker-1".to_string()], &hosts).await;
        let ids: Vec<&str> = ids.iter().collect();
        assert_eq!(&ids[..2], ["127.0.0.1", "localhost"]);
        assert_eq!(ids.last(), Some(&"worker-1"));
    }

    #[tokio::test]
    async fn test_reverse_resolves_loopback() {
        let names = reverse(vec![IpAddr::from([127, 0, 0, 1])]).await;
        assert!(names.iter().any(|n| n.starts_with("localhost")), "{names:?}");
    }

    #[tokio::test]
    async fn test_discover_adds_reverse_names_missing_from_hosts_file() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "10.0.0.5 worker-5\n").unwrap();

        let ids = discover(Some("127.0.0.1"), &[], &hosts).await;
        assert!(ids.contains("127.0.0.1"));
        assert!(ids.iter().any(|n| n.starts_with("localhost")));
    }

    #[tokio::test]
    async fn test_discover_reads_aliases_from_hosts_file() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "10.0.0.5 worker-5.example.org worker-5\n").unwrap();

        let ids = discover(Some("10.0.0.5"), &[], &hosts).await;
        assert!(ids.contains("10.0.0.5"));
        assert!(ids.contains("worker-5.example.org"));
        assert!(ids.contains("worker-5"));
    }

    #[tokio::test]
    async fn test_discover_blank_hostname_uses_extra_only() {
        let dir = tempfile::tempdir().unwrap();
        let ids = discover(Some("  "), &["node-x".to_string()], &dir.path().join("missing")).await;
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["node-x"]);
    }
}
