//! End-to-end checks over captured `kubectl get pods -o wide --no-headers`
//! output: parse → match → evaluate.

use podwatch_core::{Identities, StatusCode, Thresholds};
use podwatch_health::{check_output, check_pods, parse_rows, Evaluator, MatchSet, Policy};

// ── Fixtures ──────────────────────────────────────────────────────

const HEALTHY_CLUSTER: &str = "\
irods-csi-driver-node-4xk8p   3/3   Running   0               41d   10.10.1.11   worker-1.cluster.local   <none>   <none>
irods-csi-driver-node-9bz2w   3/3   Running   0               41d   10.10.1.12   worker-2.cluster.local   <none>   <none>
irods-csi-driver-node-qq7rt   3/3   Running   2 (6d ago)      41d   10.10.1.13   worker-3.cluster.local   <none>   <none>
";

const CHURNING_NODE: &str = "\
irods-csi-driver-node-4xk8p   3/3   Running   14 (2m ago)     41d   10.10.1.11   worker-1.cluster.local   <none>   <none>
irods-csi-driver-node-9bz2w   3/3   Running   0               41d   10.10.1.12   worker-2.cluster.local   <none>   <none>
";

const DUPLICATED_NODE: &str = "\
irods-csi-driver-node-4xk8p   3/3   Running       0     41d   10.10.1.11   worker-1.cluster.local   <none>   <none>
irods-csi-driver-node-zz001   3/3   Running       0     1m    10.10.1.11   worker-1.cluster.local   <none>   <none>
";

const TRUNCATED: &str = "\
irods-csi-driver-node-4xk8p   3/3   Running   0   41d   10.10.1.11   worker-1.cluster.local   <none>   <none>
irods-csi-driver-node-9bz2w   3/3   Runn
Unable to connect to the server: net/http: TLS handshake timeout
";

fn ids(values: &[&str]) -> Identities {
    values.iter().copied().collect()
}

// ── Tests ─────────────────────────────────────────────────────────

#[test]
fn healthy_node_matched_by_fqdn() {
    let v = check_pods(HEALTHY_CLUSTER, &ids(&["worker-2", "worker-2.cluster.local"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Ok);
    assert_eq!(v.exit_code(), 0);
}

#[test]
fn healthy_node_matched_by_ip() {
    let v = check_pods(HEALTHY_CLUSTER, &ids(&["worker-1", "10.10.1.11"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Ok);
}

#[test]
fn annotated_restart_row_is_re_anchored() {
    let rows = parse_rows(HEALTHY_CLUSTER);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].restart_count(), 2);
    assert_eq!(rows[2].ip(), "10.10.1.13");
    assert_eq!(rows[2].node(), "worker-3.cluster.local");

    let v = check_pods(HEALTHY_CLUSTER, &ids(&["worker-3.cluster.local"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Ok);

    let v = check_pods(HEALTHY_CLUSTER, &ids(&["worker-3.cluster.local"]), Thresholds { warn: 0, crit: 10 });
    assert_eq!(v.code, StatusCode::Warning);
    assert_eq!(v.instances, vec!["irods-csi-driver-node-qq7rt(worker-3.cluster.local)"]);
}

#[test]
fn unknown_node_is_critical() {
    let v = check_pods(HEALTHY_CLUSTER, &ids(&["worker-9"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Critical);
    assert!(v.message.contains("No instance running"));
}

#[test]
fn restart_churn_is_critical_on_that_node_only() {
    let v = check_pods(CHURNING_NODE, &ids(&["worker-1.cluster.local"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Critical);
    assert!(v.message.contains("restarted more than 10 times"));
    assert!(v.message.contains("[irods-csi-driver-node-4xk8p(worker-1.cluster.local)]"));

    let v = check_pods(CHURNING_NODE, &ids(&["worker-2.cluster.local"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Ok);
}

#[test]
fn duplicate_instances_are_critical() {
    let v = check_pods(DUPLICATED_NODE, &ids(&["10.10.1.11"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Critical);
    assert_eq!(
        v.instances,
        vec![
            "irods-csi-driver-node-4xk8p(worker-1.cluster.local)",
            "irods-csi-driver-node-zz001(worker-1.cluster.local)",
        ]
    );
}

#[test]
fn truncated_output_keeps_the_complete_rows() {
    let rows = parse_rows(TRUNCATED);
    assert_eq!(rows.len(), 1);

    let v = check_pods(TRUNCATED, &ids(&["worker-1.cluster.local"]), Thresholds::default());
    assert_eq!(v.code, StatusCode::Ok);
}

#[test]
fn restart_policy_over_whole_node() {
    let output = "\
irods-csi-driver-node-4xk8p   3/3   Running            5     41d   10.10.1.11   worker-1   <none>   <none>
irods-csi-driver-controller-0 4/4   Running            0     41d   10.10.1.40   worker-1   <none>   <none>
metrics-agent-77xc            1/1   CrashLoopBackOff   90    41d   10.10.1.41   worker-1   <none>   <none>
";
    let rows = MatchSet::select(parse_rows(output), &ids(&["worker-1"]))
        .with_name_prefix("irods-csi-driver-node");
    let v = Evaluator::new(Policy::RestartsOnly).evaluate(&rows);
    assert_eq!(v.code, StatusCode::Warning);
    assert_eq!(v.instances, vec!["irods-csi-driver-node-4xk8p(worker-1)"]);
}

#[test]
fn evaluation_is_deterministic() {
    let evaluator = Evaluator::default();
    let identities = ids(&["10.10.1.11"]);
    let first = check_output(DUPLICATED_NODE, &identities, &evaluator);
    let second = check_output(DUPLICATED_NODE, &identities, &evaluator);
    assert_eq!(first, second);
}
