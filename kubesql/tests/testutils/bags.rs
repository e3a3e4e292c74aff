//! Builders for raw resource attribute bags, shaped like API list items

use kubesql::AttributeBag;
use serde_json::json;

pub fn namespace_bag(name: &str) -> AttributeBag {
    json!({"metadata": {"uid": format!("ns-{}", name), "name": name}})
}

pub fn node_bag(uid: &str, name: &str, ip: &str) -> AttributeBag {
    json!({
        "metadata": {"uid": uid, "name": name, "labels": {"kubernetes.io/hostname": name}},
        "status": {"addresses": [{"type": "InternalIP", "address": ip}]}
    })
}

/// A running pod whose containers all report a status
pub fn pod_bag(uid: &str, name: &str, namespace: &str, containers: &[(&str, &str)]) -> AttributeBag {
    let declared: Vec<_> = containers
        .iter()
        .map(|(name, image)| json!({"name": name, "image": image}))
        .collect();
    let statuses: Vec<_> = containers
        .iter()
        .map(|(name, _)| json!({"name": name, "restartCount": 0}))
        .collect();

    json!({
        "metadata": {
            "uid": uid,
            "name": name,
            "namespace": namespace,
            "labels": {"app": name},
            "annotations": {"owner": "team-a"}
        },
        "spec": {"nodeName": "node-a", "containers": declared},
        "status": {"phase": "Running", "containerStatuses": statuses}
    })
}

/// Two declared containers but only one reported status
pub fn mismatched_pod_bag(uid: &str, name: &str, namespace: &str) -> AttributeBag {
    json!({
        "metadata": {"uid": uid, "name": name, "namespace": namespace},
        "spec": {"containers": [
            {"name": "app", "image": "nginx"},
            {"name": "sidecar", "image": "envoy"}
        ]},
        "status": {"containerStatuses": [{"name": "app", "restartCount": 2}]}
    })
}

pub fn service_bag(uid: &str, name: &str, namespace: &str, cluster_ip: &str) -> AttributeBag {
    json!({
        "metadata": {"uid": uid, "name": name, "namespace": namespace},
        "spec": {"clusterIP": cluster_ip}
    })
}

pub fn rc_bag(uid: &str, name: &str, namespace: &str, replicas: i64) -> AttributeBag {
    json!({
        "metadata": {"uid": uid, "name": name, "namespace": namespace},
        "spec": {"replicas": replicas}
    })
}
