//! Deployments and stateful sets.
use kubewire_core::{wire_object, IntOrString, Time};

use crate::{
    api::core::v1::{PersistentVolumeClaim, PodTemplateSpec},
    apimachinery::meta::v1::{LabelSelector, ObjectMeta},
    resource::NamespaceResourceScope,
};

wire_object! {
    /// Declarative updates for pods and replica sets.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Deployment {
        /// `apps/v1`.
        api_version: String = "apiVersion",
        /// `Deployment`.
        kind: String = "kind",
        /// Standard object metadata.
        metadata: ObjectMeta = "metadata",
        /// Desired behavior.
        spec: DeploymentSpec = "spec",
        /// Most recently observed state.
        status: DeploymentStatus = "status",
    }
}

resource!(
    Deployment,
    api_version = "apps/v1",
    group = "apps",
    version = "v1",
    kind = "Deployment",
    plural = "deployments",
    scope = NamespaceResourceScope,
);

wire_object! {
    /// Desired behavior of a deployment.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeploymentSpec {
        /// Seconds a new pod must be ready before it counts as available.
        min_ready_seconds: i32 = "minReadySeconds",
        /// Stop rolling out template changes.
        paused: bool = "paused",
        /// Seconds without progress before the rollout is reported as failed.
        progress_deadline_seconds: i32 = "progressDeadlineSeconds",
        /// Desired pod count; defaults to 1 when unset.
        replicas: i32 = "replicas",
        /// Old replica sets kept for rollback.
        revision_history_limit: i32 = "revisionHistoryLimit",
        /// Pods managed by this deployment; must match the template labels.
        selector: LabelSelector = "selector",
        /// How pods are replaced.
        strategy: DeploymentStrategy = "strategy",
        /// Template for new pods.
        template: PodTemplateSpec = "template",
    }
}

wire_object! {
    /// How existing pods are replaced with new ones.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeploymentStrategy {
        /// Rolling update parameters, when `type` is `RollingUpdate`.
        rolling_update: RollingUpdateDeployment = "rollingUpdate",
        /// `Recreate` or `RollingUpdate`.
        type_: String = "type",
    }
}

wire_object! {
    /// Bounds on a rolling update, as absolute numbers or percentages of desired pods.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct RollingUpdateDeployment {
        /// Pods that may be created above the desired count; percentages round up.
        max_surge: IntOrString = "maxSurge",
        /// Pods that may be unavailable during the update; percentages round down.
        max_unavailable: IntOrString = "maxUnavailable",
    }
}

wire_object! {
    /// Observed state of a deployment.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeploymentStatus {
        /// Pods ready for at least `minReadySeconds`.
        available_replicas: i32 = "availableReplicas",
        /// Hash collision counter for replica set names.
        collision_count: i32 = "collisionCount",
        /// Latest observations.
        conditions: Vec<DeploymentCondition> = "conditions",
        /// Generation observed by the controller.
        observed_generation: i64 = "observedGeneration",
        /// Pods with a Ready condition.
        ready_replicas: i32 = "readyReplicas",
        /// Non-terminating pods targeted by this deployment.
        replicas: i32 = "replicas",
        /// Pods being terminated.
        terminating_replicas: i32 = "terminatingReplicas",
        /// Pods still needed for full capacity.
        unavailable_replicas: i32 = "unavailableReplicas",
        /// Pods running the current template.
        updated_replicas: i32 = "updatedReplicas",
    }
}

wire_object! {
    /// State of a deployment at a point in time.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeploymentCondition {
        /// When `status` last changed.
        last_transition_time: Time = "lastTransitionTime",
        /// When the condition was last updated.
        last_update_time: Time = "lastUpdateTime",
        /// Human readable details.
        message: String = "message",
        /// Reason for the last transition.
        reason: String = "reason",
        /// `True`, `False` or `Unknown`.
        status: String = "status",
        /// `Available`, `Progressing` or `ReplicaFailure`.
        type_: String = "type",
    }
}

wire_object! {
    /// Pods with stable identities and storage.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct StatefulSet {
        /// `apps/v1`.
        api_version: String = "apiVersion",
        /// `StatefulSet`.
        kind: String = "kind",
        /// Standard object metadata.
        metadata: ObjectMeta = "metadata",
        /// Desired identities and storage.
        spec: StatefulSetSpec = "spec",
        /// Most recently observed state.
        status: StatefulSetStatus = "status",
    }
}

resource!(
    StatefulSet,
    api_version = "apps/v1",
    group = "apps",
    version = "v1",
    kind = "StatefulSet",
    plural = "statefulsets",
    scope = NamespaceResourceScope,
);

wire_object! {
    /// Desired state of a stateful set.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct StatefulSetSpec {
        /// Seconds a new pod must be ready before it counts as available.
        min_ready_seconds: i32 = "minReadySeconds",
        /// Numbering of replica indices.
        ordinals: StatefulSetOrdinals = "ordinals",
        /// Lifecycle of claims created from `volumeClaimTemplates`.
        persistent_volume_claim_retention_policy: StatefulSetPersistentVolumeClaimRetentionPolicy =
            "persistentVolumeClaimRetentionPolicy",
        /// `OrderedReady` or `Parallel`.
        pod_management_policy: String = "podManagementPolicy",
        /// Desired pod count.
        replicas: i32 = "replicas",
        /// Revisions kept in history.
        revision_history_limit: i32 = "revisionHistoryLimit",
        /// Pods managed by this set; must match the template labels.
        selector: LabelSelector = "selector",
        /// Headless service governing the pods' network identity.
        service_name: String = "serviceName",
        /// Template for new pods.
        template: PodTemplateSpec = "template",
        /// How pods are updated when the template changes.
        update_strategy: StatefulSetUpdateStrategy = "updateStrategy",
        /// Claims each pod gets its own copy of.
        volume_claim_templates: Vec<PersistentVolumeClaim> = "volumeClaimTemplates",
    }
}

wire_object! {
    /// Numbering of stateful set replicas.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct StatefulSetOrdinals {
        /// Index of the first replica.
        start: i32 = "start",
    }
}

wire_object! {
    /// What happens to claims when their stateful set shrinks or is deleted.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct StatefulSetPersistentVolumeClaimRetentionPolicy {
        /// `Retain` or `Delete` when the set is deleted.
        when_deleted: String = "whenDeleted",
        /// `Retain` or `Delete` when the set is scaled down.
        when_scaled: String = "whenScaled",
    }
}

wire_object! {
    /// How a stateful set updates its pods.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct StatefulSetUpdateStrategy {
        /// Parameters for `RollingUpdate`.
        rolling_update: RollingUpdateStatefulSetStrategy = "rollingUpdate",
        /// `RollingUpdate` or `OnDelete`.
        type_: String = "type",
    }
}

wire_object! {
    /// Rolling update parameters for a stateful set.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct RollingUpdateStatefulSetStrategy {
        /// Pods that may be unavailable during the update.
        max_unavailable: IntOrString = "maxUnavailable",
        /// Only pods with an ordinal at or above this are updated.
        partition: i32 = "partition",
    }
}

wire_object! {
    /// Observed state of a stateful set.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct StatefulSetStatus {
        /// Pods ready for at least `minReadySeconds`.
        available_replicas: i32 = "availableReplicas",
        /// Hash collision counter for revision names.
        collision_count: i32 = "collisionCount",
        /// Latest observations.
        conditions: Vec<StatefulSetCondition> = "conditions",
        /// Pods at `currentRevision`.
        current_replicas: i32 = "currentReplicas",
        /// Revision used for pods below the partition.
        current_revision: String = "currentRevision",
        /// Generation observed by the controller.
        observed_generation: i64 = "observedGeneration",
        /// Pods with a Ready condition.
        ready_replicas: i32 = "readyReplicas",
        /// Pods created by the controller.
        replicas: i32 = "replicas",
        /// Revision used for pods at or above the partition.
        update_revision: String = "updateRevision",
        /// Pods at `updateRevision`.
        updated_replicas: i32 = "updatedReplicas",
    }
}

wire_object! {
    /// State of a stateful set at a point in time.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct StatefulSetCondition {
        /// When `status` last changed.
        last_transition_time: Time = "lastTransitionTime",
        /// Human readable details.
        message: String = "message",
        /// Reason for the last transition.
        reason: String = "reason",
        /// `True`, `False` or `Unknown`.
        status: String = "status",
        /// Condition type.
        type_: String = "type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::core::v1::Container, Resource};
    use assert_json_diff::assert_json_eq;
    use kubewire_core::{
        codec::{self, from_str, from_value, to_value},
        value::ValueKind,
        DecodeError,
    };
    use serde_json::json;

    const DEPLOYMENT: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
  labels:
    app: web
  creationTimestamp: "2024-03-01T12:00:00Z"
spec:
  replicas: 3
  selector:
    matchLabels:
      app: web
  strategy:
    type: RollingUpdate
    rollingUpdate:
      maxSurge: 30%
      maxUnavailable: 0
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
      - name: web
        image: nginx:1.27
        ports:
        - containerPort: 80
status:
  replicas: 3
  conditions:
  - type: Available
    status: "True"
    lastUpdateTime: "2024-03-01T12:00:30Z"
    lastTransitionTime: "2024-03-01T12:00:30Z"
"#;

    #[test]
    fn deployment_from_yaml() {
        let d: Deployment = from_str(DEPLOYMENT).unwrap();
        assert_eq!(d.meta().and_then(|m| m.name.as_deref()), Some("web"));
        let spec = d.spec.as_ref().unwrap();
        assert_eq!(spec.replicas, Some(3));
        assert_eq!(spec.min_ready_seconds, None);
        let rolling = spec.strategy.as_ref().and_then(|s| s.rolling_update.as_ref()).unwrap();
        assert_eq!(rolling.max_surge, Some(IntOrString::String("30%".into())));
        assert_eq!(rolling.max_unavailable, Some(IntOrString::Int(0)));

        let containers = spec.template.as_ref().unwrap().spec.as_ref().unwrap().containers.as_ref();
        assert_eq!(containers.map(Vec::len), Some(1));
    }

    #[test]
    fn deployment_round_trip_preserves_values() {
        let d: Deployment = from_str(DEPLOYMENT).unwrap();
        let encoded = to_value(&d).unwrap();
        let again: Deployment = from_value(encoded.clone()).unwrap();
        assert_eq!(d, again);
        assert_eq!(encoded["spec"]["strategy"]["rollingUpdate"], json!({"maxSurge": "30%", "maxUnavailable": 0}));
        assert_eq!(encoded["metadata"]["creationTimestamp"], json!("2024-03-01T12:00:00Z"));
        assert!(encoded["spec"].get("paused").is_none());
    }

    #[test]
    fn top_level_keys_follow_declaration_order() {
        let d: Deployment = from_str(DEPLOYMENT).unwrap();
        let out = codec::to_string(&d).unwrap();
        assert!(out.starts_with(r#"{"apiVersion":"apps/v1","kind":"Deployment","metadata":{"#));
    }

    #[test]
    fn max_surge_union_errors() {
        let raw = json!({"spec": {"strategy": {"rollingUpdate": {"maxSurge": true}}}});
        let err = from_value::<Deployment>(raw).unwrap_err();
        assert_eq!(err, DecodeError::UnionNoMatch {
            field: "spec.strategy.rollingUpdate.maxSurge".into(),
            union: "IntOrString",
            actual: ValueKind::Bool,
        });
    }

    #[test]
    fn replicas_zero_is_kept() {
        let mut d = Deployment::named("web");
        d.spec = Some(DeploymentSpec {
            replicas: Some(0),
            ..DeploymentSpec::default()
        });
        assert_json_eq!(
            to_value(&d).unwrap(),
            json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {"name": "web"},
                "spec": {"replicas": 0}
            })
        );
    }

    #[test]
    fn statefulset_with_claim_templates() {
        let raw = json!({
            "apiVersion": "apps/v1",
            "kind": "StatefulSet",
            "metadata": {"name": "db"},
            "spec": {
                "serviceName": "db",
                "replicas": 2,
                "selector": {"matchLabels": {"app": "db"}},
                "updateStrategy": {"type": "RollingUpdate", "rollingUpdate": {"partition": 1, "maxUnavailable": "50%"}},
                "persistentVolumeClaimRetentionPolicy": {"whenDeleted": "Delete", "whenScaled": "Retain"},
                "template": {"metadata": {"labels": {"app": "db"}}, "spec": {"containers": [{"name": "pg", "image": "postgres:16"}]}},
                "volumeClaimTemplates": [{
                    "metadata": {"name": "data"},
                    "spec": {"accessModes": ["ReadWriteOnce"], "resources": {"requests": {"storage": "1Gi"}}}
                }]
            }
        });
        let sts: StatefulSet = from_value(raw.clone()).unwrap();
        let spec = sts.spec.as_ref().unwrap();
        assert_eq!(spec.volume_claim_templates.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            spec.update_strategy.as_ref().and_then(|u| u.rolling_update.as_ref()).and_then(|r| r.partition),
            Some(1)
        );
        assert_json_eq!(to_value(&sts).unwrap(), raw);
    }

    #[test]
    fn unknown_fields_are_pruned() {
        let raw = json!({"name": "web", "image": "nginx", "imageDigest": "sha256:abc"});
        let c: Container = from_value(raw).unwrap();
        assert_json_eq!(to_value(&c).unwrap(), json!({"name": "web", "image": "nginx"}));
    }
}
