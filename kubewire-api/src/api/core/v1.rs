//! The core (legacy) group: pod templates, containers, volumes and claims.
use std::collections::BTreeMap;

use kubewire_core::{wire_object, IntOrString, Quantity};

use crate::{
    apimachinery::meta::v1::{LabelSelector, ObjectMeta},
    resource::NamespaceResourceScope,
};

wire_object! {
    /// Refers to any object, optionally to a field within it.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ObjectReference {
        /// API version of the referent.
        api_version: String = "apiVersion",
        /// Path of a field within the referent, e.g. `spec.containers{web}`.
        field_path: String = "fieldPath",
        /// Kind of the referent.
        kind: String = "kind",
        /// Name of the referent.
        name: String = "name",
        /// Namespace of the referent.
        namespace: String = "namespace",
        /// Resource version the reference was taken at.
        resource_version: String = "resourceVersion",
        /// UID of the referent.
        uid: String = "uid",
    }
}

wire_object! {
    /// Names an object in the same namespace.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct LocalObjectReference {
        /// Name of the referent.
        name: String = "name",
    }
}

wire_object! {
    /// Pod metadata and spec used to stamp out pods.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct PodTemplateSpec {
        /// Metadata given to each pod.
        metadata: ObjectMeta = "metadata",
        /// Spec given to each pod.
        spec: PodSpec = "spec",
    }
}

wire_object! {
    /// Desired state of a pod.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct PodSpec {
        /// Seconds a pod may run before being terminated.
        active_deadline_seconds: i64 = "activeDeadlineSeconds",
        /// Mount the service account token automatically.
        automount_service_account_token: bool = "automountServiceAccountToken",
        /// Application containers; at least one is required.
        containers: Vec<Container> = "containers",
        /// DNS policy, e.g. `ClusterFirst`.
        dns_policy: String = "dnsPolicy",
        /// Use the node's network namespace.
        host_network: bool = "hostNetwork",
        /// Secrets used to pull images.
        image_pull_secrets: Vec<LocalObjectReference> = "imagePullSecrets",
        /// Containers run to completion before the application containers start.
        init_containers: Vec<Container> = "initContainers",
        /// Schedule onto this node directly.
        node_name: String = "nodeName",
        /// Node labels the pod must match.
        node_selector: BTreeMap<String, String> = "nodeSelector",
        /// Priority class of the pod.
        priority_class_name: String = "priorityClassName",
        /// `Always`, `OnFailure` or `Never`.
        restart_policy: String = "restartPolicy",
        /// Scheduler that places the pod.
        scheduler_name: String = "schedulerName",
        /// Service account the pod runs as.
        service_account_name: String = "serviceAccountName",
        /// Seconds between SIGTERM and SIGKILL.
        termination_grace_period_seconds: i64 = "terminationGracePeriodSeconds",
        /// Taints the pod tolerates.
        tolerations: Vec<Toleration> = "tolerations",
        /// Volumes containers can mount.
        volumes: Vec<Volume> = "volumes",
    }
}

wire_object! {
    /// A single container in a pod.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Container {
        /// Arguments to the entrypoint.
        args: Vec<String> = "args",
        /// Entrypoint, replacing the image's.
        command: Vec<String> = "command",
        /// Environment variables.
        env: Vec<EnvVar> = "env",
        /// Image reference.
        image: String = "image",
        /// `Always`, `IfNotPresent` or `Never`.
        image_pull_policy: String = "imagePullPolicy",
        /// Restart the container when this probe fails.
        liveness_probe: Probe = "livenessProbe",
        /// Unique name within the pod.
        name: String = "name",
        /// Exposed ports.
        ports: Vec<ContainerPort> = "ports",
        /// Remove the pod from service endpoints while this probe fails.
        readiness_probe: Probe = "readinessProbe",
        /// Compute resources.
        resources: ResourceRequirements = "resources",
        /// Hold other probes until this one succeeds.
        startup_probe: Probe = "startupProbe",
        /// Volume mounts.
        volume_mounts: Vec<VolumeMount> = "volumeMounts",
        /// Working directory.
        working_dir: String = "workingDir",
    }
}

wire_object! {
    /// A network port of a container.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ContainerPort {
        /// Port number in the pod's network namespace.
        container_port: i32 = "containerPort",
        /// Host IP to bind an exposed host port to.
        host_ip: String = "hostIP",
        /// Port number on the host.
        host_port: i32 = "hostPort",
        /// Port name, referable from services and probes.
        name: String = "name",
        /// `TCP`, `UDP` or `SCTP`.
        protocol: String = "protocol",
    }
}

wire_object! {
    /// An environment variable.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct EnvVar {
        /// Variable name.
        name: String = "name",
        /// Literal value; may reference other variables as `$(VAR)`.
        value: String = "value",
        /// Source of the value when not literal.
        value_from: EnvVarSource = "valueFrom",
    }
}

wire_object! {
    /// Where an environment variable's value comes from.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct EnvVarSource {
        /// A key of a config map.
        config_map_key_ref: ConfigMapKeySelector = "configMapKeyRef",
        /// A field of the pod, e.g. `metadata.name`.
        field_ref: ObjectFieldSelector = "fieldRef",
        /// A key of a secret.
        secret_key_ref: SecretKeySelector = "secretKeyRef",
    }
}

wire_object! {
    /// Selects a key of a config map.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ConfigMapKeySelector {
        /// Key to select.
        key: String = "key",
        /// Name of the config map.
        name: String = "name",
        /// Tolerate a missing config map or key.
        optional: bool = "optional",
    }
}

wire_object! {
    /// Selects a key of a secret.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct SecretKeySelector {
        /// Key to select.
        key: String = "key",
        /// Name of the secret.
        name: String = "name",
        /// Tolerate a missing secret or key.
        optional: bool = "optional",
    }
}

wire_object! {
    /// Selects a field of the pod.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ObjectFieldSelector {
        /// Schema version the path is written in.
        api_version: String = "apiVersion",
        /// Path of the field.
        field_path: String = "fieldPath",
    }
}

wire_object! {
    /// A health check.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Probe {
        /// Run a command; exit status zero is healthy.
        exec: ExecAction = "exec",
        /// Consecutive failures before the probe is considered failed.
        failure_threshold: i32 = "failureThreshold",
        /// Issue an HTTP GET.
        http_get: HTTPGetAction = "httpGet",
        /// Seconds after container start before probing.
        initial_delay_seconds: i32 = "initialDelaySeconds",
        /// Seconds between probes.
        period_seconds: i32 = "periodSeconds",
        /// Consecutive successes before the probe is considered successful.
        success_threshold: i32 = "successThreshold",
        /// Open a TCP connection.
        tcp_socket: TCPSocketAction = "tcpSocket",
        /// Seconds before a probe attempt times out.
        timeout_seconds: i32 = "timeoutSeconds",
    }
}

wire_object! {
    /// Runs a command inside the container.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ExecAction {
        /// Command line; not run in a shell.
        command: Vec<String> = "command",
    }
}

wire_object! {
    /// An HTTP GET probe.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct HTTPGetAction {
        /// Host to connect to; defaults to the pod IP.
        host: String = "host",
        /// Request path.
        path: String = "path",
        /// Port number or name.
        port: IntOrString = "port",
        /// `HTTP` or `HTTPS`.
        scheme: String = "scheme",
    }
}

wire_object! {
    /// A TCP connection probe.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct TCPSocketAction {
        /// Host to connect to; defaults to the pod IP.
        host: String = "host",
        /// Port number or name.
        port: IntOrString = "port",
    }
}

wire_object! {
    /// Compute resource requests and limits.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ResourceRequirements {
        /// Dynamically allocated resources used by this container, by claim name.
        claims: Vec<ResourceClaim> = "claims",
        /// Maximum amounts allowed.
        limits: BTreeMap<String, Quantity> = "limits",
        /// Minimum amounts required for scheduling.
        requests: BTreeMap<String, Quantity> = "requests",
    }
}

wire_object! {
    /// Names an entry of the pod's `resourceClaims`.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ResourceClaim {
        /// Name of the pod level claim.
        name: String = "name",
        /// Only use this request of the claim.
        request: String = "request",
    }
}

wire_object! {
    /// Mounts a volume into a container.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct VolumeMount {
        /// Path inside the container.
        mount_path: String = "mountPath",
        /// `None`, `HostToContainer` or `Bidirectional`.
        mount_propagation: String = "mountPropagation",
        /// Name of the volume.
        name: String = "name",
        /// Mount read-only.
        read_only: bool = "readOnly",
        /// Path within the volume to mount instead of its root.
        sub_path: String = "subPath",
    }
}

wire_object! {
    /// A named volume. Exactly one source should be set.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Volume {
        /// Files from a config map.
        config_map: ConfigMapVolumeSource = "configMap",
        /// Scratch space sharing the pod's lifetime.
        empty_dir: EmptyDirVolumeSource = "emptyDir",
        /// A path on the host.
        host_path: HostPathVolumeSource = "hostPath",
        /// Volume name, referenced by mounts.
        name: String = "name",
        /// A persistent volume claim in the pod's namespace.
        persistent_volume_claim: PersistentVolumeClaimVolumeSource = "persistentVolumeClaim",
        /// Files from a secret.
        secret: SecretVolumeSource = "secret",
    }
}

wire_object! {
    /// Projects config map keys into files.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ConfigMapVolumeSource {
        /// File mode bits, as a decimal number.
        default_mode: i32 = "defaultMode",
        /// Project only these keys.
        items: Vec<KeyToPath> = "items",
        /// Name of the config map.
        name: String = "name",
        /// Tolerate a missing config map.
        optional: bool = "optional",
    }
}

wire_object! {
    /// Projects secret keys into files.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct SecretVolumeSource {
        /// File mode bits, as a decimal number.
        default_mode: i32 = "defaultMode",
        /// Project only these keys.
        items: Vec<KeyToPath> = "items",
        /// Tolerate a missing secret.
        optional: bool = "optional",
        /// Name of the secret.
        secret_name: String = "secretName",
    }
}

wire_object! {
    /// Maps a key to a relative file path.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct KeyToPath {
        /// Key to project.
        key: String = "key",
        /// File mode bits.
        mode: i32 = "mode",
        /// Relative file path.
        path: String = "path",
    }
}

wire_object! {
    /// A temporary directory.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct EmptyDirVolumeSource {
        /// Backing medium; `Memory` for tmpfs.
        medium: String = "medium",
        /// Upper bound on local storage used.
        size_limit: Quantity = "sizeLimit",
    }
}

wire_object! {
    /// A file or directory on the host.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct HostPathVolumeSource {
        /// Path on the host.
        path: String = "path",
        /// Expected type of the path, e.g. `Directory`.
        type_: String = "type",
    }
}

wire_object! {
    /// Mounts a claim.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct PersistentVolumeClaimVolumeSource {
        /// Name of the claim.
        claim_name: String = "claimName",
        /// Mount read-only.
        read_only: bool = "readOnly",
    }
}

wire_object! {
    /// Lets a pod schedule onto nodes with a matching taint.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Toleration {
        /// Taint effect to match; empty matches all.
        effect: String = "effect",
        /// Taint key to match; empty with `Exists` matches all.
        key: String = "key",
        /// `Exists` or `Equal`.
        operator: String = "operator",
        /// Seconds a `NoExecute` taint is tolerated.
        toleration_seconds: i64 = "tolerationSeconds",
        /// Taint value to match.
        value: String = "value",
    }
}

wire_object! {
    /// Node selection terms, ORed together.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct NodeSelector {
        /// The terms.
        node_selector_terms: Vec<NodeSelectorTerm> = "nodeSelectorTerms",
    }
}

wire_object! {
    /// Requirements that must all hold for a node to match.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct NodeSelectorTerm {
        /// Requirements on node labels.
        match_expressions: Vec<NodeSelectorRequirement> = "matchExpressions",
        /// Requirements on node fields.
        match_fields: Vec<NodeSelectorRequirement> = "matchFields",
    }
}

wire_object! {
    /// A requirement on a node label or field.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct NodeSelectorRequirement {
        /// Label or field key.
        key: String = "key",
        /// `In`, `NotIn`, `Exists`, `DoesNotExist`, `Gt` or `Lt`.
        operator: String = "operator",
        /// Values to compare with.
        values: Vec<String> = "values",
    }
}

wire_object! {
    /// A user's request for storage.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct PersistentVolumeClaim {
        /// `v1`.
        api_version: String = "apiVersion",
        /// `PersistentVolumeClaim`.
        kind: String = "kind",
        /// Standard object metadata.
        metadata: ObjectMeta = "metadata",
        /// Desired characteristics of the volume.
        spec: PersistentVolumeClaimSpec = "spec",
        /// Current state of the claim.
        status: PersistentVolumeClaimStatus = "status",
    }
}

resource!(
    PersistentVolumeClaim,
    api_version = "v1",
    group = "",
    version = "v1",
    kind = "PersistentVolumeClaim",
    plural = "persistentvolumeclaims",
    scope = NamespaceResourceScope,
);

wire_object! {
    /// Desired characteristics of a claimed volume.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct PersistentVolumeClaimSpec {
        /// e.g. `ReadWriteOnce`.
        access_modes: Vec<String> = "accessModes",
        /// Minimum resources the volume should have.
        resources: VolumeResourceRequirements = "resources",
        /// Restrict binding to volumes with these labels.
        selector: LabelSelector = "selector",
        /// Storage class to provision from.
        storage_class_name: String = "storageClassName",
        /// `Filesystem` or `Block`.
        volume_mode: String = "volumeMode",
        /// Bind to this volume.
        volume_name: String = "volumeName",
    }
}

wire_object! {
    /// Storage requests and limits.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct VolumeResourceRequirements {
        /// Maximum amounts.
        limits: BTreeMap<String, Quantity> = "limits",
        /// Minimum amounts.
        requests: BTreeMap<String, Quantity> = "requests",
    }
}

wire_object! {
    /// Observed state of a claim.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct PersistentVolumeClaimStatus {
        /// Access modes of the bound volume.
        access_modes: Vec<String> = "accessModes",
        /// Capacity of the bound volume.
        capacity: BTreeMap<String, Quantity> = "capacity",
        /// `Pending`, `Bound` or `Lost`.
        phase: String = "phase",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use kubewire_core::{
        codec::{from_value, to_value},
        value::ValueKind,
        DecodeError,
    };
    use serde_json::json;

    #[test]
    fn container_round_trip() {
        let raw = json!({
            "name": "web",
            "image": "nginx:1.27",
            "ports": [{"containerPort": 80, "name": "http", "protocol": "TCP"}],
            "env": [
                {"name": "MODE", "value": "prod"},
                {"name": "POD", "valueFrom": {"fieldRef": {"fieldPath": "metadata.name"}}}
            ],
            "resources": {"limits": {"cpu": "500m", "memory": "128Mi"}, "requests": {"cpu": 0.25}},
            "readinessProbe": {"httpGet": {"path": "/healthz", "port": "http"}, "periodSeconds": 5},
            "livenessProbe": {"tcpSocket": {"port": 80}}
        });
        let container: Container = from_value(raw).unwrap();
        let probe = container.readiness_probe.as_ref().unwrap();
        assert_eq!(
            probe.http_get.as_ref().unwrap().port,
            Some(IntOrString::String("http".into()))
        );
        let requests = container.resources.as_ref().unwrap().requests.as_ref().unwrap();
        assert_eq!(requests["cpu"], Quantity::from("0.25"));

        let encoded = to_value(&container).unwrap();
        assert_eq!(encoded["livenessProbe"]["tcpSocket"]["port"], json!(80));
        assert_eq!(encoded["resources"]["requests"]["cpu"], json!("0.25"));
    }

    #[test]
    fn errors_point_into_nested_lists() {
        let raw = json!({"containers": [{"name": "a"}, {"name": "b", "ports": [{"containerPort": "80"}]}]});
        let err = from_value::<PodSpec>(raw).unwrap_err();
        assert_eq!(err, DecodeError::TypeMismatch {
            field: "containers[1].ports[0].containerPort".into(),
            expected: "int32",
            actual: ValueKind::String,
        });
    }

    #[test]
    fn claim_round_trip() {
        let raw = json!({
            "apiVersion": "v1",
            "kind": "PersistentVolumeClaim",
            "metadata": {"name": "data", "namespace": "db"},
            "spec": {
                "accessModes": ["ReadWriteOnce"],
                "resources": {"requests": {"storage": "10Gi"}},
                "storageClassName": "fast"
            },
            "status": {"phase": "Bound", "capacity": {"storage": "10Gi"}}
        });
        let pvc: PersistentVolumeClaim = from_value(raw.clone()).unwrap();
        assert_json_eq!(to_value(&pvc).unwrap(), raw);
    }
}
