//! Leases for leader election and heartbeats.
use kubewire_core::{wire_object, MicroTime};

use crate::{apimachinery::meta::v1::ObjectMeta, resource::NamespaceResourceScope};

wire_object! {
    /// A lease held by one identity at a time.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Lease {
        /// `coordination.k8s.io/v1`.
        api_version: String = "apiVersion",
        /// `Lease`.
        kind: String = "kind",
        /// Standard object metadata.
        metadata: ObjectMeta = "metadata",
        /// Lease state.
        spec: LeaseSpec = "spec",
    }
}

resource!(
    Lease,
    api_version = "coordination.k8s.io/v1",
    group = "coordination.k8s.io",
    version = "v1",
    kind = "Lease",
    plural = "leases",
    scope = NamespaceResourceScope,
);

wire_object! {
    /// Holder and timing of a lease.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct LeaseSpec {
        /// When the current holder acquired the lease.
        acquire_time: MicroTime = "acquireTime",
        /// Identity of the holder.
        holder_identity: String = "holderIdentity",
        /// Seconds candidates wait after `renewTime` before taking over.
        lease_duration_seconds: i32 = "leaseDurationSeconds",
        /// Number of holder changes.
        lease_transitions: i32 = "leaseTransitions",
        /// Identity the holder should hand over to.
        preferred_holder: String = "preferredHolder",
        /// When the holder last renewed.
        renew_time: MicroTime = "renewTime",
        /// Coordinated leader election strategy.
        strategy: String = "strategy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubewire_core::codec::{from_value, to_value};
    use serde_json::json;

    #[test]
    fn renew_time_keeps_microseconds() {
        let raw = json!({
            "apiVersion": "coordination.k8s.io/v1",
            "kind": "Lease",
            "metadata": {"name": "controller", "namespace": "kube-system"},
            "spec": {
                "holderIdentity": "node-a",
                "leaseDurationSeconds": 15,
                "acquireTime": "2025-01-02T03:04:05.000000Z",
                "renewTime": "2025-01-02T03:04:05.123456Z"
            }
        });
        let lease: Lease = from_value(raw.clone()).unwrap();
        let renew = lease.spec.as_ref().and_then(|s| s.renew_time).unwrap();
        assert_eq!(renew.timestamp().subsec_microsecond(), 123456);
        assert_eq!(to_value(&lease).unwrap(), raw);
    }
}
