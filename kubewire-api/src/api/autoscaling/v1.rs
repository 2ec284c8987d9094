//! The `scale` subresource.
use kubewire_core::wire_object;

use crate::apimachinery::meta::v1::ObjectMeta;

wire_object! {
    /// Replica count of a scalable resource, served at `.../{name}/scale`.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Scale {
        /// `autoscaling/v1`.
        api_version: String = "apiVersion",
        /// `Scale`.
        kind: String = "kind",
        /// Metadata of the scaled object.
        metadata: ObjectMeta = "metadata",
        /// Desired scale.
        spec: ScaleSpec = "spec",
        /// Current scale.
        status: ScaleStatus = "status",
    }
}

wire_object! {
    /// Desired scale.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ScaleSpec {
        /// Desired number of instances.
        replicas: i32 = "replicas",
    }
}

wire_object! {
    /// Observed scale.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ScaleStatus {
        /// Actual number of instances.
        replicas: i32 = "replicas",
        /// Label query over the pods, in string form.
        selector: String = "selector",
    }
}
