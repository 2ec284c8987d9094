//! Dynamic resource allocation: claims for devices such as GPUs.
use kubewire_core::{wire_object, Time};

use crate::{
    api::core::v1::NodeSelector,
    apimachinery::{
        meta::v1::{Condition, ObjectMeta},
        runtime::RawExtension,
    },
    resource::NamespaceResourceScope,
};

wire_object! {
    /// A request for access to devices, allocated by the scheduler.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ResourceClaim {
        /// `resource.k8s.io/v1`.
        api_version: String = "apiVersion",
        /// `ResourceClaim`.
        kind: String = "kind",
        /// Standard object metadata.
        metadata: ObjectMeta = "metadata",
        /// What is requested; immutable.
        spec: ResourceClaimSpec = "spec",
        /// Allocation and reservation state.
        status: ResourceClaimStatus = "status",
    }
}

resource!(
    ResourceClaim,
    api_version = "resource.k8s.io/v1",
    group = "resource.k8s.io",
    version = "v1",
    kind = "ResourceClaim",
    plural = "resourceclaims",
    scope = NamespaceResourceScope,
);

wire_object! {
    /// A blueprint for claims created per pod.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ResourceClaimTemplate {
        /// `resource.k8s.io/v1`.
        api_version: String = "apiVersion",
        /// `ResourceClaimTemplate`.
        kind: String = "kind",
        /// Standard object metadata.
        metadata: ObjectMeta = "metadata",
        /// Template for the claims.
        spec: ResourceClaimTemplateSpec = "spec",
    }
}

resource!(
    ResourceClaimTemplate,
    api_version = "resource.k8s.io/v1",
    group = "resource.k8s.io",
    version = "v1",
    kind = "ResourceClaimTemplate",
    plural = "resourceclaimtemplates",
    scope = NamespaceResourceScope,
);

wire_object! {
    /// Metadata and spec copied into each generated claim.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ResourceClaimTemplateSpec {
        /// Labels and annotations for the claims.
        metadata: ObjectMeta = "metadata",
        /// Spec for the claims.
        spec: ResourceClaimSpec = "spec",
    }
}

wire_object! {
    /// What a claim asks for.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ResourceClaimSpec {
        /// Device requests.
        devices: DeviceClaim = "devices",
    }
}

wire_object! {
    /// Device requests, constraints between them and their configuration.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeviceClaim {
        /// Configuration for the requested devices.
        config: Vec<DeviceClaimConfiguration> = "config",
        /// Constraints across requests.
        constraints: Vec<DeviceConstraint> = "constraints",
        /// The requests; all must be satisfied.
        requests: Vec<DeviceRequest> = "requests",
    }
}

wire_object! {
    /// One named request, either exact or a list of alternatives.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeviceRequest {
        /// Request a specific set of devices.
        exactly: ExactDeviceRequest = "exactly",
        /// Ordered alternatives; the first that can be satisfied is used.
        first_available: Vec<DeviceSubRequest> = "firstAvailable",
        /// Name referenced by constraints and configuration.
        name: String = "name",
    }
}

wire_object! {
    /// Devices of one class matching all selectors.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ExactDeviceRequest {
        /// Request administrative access, bypassing exclusive allocation.
        admin_access: bool = "adminAccess",
        /// `ExactCount` or `All`.
        allocation_mode: String = "allocationMode",
        /// Number of devices for `ExactCount`.
        count: i64 = "count",
        /// Device class the devices must belong to.
        device_class_name: String = "deviceClassName",
        /// CEL selectors the devices must satisfy.
        selectors: Vec<DeviceSelector> = "selectors",
        /// Device taints this request tolerates.
        tolerations: Vec<DeviceToleration> = "tolerations",
    }
}

wire_object! {
    /// One alternative of a `firstAvailable` request.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeviceSubRequest {
        /// `ExactCount` or `All`.
        allocation_mode: String = "allocationMode",
        /// Number of devices for `ExactCount`.
        count: i64 = "count",
        /// Device class the devices must belong to.
        device_class_name: String = "deviceClassName",
        /// Name, referenced as `<request>/<subrequest>`.
        name: String = "name",
        /// CEL selectors the devices must satisfy.
        selectors: Vec<DeviceSelector> = "selectors",
        /// Device taints this alternative tolerates.
        tolerations: Vec<DeviceToleration> = "tolerations",
    }
}

wire_object! {
    /// Criteria for selecting a device.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeviceSelector {
        /// A CEL expression over the device's attributes and capacity.
        cel: CELDeviceSelector = "cel",
    }
}

wire_object! {
    /// A CEL device selector.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct CELDeviceSelector {
        /// Expression that must evaluate to true, e.g. `device.driver == "gpu.example.com"`.
        expression: String = "expression",
    }
}

wire_object! {
    /// Tolerates a device taint.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeviceToleration {
        /// Taint effect to match.
        effect: String = "effect",
        /// Taint key to match.
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
    /// Requires devices of several requests to share an attribute.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeviceConstraint {
        /// Fully qualified attribute that must match.
        match_attribute: String = "matchAttribute",
        /// Requests the constraint applies to; all when empty.
        requests: Vec<String> = "requests",
    }
}

wire_object! {
    /// Configuration for the devices of some requests.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeviceClaimConfiguration {
        /// Driver specific parameters.
        opaque: OpaqueDeviceConfiguration = "opaque",
        /// Requests this applies to; all when empty.
        requests: Vec<String> = "requests",
    }
}

wire_object! {
    /// Parameters passed verbatim to a driver.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct OpaqueDeviceConfiguration {
        /// Driver the parameters are meant for.
        driver: String = "driver",
        /// The parameters.
        parameters: RawExtension = "parameters",
    }
}

wire_object! {
    /// Allocation and reservation state of a claim.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ResourceClaimStatus {
        /// Set once the claim has been allocated.
        allocation: AllocationResult = "allocation",
        /// Status reported by drivers per allocated device.
        devices: Vec<AllocatedDeviceStatus> = "devices",
        /// Consumers currently allowed to use the claim.
        reserved_for: Vec<ResourceClaimConsumerReference> = "reservedFor",
    }
}

wire_object! {
    /// Result of allocating a claim.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct AllocationResult {
        /// When the allocation was made.
        allocation_timestamp: Time = "allocationTimestamp",
        /// Allocated devices.
        devices: DeviceAllocationResult = "devices",
        /// Nodes on which the allocated devices are usable.
        node_selector: NodeSelector = "nodeSelector",
    }
}

wire_object! {
    /// Allocated devices and their configuration.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeviceAllocationResult {
        /// Configuration copied from the claim and its classes.
        config: Vec<DeviceAllocationConfiguration> = "config",
        /// One entry per allocated device.
        results: Vec<DeviceRequestAllocationResult> = "results",
    }
}

wire_object! {
    /// Configuration applied to allocated devices.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct DeviceAllocationConfiguration {
        /// Driver specific parameters.
        opaque: OpaqueDeviceConfiguration = "opaque",
        /// Requests this applies to.
        requests: Vec<String> = "requests",
        /// `FromClass` or `FromClaim`.
        source: String = "source",
    }
}

wire_object! {
    /// One allocated device.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DeviceRequestAllocationResult {
        /// Allocated with administrative access.
        admin_access: bool = "adminAccess",
        /// Device name within the pool.
        device: String = "device",
        /// Driver providing the device.
        driver: String = "driver",
        /// Resource pool of the device.
        pool: String = "pool",
        /// Request or `<request>/<subrequest>` the device satisfies.
        request: String = "request",
        /// Device taints tolerated by the allocation.
        tolerations: Vec<DeviceToleration> = "tolerations",
    }
}

wire_object! {
    /// Driver reported state of an allocated device.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct AllocatedDeviceStatus {
        /// Device conditions.
        conditions: Vec<Condition> = "conditions",
        /// Arbitrary driver data.
        data: RawExtension = "data",
        /// Device name within the pool.
        device: String = "device",
        /// Driver providing the device.
        driver: String = "driver",
        /// Network configuration of the device.
        network_data: NetworkDeviceData = "networkData",
        /// Resource pool of the device.
        pool: String = "pool",
    }
}

wire_object! {
    /// Network identity of an allocated device.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct NetworkDeviceData {
        /// MAC address.
        hardware_address: String = "hardwareAddress",
        /// Interface name on the host.
        interface_name: String = "interfaceName",
        /// Assigned addresses in CIDR notation.
        ips: Vec<String> = "ips",
    }
}

wire_object! {
    /// A consumer of a claim, usually a pod.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ResourceClaimConsumerReference {
        /// API group of the consumer; empty for the core group.
        api_group: String = "apiGroup",
        /// Name of the consumer.
        name: String = "name",
        /// Resource type of the consumer, e.g. `pods`.
        resource: String = "resource",
        /// UID of the consumer.
        uid: String = "uid",
    }
}
