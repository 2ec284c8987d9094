//! Types from `k8s.io/api`

/// `apps` group
pub mod apps {
    pub mod v1;
}

/// `autoscaling` group
pub mod autoscaling {
    pub mod v1;
}

/// `coordination.k8s.io` group
pub mod coordination {
    pub mod v1;
}

/// The core group, served under `/api`
pub mod core {
    pub mod v1;
}

/// `resource.k8s.io` group
pub mod resource {
    pub mod v1;
}
