//! Types from `k8s.io/apimachinery`

/// `meta` API group
pub mod meta {
    pub mod v1;
}

pub mod runtime;
