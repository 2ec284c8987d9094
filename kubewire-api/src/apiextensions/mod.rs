//! Types from `k8s.io/apiextensions-apiserver`

pub mod v1;
