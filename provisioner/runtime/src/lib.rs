#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
mod config;
mod render;

pub use self::{
    args::Args,
    config::{Config, MeshConfig},
    render::Format,
};
pub use tenancy_provisioner_core as core;
pub use tenancy_provisioner_k8s_bundle as bundle;
