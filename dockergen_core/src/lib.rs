//! `dockergen_core` turns the running containers of a Docker host into
//! configuration files. It normalizes container inspection data, exposes a
//! library of helper functions to [`minijinja`] templates, and writes the
//! rendered output atomically, only when it changed.
//!
//! ## Processing Pipeline
//!
//! ```text
//! ContainerRuntime (list running → inspect each)
//!   → build_container (image reference, addresses, env, volumes)
//!   → Generator (filter → render → compare → rename over destination)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Generator configuration and the TOML settings file.
//! - [`endpoint`]: Resolution of runtime endpoint strings such as
//!   `unix:///var/run/docker.sock`.
//! - [`functions`]: Template helpers (`groupBy`, `closest`, `sha1`, ...).
//!
//! ## Templates
//!
//! The filtered containers are available as `containers`:
//!
//! ```text
//! {% for host, group in groupBy(containers, "Env.VIRTUAL_HOST") | items %}
//! upstream {{ host }} {
//! {%- for container in group %}
//!   server {{ first(container.Addresses).IP }}:{{ first(container.Addresses).Port }};
//! {%- endfor %}
//! }
//! {% endfor %}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dockergen_core::ContainerRuntime;
//! use dockergen_core::DockerGenResult;
//! use dockergen_core::Generator;
//! use dockergen_core::GeneratorConfig;
//! use dockergen_core::fetch_containers;
//!
//! fn regenerate(runtime: &impl ContainerRuntime) -> DockerGenResult<bool> {
//! 	let fetched = fetch_containers(runtime)?;
//! 	let config = GeneratorConfig::new("nginx.tmpl").with_dest("default.conf");
//! 	Generator::default().generate(&config, &fetched.containers)
//! }
//! ```

pub use config::*;
pub use container::*;
pub use endpoint::*;
pub use engine::*;
pub use error::*;
pub use functions::HostEnvironment;
pub use functions::ProcessEnvironment;
pub use image::*;
pub use runtime::*;
pub use template::*;

pub mod config;
mod container;
pub mod endpoint;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod functions;
mod image;
mod runtime;
mod template;

#[cfg(test)]
mod __fixtures;
