use std::path::PathBuf;

use clap::Parser;
use dockergen_core::DockerGenError;
use dockergen_core::DockerGenResult;
use dockergen_core::GeneratorConfig;
use dockergen_core::Settings;

pub use crate::docker::*;

mod docker;


#[derive(Debug, Parser)]
#[command(
	author,
	version,
	about = "Render configuration files from the running containers on a Docker host.",
	long_about = "docker-gen renders templates against the metadata of every running \
	              container and writes the result to a destination file, replacing it only when \
	              the output changed.\n\nQuick start:\n  docker-gen nginx.tmpl                  \
	              Print to standard output\n  docker-gen nginx.tmpl default.conf     Write a \
	              file\n  docker-gen --config docker-gen.toml    Render several templates\n  \
	              docker-gen --interval 30 nginx.tmpl x  Regenerate every 30 seconds"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct DockerGenCli {
	/// Template file to render.
	#[arg(value_name = "TEMPLATE", conflicts_with = "config")]
	pub template: Option<PathBuf>,

	/// Destination file. The output is written to standard output when
	/// omitted.
	#[arg(value_name = "DEST", requires = "template")]
	pub dest: Option<PathBuf>,

	/// TOML file with one or more `[[config]]` sections.
	#[arg(long, short, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Container runtime endpoint, e.g. `unix:///var/run/docker.sock` or
	/// `tcp://10.0.0.2:2375`. Defaults to the local socket.
	#[arg(long, short, env = "DOCKER_HOST", value_name = "ENDPOINT")]
	pub endpoint: Option<String>,

	/// Only include containers with at least one address.
	#[arg(long, default_value_t = false)]
	pub only_exposed: bool,

	/// Only include containers with a port published on the host.
	#[arg(long, default_value_t = false)]
	pub only_published: bool,

	/// Regenerate every SECONDS seconds instead of running a single pass.
	#[arg(long, short, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
	pub interval: Option<u64>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

/// What a run does once the arguments and any settings file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
	/// Raw endpoint string, resolved later with
	/// [`dockergen_core::parse_endpoint`].
	pub endpoint: String,
	/// Seconds between passes. `None` runs once.
	pub interval: Option<u64>,
	pub configs: Vec<GeneratorConfig>,
}

impl DockerGenCli {
	/// Merge the command line with the settings file named by `--config`.
	/// Flags given on the command line win over the file.
	pub fn plan(&self) -> DockerGenResult<RunPlan> {
		let settings = match &self.config {
			Some(path) => Settings::load(path)?,
			None => Settings::default(),
		};

		let mut configs = match &self.template {
			Some(template) => {
				vec![GeneratorConfig {
					template: template.clone(),
					dest: self.dest.clone(),
					..GeneratorConfig::default()
				}]
			}
			None => settings.configs,
		};

		if configs.is_empty() {
			return Err(DockerGenError::MissingTemplate);
		}

		for config in &mut configs {
			config.only_exposed |= self.only_exposed;
			config.only_published |= self.only_published;
		}

		Ok(RunPlan {
			endpoint: self
				.endpoint
				.clone()
				.or(settings.endpoint)
				.unwrap_or_default(),
			interval: self
				.interval
				.or(settings.interval)
				.filter(|seconds| *seconds > 0),
			configs,
		})
	}
}
