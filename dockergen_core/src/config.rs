use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DockerGenError;
use crate::DockerGenResult;

/// Which containers a template is rendered against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
	/// Every running container.
	#[default]
	All,
	/// Containers with at least one address.
	Exposed,
	/// Containers with at least one port bound on the host.
	Published,
}

/// One template and where its output goes.
///
/// ```toml
/// [[config]]
/// template = "nginx.tmpl"
/// dest = "/etc/nginx/conf.d/default.conf"
/// only_exposed = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneratorConfig {
	/// Path to the template source.
	pub template: PathBuf,
	/// Destination file. When absent the output goes to standard output.
	#[serde(default)]
	pub dest: Option<PathBuf>,
	/// Only render containers that expose at least one address.
	#[serde(default)]
	pub only_exposed: bool,
	/// Only render containers with at least one published host port. Takes
	/// precedence over `only_exposed`.
	#[serde(default)]
	pub only_published: bool,
}

impl GeneratorConfig {
	pub fn new(template: impl Into<PathBuf>) -> Self {
		Self {
			template: template.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
		self.dest = Some(dest.into());
		self
	}

	pub fn filter_mode(&self) -> FilterMode {
		if self.only_published {
			FilterMode::Published
		} else if self.only_exposed {
			FilterMode::Exposed
		} else {
			FilterMode::All
		}
	}

	fn resolve_relative_to(&mut self, base: &Path) {
		if self.template.is_relative() {
			self.template = base.join(&self.template);
		}
		if let Some(dest) = self.dest.as_mut() {
			if dest.is_relative() {
				*dest = base.join(&*dest);
			}
		}
	}
}

/// Settings loaded from a docker-gen TOML file.
///
/// ```toml
/// endpoint = "unix:///var/run/docker.sock"
/// interval = 30
///
/// [[config]]
/// template = "nginx.tmpl"
/// dest = "default.conf"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
	/// Runtime endpoint, e.g. `unix:///var/run/docker.sock`.
	#[serde(default)]
	pub endpoint: Option<String>,
	/// Seconds between generation passes. When absent a single pass runs.
	#[serde(default)]
	pub interval: Option<u64>,
	#[serde(default, rename = "config")]
	pub configs: Vec<GeneratorConfig>,
}

impl Settings {
	/// Load settings from `path`. Relative template and destination paths
	/// are resolved against the directory holding the file.
	pub fn load(path: &Path) -> DockerGenResult<Self> {
		let content = std::fs::read_to_string(path)
			.map_err(DockerGenError::io("unable to read config file", path))?;
		let mut settings: Settings = toml::from_str(&content).map_err(|e| {
			DockerGenError::ConfigParse {
				path: path.to_path_buf(),
				reason: e.to_string(),
			}
		})?;

		let base = path.parent().unwrap_or_else(|| Path::new(""));
		for config in &mut settings.configs {
			config.resolve_relative_to(base);
		}

		Ok(settings)
	}
}
