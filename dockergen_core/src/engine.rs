use std::fs::File;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use minijinja::Value;
use minijinja::context;
use tracing::debug;
use tracing::info;

use crate::Container;
use crate::DockerGenError;
use crate::DockerGenResult;
use crate::FilterMode;
use crate::GeneratorConfig;
use crate::functions::HostEnvironment;
use crate::functions::ProcessEnvironment;
use crate::template::template_environment;

const TEMP_FILE_PREFIX: &str = "docker-gen";

/// Keep the containers a template should see under `mode`.
pub fn filter_containers(containers: &[Container], mode: FilterMode) -> Vec<&Container> {
	containers
		.iter()
		.filter(|container| {
			match mode {
				FilterMode::All => true,
				FilterMode::Exposed => !container.addresses.is_empty(),
				FilterMode::Published => container.published_addresses().next().is_some(),
			}
		})
		.collect()
}

/// Renders templates and writes their output.
#[derive(Clone)]
pub struct Generator {
	host: Arc<dyn HostEnvironment>,
}

impl Default for Generator {
	fn default() -> Self {
		Self::new(Arc::new(ProcessEnvironment))
	}
}

impl std::fmt::Debug for Generator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Generator").finish_non_exhaustive()
	}
}

impl Generator {
	/// A generator whose `hostEnviron` helper reads from `host`.
	pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
		Self { host }
	}

	/// Render the template at `template_path` with `containers` bound to the
	/// `containers` variable. The output is complete or an error is
	/// returned.
	pub fn render(&self, template_path: &Path, containers: &[&Container]) -> DockerGenResult<String> {
		let source = std::fs::read_to_string(template_path)
			.map_err(DockerGenError::io("unable to read template", template_path))?;
		let name = template_path
			.file_name()
			.map_or_else(|| "template".to_string(), |name| name.to_string_lossy().into_owned());

		let mut env = template_environment(Arc::clone(&self.host));
		env.add_template(&name, &source).map_err(|e| {
			DockerGenError::TemplateParse {
				path: template_path.to_path_buf(),
				reason: e.to_string(),
			}
		})?;

		let template = env.get_template(&name).map_err(|e| {
			DockerGenError::TemplateParse {
				path: template_path.to_path_buf(),
				reason: e.to_string(),
			}
		})?;

		let ctx = context! { containers => Value::from_serialize(containers) };
		template.render(ctx).map_err(|e| {
			DockerGenError::TemplateRender {
				path: template_path.to_path_buf(),
				reason: render_reason(&e),
			}
		})
	}

	/// Run one generation pass, writing to standard output when the config
	/// has no destination. Returns whether the output changed.
	pub fn generate(
		&self,
		config: &GeneratorConfig,
		containers: &[Container],
	) -> DockerGenResult<bool> {
		let stdout = std::io::stdout();
		self.generate_to(config, containers, &mut stdout.lock())
	}

	/// Like [`Generator::generate`], with `stdout` standing in for standard
	/// output.
	///
	/// Without a destination the output is written unconditionally and the
	/// pass always reports a change. With one, the output lands in a
	/// temporary file beside the destination which takes over the mode and
	/// owner of any existing file, and is renamed over it only when the bytes
	/// differ.
	pub fn generate_to<W: Write>(
		&self,
		config: &GeneratorConfig,
		containers: &[Container],
		stdout: &mut W,
	) -> DockerGenResult<bool> {
		let filtered = filter_containers(containers, config.filter_mode());
		let rendered = self.render(&config.template, &filtered)?;

		let Some(dest) = config.dest.as_deref() else {
			stdout
				.write_all(rendered.as_bytes())
				.and_then(|()| stdout.flush())
				.map_err(DockerGenError::io("unable to write output to", "<stdout>"))?;
			return Ok(true);
		};

		let changed = replace_if_changed(dest, rendered.as_bytes())?;
		if changed {
			info!(
				"Generated '{}' from {} containers",
				dest.display(),
				filtered.len()
			);
		} else {
			debug!(dest = %dest.display(), "destination is up to date");
		}

		Ok(changed)
	}
}

fn render_reason(error: &minijinja::Error) -> String {
	let mut reason = error.to_string();
	let mut source = std::error::Error::source(error);
	while let Some(cause) = source {
		let message = cause.to_string();
		if !reason.contains(&message) {
			reason.push_str(": ");
			reason.push_str(&message);
		}
		source = std::error::Error::source(cause);
	}
	reason
}

/// Atomically replace `dest` with `contents` unless it already holds exactly
/// those bytes.
fn replace_if_changed(dest: &Path, contents: &[u8]) -> DockerGenResult<bool> {
	let dir = match dest.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut temp = tempfile::Builder::new()
		.prefix(TEMP_FILE_PREFIX)
		.tempfile_in(dir)
		.map_err(DockerGenError::io("unable to create temp file in", dir))?;
	let temp_path = temp.path().to_path_buf();

	temp.write_all(contents)
		.and_then(|()| temp.flush())
		.map_err(DockerGenError::io("unable to write temp file", &temp_path))?;

	let current = match std::fs::metadata(dest) {
		Ok(metadata) => {
			copy_mode_and_owner(temp.as_file(), &metadata, &temp_path)?;
			std::fs::read(dest)
				.map_err(DockerGenError::io("unable to compare current file contents", dest))?
		}
		Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
		Err(e) => return Err(DockerGenError::io("unable to stat", dest)(e)),
	};

	if current == contents {
		return Ok(false);
	}

	temp.persist(dest)
		.map_err(|e| DockerGenError::io("unable to create dest file", dest)(e.error))?;

	Ok(true)
}

fn copy_mode_and_owner(file: &File, metadata: &Metadata, path: &Path) -> DockerGenResult<()> {
	file.set_permissions(metadata.permissions())
		.map_err(DockerGenError::io("unable to chmod temp file", path))?;

	#[cfg(unix)]
	{
		use std::os::unix::fs::MetadataExt;
		std::os::unix::fs::fchown(file, Some(metadata.uid()), Some(metadata.gid()))
			.map_err(DockerGenError::io("unable to chown temp file", path))?;
	}

	Ok(())
}
