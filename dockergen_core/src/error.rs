use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DockerGenError {
	#[error("{operation} `{}`: {source}", path.display())]
	#[diagnostic(code(docker_gen::io_error))]
	Io {
		operation: &'static str,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid endpoint `{address}`: {reason}")]
	#[diagnostic(
		code(docker_gen::invalid_endpoint),
		help("use `unix:///path/to/socket`, `tcp://host:port`, or `host:port`")
	)]
	InvalidEndpoint { address: String, reason: String },

	#[error("unable to list running containers: {0}")]
	#[diagnostic(
		code(docker_gen::runtime_query),
		help("check that the container runtime is reachable at the configured endpoint")
	)]
	RuntimeQuery(String),

	#[error("error inspecting container `{container_id}`: {reason}")]
	#[diagnostic(code(docker_gen::inspection), severity(Warning))]
	Inspection { container_id: String, reason: String },

	#[error("malformed input: {0}")]
	#[diagnostic(code(docker_gen::malformed_input))]
	MalformedInput(String),

	#[error("cannot call `{function}` on a value of kind `{kind}`")]
	#[diagnostic(code(docker_gen::type_mismatch))]
	TypeMismatch { function: &'static str, kind: String },

	#[error("`{function}` expects {expected}, got {got} argument(s)")]
	#[diagnostic(code(docker_gen::invalid_arity))]
	InvalidArity {
		function: &'static str,
		expected: &'static str,
		got: usize,
	},

	#[error("dict keys must be strings, got `{0}`")]
	#[diagnostic(code(docker_gen::key_type))]
	KeyType(String),

	#[error("`{function}` called on an empty sequence")]
	#[diagnostic(code(docker_gen::index_out_of_range))]
	IndexOutOfRange { function: &'static str },

	#[error("unable to parse template `{}`: {reason}", path.display())]
	#[diagnostic(code(docker_gen::template_parse))]
	TemplateParse { path: PathBuf, reason: String },

	#[error("template error in `{}`: {reason}", path.display())]
	#[diagnostic(
		code(docker_gen::template_render),
		help("no output was written; fix the template and regenerate")
	)]
	TemplateRender { path: PathBuf, reason: String },

	#[error("failed to parse config file `{}`: {reason}", path.display())]
	#[diagnostic(
		code(docker_gen::config_parse),
		help("check that the file is valid TOML with one or more [[config]] sections")
	)]
	ConfigParse { path: PathBuf, reason: String },

	#[error("no template configured")]
	#[diagnostic(
		code(docker_gen::missing_template),
		help("pass a template path or a `--config` file with [[config]] entries")
	)]
	MissingTemplate,
}

impl DockerGenError {
	pub(crate) fn io(
		operation: &'static str,
		path: impl Into<PathBuf>,
	) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| {
			Self::Io {
				operation,
				path,
				source,
			}
		}
	}
}

pub type DockerGenResult<T> = Result<T, DockerGenError>;
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
