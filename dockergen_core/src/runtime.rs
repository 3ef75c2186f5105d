use tracing::debug;
use tracing::warn;

use crate::AnyResult;
use crate::Container;
use crate::DockerGenError;
use crate::DockerGenResult;
use crate::RawContainer;
use crate::build_container;

/// Read access to the live container set of a runtime.
pub trait ContainerRuntime {
	/// IDs of the currently running containers. Stopped containers are not
	/// included.
	fn list_running(&self) -> AnyResult<Vec<String>>;

	/// Inspect a single container by ID.
	fn inspect(&self, id: &str) -> AnyResult<RawContainer>;
}

/// Result of one fetch: every container that could be inspected, plus a
/// warning for each one that was skipped.
#[derive(Debug, Default)]
pub struct FetchResult {
	pub containers: Vec<Container>,
	pub warnings: Vec<DockerGenError>,
}

impl FetchResult {
	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}
}

/// List and inspect all running containers.
///
/// Only the listing call is fatal. A container that fails to inspect, for
/// example because it was removed after the listing, or whose inspection
/// data cannot be normalized, is skipped and recorded in
/// [`FetchResult::warnings`].
pub fn fetch_containers<R: ContainerRuntime + ?Sized>(
	runtime: &R,
) -> DockerGenResult<FetchResult> {
	let ids = runtime
		.list_running()
		.map_err(|e| DockerGenError::RuntimeQuery(e.to_string()))?;

	let mut result = FetchResult::default();

	for id in ids {
		let built = runtime
			.inspect(&id)
			.map_err(|e| {
				DockerGenError::Inspection {
					container_id: id.clone(),
					reason: e.to_string(),
				}
			})
			.and_then(|raw| build_container(&raw));

		match built {
			Ok(container) => result.containers.push(container),
			Err(error) => {
				warn!(container = %id, "skipping container: {error}");
				result.warnings.push(error);
			}
		}
	}

	debug!(
		containers = result.containers.len(),
		skipped = result.warnings.len(),
		"fetched running containers"
	);

	Ok(result)
}
