use std::collections::BTreeMap;

use bollard::Docker;
use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::InspectContainerOptions;
use bollard::query_parameters::ListContainersOptions;
use dockergen_core::AnyResult;
use dockergen_core::ContainerRuntime;
use dockergen_core::DockerGenError;
use dockergen_core::Endpoint;
use dockergen_core::PortBinding;
use dockergen_core::Protocol;
use dockergen_core::RawContainer;
use tokio::runtime::Runtime;
use tracing::debug;

/// Seconds before a request to the runtime times out.
const REQUEST_TIMEOUT: u64 = 120;

/// A [`ContainerRuntime`] backed by the Docker Engine API.
///
/// The client is asynchronous. Every call blocks on a private tokio runtime
/// so callers stay synchronous.
pub struct DockerRuntime {
	docker: Docker,
	runtime: Runtime,
}

impl DockerRuntime {
	pub fn connect(endpoint: &Endpoint) -> AnyResult<Self> {
		let runtime = Runtime::new()?;
		let _guard = runtime.enter();

		let docker = match endpoint.protocol {
			Protocol::Unix => {
				Docker::connect_with_socket(
					&endpoint.address,
					REQUEST_TIMEOUT,
					bollard::API_DEFAULT_VERSION,
				)?
			}
			Protocol::Tcp => {
				Docker::connect_with_http(
					&format!("tcp://{}", endpoint.address),
					REQUEST_TIMEOUT,
					bollard::API_DEFAULT_VERSION,
				)?
			}
			Protocol::Fd => {
				return Err(DockerGenError::InvalidEndpoint {
					address: endpoint.to_string(),
					reason: "socket activation endpoints are not supported".to_string(),
				}
				.into());
			}
		};

		debug!(%endpoint, "connected to container runtime");

		Ok(Self { docker, runtime })
	}
}

impl ContainerRuntime for DockerRuntime {
	fn list_running(&self) -> AnyResult<Vec<String>> {
		let summaries = self
			.runtime
			.block_on(self.docker.list_containers(None::<ListContainersOptions>))?;

		Ok(summaries
			.into_iter()
			.filter_map(|summary| summary.id)
			.collect())
	}

	fn inspect(&self, id: &str) -> AnyResult<RawContainer> {
		let response = self
			.runtime
			.block_on(self.docker.inspect_container(id, None::<InspectContainerOptions>))?;

		Ok(raw_container(response))
	}
}

/// Flatten an inspect response into the fields containers are built from.
pub(crate) fn raw_container(response: ContainerInspectResponse) -> RawContainer {
	let config = response.config.unwrap_or_default();
	let network = response.network_settings.unwrap_or_default();

	// Containers on user-defined networks only report addresses per network.
	// The first network by name wins.
	let attached = network.networks.as_ref().and_then(|networks| {
		networks
			.iter()
			.min_by(|(left, _), (right, _)| left.cmp(right))
			.map(|(_, settings)| settings)
	});
	let ip_address = non_empty(network.ip_address)
		.or_else(|| attached.and_then(|settings| non_empty(settings.ip_address.clone())))
		.unwrap_or_default();
	let gateway = non_empty(network.gateway)
		.or_else(|| attached.and_then(|settings| non_empty(settings.gateway.clone())))
		.unwrap_or_default();

	let ports = network
		.ports
		.unwrap_or_default()
		.into_iter()
		.map(|(spec, bindings)| {
			let bindings = bindings
				.unwrap_or_default()
				.into_iter()
				.map(|binding| {
					PortBinding {
						host_ip: binding.host_ip.unwrap_or_default(),
						host_port: binding.host_port.unwrap_or_default(),
					}
				})
				.collect();
			(spec, bindings)
		})
		.collect();

	let mut volumes = BTreeMap::new();
	let mut volumes_rw = BTreeMap::new();
	for mount in response.mounts.unwrap_or_default() {
		let Some(path) = mount.destination else {
			continue;
		};
		volumes.insert(path.clone(), mount.source.unwrap_or_default());
		if let Some(rw) = mount.rw {
			volumes_rw.insert(path, rw);
		}
	}

	RawContainer {
		id: response.id.unwrap_or_default(),
		name: response.name.unwrap_or_default(),
		image: config.image.unwrap_or_default(),
		hostname: config.hostname.unwrap_or_default(),
		gateway,
		ip_address,
		ports,
		env: config.env.unwrap_or_default(),
		volumes,
		volumes_rw,
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}
