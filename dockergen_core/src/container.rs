use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::DockerGenError;
use crate::DockerGenResult;
use crate::ImageReference;

/// A normalized running container, shaped for templates.
///
/// Field names serialize in the `PascalCase` form templates address them by,
/// e.g. `container.Env.VIRTUAL_HOST` or `container.Image.Repository`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Container {
	#[serde(rename = "ID")]
	pub id: String,
	pub image: ImageReference,
	pub name: String,
	pub hostname: String,
	pub gateway: String,
	/// Never empty once built by [`build_container`]. Ordered by the
	/// `"<port>/<proto>"` key as a string, so `443/tcp` comes before `80/tcp`.
	pub addresses: Vec<Address>,
	pub env: BTreeMap<String, String>,
	pub volumes: BTreeMap<String, Volume>,
}

impl Container {
	/// Addresses that are bound to a port on the host.
	pub fn published_addresses(&self) -> impl Iterator<Item = &Address> {
		self.addresses
			.iter()
			.filter(|address| !address.host_port.is_empty())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
	#[serde(rename = "IP")]
	pub ip: String,
	pub port: String,
	pub proto: String,
	pub host_port: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Volume {
	pub path: String,
	pub host_path: String,
	pub read_write: bool,
}

/// Container state as reported by the runtime's inspect call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContainer {
	pub id: String,
	pub name: String,
	pub image: String,
	pub hostname: String,
	pub gateway: String,
	pub ip_address: String,
	/// Declared ports keyed `"<port>/<proto>"`, each with its host bindings.
	pub ports: BTreeMap<String, Vec<PortBinding>>,
	/// `KEY=VALUE` entries.
	pub env: Vec<String>,
	/// Container path to host path.
	pub volumes: BTreeMap<String, String>,
	/// Container path to read-write flag.
	pub volumes_rw: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortBinding {
	pub host_ip: String,
	pub host_port: String,
}

/// Convert one inspected container into its normalized form.
///
/// Only the first host binding of each declared port is kept. A container
/// without declared ports gets a single address carrying just its IP.
pub fn build_container(raw: &RawContainer) -> DockerGenResult<Container> {
	let mut addresses: Vec<Address> = raw
		.ports
		.iter()
		.map(|(spec, bindings)| {
			let (port, proto) = split_port_spec(spec);
			Address {
				ip: raw.ip_address.clone(),
				port: port.to_string(),
				proto: proto.to_string(),
				host_port: bindings
					.first()
					.map(|binding| binding.host_port.clone())
					.unwrap_or_default(),
			}
		})
		.collect();

	if addresses.is_empty() {
		addresses.push(Address {
			ip: raw.ip_address.clone(),
			..Address::default()
		});
	}

	let mut env = BTreeMap::new();
	for entry in &raw.env {
		let Some((key, value)) = entry.split_once('=') else {
			return Err(DockerGenError::MalformedInput(format!(
				"environment entry `{entry}` of container `{}` has no `=`",
				raw.id
			)));
		};
		env.insert(key.to_string(), value.to_string());
	}

	let volumes = raw
		.volumes
		.iter()
		.map(|(path, host_path)| {
			let volume = Volume {
				path: path.clone(),
				host_path: host_path.clone(),
				read_write: raw.volumes_rw.get(path).copied().unwrap_or(false),
			};
			(path.clone(), volume)
		})
		.collect();

	Ok(Container {
		id: raw.id.clone(),
		image: ImageReference::parse(&raw.image),
		name: raw.name.strip_prefix('/').unwrap_or(&raw.name).to_string(),
		hostname: raw.hostname.clone(),
		gateway: raw.gateway.clone(),
		addresses,
		env,
		volumes,
	})
}

/// Split `80/tcp` into `("80", "tcp")`. Without a protocol it is `tcp`.
fn split_port_spec(spec: &str) -> (&str, &str) {
	spec.split_once('/').unwrap_or((spec, "tcp"))
}
