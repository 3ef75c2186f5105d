use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::Address;
use crate::AnyResult;
use crate::Container;
use crate::ContainerRuntime;
use crate::PortBinding;
use crate::RawContainer;

pub(crate) fn container_with_env(id: &str, env: &[(&str, &str)]) -> Container {
	Container {
		id: id.to_string(),
		name: format!("container-{id}"),
		addresses: vec![Address {
			ip: format!("172.17.0.{id}"),
			..Address::default()
		}],
		env: env
			.iter()
			.map(|(key, value)| (key.to_string(), value.to_string()))
			.collect(),
		..Container::default()
	}
}

pub(crate) fn virtual_host_containers(hosts: &[&str]) -> Vec<Container> {
	hosts
		.iter()
		.enumerate()
		.map(|(index, host)| container_with_env(&(index + 1).to_string(), &[("VIRTUAL_HOST", host)]))
		.collect()
}

pub(crate) fn published_container(id: &str, host_port: &str) -> Container {
	let mut container = container_with_env(id, &[]);
	container.addresses = vec![Address {
		ip: format!("172.17.0.{id}"),
		port: "80".to_string(),
		proto: "tcp".to_string(),
		host_port: host_port.to_string(),
	}];
	container
}

pub(crate) fn raw_web_container() -> RawContainer {
	RawContainer {
		id: "3f4a9c".to_string(),
		name: "/web".to_string(),
		image: "registry.local/acme/web:1.4".to_string(),
		hostname: "3f4a9c".to_string(),
		gateway: "172.17.0.1".to_string(),
		ip_address: "172.17.0.5".to_string(),
		ports: BTreeMap::from([
			(
				"443/tcp".to_string(),
				vec![],
			),
			(
				"80/tcp".to_string(),
				vec![
					PortBinding {
						host_ip: "0.0.0.0".to_string(),
						host_port: "8080".to_string(),
					},
					PortBinding {
						host_ip: "::".to_string(),
						host_port: "8081".to_string(),
					},
				],
			),
		]),
		env: vec![
			"VIRTUAL_HOST=web.localhost".to_string(),
			"OPTS=a=b".to_string(),
			"EMPTY=".to_string(),
		],
		volumes: BTreeMap::from([
			("/data".to_string(), "/srv/web/data".to_string()),
			("/cache".to_string(), "/srv/web/cache".to_string()),
		]),
		volumes_rw: BTreeMap::from([("/data".to_string(), true)]),
	}
}

/// In-memory runtime. IDs listed in `vanished` appear in the listing but
/// fail to inspect.
#[derive(Debug, Default)]
pub(crate) struct FakeRuntime {
	pub list_error: Option<String>,
	pub containers: Vec<RawContainer>,
	pub vanished: Vec<String>,
}

impl ContainerRuntime for FakeRuntime {
	fn list_running(&self) -> AnyResult<Vec<String>> {
		if let Some(reason) = &self.list_error {
			return Err(reason.clone().into());
		}

		Ok(self
			.containers
			.iter()
			.map(|container| container.id.clone())
			.chain(self.vanished.iter().cloned())
			.collect())
	}

	fn inspect(&self, id: &str) -> AnyResult<RawContainer> {
		self.containers
			.iter()
			.find(|container| container.id == id)
			.cloned()
			.ok_or_else(|| format!("no such container: {id}").into())
	}
}

pub(crate) fn write_template(dir: &Path, name: &str, content: &str) -> PathBuf {
	let path = dir.join(name);
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write template: {e}"));
	path
}

pub(crate) fn dir_entries(dir: &Path) -> Vec<String> {
	let mut names: Vec<String> = std::fs::read_dir(dir)
		.unwrap_or_else(|e| panic!("read_dir: {e}"))
		.map(|entry| {
			entry
				.unwrap_or_else(|e| panic!("dir entry: {e}"))
				.file_name()
				.to_string_lossy()
				.into_owned()
		})
		.collect();
	names.sort();
	names
}
