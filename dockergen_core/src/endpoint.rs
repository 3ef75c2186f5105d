use crate::DockerGenError;
use crate::DockerGenResult;

/// Socket path used when no endpoint is configured.
pub const DEFAULT_UNIX_SOCKET: &str = "/var/run/docker.sock";

/// Transport used to reach the container runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
	Unix,
	Tcp,
	Fd,
}

impl std::fmt::Display for Protocol {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Unix => "unix",
			Self::Tcp => "tcp",
			Self::Fd => "fd",
		};
		f.write_str(name)
	}
}

/// A resolved runtime endpoint. For `tcp` the address is always
/// `host:port`; for `unix` it is the socket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
	pub protocol: Protocol,
	pub address: String,
}

impl std::fmt::Display for Endpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.protocol {
			Protocol::Fd => f.write_str(&self.address),
			protocol => write!(f, "{protocol}://{}", self.address),
		}
	}
}

/// Resolve an endpoint string such as `unix:///var/run/docker.sock`,
/// `tcp://10.0.0.2:2375`, `fd://` or a bare `host:port`.
///
/// An empty string resolves to [`DEFAULT_UNIX_SOCKET`]. A bare `:2375` binds
/// to `127.0.0.1`.
pub fn parse_endpoint(input: &str) -> DockerGenResult<Endpoint> {
	let trimmed = input.trim();
	let invalid = |reason: &str| {
		DockerGenError::InvalidEndpoint {
			address: trimmed.to_string(),
			reason: reason.to_string(),
		}
	};

	let (protocol, address) = if trimmed == "tcp://" {
		return Err(invalid("missing host and port"));
	} else if let Some(path) = trimmed.strip_prefix("unix://") {
		let path = if path.is_empty() {
			DEFAULT_UNIX_SOCKET
		} else {
			path
		};
		(Protocol::Unix, path)
	} else if let Some(rest) = trimmed.strip_prefix("tcp://") {
		(Protocol::Tcp, rest)
	} else if trimmed.starts_with("fd://") {
		return Ok(Endpoint {
			protocol: Protocol::Fd,
			address: trimmed.to_string(),
		});
	} else if trimmed.is_empty() {
		(Protocol::Unix, DEFAULT_UNIX_SOCKET)
	} else if trimmed.contains("://") {
		return Err(invalid("unsupported protocol"));
	} else {
		(Protocol::Tcp, trimmed)
	};

	if protocol == Protocol::Unix {
		return Ok(Endpoint {
			protocol,
			address: address.to_string(),
		});
	}

	let parts: Vec<&str> = address.split(':').collect();
	let [host, port] = parts.as_slice() else {
		return Err(invalid("expected `host:port`"));
	};

	let host = if host.is_empty() { "127.0.0.1" } else { host };
	let port = match port.parse::<u16>() {
		Ok(port) if port != 0 => port,
		_ => return Err(invalid("port must be a number between 1 and 65535")),
	};

	Ok(Endpoint {
		protocol,
		address: format!("{host}:{port}"),
	})
}
