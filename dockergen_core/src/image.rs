use serde::Deserialize;
use serde::Serialize;

/// The `[registry/]repository[:tag]` components of a container's image.
///
/// Parsing is lexical only. The string is split on the first `/` and then on
/// the first `:` of what remains, so `localhost:5000/app` yields a registry of
/// `localhost:5000` while `library/app:1.0/x` keeps the `/x` inside the tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageReference {
	pub registry: String,
	pub repository: String,
	pub tag: String,
}

impl ImageReference {
	pub fn parse(image: &str) -> Self {
		let (registry, remainder) = image.split_once('/').unwrap_or(("", image));
		let (repository, tag) = remainder.split_once(':').unwrap_or((remainder, ""));

		Self {
			registry: registry.to_string(),
			repository: repository.to_string(),
			tag: tag.to_string(),
		}
	}
}

impl std::fmt::Display for ImageReference {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if !self.registry.is_empty() {
			write!(f, "{}/", self.registry)?;
		}
		f.write_str(&self.repository)?;
		if !self.tag.is_empty() {
			write!(f, ":{}", self.tag)?;
		}
		Ok(())
	}
}
