//! Helper functions exposed to templates.
//!
//! Functions over strings and paths are plain typed Rust. Functions that
//! accept "any mapping" or "any sequence" ([`keys`], [`dict`], [`first`],
//! [`last`], [`coalesce`], [`contains`]) take a [`minijinja::Value`] and
//! dispatch on its [`ValueKind`], returning a typed error for every shape
//! they do not support.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use minijinja::Value;
use minijinja::value::ValueKind;
use serde::Serialize;
use ::sha1::Digest;
use ::sha1::Sha1;

use crate::DockerGenError;
use crate::DockerGenResult;

/// Read-only access to the host's environment variables.
pub trait HostEnvironment: Send + Sync {
	fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl HostEnvironment for ProcessEnvironment {
	fn var(&self, name: &str) -> Option<String> {
		std::env::var(name).ok()
	}
}

impl HostEnvironment for HashMap<String, String> {
	fn var(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}

impl HostEnvironment for BTreeMap<String, String> {
	fn var(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}

/// Look up a host environment variable, returning an empty string when unset.
pub fn host_environ(host: &dyn HostEnvironment, name: &str) -> String {
	host.var(name).unwrap_or_default()
}

/// Walk a dotted path such as `Env.VIRTUAL_HOST` into the serialized form of
/// a value. A leading `.` is ignored. Returns `None` unless the path ends at
/// a string.
fn deep_get<'v>(value: &'v serde_json::Value, path: &str) -> Option<&'v str> {
	path.trim_start_matches('.')
		.split('.')
		.try_fold(value, |current, segment| current.get(segment))
		.and_then(serde_json::Value::as_str)
}

fn serialized<T: Serialize>(item: &T) -> DockerGenResult<serde_json::Value> {
	serde_json::to_value(item).map_err(|e| DockerGenError::MalformedInput(e.to_string()))
}

/// Group items by the string found at `key`. Items without a string at that
/// path are left out. Group keys are sorted.
pub fn group_by<T: Serialize + Clone>(
	items: &[T],
	key: &str,
) -> DockerGenResult<BTreeMap<String, Vec<T>>> {
	let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
	for item in items {
		let value = serialized(item)?;
		if let Some(group) = deep_get(&value, key) {
			groups.entry(group.to_string()).or_default().push(item.clone());
		}
	}
	Ok(groups)
}

/// Like [`group_by`], but the value at `key` is split on `sep` first so one
/// item can land in several groups.
pub fn group_by_multi<T: Serialize + Clone>(
	items: &[T],
	key: &str,
	sep: &str,
) -> DockerGenResult<BTreeMap<String, Vec<T>>> {
	let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
	for item in items {
		let value = serialized(item)?;
		let Some(joined) = deep_get(&value, key) else {
			continue;
		};
		for group in joined.split(sep) {
			groups.entry(group.to_string()).or_default().push(item.clone());
		}
	}
	Ok(groups)
}

/// The sorted group keys [`group_by`] would produce.
pub fn group_by_keys<T: Serialize + Clone>(items: &[T], key: &str) -> DockerGenResult<Vec<String>> {
	Ok(group_by(items, key)?.into_keys().collect())
}

/// Whether `key` is present in a mapping. Anything other than a map
/// contains nothing.
pub fn contains(map: &Value, key: &str) -> bool {
	map.kind() == ValueKind::Map
		&& map
			.get_item(&Value::from(key))
			.is_ok_and(|value| !value.is_undefined())
}

/// The keys of a mapping. A missing value has no keys and yields none.
pub fn keys(map: &Value) -> DockerGenResult<Value> {
	match map.kind() {
		ValueKind::Undefined | ValueKind::None => Ok(Value::from(())),
		ValueKind::Map => {
			let keys: Vec<Value> = map
				.try_iter()
				.map_err(|e| DockerGenError::MalformedInput(e.to_string()))?
				.collect();
			Ok(Value::from(keys))
		}
		kind => {
			Err(DockerGenError::TypeMismatch {
				function: "keys",
				kind: kind.to_string(),
			})
		}
	}
}

/// Build a mapping from alternating keys and values.
pub fn dict(values: &[Value]) -> DockerGenResult<Value> {
	if values.len() % 2 != 0 {
		return Err(DockerGenError::InvalidArity {
			function: "dict",
			expected: "an even number of arguments",
			got: values.len(),
		});
	}

	let mut map = BTreeMap::new();
	for pair in values.chunks_exact(2) {
		let Some(key) = pair[0].as_str() else {
			return Err(DockerGenError::KeyType(pair[0].kind().to_string()));
		};
		map.insert(key.to_string(), pair[1].clone());
	}

	Ok(Value::from_serialize(&map))
}

fn sequence_items(function: &'static str, value: &Value) -> DockerGenResult<Vec<Value>> {
	match value.kind() {
		ValueKind::Undefined | ValueKind::None => Ok(Vec::new()),
		ValueKind::Seq | ValueKind::Iterable => {
			Ok(value
				.try_iter()
				.map_err(|e| DockerGenError::MalformedInput(e.to_string()))?
				.collect())
		}
		kind => {
			Err(DockerGenError::TypeMismatch {
				function,
				kind: kind.to_string(),
			})
		}
	}
}

/// First element of a sequence, or none when it is empty or missing.
pub fn first(sequence: &Value) -> DockerGenResult<Value> {
	Ok(sequence_items("first", sequence)?
		.into_iter()
		.next()
		.unwrap_or_else(|| Value::from(())))
}

/// Last element of a sequence.
pub fn last(sequence: &Value) -> DockerGenResult<Value> {
	sequence_items("last", sequence)?
		.pop()
		.ok_or(DockerGenError::IndexOutOfRange { function: "last" })
}

/// The first value that is neither undefined nor none.
pub fn coalesce(values: &[Value]) -> Value {
	values
		.iter()
		.find(|value| !value.is_undefined() && !value.is_none())
		.cloned()
		.unwrap_or_else(|| Value::from(()))
}

pub fn has_prefix(prefix: &str, s: &str) -> bool {
	s.starts_with(prefix)
}

pub fn has_suffix(suffix: &str, s: &str) -> bool {
	s.ends_with(suffix)
}

pub fn trim_prefix<'s>(prefix: &str, s: &'s str) -> &'s str {
	s.strip_prefix(prefix).unwrap_or(s)
}

pub fn trim_suffix<'s>(suffix: &str, s: &'s str) -> &'s str {
	s.strip_suffix(suffix).unwrap_or(s)
}

/// The first `length` bytes of `s`, or all of it when it is shorter. A cut
/// inside a multi-byte character moves back to the previous boundary.
pub fn string_head(s: &str, length: usize) -> &str {
	if s.len() <= length {
		return s;
	}
	let mut end = length;
	while !s.is_char_boundary(end) {
		end -= 1;
	}
	&s[..end]
}

/// The last `length` bytes of `s`, or an empty string when it is not longer
/// than `length`.
pub fn string_tail(s: &str, length: usize) -> &str {
	if s.len() <= length {
		return "";
	}
	let mut start = s.len() - length;
	while !s.is_char_boundary(start) {
		start += 1;
	}
	&s[start..]
}

/// The longest entry of `values` contained in `input`. Ties go to the entry
/// seen first; no match is an empty string.
pub fn closest<'v>(values: &'v [String], input: &str) -> &'v str {
	values.iter().fold("", |best, value| {
		if value.len() > best.len() && input.contains(value.as_str()) {
			value.as_str()
		} else {
			best
		}
	})
}

pub fn split(s: &str, sep: &str) -> Vec<String> {
	s.split(sep).map(str::to_string).collect()
}

/// Replace the first `count` occurrences of `from`. A negative count
/// replaces every occurrence.
pub fn replace(s: &str, from: &str, to: &str, count: i64) -> String {
	match usize::try_from(count) {
		Ok(count) => s.replacen(from, to, count),
		Err(_) => s.replace(from, to),
	}
}

/// Serialize to compact JSON without a trailing newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> DockerGenResult<String> {
	serde_json::to_string(value).map_err(|e| DockerGenError::MalformedInput(e.to_string()))
}

/// Serialize to JSON indented with four spaces.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> DockerGenResult<String> {
	let mut buffer = Vec::new();
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
	value
		.serialize(&mut serializer)
		.map_err(|e| DockerGenError::MalformedInput(e.to_string()))?;
	String::from_utf8(buffer).map_err(|e| DockerGenError::MalformedInput(e.to_string()))
}

/// Hex encoded SHA-1 digest of the UTF-8 bytes of `input`.
pub fn sha1(input: &str) -> String {
	let mut hasher = Sha1::new();
	hasher.update(input.as_bytes());
	hex::encode(hasher.finalize())
}

/// Names of the entries directly under `path`, sorted.
pub fn dir_list(path: &Path) -> DockerGenResult<Vec<String>> {
	let entries =
		std::fs::read_dir(path).map_err(DockerGenError::io("unable to list directory", path))?;

	let mut names = Vec::new();
	for entry in entries {
		let entry = entry.map_err(DockerGenError::io("unable to list directory", path))?;
		names.push(entry.file_name().to_string_lossy().into_owned());
	}
	names.sort();
	Ok(names)
}

pub fn exists(path: &Path) -> DockerGenResult<bool> {
	path.try_exists()
		.map_err(DockerGenError::io("unable to check existence of", path))
}
