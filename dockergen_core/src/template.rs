use std::path::Path;
use std::sync::Arc;

use minijinja::AutoEscape;
use minijinja::Environment;
use minijinja::Error;
use minijinja::ErrorKind;
use minijinja::Output;
use minijinja::State;
use minijinja::UndefinedBehavior;
use minijinja::Value;
use minijinja::value::ValueKind;
use minijinja::value::Rest;
use minijinja::value::ViaDeserialize;

use crate::Container;
use crate::DockerGenError;
use crate::functions;
use crate::functions::HostEnvironment;

/// Create a template environment with every docker-gen helper registered.
/// Templates see the filtered container list as `containers`.
///
/// Output is never auto-escaped, booleans print as `true`/`false` and a
/// template's trailing newline is kept, so configuration files render byte
/// for byte.
pub fn template_environment<'source>(host: Arc<dyn HostEnvironment>) -> Environment<'source> {
	let mut env = Environment::new();
	env.set_keep_trailing_newline(true);
	env.set_undefined_behavior(UndefinedBehavior::Chainable);
	env.set_auto_escape_callback(|_| AutoEscape::None);
	env.set_formatter(format_value);

	env.add_function("closest", closest);
	env.add_function("coalesce", coalesce);
	env.add_function("contains", contains);
	env.add_function("dict", dict);
	env.add_function("dir", dir);
	env.add_function("exists", exists);
	env.add_function("first", first);
	env.add_function("groupBy", group_by);
	env.add_function("groupByKeys", group_by_keys);
	env.add_function("groupByMulti", group_by_multi);
	env.add_function("hasPrefix", has_prefix);
	env.add_function("hasSuffix", has_suffix);
	env.add_function("json", json);
	env.add_function("jsonPretty", json_pretty);
	env.add_function("keys", keys);
	env.add_function("last", last);
	env.add_function("replace", replace);
	env.add_function("sha1", sha1);
	env.add_function("split", split);
	env.add_function("stringHead", string_head);
	env.add_function("stringTail", string_tail);
	env.add_function("trimPrefix", trim_prefix);
	env.add_function("trimSuffix", trim_suffix);
	env.add_function("hostEnviron", move |name: &str| {
		functions::host_environ(host.as_ref(), name)
	});

	env
}

fn format_value(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
	if value.kind() != ValueKind::Bool {
		return minijinja::escape_formatter(out, state, value);
	}

	let text = if value.is_true() { "true" } else { "false" };
	out.write_str(text)
		.map_err(|e| Error::new(ErrorKind::WriteFailure, "unable to write output").with_source(e))
}

fn template_error(error: DockerGenError) -> Error {
	Error::new(ErrorKind::InvalidOperation, error.to_string()).with_source(error)
}

fn group_by(containers: ViaDeserialize<Vec<Container>>, key: &str) -> Result<Value, Error> {
	functions::group_by(&containers.0, key)
		.map(|groups| Value::from_serialize(&groups))
		.map_err(template_error)
}

fn group_by_multi(
	containers: ViaDeserialize<Vec<Container>>,
	key: &str,
	sep: &str,
) -> Result<Value, Error> {
	functions::group_by_multi(&containers.0, key, sep)
		.map(|groups| Value::from_serialize(&groups))
		.map_err(template_error)
}

fn group_by_keys(
	containers: ViaDeserialize<Vec<Container>>,
	key: &str,
) -> Result<Vec<String>, Error> {
	functions::group_by_keys(&containers.0, key).map_err(template_error)
}

fn contains(map: Value, key: &str) -> bool {
	functions::contains(&map, key)
}

fn keys(map: Value) -> Result<Value, Error> {
	functions::keys(&map).map_err(template_error)
}

fn dict(values: Rest<Value>) -> Result<Value, Error> {
	functions::dict(&values.0).map_err(template_error)
}

fn first(sequence: Value) -> Result<Value, Error> {
	functions::first(&sequence).map_err(template_error)
}

fn last(sequence: Value) -> Result<Value, Error> {
	functions::last(&sequence).map_err(template_error)
}

fn coalesce(values: Rest<Value>) -> Value {
	functions::coalesce(&values.0)
}

fn has_prefix(prefix: &str, s: &str) -> bool {
	functions::has_prefix(prefix, s)
}

fn has_suffix(suffix: &str, s: &str) -> bool {
	functions::has_suffix(suffix, s)
}

fn trim_prefix(prefix: &str, s: &str) -> String {
	functions::trim_prefix(prefix, s).to_string()
}

fn trim_suffix(suffix: &str, s: &str) -> String {
	functions::trim_suffix(suffix, s).to_string()
}

fn string_head(s: &str, length: usize) -> String {
	functions::string_head(s, length).to_string()
}

fn string_tail(s: &str, length: usize) -> String {
	functions::string_tail(s, length).to_string()
}

fn closest(values: Vec<String>, input: &str) -> String {
	functions::closest(&values, input).to_string()
}

fn split(s: &str, sep: &str) -> Vec<String> {
	functions::split(s, sep)
}

fn replace(s: &str, from: &str, to: &str, count: i64) -> String {
	functions::replace(s, from, to, count)
}

fn json(value: Value) -> Result<String, Error> {
	functions::to_json(&value).map_err(template_error)
}

fn json_pretty(value: Value) -> Result<String, Error> {
	functions::to_json_pretty(&value).map_err(template_error)
}

fn sha1(input: &str) -> String {
	functions::sha1(input)
}

fn dir(path: &str) -> Result<Vec<String>, Error> {
	functions::dir_list(Path::new(path)).map_err(template_error)
}

fn exists(path: &str) -> Result<bool, Error> {
	functions::exists(Path::new(path)).map_err(template_error)
}
