use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn docker_gen_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("docker-gen"));
	cmd.env("NO_COLOR", "1")
		.env_remove("DOCKER_HOST")
		.env_remove("DOCKER_GEN_LOG");
	cmd
}
