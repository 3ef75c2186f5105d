use std::process;
use std::time::Duration;

use clap::Parser;
use dockergen_cli::DockerGenCli;
use dockergen_cli::DockerRuntime;
use dockergen_cli::RunPlan;
use dockergen_core::AnyEmptyResult;
use dockergen_core::Generator;
use dockergen_core::fetch_containers;
use dockergen_core::parse_endpoint;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding the log filter, e.g. `dockergen_core=debug`.
const LOG_ENV: &str = "DOCKER_GEN_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DockerGenCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose, use_color);

	if let Err(e) = run(&args) {
		match e.downcast::<dockergen_core::DockerGenError>() {
			Ok(docker_gen_err) => {
				let report: miette::Report = (*docker_gen_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_logging(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn run(args: &DockerGenCli) -> AnyEmptyResult {
	let plan = args.plan()?;
	let endpoint = parse_endpoint(&plan.endpoint)?;
	let runtime = DockerRuntime::connect(&endpoint)?;
	let generator = Generator::default();

	loop {
		generate_all(&runtime, &generator, &plan)?;

		let Some(interval) = plan.interval else {
			return Ok(());
		};
		debug!("sleeping {interval}s before the next pass");
		std::thread::sleep(Duration::from_secs(interval));
	}
}

fn generate_all(
	runtime: &DockerRuntime,
	generator: &Generator,
	plan: &RunPlan,
) -> AnyEmptyResult {
	let fetched = fetch_containers(runtime)?;

	for config in &plan.configs {
		generator.generate(config, &fetched.containers)?;
	}

	Ok(())
}
