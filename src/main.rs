use clap::Parser;
use crash_harness::catalog::TestCatalog;
use crash_harness::config::ConfigLoader;
use crash_harness::observer::TracingObserver;
use crash_harness::port::{SerialTransport, SyncSerialPort};
use crash_harness::report;
use crash_harness::runner::TestRunner;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Suite completed but the success rate fell below the pass threshold.
const EXIT_BELOW_THRESHOLD: u8 = 1;
/// Suite aborted before any test ran (connection or readiness failure).
const EXIT_SUITE_ABORTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "crash-harness",
    version,
    about = "Hardware-in-the-loop crash-test harness for the device's crash-logging subsystem.",
    long_about = "Drives a device over a serial link, triggers crashes (null pointer, stack \
                  overflow, heap corruption, assertion failure, watchdog timeout), watches the \
                  telemetry stream for crash logs and reboot banners, and reports pass/fail per test."
)]
struct Args {
    /// Serial port the device is attached to (overrides the config file)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Test to run: "all" or a single test id
    #[arg(short, long, default_value = "all")]
    test: String,

    /// Save results to a JSON file
    #[arg(short, long)]
    save: bool,

    /// Output filename for results (implies --save)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Explicit configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let loader = match args.config.as_deref() {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::load(),
    };
    let config = match loader {
        Ok(loader) => {
            if let Some(path) = &loader.config_path {
                info!("Loaded configuration from {}", path.display());
            }
            loader.into_config()
        }
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_SUITE_ABORTED);
        }
    };

    let catalog = TestCatalog::standard();

    let test_ids: Vec<String> = if args.test == "all" {
        catalog.ids().iter().map(|id| id.to_string()).collect()
    } else if catalog.get(&args.test).is_some() {
        vec![args.test.clone()]
    } else {
        error!(
            "Unknown test: {}. Available tests: {}",
            args.test,
            catalog.ids().join(", ")
        );
        return ExitCode::from(EXIT_SUITE_ABORTED);
    };

    let port_name = match args.port.or(config.serial.port.clone()) {
        Some(name) => name,
        None => {
            error!("No serial port specified (use --port or the config file)");
            return ExitCode::from(EXIT_SUITE_ABORTED);
        }
    };
    let baud = args.baud.unwrap_or(config.serial.baud);

    info!("Crash Test Suite");
    info!("Port: {} at {} baud", port_name, baud);
    info!("Tests: {}", test_ids.join(", "));

    let transport = match SyncSerialPort::open(&port_name, baud) {
        Ok(port) => {
            info!("Connected to {}", port.name());
            port
        }
        Err(e) => {
            error!("Failed to connect to {}: {}", port_name, e);
            return ExitCode::from(EXIT_SUITE_ABORTED);
        }
    };

    let observer = TracingObserver;
    let mut runner = TestRunner::new(transport, catalog.clone(), config.timing.clone(), &observer);

    let suite = match runner.run_suite(&test_ids) {
        Ok(suite) => suite,
        Err(e) => {
            error!("Suite aborted: {}", e);
            return ExitCode::from(EXIT_SUITE_ABORTED);
        }
    };

    let summary = report::render_summary(&suite, &catalog, &config.report);
    println!("{summary}");

    if args.save || args.output.is_some() {
        let path = args
            .output
            .unwrap_or_else(|| PathBuf::from(report::default_results_filename(suite.started_at)));
        match report::save_results(&suite, &path) {
            Ok(()) => info!("Results saved to {}", path.display()),
            Err(e) => error!("Failed to save results: {}", e),
        }
    }

    if suite.success_rate() >= config.report.pass_threshold_pct {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_BELOW_THRESHOLD)
    }
}
