use std::{collections::BTreeMap, sync::Arc};

use clap::Parser;
use sdrlog::{AsyncLogger, Level, SoapyBridge, logf, logger_config};

/// Logging setup of the SDR enumeration tool, with canned devices standing in
/// for the hardware library.
#[derive(Parser, Debug)]
struct Args {
    /// Log debug information
    #[arg(long)]
    debug: bool,
    /// Log filename. If 'stdout', messages are logged to stdout.
    #[arg(long, default_value = "stdout")]
    out: String,
}

fn fake_devices() -> Vec<BTreeMap<&'static str, &'static str>> {
    vec![
        BTreeMap::from([("driver", "rtlsdr"), ("label", "Generic RTL2832U OEM :: 00000001")]),
        BTreeMap::from([("driver", "hackrf"), ("label", "HackRF One #0 23ec7dc3")]),
    ]
}

fn log_device(logger: &AsyncLogger, index: usize, device: &BTreeMap<&str, &str>) {
    let mut info = format!("Device {index}\n");
    for (k, v) in device {
        info.push_str(&format!("         {k}: {v}\n"));
    }
    logger.log(Level::Info, info).ok();
    logf!(
        logger,
        Level::Debug,
        "Making device with label: '{}'\n",
        device.get("label").copied().unwrap_or_default()
    )
    .ok();
}

fn main() {
    let args = Args::parse();
    let logger = match logger_config().with_target(&args.out) {
        Ok(config) => config.build(),
        Err(err) => {
            eprintln!("Could not create log file: {err}");
            std::process::exit(1);
        }
    };

    let level = if args.debug { Level::Debug } else { Level::Info };
    logger.set_max_level(level).ok();

    let devices = fake_devices();
    logf!(logger, Level::Info, "Found {} attached SDR(s)\n", devices.len()).ok();
    let handles: Vec<_> = devices
        .into_iter()
        .enumerate()
        .map(|(i, device)| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || log_device(&logger, i, &device))
        })
        .collect();
    for h in handles {
        h.join().ok();
    }

    let bridge = SoapyBridge::new(Arc::clone(&logger));
    bridge.handle(4, "Using format CF32.").ok();
    drop(bridge);

    if let Err(err) = logger.close() {
        eprintln!("Logging failed: {err}");
        std::process::exit(1);
    }
}
