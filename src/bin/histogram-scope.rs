use hscope::driver::{Driver, DriverParams};
use hscope::logging::init_logging;

fn run() -> hscope::Result<()> {
    let mut driver = Driver::from_params(DriverParams::default())?;
    let stdout = std::io::stdout();
    driver.run(stdout.lock())?;
    Ok(())
}

fn main() {
    init_logging("info");
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
