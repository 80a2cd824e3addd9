use std::process::ExitCode;

use duet::{config::Config, signal::Signals, task::Orchestrator};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("duet => configuration error: {err}");
            return ExitCode::from(1);
        }
    };

    let signals = match Signals::register() {
        Ok(signals) => signals,
        Err(err) => {
            eprintln!("duet => cannot register signal handlers: {err}");
            return ExitCode::from(1);
        }
    };

    let orchestrator = Orchestrator::init(config);
    let interrupts = signals.next_interrupt(orchestrator.console());

    match orchestrator.shutdown_on(interrupts).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("duet => {err}");
            err.exit_code()
        }
    }
}
