// Replay host: loads a scenario, runs it against the in-memory browser and
// prints the resulting page.

use std::process::ExitCode;

use tablist_lib::{logging, scenario};

fn main() -> ExitCode {
    logging::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: tablist <scenario.json>");
        return ExitCode::from(2);
    };

    match scenario::load(&path).and_then(|s| scenario::run(&s)) {
        Ok(page) => {
            println!("{}", page.render_html());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("[Scenario] {}", e);
            ExitCode::FAILURE
        }
    }
}
