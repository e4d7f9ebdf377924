use log::LevelFilter;
use plasflow::Examples::probe_examples::probe_examples;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

pub fn main() {
    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger not initialised: {}", e);
    }
    //
    let task: usize = 3;
    probe_examples(task);
}
