//! Output helpers for the plugin's stdout contract

use check_load_lib::Status;

/// Print a fatal error as the plugin's single status line
pub fn print_unknown(error: &anyhow::Error) {
    println!("LOAD {} - {:#}", Status::Unknown, error);
}

/// Print a clap parse outcome
///
/// Help and version go to stdout, parse errors to stderr followed by a
/// status line on stdout. Every one of these ends the run as UNKNOWN.
pub fn print_parse_error(error: &clap::Error) {
    use clap::error::ErrorKind;

    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{}", error.render());
        }
        _ => {
            eprint!("{}", error.render());
            println!("LOAD {} - Could not parse arguments", Status::Unknown);
        }
    }
}
