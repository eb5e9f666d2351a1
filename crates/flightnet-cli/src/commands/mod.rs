// Subcommand handlers. main.rs parses arguments and dispatches here; each
// handler loads the network, calls the library and renders the result.

pub mod network;
pub mod route;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use flightnet_lib::{load_network, resolve_data_dir, Error as LibError, Network};

/// Resolve the data directory and build the network from it.
pub fn load(data_dir: Option<&Path>) -> Result<Network> {
    let dir = resolve_data_dir(data_dir).context("failed to locate the flight network dataset")?;
    load_network(&dir)
        .with_context(|| format!("failed to load flight network from {}", dir.display()))
}

/// Turn library errors into messages aimed at the person typing the command.
pub fn friendly_error(err: LibError) -> anyhow::Error {
    match err {
        LibError::UnknownAirport { code, suggestions } => {
            anyhow::anyhow!(format_unknown_airport_message(&code, &suggestions))
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unknown_airport_message(code: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown airport '{}'.", code);
    match suggestions {
        [] => {}
        [only] => message.push_str(&format!(" Did you mean '{only}'?")),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(" Did you mean one of: {}?", joined));
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_airport_message_lists_suggestions() {
        assert_eq!(
            format_unknown_airport_message("LHX", &[]),
            "Unknown airport 'LHX'."
        );
        assert_eq!(
            format_unknown_airport_message("LHX", &["LHR".to_string()]),
            "Unknown airport 'LHX'. Did you mean 'LHR'?"
        );
        assert_eq!(
            format_unknown_airport_message("JF", &["JFK".to_string(), "FRA".to_string()]),
            "Unknown airport 'JF'. Did you mean one of: 'JFK', 'FRA'?"
        );
    }
}
