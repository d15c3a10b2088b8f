//! `alea cfg`: prints the resolved configuration as JSON, each value paired
//! with where it came from (`default`, `file` or `env`).

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(e.into());
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "bankroll": {
            "value": config.bankroll,
            "source": sources.bankroll,
        },
        "table": {
            "value": config.table,
            "source": sources.table,
        },
        "ai": {
            "value": config.ai,
            "source": sources.ai,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
