///! Config file management commands

use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::ConfigCommands;
use anyhow::{anyhow, Result};
use toolset_common::HapticStyle;

pub fn handle_config_command(command: ConfigCommands, format: OutputFormat) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load()?;
            match format {
                OutputFormat::Table => print!("{}", toml::to_string_pretty(&config)?),
                _ => output::print_single(&config, format)?,
            }
        }

        ConfigCommands::Path => {
            println!("{}", Config::config_path()?.display());
        }

        ConfigCommands::SetThreshold { value } => {
            let mut config = Config::load_file()?;
            config.refresh.threshold = value;
            config.refresh.validate()?;
            config.save()?;
            output::print_success(&format!("Threshold set to {}", value));
        }

        ConfigCommands::SetHaptic { style } => {
            let mut config = Config::load_file()?;
            config.refresh.haptic = match style.as_str() {
                "none" | "off" => None,
                name => Some(
                    HapticStyle::from_str(name)
                        .ok_or_else(|| anyhow!("Unknown haptic style '{}'", name))?,
                ),
            };
            config.save()?;
            match config.refresh.haptic {
                Some(style) => output::print_success(&format!("Haptic feedback set to {}", style)),
                None => output::print_success("Haptic feedback disabled"),
            }
        }

        ConfigCommands::Reset => {
            Config::default().save()?;
            output::print_success("Configuration reset to defaults");
        }
    }

    Ok(())
}
