mod bootstrap;
mod commands;

use analyzer_core::settings::{Command, Settings};
use anyhow::Result;

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn main() -> Result<()> {
    let settings = match Settings::load_with_last_used() {
        Ok(settings) => settings,
        Err(e) => e.exit(),
    };

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("secops-analyzer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Output directory: {}", settings.output_dir.display());
    settings.validate()?;

    let command = &settings.command;
    let output_dir = settings.output_dir.as_path();

    match command {
        Command::Firewall { log, targets } => {
            commands::firewall(command, log, targets, output_dir)?;
        }
        Command::Threats { feed, targets } => {
            commands::threats(command, feed, targets, output_dir)?;
        }
        Command::Inventory { dir, targets } => {
            commands::inventory(command, dir, targets, output_dir)?;
        }
        Command::IpCheck { addresses } => print_lines(&commands::ip_check_report(addresses)),
        Command::Subnet { network_ip, prefix } => {
            print_lines(&commands::subnet_report(network_ip, *prefix)?);
        }
        Command::Hex { values } => print_lines(&commands::hex_report(values)),
        Command::Cvss {
            score,
            id,
            description,
        } => print_lines(&commands::cvss_report(*score, id, description)?),
        Command::Password { passwords } => print_lines(&commands::password_report(passwords)),
    }

    Ok(())
}
