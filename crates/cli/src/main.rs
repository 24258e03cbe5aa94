//! open-x9 CLI: command-line configuration tool for the Fantech X9 Thor.

use anyhow::Result;
use clap::{Parser, Subcommand};
use open_x9_core::apply::{self, ChangeStatus, ConfigChange, SessionReport};
use open_x9_core::device::{MouseModel, RusbLocator};
use open_x9_core::lighting::DEFAULT_DURATION;
use open_x9_core::profile::ProfileRegistry;
use open_x9_core::tables::ColorName;
use std::time::Duration;

/// Applied when no change is requested.
const DEFAULT_DPI: u32 = 2000;
const DEFAULT_COLOR: &str = "off";

#[derive(Parser)]
#[command(
    name = "open-x9",
    version,
    about = "Configure Fantech X9 Thor mouse settings",
    after_help = open_x9_core::safety::WRITE_DISCLAIMER
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set DPI (200-4800, resolved to the nearest supported step).
    #[arg(short, long)]
    dpi: Option<u32>,

    /// Set LED color (red, green, blue, yellow, cyan, violet, white, off).
    #[arg(short, long)]
    color: Option<String>,

    /// Set LED mode (fixed, cyclic, static, off).
    #[arg(short, long)]
    mode: Option<String>,

    /// Profile the DPI and color changes apply to (1-6).
    #[arg(short, long, default_value_t = 1)]
    profile: u8,

    /// Profile the mouse is currently using (1-6).
    #[arg(long, default_value_t = 1)]
    active_profile: u8,

    /// Disable a profile slot (repeatable).
    #[arg(long = "disable-profile", value_name = "PROFILE")]
    disabled_profiles: Vec<u8>,

    /// Colors used by the cyclic mode (comma separated). Defaults to all.
    #[arg(long, value_delimiter = ',', value_name = "COLORS")]
    cycle_colors: Vec<String>,

    /// Duration code for the fixed and cyclic modes (1-6).
    #[arg(long, default_value_t = DEFAULT_DURATION)]
    duration: u8,

    /// Control transfer timeout in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Print the outcome of each change as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected X9 mice.
    ListDevices,
}

impl Cli {
    /// Changes requested on the command line, or the documented defaults.
    fn changes(&self) -> Vec<ConfigChange> {
        let mut dpi = self.dpi;
        let mut color = self.color.clone();
        if dpi.is_none() && color.is_none() && self.mode.is_none() {
            dpi = Some(DEFAULT_DPI);
            color = Some(DEFAULT_COLOR.to_string());
        }

        let mut changes = Vec::new();
        if let Some(value) = dpi {
            changes.push(ConfigChange::Sensitivity {
                value,
                profile: self.profile,
            });
        }
        if let Some(token) = color {
            changes.push(ConfigChange::Color {
                token,
                profile: self.profile,
            });
        }
        if let Some(mode) = &self.mode {
            changes.push(ConfigChange::Lighting {
                mode: mode.clone(),
                duration: self.duration,
            });
        }
        changes
    }

    fn registry(&self) -> Result<ProfileRegistry> {
        let mut registry = ProfileRegistry::new();
        registry.set_active_profile(self.active_profile)?;
        for &profile in &self.disabled_profiles {
            registry.disable_profile(profile)?;
        }
        if !self.cycle_colors.is_empty() {
            for color in ColorName::ALL {
                registry.set_cyclic_color(color, false);
            }
            for token in &self.cycle_colors {
                let color = ColorName::from_name(token).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unsupported cycle color '{token}'. Supported colors: {}",
                        ColorName::ALL.map(|c| c.name()).join(", ")
                    )
                })?;
                registry.set_cyclic_color(color, true);
            }
        }
        Ok(registry)
    }
}

fn print_report(report: &SessionReport) {
    for outcome in &report.outcomes {
        match outcome.status {
            ChangeStatus::Applied => println!("{}", outcome.message),
            _ => println!(
                "Error: {} not applied: {}",
                outcome.change.describe(),
                outcome.message
            ),
        }
    }
    if let Some(warning) = &report.release_warning {
        eprintln!("Warning: {warning}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::ListDevices) = cli.command {
        let devices = open_x9_core::device::list_devices()?;
        if devices.is_empty() {
            println!("No X9 mice found.");
            println!("Ensure your mouse is connected.");
        } else {
            for dev in &devices {
                println!(
                    "{} (VID: 0x{:04X}, PID: 0x{:04X}, bus {:03} device {:03})",
                    dev.model.name(),
                    dev.vid,
                    dev.pid,
                    dev.bus,
                    dev.address
                );
            }
        }
        return Ok(());
    }

    let registry = cli.registry()?;
    let changes = cli.changes();
    tracing::debug!(count = changes.len(), "Requested changes");

    let report = apply::run_session(
        &RusbLocator,
        &MouseModel::X9Thor.identity(),
        &registry,
        &changes,
        Duration::from_millis(cli.timeout_ms),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize device: {e}"))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.all_applied() {
        let failed = report.outcomes.iter().filter(|o| !o.succeeded()).count();
        anyhow::bail!("{failed} of {} change(s) not applied", report.outcomes.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("open-x9").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_arguments_apply_defaults() {
        let changes = parse(&[]).changes();
        assert_eq!(
            changes,
            vec![
                ConfigChange::Sensitivity {
                    value: 2000,
                    profile: 1
                },
                ConfigChange::Color {
                    token: "off".into(),
                    profile: 1
                },
            ]
        );
    }

    #[test]
    fn only_requested_changes_are_sent() {
        let changes = parse(&["--dpi", "800", "--profile", "2"]).changes();
        assert_eq!(
            changes,
            vec![ConfigChange::Sensitivity {
                value: 800,
                profile: 2
            }]
        );

        let changes = parse(&["-c", "red"]).changes();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn mode_alone_suppresses_defaults() {
        let changes = parse(&["--mode", "cyclic", "--duration", "3"]).changes();
        assert_eq!(
            changes,
            vec![ConfigChange::Lighting {
                mode: "cyclic".into(),
                duration: 3
            }]
        );
    }

    #[test]
    fn registry_from_flags() {
        let cli = parse(&[
            "--disable-profile",
            "2",
            "--disable-profile",
            "6",
            "--cycle-colors",
            "yellow,red",
            "--active-profile",
            "3",
        ]);
        let registry = cli.registry().unwrap();
        assert_eq!(registry.active_profile_mask(), 0b01_1101);
        assert_eq!(registry.cyclic_color_mask(), 0b001_0001);
        assert_eq!(registry.active_profile(), 3);
    }

    #[test]
    fn registry_rejects_bad_flags() {
        assert!(parse(&["--cycle-colors", "pink"]).registry().is_err());
        assert!(parse(&["--disable-profile", "9"]).registry().is_err());
    }

    #[test]
    fn list_devices_subcommand_parses() {
        let cli = parse(&["list-devices"]);
        assert!(matches!(cli.command, Some(Commands::ListDevices)));
    }
}
