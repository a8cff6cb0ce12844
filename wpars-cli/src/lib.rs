pub mod args;
pub mod output;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use wpars::builders::NetworkFields;
use wpars::{CreateInterfaceArgs, ScanRequest, SupplicantError, WpaSupplicant};

use crate::args::{BlobCommand, Cli, Command, InterfaceCommand, NetworkArgs, NetworkCommand};

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let wpa = WpaSupplicant::new()
        .await
        .context("cannot connect to wpa_supplicant on the system bus")?;

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            interrupt.cancel();
        }
    });

    let result = dispatch(&wpa, cli.command, &token).await;
    finish(result, wpa.close().await)
}

/// Folds the session close into the command result.
///
/// The command's own error is what the user sees; a failed close is only
/// logged. An interrupted wait ends the command quietly.
fn finish(result: anyhow::Result<()>, closed: wpars::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = closed {
        warn!("failed to close the D-Bus session: {e}");
    }

    match result {
        Err(e) if matches!(e.downcast_ref::<SupplicantError>(), Some(SupplicantError::Cancelled)) => {
            eprintln!("interrupted");
            Ok(())
        }
        other => other,
    }
}

async fn dispatch(
    wpa: &WpaSupplicant,
    command: Option<Command>,
    token: &CancellationToken,
) -> anyhow::Result<()> {
    let Some(command) = command else {
        print!("{}", output::interfaces(&wpa.list_interfaces().await?));
        return Ok(());
    };

    match command {
        Command::Interface(InterfaceCommand::List) => {
            print!("{}", output::interfaces(&wpa.list_interfaces().await?));
        }
        Command::Interface(InterfaceCommand::Set {
            iface,
            ap_scan,
            country,
        }) => {
            if ap_scan.is_none() && country.is_none() {
                bail!("nothing to set, use --ap-scan or --country");
            }
            if let Some(ap_scan) = ap_scan {
                wpa.set_ap_scan(&iface.ifname, ap_scan).await?;
            }
            if let Some(country) = country {
                wpa.set_country(&iface.ifname, &country).await?;
            }
        }
        Command::Status { iface, repeat } => show_status(wpa, &iface.ifname, repeat, token).await?,
        Command::Up {
            iface,
            config,
            driver,
            bridge,
        } => {
            let mut args = CreateInterfaceArgs::new(&iface.ifname)
                .with_config_file(config.to_string_lossy());
            if let Some(driver) = driver {
                args = args.with_driver(driver);
            }
            if let Some(bridge) = bridge {
                args = args.with_bridge(bridge);
            }
            let handle = wpa.create_interface(&args).await?;
            info!("{} created at {handle}", iface.ifname);
            println!("Interface {} now managed", iface.ifname);
        }
        Command::Down(iface) => {
            wpa.remove_interface(&iface.ifname).await?;
            println!("Interface {} no longer managed", iface.ifname);
        }
        Command::Scan {
            iface,
            scan_type,
            allow_roam,
            results,
        } => {
            let request = ScanRequest {
                scan_type,
                allow_roam,
            };
            if results {
                let mut waited = false;
                let found = wpa
                    .scan_and_wait_with_progress(&iface.ifname, &request, token, |polls| {
                        waited = true;
                        progress(polls);
                    })
                    .await?;
                if waited {
                    println!(" done");
                }
                print!("{}", output::scan_results(&found));
            } else {
                wpa.scan(&iface.ifname, &request).await?;
                println!("Trigger scan on interface {}", iface.ifname);
            }
        }
        Command::ScanResults(iface) => {
            let mut waited = false;
            let found = wpa
                .scan_results_with_progress(&iface.ifname, token, |polls| {
                    waited = true;
                    progress(polls);
                })
                .await?;
            if waited {
                println!(" done");
            }
            print!("{}", output::scan_results(&found));
        }
        Command::Reconnect(iface) => wpa.reconnect(&iface.ifname).await?,
        Command::Disconnect(iface) => wpa.disconnect(&iface.ifname).await?,
        Command::Reassociate(iface) => wpa.reassociate(&iface.ifname).await?,
        Command::Reattach(iface) => wpa.reattach(&iface.ifname).await?,
        Command::SignalPoll(iface) => {
            print!("{}", output::signal(&wpa.signal_poll(&iface.ifname).await?));
        }
        Command::FlushBss { iface, age } => wpa.flush_bss(&iface.ifname, age).await?,
        Command::Networks(cmd) => networks(wpa, cmd).await?,
        Command::Blob(cmd) => blobs(wpa, cmd).await?,
        Command::Monitor => {
            wpa.monitor(|event| println!("{}", output::event(&event)), token)
                .await?;
        }
    }
    Ok(())
}

/// Progress ticks while a poll-driven scan wait is still running.
fn progress(polls: usize) {
    if polls == 1 {
        print!("Interface is still scanning. Waiting ");
    }
    print!("-");
    let _ = std::io::stdout().flush();
}

async fn show_status(
    wpa: &WpaSupplicant,
    ifname: &str,
    repeat: Option<f64>,
    token: &CancellationToken,
) -> anyhow::Result<()> {
    let Some(seconds) = repeat else {
        print!("{}", output::status(&wpa.status(ifname).await?));
        return Ok(());
    };

    let period = Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
        .context("--loop needs a positive number of seconds")?;

    loop {
        print!("{}", output::status(&wpa.status(ifname).await?));
        println!();
        tokio::select! {
            _ = token.cancelled() => return Ok(()),
            _ = tokio::time::sleep(period) => {}
        }
    }
}

fn fields_from(args: NetworkArgs) -> NetworkFields {
    let mut fields = NetworkFields::new()
        .ieee80211w(args.ieee80211w)
        .priority(args.prio)
        .mode(args.mode)
        .frequency(args.frequency);

    macro_rules! apply {
        ($($name:ident),* $(,)?) => {
            $(
                if let Some(value) = args.$name {
                    fields = fields.$name(value);
                }
            )*
        };
    }
    apply!(
        ssid,
        bssid,
        psk,
        sae_password,
        proto,
        key_mgmt,
        pairwise,
        eap,
        identity,
        client_cert,
        private_key,
        private_key_passwd,
    );

    if args.disabled {
        fields = fields.disabled(true);
    }
    fields
}

async fn list_networks(wpa: &WpaSupplicant, ifname: &str, long: bool) -> anyhow::Result<()> {
    print!("{}", output::networks(&wpa.list_networks(ifname).await?, long));
    Ok(())
}

fn report_missing(found: bool, id: usize) {
    if !found {
        eprintln!("No network with id {id}");
    }
}

async fn networks(wpa: &WpaSupplicant, command: NetworkCommand) -> anyhow::Result<()> {
    match command {
        NetworkCommand::List { iface, long } => list_networks(wpa, &iface.ifname, long).await?,
        NetworkCommand::Add {
            iface,
            fields,
            show,
        } => {
            let handle = wpa.add_network(&iface.ifname, &fields_from(fields)).await?;
            info!("added network {handle}");
            if show.results {
                list_networks(wpa, &iface.ifname, false).await?;
            }
        }
        NetworkCommand::Remove {
            iface,
            id,
            ssid,
            all,
            show,
        } => {
            if all {
                wpa.remove_all_networks(&iface.ifname).await?;
            } else if let Some(ssid) = ssid {
                let removed = wpa.remove_network_by_ssid(&iface.ifname, &ssid).await?;
                debug!("removed {removed} networks named {ssid}");
            } else if let Some(id) = id {
                report_missing(wpa.remove_network(&iface.ifname, id).await?, id);
            }
            if show.results {
                list_networks(wpa, &iface.ifname, false).await?;
            }
        }
        NetworkCommand::Enable { iface, id, show } => {
            report_missing(wpa.set_network_enabled(&iface.ifname, id, true).await?, id);
            if show.results {
                list_networks(wpa, &iface.ifname, false).await?;
            }
        }
        NetworkCommand::Disable { iface, id, show } => {
            report_missing(wpa.set_network_enabled(&iface.ifname, id, false).await?, id);
            if show.results {
                list_networks(wpa, &iface.ifname, false).await?;
            }
        }
        NetworkCommand::Select {
            iface,
            id,
            show,
            status,
        } => {
            report_missing(wpa.select_network(&iface.ifname, id).await?, id);
            if show.results {
                list_networks(wpa, &iface.ifname, false).await?;
            }
            if status {
                print!("{}", output::status(&wpa.status(&iface.ifname).await?));
            }
        }
    }
    Ok(())
}

async fn blobs(wpa: &WpaSupplicant, command: BlobCommand) -> anyhow::Result<()> {
    match command {
        BlobCommand::List { iface, no_legend } => {
            print!("{}", output::blobs(&wpa.list_blobs(&iface.ifname).await?, !no_legend));
        }
        BlobCommand::Add { iface, name, data } => {
            let bytes = std::fs::read(&data)
                .with_context(|| format!("cannot read blob data from {}", data.display()))?;
            wpa.add_blob(&iface.ifname, &name, bytes).await?;
        }
        BlobCommand::Remove { iface, name } => wpa.remove_blob(&iface.ifname, &name).await?,
        BlobCommand::Get {
            iface,
            name,
            output,
        } => {
            let bytes = wpa.get_blob(&iface.ifname, &name).await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("cannot write blob to {}", output.display()))?;
            info!("wrote {} bytes to {}", bytes.len(), output.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_args_become_fields() {
        let args = NetworkArgs {
            ssid: Some("Home".into()),
            psk: Some("secret123".into()),
            ieee80211w: 3,
            prio: 5,
            disabled: true,
            ..Default::default()
        };
        let map = fields_from(args).to_property_map();
        let mut keys: Vec<_> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["disabled", "ieee80211w", "mode", "priority", "psk", "ssid"]
        );
        assert_eq!(map["priority"], wpars::RemoteValue::UInt32(5));
        assert_eq!(map["disabled"], wpars::RemoteValue::UInt32(1));
    }

    fn close_failure() -> wpars::Result<()> {
        Err(SupplicantError::remote(
            "/org/freedesktop/DBus",
            "RemoveMatch",
            Some("org.freedesktop.DBus.Error.Disconnected".into()),
            "connection closed",
        ))
    }

    #[test]
    fn command_error_survives_close_failure() {
        let err = finish(Err(anyhow::anyhow!("no network with that ssid")), close_failure())
            .unwrap_err();
        assert_eq!(err.to_string(), "no network with that ssid");
    }

    #[test]
    fn close_failure_after_success_is_only_logged() {
        assert!(finish(Ok(()), close_failure()).is_ok());
    }

    #[test]
    fn interrupted_command_exits_cleanly() {
        assert!(finish(Err(SupplicantError::Cancelled.into()), Ok(())).is_ok());
        assert!(finish(Err(SupplicantError::Cancelled.into()), close_failure()).is_ok());
    }

    #[test]
    fn unset_flags_are_not_sent() {
        let map = fields_from(NetworkArgs {
            ieee80211w: 3,
            ..Default::default()
        })
        .to_property_map();
        assert!(!map.contains_key("disabled"));
        assert!(!map.contains_key("frequency"));
        assert!(!map.contains_key("ssid"));
    }
}
