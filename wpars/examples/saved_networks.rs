use wpars::WpaSupplicant;
use wpars::builders::NetworkFields;

#[tokio::main]
async fn main() -> wpars::Result<()> {
    let ifname = std::env::args().nth(1).unwrap_or_else(|| "wlan0".into());
    let wpa = WpaSupplicant::new().await?;

    let handle = wpa
        .add_network(
            &ifname,
            &NetworkFields::new().ssid("ExampleNet").psk("example-passphrase"),
        )
        .await?;
    println!("Added {handle}");

    for entry in wpa.list_networks(&ifname).await? {
        println!(
            "{:2} {:32} disabled={:?}",
            entry.ordinal,
            entry.ssid.as_deref().unwrap_or(""),
            entry.disabled
        );
    }

    let removed = wpa.remove_network_by_ssid(&ifname, "ExampleNet").await?;
    println!("Removed {removed} profile(s)");

    wpa.close().await
}
