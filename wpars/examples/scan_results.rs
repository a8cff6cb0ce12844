use tokio_util::sync::CancellationToken;
use wpars::{ScanRequest, WpaSupplicant};

#[tokio::main]
async fn main() -> wpars::Result<()> {
    let ifname = std::env::args().nth(1).unwrap_or_else(|| "wlan0".into());
    let wpa = WpaSupplicant::new().await?;

    println!("Scanning on {ifname}...");
    let token = CancellationToken::new();
    let results = wpa
        .scan_and_wait(&ifname, &ScanRequest::default(), &token)
        .await?;

    for bss in results {
        println!(
            "{:32} {} {:4} {:4} {:?}",
            bss.ssid,
            bss.bssid_hex(),
            bss.frequency,
            bss.signal,
            bss.rsn.key_mgmt
        );
    }

    Ok(())
}
