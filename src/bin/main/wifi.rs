use core::net::Ipv4Addr;

use embassy_net::Stack;
use embassy_time::Timer;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController};
use log::{info, warn};
use odometer_core::link::{JoinAttempts, JoinStep};
use odometer_hal_esp32s3::network::{NetworkError, WIFI_CONNECT_POLL_SECS, WifiConfig};

/// Joins the configured network and waits for a DHCP lease.
///
/// Association and the lease wait share one attempt budget. There is no
/// reconnect loop: once the budget is spent the device stays offline until
/// reset.
pub async fn connect(
    controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    config: &WifiConfig,
) -> Result<Ipv4Addr, NetworkError> {
    let client_config = ClientConfig::default()
        .with_ssid(config.ssid.into())
        .with_password(config.password.into());
    if let Err(err) = controller.set_config(&ModeConfig::Client(client_config)) {
        warn!("wifi: mode config failed err={:?}", err);
        return Err(NetworkError::WifiConfig);
    }

    if let Err(err) = controller.start_async().await {
        warn!("wifi: start failed err={:?}", err);
        return Err(NetworkError::RadioInit);
    }

    let mut join = JoinAttempts::default();
    while let Some(step) = join.next_step() {
        if step == JoinStep::Associate {
            info!(
                "wifi: connecting ssid={} attempt={}/{}",
                config.ssid,
                join.attempt(),
                join.limit()
            );
            match controller.connect_async().await {
                Ok(()) => join.mark_associated(),
                Err(err) => {
                    warn!("wifi: connect failed err={:?}", err);
                    join.mark_disassociated();
                    let _ = controller.disconnect_async().await;
                    Timer::after_secs(WIFI_CONNECT_POLL_SECS).await;
                    continue;
                }
            }
        }

        if let Some(v4) = stack.config_v4() {
            let ip = v4.address.address();
            info!(
                "wifi: connected ip={} gateway={:?} dns={:?}",
                ip, v4.gateway, v4.dns_servers
            );
            return Ok(ip);
        }

        info!(
            "wifi: waiting for dhcp attempt={}/{}",
            join.attempt(),
            join.limit()
        );
        Timer::after_secs(WIFI_CONNECT_POLL_SECS).await;
    }

    warn!(
        "wifi: not connected after {} attempts; check ssid and password",
        join.limit()
    );
    Err(NetworkError::Unavailable)
}
