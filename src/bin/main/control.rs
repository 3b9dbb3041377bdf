use core::convert::Infallible;

use embassy_net::{Stack, tcp::TcpSocket};
use embassy_time::{Duration, Timer, WithTimeout};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;
use log::{info, warn};
use odometer_core::{
    app::OdometerApp,
    control::{CONTROL_PORT, POLL_INTERVAL_MS, REQUEST_BUFFER_BYTES},
    render::FrameSink,
    store::DistanceStore,
};

const SOCKET_BUFFER_BYTES: usize = 1024;
const CLOSE_GRACE_MS: u64 = 50;

/// Serves the status page and restart trigger forever, one connection at a
/// time. Only display failures end the loop.
pub async fn serve<S, D, St>(
    stack: Stack<'_>,
    app: &mut OdometerApp<S, D, St>,
) -> Result<Infallible, S::Error>
where
    S: FrameSink,
    D: DelayNs,
    St: DistanceStore,
{
    info!("control: listening port={}", CONTROL_PORT);

    let mut rx_buffer = [0u8; SOCKET_BUFFER_BYTES];
    let mut tx_buffer = [0u8; SOCKET_BUFFER_BYTES];
    let mut request = [0u8; REQUEST_BUFFER_BYTES];

    loop {
        let restart = poll_once(stack, app, &mut rx_buffer, &mut tx_buffer, &mut request).await;
        if restart {
            app.announce_restart().await?;
            info!("control: resetting");
            esp_hal::system::software_reset();
        }
    }
}

/// Waits up to one poll interval for a client and answers it.
///
/// Returns `true` when the client asked for a restart.
async fn poll_once<S, D, St>(
    stack: Stack<'_>,
    app: &mut OdometerApp<S, D, St>,
    rx_buffer: &mut [u8],
    tx_buffer: &mut [u8],
    request: &mut [u8],
) -> bool
where
    S: FrameSink,
    D: DelayNs,
    St: DistanceStore,
{
    let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);

    match socket
        .accept(CONTROL_PORT)
        .with_timeout(Duration::from_millis(POLL_INTERVAL_MS))
        .await
    {
        Ok(Ok(())) => {}
        // Nobody connected this interval.
        Err(_) => return false,
        Ok(Err(err)) => {
            warn!("control: accept failed err={:?}", err);
            Timer::after_millis(POLL_INTERVAL_MS).await;
            return false;
        }
    }

    let len = match socket.read(request).await {
        Ok(len) => len,
        Err(err) => {
            warn!("control: read failed err={:?}", err);
            socket.abort();
            return false;
        }
    };
    info!(
        "control: request from={:?} bytes={}",
        socket.remote_endpoint(),
        len
    );

    let reply = match app.respond(&request[..len]) {
        Ok(reply) => reply,
        Err(err) => {
            warn!("control: dropped request err={:?}", err);
            socket.close();
            return false;
        }
    };

    if let Err(err) = socket.write_all(reply.as_bytes()).await {
        warn!("control: write failed err={:?}", err);
    }
    let _ = socket.flush().await;
    socket.close();
    Timer::after_millis(CLOSE_GRACE_MS).await;

    reply.is_restart()
}
