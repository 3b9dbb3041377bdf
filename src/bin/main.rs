#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::convert::Infallible;

use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_time::{Delay, Timer};
use embedded_hal::spi::ErrorType;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::{
    Blocking,
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    peripherals::Peripherals,
    rng::Rng,
    spi::{
        Mode,
        master::{Config as SpiConfig, ConfigError as SpiConfigError, Spi},
    },
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::WifiController;
use log::{LevelFilter, info, warn};
use odometer_core::{
    animation::{AnimationConfig, AnimationEngine},
    app::{AppConfig, OdometerApp},
    render::MatrixRenderer,
};
use odometer_hal_esp32s3::{
    network::{StravaConfig, WifiConfig},
    platform::display::MatrixDisplay,
};
use static_cell::StaticCell;

use store::BootStore;
use strava::GearDistanceClient;

#[path = "main/control.rs"]
mod control;
#[path = "main/store.rs"]
mod store;
#[path = "main/strava.rs"]
mod strava;
#[path = "main/wifi.rs"]
mod wifi;

const DISPLAY_SPI_HZ: u32 = 5_000_000;
const FATAL_RESET_SECS: u64 = 10;
const PARK_POLL_SECS: u64 = 60;

const WIFI_SSID: &str = env!(
    "ODOMETER_WIFI_SSID",
    "Set ODOMETER_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "ODOMETER_WIFI_PASSWORD",
    "Set ODOMETER_WIFI_PASSWORD in your environment before building/flashing."
);
const STRAVA_CLIENT_ID: &str = env!(
    "ODOMETER_STRAVA_CLIENT_ID",
    "Set ODOMETER_STRAVA_CLIENT_ID in your environment before building/flashing."
);
const STRAVA_CLIENT_SECRET: &str = env!(
    "ODOMETER_STRAVA_CLIENT_SECRET",
    "Set ODOMETER_STRAVA_CLIENT_SECRET in your environment before building/flashing."
);
const STRAVA_REFRESH_TOKEN: &str = env!(
    "ODOMETER_STRAVA_REFRESH_TOKEN",
    "Set ODOMETER_STRAVA_REFRESH_TOKEN in your environment before building/flashing."
);
const GEAR_ID: &str = env!(
    "ODOMETER_GEAR_ID",
    "Set ODOMETER_GEAR_ID in your environment before building/flashing."
);

const WIFI_CONFIG: WifiConfig = WifiConfig::new(WIFI_SSID, WIFI_PASSWORD);
const STRAVA_CONFIG: StravaConfig = StravaConfig::new(
    STRAVA_CLIENT_ID,
    STRAVA_CLIENT_SECRET,
    STRAVA_REFRESH_TOKEN,
    GEAR_ID,
);

static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

type MatrixSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
type DisplayError = max7219::Error<<MatrixSpi as ErrorType>::Error>;
type App = OdometerApp<MatrixDisplay<MatrixSpi>, Delay, BootStore>;

#[derive(Debug)]
enum BootError {
    SpiConfig(SpiConfigError),
    Display(DisplayError),
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    esp_println::println!("panic: {}", info);
    esp_hal::system::software_reset()
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

async fn park() -> ! {
    loop {
        Timer::after_secs(PARK_POLL_SECS).await;
    }
}

/// Wi-Fi, fetch, presentation, then the control loop.
async fn device_flow(
    app: &mut App,
    controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    seed: u64,
) -> Result<Infallible, BootError> {
    let ip = match wifi::connect(controller, stack, &WIFI_CONFIG).await {
        Ok(ip) => ip,
        Err(err) => {
            warn!("boot: network unavailable err={:?}", err);
            app.network_failed().map_err(BootError::Display)?;
            park().await
        }
    };

    let mut client = GearDistanceClient::new(stack, STRAVA_CONFIG, seed);
    let fetched = client.fetch_gear().await;
    let presented = app.present(fetched, ip).await.map_err(BootError::Display)?;
    info!("boot: presented={:?}", presented);

    control::serve(stack, app).await.map_err(BootError::Display)
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
async fn run(peripherals: Peripherals) -> Result<Infallible, BootError> {
    // Wiring: SCK=GPIO12, MOSI=GPIO11, CS=GPIO10.
    let cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let spi_config = SpiConfig::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        .with_mode(Mode::_0);
    let spi = Spi::new(peripherals.SPI2, spi_config)
        .map_err(BootError::SpiConfig)?
        .with_sck(peripherals.GPIO12)
        .with_mosi(peripherals.GPIO11);
    let Ok(spi_device) = ExclusiveDevice::new_no_delay(spi, cs);

    let mut display = MatrixDisplay::new(spi_device, max7219::Config::default());
    display.initialize().map_err(BootError::Display)?;
    let modules = display.modules();
    info!("display: ready modules={} spi_hz={}", modules, DISPLAY_SPI_HZ);

    let engine = AnimationEngine::new(
        MatrixRenderer::new(display, modules),
        Delay,
        AnimationConfig::default(),
    );
    let mut app = OdometerApp::new(engine, BootStore::open(), AppConfig::default());

    app.startup().await.map_err(BootError::Display)?;

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            warn!("boot: esp-radio init failed err={:?}", err);
            app.network_failed().map_err(BootError::Display)?;
            park().await
        }
    };

    let (mut controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                warn!("boot: wifi peripheral init failed err={:?}", err);
                app.network_failed().map_err(BootError::Display)?;
                park().await
            }
        };

    let rng = Rng::new();
    let net_seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let tls_seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        net_seed,
    );

    let flow = device_flow(&mut app, &mut controller, stack, tls_seed);
    match select(net_runner.run(), flow).await {
        Either::First(never) => never,
        Either::Second(result) => result,
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: odometer starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let Err(err) = run(peripherals).await;
    warn!("boot: fatal err={:?}; resetting in {}s", err, FATAL_RESET_SECS);
    Timer::after_secs(FATAL_RESET_SECS).await;
    esp_hal::system::software_reset()
}
