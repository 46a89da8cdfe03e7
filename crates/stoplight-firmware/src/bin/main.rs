#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};

use stoplight_core::Monitor;
use stoplight_core::bus;
use stoplight_core::sensors::{SCD4X_ADDRESS, Scd4x};
use stoplight_firmware::app_state::{
    AppError, AppRunState, AppState, create_i2c_bus, create_status_pins,
};
use stoplight_firmware::settings;

#[cfg(feature = "publish")]
use stoplight_core::config::Config;
#[cfg(feature = "publish")]
use stoplight_firmware::dweet::DweetPublisher;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "the dweet publisher keeps its socket buffers inline"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let config = settings::load();
    let mut state = AppState::new();

    // Lines low (Off) before anything else can fail
    let lines = create_status_pins(peripherals.GPIO14, peripherals.GPIO15);

    let mut i2c = create_i2c_bus(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9)
        .expect("Failed to initialize I2C bus");

    let devices = bus::scan(&mut i2c).await;
    bus::log_devices(&devices);
    if !devices.contains(&SCD4X_ADDRESS) {
        error!("{}", AppError::SensorMissing);
    }

    #[cfg(feature = "publish")]
    let publisher = if config.internet.publish_enabled() {
        match connect_wifi(spawner, peripherals.WIFI, &config, &mut state).await {
            Ok(publisher) => publisher,
            Err(e) => {
                error!("{}", e);
                state.transition(AppRunState::Error);
                halt().await
            }
        }
    } else {
        None
    };
    #[cfg(not(feature = "publish"))]
    let _ = spawner;

    state.transition(AppRunState::SensorStarting);
    let mut sensor = Scd4x::new(i2c, Delay);
    match sensor.configure(&config.monitor.sensor_settings()).await {
        Ok(serial) => info!("SCD4x serial number: {:#014x}", serial),
        Err(e) => error!("{}", AppError::from(e)),
    }

    let monitor = Monitor::new(sensor, lines, Delay, config.monitor);
    state.transition(AppRunState::Sampling);

    #[cfg(feature = "publish")]
    if let Some(publisher) = publisher {
        monitor.with_publisher(publisher).run().await
    }

    let mut monitor = monitor;
    monitor.run().await
}

/// Park with the lights off after a fatal start-up error.
async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

/// Bring up Wi-Fi and return a publisher, or `None` when best-effort
/// association did not succeed.
#[cfg(feature = "publish")]
async fn connect_wifi(
    spawner: Spawner,
    wifi: esp_hal::peripherals::WIFI<'static>,
    config: &Config<'static>,
    state: &mut AppState,
) -> Result<Option<DweetPublisher<'static>>, AppError> {
    use embassy_net::StackResources;
    use esp_hal::rng::Rng;
    use static_cell::StaticCell;
    use stoplight_core::network::{NetworkError, associate};
    use stoplight_firmware::wifi::{EspWifi, net_task};

    static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
    static LINK: StaticCell<EspWifi<'static>> = StaticCell::new();

    state.transition(AppRunState::WifiConnecting);

    let radio = esp_radio::init()
        .map_err(|_| AppError::Wifi(NetworkError::Start("radio init failed")))?;
    let radio = RADIO.init(radio);

    let (controller, interfaces) = esp_radio::wifi::new(radio, wifi, Default::default())
        .map_err(|_| AppError::Wifi(NetworkError::Start("Wi-Fi controller init failed")))?;

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.must_spawn(net_task(runner));

    let link = LINK.init(EspWifi::new(
        controller,
        stack,
        config.internet.ssid,
        config.internet.password,
    ));

    let connected = associate(
        link,
        &mut Delay,
        config.monitor.wifi_timeout_secs,
        config.monitor.network_policy,
    )
    .await?;

    if !connected {
        return Ok(None);
    }

    state.wifi_connected = true;
    state.transition(AppRunState::WifiConnected);
    info!("Publishing readings as dweet thing '{}'", config.internet.thing);
    Ok(Some(DweetPublisher::new(link.stack(), config.internet.thing)))
}
