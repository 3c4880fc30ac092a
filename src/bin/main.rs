#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use defmt::{error, info, warn};
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::Delay;
use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Size},
};
use esp_backtrace as _;
use esp_hal::{
    Async, Config,
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    i2c::master::{Config as I2cConfig, I2c},
    time::Rate,
    timer::systimer::SystemTimer,
};
use lux_monitor::{
    Acquisition, Fault, Indicator, Presentation, ReadingCell, Supervisor,
    drivers::{
        panel::{Framebuffer, TextPanel},
        tsl2561::{self, Tsl2561},
    },
    fault,
};
use panic_rtt_target as _;
use ssd1306::{
    I2CDisplayInterface, Ssd1306Async,
    mode::{BufferedGraphicsModeAsync, DisplayConfigAsync},
    prelude::{DisplayRotation, I2CInterface},
    size::DisplaySize128x64,
};
use static_cell::StaticCell;

/// I2c bus shared between the light sensor and the display
type I2cBus = Mutex<CriticalSectionRawMutex, I2c<'static, Async>>;
type SharedI2c = I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, Async>>;

type OledDriver = Ssd1306Async<
    I2CInterface<SharedI2c>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

/// The latest light reading, written by the acquisition task and read by the others
static READING: ReadingCell<CriticalSectionRawMutex> = ReadingCell::empty();

/// Run state shared by all tasks
static SUPERVISOR: Supervisor = Supervisor::new();

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();

/// The OLED panel as a framebuffer the text panel can draw on
struct Oled(OledDriver);

impl OriginDimensions for Oled {
    fn size(&self) -> Size {
        self.0.size()
    }
}

impl DrawTarget for Oled {
    type Color = BinaryColor;
    type Error = <OledDriver as DrawTarget>::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.0.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.0.clear(color)
    }
}

impl Framebuffer for Oled {
    async fn present(&mut self) {
        if self.0.flush().await.is_err() {
            warn!("DISPLAY: flush failed");
        }
    }
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    rtt_target::rtt_init_defmt!();

    let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    let mut led = Output::new(peripherals.GPIO3, Level::Low, OutputConfig::default());

    let i2c = match I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(100)),
    ) {
        Ok(i2c) => i2c
            .with_scl(peripherals.GPIO6)
            .with_sda(peripherals.GPIO5)
            .into_async(),
        Err(_) => halt(Fault::BusBringUp, &mut led).await,
    };
    let bus = I2C_BUS.init(Mutex::new(i2c));

    let mut sensor = Tsl2561::new(I2cDevice::new(bus), tsl2561::ADDRESS_FLOAT);
    if let Err(e) = sensor.init().await {
        error!("MAIN: Light sensor couldn't be initialised: {:?}", defmt::Debug2Format(&e));
        halt(Fault::SensorBringUp, &mut led).await;
    }

    let interface = I2CDisplayInterface::new(I2cDevice::new(bus));
    let mut oled = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if oled.init().await.is_err() {
        error!("MAIN: Display couldn't be initialised");
        halt(Fault::DisplayBringUp, &mut led).await;
    }
    let panel = TextPanel::new(Oled(oled));

    // Priority order. The first frame may still show the initial 0 lux, acquisition yields on its
    // first bus transfer.
    if spawner.spawn(acquisition_task(sensor)).is_err()
        || spawner.spawn(presentation_task(panel)).is_err()
    {
        error!("MAIN: Failed to spawn tasks");
        halt(Fault::Spawn, &mut led).await;
    }
    if spawner.spawn(indicator_task(led)).is_err() {
        // The indicator pin went with the failed spawn, so there is nothing left to blink
        error!("MAIN: Failed to spawn indicator task");
        SUPERVISOR.escalate(Fault::Spawn);
        return;
    }

    info!("MAIN: All tasks running");
}

/// Latch a start-up fault and blink it forever
async fn halt(fault: Fault, led: &mut Output<'static>) -> ! {
    SUPERVISOR.escalate(fault);
    fault::indicate(led, &mut Delay).await
}

#[embassy_executor::task]
async fn acquisition_task(sensor: Tsl2561<SharedI2c>) {
    let mut acquisition = Acquisition::new(&READING, sensor);
    if let Err(fault) = acquisition.run(Delay, &SUPERVISOR).await {
        error!("ACQUISITION: Task ended by {}", fault);
    }
}

#[embassy_executor::task]
async fn presentation_task(panel: TextPanel<Oled>) {
    let mut presentation = Presentation::new(&READING, panel);
    if let Err(fault) = presentation.run(Delay, &SUPERVISOR).await {
        error!("PRESENTATION: Task ended by {}", fault);
    }
}

#[embassy_executor::task]
async fn indicator_task(led: Output<'static>) {
    Indicator::new(&READING, led).run(Delay, &SUPERVISOR).await;
}
