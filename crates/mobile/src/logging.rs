use std::{panic::PanicHookInfo, sync::Once};

use tracing_subscriber::{
    filter::FilterFn, fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Route `tracing` output to the platform log and log panics through it.
/// Call this once at startup from Kotlin/Swift; later calls do nothing.
#[uniffi::export]
pub fn init_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        install_subscriber();
        std::panic::set_hook(Box::new(panic_hook));
    })
}

fn crate_filter() -> FilterFn<impl Fn(&tracing::Metadata<'_>) -> bool> {
    FilterFn::new(|en| en.module_path().unwrap_or_default().starts_with("bus_for_you"))
}

#[cfg(target_os = "android")]
fn install_subscriber() {
    use tracing_logcat::{LogcatMakeWriter, LogcatTag};

    let tag = LogcatTag::Fixed("BusForYou-Rust".to_owned());
    let writer = match LogcatMakeWriter::new(tag) {
        Ok(writer) => writer,
        Err(error) => {
            eprintln!("failed to initialize logcat writer: {error}");
            return;
        }
    };
    let layer = tracing_subscriber::fmt::layer()
        .event_format(Format::default().with_level(false).without_time())
        .with_writer(writer)
        .with_ansi(false);
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(crate_filter())
        .try_init();
}

#[cfg(not(target_os = "android"))]
fn install_subscriber() {
    let layer = tracing_subscriber::fmt::layer()
        .event_format(Format::default().without_time())
        .with_ansi(false);
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(crate_filter())
        .try_init();
}

fn panic_hook(info: &PanicHookInfo) {
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("{info}\nBacktrace:\n{backtrace}")
}
