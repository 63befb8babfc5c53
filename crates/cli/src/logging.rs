use std::any::Any;
use std::panic;
use std::path::Path;

use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

pub const LOG_FILE: &str = "/tmp/tracevm.log";

pub fn setup(debug: bool, log_file: &Path) -> anyhow::Result<()> {
    panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();
        let cause = panic_cause(panic_info.payload());
        match panic_info.location() {
            Some(loc) => log::error!("Panic at {}:{}: {cause}", loc.file(), loc.line()),
            None => log::error!("Panic at unknown location: {cause}"),
        }
        log::error!("{backtrace}");
    }));

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{l} {d(%H:%M:%S.%3f)} {M}:{L} {m}{n}",
        )))
        .build(log_file)?;

    // Trace level shows every failed thread and finished generation
    let level = if debug {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };

    let config = Config::builder()
        .appender(Appender::builder().build("file-appender", Box::new(file_appender)))
        .build(Root::builder().appender("file-appender").build(level))?;

    let _handle = log4rs::init_config(config)?;
    Ok(())
}

/// Panic payloads are either a `&str` or a formatted `String`
fn panic_cause(payload: &(dyn Any + Send)) -> &str {
    if let Some(cause) = payload.downcast_ref::<&str>() {
        return cause;
    }

    payload
        .downcast_ref::<String>()
        .map_or("<cause unknown>", String::as_str)
}
