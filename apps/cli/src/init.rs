use fern::Dispatch;
use log::LevelFilter;

pub fn setup_logger(verbose: bool) {
    let logger = Dispatch::new()
        .format(move |out, message, record| {
            let (color, reset) = match record.level() {
                log::Level::Error => ("\x1b[31m", "\x1b[0m"),
                log::Level::Warn => ("\x1b[33m", "\x1b[0m"),
                log::Level::Info | log::Level::Debug | log::Level::Trace => ("", ""),
            };
            let message = if verbose {
                format!("({}) {}", record.target(), message)
            } else {
                message.to_string()
            };
            out.finish(format_args!("{}{}: {}{}", color, record.level(), message, reset))
        })
        .level(if verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        })
        .chain(std::io::stderr());

    if let Err(e) = logger.apply() {
        eprintln!("Failed to apply logger: {:?}", e);
    }
}
