use std::str::FromStr;

use fern::colors::{Color, ColoredLevelConfig};

/// Logs go to stderr; stdout carries the request reports.
pub fn init(log_level: &str, colored: bool) -> anyhow::Result<()> {
    let colors = ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().to_rfc3339(),
                if colored {
                    colors.color(record.level()).to_string()
                } else {
                    record.level().to_string()
                },
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::from_str(log_level)?)
        .level_for("reqwest", log::LevelFilter::Warn)
        .level_for("hyper", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
