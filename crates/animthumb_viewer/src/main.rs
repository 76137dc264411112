mod app;
mod args;

use animthumb::{DataPath, DataPathType};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::app::ViewerApp;
use crate::args::Args;

fn setup_logging(path: &DataPath) {
    use tracing_appender::{
        non_blocking,
        rolling::{RollingFileAppender, Rotation},
    };
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        path.path(DataPathType::Log),
        format!("animthumb-{}.log", env!("CARGO_PKG_VERSION")),
    );

    let (non_blocking_writer, guard) = non_blocking(file_appender);
    // the guard flushes the file writer on drop, keep it for the whole program
    std::mem::forget(guard);

    // Log to stdout (if you run with `RUST_LOG=debug`).
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_writer);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("animthumb=info,animthumb_viewer=info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(env_filter)
        .init();
}

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let (args, unrecognized) = Args::parse(&raw_args);

    let data_path = args
        .datapath
        .as_ref()
        .map(DataPath::new)
        .unwrap_or_default();

    setup_logging(&data_path);

    for arg in &unrecognized {
        warn!("unrecognized argument: {arg}");
    }

    if args.paths.is_empty() {
        error!("usage: animthumb [--mode never|on-hover|on-select|always] [--size PX] [--datapath DIR] FILE...");
        return;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title("Animated thumbnails"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "animthumb",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(&cc.egui_ctx, args, &data_path)))),
    ) {
        error!("viewer exited with error: {e}");
    }
}
