mod app;
mod store;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the inventory store API
    #[arg(long, default_value = "http://localhost:8787")]
    store_url: String,

    /// Bearer token sent with every store request
    #[arg(long, env = "STOREMAP_API_KEY")]
    api_key: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = store::StoreConfig::new(&args.store_url, args.api_key).unwrap_or_else(|error| {
        eprintln!("storemap: {error:#}");
        std::process::exit(2);
    });

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "storemap",
        options,
        Box::new(move |cc| Ok(Box::new(app::StoreMapApp::new(cc, store)))),
    )
}
