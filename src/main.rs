use anyhow::Context;
use clap::Parser;
use winit::event_loop::EventLoop;

use ripple_pond::app::App;
use ripple_pond::cli::Args;
use ripple_pond::headless;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let params = args.simulation_parameters();
    params
        .validate()
        .context("invalid simulation parameters")?;

    if let Some(steps) = args.headless {
        headless::run(&params, steps, args.floaters);
        return Ok(());
    }

    log::info!("Starting Ripple Pond");

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(params);
    event_loop.run_app(&mut app)?;

    app.into_result()
}
