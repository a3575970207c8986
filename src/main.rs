mod wayland;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use product_viewer::app::App;
use product_viewer::cart::client::CartClient;
use product_viewer::config::Config;
use product_viewer::gfx::draw::{Batch, DrawContext, UI_ATTRIBS, UI_UNIFORMS};
use product_viewer::gfx::gl::ShaderProgram;
use product_viewer::gfx::math::Rect;
use product_viewer::gfx::renderer::{MeshRenderer, MESH_ATTRIBS, MESH_UNIFORMS};
use product_viewer::model;
use product_viewer::session::{CustomerId, Session};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use wayland::egl::EglContext;
use wayland::WaylandState;
use wayland_client::backend::WaylandError;
use wayland_client::{Connection, EventQueue, Proxy};

const SHADER_DIR: &str = "assets/shaders";

#[derive(Parser, Debug)]
#[command(version, about = "Scroll-driven 3D product page")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// glTF/GLB model to show
    #[arg(long)]
    model: Option<PathBuf>,

    /// Customer id for this session
    #[arg(long)]
    customer: Option<String>,

    /// Leave the remote cart untouched on startup
    #[arg(long)]
    no_clear_cart: bool,
}

fn load_config(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        warn!("Failed to load config ({:#}); using defaults", e);
        Config::default()
    })
}

fn start_session(cli: &Cli, config: &Config) -> Session {
    let customer = CustomerId::resolve(cli.customer.as_deref(), &config.cart.default_customer);
    let cart = if config.cart.clear_on_start && !cli.no_clear_cart {
        CartClient::new(&config.cart.endpoint)
            .map_err(|e| warn!("Cart disabled: {:#}", e))
            .ok()
    } else {
        None
    };
    let session = Session::new(customer, cart);
    session.start();
    session
}

/// Reads whatever the compositor has sent without blocking, then dispatches it.
fn pump_events(event_queue: &mut EventQueue<WaylandState>, state: &mut WaylandState) -> Result<()> {
    event_queue.flush()?;
    if let Some(guard) = event_queue.prepare_read() {
        match guard.read() {
            Ok(_) => {}
            Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }
    }
    event_queue.dispatch_pending(state)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref());
    if let Some(path) = &cli.model {
        config.model.path = path.clone();
    }

    let session = start_session(&cli, &config);
    let model = model::load_or_placeholder(&config.model.path);
    let mut app = App::new(config, session, model)?;

    info!("Connecting to Wayland...");
    let conn = Connection::connect_to_env()?;
    let display = conn.display();
    let mut event_queue = conn.new_event_queue();
    let qh = event_queue.handle();
    let _registry = display.get_registry(&qh, ());

    let mut state = WaylandState::new(app.logical_size);
    event_queue.roundtrip(&mut state)?;

    state.create_window(&qh, &app.config.window.title)?;
    while !state.configured {
        event_queue.blocking_dispatch(&mut state)?;
    }

    let display_ptr = display.id().as_ptr() as *mut _;
    let mut egl = EglContext::new(display_ptr)?;
    let mut surface_size = state.size;
    if let Some(surface) = &state.surface {
        egl.create_surface(surface, surface_size[0] as i32, surface_size[1] as i32)?;
    }
    if let Err(e) = egl.set_swap_interval(0) {
        warn!("Could not disable vsync: {:#}", e);
    }

    let gl = Rc::new(unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) });

    info!("Loading shaders from {}", SHADER_DIR);
    let shader_dir = Path::new(SHADER_DIR);
    let mesh_program = ShaderProgram::from_files(&gl, shader_dir, "mesh", MESH_UNIFORMS, MESH_ATTRIBS)?;
    let ui_program = ShaderProgram::from_files(&gl, shader_dir, "ui", UI_UNIFORMS, UI_ATTRIBS)?;

    let mut renderer = MeshRenderer::new(gl.clone(), mesh_program);
    renderer.upload(&app.product.scene)?;
    let mut draw = DrawContext::new(gl.clone(), ui_program)?;
    let mut batch = Batch::new();
    let palette = app.config.theme.palette();

    let frame_budget = Duration::from_secs_f64(1.0 / app.config.window.fps_cap.max(1) as f64);
    let mut last_frame = Instant::now();

    info!("Starting main loop");
    while state.running && app.running {
        let frame_start = Instant::now();
        pump_events(&mut event_queue, &mut state)?;

        for ev in state.pending_events.drain(..) {
            app.handle_event(ev);
        }

        let dt = frame_start.duration_since(last_frame).as_secs_f32();
        last_frame = frame_start;
        app.update(dt);

        if app.logical_size != surface_size {
            surface_size = app.logical_size;
            egl.resize(surface_size[0] as i32, surface_size[1] as i32);
        }

        egl.make_current()?;
        renderer.render(&app.product.scene, surface_size);

        let [w, h] = surface_size.map(|x| x as f32);
        batch.clear();
        app.overlay.paint(&mut batch, &app.scroll, w, &palette);
        app.drawer.paint(&mut batch, Rect::new(0.0, 0.0, w, h), &palette);
        draw.begin([w, h]);
        draw.draw(&batch);

        egl.swap_buffers()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }

    info!("Shutting down");
    Ok(())
}
