use anyhow::Result;
use log::{debug, info, warn};

use crate::binder::ScrollBinder;
use crate::cart::drawer::{CartDrawer, DrawerControls};
use crate::config::Config;
use crate::gfx::math::{Rect, Vec2};
use crate::model::LoadedModel;
use crate::overlay::PageOverlay;
use crate::scene::compose::{compose, ProductScene};
use crate::scroll::ScrollTracker;
use crate::session::Session;
use crate::timeline::{product_keyframes, Pose, Timeline};

pub const BTN_LEFT: u32 = 0x110;

// evdev key codes
pub const KEY_ESC: u32 = 1;
pub const KEY_Q: u32 = 16;
pub const KEY_C: u32 = 46;
pub const KEY_SPACE: u32 = 57;
pub const KEY_HOME: u32 = 102;
pub const KEY_UP: u32 = 103;
pub const KEY_PAGEUP: u32 = 104;
pub const KEY_END: u32 = 107;
pub const KEY_DOWN: u32 = 108;
pub const KEY_PAGEDOWN: u32 = 109;

const DRAWER_WIDTH: f32 = 420.0;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PointerEnter { pos: Vec2 },
    PointerLeave,
    PointerMove { pos: Vec2 },
    PointerDown { pos: Vec2, button: u32 },
    PointerUp,
    /// Vertical scroll in surface pixels, positive scrolls down the page.
    Scroll { delta: f32 },
    Key(u32),
    Resize { width: u32, height: u32 },
    Close,
}

pub struct App {
    pub config: Config,
    pub session: Session,
    pub scroll: ScrollTracker,
    pub product: ProductScene,
    pub overlay: PageOverlay,
    pub drawer: CartDrawer,
    pub logical_size: [u32; 2],
    pub pointer: Vec2,
    pub hover: bool,
    pub time: f32,
    pub running: bool,
    binder: ScrollBinder,
}

impl App {
    pub fn new(config: Config, session: Session, model: LoadedModel) -> Result<Self> {
        let mut product = compose(&config.camera, &config.lighting, &config.scroll, model);
        product.scene.background = Some(config.theme.palette().background);
        let initial = product
            .scene
            .node(product.model)
            .map(|n| n.transform.pose)
            .unwrap_or(Pose::IDENTITY);

        let timeline = match Timeline::builder()
            .defaults(config.timeline.segment_duration, config.timeline.ease)
            .entries(config.timeline.keyframes.iter().copied())
            .build(initial)
        {
            Ok(timeline) => timeline,
            Err(e) => {
                warn!("Invalid timeline in config ({}); using the product script", e);
                Timeline::builder().entries(product_keyframes()).build(initial)?
            }
        };
        info!(
            "Timeline: {} keyframes over {}s",
            timeline.entries().len(),
            timeline.duration()
        );

        let logical_size = [config.window.width, config.window.height];
        let scroll = ScrollTracker::new(
            config.scroll.pages,
            config.scroll.damping,
            logical_size[1] as f32,
        );
        let (panel, controls) = drawer_layout(logical_size);

        Ok(Self {
            config,
            session,
            scroll,
            product,
            overlay: PageOverlay::product_page(),
            drawer: CartDrawer::new(panel, controls),
            logical_size,
            pointer: Vec2::default(),
            hover: false,
            time: 0.0,
            running: true,
            binder: ScrollBinder::new(timeline),
        })
    }

    pub fn timeline(&self) -> &Timeline {
        self.binder.timeline()
    }

    pub fn model_pose(&self) -> Pose {
        self.product
            .scene
            .node(self.product.model)
            .map(|n| n.transform.pose)
            .unwrap_or(Pose::IDENTITY)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.logical_size = [width, height];
        self.scroll.resize(height as f32);
        let (panel, controls) = drawer_layout(self.logical_size);
        self.drawer.set_layout(panel, controls);
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::PointerEnter { pos } => {
                self.hover = true;
                self.pointer = pos;
            }
            UiEvent::PointerLeave => {
                self.hover = false;
            }
            UiEvent::PointerMove { pos } => {
                self.pointer = pos;
            }
            UiEvent::PointerDown { pos, button } => {
                self.pointer = pos;
                if button == BTN_LEFT && self.drawer.press(pos) {
                    debug!("Drawer open: {}", self.drawer.is_open());
                }
            }
            UiEvent::Scroll { delta } => {
                // The modal drawer blocks the page underneath.
                if !self.drawer.is_open() {
                    self.scroll.scroll_by(delta * self.config.scroll.wheel_multiplier);
                }
            }
            UiEvent::Key(key) => self.handle_key(key),
            UiEvent::Resize { width, height } => {
                info!("Resized to {}x{}", width, height);
                self.set_viewport(width, height);
            }
            UiEvent::Close => {
                self.running = false;
            }
            UiEvent::PointerUp => {}
        }
    }

    fn handle_key(&mut self, key: u32) {
        let page = self.scroll.viewport_height();
        let line = self.config.scroll.line_step;
        match key {
            KEY_ESC => self.drawer.close(),
            KEY_C => {
                if self.drawer.is_open() {
                    self.drawer.close();
                } else {
                    self.drawer.open();
                }
            }
            KEY_Q => self.running = false,
            _ if self.drawer.is_open() => {}
            KEY_PAGEDOWN | KEY_SPACE => self.scroll.scroll_by(page),
            KEY_PAGEUP => self.scroll.scroll_by(-page),
            KEY_DOWN => self.scroll.scroll_by(line),
            KEY_UP => self.scroll.scroll_by(-line),
            KEY_HOME => self.scroll.scroll_to_offset(0.0),
            KEY_END => self.scroll.scroll_to_offset(1.0),
            _ => {}
        }
    }

    /// Per-frame step: smooth the scroll, pose the model from it, and advance
    /// UI transitions.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.scroll.update(dt);

        let state = self.scroll.state();
        if let Some(node) = self.product.scene.node_mut(self.product.model) {
            self.binder.apply(state, &mut node.transform.pose);
        }
        self.product.scene.update_world_matrices();

        self.drawer.update(self.time);
    }
}

fn drawer_layout(size: [u32; 2]) -> (Rect, DrawerControls) {
    let (w, h) = (size[0] as f32, size[1] as f32);
    let panel_width = DRAWER_WIDTH.min(w);
    let panel = Rect::new(w - panel_width, 0.0, panel_width, h);
    (panel, DrawerControls::standard(w, h, panel_width))
}
