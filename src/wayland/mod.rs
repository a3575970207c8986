pub mod egl;

use log::{debug, info};
use product_viewer::app::UiEvent;
use product_viewer::gfx::math::Vec2;
use wayland_client::{
    protocol::{wl_compositor, wl_keyboard, wl_pointer, wl_registry, wl_seat, wl_surface},
    Connection, Dispatch, QueueHandle, WEnum,
};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

pub struct WaylandState {
    pub running: bool,
    pub configured: bool,
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub wm_base: Option<xdg_wm_base::XdgWmBase>,
    pub surface: Option<wl_surface::WlSurface>,
    pub xdg_surface: Option<xdg_surface::XdgSurface>,
    pub toplevel: Option<xdg_toplevel::XdgToplevel>,
    pub seat: Option<wl_seat::WlSeat>,
    pub pointer: Option<wl_pointer::WlPointer>,
    pub keyboard: Option<wl_keyboard::WlKeyboard>,
    pub surface_pos: Vec2,
    /// Size from the last toplevel configure, applied on the next ack.
    pub pending_size: Option<[u32; 2]>,
    pub size: [u32; 2],
    pub pending_events: Vec<UiEvent>,
}

impl WaylandState {
    pub fn new(initial_size: [u32; 2]) -> Self {
        Self {
            running: true,
            configured: false,
            compositor: None,
            wm_base: None,
            surface: None,
            xdg_surface: None,
            toplevel: None,
            seat: None,
            pointer: None,
            keyboard: None,
            surface_pos: Vec2::default(),
            pending_size: None,
            size: initial_size,
            pending_events: Vec::new(),
        }
    }

    /// Creates the window surface and its xdg toplevel role.
    pub fn create_window(&mut self, qh: &QueueHandle<Self>, title: &str) -> anyhow::Result<()> {
        let compositor = self
            .compositor
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Compositor does not offer wl_compositor"))?;
        let wm_base = self
            .wm_base
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Compositor does not offer xdg_wm_base"))?;

        let surface = compositor.create_surface(qh, ());
        let xdg_surface = wm_base.get_xdg_surface(&surface, qh, ());
        let toplevel = xdg_surface.get_toplevel(qh, ());
        toplevel.set_title(title.to_string());
        toplevel.set_app_id("product-viewer".to_string());
        surface.commit();

        self.surface = Some(surface);
        self.xdg_surface = Some(xdg_surface);
        self.toplevel = Some(toplevel);
        Ok(())
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match &interface[..] {
                "wl_compositor" => {
                    let compositor = registry.bind::<wl_compositor::WlCompositor, _, _>(name, version.min(4), qh, ());
                    state.compositor = Some(compositor);
                }
                "xdg_wm_base" => {
                    let wm_base = registry.bind::<xdg_wm_base::XdgWmBase, _, _>(name, version.min(2), qh, ());
                    state.wm_base = Some(wm_base);
                }
                "wl_seat" => {
                    let seat = registry.bind::<wl_seat::WlSeat, _, _>(name, version.min(5), qh, ());
                    state.seat = Some(seat);
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_compositor::WlCompositor, _: wl_compositor::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_surface::WlSurface, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_surface::WlSurface, _: wl_surface::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for WaylandState {
    fn event(
        _: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            if let Some(size) = state.pending_size.take() {
                if size != state.size {
                    state.size = size;
                    state.pending_events.push(UiEvent::Resize {
                        width: size[0],
                        height: size[1],
                    });
                }
            }
            if !state.configured {
                info!("Window configured at {}x{}", state.size[0], state.size[1]);
            }
            state.configured = true;
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                // Zero means the client picks its own size.
                if width > 0 && height > 0 {
                    state.pending_size = Some([width as u32, height as u32]);
                }
            }
            xdg_toplevel::Event::Close => {
                state.pending_events.push(UiEvent::Close);
                state.running = false;
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(caps),
        } = event
        {
            if caps.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qh, ()));
            }
            if caps.contains(wl_seat::Capability::Keyboard) && state.keyboard.is_none() {
                state.keyboard = Some(seat.get_keyboard(qh, ()));
            }
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Enter { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
                state.pending_events.push(UiEvent::PointerEnter { pos: state.surface_pos });
            }
            wl_pointer::Event::Leave { .. } => {
                state.pending_events.push(UiEvent::PointerLeave);
            }
            wl_pointer::Event::Motion { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
                state.pending_events.push(UiEvent::PointerMove { pos: state.surface_pos });
            }
            wl_pointer::Event::Button { button, state: btn_state, .. } => {
                let ev = match btn_state {
                    WEnum::Value(wl_pointer::ButtonState::Pressed) => UiEvent::PointerDown {
                        pos: state.surface_pos,
                        button,
                    },
                    WEnum::Value(wl_pointer::ButtonState::Released) => UiEvent::PointerUp,
                    _ => return,
                };
                state.pending_events.push(ev);
            }
            wl_pointer::Event::Axis {
                axis: WEnum::Value(wl_pointer::Axis::VerticalScroll),
                value,
                ..
            } => {
                // Positive values scroll toward the bottom of the page.
                state.pending_events.push(UiEvent::Scroll { delta: value as f32 });
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            // Keys are handled by evdev code; the keymap fd is closed on drop.
            wl_keyboard::Event::Keymap { .. } => {}
            wl_keyboard::Event::Key {
                key,
                state: WEnum::Value(wl_keyboard::KeyState::Pressed),
                ..
            } => {
                debug!("Key {}", key);
                state.pending_events.push(UiEvent::Key(key));
            }
            _ => {}
        }
    }
}
