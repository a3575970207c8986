use anyhow::{anyhow, Result};
use khronos_egl as egl;
use log::info;
use std::ffi::c_void;
use std::ptr;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::Proxy;

/// GLES2 context bound to a single window surface.
pub struct EglContext {
    egl: egl::Instance<egl::Static>,
    display: egl::Display,
    context: egl::Context,
    config: egl::Config,
    wl_egl_window: Option<wayland_egl::WlEglSurface>,
    surface: Option<egl::Surface>,
}

impl EglContext {
    pub fn new(wl_display: *mut c_void) -> Result<Self> {
        let egl = egl::Instance::new(egl::Static);

        let display = unsafe {
            egl.get_display(wl_display as egl::NativeDisplayType)
                .ok_or_else(|| anyhow!("Failed to get EGL display"))?
        };

        let (major, minor) = egl.initialize(display)?;
        info!("EGL version: {}.{}", major, minor);

        // The scene needs a depth buffer; the overlay only needs colour.
        let config_attribs = [
            egl::SURFACE_TYPE, egl::WINDOW_BIT,
            egl::RED_SIZE, 8,
            egl::GREEN_SIZE, 8,
            egl::BLUE_SIZE, 8,
            egl::ALPHA_SIZE, 8,
            egl::DEPTH_SIZE, 24,
            egl::RENDERABLE_TYPE, egl::OPENGL_ES2_BIT,
            egl::NONE,
        ];

        let config = egl
            .choose_first_config(display, &config_attribs)?
            .ok_or_else(|| anyhow!("No EGL config with a 24-bit depth buffer"))?;

        egl.bind_api(egl::OPENGL_ES_API)?;

        let context_attribs = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];
        let context = egl.create_context(display, config, None, &context_attribs)?;

        Ok(Self {
            egl,
            display,
            context,
            config,
            wl_egl_window: None,
            surface: None,
        })
    }

    pub fn create_surface(&mut self, wl_surface: &WlSurface, width: i32, height: i32) -> Result<()> {
        if let Some(surface) = self.surface.take() {
            self.egl.destroy_surface(self.display, surface)?;
        }
        self.wl_egl_window = None;

        let wl_egl_window = wayland_egl::WlEglSurface::new(wl_surface.id(), width, height)?;

        let surface = unsafe {
            self.egl.create_window_surface(
                self.display,
                self.config,
                wl_egl_window.ptr() as egl::NativeWindowType,
                None,
            )?
        };

        self.wl_egl_window = Some(wl_egl_window);
        self.surface = Some(surface);
        self.make_current()
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        if let Some(window) = &self.wl_egl_window {
            window.resize(width, height, 0, 0);
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        if let Some(surface) = self.surface {
            self.egl.swap_buffers(self.display, surface)?;
        }
        Ok(())
    }

    pub fn make_current(&self) -> Result<()> {
        if let Some(surface) = self.surface {
            self.egl
                .make_current(self.display, Some(surface), Some(surface), Some(self.context))?;
        }
        Ok(())
    }

    /// 0 disables vsync.
    pub fn set_swap_interval(&self, interval: i32) -> Result<()> {
        self.egl.swap_interval(self.display, interval)?;
        Ok(())
    }

    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        self.egl
            .get_proc_address(name)
            .map(|f| f as *const c_void)
            .unwrap_or(ptr::null())
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        let _ = self.egl.make_current(self.display, None, None, None);
        if let Some(surface) = self.surface.take() {
            let _ = self.egl.destroy_surface(self.display, surface);
        }
        self.wl_egl_window = None;
        let _ = self.egl.destroy_context(self.display, self.context);
        let _ = self.egl.terminate(self.display);
    }
}
