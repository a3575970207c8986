//! Cart drawer: a modal side panel.
//!
//! While the drawer is open it covers the page with a backdrop. Pressing the
//! backdrop itself dismisses it, pressing inside the panel does not. Each
//! control is optional; a layout without, say, a continue button still
//! works, that command just never fires.

use log::debug;

use crate::config::Palette;
use crate::gfx::anim::Transition;
use crate::gfx::draw::Batch;
use crate::gfx::math::{Rect, Vec2};

const SLIDE_DURATION: f32 = 0.2;
const TITLE_LINE: f32 = 28.0;
const BODY_LINE: f32 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dialog container, i.e. the backdrop around the panel.
    Dialog,
    /// Anything inside the panel.
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerCommand {
    Open,
    Close,
    Continue,
    Click(ClickTarget),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawerControls {
    pub open_button: Option<Rect>,
    pub close_button: Option<Rect>,
    pub continue_button: Option<Rect>,
}

impl DrawerControls {
    /// Cart button at the top right of the page, panel controls inside a
    /// right-hand panel of `panel_width`.
    pub fn standard(viewport_width: f32, viewport_height: f32, panel_width: f32) -> Self {
        let panel_x = viewport_width - panel_width;
        Self {
            open_button: Some(Rect::new(viewport_width - 72.0, 16.0, 56.0, 40.0)),
            close_button: Some(Rect::new(viewport_width - 56.0, 16.0, 40.0, 40.0)),
            continue_button: Some(Rect::new(panel_x + 24.0, viewport_height - 72.0, panel_width - 48.0, 48.0)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartDrawer {
    open: bool,
    /// State the slide transition is heading toward.
    animating_open: bool,
    slide: Transition,
    panel: Rect,
    controls: DrawerControls,
}

impl CartDrawer {
    pub fn new(panel: Rect, controls: DrawerControls) -> Self {
        Self {
            open: false,
            animating_open: false,
            slide: Transition::finished(SLIDE_DURATION),
            panel,
            controls,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn panel(&self) -> Rect {
        self.panel
    }

    pub fn controls(&self) -> &DrawerControls {
        &self.controls
    }

    pub fn set_layout(&mut self, panel: Rect, controls: DrawerControls) {
        self.panel = panel;
        self.controls = controls;
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn continue_shopping(&mut self) {
        self.close();
    }

    pub fn click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Dialog {
            self.close();
        }
    }

    pub fn apply(&mut self, command: DrawerCommand) {
        debug!("Drawer command {:?}", command);
        match command {
            DrawerCommand::Open => self.open(),
            DrawerCommand::Close => self.close(),
            DrawerCommand::Continue => self.continue_shopping(),
            DrawerCommand::Click(target) => self.click(target),
        }
    }

    /// Maps a pointer press to a command. While open the modal captures every
    /// press; while closed only the open button reacts.
    pub fn hit_test(&self, pos: Vec2) -> Option<DrawerCommand> {
        let hit = |rect: Option<Rect>| rect.is_some_and(|r| r.contains(pos));

        if self.open {
            if hit(self.controls.close_button) {
                Some(DrawerCommand::Close)
            } else if hit(self.controls.continue_button) {
                Some(DrawerCommand::Continue)
            } else if self.panel.contains(pos) {
                Some(DrawerCommand::Click(ClickTarget::Content))
            } else {
                Some(DrawerCommand::Click(ClickTarget::Dialog))
            }
        } else if hit(self.controls.open_button) {
            Some(DrawerCommand::Open)
        } else {
            None
        }
    }

    /// Handles a press and reports whether the drawer consumed it.
    pub fn press(&mut self, pos: Vec2) -> bool {
        match self.hit_test(pos) {
            Some(command) => {
                self.apply(command);
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, now: f32) {
        self.slide.update(now);
        if self.open != self.animating_open {
            // A reversal resumes from the mirrored progress.
            self.animating_open = self.open;
            let remaining = 1.0 - self.slide.progress();
            self.slide.start(now - remaining * self.slide.duration);
            self.slide.update(now);
        }
    }

    /// 0 when fully hidden, 1 when fully shown.
    pub fn visibility(&self) -> f32 {
        let p = self.slide.eased_progress();
        if self.animating_open {
            p
        } else {
            1.0 - p
        }
    }

    /// Draws the cart button, and the backdrop and panel while they are
    /// visible. The panel slides in from the right edge.
    pub fn paint(&self, batch: &mut Batch, viewport: Rect, palette: &Palette) {
        let vis = self.visibility();

        if let Some(button) = self.controls.open_button {
            if vis < 1.0 {
                let color = palette.accent.with_alpha(1.0 - vis);
                batch.outline(button, 2.0, color);
                batch.label(button, "Cart", BODY_LINE, color);
            }
        }
        if vis <= 0.0 {
            return;
        }

        batch.rect(viewport, palette.backdrop.with_alpha(palette.backdrop.a * vis));

        let dx = (1.0 - vis) * self.panel.w;
        let panel = self.panel.translate(dx, 0.0);
        batch.rect(panel, palette.panel);

        let inner = Rect::new(panel.x + 24.0, panel.y + 24.0, panel.w - 96.0, TITLE_LINE);
        batch.text(inner, "Your cart", TITLE_LINE, palette.accent);
        let body = Rect::new(panel.x + 24.0, inner.bottom() + 24.0, panel.w - 48.0, BODY_LINE);
        batch.text(body, "Your cart is empty.", BODY_LINE, palette.accent.with_alpha(0.7));

        if let Some(close) = self.controls.close_button {
            let close = close.translate(dx, 0.0);
            batch.outline(close, 2.0, palette.accent);
            batch.label(close, "X", BODY_LINE, palette.accent);
        }
        if let Some(cont) = self.controls.continue_button {
            let cont = cont.translate(dx, 0.0);
            batch.rect(cont, palette.accent);
            batch.label(cont, "Continue shopping", BODY_LINE, palette.panel);
        }
    }
}
