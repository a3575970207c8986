//! Page content that scrolls over the 3D view.
//!
//! Sections are anchored in viewport-height units from the top of the page
//! and move up by the scrolled distance, so they stay in step with the model.

use crate::config::Palette;
use crate::gfx::draw::Batch;
use crate::gfx::math::Rect;
use crate::scroll::ScrollTracker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left { margin: f32 },
    Center,
    Right { margin: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    Button(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Title(t) | Block::Heading(t) | Block::Paragraph(t) | Block::Button(t) => t,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, Block::Button(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Distance from the page top in viewport heights, 100 per page.
    pub top_vh: f32,
    pub align: Align,
    pub width: f32,
    /// Whether `top_vh` marks the vertical center instead of the top edge.
    pub centered: bool,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutBlock<'a> {
    pub block: &'a Block,
    pub rect: Rect,
}

const TITLE_HEIGHT: f32 = 180.0;
const HEADING_HEIGHT: f32 = 36.0;
const BUTTON_HEIGHT: f32 = 40.0;
const LINE_HEIGHT: f32 = 20.0;
const CHAR_WIDTH: f32 = 8.0;
const BLOCK_GAP: f32 = 20.0;

fn block_height(block: &Block, width: f32) -> f32 {
    match block {
        Block::Title(_) => TITLE_HEIGHT,
        Block::Heading(_) => HEADING_HEIGHT,
        Block::Button(_) => BUTTON_HEIGHT,
        Block::Paragraph(text) => {
            let chars_per_line = (width / CHAR_WIDTH).max(1.0);
            let lines = (text.chars().count() as f32 / chars_per_line).ceil().max(1.0);
            lines * LINE_HEIGHT
        }
    }
}

fn block_width(block: &Block, width: f32) -> f32 {
    match block {
        Block::Button(text) => (text.chars().count() as f32 * CHAR_WIDTH + 32.0).min(width),
        _ => width,
    }
}

impl Section {
    pub fn height(&self) -> f32 {
        let content: f32 = self.blocks.iter().map(|b| block_height(b, self.width)).sum();
        content + BLOCK_GAP * self.blocks.len().saturating_sub(1) as f32
    }

    /// Bounding rect in page coordinates (before scrolling).
    pub fn page_rect(&self, viewport_width: f32, viewport_height: f32) -> Rect {
        let width = self.width.min(viewport_width);
        let x = match self.align {
            Align::Left { margin } => margin,
            Align::Center => (viewport_width - width) / 2.0,
            Align::Right { margin } => viewport_width - margin - width,
        };
        let anchor = self.top_vh / 100.0 * viewport_height;
        let height = self.height();
        let y = if self.centered { anchor - height / 2.0 } else { anchor };
        Rect::new(x, y, width, height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageOverlay {
    pub sections: Vec<Section>,
}

impl PageOverlay {
    pub fn product_page() -> Self {
        Self {
            sections: vec![
                Section {
                    top_vh: 65.0,
                    align: Align::Center,
                    width: 900.0,
                    centered: true,
                    blocks: vec![Block::Title("NOVAFON".into())],
                },
                Section {
                    top_vh: 132.0,
                    align: Align::Left { margin: 40.0 },
                    width: 400.0,
                    centered: false,
                    blocks: vec![
                        Block::Heading("novafon power 2".into()),
                        Block::Paragraph(
                            "Das novafon power 2 macht die lokale Vibrationstherapie so smart wie nie zuvor. \
                             Das große Intensitätsspektrum mit 3 Frequenzen 100, 75 und 50 Hz und bis zu 15 \
                             Intensitätsstufen via App bietet die bisher vielfältigsten Einstellungsmöglichkeiten \
                             individuell anpassbar auf die Bedürfnisse von Mensch und Tier."
                                .into(),
                        ),
                        Block::Button("Read more".into()),
                    ],
                },
                Section {
                    top_vh: 230.0,
                    align: Align::Right { margin: 40.0 },
                    width: 540.0,
                    centered: false,
                    blocks: vec![
                        Block::Heading("Stay synced".into()),
                        Block::Paragraph(
                            "Dank Bluetooth-Konnektivität kann das novafon power 2 ganz einfach mit der novafon \
                             App verbunden werden und ermöglicht dadurch eine noch einfachere und individuellere \
                             Behandlung. Durch die IP Schutzklasse 44 ist das novafon power 2 auch gegen \
                             Spritzwasser bestens geschützt."
                                .into(),
                        ),
                        Block::Button("Read more".into()),
                    ],
                },
                Section {
                    top_vh: 350.0,
                    align: Align::Center,
                    width: 600.0,
                    centered: true,
                    blocks: vec![Block::Heading("Bereit für das was wichtig ist.".into())],
                },
                Section {
                    top_vh: 590.0,
                    align: Align::Center,
                    width: 200.0,
                    centered: true,
                    blocks: vec![Block::Button("Hello there!".into())],
                },
            ],
        }
    }

    /// Vertical distance the overlay has moved for the current scroll.
    pub fn scroll_shift(scroll: &ScrollTracker) -> f32 {
        scroll.offset() * scroll.scrollable_px()
    }

    /// Screen-space blocks that intersect the viewport.
    pub fn layout(&self, scroll: &ScrollTracker, viewport_width: f32) -> Vec<LaidOutBlock<'_>> {
        let viewport_height = scroll.viewport_height();
        let viewport = Rect::new(0.0, 0.0, viewport_width, viewport_height);
        let shift = Self::scroll_shift(scroll);

        let mut out = Vec::new();
        for section in &self.sections {
            let rect = section.page_rect(viewport_width, viewport_height).translate(0.0, -shift);
            if !rect.intersects(&viewport) {
                continue;
            }

            let mut y = rect.y;
            for block in &section.blocks {
                let h = block_height(block, rect.w);
                let w = block_width(block, rect.w);
                let x = match section.align {
                    Align::Center => rect.x + (rect.w - w) / 2.0,
                    _ => rect.x,
                };
                let block_rect = Rect::new(x, y, w, h);
                if block_rect.intersects(&viewport) {
                    out.push(LaidOutBlock {
                        block,
                        rect: block_rect,
                    });
                }
                y += h + BLOCK_GAP;
            }
        }
        out
    }

    pub fn paint(&self, batch: &mut Batch, scroll: &ScrollTracker, viewport_width: f32, palette: &Palette) {
        for laid in self.layout(scroll, viewport_width) {
            let rect = laid.rect;
            match laid.block {
                Block::Title(text) => {
                    batch.label(rect, text, rect.h * 0.8, palette.foreground);
                }
                Block::Heading(text) => {
                    batch.text(rect, text, HEADING_HEIGHT, palette.accent);
                }
                Block::Paragraph(text) => {
                    batch.text(rect, text, LINE_HEIGHT, palette.accent.with_alpha(0.7));
                }
                Block::Button(text) => {
                    batch.rect(rect, palette.accent);
                    batch.label(rect, text, LINE_HEIGHT * 0.8, palette.panel);
                }
            }
        }
    }
}
