use kurbo::Shape;

use crate::{
    foundation::{
        core::{Rgba8, SceneId, non_negative_secs},
        error::{StoryboardError, StoryboardResult},
        math::Fnv1a64,
        settings::WaveformSettings,
    },
    timeline::model::Scene,
    waveform::{
        envelope::{envelope_outline, synth_envelope},
        text::LabelFont,
    },
};

/// Colors used by [`WaveformRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformStyle {
    /// Strip background behind everything.
    pub background: Rgba8,
    /// Fill of even-numbered scene bands.
    pub band_even: Rgba8,
    /// Fill of odd-numbered scene bands.
    pub band_odd: Rgba8,
    /// Scene label text.
    pub label: Rgba8,
    /// One-pixel divider at the left edge of every band.
    pub divider: Rgba8,
    /// Translucent envelope fill.
    pub envelope: Rgba8,
    /// Playhead line and handle.
    pub playhead: Rgba8,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::hex(0x1e293b),
            band_even: Rgba8::hex(0x334155),
            band_odd: Rgba8::hex(0x475569),
            label: Rgba8::hex(0xf1f5f9),
            divider: Rgba8::hex(0x0f172a),
            envelope: Rgba8::hex(0xa78bfa).with_alpha(77),
            playhead: Rgba8::hex(0xf43f5e),
        }
    }
}

/// Horizontal extent of one scene on the strip.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneBand {
    /// Position in the timeline.
    pub index: usize,
    /// Scene the band belongs to.
    pub scene_id: SceneId,
    /// Left edge in pixels.
    pub x0: f64,
    /// Right edge in pixels.
    pub x1: f64,
}

impl SceneBand {
    /// `true` if pixel column `x` falls inside the band.
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x0 && x < self.x1
    }
}

/// Label anchored at a baseline position.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLabel {
    /// Text, `"Scene N"` with a 1-based N.
    pub text: String,
    /// Left edge of the text.
    pub x: f64,
    /// Baseline.
    pub y: f64,
}

/// A rendered waveform strip.
///
/// Pixels are premultiplied RGBA8, row-major. Bands, labels and the playhead position are
/// returned alongside so hosts can hit test and overlay text when no label font is set.
#[derive(Clone, Debug)]
pub struct WaveformFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
    /// Scene bands in timeline order.
    pub bands: Vec<SceneBand>,
    /// Scene labels in timeline order.
    pub labels: Vec<SceneLabel>,
    /// `true` when labels were rasterized into `data`.
    pub labels_drawn: bool,
    /// Playhead column, absent when the timeline has no duration.
    pub playhead_x: Option<f64>,
}

impl WaveformFrame {
    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Stable hash of size and pixels, for cheap frame comparison.
    pub fn digest(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u64(u64::from(self.width));
        h.write_u64(u64::from(self.height));
        h.write_bytes(&self.data);
        h.finish()
    }

    /// Band under pixel column `x`.
    pub fn band_at_x(&self, x: f64) -> Option<&SceneBand> {
        self.bands.iter().find(|b| b.contains_x(x))
    }
}

const LABEL_OFFSET_X: f64 = 5.0;
const LABEL_BASELINE: f64 = 12.0;
const LABEL_SIZE_PX: f32 = 10.0;
const PLAYHEAD_WIDTH: f64 = 2.0;
const HANDLE_Y: f64 = 15.0;
const HANDLE_RADIUS: f64 = 5.0;

/// Rasterizes the timeline strip: scene bands, labels, a synthetic envelope and the playhead.
///
/// Output depends only on the scene list, the current time, the total duration and the
/// renderer's size, seed and style.
#[derive(Debug)]
pub struct WaveformRenderer {
    width: u32,
    height: u32,
    seed: u64,
    style: WaveformStyle,
    label_font: Option<LabelFont>,
}

impl WaveformRenderer {
    /// Renderer sized and seeded from settings, with default colors and no label font.
    pub fn new(settings: &WaveformSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            seed: settings.seed,
            style: WaveformStyle::default(),
            label_font: None,
        }
    }

    /// Override the colors.
    pub fn with_style(mut self, style: WaveformStyle) -> Self {
        self.style = style;
        self
    }

    /// Rasterize scene labels with the given TTF/OTF bytes.
    pub fn with_label_font(mut self, font_bytes: Vec<u8>) -> StoryboardResult<Self> {
        let font = LabelFont::from_bytes(font_bytes)?;
        tracing::debug!(family = font.family_name(), "waveform label font loaded");
        self.label_font = Some(font);
        Ok(self)
    }

    /// Strip width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Strip height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Global time under pixel column `x`; `x` is clamped to the strip.
    pub fn time_at_x(&self, x: f64, total_duration: f64) -> f64 {
        let total = non_negative_secs(total_duration);
        if self.width == 0 || !total.is_finite() {
            return 0.0;
        }
        let frac = (non_negative_secs(x) / f64::from(self.width)).min(1.0);
        frac * total
    }

    /// Playhead column for `current_time`, clamped to `[0, total]`.
    pub fn playhead_x(&self, current_time: f64, total_duration: f64) -> Option<f64> {
        if !(total_duration.is_finite() && total_duration > 0.0) {
            return None;
        }
        let t = non_negative_secs(current_time).min(total_duration);
        Some(t / total_duration * f64::from(self.width))
    }

    /// Band extents proportional to `duration / total_duration`.
    pub fn layout_bands(&self, scenes: &[Scene], total_duration: f64) -> Vec<SceneBand> {
        if !(total_duration.is_finite() && total_duration > 0.0) {
            return Vec::new();
        }
        let w = f64::from(self.width);
        let mut x = 0.0;
        scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| {
                let seg = non_negative_secs(scene.duration) / total_duration * w;
                let band = SceneBand {
                    index,
                    scene_id: scene.id.clone(),
                    x0: x,
                    x1: x + seg,
                };
                x += seg;
                band
            })
            .collect()
    }

    /// Draw the strip for `scenes` with the playhead at `current_time`.
    ///
    /// An empty scene list or a non-positive total yields a frame holding only the
    /// background.
    #[tracing::instrument(skip(self, scenes), fields(scenes = scenes.len(), w = self.width, h = self.height))]
    pub fn render(
        &mut self,
        scenes: &[Scene],
        current_time: f64,
        total_duration: f64,
    ) -> StoryboardResult<WaveformFrame> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| StoryboardError::render("waveform width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| StoryboardError::render("waveform height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(StoryboardError::render("waveform size must be non-zero"));
        }

        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let style = self.style;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        set_color(&mut ctx, style.background);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, width, height));

        let bands = if scenes.is_empty() {
            Vec::new()
        } else {
            self.layout_bands(scenes, total_duration)
        };
        let labels: Vec<SceneLabel> = bands
            .iter()
            .map(|b| SceneLabel {
                text: format!("Scene {}", b.index + 1),
                x: b.x0 + LABEL_OFFSET_X,
                y: LABEL_BASELINE,
            })
            .collect();

        for band in &bands {
            let fill = if band.index % 2 == 0 {
                style.band_even
            } else {
                style.band_odd
            };
            set_color(&mut ctx, fill);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(band.x0, 0.0, band.x1, height));
        }

        let mut labels_drawn = false;
        if let Some(font) = self.label_font.as_mut() {
            for label in &labels {
                font.draw(
                    &mut ctx,
                    &label.text,
                    label.x,
                    label.y,
                    LABEL_SIZE_PX,
                    style.label,
                )?;
            }
            labels_drawn = !labels.is_empty();
        }

        set_color(&mut ctx, style.divider);
        for band in &bands {
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                band.x0,
                0.0,
                band.x0 + 1.0,
                height,
            ));
        }

        let playhead_x = if bands.is_empty() {
            None
        } else {
            self.playhead_x(current_time, total_duration)
        };

        if !bands.is_empty() {
            let samples = synth_envelope(self.width as usize * 2, self.seed);
            let outline = envelope_outline(&samples, width, height);
            set_color(&mut ctx, style.envelope);
            ctx.fill_path(&bezpath_to_cpu(&outline));
        }

        if let Some(px) = playhead_x {
            set_color(&mut ctx, style.playhead);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                px - PLAYHEAD_WIDTH / 2.0,
                0.0,
                px + PLAYHEAD_WIDTH / 2.0,
                height,
            ));
            let handle = kurbo::Circle::new((px, HANDLE_Y), HANDLE_RADIUS).to_path(0.1);
            ctx.fill_path(&bezpath_to_cpu(&handle));
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        tracing::trace!(bands = bands.len(), ?playhead_x, "waveform rendered");
        Ok(WaveformFrame {
            width: self.width,
            height: self.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
            bands,
            labels,
            labels_drawn,
            playhead_x,
        })
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/render.rs"]
mod tests;
