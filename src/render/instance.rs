use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::pipeline::QUAD_PX;
use crate::ecs::systems::sparkle::{SparkleView, VISIBLE_SECS};
use crate::pet::{Mood, PetView};

/// Per-instance data uploaded to GPU each frame.
/// Stride = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShapeInstance {
    /// Screen position of the shape's center (x, y).
    pub position: [f32; 2],
    /// Quad scale (width, height); 1.0 = `QUAD_PX` pixels.
    pub size: [f32; 2],
    /// RGBA color packed as u32.
    pub color: u32,
    /// Shape index, see `Shape`.
    pub shape: u32,
    /// Rotation angle in radians.
    pub rotation: f32,
}

/// Signed-distance shapes the fragment shader knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Shape {
    /// Shaded body disc with a light rim.
    Body = 0,
    /// Blurred disc (shadow, blush, glow, highlight).
    Soft = 1,
    /// Crisp disc (open eye, sparkle mark, bow knot).
    Dot = 2,
    /// Rounded bar (closed eye).
    Bar = 3,
    /// Two-winged bow.
    Bow = 4,
    /// Smile arc.
    Mouth = 5,
    /// Sleep letter.
    Zed = 6,
    /// Outline circle (cursor ring).
    Ring = 7,
}

/// Pack 0xRRGGBB plus an alpha in [0, 1].
pub fn rgba(rgb: u32, alpha: f32) -> u32 {
    let a = (alpha * 255.0) as u32;
    (rgb << 8) | (a & 0xFF)
}

impl ShapeInstance {
    pub fn new(shape: Shape, center: Vec2, size_px: Vec2, color: u32) -> Self {
        Self {
            position: center.into(),
            size: (size_px / QUAD_PX).into(),
            color,
            shape: shape as u32,
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }
}

// ---------------------------------------------------------------------------
// Pet
// ---------------------------------------------------------------------------

const BODY_PX: f32 = 80.0;

const BODY_BLUE: u32 = 0x93C5FD;
const NAVY: u32 = 0x1E3A8A;
const BOW_PINK: u32 = 0xF472B6;
const KNOT_PINK: u32 = 0xEC4899;
const BLUSH_PINK: u32 = 0xF9A8D4;
const GLOW_YELLOW: u32 = 0xFEF08A;
const ZED_BLUE: u32 = 0x60A5FA;
const CURSOR_BLUE: u32 = 0xBFDBFE;
const WHITE: u32 = 0xFFFFFF;
const BLACK: u32 = 0x000000;

/// Pulse period of the happy glow (seconds).
const GLOW_PERIOD: f32 = 2.0;
/// Bounce period of the sleep letters (seconds).
const ZED_PERIOD: f32 = 1.0;
const ZED_TILT: f32 = -0.15;

/// Lay out the pet's parts, back to front. Pure function of the view.
///
/// Offsets are in unscaled pixels from the pet's center; the squash/stretch
/// pair scales both offsets and sizes so the whole face deforms together.
pub fn compose_pet(view: &PetView, buf: &mut Vec<ShapeInstance>) {
    let c = view.pos;
    let s = view.scale;
    let mut part = |shape: Shape, offset: Vec2, size: Vec2, color: u32| {
        buf.push(ShapeInstance::new(shape, c + offset * s, size * s, color));
    };

    part(Shape::Soft, Vec2::new(0.0, 52.0), Vec2::new(56.0, 12.0), rgba(BLACK, 0.12));

    if view.mood == Mood::Happy {
        let phase = (view.time / GLOW_PERIOD * std::f32::consts::TAU).cos();
        let alpha = 0.2 * (0.75 + 0.25 * phase);
        part(Shape::Soft, Vec2::ZERO, Vec2::splat(140.0), rgba(GLOW_YELLOW, alpha));
    }

    part(Shape::Body, Vec2::ZERO, Vec2::splat(BODY_PX), rgba(BODY_BLUE, 1.0));
    part(Shape::Soft, Vec2::new(-16.0, -20.0), Vec2::splat(18.0), rgba(WHITE, 0.4));

    // Bow sits on top of the head.
    part(Shape::Bow, Vec2::new(0.0, -44.0), Vec2::new(40.0, 24.0), rgba(BOW_PINK, 1.0));
    part(Shape::Dot, Vec2::new(0.0, -44.0), Vec2::splat(7.0), rgba(KNOT_PINK, 1.0));

    let eyes_closed = view.blinking || view.mood == Mood::Sleepy;
    for x in [-12.0, 12.0] {
        if eyes_closed {
            part(Shape::Bar, Vec2::new(x, -2.0), Vec2::new(12.0, 3.0), rgba(NAVY, 1.0));
        } else {
            part(Shape::Dot, Vec2::new(x, -2.0), Vec2::splat(8.0), rgba(NAVY, 1.0));
        }
    }

    for x in [-22.0, 22.0] {
        part(Shape::Soft, Vec2::new(x, 10.0), Vec2::new(14.0, 8.0), rgba(BLUSH_PINK, 0.6));
    }

    part(Shape::Mouth, Vec2::new(0.0, 9.0), Vec2::new(10.0, 6.0), rgba(NAVY, 0.4));

    if view.mood == Mood::Sleepy {
        let hop = -(view.time / ZED_PERIOD * std::f32::consts::PI).sin().abs() * 10.0;
        let zeds = [
            (Vec2::new(44.0, -84.0), 12.0, 0.7),
            (Vec2::new(52.0, -66.0), 14.0, 0.5),
            (Vec2::new(60.0, -44.0), 18.0, 0.3),
        ];
        for (offset, px, alpha) in zeds {
            // Letters bounce but don't squash.
            buf.push(
                ShapeInstance::new(
                    Shape::Zed,
                    c + offset * s + Vec2::new(0.0, hop),
                    Vec2::splat(px),
                    rgba(ZED_BLUE, alpha),
                )
                .rotated(ZED_TILT),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Sparkles + cursor
// ---------------------------------------------------------------------------

const SPARKLE_MARKS: usize = 6;
const SPARKLE_RADIUS: f32 = 20.0;
const SPARKLE_DOT_PX: f32 = 4.0;

/// Six marks around the click point. Each mark "pings": grows to twice its
/// size while fading out over the sparkle's visible lifetime.
pub fn compose_sparkle(sparkle: &SparkleView, buf: &mut Vec<ShapeInstance>) {
    let t = (sparkle.age / VISIBLE_SECS as f32).clamp(0.0, 1.0);
    let size = Vec2::splat(SPARKLE_DOT_PX * (1.0 + t));
    let color = rgba(WHITE, 1.0 - t);
    for i in 0..SPARKLE_MARKS {
        let angle = i as f32 * std::f32::consts::TAU / SPARKLE_MARKS as f32;
        // Rotate first, then push out along the rotated "up".
        let offset = Vec2::new(angle.sin(), -angle.cos()) * SPARKLE_RADIUS;
        buf.push(ShapeInstance::new(Shape::Dot, sparkle.pos + offset, size, color));
    }
}

pub fn compose_cursor(pos: Vec2, buf: &mut Vec<ShapeInstance>) {
    buf.push(ShapeInstance::new(Shape::Ring, pos, Vec2::splat(24.0), rgba(CURSOR_BLUE, 0.5)));
}
