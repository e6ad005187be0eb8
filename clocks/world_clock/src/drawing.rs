//! Drawing module - pinned cards and clock faces
//!
//! Lays out the pinned row in the area between the egui header and the grid
//! panel, and draws whatever face `shared::render_face` describes.

use nannou::prelude::*;
use shared::{
    polar_point, render_face, AnalogFace, ClockFace, ClockMode, ClockTimeInfo, DigitalFace,
    DropIndicator, HybridFace, InsertionSide, SizeClass, Timezone, MAX_PINNED,
};

/// Green-on-black terminal palette
#[allow(dead_code)]
pub mod colors {
    use nannou::prelude::*;

    pub const BACKGROUND: Srgb<u8> = Srgb {
        red: 6,
        green: 10,
        blue: 8,
        standard: std::marker::PhantomData,
    };

    pub const CARD_BG: Srgb<u8> = Srgb {
        red: 12,
        green: 22,
        blue: 16,
        standard: std::marker::PhantomData,
    };

    pub const CARD_BORDER: Srgb<u8> = Srgb {
        red: 30,
        green: 90,
        blue: 50,
        standard: std::marker::PhantomData,
    };

    /// Border of the keyboard-focused card
    pub const CARD_BORDER_FOCUSED: Srgb<u8> = Srgb {
        red: 80,
        green: 220,
        blue: 120,
        standard: std::marker::PhantomData,
    };

    /// Card being dragged
    pub const CARD_BG_DRAGGING: Srgb<u8> = Srgb {
        red: 8,
        green: 14,
        blue: 10,
        standard: std::marker::PhantomData,
    };

    pub const TEXT_PRIMARY: Srgb<u8> = Srgb {
        red: 120,
        green: 255,
        blue: 160,
        standard: std::marker::PhantomData,
    };

    pub const TEXT_SECONDARY: Srgb<u8> = Srgb {
        red: 60,
        green: 150,
        blue: 90,
        standard: std::marker::PhantomData,
    };

    pub const TICK: Srgb<u8> = Srgb {
        red: 50,
        green: 130,
        blue: 80,
        standard: std::marker::PhantomData,
    };

    pub const TICK_EMPHASIZED: Srgb<u8> = Srgb {
        red: 110,
        green: 230,
        blue: 150,
        standard: std::marker::PhantomData,
    };

    pub const HAND: Srgb<u8> = Srgb {
        red: 140,
        green: 255,
        blue: 180,
        standard: std::marker::PhantomData,
    };

    /// Second hand
    pub const ACCENT: Srgb<u8> = Srgb {
        red: 255,
        green: 190,
        blue: 70,
        standard: std::marker::PhantomData,
    };

    pub const DROP_INDICATOR: Srgb<u8> = Srgb {
        red: 255,
        green: 190,
        blue: 70,
        standard: std::marker::PhantomData,
    };

    pub const CLOSE_BOX: Srgb<u8> = Srgb {
        red: 200,
        green: 90,
        blue: 80,
        standard: std::marker::PhantomData,
    };
}

pub const CARD_WIDTH: f32 = 210.0;
pub const CARD_HEIGHT: f32 = 290.0;
const CARD_GAP: f32 = 16.0;
const CLOSE_BOX_SIZE: f32 = 18.0;
const EMPTY_HINT: &str = "SELECT UP TO 5 TIMEZONES FOR PRIORITY DISPLAY";

/// Central area between the header and the grid panel
#[derive(Debug, Clone, Copy)]
pub struct PinnedLayout {
    pub area: Rect,
}

impl PinnedLayout {
    pub fn calculate(window_rect: Rect, header_height: f32, grid_height: f32) -> Self {
        let top = window_rect.top() - header_height;
        let bottom = window_rect.bottom() + grid_height;
        let area = Rect::from_corners(
            pt2(window_rect.left(), bottom),
            pt2(window_rect.right(), top),
        );
        Self { area }
    }

    /// Card width for a row of `count`, narrowed so the row plus an outer
    /// gap on each side fits the area
    pub fn card_width(&self, count: usize) -> f32 {
        let count = count.clamp(1, MAX_PINNED) as f32;
        let fit = (self.area.w() - (count + 1.0) * CARD_GAP) / count;
        fit.min(CARD_WIDTH)
    }

    /// Rect of the card at `index` in a row of `count`
    pub fn card_rect(&self, index: usize, count: usize) -> Rect {
        let width = self.card_width(count);
        let count = count.clamp(1, MAX_PINNED) as f32;
        let total = count * width + (count - 1.0) * CARD_GAP;
        let x = self.area.x() - total / 2.0 + width / 2.0 + index as f32 * (width + CARD_GAP);
        Rect::from_x_y_w_h(x, self.area.y(), width, CARD_HEIGHT)
    }

    pub fn close_box(&self, index: usize, count: usize) -> Rect {
        let card = self.card_rect(index, count);
        Rect::from_x_y_w_h(
            card.right() - CLOSE_BOX_SIZE,
            card.top() - CLOSE_BOX_SIZE,
            CLOSE_BOX_SIZE,
            CLOSE_BOX_SIZE,
        )
    }

    /// Index of the card under `pos`
    pub fn card_at(&self, pos: Point2, count: usize) -> Option<usize> {
        (0..count).find(|&i| self.card_rect(i, count).contains(pos))
    }

    /// Index of the card whose close box is under `pos`
    pub fn close_box_at(&self, pos: Point2, count: usize) -> Option<usize> {
        (0..count).find(|&i| self.close_box(i, count).contains(pos))
    }
}

/// Per-card inputs
pub struct PinnedCard<'a> {
    pub timezone: &'a Timezone,
    pub info: Option<&'a ClockTimeInfo>,
    pub focused: bool,
    pub dragging: bool,
}

/// Draw the pinned row, or the empty hint
pub fn draw_pinned_row(
    draw: &Draw,
    layout: &PinnedLayout,
    cards: &[PinnedCard],
    mode: ClockMode,
    indicator: Option<DropIndicator>,
) {
    if cards.is_empty() {
        draw.text(EMPTY_HINT)
            .xy(layout.area.xy())
            .color(colors::TEXT_SECONDARY)
            .font_size(16)
            .w(layout.area.w());
        return;
    }

    for (i, card) in cards.iter().enumerate() {
        let rect = layout.card_rect(i, cards.len());
        draw_card(draw, rect, card, mode);
        draw_close_box(draw, layout.close_box(i, cards.len()));

        if let Some(indicator) = indicator {
            if indicator.target_id == card.timezone.id {
                draw_drop_indicator(draw, rect, indicator.side);
            }
        }
    }
}

fn draw_card(draw: &Draw, rect: Rect, card: &PinnedCard, mode: ClockMode) {
    let bg = if card.dragging {
        colors::CARD_BG_DRAGGING
    } else {
        colors::CARD_BG
    };
    let border = if card.focused {
        colors::CARD_BORDER_FOCUSED
    } else {
        colors::CARD_BORDER
    };

    draw.rect()
        .xy(rect.xy())
        .wh(rect.wh())
        .color(bg)
        .stroke(border)
        .stroke_weight(if card.focused { 2.0 } else { 1.0 });

    draw.text(&card.timezone.city.to_uppercase())
        .x_y(rect.x(), rect.top() - 24.0)
        .color(colors::TEXT_PRIMARY)
        .font_size(16)
        .w(rect.w() - 2.0 * CLOSE_BOX_SIZE);

    draw.text(&card.timezone.subtitle())
        .x_y(rect.x(), rect.top() - 46.0)
        .color(colors::TEXT_SECONDARY)
        .font_size(10)
        .w(rect.w() - 12.0);

    let face_center = pt2(rect.x(), rect.y() - 20.0);
    match card.info {
        Some(info) => {
            let face = render_face(info, mode, pinned_face_size(mode));
            draw_face(draw, face_center, &face, rect.w());
        }
        None => {
            draw.text("--:--:--")
                .xy(face_center)
                .color(colors::TEXT_SECONDARY)
                .font_size(24)
                .w(rect.w());
        }
    }
}

fn draw_close_box(draw: &Draw, rect: Rect) {
    draw.text("×")
        .xy(rect.xy())
        .color(colors::CLOSE_BOX)
        .font_size(16)
        .w(rect.w());
}

fn draw_drop_indicator(draw: &Draw, card: Rect, side: InsertionSide) {
    let x = match side {
        InsertionSide::Before => card.left() - CARD_GAP / 2.0,
        InsertionSide::After => card.right() + CARD_GAP / 2.0,
    };
    draw.line()
        .start(pt2(x, card.top()))
        .end(pt2(x, card.bottom()))
        .color(colors::DROP_INDICATOR)
        .weight(3.0);
}

/// Digital cards use the large size so seconds show; dials use the medium one
pub fn pinned_face_size(mode: ClockMode) -> SizeClass {
    match mode {
        ClockMode::Digital => SizeClass::Large,
        ClockMode::Analog | ClockMode::Hybrid => SizeClass::Medium,
    }
}

/// Draw a face centered on `center`, with text wrapped to `width`
pub fn draw_face(draw: &Draw, center: Point2, face: &ClockFace, width: f32) {
    match face {
        ClockFace::Digital(digital) => draw_digital(draw, center, digital, width),
        ClockFace::Analog(analog) => draw_dial(draw, center, analog, width),
        ClockFace::Hybrid(hybrid) => draw_hybrid(draw, center, hybrid, width),
    }
}

fn draw_digital(draw: &Draw, center: Point2, face: &DigitalFace, width: f32) {
    draw.text(&face.time)
        .xy(center + vec2(0.0, 30.0))
        .color(colors::TEXT_PRIMARY)
        .font_size(34)
        .w(width);
    draw.text(&face.date)
        .xy(center + vec2(0.0, -10.0))
        .color(colors::TEXT_SECONDARY)
        .font_size(13)
        .w(width);
    draw.text(&face.offset)
        .xy(center + vec2(0.0, -32.0))
        .color(colors::TEXT_SECONDARY)
        .font_size(12)
        .w(width);
    draw.text(face.day_night)
        .xy(center + vec2(0.0, -60.0))
        .color(colors::TEXT_PRIMARY)
        .font_size(12)
        .w(width);
}

fn at(center: Point2, radius: f32, angle_deg: f64) -> Point2 {
    let (x, y) = polar_point((center.x, center.y), radius, angle_deg);
    pt2(x, y)
}

fn draw_dial(draw: &Draw, center: Point2, face: &AnalogFace, width: f32) {
    let radius = face.diameter / 2.0;

    draw.ellipse()
        .xy(center)
        .radius(radius)
        .no_fill()
        .stroke(colors::TICK)
        .stroke_weight(1.5);

    for tick in &face.ticks {
        let (inner, color, weight) = if tick.emphasized {
            (radius * 0.82, colors::TICK_EMPHASIZED, 2.5)
        } else {
            (radius * 0.9, colors::TICK, 1.0)
        };
        draw.line()
            .start(at(center, inner, tick.angle))
            .end(at(center, radius, tick.angle))
            .color(color)
            .weight(weight);
    }

    for numeral in &face.numerals {
        draw.text(&numeral.label)
            .xy(at(center, radius * 0.68, numeral.angle))
            .color(colors::TEXT_SECONDARY)
            .font_size(11)
            .w(24.0);
    }

    draw.line()
        .start(center)
        .end(at(center, radius * 0.5, face.hands.hour))
        .color(colors::HAND)
        .weight(4.0);
    draw.line()
        .start(center)
        .end(at(center, radius * 0.75, face.hands.minute))
        .color(colors::HAND)
        .weight(2.5);
    if let Some(second) = face.hands.second {
        draw.line()
            .start(center)
            .end(at(center, radius * 0.88, second))
            .color(colors::ACCENT)
            .weight(1.0);
    }

    draw.ellipse().xy(center).radius(3.0).color(colors::HAND);

    draw.text(face.day_night)
        .xy(center + vec2(0.0, -radius - 16.0))
        .color(colors::TEXT_PRIMARY)
        .font_size(12)
        .w(width);
}

fn draw_hybrid(draw: &Draw, center: Point2, face: &HybridFace, width: f32) {
    draw_dial(draw, center, &face.dial, width);

    let readout = center + vec2(0.0, -face.dial.diameter * 0.22);
    draw.rect()
        .xy(readout)
        .w_h(58.0, 20.0)
        .color(colors::CARD_BG);
    draw.text(&face.center_time)
        .xy(readout)
        .color(colors::TEXT_PRIMARY)
        .font_size(14)
        .w(58.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PinnedLayout {
        let window = Rect::from_w_h(1280.0, 820.0);
        PinnedLayout::calculate(window, 60.0, 360.0)
    }

    #[test]
    fn test_cards_centered_and_disjoint() {
        let layout = layout();
        let first = layout.card_rect(0, 3);
        let last = layout.card_rect(2, 3);
        assert!((first.x() + last.x()).abs() < 1e-3);
        assert!(first.right() < layout.card_rect(1, 3).left());
    }

    #[test]
    fn test_full_row_fits_narrow_window() {
        let window = Rect::from_w_h(1000.0, 700.0);
        let layout = PinnedLayout::calculate(window, 44.0, 340.0);
        let first = layout.card_rect(0, MAX_PINNED);
        let last = layout.card_rect(MAX_PINNED - 1, MAX_PINNED);
        assert!(first.left() >= window.left());
        assert!(last.right() <= window.right());
        assert!(layout.card_width(MAX_PINNED) < CARD_WIDTH);
        assert!(layout.card_width(MAX_PINNED) > SizeClass::Medium.diameter());

        // Wide windows keep the nominal width
        assert_eq!(layout.card_width(2), CARD_WIDTH);
    }

    #[test]
    fn test_pinned_face_sizes() {
        assert_eq!(pinned_face_size(ClockMode::Digital), SizeClass::Large);
        assert_eq!(pinned_face_size(ClockMode::Analog), SizeClass::Medium);
        assert_eq!(pinned_face_size(ClockMode::Hybrid), SizeClass::Medium);
    }

    #[test]
    fn test_hit_testing() {
        let layout = layout();
        let second = layout.card_rect(1, 2);
        assert_eq!(layout.card_at(second.xy(), 2), Some(1));
        assert_eq!(layout.card_at(pt2(0.0, layout.area.top() + 5.0), 2), None);

        let close = layout.close_box(0, 2);
        assert_eq!(layout.close_box_at(close.xy(), 2), Some(0));
        assert_eq!(layout.close_box_at(layout.card_rect(0, 2).xy(), 2), None);
    }
}
