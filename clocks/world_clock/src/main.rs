//! World Clock
//!
//! A dashboard of every reference timezone in UTC-offset columns, with up to
//! five pinned zones shown as large digital, analog or hybrid faces. Pinned
//! cards can be removed, dragged into a new order, or nudged with the
//! bracket keys. The selection and face mode persist between runs.

mod drawing;
mod ui;

use std::time::Instant;

use chrono::Local;
use log::{error, info, warn};
use nannou::prelude::*;
use nannou_egui::{self, Egui};
use shared::{
    all_timezones, nudge, ClockBoard, ClockKey, ClockMode, DragOutcome, DragReorderController,
    FileStore, KeyValueStore, MemoryStore, MoveDirection, PreferenceStore, Surface,
    SurfaceSubscriptions, Timezone,
};

use crate::drawing::{colors, draw_pinned_row, PinnedCard, PinnedLayout};
use crate::ui::{draw_header, draw_timezone_grid, format_local_time, GridResult, HeaderResult};

const HEADER_HEIGHT: f32 = 44.0;
const GRID_HEIGHT: f32 = 340.0;

fn main() {
    env_logger::init();
    nannou::app(model).update(update).run();
}

/// Application state
pub struct Model {
    /// Pinned selection and face mode, persisted on every change
    prefs: PreferenceStore<Box<dyn KeyValueStore>>,
    /// Tick source for every visible clock
    board: ClockBoard,
    /// Board subscriptions of the pinned row
    pinned_subscriptions: SurfaceSubscriptions,
    /// Board subscriptions of the grid cells currently drawn
    grid_subscriptions: SurfaceSubscriptions,
    drag: DragReorderController,
    /// Card the bracket keys move
    focused_pinned: Option<String>,
    /// Grid filter text
    grid_filter: String,
    /// Keys go to the filter field instead of shortcuts
    typing: bool,
    fullscreen: bool,
    egui: Egui,
}

impl Model {
    fn pinned_zones(&self) -> &[Timezone] {
        self.prefs.pinned().as_slice()
    }

    /// Subscribe newly pinned zones and release unpinned ones
    fn sync_pinned_subscriptions(&mut self) {
        let pinned = self.prefs.pinned().iter().map(|tz| tz.id.as_str());
        self.pinned_subscriptions.sync(&mut self.board, pinned);

        if let Some(focused) = &self.focused_pinned {
            if !self.prefs.pinned().contains(focused) {
                self.focused_pinned = None;
            }
        }
    }

    fn toggle_pinned(&mut self, tz: &Timezone) {
        self.prefs.toggle_pinned(tz);
        self.sync_pinned_subscriptions();
    }

    fn remove_pinned(&mut self, id: &str) {
        if self.drag.active_id() == Some(id) {
            self.drag.cancel();
        }
        if self.prefs.remove_pinned(id) {
            self.sync_pinned_subscriptions();
        }
    }

    fn apply_order(&mut self, order: Vec<Timezone>) {
        if let Err(e) = self.prefs.reorder_pinned(order) {
            warn!("Discarding reorder: {}", e);
        }
    }

    fn nudge_focused(&mut self, direction: MoveDirection) {
        let Some(id) = self.focused_pinned.clone() else {
            return;
        };
        if let Some(order) = nudge(self.pinned_zones(), &id, direction) {
            self.apply_order(order);
        }
    }
}

fn open_storage() -> Box<dyn KeyValueStore> {
    match FileStore::open_default() {
        Ok(store) => {
            info!("Preferences stored in {}", store.dir().display());
            Box::new(store)
        }
        Err(e) => {
            error!("No config directory ({}); preferences will not persist", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn model(app: &App) -> Model {
    app.set_exit_on_escape(false);

    let window_id = app
        .new_window()
        .title("World Clock")
        .size(1280, 820)
        .min_size(1000, 700)
        .view(view)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_moved(mouse_moved)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let prefs = PreferenceStore::load(open_storage());

    // The unfiltered grid shows every zone; later frames sync to what was drawn
    let mut board = ClockBoard::system();
    let mut grid_subscriptions = SurfaceSubscriptions::new(Surface::Grid);
    grid_subscriptions.sync(&mut board, all_timezones().map(|tz| tz.id.as_str()));

    let mut model = Model {
        prefs,
        board,
        pinned_subscriptions: SurfaceSubscriptions::new(Surface::Pinned),
        grid_subscriptions,
        drag: DragReorderController::new(),
        focused_pinned: None,
        grid_filter: String::new(),
        typing: false,
        fullscreen: false,
        egui,
    };
    model.sync_pinned_subscriptions();
    model
}

fn update(app: &App, model: &mut Model, update: Update) {
    model.drag.refresh(Instant::now());
    model.board.poll();

    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    let local_time = format_local_time(&Local::now());
    let header_result: HeaderResult = draw_header(
        &ctx,
        model.prefs.clock_mode(),
        model.prefs.pinned().len(),
        &local_time,
        model.fullscreen,
    );

    let grid_result: GridResult = draw_timezone_grid(
        &ctx,
        GRID_HEIGHT,
        &mut model.grid_filter,
        &model.board,
        model.prefs.pinned(),
    );

    drop(ctx);

    model.typing = grid_result.filter_focused;
    model
        .grid_subscriptions
        .sync(&mut model.board, grid_result.visible.iter().copied());

    if header_result.toggle_fullscreen {
        model.fullscreen = !model.fullscreen;
        app.main_window().set_fullscreen(model.fullscreen);
    }
    if let Some(mode) = header_result.set_mode {
        model.prefs.set_clock_mode(mode);
    }
    if let Some(tz) = grid_result.toggle {
        model.toggle_pinned(tz);
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    draw.background().color(colors::BACKGROUND);

    let layout = PinnedLayout::calculate(window_rect, HEADER_HEIGHT, GRID_HEIGHT);
    let active_id = model.drag.active_id();
    let cards: Vec<PinnedCard> = model
        .pinned_zones()
        .iter()
        .map(|tz| PinnedCard {
            timezone: tz,
            info: model.board.latest(&ClockKey::pinned(tz.id.as_str())),
            focused: model.focused_pinned.as_deref() == Some(tz.id.as_str()),
            dragging: active_id == Some(tz.id.as_str()),
        })
        .collect();

    draw_pinned_row(
        &draw,
        &layout,
        &cards,
        model.prefs.clock_mode(),
        model.drag.drop_indicator(),
    );

    if let Err(e) = draw.to_frame(app, &frame) {
        error!("Failed to draw frame: {:?}", e);
    }
    if let Err(e) = model.egui.draw_to_frame(&frame) {
        error!("Failed to draw ui: {:?}", e);
    }
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.typing {
        return;
    }

    match key {
        Key::Key1 => model.prefs.set_clock_mode(ClockMode::Digital),
        Key::Key2 => model.prefs.set_clock_mode(ClockMode::Analog),
        Key::Key3 => model.prefs.set_clock_mode(ClockMode::Hybrid),

        // [ and ] - move the focused card
        Key::LBracket => model.nudge_focused(MoveDirection::Earlier),
        Key::RBracket => model.nudge_focused(MoveDirection::Later),

        Key::Escape => {
            if model.drag.is_dragging() {
                model.drag.cancel();
            } else {
                model.focused_pinned = None;
            }
        }

        _ => {}
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left {
        return;
    }
    let pos = app.mouse.position();
    let layout = PinnedLayout::calculate(app.window_rect(), HEADER_HEIGHT, GRID_HEIGHT);
    if !layout.area.contains(pos) {
        return;
    }

    let count = model.pinned_zones().len();
    if let Some(index) = layout.close_box_at(pos, count) {
        let id = model.pinned_zones()[index].id.clone();
        model.remove_pinned(&id);
        return;
    }

    match layout.card_at(pos, count) {
        Some(index) => {
            let id = model.pinned_zones()[index].id.clone();
            let zones = model.prefs.pinned().as_slice();
            model.drag.begin(&id, zones);
            model.focused_pinned = Some(id);
        }
        None => model.focused_pinned = None,
    }
}

fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    if !model.drag.is_dragging() {
        return;
    }
    let layout = PinnedLayout::calculate(app.window_rect(), HEADER_HEIGHT, GRID_HEIGHT);
    let zones = model.prefs.pinned().as_slice();
    let over = layout
        .card_at(pos, zones.len())
        .map(|index| zones[index].id.as_str());
    model.drag.hover(over, zones, Instant::now());
}

fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || !model.drag.is_dragging() {
        return;
    }
    match model.drag.release(model.prefs.pinned().as_slice()) {
        DragOutcome::Reordered(order) => model.apply_order(order),
        DragOutcome::Abandoned => {}
    }
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);

    // A drag can't survive losing the pointer
    if let nannou::winit::event::WindowEvent::Focused(false) = event {
        model.drag.cancel();
    }
}
