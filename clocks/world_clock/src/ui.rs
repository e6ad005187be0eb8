//! UI module - egui header and timezone grid
//!
//! Provides:
//! - Header (top panel): title, local time, mode toggle, fullscreen, pinned count
//! - Timezone grid (bottom panel): every reference zone in UTC-offset columns

use chrono::{DateTime, TimeZone};
use nannou_egui::egui;
use shared::{
    search_timezones, timezone_groups, ClockBoard, ClockKey, ClockMode, PinnedTimezoneList,
    Timezone, MAX_PINNED,
};

const TEXT_PRIMARY: egui::Color32 = egui::Color32::from_rgb(120, 255, 160);
const TEXT_SECONDARY: egui::Color32 = egui::Color32::from_rgb(60, 150, 90);
const COLUMN_WIDTH: f32 = 150.0;

/// Result of header interactions
#[derive(Default)]
pub struct HeaderResult {
    pub set_mode: Option<ClockMode>,
    pub toggle_fullscreen: bool,
}

/// Result of grid interactions
#[derive(Default)]
pub struct GridResult {
    /// Zone whose pinned membership should flip
    pub toggle: Option<&'static Timezone>,
    /// Filter field has keyboard focus
    pub filter_focused: bool,
    /// Zones drawn this frame
    pub visible: Vec<&'static str>,
}

/// Header readout of the machine's wall clock
pub fn format_local_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

fn fullscreen_label(fullscreen: bool) -> (&'static str, &'static str) {
    if fullscreen {
        ("[EXIT FS]", "Exit fullscreen")
    } else {
        ("[FULLSCREEN]", "Enter fullscreen")
    }
}

/// Draw the header bar
pub fn draw_header(
    ctx: &egui::Context,
    mode: ClockMode,
    pinned_count: usize,
    local_time: &str,
    fullscreen: bool,
) -> HeaderResult {
    let mut result = HeaderResult::default();

    egui::TopBottomPanel::top("header")
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("WORLD CLOCK")
                        .size(18.0)
                        .color(TEXT_PRIMARY),
                );
                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(format!("LOCAL {}", local_time))
                        .size(13.0)
                        .color(TEXT_SECONDARY),
                );
                ui.add_space(20.0);

                for &candidate in ClockMode::all() {
                    let label = format!("[{}]", candidate.label());
                    if ui
                        .selectable_label(candidate == mode, label)
                        .on_hover_text(format!("Show {} faces", candidate))
                        .clicked()
                    {
                        result.set_mode = Some(candidate);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (fs_label, fs_hover) = fullscreen_label(fullscreen);
                    if ui
                        .selectable_label(fullscreen, fs_label)
                        .on_hover_text(fs_hover)
                        .clicked()
                    {
                        result.toggle_fullscreen = true;
                    }
                    ui.add_space(12.0);
                    ui.label(
                        egui::RichText::new(format!("{}/{} PINNED", pinned_count, MAX_PINNED))
                            .size(12.0)
                            .color(TEXT_SECONDARY),
                    );
                });
            });
            ui.add_space(6.0);
        });

    result
}

fn grid_cell_text(board: &ClockBoard, tz: &Timezone) -> String {
    let time = board
        .latest(&ClockKey::grid(tz.id.as_str()))
        .map(|info| info.snapshot.formatted_time.clone())
        .unwrap_or_else(|| "--:--:--".to_string());
    format!("{}  {}", time, tz.city)
}

fn grid_cell(
    ui: &mut egui::Ui,
    board: &ClockBoard,
    pinned: &PinnedTimezoneList,
    tz: &'static Timezone,
    result: &mut GridResult,
) {
    result.visible.push(tz.id.as_str());
    let is_pinned = pinned.contains(&tz.id);
    let hover = board
        .latest(&ClockKey::grid(tz.id.as_str()))
        .map(|info| format!("{}\n{}", tz.subtitle(), info.snapshot.format_utc_offset()))
        .unwrap_or_else(|| tz.subtitle());

    if ui
        .selectable_label(is_pinned, grid_cell_text(board, tz))
        .on_hover_text(hover)
        .clicked()
    {
        result.toggle = Some(tz);
    }
}

/// Draw the timezone grid panel. An empty filter shows the offset columns;
/// otherwise matching zones are listed in one row.
pub fn draw_timezone_grid(
    ctx: &egui::Context,
    height: f32,
    filter: &mut String,
    board: &ClockBoard,
    pinned: &PinnedTimezoneList,
) -> GridResult {
    let mut result = GridResult::default();

    egui::TopBottomPanel::bottom("timezone_grid")
        .resizable(false)
        .exact_height(height)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("TIMEZONES").size(13.0).color(TEXT_PRIMARY));
                ui.add_space(12.0);
                ui.label("Filter:");
                result.filter_focused = ui.text_edit_singleline(filter).has_focus();
                if !filter.is_empty() && ui.small_button("×").clicked() {
                    filter.clear();
                }
            });
            ui.separator();

            egui::ScrollArea::horizontal().show(ui, |ui| {
                if filter.trim().is_empty() {
                    ui.horizontal_top(|ui| {
                        for group in timezone_groups() {
                            ui.vertical(|ui| {
                                ui.set_width(COLUMN_WIDTH);
                                ui.label(
                                    egui::RichText::new(format!("UTC{}", group.offset))
                                        .size(11.0)
                                        .color(TEXT_SECONDARY),
                                );
                                for tz in &group.timezones {
                                    grid_cell(ui, board, pinned, tz, &mut result);
                                }
                            });
                        }
                    });
                } else {
                    let matches = search_timezones(filter.trim());
                    if matches.is_empty() {
                        ui.label(egui::RichText::new("No matching timezones").color(TEXT_SECONDARY));
                    }
                    ui.horizontal_wrapped(|ui| {
                        for tz in matches {
                            grid_cell(ui, board, pinned, tz, &mut result);
                        }
                    });
                }
            });
        });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_fullscreen_label_flips() {
        assert_eq!(fullscreen_label(false).0, "[FULLSCREEN]");
        assert_eq!(fullscreen_label(true).0, "[EXIT FS]");
    }

    #[test]
    fn test_format_local_time() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 10, 7, 5, 9).unwrap();
        assert_eq!(format_local_time(&now), "07:05:09");
    }
}
