//! Control Panel Widget
//! Left side panel with the global location filter.

use egui::{Color32, RichText};

/// Left side panel listing every location with a checkbox.
pub struct ControlPanel {
    /// Location name and whether it is selected, in table order.
    pub locations: Vec<(String, bool)>,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the location list, keeping the choice for locations seen before.
    ///
    /// New locations start selected. Returns `true` when the list changed.
    pub fn update_locations(&mut self, locations: &[String]) -> bool {
        let unchanged = locations.len() == self.locations.len()
            && locations
                .iter()
                .zip(&self.locations)
                .all(|(new, (old, _))| new == old);
        if unchanged {
            return false;
        }

        self.locations = locations
            .iter()
            .map(|name| {
                let selected = self
                    .locations
                    .iter()
                    .find(|(old, _)| old == name)
                    .map_or(true, |(_, selected)| *selected);
                (name.clone(), selected)
            })
            .collect();
        true
    }

    pub fn selected_locations(&self) -> Vec<String> {
        self.locations
            .iter()
            .filter(|(_, selected)| *selected)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.add_space(5.0);
        ui.label(RichText::new("Global Filters").size(20.0).strong());
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        ui.label(RichText::new("Select Locations").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if self.locations.is_empty() {
                    ui.label(RichText::new("No locations loaded").color(Color32::GRAY));
                }
                for (name, selected) in &mut self.locations {
                    if ui.checkbox(selected, name.as_str()).changed() {
                        action = ControlPanelAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.locations.iter_mut().for_each(|(_, v)| *v = true);
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("Clear All").clicked() {
                self.locations.iter_mut().for_each(|(_, v)| *v = false);
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🔄 Reload data").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    Reload,
}
