#![forbid(unsafe_code)]

use eframe::egui;
use shelf_query::Sort;

use crate::ShelfGuiApp;

pub(crate) fn ui_topbar(app: &mut ShelfGuiApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Shelf");
            ui.separator();
            let te = egui::TextEdit::singleline(&mut app.state.query)
                .hint_text("Search by product name")
                .desired_width(280.0);
            let re = ui.add(te);
            if !app.state.query.is_empty()
                && ui.button("×").on_hover_text("Clear search").clicked()
            {
                app.state.clear_query();
            }
            if re.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                app.state.clear_query();
            }
            ui.separator();
            ui.label(format!(
                "Showing {} of {}",
                app.filtered_ix.len(),
                app.products.len()
            ));
        });
    });
}

impl ShelfGuiApp {
    pub(crate) fn ui_filters(&mut self, ui: &mut egui::Ui) {
        ui.heading("Filters");
        ui.separator();

        ui.label(egui::RichText::new("Users").strong());
        if ui
            .selectable_label(self.state.selected_user.is_none(), "All")
            .clicked()
        {
            self.state.select_user(None);
        }
        for user in self.users.clone() {
            let selected = self.state.selected_user == Some(user.id);
            if ui.selectable_label(selected, &user.name).clicked() {
                self.state.select_user(Some(user.id));
            }
        }

        ui.separator();
        ui.label(egui::RichText::new("Categories").strong());
        if ui
            .selectable_label(
                self.state.selected_categories.is_empty(),
                "All Categories",
            )
            .clicked()
        {
            self.state.clear_categories();
        }
        for category in self.categories.clone() {
            let selected = self.state.selected_categories.contains(&category.id);
            let label = format!("{} {}", category.icon, category.title);
            if ui.selectable_label(selected, label).clicked() {
                self.state.toggle_category(category.id);
            }
        }

        ui.separator();
        let active = self.state.has_active_filters() || self.state.sort != Sort::Unsorted;
        let text = if active {
            egui::RichText::new("Reset all filters").strong()
        } else {
            egui::RichText::new("Reset all filters").weak()
        };
        if ui.button(text).clicked() {
            self.state.reset();
        }
    }
}
