#![forbid(unsafe_code)]

use eframe::egui;
use shelf_core::{Catalog, Category, EnrichedProduct, User};
use shelf_query::FilterState;
use tracing::info;

mod filters;
mod results;

/// Entry point used by the desktop binary to launch the GUI.
pub fn run_native(catalog: Catalog) -> eframe::Result<()> {
    let options = eframe::NativeOptions::default();
    let app = ShelfGuiApp::new(catalog);
    eframe::run_native("Shelf", options, Box::new(|_cc| Ok(Box::new(app))))
}

pub struct ShelfGuiApp {
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<EnrichedProduct>,
    state: FilterState,
    // Row indices for the frame being drawn; rebuilt at the top of update().
    filtered_ix: Vec<usize>,
}

impl ShelfGuiApp {
    pub fn new(catalog: Catalog) -> Self {
        let products = catalog.enrich();
        info!(
            users = catalog.users.len(),
            categories = catalog.categories.len(),
            products = products.len(),
            "shelf gui starting"
        );
        Self {
            users: catalog.users,
            categories: catalog.categories,
            products,
            state: FilterState::default(),
            filtered_ix: Vec::new(),
        }
    }
}

impl eframe::App for ShelfGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Every state mutation reaches this point on the next frame; the
        // whole pipeline is recomputed synchronously over all products.
        self.filtered_ix = shelf_query::apply(&self.products, &self.state);

        filters::ui_topbar(self, ctx);

        egui::SidePanel::left("filters_panel")
            .resizable(true)
            .show(ctx, |ui| {
                self.ui_filters(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui_results(ui);
        });
    }
}
