#![forbid(unsafe_code)]

use eframe::egui;
use egui_table::{CellInfo, Column, HeaderCellInfo, HeaderRow, Table, TableDelegate};
use shelf_core::{EnrichedProduct, Sex};
use shelf_query::SortColumn;

use crate::ShelfGuiApp;

pub(crate) struct ColumnSpec {
    pub column: SortColumn,
    pub label: &'static str,
    pub width: f32,
}

pub(crate) const COLUMNS: [ColumnSpec; 4] = [
    ColumnSpec { column: SortColumn::Id, label: "ID", width: 60.0 },
    ColumnSpec { column: SortColumn::Product, label: "Product", width: 220.0 },
    ColumnSpec { column: SortColumn::Category, label: "Category", width: 200.0 },
    ColumnSpec { column: SortColumn::User, label: "User", width: 160.0 },
];

impl ShelfGuiApp {
    pub(crate) fn ui_results(&mut self, ui: &mut egui::Ui) {
        if self.filtered_ix.is_empty() {
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new("No products matching selected criteria")
                    .italics()
                    .weak(),
            );
            return;
        }
        let rows_len = self.filtered_ix.len() as u64;
        let cols: Vec<Column> = COLUMNS
            .iter()
            .map(|c| Column::new(c.width).resizable(true))
            .collect();
        let mut delegate = ProductTableDelegate { app: self };
        Table::new()
            .id_salt("product_table")
            .headers(vec![HeaderRow::new(20.0)])
            .num_rows(rows_len)
            .columns(cols)
            .show(ui, &mut delegate);
    }
}

struct ProductTableDelegate<'a> {
    app: &'a mut ShelfGuiApp,
}

impl<'a> TableDelegate for ProductTableDelegate<'a> {
    fn prepare(&mut self, _info: &egui_table::PrefetchInfo) {}

    fn header_cell_ui(&mut self, ui: &mut egui::Ui, cell: &HeaderCellInfo) {
        if cell.row_nr != 0 {
            return;
        }
        let rect = ui.max_rect();
        let bg = ui.visuals().widgets.inactive.bg_fill;
        ui.painter().rect_filled(rect, 0.0, bg);
        let col_idx = cell.col_range.start as usize;
        let Some(spec) = COLUMNS.get(col_idx) else {
            return;
        };
        let is_sorted = self.app.state.sort.column() == Some(spec.column);
        let mut text = spec.label.to_string();
        if is_sorted {
            text.push_str(if self.app.state.sort.is_descending() {
                " ↓"
            } else {
                " ↑"
            });
        }
        ui.add_space(2.0);
        let resp = ui.selectable_label(is_sorted, egui::RichText::new(text).strong());
        if resp.clicked() {
            // Same column walks unsorted -> asc -> desc -> unsorted; a new
            // column starts ascending. Rows are rebuilt next frame.
            self.app.state.cycle_sort(spec.column);
        }
    }

    fn cell_ui(&mut self, ui: &mut egui::Ui, cell: &CellInfo) {
        let row_idx = cell.row_nr as usize;
        let Some(&idx) = self.app.filtered_ix.get(row_idx) else {
            return;
        };
        let Some(product) = self.app.products.get(idx).cloned() else {
            return;
        };
        if row_idx % 2 == 0 {
            let rect = ui.max_rect();
            ui.painter().rect_filled(rect, 0.0, ui.visuals().faint_bg_color);
        }
        match COLUMNS.get(cell.col_nr as usize).map(|c| c.column) {
            Some(SortColumn::Id) => {
                ui.label(egui::RichText::new(product.id.to_string()).strong().monospace());
            }
            Some(SortColumn::Product) => {
                ui.label(egui::RichText::new(&product.name).monospace());
            }
            Some(SortColumn::Category) => {
                ui.label(egui::RichText::new(category_cell(&product)).monospace());
            }
            Some(SortColumn::User) => {
                let (text, color) = user_cell(ui, &product);
                ui.label(egui::RichText::new(text).monospace().color(color));
            }
            None => {}
        }
    }

    fn default_row_height(&self) -> f32 {
        18.0
    }
}

fn category_cell(product: &EnrichedProduct) -> String {
    match &product.category {
        Some(c) => format!("{} - {}", c.icon, c.title),
        None => "-".to_string(),
    }
}

fn user_cell(ui: &egui::Ui, product: &EnrichedProduct) -> (String, egui::Color32) {
    match &product.user {
        Some(u) => {
            let color = match u.sex {
                Sex::Male => ui.visuals().hyperlink_color,
                Sex::Female => ui.visuals().error_fg_color,
            };
            (u.name.clone(), color)
        }
        None => ("Unknown".to_string(), ui.visuals().weak_text_color()),
    }
}
