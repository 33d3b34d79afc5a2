// src/ui/widgets/mod.rs

pub mod detail_view;    // Findings of one completed scan.
pub mod export_popup;   // Report format chooser.
pub mod footer;         // Key hints and the last status message.
pub mod header;         // Dashboard counters.
pub mod log_view;
pub mod submit_form;    // New scan form.
pub mod summary;        // Risk score, distribution and recommendations.
pub mod task_list;
