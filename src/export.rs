//! Transfer planning: export vs. native download, and local file naming.

use std::fmt;

use clap::ValueEnum;

pub const GOOGLE_DOCUMENT: &str = "application/vnd.google-apps.document";
pub const GOOGLE_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";
pub const GOOGLE_PRESENTATION: &str = "application/vnd.google-apps.presentation";
pub const GOOGLE_FOLDER: &str = "application/vnd.google-apps.folder";

/// Target format for a Workspace export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

const fn format(mime_type: &'static str, extension: &'static str) -> ExportFormat {
    ExportFormat {
        mime_type,
        extension,
    }
}

const TEXT_ONLY: [(&str, ExportFormat); 3] = [
    (GOOGLE_DOCUMENT, format("text/markdown", ".md")),
    (GOOGLE_SPREADSHEET, format("text/csv", ".csv")),
    (GOOGLE_PRESENTATION, format("text/plain", ".txt")),
];

const FULL_FIDELITY: [(&str, ExportFormat); 3] = [
    (
        GOOGLE_DOCUMENT,
        format(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ".docx",
        ),
    ),
    (
        GOOGLE_SPREADSHEET,
        format(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ".xlsx",
        ),
    ),
    (
        GOOGLE_PRESENTATION,
        format(
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            ".pptx",
        ),
    ),
];

const PDF: [(&str, ExportFormat); 3] = [
    (GOOGLE_DOCUMENT, format("application/pdf", ".pdf")),
    (GOOGLE_SPREADSHEET, format("application/pdf", ".pdf")),
    (GOOGLE_PRESENTATION, format("application/pdf", ".pdf")),
];

/// Export format preset, chosen once per invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportPreset {
    /// Docs to Markdown, Sheets to CSV, Slides to plain text.
    #[default]
    TextOnly,
    /// Docs to DOCX, Sheets to XLSX, Slides to PPTX.
    FullFidelity,
    /// Everything to PDF.
    Pdf,
}

impl ExportPreset {
    fn table(self) -> &'static [(&'static str, ExportFormat); 3] {
        match self {
            ExportPreset::TextOnly => &TEXT_ONLY,
            ExportPreset::FullFidelity => &FULL_FIDELITY,
            ExportPreset::Pdf => &PDF,
        }
    }

    /// Export format for a Workspace MIME type, if this preset has one.
    pub fn format_for(self, mime_type: &str) -> Option<ExportFormat> {
        self.table()
            .iter()
            .find(|(source, _)| *source == mime_type)
            .map(|(_, format)| *format)
    }

    pub fn description(self) -> &'static str {
        match self {
            ExportPreset::TextOnly => "Text Only (optimized for AI/text processing)",
            ExportPreset::FullFidelity => "Full Fidelity (preserves images, formatting, multimedia)",
            ExportPreset::Pdf => "PDF (universal format, preserves layout)",
        }
    }
}

/// How a single file is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPlan {
    /// Server-side conversion via `files.export`.
    Export(ExportFormat),
    /// Stored bytes via `files.get?alt=media`.
    Download,
}

impl TransferPlan {
    pub fn mode(&self) -> &'static str {
        match self {
            TransferPlan::Export(_) => "export",
            TransferPlan::Download => "download",
        }
    }

    pub fn export_mime_type(&self) -> Option<&'static str> {
        match self {
            TransferPlan::Export(format) => Some(format.mime_type),
            TransferPlan::Download => None,
        }
    }

    /// Local file name for a Drive file named `name`.
    ///
    /// Downloads keep their Drive name, extension or not. `fallback` replaces
    /// names that sanitize to nothing usable.
    pub fn file_name(&self, name: &str, fallback: &str) -> String {
        let base = sanitize_file_name(name, fallback);

        match self {
            TransferPlan::Export(format) => {
                if base.to_lowercase().ends_with(format.extension) {
                    base
                } else {
                    format!("{}{}", base, format.extension)
                }
            }
            TransferPlan::Download => base,
        }
    }
}

impl fmt::Display for TransferPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferPlan::Export(format) => {
                write!(f, "export as {} ({})", format.mime_type, format.extension)
            }
            TransferPlan::Download => write!(f, "download"),
        }
    }
}

/// Plan a transfer using the default text-only table.
pub fn plan_transfer(mime_type: &str) -> TransferPlan {
    plan_transfer_with(ExportPreset::TextOnly, mime_type)
}

/// Plan a transfer: exact MIME match against the preset table, otherwise download.
pub fn plan_transfer_with(preset: ExportPreset, mime_type: &str) -> TransferPlan {
    match preset.format_for(mime_type) {
        Some(format) => TransferPlan::Export(format),
        None => TransferPlan::Download,
    }
}

/// Replace path separators so a Drive name can't escape the output directory.
pub fn sanitize_file_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => sanitize_fallback(fallback),
        _ => cleaned,
    }
}

fn sanitize_fallback(fallback: &str) -> String {
    fallback.replace(['/', '\\'], "_")
}
