//! Text-only PDF output.
//!
//! Writes PDF 1.4 with the two standard Helvetica faces, so no fonts are
//! embedded and any viewer can open the result.  Lines flow top to bottom and
//! spill onto new A4 pages as needed.

use crate::format::{fmt_percent, fmt_uptime};
use pulse_core::HealthReport;
use std::fmt::Write as _;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: f32 = 50.0;
const LINE_SPACING: f32 = 1.4;

/// History rows included in the exported report.
const PDF_HISTORY_ROWS: usize = 15;

/// One line of text on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
}

impl TextLine {
    pub fn body(text: impl Into<String>) -> Self {
        Self { text: text.into(), size: 11.0, bold: false }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self { text: text.into(), size: 14.0, bold: true }
    }

    pub fn title(text: impl Into<String>) -> Self {
        Self { text: text.into(), size: 20.0, bold: true }
    }

    pub fn blank() -> Self {
        Self::body("")
    }

    fn advance(&self) -> f32 {
        self.size * LINE_SPACING
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    lines: Vec<TextLine>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: TextLine) -> &mut Self {
        self.lines.push(line);
        self
    }

    /// Split lines into pages by vertical space.
    fn pages(&self) -> Vec<&[TextLine]> {
        let usable = PAGE_HEIGHT as f32 - 2.0 * MARGIN;
        let mut pages = Vec::new();
        let mut start = 0;
        let mut used = 0.0;

        for (i, line) in self.lines.iter().enumerate() {
            if used + line.advance() > usable && i > start {
                pages.push(&self.lines[start..i]);
                start = i;
                used = 0.0;
            }
            used += line.advance();
        }
        pages.push(&self.lines[start..]);
        pages
    }

    /// Serialize to PDF bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let pages = self.pages();

        // Object numbering: 1 catalog, 2 page tree, 3 regular font,
        // 4 bold font, then a (page, contents) pair per page.
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_string(),
        ];

        for (page, lines) in page_ids.iter().zip(&pages) {
            let content = content_stream(lines);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", i + 1);
        }

        let xref = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        );

        out.into_bytes()
    }
}

fn content_stream(lines: &[TextLine]) -> String {
    let mut stream = String::new();
    let mut y = PAGE_HEIGHT as f32 - MARGIN;

    for line in lines {
        y -= line.advance();
        if line.text.is_empty() {
            continue;
        }
        let font = if line.bold { "F2" } else { "F1" };
        let _ = writeln!(
            stream,
            "BT /{font} {:.1} Tf {MARGIN:.1} {y:.1} Td ({}) Tj ET",
            line.size,
            escape(&line.text)
        );
    }
    stream
}

/// Escape a PDF literal string; anything outside printable ASCII becomes `?`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Lay out a [`HealthReport`] as a document.
pub fn report_document(report: &HealthReport) -> PdfDocument {
    let mut doc = PdfDocument::new();
    let r = &report.resources;

    doc.push(TextLine::title("System Health Report"))
        .push(TextLine::body(format!("Report ID: {}", report.report_id)))
        .push(TextLine::body(format!("Generated: {}", report.timestamp)))
        .push(TextLine::body(format!("Local time: {}", report.timestamp_local)))
        .push(TextLine::body(format!("Uptime: {}", fmt_uptime(report.uptime_seconds))))
        .push(TextLine::blank())
        .push(TextLine::heading(format!(
            "Health score: {:.2} ({})",
            report.health_score, report.status
        )))
        .push(TextLine::body(&report.status_message))
        .push(TextLine::blank())
        .push(TextLine::heading("Resources"))
        .push(TextLine::body(format!("CPU: {}", fmt_percent(r.cpu))))
        .push(TextLine::body(format!("RAM: {}", fmt_percent(r.ram))))
        .push(TextLine::body(format!("Disk: {}", fmt_percent(r.disk))))
        .push(TextLine::body(format!("Error rate: {}", fmt_percent(r.error_rate))))
        .push(TextLine::body(format!("API requests (last min): {}", r.api_requests)))
        .push(TextLine::body(format!("CPU cores: {}", r.cpu_cores)))
        .push(TextLine::blank())
        .push(TextLine::heading("Deployment"))
        .push(TextLine::body(format!("Project: {}", report.deployment.project)))
        .push(TextLine::body(format!("Service: {}", report.deployment.service)))
        .push(TextLine::body(format!("Revision: {}", report.deployment.revision)))
        .push(TextLine::body(format!(
            "Host: {} ({}), pid {}",
            report.container.hostname, report.container.local_ip, report.container.process_id
        )))
        .push(TextLine::body(format!(
            "Runtime: pulse {} on {}",
            report.runtime_info.version, report.runtime_info.platform
        )))
        .push(TextLine::blank())
        .push(TextLine::heading(format!(
            "Recent history ({} of {} samples)",
            report.history_snapshot.len().min(PDF_HISTORY_ROWS),
            report.history_snapshot.len()
        )))
        .push(TextLine::body("Time (UTC)            CPU %    RAM %   Disk %   Err %   Requests"));

    let skip = report.history_snapshot.len().saturating_sub(PDF_HISTORY_ROWS);
    for s in report.history_snapshot.iter().skip(skip) {
        doc.push(TextLine::body(format!(
            "{}   {:>6.2}   {:>6.2}   {:>6.2}   {:>5.2}   {:>8}",
            s.timestamp().format("%Y-%m-%d %H:%M:%S"),
            s.cpu_percent(),
            s.ram_percent(),
            s.disk_percent(),
            s.error_rate_percent(),
            s.api_requests()
        )));
    }

    doc
}

/// Render a [`HealthReport`] straight to PDF bytes.
pub fn render_report_pdf(report: &HealthReport) -> Vec<u8> {
    report_document(report).to_bytes()
}
