//! Rendering of collected diagnostics to stderr.

use cortex_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, TerminalRenderer,
};

use crate::{GlobalArgs, ReportFormat};

/// Drains `sink`, renders its diagnostics, and prints the error and warning
/// counts for text output.
pub fn render_and_report(sink: &DiagnosticSink, format: ReportFormat, global: &GlobalArgs) {
    render(&sink.take_all(), format, global);
    let counted = sink.error_count() + sink.warning_count();
    if !global.quiet && format == ReportFormat::Text && counted > 0 {
        eprintln!(
            "   Result: {} error(s), {} warning(s)",
            sink.error_count(),
            sink.warning_count()
        );
    }
}

/// Renders diagnostics to stderr. Quiet mode keeps only errors.
pub fn render(diagnostics: &[Diagnostic], format: ReportFormat, global: &GlobalArgs) {
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in diagnostics {
                if global.quiet && !diag.severity.is_error() {
                    continue;
                }
                eprint!("{}", renderer.render(diag));
            }
        }
        ReportFormat::Json => {
            for diag in diagnostics {
                eprintln!("{}", JsonRenderer.render(diag));
            }
        }
    }
}
