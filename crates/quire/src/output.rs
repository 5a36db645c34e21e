//! Terminal output for the CLI.
//!
//! Status lines go to stderr and rendered documents to stdout, so
//! `quire preview ... > page.html` captures only the document.

use std::io::Write;
use std::path::Path;

use console::{Style, Term};
use quire_template::TemplateDefinition;

/// How a status line is coloured.
#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Done,
    Caution,
    Failure,
    Heading,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Heading => Style::new().cyan().bold(),
        }
    }
}

/// Status reporter bound to stderr.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, tone: Tone, msg: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Tone::Done, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(Tone::Caution, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Failure, msg);
    }

    /// Header line above a template listing.
    pub(crate) fn listing_header(&self, store: &Path, page: usize, total: usize) {
        self.line(
            Tone::Heading,
            &format!("Templates {} (page {page}, {total} total)", store.display()),
        );
    }

    /// One row of a template listing.
    pub(crate) fn template_row(&self, template: &TemplateDefinition) {
        self.line(Tone::Plain, &template_row(template));
    }

    /// Report a PDF written to disk.
    pub(crate) fn pdf_written(&self, path: &Path, bytes: usize) {
        self.line(
            Tone::Done,
            &format!("Generated {} ({bytes} bytes)", path.display()),
        );
    }

    /// Write a rendered document to stdout.
    pub(crate) fn document(content: &str) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()
    }
}

/// `<id>  <type> <name> <company> [flags]`, with `-` for shared templates.
fn template_row(template: &TemplateDefinition) -> String {
    let flags: Vec<&str> = [
        template.is_default.then_some("default"),
        (!template.is_enabled).then_some("disabled"),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut row = format!(
        "  {}  {:<16} {:<24} {}",
        template.id,
        template.template_type,
        template.name,
        template.company.as_deref().unwrap_or("-"),
    );
    if !flags.is_empty() {
        row.push_str(&format!(" [{}]", flags.join(", ")));
    }
    row
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_template_row_shared_default() {
        let template = TemplateDefinition::new("Invoice", "invoice", "<p></p>", "inv").as_default();

        let row = template_row(&template);

        assert!(row.starts_with(&format!("  {}  invoice ", template.id)));
        assert!(row.ends_with(" - [default]"));
    }

    #[test]
    fn test_template_row_company_disabled() {
        let mut template =
            TemplateDefinition::new("Invoice", "invoice", "<p></p>", "inv").with_company("acme");
        template.is_enabled = false;

        let row = template_row(&template);

        assert_eq!(
            row.split_whitespace().skip(1).collect::<Vec<_>>(),
            vec!["invoice", "Invoice", "acme", "[disabled]"]
        );
    }
}
