//! HTML output for a rendered preview [`View`].
//!
//! In edit mode every field becomes an activation target carrying its
//! address and control key as `data-` attributes.

use crate::{RenderMode, View};
use folio_model::FieldKind;

#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Document title
    pub title: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            title: "Invitation Preview".to_string(),
        }
    }
}

struct Context {
    options: HtmlOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render a full HTML document for `view`.
pub fn to_html(view: &View, options: HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    let mode = match view.mode {
        RenderMode::ReadOnly => "read-only",
        RenderMode::Edit => "edit",
    };

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    let title = escape_html(&ctx.options.title);
    ctx.add_line(&format!("<title>{}</title>", title));
    ctx.dedent();
    ctx.add_line("</head>");

    ctx.add_line("<body>");
    ctx.indent();
    ctx.add_line(&format!("<main class=\"folio-preview\" data-mode=\"{}\">", mode));
    ctx.indent();

    for section in &view.sections {
        ctx.add_line(&format!(
            "<section id=\"{}\" class=\"folio-section\">",
            escape_html(&section.id)
        ));
        ctx.indent();
        ctx.add_line(&format!("<h2>{}</h2>", escape_html(&section.title)));

        for item in &section.items {
            ctx.add_line("<div class=\"folio-item\">");
            ctx.indent();
            if let Some(label) = &item.label {
                ctx.add_line(&format!("<h3>{}</h3>", escape_html(label)));
            }
            for leaf in &item.fields {
                let attrs = match &leaf.target {
                    Some(address) => format!(
                        " data-address=\"{}\" data-target=\"{}\" tabindex=\"0\"",
                        escape_html(&address.to_string()),
                        escape_html(&address.control_key().to_string())
                    ),
                    None => String::new(),
                };
                ctx.add_line(&format!(
                    "<p class=\"folio-field folio-{}\" title=\"{}\"{}>{}</p>",
                    leaf.kind.tag(),
                    escape_html(&leaf.label),
                    attrs,
                    leaf_body(leaf.kind, &leaf.text)
                ));
            }
            ctx.dedent();
            ctx.add_line("</div>");
        }

        ctx.dedent();
        ctx.add_line("</section>");
    }

    ctx.dedent();
    ctx.add_line("</main>");
    ctx.dedent();
    ctx.add_line("</body>");
    ctx.dedent();
    ctx.add_line("</html>");

    ctx.get_output()
}

fn leaf_body(kind: FieldKind, text: &str) -> String {
    match kind {
        FieldKind::Multiline => text
            .lines()
            .map(escape_html)
            .collect::<Vec<_>>()
            .join("<br>"),
        FieldKind::Url if !text.is_empty() => {
            let url = escape_html(text);
            format!("<a href=\"{}\">{}</a>", url, url)
        }
        _ => escape_html(text),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
