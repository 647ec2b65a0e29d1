//! Plain-text rendering of diagnostic trees for logs.

use crate::diagnostic::Diagnostic;

fn render_into(out: &mut String, diag: &Diagnostic, indent: usize) {
    out.push_str(&" ".repeat(indent));
    out.push_str(diag.severity.label());
    out.push_str(": ");
    if !diag.file.as_os_str().is_empty() && diag.line > 0 {
        out.push_str(&format!(
            "{}:{}:{}: ",
            diag.file.display(),
            diag.line,
            diag.column
        ));
    }
    out.push_str(&diag.message);
    for child in &diag.children {
        out.push('\n');
        render_into(out, child, indent + 2);
    }
}

/// Renders one diagnostic and its notes, children indented by two spaces.
///
/// ```text
/// Error: /s/Blink.ino:4:3: no matching function
///   Note: /s/led.h:2:6: candidate function
/// ```
pub fn render_tree(diag: &Diagnostic) -> String {
    let mut out = String::new();
    render_into(&mut out, diag, 0);
    out
}

/// Renders a list of diagnostics, one tree after another.
pub fn render_all(diags: &[Diagnostic]) -> String {
    diags.iter().map(render_tree).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use lens_source::Location;
    use std::path::Path;

    #[test]
    fn render_with_children() {
        let d = Diagnostic::new(
            Severity::Error,
            Location::new("/s/Blink.ino", 4, 3),
            "no matching function",
        )
        .with_child(Diagnostic::new(
            Severity::Note,
            Location::new("/s/led.h", 2, 6),
            "candidate function",
        ));
        assert_eq!(
            render_tree(&d),
            "Error: /s/Blink.ino:4:3: no matching function\n  Note: /s/led.h:2:6: candidate function"
        );
    }

    #[test]
    fn file_level_omits_position() {
        let d = Diagnostic::parse_failure(Path::new("/s/Blink.ino"));
        assert_eq!(render_tree(&d), "Error: Failed to parse translation unit");
    }

    #[test]
    fn render_list() {
        let a = Diagnostic::parse_failure(Path::new("/s/a.cpp"));
        let b = Diagnostic::parse_failure(Path::new("/s/b.cpp"));
        assert_eq!(render_all(&[a, b]).lines().count(), 2);
    }
}
