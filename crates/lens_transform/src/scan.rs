//! Discovery of top-level function definitions in a sketch entry.

use lens_engine::{AnalysisEngine, Cursor, CursorKind, ParseOptions, ParseRequest, UnsavedFile};
use std::path::Path;

/// A top-level function definition found in a sketch entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDefinition {
    /// Function name.
    pub name: String,
    /// Line of the function name in the original file.
    pub line: u32,
    /// Forward declaration without the trailing `;`, e.g.
    /// `int add(int a, int b)`. Empty when the definition has no usable name
    /// or return type.
    pub prototype: String,
}

impl FunctionDefinition {
    fn from_cursor(cursor: Cursor) -> Self {
        Self {
            prototype: prototype_of(&cursor),
            line: cursor.location.line,
            name: cursor.spelling,
        }
    }
}

fn prototype_of(cursor: &Cursor) -> String {
    if cursor.spelling.is_empty() || cursor.result_type.is_empty() {
        return String::new();
    }
    let mut params: Vec<String> = cursor
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name).trim().to_string())
        .collect();
    if cursor.is_variadic {
        params.push("...".to_string());
    }
    let storage = if cursor.is_static { "static " } else { "" };
    format!(
        "{storage}{} {}({})",
        cursor.result_type,
        cursor.spelling,
        params.join(", ")
    )
}

/// Parses `code` on its own and returns its function definitions sorted by line.
///
/// Declarations are ignored, as are definitions pulled in from other files.
/// Returns `None` when the engine could not parse the file at all.
pub fn function_definitions(
    engine: &dyn AnalysisEngine,
    path: &Path,
    code: &str,
    args: &[String],
) -> Option<Vec<FunctionDefinition>> {
    let mut scan_args = vec!["-x".to_string(), "c++".to_string()];
    scan_args.extend_from_slice(args);
    let unsaved = [UnsavedFile::new(path, code)];
    let request = ParseRequest {
        main_file: path,
        args: &scan_args,
        unsaved: &unsaved,
        options: ParseOptions::scan(),
    };

    let unit = match engine.parse(&request) {
        Ok(unit) => unit,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "definition scan failed");
            return None;
        }
    };

    let mut defs: Vec<FunctionDefinition> = unit
        .top_level()
        .into_iter()
        .filter(|c| c.kind == CursorKind::FunctionDecl && c.is_definition && c.location.is_in(path))
        .map(FunctionDefinition::from_cursor)
        .collect();
    defs.sort_by_key(|d| d.line);
    Some(defs)
}
