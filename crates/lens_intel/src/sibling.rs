//! Header to implementation-file lookups.

use lens_cache::UnitBuilder;
use lens_engine::{Cursor, TranslationUnit, Walk};
use lens_source::{FileKind, Location};
use std::path::{Path, PathBuf};

use crate::texts::SourceTexts;

const SOURCE_EXTENSIONS: [&str; 3] = ["cpp", "cc", "cxx"];

/// Identifies a function across translation units by name and shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionKey {
    /// Bare name.
    pub name: String,
    /// Number of declared parameters.
    pub arity: usize,
    /// Whether the parameter list ends in `...`.
    pub variadic: bool,
}

impl FunctionKey {
    /// Key of a function-like cursor; `None` for anything else.
    pub fn of(cursor: &Cursor) -> Option<Self> {
        if !cursor.kind.is_function_like() || cursor.spelling.is_empty() {
            return None;
        }
        Some(Self {
            name: cursor.spelling.clone(),
            arity: cursor.parameters.len(),
            variadic: cursor.is_variadic,
        })
    }

    fn matches(&self, cursor: &Cursor) -> bool {
        cursor.kind.is_function_like()
            && cursor.spelling == self.name
            && cursor.parameters.len() == self.arity
            && cursor.is_variadic == self.variadic
    }
}

/// Implementation files that may define what `header` declares: same
/// directory and stem, extension `.cpp`, `.cc` or `.cxx`.
///
/// Empty for anything that is not a header.
pub fn sibling_sources(header: &Path) -> Vec<PathBuf> {
    if !FileKind::of(header).is_header() {
        return Vec::new();
    }
    let Some(stem) = header.file_stem().filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    let dir = header.parent().unwrap_or_else(|| Path::new(""));
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(ext);
            dir.join(name)
        })
        .collect()
}

/// Finds the first function in `file` matching `key`.
pub fn find_function(
    unit: &dyn TranslationUnit,
    file: &Path,
    key: &FunctionKey,
    require_definition: bool,
) -> Option<Location> {
    let mut found = None;
    unit.walk(&mut |node, _| {
        if key.matches(node) && node.location.file == file && (!require_definition || node.is_definition) {
            found = Some(node.location.clone());
            return Walk::Break;
        }
        Walk::Recurse
    });
    found
}

/// Locates the implementation of a header-declared function in the
/// header's sibling source file.
///
/// Sibling files are parsed one-off, outside the caches; their text comes
/// from the open-file snapshot or from disk.
pub struct SiblingFinder<'a> {
    builder: &'a UnitBuilder,
    texts: SourceTexts<'a>,
}

impl<'a> SiblingFinder<'a> {
    /// Creates a finder parsing through `builder`.
    pub fn new(builder: &'a UnitBuilder, texts: SourceTexts<'a>) -> Self {
        Self { builder, texts }
    }

    /// The definition of `decl` in a sibling of the header declaring it.
    pub fn definition_of(&self, decl: &Cursor) -> Option<Location> {
        let key = FunctionKey::of(decl)?;
        for candidate in sibling_sources(&decl.location.file) {
            let Some(text) = self.texts.text(&candidate) else {
                continue;
            };
            let unit = match self.builder.parse_detached(&candidate, &text) {
                Ok(unit) => unit,
                Err(err) => {
                    tracing::debug!(path = %candidate.display(), error = %err, "sibling parse failed");
                    continue;
                }
            };
            if let Some(loc) = find_function(unit.as_ref(), &candidate, &key, true) {
                tracing::debug!(name = %key.name, at = %loc, "sibling definition found");
                return Some(loc);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_cache::{ArgumentProfile, StaticArguments};
    use lens_engine::testing::FakeEngine;
    use lens_engine::{CursorKind, ParameterInfo};
    use lens_source::FileBuffer;
    use std::sync::Arc;

    fn builder(engine: &FakeEngine) -> UnitBuilder {
        UnitBuilder::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::default()),
            ArgumentProfile::default(),
            "/s",
        )
    }

    fn decl(name: &str, params: usize) -> Cursor {
        Cursor {
            kind: CursorKind::FunctionDecl,
            spelling: name.to_string(),
            location: Location::new("/s/led.h", 2, 6),
            parameters: (0..params).map(|i| ParameterInfo::new("int", format!("p{i}"))).collect(),
            ..Cursor::default()
        }
    }

    #[test]
    fn siblings_of_header() {
        let got = sibling_sources(Path::new("/s/led.h"));
        assert_eq!(
            got,
            vec![
                PathBuf::from("/s/led.cpp"),
                PathBuf::from("/s/led.cc"),
                PathBuf::from("/s/led.cxx")
            ]
        );
        assert!(sibling_sources(Path::new("/s/led.cpp")).is_empty());
    }

    #[test]
    fn finds_definition_with_same_shape() {
        let engine = FakeEngine::new();
        let b = builder(&engine);
        let files = [FileBuffer::new(
            "/s/led.cc",
            "void on(int pin);\n\nvoid on(int pin) {\n}\n",
        )];
        let finder = SiblingFinder::new(&b, SourceTexts::new(&[], &files));
        let loc = finder.definition_of(&decl("on", 1)).unwrap();
        assert_eq!(loc, Location::new("/s/led.cc", 3, 6));
        assert!(finder.definition_of(&decl("on", 2)).is_none());
    }

    #[test]
    fn non_functions_have_no_key() {
        let var = Cursor {
            kind: CursorKind::VarDecl,
            spelling: "x".into(),
            ..Cursor::default()
        };
        assert!(FunctionKey::of(&var).is_none());
    }
}
