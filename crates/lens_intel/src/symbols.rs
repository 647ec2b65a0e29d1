//! Symbol collection.

use lens_cache::CachedUnit;
use lens_engine::{Cursor, CursorKind, ParameterInfo, TranslationUnit, Walk};
use lens_source::{BodyRange, Location, SyntheticMap};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of a collected symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// A free function.
    Function,
    /// A member function.
    Method,
    /// A constructor.
    Constructor,
    /// A destructor.
    Destructor,
    /// A function template.
    FunctionTemplate,
    /// A variable.
    Variable,
    /// A data member.
    Field,
    /// A function parameter.
    Parameter,
    /// An enumerator.
    EnumConstant,
    /// A struct.
    Struct,
    /// A class.
    Class,
    /// A union.
    Union,
    /// An enum.
    Enum,
    /// A typedef.
    Typedef,
    /// A macro.
    Macro,
}

impl SymbolKind {
    /// Maps an engine node kind; `None` for nodes that are not symbols.
    pub fn from_cursor(kind: CursorKind) -> Option<Self> {
        Some(match kind {
            CursorKind::FunctionDecl => SymbolKind::Function,
            CursorKind::CxxMethod => SymbolKind::Method,
            CursorKind::Constructor => SymbolKind::Constructor,
            CursorKind::Destructor => SymbolKind::Destructor,
            CursorKind::FunctionTemplate => SymbolKind::FunctionTemplate,
            CursorKind::VarDecl => SymbolKind::Variable,
            CursorKind::FieldDecl => SymbolKind::Field,
            CursorKind::ParmDecl => SymbolKind::Parameter,
            CursorKind::EnumConstantDecl => SymbolKind::EnumConstant,
            CursorKind::StructDecl => SymbolKind::Struct,
            CursorKind::ClassDecl => SymbolKind::Class,
            CursorKind::UnionDecl => SymbolKind::Union,
            CursorKind::EnumDecl => SymbolKind::Enum,
            CursorKind::TypedefDecl => SymbolKind::Typedef,
            CursorKind::MacroDefinition => SymbolKind::Macro,
            _ => return None,
        })
    }

    /// Returns `true` for the kinds that can have a body.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::Method
                | SymbolKind::Constructor
                | SymbolKind::Destructor
                | SymbolKind::FunctionTemplate
        )
    }
}

/// One declaration, definition or macro in original file coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Bare name.
    pub name: String,
    /// Name as shown in symbol lists, with parameter types for functions.
    pub display_name: String,
    /// Original file declaring the symbol.
    pub file: PathBuf,
    /// Line of the name (1-indexed).
    pub line: u32,
    /// Column of the name (1-indexed).
    pub column: u32,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Parameters of function-like symbols.
    pub parameters: Vec<ParameterInfo>,
    /// Function body extent, when it lies in the declaring file.
    pub body: Option<BodyRange>,
    /// Cross-unit identity string.
    pub usr: String,
}

/// Collects the symbols of a unit, sorted by name, file and line.
///
/// With a `parent`, only its direct children are collected; parents are
/// compared by their canonical declaration, so any redeclaration of a
/// container selects the same members.
pub fn collect_symbols(entry: &CachedUnit, parent: Option<&Cursor>) -> Vec<SymbolRecord> {
    let unit = entry.unit();
    let map = entry.map();
    let wanted = parent.map(|p| unit.canonical(p));

    let mut out = Vec::new();
    unit.walk(&mut |node, node_parent| {
        let in_scope = match (&wanted, node_parent) {
            (None, _) => true,
            (Some(wanted), Some(p)) => same_entity(&unit.canonical(p), wanted),
            (Some(_), None) => false,
        };
        if in_scope {
            if let Some(record) = symbol_record(unit, map, node) {
                out.push(record);
            }
        }
        Walk::Recurse
    });

    out.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
    });
    tracing::trace!(file = %entry.key().display(), count = out.len(), "collected symbols");
    out
}

/// The class, struct, union, enum or namespace enclosing a position, with
/// its direct members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Container name.
    pub name: String,
    /// Engine kind of the container.
    pub kind: CursorKind,
    /// Original file declaring the container.
    pub file: PathBuf,
    /// Line of the name (1-indexed).
    pub line: u32,
    /// Column of the name (1-indexed).
    pub column: u32,
    /// Direct members, sorted like [`collect_symbols`].
    pub members: Vec<SymbolRecord>,
}

/// The innermost container whose extent covers an original-file position.
pub fn enclosing_container(entry: &CachedUnit, line: u32, column: u32) -> Option<ContainerInfo> {
    let unit = entry.unit();
    let map = entry.map();
    let at = map.to_analyzed(line, column);

    // Pre-order: a nested container is seen after the one holding it.
    let mut innermost: Option<Cursor> = None;
    unit.walk(&mut |node, _| {
        if node.kind.is_container() && covers(node, &at) {
            innermost = Some(node.clone());
        }
        Walk::Recurse
    });
    let container = innermost?;
    let loc = map.to_original(&container.location)?;
    let members = collect_symbols(entry, Some(&container));
    Some(ContainerInfo {
        name: container.spelling,
        kind: container.kind,
        file: loc.file,
        line: loc.line,
        column: loc.column,
        members,
    })
}

fn covers(node: &Cursor, at: &Location) -> bool {
    let start = &node.location;
    let end = &node.extent_end;
    start.file == at.file
        && end.file == at.file
        && (start.line, start.column) <= (at.line, at.column)
        && (at.line, at.column) < (end.line, end.column)
}

fn same_entity(a: &Cursor, b: &Cursor) -> bool {
    if !a.usr.is_empty() && !b.usr.is_empty() {
        return a.usr == b.usr;
    }
    a.same_node(b)
}

fn symbol_record(unit: &dyn TranslationUnit, map: &SyntheticMap, node: &Cursor) -> Option<SymbolRecord> {
    let kind = SymbolKind::from_cursor(node.kind)?;
    if node.spelling.is_empty() || node.location.is_unknown() {
        return None;
    }
    let loc = map.to_original(&node.location)?;

    let mut display_name = if node.display_name.is_empty() {
        node.spelling.clone()
    } else {
        node.display_name.clone()
    };
    if matches!(kind, SymbolKind::Constructor | SymbolKind::Destructor) {
        if let Some(rest) = display_name.strip_prefix("void ") {
            display_name = rest.to_string();
        }
    }

    let (parameters, body) = if kind.is_function_like() {
        (node.parameters.clone(), body_range(unit, map, node))
    } else {
        (Vec::new(), None)
    };

    Some(SymbolRecord {
        name: node.spelling.clone(),
        display_name,
        file: loc.file,
        line: loc.line,
        column: loc.column,
        kind,
        parameters,
        body,
        usr: node.usr.clone(),
    })
}

/// The body block of a function-like node, in engine coordinates.
///
/// Only a direct compound-statement child that starts and ends in the
/// declaring file counts; a body found elsewhere yields `None`.
pub(crate) fn body_of(unit: &dyn TranslationUnit, node: &Cursor) -> Option<Cursor> {
    if !node.kind.is_function_like() {
        return None;
    }
    unit.children(node).into_iter().find(|c| {
        c.kind == CursorKind::CompoundStmt
            && c.location.file == node.location.file
            && c.extent_end.file == node.location.file
    })
}

fn body_range(unit: &dyn TranslationUnit, map: &SyntheticMap, node: &Cursor) -> Option<BodyRange> {
    let body = body_of(unit, node)?;
    let start = map.to_original(&body.location)?;
    let end = map.to_original(&body.extent_end)?;
    Some(BodyRange {
        start_line: start.line,
        start_column: start.column,
        end_line: end.line,
        end_column: end.column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_cache::{ArgumentProfile, StaticArguments, UnitBuilder, UnitCache};
    use lens_engine::testing::FakeEngine;
    use std::path::Path;
    use std::sync::Arc;

    fn builder(engine: &FakeEngine) -> UnitBuilder {
        UnitBuilder::new(
            Arc::new(engine.clone()),
            Arc::new(StaticArguments::default()),
            ArgumentProfile::default(),
            "/s",
        )
    }

    const SKETCH: &str = "#define LED 13\nint counter;\n\nvoid setup() {\n  counter = 1;\n}\n";

    #[test]
    fn sketch_symbols_in_original_coordinates() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache.resolve(&mut b, Path::new("/s/Blink.ino"), SKETCH).unwrap();
        let symbols = collect_symbols(entry, None);

        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["LED", "counter", "setup"]);
        assert!(symbols.iter().all(|s| s.file == Path::new("/s/Blink.ino")));

        let setup = &symbols[2];
        assert_eq!(setup.kind, SymbolKind::Function);
        assert_eq!(setup.line, 4);
        assert_eq!(setup.display_name, "setup()");
        assert_eq!(
            setup.body,
            Some(BodyRange {
                start_line: 4,
                start_column: 14,
                end_line: 6,
                end_column: 2
            })
        );
        assert_eq!(symbols[0].kind, SymbolKind::Macro);
        assert_eq!(symbols[1].body, None);
    }

    #[test]
    fn parameters_are_symbols() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache
            .resolve(&mut b, Path::new("/s/led.cpp"), "void blink(int times) {\n}\n")
            .unwrap();
        let symbols = collect_symbols(entry, None);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "blink");
        assert_eq!(symbols[0].parameters, vec![ParameterInfo::new("int", "times")]);
        assert_eq!(symbols[1].kind, SymbolKind::Parameter);
        assert_eq!((symbols[1].line, symbols[1].column), (1, 16));
    }

    #[test]
    fn parent_filter_selects_children() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache
            .resolve(&mut b, Path::new("/s/led.cpp"), "int level;\nvoid blink(int times, int gap) {\n}\n")
            .unwrap();
        let blink = entry
            .unit()
            .top_level()
            .into_iter()
            .find(|c| c.spelling == "blink")
            .unwrap();
        let members = collect_symbols(entry, Some(&blink));
        let names: Vec<&str> = members.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["gap", "times"]);
    }

    const LED_CLASS: &str =
        "int level;\nclass Led {\npublic:\n  int pin;\n  void on() {\n    pin = 1;\n  }\n};\n";

    #[test]
    fn container_members_at_position() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache.resolve(&mut b, Path::new("/s/led.cpp"), LED_CLASS).unwrap();
        let info = enclosing_container(entry, 6, 5).unwrap();
        assert_eq!(info.name, "Led");
        assert_eq!(info.kind, CursorKind::ClassDecl);
        assert_eq!((info.line, info.column), (2, 7));
        let members: Vec<(&str, SymbolKind)> = info.members.iter().map(|m| (m.name.as_str(), m.kind)).collect();
        assert_eq!(members, vec![("on", SymbolKind::Method), ("pin", SymbolKind::Field)]);
    }

    #[test]
    fn no_container_outside_records() {
        let engine = FakeEngine::new();
        let mut b = builder(&engine);
        let mut cache = UnitCache::new();
        let (entry, _) = cache.resolve(&mut b, Path::new("/s/led.cpp"), LED_CLASS).unwrap();
        assert_eq!(enclosing_container(entry, 1, 5), None);
        assert_eq!(enclosing_container(entry, 9, 1), None);
    }

    #[test]
    fn symbol_kind_mapping() {
        assert_eq!(SymbolKind::from_cursor(CursorKind::CxxMethod), Some(SymbolKind::Method));
        assert_eq!(SymbolKind::from_cursor(CursorKind::CompoundStmt), None);
        assert!(SymbolKind::Destructor.is_function_like());
        assert!(!SymbolKind::Typedef.is_function_like());
    }

    #[test]
    fn record_serializes_kind_in_snake_case() {
        let json = serde_json::to_string(&SymbolKind::EnumConstant).unwrap();
        assert_eq!(json, "\"enum_constant\"");
    }
}
