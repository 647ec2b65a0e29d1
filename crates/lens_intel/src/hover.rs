//! Hover information.

use lens_cache::CachedUnit;
use lens_engine::{Cursor, CursorKind, ParameterInfo};
use lens_source::sketch::is_prototype_header;
use lens_source::text::{body_snippet, brief_from_full, comment_block_above, normalize_indent};
use serde::{Deserialize, Serialize};

use crate::sibling::SiblingFinder;
use crate::symbols::body_of;
use crate::texts::SourceTexts;

/// Everything shown when hovering a symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverInfo {
    /// Bare name.
    pub name: String,
    /// Kind description, e.g. `function`.
    pub kind: String,
    /// Spelled type.
    pub type_name: String,
    /// Signature; functions carry their result type.
    pub signature: String,
    /// Cross-unit identity string.
    pub usr: String,
    /// First line of the documentation.
    pub brief_comment: String,
    /// Full documentation, or a declaration snippet.
    pub full_comment: String,
    /// Parameters with their declared names.
    pub parameters: Vec<ParameterInfo>,
}

impl HoverInfo {
    /// Formats the hover as plain text; empty when there is nothing useful
    /// to show.
    pub fn to_hover_string(&self) -> String {
        let signature_is_name = !self.signature.is_empty() && self.signature == self.name;
        let useful_signature = !self.signature.is_empty() && !signature_is_name;
        let type_adds_info = !self.type_name.is_empty() && self.type_name != self.name;
        if self.kind.is_empty()
            && self.brief_comment.is_empty()
            && self.full_comment.is_empty()
            && !useful_signature
            && !type_adds_info
        {
            return String::new();
        }

        let signature = inject_parameter_names(&self.signature, &self.parameters);
        let mut out = String::new();
        if !self.kind.is_empty() {
            out.push_str(&self.kind);
            out.push_str("\n\n");
        }
        if !signature.is_empty() && !signature_is_name {
            out.push_str(&signature);
            out.push('\n');
        } else if !self.name.is_empty() {
            out.push_str(&self.name);
            if !self.type_name.is_empty() {
                out.push_str(" : ");
                out.push_str(&self.type_name);
            }
            out.push('\n');
        }
        if !self.full_comment.is_empty() {
            out.push('\n');
            out.push_str(&self.full_comment);
        } else if !self.brief_comment.is_empty() {
            out.push('\n');
            out.push_str(&self.brief_comment);
        }
        out
    }
}

/// Rewrites the parameter list of `signature` with named parameters.
///
/// `void digitalWrite(uint8_t, uint8_t)` becomes
/// `void digitalWrite(uint8_t pin, uint8_t val)`. Anything after the last
/// `)` (qualifiers) is kept. Signatures without a parameter list, or an empty
/// `params`, are returned unchanged.
pub fn inject_parameter_names(signature: &str, params: &[ParameterInfo]) -> String {
    if signature.is_empty() || params.is_empty() {
        return signature.to_string();
    }
    let (Some(open), Some(close)) = (signature.find('('), signature.rfind(')')) else {
        return signature.to_string();
    };
    if close < open {
        return signature.to_string();
    }

    let list: Vec<String> = params
        .iter()
        .map(|p| {
            let ty = p.type_name.trim();
            let name = p.name.trim();
            if ty == "..." || name == "..." {
                return "...".to_string();
            }
            match (ty.is_empty(), name.is_empty()) {
                (false, false) => format!("{ty} {name}"),
                (false, true) => ty.to_string(),
                (true, _) => name.to_string(),
            }
        })
        .collect();
    format!("{}{}{}", &signature[..=open], list.join(", "), &signature[close..])
}

/// Hover information for the symbol at an original-file position.
///
/// The target is the referenced declaration, else the definition, else the
/// node itself. A declaration in the generated prototype header is replaced
/// by its definition.
pub fn hover_at(
    entry: &CachedUnit,
    line: u32,
    column: u32,
    texts: &SourceTexts<'_>,
    sibling: &SiblingFinder<'_>,
) -> Option<HoverInfo> {
    let unit = entry.unit();
    let at = unit.cursor_at(&entry.map().to_analyzed(line, column))?;
    let mut target = unit
        .referenced(&at)
        .or_else(|| unit.definition(&at))
        .unwrap_or(at);
    if is_prototype_header(&target.location.file) {
        if let Some(def) = unit.definition(&target) {
            target = def;
        }
    }

    let mut info = HoverInfo {
        name: target.spelling.clone(),
        kind: target.kind.describe().to_string(),
        type_name: target.type_name.clone(),
        signature: target.display_name.clone(),
        usr: target.usr.clone(),
        brief_comment: target.brief_comment.clone().unwrap_or_default(),
        full_comment: target.raw_comment.clone().unwrap_or_default(),
        parameters: Vec::new(),
    };

    let has_result = matches!(
        target.kind,
        CursorKind::FunctionDecl | CursorKind::CxxMethod | CursorKind::FunctionTemplate
    );
    if has_result && !target.result_type.is_empty() && !info.signature.is_empty() {
        info.signature = format!("{} {}", target.result_type, info.signature);
    }

    if info.brief_comment.is_empty() && info.full_comment.is_empty() {
        fallback_comment(&mut info, entry, &target, texts, sibling);
    }

    if target.kind.is_function_like() {
        info.parameters = target.parameters.clone();
    }

    if info.name.is_empty()
        && info.signature.is_empty()
        && info.brief_comment.is_empty()
        && info.full_comment.is_empty()
    {
        return None;
    }
    Some(info)
}

/// Recovers documentation from plain source text when the engine has none.
fn fallback_comment(
    info: &mut HoverInfo,
    entry: &CachedUnit,
    target: &Cursor,
    texts: &SourceTexts<'_>,
    sibling: &SiblingFinder<'_>,
) {
    let mut code_block = String::new();

    if !target.location.is_unknown() && target.location.line > 0 {
        if let Some(text) = texts.text(&target.location.file) {
            let extracted = comment_block_above(&text, target.location.line);
            if !extracted.is_empty() {
                info.brief_comment = brief_from_full(&extracted);
                info.full_comment = extracted;
                return;
            }
            code_block = match body_of(entry.unit(), target) {
                Some(body) => body_snippet(&text, target.location.line, body.extent_end.line),
                None => body_snippet(&text, target.location.line, target.location.line),
            };
        }
    }

    if let Some(def) = sibling.definition_of(target) {
        if let Some(text) = texts.text(&def.file) {
            let extracted = comment_block_above(&text, def.line);
            if !extracted.is_empty() {
                info.brief_comment = brief_from_full(&extracted);
                info.full_comment = extracted;
                return;
            }
            if code_block.is_empty() {
                code_block = body_snippet(&text, def.line, def.line + 3);
            }
        }
    }

    if !code_block.is_empty() {
        info.full_comment = format!("Declaration:\n{}", normalize_indent(&code_block, 2));
        info.brief_comment.clear();
    }
}
