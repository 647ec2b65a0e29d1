//! Compiler argument assembly.

use lens_source::sketch::is_analyzed_entry;
use lens_source::FileKind;
use std::path::{Path, PathBuf};

/// Source of the base compiler arguments (board defines, include paths).
///
/// Arguments must stay stable between full cache invalidations: a live
/// translation unit cannot change its arguments on reparse.
pub trait ArgumentProvider: Send + Sync {
    /// Returns the arguments for compiling `files`.
    fn arguments(&self, files: &[PathBuf]) -> Vec<String>;
}

/// A provider that always returns the same arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticArguments(pub Vec<String>);

impl StaticArguments {
    /// Creates a provider from any list of strings.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(args.into_iter().map(Into::into).collect())
    }
}

impl ArgumentProvider for StaticArguments {
    fn arguments(&self, _files: &[PathBuf]) -> Vec<String> {
        self.0.clone()
    }
}

/// Per-workspace additions to the provider's arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentProfile {
    /// Header force-included into synthetic sketch entries.
    pub core_include: String,
    /// Warning flags appended to every argument list.
    pub warning_flags: Vec<String>,
}

impl Default for ArgumentProfile {
    fn default() -> Self {
        Self {
            core_include: "Arduino.h".to_string(),
            warning_flags: Vec::new(),
        }
    }
}

/// Builds the full argument list for an analyzed file.
///
/// Headers are compiled in header mode, synthetic sketch entries force-include
/// the core header, and the warning flags come last.
pub fn compile_arguments(base: &[String], analyzed: &Path, profile: &ArgumentProfile) -> Vec<String> {
    let mut args = base.to_vec();
    if FileKind::of(analyzed).is_header() {
        args.extend(["-x".to_string(), "c++-header".to_string()]);
    }
    if is_analyzed_entry(analyzed) && !profile.core_include.is_empty() {
        args.extend(["-include".to_string(), profile.core_include.clone()]);
    }
    args.extend(profile.warning_flags.iter().cloned());
    args
}

/// Removes the `-include <core>` pair added by [`compile_arguments`].
pub(crate) fn without_core_include(args: &[String], core_include: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == "-include" && iter.peek().is_some_and(|next| *next == core_include) {
            iter.next();
            continue;
        }
        out.push(arg.clone());
    }
    out
}
