//! Parse recovery ladder.

use lens_engine::ParseOptions;
use lens_source::sketch::is_analyzed_entry;
use std::path::Path;

use crate::arguments::without_core_include;

/// One parse attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    /// Short name used in logs.
    pub label: &'static str,
    /// Compiler arguments.
    pub args: Vec<String>,
    /// Parse options.
    pub options: ParseOptions,
}

/// Returns the parse attempts for a file, most complete first.
///
/// After the full attempt the ladder drops the preamble body-skipping limit,
/// then for synthetic sketch entries the forced core include, and finally all
/// arguments, which at least yields diagnostics for the first broken include.
pub fn recovery_ladder(args: &[String], analyzed: &Path, core_include: &str) -> Vec<Attempt> {
    let full = ParseOptions::editing();
    let reduced = full.without_preamble_limit();
    let mut attempts = vec![
        Attempt {
            label: "full",
            args: args.to_vec(),
            options: full,
        },
        Attempt {
            label: "no-preamble-limit",
            args: args.to_vec(),
            options: reduced,
        },
    ];
    if is_analyzed_entry(analyzed) {
        let stripped = without_core_include(args, core_include);
        attempts.push(Attempt {
            label: "no-core-include",
            args: stripped.clone(),
            options: reduced,
        });
        attempts.push(Attempt {
            label: "no-core-include (full options)",
            args: stripped,
            options: full,
        });
    }
    attempts.push(Attempt {
        label: "no-args",
        args: Vec::new(),
        options: reduced,
    });
    attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(attempts: &[Attempt]) -> Vec<&'static str> {
        attempts.iter().map(|a| a.label).collect()
    }

    #[test]
    fn plain_source_ladder() {
        let args = vec!["-DX".to_string()];
        let ladder = recovery_ladder(&args, Path::new("/s/led.cpp"), "Arduino.h");
        assert_eq!(labels(&ladder), vec!["full", "no-preamble-limit", "no-args"]);
        assert!(ladder[0]
            .options
            .contains(ParseOptions::LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE));
        assert!(!ladder[1]
            .options
            .contains(ParseOptions::LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE));
        assert!(ladder[2].args.is_empty());
    }

    #[test]
    fn sketch_entry_ladder() {
        let args = vec!["-include".to_string(), "Arduino.h".to_string(), "-Wall".to_string()];
        let ladder = recovery_ladder(&args, Path::new("/s/Blink.ino.cpp"), "Arduino.h");
        assert_eq!(
            labels(&ladder),
            vec![
                "full",
                "no-preamble-limit",
                "no-core-include",
                "no-core-include (full options)",
                "no-args"
            ]
        );
        assert_eq!(ladder[2].args, vec!["-Wall"]);
        assert_eq!(ladder[3].options, ParseOptions::editing());
    }
}
