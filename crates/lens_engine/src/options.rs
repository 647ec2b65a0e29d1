//! Parse option flags passed to the analysis engine.

use bitflags::bitflags;

bitflags! {
    /// Options controlling how the engine builds a translation unit.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ParseOptions: u32 {
        /// Record macro definitions and expansions.
        const DETAILED_PREPROCESSING_RECORD = 1 << 0;
        /// Keep a precompiled preamble for fast reparses.
        const PRECOMPILED_PREAMBLE = 1 << 2;
        /// Build the preamble on the first parse instead of the first reparse.
        const CREATE_PREAMBLE_ON_FIRST_PARSE = 1 << 3;
        /// Attach brief comments to completion results.
        const INCLUDE_BRIEF_COMMENTS = 1 << 4;
        /// Continue past fatal errors such as missing includes.
        const KEEP_GOING = 1 << 5;
        /// Skip function bodies, but only inside the preamble.
        const LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE = 1 << 6;
    }
}

impl ParseOptions {
    /// Options for units that live in the cache and are reparsed on edits.
    pub fn editing() -> Self {
        Self::DETAILED_PREPROCESSING_RECORD
            | Self::INCLUDE_BRIEF_COMMENTS
            | Self::KEEP_GOING
            | Self::PRECOMPILED_PREAMBLE
            | Self::CREATE_PREAMBLE_ON_FIRST_PARSE
            | Self::LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE
    }

    /// The same options without the preamble body-skipping limit.
    pub fn without_preamble_limit(self) -> Self {
        self - Self::LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE
    }

    /// Options for one-shot structural scans of a single buffer.
    pub fn scan() -> Self {
        Self::KEEP_GOING
    }
}
