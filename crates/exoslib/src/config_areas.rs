//! Segmentation of `show config` output into configured modules.
//!
//! A full configuration dump is a sequence of comment runs announcing each
//! module, each followed by that module's non-default configuration lines:
//!
//! ```text
//! #
//! # Module vlan configuration.
//! #
//! create vlan "v10"
//! configure vlan v10 tag 10
//! #
//! # Module acl configuration.
//! #
//! ```
//!
//! Modules whose block holds only comments are at factory defaults and are
//! not reported.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker that makes a line a comment.
pub const COMMENT_MARKER: char = '#';

/// Captures the module name from a `# Module <name> configuration.` header.
static MODULE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"# Module (.+?)(?: configuration\.)?\s*$").expect("Invalid regex pattern")
});

/// A configured module and the dump text accumulated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSegment {
    /// Lower-cased module name (empty if no header preceded the content).
    pub name: String,
    /// Comment run and content lines, terminators preserved.
    pub text: String,
}

/// What to do with a module that still has pending content at end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingModule {
    /// Drop it; only a following comment line closes a module.
    #[default]
    Drop,
    /// Emit it as if a closing comment followed.
    Emit,
}

/// Returns the lower-cased module name if `line` is a module header.
pub fn module_header_name(line: &str) -> Option<String> {
    MODULE_HEADER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

fn is_blank(line: &str) -> bool {
    line == "\n" || line == "\r\n"
}

/// Single forward pass over dump lines.
#[derive(Debug, Default)]
pub struct ModuleSegmenter {
    trailing: TrailingModule,
    module_name: String,
    module_text: String,
    has_content: bool,
    segments: Vec<ConfigSegment>,
}

impl ModuleSegmenter {
    /// Creates a segmenter that drops a trailing pending module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the end-of-input policy.
    pub fn with_trailing(mut self, trailing: TrailingModule) -> Self {
        self.trailing = trailing;
        self
    }

    /// Feeds one line, terminator included.
    pub fn feed_line(&mut self, line: &str) {
        let comment = line.contains(COMMENT_MARKER);

        if !comment && !is_blank(line) {
            self.module_text.push_str(line);
            self.has_content = true;
        } else if self.has_content && comment {
            // The closing line is not inspected for a header.
            self.emit();
            self.module_text.push_str(line);
        } else if comment {
            self.module_text.push_str(line);
            if let Some(name) = module_header_name(line) {
                self.module_name = name;
            }
        } else if self.has_content {
            self.module_text.push_str(line);
        } else {
            self.module_text.clear();
        }
    }

    fn emit(&mut self) {
        let segment = ConfigSegment {
            name: std::mem::take(&mut self.module_name),
            text: std::mem::take(&mut self.module_text),
        };
        debug!(module = %segment.name, bytes = segment.text.len(), "Module has non-default config");
        self.segments.push(segment);
        self.has_content = false;
    }

    /// Ends the scan and returns the emitted segments in dump order.
    pub fn finish(mut self) -> Vec<ConfigSegment> {
        if self.has_content && self.trailing == TrailingModule::Emit {
            self.emit();
        }
        self.segments
    }
}

/// Splits `dump` into segments for every module with non-default config.
pub fn configured_segments_with(dump: &str, trailing: TrailingModule) -> Vec<ConfigSegment> {
    let mut segmenter = ModuleSegmenter::new().with_trailing(trailing);
    for line in dump.split_inclusive('\n') {
        segmenter.feed_line(line);
    }
    segmenter.finish()
}

/// Splits `dump` into segments, dropping a trailing unclosed module.
pub fn configured_segments(dump: &str) -> Vec<ConfigSegment> {
    configured_segments_with(dump, TrailingModule::Drop)
}

/// Returns the names of modules with non-default configuration, in dump order.
pub fn configured_modules(dump: &str) -> Vec<String> {
    configured_segments(dump)
        .into_iter()
        .map(|segment| segment.name)
        .collect()
}
