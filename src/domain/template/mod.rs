// Template module for entity URL templates
//
// This module provides validation, compilation, matching, and merging of
// URL templates such as `/{prefix}/{id}`.

mod ast;
mod matcher;
mod parser;
mod resolver;

pub use ast::{PreProcessedTemplate, Segment, Template, TemplateKey, TemplateMetadata, ID, PREFIX};
pub use matcher::{find_extension, match_pattern, parse_template, ExtensionSplit, MatchResult, PatternMatch};
pub use parser::{
    compile_pattern, default_preprocessed_templates, default_template, preprocess_template, preprocess_templates,
    TemplateParser,
};
pub use resolver::{merge_preprocessed, merge_template, missing_segments};
