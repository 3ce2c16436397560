pub mod apply;
pub mod backup;
pub mod config;
pub mod document;
pub mod duplicates;
pub mod encoding;
pub mod extract;
pub mod formats;
pub mod parser;
pub mod record;
pub mod resolver;
pub mod selection;
pub mod serializer;

pub use apply::{apply_record, apply_to, AppliedField, AppliedFields, ApplyTarget};
pub use backup::{write_atomically, BackupError, SaveOutcome};
pub use config::{
    CheckOptions, ConfigError, LanguageConfig, ParseOptions, SelectionOptions, WriteOptions,
};
pub use document::{LanguageDocument, LanguageFileError, LoadReport, SharedDocument};
pub use duplicates::{
    check_consistency, find_dangling_group_members, find_duplicate_ids, find_unencodable_header,
    find_unencodable_text, ConsistencyReport, DanglingMember, DuplicateIdError, DuplicateReport,
    DuplicateScope, HeaderField, UnencodableHeader, UnencodableText,
};
pub use encoding::{FileLayout, LineEnding, TextEncoding};
pub use formats::{get_handler, ExchangeFormat, ExchangeHandler, FormatError, MergeReport};
pub use parser::{parse, ParseError, ParseErrorReason, ParseOutcome, ParsePolicy};
pub use record::{
    CommentRecord, ComponentType, GroupRecord, IdNamespace, IdRecord, LanguageHeader,
};
pub use resolver::{
    find_default_language_file, find_language_file_for_locale, localized_line,
    localized_line_by_id, resolve_language_file, LanguageFileInfo, ResolutionSource,
    ResolveError, ResolvedLanguage,
};
pub use selection::{LanguageSelection, SelectionError};
pub use serializer::serialize;
