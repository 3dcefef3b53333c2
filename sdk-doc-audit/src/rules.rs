//! Classification rules for symbol paths.
//!
//! The naming conventions and package lists live in the tables at the top of
//! this module; the predicates below are thin lookups over them.

use crate::path::{INDEX_SEGMENT, segments};
use crate::spec::DocIndex;
use tracing::debug;

/// Suffixes of classes users interact with directly.
pub const USER_FACING_SUFFIXES: &[&str] = &["Client", "Api", "Builder", "Channel", "Scope", "Manager"];

/// Suffix of error types. Error classes are never user-facing.
pub const ERROR_SUFFIX: &str = "Error";

/// Marker prefix for names that are internal by convention.
pub const INTERNAL_NAME_PREFIX: char = '_';

/// Segment TypeDoc emits for a module's default export wrapper.
pub const DEFAULT_EXPORT_SEGMENT: &str = ".default.";

/// Character that appears in module names qualified by a source file
/// (`lib/fetch`), which are internal implementation modules.
pub const MODULE_PATH_SEPARATOR: char = '/';

/// Package that re-exports the source packages.
pub const UMBRELLA_PACKAGE: &str = "@supabase/supabase-js";

/// Packages whose symbols the umbrella package re-exports.
pub const SOURCE_PACKAGES: &[&str] = &[
    "@supabase/auth-js",
    "@supabase/postgrest-js",
    "@supabase/realtime-js",
    "@supabase/storage-js",
    "@supabase/functions-js",
];

/// Class defined by the umbrella package itself, never a re-export.
pub const UMBRELLA_ONLY_CLASS: &str = "SupabaseClient";

/// Whether a class name denotes an error type.
pub fn is_error_type(name: &str) -> bool {
    name.ends_with(ERROR_SUFFIX)
}

/// Whether a class is one users are expected to call into.
pub fn is_user_facing_class(name: &str) -> bool {
    !is_error_type(name) && USER_FACING_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Whether a path names a symbol exported from a package root, either
/// `pkg.Symbol` or `pkg.index.Symbol`.
pub fn is_top_level_export(path: &str) -> bool {
    let parts = segments(path);
    parts.len() == 2 || (parts.len() == 3 && parts[1] == INDEX_SEGMENT)
}

/// Whether a path belongs to an implementation detail that is exempt from
/// missing-documentation reporting: a default-export wrapper, or a member
/// of a file-qualified module below the package root.
pub fn is_internal_symbol(path: &str) -> bool {
    if path.contains(DEFAULT_EXPORT_SEGMENT) {
        return true;
    }
    segments(path).iter().skip(1).any(|segment| segment.contains(MODULE_PATH_SEPARATOR))
}

/// Whether an umbrella-package symbol is a re-export that is documented, or
/// assumed documented, under its source package.
///
/// Symbols of [`UMBRELLA_ONLY_CLASS`] are never re-exports. Any other
/// umbrella symbol is treated as a re-export even when no source package
/// documents it.
pub fn is_documented_reexport(path: &str, docs: &DocIndex) -> bool {
    let Some(suffix) = path.strip_prefix(UMBRELLA_PACKAGE).and_then(|rest| rest.strip_prefix('.'))
    else {
        return false;
    };

    if segments(suffix).first() == Some(&UMBRELLA_ONLY_CLASS) {
        return false;
    }

    if let Some(source) = SOURCE_PACKAGES.iter().find(|pkg| docs.contains(&format!("{pkg}.{suffix}")))
    {
        debug!(path, source, "re-export documented under source package");
        return true;
    }

    debug!(path, "no documented source equivalent, assuming re-export");
    true
}
