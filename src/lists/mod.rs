// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing of list-valued step parameters.
//!
//! Pipeline parsets hand steps lists of files and hosts in a few different
//! forms: a native list, a string like "[a.ms, b.ms]", or the path to a
//! mapfile whose entry holds such a string. [`ListInput`] resolves these
//! once, so nothing past the argument parsing has to care.

mod error;

pub use error::ListError;

use std::{fmt, path::PathBuf};

use log::{debug, trace};
use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use vec1::Vec1;

use crate::mapfile::DataMap;

/// A list-valued argument as it was given, either on the command line or in
/// an arguments file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArg {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for ListArg {
    fn from(s: &str) -> ListArg {
        ListArg::One(s.to_string())
    }
}

impl Serialize for ListArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ListArg::One(s) => serializer.serialize_str(s),
            ListArg::Many(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ListArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ListArg, D::Error> {
        struct ListArgVisitor;

        impl<'de> Visitor<'de> for ListArgVisitor {
            type Value = ListArg;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or a list of strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ListArg, E> {
                Ok(ListArg::One(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ListArg, A::Error> {
                let mut v = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(s) = seq.next_element::<String>()? {
                    v.push(s);
                }
                Ok(ListArg::Many(v))
            }
        }

        deserializer.deserialize_any(ListArgVisitor)
    }
}

/// A list argument, resolved into what it actually is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListInput {
    /// A native list of strings.
    RawList(Vec<String>),

    /// A string like "[a.ms, b.ms]"; a string without brackets is a
    /// single-element list.
    BracketedString(String),

    /// A mapfile whose entries are themselves bracketed lists.
    MapfilePath { path: PathBuf, map: DataMap },
}

impl ListInput {
    /// Resolve a file-list argument. A string is first tried as a mapfile;
    /// only if it turns out not to be one is it treated as a literal list.
    /// Other errors (e.g. an unreadable mapfile) are propagated.
    pub fn resolve_files(arg: ListArg) -> Result<ListInput, ListError> {
        match arg {
            ListArg::Many(v) => Ok(ListInput::RawList(v)),
            ListArg::One(s) => {
                let path = PathBuf::from(s.trim());
                match DataMap::load(&path) {
                    Ok(map) => {
                        debug!("Reading the file list out of mapfile {}", path.display());
                        Ok(ListInput::MapfilePath { path, map })
                    }
                    Err(e) if e.is_not_a_mapfile() => {
                        trace!("'{s}' is not a mapfile ({e}); treating it as a literal list");
                        Ok(ListInput::BracketedString(s))
                    }
                    Err(e) => Err(ListError::from(e)),
                }
            }
        }
    }

    /// Resolve a host-list argument. Hosts are never given as mapfiles.
    pub fn resolve_hosts(arg: ListArg) -> ListInput {
        match arg {
            ListArg::Many(v) => ListInput::RawList(v),
            ListArg::One(s) => ListInput::BracketedString(s),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            ListInput::RawList(v) => v
                .iter()
                .map(|s| clean_element(s))
                .filter(|s| !s.is_empty())
                .collect(),
            ListInput::BracketedString(s) => parse_bracketed_list(&s),
            ListInput::MapfilePath { map, .. } => {
                map.files().flat_map(parse_bracketed_list).collect()
            }
        }
    }
}

/// Get an ordered list of files out of `arg`. See [`ListInput::resolve_files`].
pub fn parse_file_list(arg: ListArg) -> Result<Vec<String>, ListError> {
    Ok(ListInput::resolve_files(arg)?.into_list())
}

/// Get an ordered list of hosts out of `arg`.
pub fn parse_host_list(arg: ListArg) -> Vec<String> {
    parse_literal_list(arg)
}

/// Get an ordered list out of `arg` without ever treating it as a mapfile.
/// Hosts are always given this way, as are the measurement sets of some
/// steps.
pub fn parse_literal_list(arg: ListArg) -> Vec<String> {
    ListInput::resolve_hosts(arg).into_list()
}

/// Split a string like "[a.ms, 'b.ms']" into its elements. Brackets, quotes
/// and whitespace are removed from each element, and empty elements are
/// dropped. Order and duplicates are preserved.
pub fn parse_bracketed_list(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split(',')
        .map(clean_element)
        .filter(|e| !e.is_empty())
        .collect()
}

fn clean_element(e: &str) -> String {
    e.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '[' | ']'))
        .to_string()
}

/// Extend `hosts` cyclically until it is as long as `files`, i.e. element `i`
/// is `hosts[i % hosts.len()]`. Surplus hosts are dropped. An empty host list
/// can't be extended and is an error.
pub fn align_hosts(hosts: &[String], files: &[String]) -> Result<Vec<String>, ListError> {
    let hosts = Vec1::try_from_vec(hosts.to_vec()).map_err(|_| ListError::EmptyHostList {
        num_files: files.len(),
    })?;
    Ok(hosts.iter().cycle().take(files.len()).cloned().collect())
}

/// Convert strings like "True", "false", "1" and "0" to a bool.
pub fn string_to_bool(s: &str) -> Result<bool, ListError> {
    match s.trim().to_uppercase().as_str() {
        "TRUE" | "1" => Ok(true),
        "FALSE" | "0" => Ok(false),
        _ => Err(ListError::NotABool(s.to_string())),
    }
}

/// Used with `#[serde(deserialize_with)]`; pipeline parsets often give
/// booleans as strings.
pub(crate) fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => string_to_bool(&s).map_err(de::Error::custom),
    }
}

/// The same as [`bool_or_string`], for optional booleans.
pub(crate) fn option_bool_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    bool_or_string(deserializer).map(Some)
}
