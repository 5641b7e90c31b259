//! Windows SDK decorations the C++ grammar does not understand.
//!
//! Calling-convention macros, SAL annotations, `__declspec(...)` and
//! `MIDL_INTERFACE("...")` heads are blanked out before parsing. Blanking
//! keeps every byte offset (and every newline) in place, so extractors can
//! read the original spelling back through a node's byte range.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use cx_core::{CallingConvention, ParamDirection};
use regex::Regex;

static SAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b_(?:In|Out|Inout|Outptr|COM_Outptr|Ret|Reserved|Field|Check_return|Success|Must_inspect_result|Frees_ptr|Always|When)[A-Za-z_]*_\b(?:\s*\((?:[^()]|\([^()]*\))*\))?",
    )
    .expect("Invalid regex")
});

static DECLSPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:__declspec|DECLSPEC_[A-Z_]+)\s*\((?:[^()]|\([^()]*\))*\)")
        .expect("Invalid regex")
});

static MACROS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:__stdcall|_stdcall|__cdecl|_cdecl|__fastcall|_fastcall|__thiscall|__vectorcall|WINAPIV|WIN[A-Z]*API|APIENTRY|CALLBACK|STDMETHODCALLTYPE|STDMETHODVCALLTYPE|STDAPICALLTYPE|STDAPIVCALLTYPE|NTAPI|PASCAL|CDECL|DECLSPEC_[A-Z_]+|EXTERN_C|__RPC__\w+)\b",
    )
    .expect("Invalid regex")
});

static INTERFACE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?P<head>MIDL_INTERFACE\s*\(\s*"[^"]*"\s*\)|interface)\s+\w+\s*[:{]"#)
        .expect("Invalid regex")
});

static GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:MIDL_INTERFACE|DECLSPEC_UUID|__declspec\s*\(\s*uuid)\s*\(\s*"(?P<guid>[0-9A-Fa-f-]+)"\s*\)(?:\s*\))?\s*(?:(?:struct|class|interface)\s+)?(?:DECLSPEC_\w+\s+)*(?P<name>\w+)"#,
    )
    .expect("Invalid regex")
});

/// Source text ready for the grammar, plus what was lifted out of it.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub masked: String,
    /// Interface name to GUID, from `MIDL_INTERFACE` and `uuid` decorations.
    pub guids: HashMap<String, String>,
}

/// Blank out decorations in `source`.
#[must_use]
pub fn prepare(source: &str) -> Prepared {
    let guids = GUID
        .captures_iter(source)
        .map(|caps| (caps["name"].to_string(), caps["guid"].to_string()))
        .collect();

    let mut masked = source.to_string();
    let heads: Vec<Range<usize>> = INTERFACE_HEAD
        .captures_iter(&masked)
        .filter_map(|caps| caps.name("head").map(|m| m.range()))
        .collect();
    for range in heads {
        blank(&mut masked, range, "struct");
    }
    for pattern in [&*SAL, &*DECLSPEC, &*MACROS] {
        let ranges: Vec<Range<usize>> = pattern.find_iter(&masked).map(|m| m.range()).collect();
        for range in ranges {
            blank(&mut masked, range, "");
        }
    }
    Prepared { masked, guids }
}

/// Overwrite `range` with `keyword` followed by spaces, keeping newlines.
fn blank(text: &mut String, range: Range<usize>, keyword: &str) {
    let Some(original) = text.get(range.clone()) else {
        return;
    };
    let mut replacement = String::with_capacity(range.len());
    replacement.push_str(keyword);
    replacement.extend(
        original
            .bytes()
            .skip(keyword.len())
            .map(|b| if b == b'\n' { '\n' } else { ' ' }),
    );
    text.replace_range(range, &replacement);
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

/// Calling convention named anywhere in a declaration prefix.
#[must_use]
pub fn calling_convention(text: &str) -> CallingConvention {
    words(text)
        .find_map(|word| match word {
            "__stdcall" | "_stdcall" | "WINAPI" | "APIENTRY" | "CALLBACK" | "STDMETHODCALLTYPE"
            | "STDAPICALLTYPE" | "NTAPI" | "PASCAL" => Some(CallingConvention::StdCall),
            "__cdecl" | "_cdecl" | "CDECL" | "WINAPIV" | "STDMETHODVCALLTYPE"
            | "STDAPIVCALLTYPE" => Some(CallingConvention::CDecl),
            "__fastcall" | "_fastcall" => Some(CallingConvention::FastCall),
            "__thiscall" => Some(CallingConvention::ThisCall),
            _ => None,
        })
        .unwrap_or_default()
}

/// Direction and optionality from a parameter's SAL or RPC annotation.
///
/// Unannotated parameters are `In` and required.
#[must_use]
pub fn parameter_direction(text: &str) -> (ParamDirection, bool) {
    let mut direction = None;
    let mut optional = false;
    for word in words(text) {
        let sal = word.starts_with('_') && word.ends_with('_') && !word.starts_with("__");
        let rpc = word.starts_with("__RPC__");
        if !(sal || rpc) {
            continue;
        }
        optional |= word.contains("_opt");
        if direction.is_some() {
            continue;
        }
        direction = if word.starts_with("_Inout") || word.starts_with("__RPC__inout") {
            Some(ParamDirection::InOut)
        } else if word.starts_with("_Out")
            || word.starts_with("_COM_Out")
            || word.starts_with("__RPC__out")
            || word.starts_with("__RPC__deref_out")
        {
            Some(ParamDirection::Out)
        } else if word.starts_with("_In") || word.starts_with("__RPC__in") {
            Some(ParamDirection::In)
        } else {
            None
        };
    }
    (direction.unwrap_or_default(), optional)
}
