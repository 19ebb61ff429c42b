//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Parses a RESTCONF `api-path` (the part of the URI after
//! `{+restconf}/data/`) into its `/`-separated segments, per RFC 8040
//! §3.5.3: `[module:]name[=key1[,key2…]]`, each key percent-decoded
//! independently.

use crate::error::bad_request;
use ncd_utils::RpcErrors;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment {
    /// The module name qualifying this segment, present only where the
    /// URI actually carries one (the first segment, and any segment
    /// that crosses into a different module than its parent's).
    pub module: Option<String>,
    pub name: String,
    /// Percent-decoded key values in declaration order, empty for a
    /// non-list segment.
    pub keys: Vec<String>,
}

pub fn parse_api_path(path: &str) -> Result<Vec<Segment>, RpcErrors> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed.split('/').map(parse_segment).collect()
}

fn parse_segment(raw: &str) -> Result<Segment, RpcErrors> {
    if raw.is_empty() {
        return Err(bad_request("empty api-path segment"));
    }
    let (qname, keys_part) = match raw.split_once('=') {
        Some((qname, keys)) => (qname, Some(keys)),
        None => (raw, None),
    };
    let (module, name) = match qname.split_once(':') {
        Some((module, name)) => (Some(module.to_owned()), name.to_owned()),
        None => (None, qname.to_owned()),
    };
    if name.is_empty() {
        return Err(bad_request(format!("empty node name in segment '{raw}'")));
    }
    let keys = match keys_part {
        Some(raw_keys) => raw_keys
            .split(',')
            .map(percent_decode)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(Segment { module, name, keys })
}

fn percent_decode(raw: &str) -> Result<String, RpcErrors> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = raw
                    .get(i + 1..i + 3)
                    .ok_or_else(|| bad_request(format!("truncated percent-escape in '{raw}'")))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| bad_request(format!("invalid percent-escape in '{raw}'")))?;
                out.push(byte);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| bad_request(format!("percent-escape is not valid UTF-8 in '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_qualified_container() {
        let segs = parse_api_path("example:top").unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].module.as_deref(), Some("example"));
        assert_eq!(segs[0].name, "top");
        assert!(segs[0].keys.is_empty());
    }

    #[test]
    fn parses_list_instance_with_single_key() {
        let segs = parse_api_path("example:ifs/if=eth0").unwrap();
        assert_eq!(segs[1].name, "if");
        assert_eq!(segs[1].keys, vec!["eth0"]);
    }

    #[test]
    fn splits_multiple_keys_and_decodes_percent_escapes() {
        let segs = parse_api_path("example:pairs/pair=a%2Cb,c%20d").unwrap();
        assert_eq!(segs[1].keys, vec!["a,b", "c d"]);
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(parse_api_path("top//child").is_err());
    }
}
