//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Builds `<rpc-reply>`/`<rpc-error>` documents by hand. Nothing else
//! in the workspace yet turns an [`RpcErrors`] into XML (the validator
//! and store only ever produce the struct), so this is the first and
//! only place that shape gets serialized to the wire.

use ncd_utils::{ErrorTag, ErrorType, RpcError, RpcErrors};

const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

pub fn ok(message_id: &str) -> String {
    format!(r#"<rpc-reply message-id="{}" xmlns="{BASE_NS}"><ok/></rpc-reply>"#, escape_attr(message_id))
}

pub fn data(message_id: &str, data_xml: &str) -> String {
    format!(
        r#"<rpc-reply message-id="{}" xmlns="{BASE_NS}"><data>{data_xml}</data></rpc-reply>"#,
        escape_attr(message_id)
    )
}

/// A custom rpc's `<output>` children sit directly under `<rpc-reply>`
/// (RFC 6241 §4.3), unlike `get`/`get-config`'s own `<data>` wrapper.
pub fn rpc_output(message_id: &str, output_xml: &str) -> String {
    format!(r#"<rpc-reply message-id="{}" xmlns="{BASE_NS}">{output_xml}</rpc-reply>"#, escape_attr(message_id))
}

pub fn errors(message_id: &str, errors: &RpcErrors) -> String {
    let body: String = errors.0.iter().map(rpc_error).collect();
    format!(r#"<rpc-reply message-id="{}" xmlns="{BASE_NS}">{body}</rpc-reply>"#, escape_attr(message_id))
}

/// A malformed-envelope reply has no `message-id` to echo (RFC 6241
/// §4.3 permits omitting it only in this case).
pub fn envelope_error(error: &RpcError) -> String {
    format!(r#"<rpc-reply xmlns="{BASE_NS}">{}</rpc-reply>"#, rpc_error(error))
}

fn rpc_error(error: &RpcError) -> String {
    let mut body = String::new();
    body.push_str("<rpc-error>");
    push_elem(&mut body, "error-type", error.error_type.map(error_type_str).unwrap_or("application"));
    push_elem(&mut body, "error-tag", error.error_tag.map(|t| t.to_string()).unwrap_or_else(|| "operation-failed".to_owned()).as_str());
    push_elem(&mut body, "error-severity", "error");
    if let Some(app_tag) = &error.error_app_tag {
        push_elem(&mut body, "error-app-tag", app_tag);
    }
    if let Some(path) = &error.error_path {
        push_elem(&mut body, "error-path", path);
    }
    if let Some(message) = &error.error_message {
        push_elem(&mut body, "error-message", message);
    }
    body.push_str("</rpc-error>");
    body
}

fn error_type_str(error_type: ErrorType) -> &'static str {
    match error_type {
        ErrorType::Transport => "transport",
        ErrorType::Rpc => "rpc",
        ErrorType::Protocol => "protocol",
        ErrorType::Application => "application",
    }
}

fn push_elem(body: &mut String, name: &str, text: &str) {
    body.push('<');
    body.push_str(name);
    body.push('>');
    body.push_str(&escape_text(text));
    body.push_str("</");
    body.push_str(name);
    body.push('>');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_an_ok_reply() {
        let xml = ok("3");
        assert!(xml.contains(r#"message-id="3""#));
        assert!(xml.contains("<ok/>"));
    }

    #[test]
    fn builds_an_error_reply_with_path_and_message() {
        let err = RpcError::new(ErrorTag::DataExists).path("/ex:top/ex:ifs[name='eth0']").message("already exists");
        let xml = errors("5", &RpcErrors::single(err));
        assert!(xml.contains("<error-tag>data-exists</error-tag>"));
        assert!(xml.contains("<error-path>/ex:top/ex:ifs[name='eth0']</error-path>"));
        assert!(xml.contains("already exists"));
    }

    #[test]
    fn escapes_message_text() {
        let err = RpcError::new(ErrorTag::OperationFailed).message("a <bad> & value");
        let xml = errors("1", &RpcErrors::single(err));
        assert!(xml.contains("a &lt;bad&gt; &amp; value"));
    }
}
