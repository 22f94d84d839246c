//! XML-RPC wire format.
//!
//! Requests are written by hand; responses are read with quick-xml into a
//! small element tree and then interpreted, which keeps the value grammar
//! (struct/member/name/value, array/data/value) easy to follow.

use std::{collections::BTreeMap, fmt::Write};

use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    error::{Result, RpcError},
    value::Value,
};

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str) -> Result<&Node> {
        self.child(name).ok_or_else(|| {
            RpcError::InvalidResponse(format!("<{}> has no <{}> element", self.name, name))
        })
    }
}

fn element_name(e: &BytesStart) -> Result<String> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| RpcError::InvalidResponse(format!("Invalid UTF-8 in element name: {e}")))
}

fn parse_tree(xml: &str) -> Result<Node> {
    // Text is kept verbatim: string values may carry meaningful whitespace.
    // Indentation between elements lands in container nodes, whose text is
    // never read.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    let mut close = |node: Node, stack: &mut Vec<Node>| match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root = Some(node),
    };

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => stack.push(Node::new(element_name(e)?)),
            Event::Empty(ref e) => close(Node::new(element_name(e)?), &mut stack),
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| RpcError::InvalidResponse("unbalanced end tag".into()))?;
                close(node, &mut stack);
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| RpcError::InvalidResponse(format!("Invalid UTF-8 in CDATA: {e}")))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(RpcError::InvalidResponse("unexpected end of document".into()));
    }

    root.ok_or_else(|| RpcError::InvalidResponse("empty document".into()))
}

fn parse_scalar<T: std::str::FromStr>(node: &Node) -> Result<T> {
    node.text.trim().parse().map_err(|_| {
        RpcError::InvalidResponse(format!("invalid <{}> value '{}'", node.name, node.text))
    })
}

fn decode_value(node: &Node) -> Result<Value> {
    let Some(typed) = node.children.first() else {
        // untyped values are strings, taken as is
        return Ok(Value::String(node.text.clone()));
    };

    let value = match typed.name.as_str() {
        "string" => Value::String(typed.text.clone()),
        "int" | "i4" | "i8" => Value::Int(parse_scalar(typed)?),
        "double" => Value::Double(parse_scalar(typed)?),
        "boolean" => match typed.text.trim() {
            "1" | "true" => Value::Boolean(true),
            "0" | "false" => Value::Boolean(false),
            other => {
                return Err(RpcError::InvalidResponse(format!(
                    "invalid <boolean> value '{other}'"
                )))
            }
        },
        "dateTime.iso8601" => Value::DateTime(typed.text.trim().to_string()),
        "base64" => Value::Base64(typed.text.clone()),
        "nil" => Value::Nil,
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require("name")?.text.trim().to_string();
                let value = decode_value(member.require("value")?)?;
                members.insert(name, value);
            }
            Value::Struct(members)
        }
        "array" => {
            let items = match typed.child("data") {
                Some(data) => data
                    .children
                    .iter()
                    .filter(|c| c.name == "value")
                    .map(decode_value)
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            Value::Array(items)
        }
        other => {
            return Err(RpcError::InvalidResponse(format!(
                "unknown value type <{other}>"
            )))
        }
    };

    Ok(value)
}

/// Decodes a `methodResponse` document.
///
/// A `<fault>` response is returned as [`RpcError::Fault`]. A response
/// without parameters decodes to [`Value::Nil`].
pub fn decode_response(xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(RpcError::InvalidResponse(format!(
            "expected <methodResponse>, got <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let fault = decode_value(fault.require("value")?)?;
        let code = fault.as_struct()?.get("faultCode").map_or(Ok(0), Value::as_i64)?;
        let message = fault.member_str("faultString").unwrap_or_default().to_string();
        return Err(RpcError::Fault { code, message });
    }

    match root.child("params").and_then(|p| p.child("param")) {
        Some(param) => decode_value(param.require("value")?),
        None => Ok(Value::Nil),
    }
}

fn encode_value(value: &Value, out: &mut String) {
    out.push_str("<value>");
    match value {
        Value::Int(i) if i32::try_from(*i).is_ok() => {
            let _ = write!(out, "<int>{i}</int>");
        }
        Value::Int(i) => {
            let _ = write!(out, "<i8>{i}</i8>");
        }
        Value::Boolean(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{d}</double>");
        }
        Value::DateTime(s) => {
            let _ = write!(out, "<dateTime.iso8601>{}</dateTime.iso8601>", escape(s.as_str()));
        }
        Value::Base64(s) => {
            let _ = write!(out, "<base64>{s}</base64>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, value) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                encode_value(value, out);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</data></array>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Encodes a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall>");
    let _ = write!(out, "<methodName>{}</methodName><params>", escape(method));
    for param in params {
        out.push_str("<param>");
        encode_value(param, &mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Encodes a successful `methodResponse` document carrying `value`.
pub fn encode_response(value: &Value) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodResponse><params><param>");
    encode_value(value, &mut out);
    out.push_str("</param></params></methodResponse>");
    out
}

/// Encodes a fault `methodResponse` document.
pub fn encode_fault(code: i64, message: &str) -> String {
    let fault = Value::Struct(BTreeMap::from([
        ("faultCode".to_string(), Value::Int(code)),
        ("faultString".to_string(), Value::from(message)),
    ]));
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodResponse><fault>");
    encode_value(&fault, &mut out);
    out.push_str("</fault></methodResponse>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_call_escapes_strings() {
        let xml = encode_call(
            "channel.software.addRepoFilter",
            &[Value::from("key"), Value::from("a<b & c")],
        );

        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<methodName>channel.software.addRepoFilter</methodName>"));
        assert!(xml.contains("<param><value><string>key</string></value></param>"));
        assert!(xml.contains("<string>a&lt;b &amp; c</string>"));
    }

    #[test]
    fn test_encode_call_struct_and_array() {
        let filter = Value::Struct(BTreeMap::from([
            ("flag".to_string(), Value::from("+")),
            ("filter".to_string(), Value::from("emacs")),
        ]));
        let xml = encode_call("m", &[Value::Array(vec![filter])]);

        assert!(xml.contains(
            "<array><data><value><struct>\
             <member><name>filter</name><value><string>emacs</string></value></member>\
             <member><name>flag</name><value><string>+</string></value></member>\
             </struct></value></data></array>"
        ));
    }

    #[test]
    fn test_encode_large_int_uses_i8() {
        let xml = encode_call("m", &[Value::Int(1), Value::Int(i64::from(i32::MAX) + 1)]);
        assert!(xml.contains("<int>1</int>"));
        assert!(xml.contains("<i8>2147483648</i8>"));
    }

    #[test]
    fn test_decode_struct_array_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value>
        <array>
          <data>
            <value>
              <struct>
                <member><name>label</name><value><string>v-repo-one</string></value></member>
                <member><name>id</name><value><i4>12</i4></value></member>
                <member><name>enabled</name><value><boolean>1</boolean></value></member>
              </struct>
            </value>
            <value>untyped &amp; plain</value>
            <value><nil/></value>
            <value><double>1.5</double></value>
          </data>
        </array>
      </value>
    </param>
  </params>
</methodResponse>"#;

        let value = decode_response(xml).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 4);

        let repo = items[0].as_struct().unwrap();
        assert_eq!(repo["label"], Value::from("v-repo-one"));
        assert_eq!(repo["id"], Value::Int(12));
        assert_eq!(repo["enabled"], Value::Boolean(true));

        assert_eq!(items[1], Value::from("untyped & plain"));
        assert_eq!(items[2], Value::Nil);
        assert_eq!(items[3], Value::Double(1.5));
    }

    #[test]
    fn test_decode_empty_string_and_array() {
        let xml = "<methodResponse><params><param><value><array><data/></array></value>\
                   </param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::Array(Vec::new()));

        let xml = "<methodResponse><params><param><value><string></string></value>\
                   </param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::from(""));
    }

    #[test]
    fn test_decode_fault() {
        let xml = encode_fault(2850, "No such repository: tools");
        let err = decode_response(&xml).unwrap_err();
        assert!(matches!(
            err,
            RpcError::Fault { code: 2850, ref message } if message == "No such repository: tools"
        ));
    }

    #[test]
    fn test_decode_no_params_is_nil() {
        let xml = "<methodResponse><params/></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::Nil);
    }

    #[test]
    fn test_decode_rejects_other_documents() {
        assert!(matches!(
            decode_response("<html><body>Login</body></html>"),
            Err(RpcError::InvalidResponse(_))
        ));
        assert!(decode_response("").is_err());
        assert!(decode_response("<methodResponse><params>").is_err());
    }

    #[test]
    fn test_decode_rejects_bad_scalars() {
        let xml = "<methodResponse><params><param><value><int>abc</int></value>\
                   </param></params></methodResponse>";
        assert!(matches!(
            decode_response(xml),
            Err(RpcError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_response_encoding_decodes_back() {
        let value = Value::Struct(BTreeMap::from([
            ("label".to_string(), Value::from("a <b>")),
            ("count".to_string(), Value::Int(3)),
        ]));
        assert_eq!(decode_response(&encode_response(&value)).unwrap(), value);
    }

    #[test]
    fn test_decode_keeps_string_whitespace() {
        let value = Value::Struct(BTreeMap::from([
            ("label".to_string(), Value::from("x")),
            ("sslCaDesc".to_string(), Value::from("  Ca Descr  ")),
        ]));
        assert_eq!(decode_response(&encode_response(&value)).unwrap(), value);

        let xml = "<methodResponse><params><param><value> padded\n</value>\
                   </param></params></methodResponse>";
        assert_eq!(decode_response(xml).unwrap(), Value::from(" padded\n"));
    }

    #[test]
    fn test_decode_fault_message_keeps_whitespace() {
        let err = decode_response(&encode_fault(1, " spaced out ")).unwrap_err();
        assert!(matches!(
            err,
            RpcError::Fault { code: 1, ref message } if message == " spaced out "
        ));
    }
}
