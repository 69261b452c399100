use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

/// 序列化文档
///
/// `document_encoding` 为空或无法识别时输出 UTF-8。
pub fn serialize_document(document: &Handle, document_encoding: String) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = document.clone().into();
    if let Err(e) = serialize(&mut buf, &serializable, SerializeOpts::default()) {
        tracing::error!("DOM 序列化失败: {}", e);
        return Vec::new();
    }

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    buf
}

/// 序列化为 UTF-8 字符串
pub fn serialize_to_string(document: &Handle) -> String {
    String::from_utf8_lossy(&serialize_document(document, String::new())).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    #[test]
    fn test_serialize_round_trips_markup() {
        let dom = html_to_dom(
            b"<!DOCTYPE html><html><head><title>T</title></head><body><p>Hi</p></body></html>",
            "utf-8".to_string(),
        );
        let html = serialize_to_string(&dom.document);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>T</title>"));
        assert!(html.contains("<p>Hi</p>"));
    }
}
