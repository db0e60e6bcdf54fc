//! SSE 帧解码
//!
//! 将任意切分的字节块还原为 `text/event-stream` 事件：
//! 行以 `\n`、`\r\n` 或 `\r` 结尾，空行分派事件，`:` 开头为注释

use crate::application::ports::PushMessage;

/// 增量 SSE 解码器
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    skip_lf: bool,
    data: Vec<String>,
    event: Option<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入一个字节块，返回其中完整的事件
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<PushMessage> {
        let mut out = Vec::new();
        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => self.end_line(&mut out),
                b'\r' => {
                    self.skip_lf = true;
                    self.end_line(&mut out);
                }
                _ => self.line.push(byte),
            }
        }
        out
    }

    /// 最近一次收到的事件 id
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    fn end_line(&mut self, out: &mut Vec<PushMessage>) {
        let raw = std::mem::take(&mut self.line);
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(message) = self.dispatch() {
                out.push(message);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_ref(), ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
            // retry 与未知字段忽略
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<PushMessage> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(PushMessage {
            event: event.filter(|e| !e.is_empty()),
            data,
            id: self.last_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b"data: {\"a\":1}\n\n");
        assert_eq!(messages, vec![PushMessage::new("{\"a\":1}")]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: tag\nda").is_empty());
        assert!(decoder.feed(b"ta: hel").is_empty());
        let messages = decoder.feed(b"lo\n\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event.as_deref(), Some("tag"));
        assert_eq!(messages[0].data, "hello");
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b": keepalive\ndata: one\ndata:two\nid: 42\n\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "one\ntwo");
        assert_eq!(messages[0].id.as_deref(), Some("42"));
        assert_eq!(decoder.last_event_id(), Some("42"));
    }

    #[test]
    fn test_crlf_split_between_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: a\r").is_empty());
        let messages = decoder.feed(b"\n\r\ndata: b\r\r");
        let data: Vec<_> = messages.iter().map(|m| m.data.as_str()).collect();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[test]
    fn test_blank_lines_without_data_dispatch_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"\n\nevent: ping\n\n").is_empty());
        // 事件名不会泄漏到下一条
        let messages = decoder.feed(b"data: x\n\n");
        assert_eq!(messages[0].event, None);
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let bytes = "data: 核实\n\n".as_bytes();
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&bytes[..8]).is_empty());
        let messages = decoder.feed(&bytes[8..]);
        assert_eq!(messages[0].data, "核实");
    }
}
