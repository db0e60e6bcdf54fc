//! Rodio Transport - 拉取、解码并通过本机扬声器播放
//!
//! 实现 AudioTransportPort trait：
//! - http(s):// 定位符通过 reqwest 拉取
//! - file:// 定位符直接读取本地文件
//!
//! 解码后挂到一个暂停的 Sink 上，调用 `play` 才开始发声

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rodio::{Decoder, Sink, Source};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::output::AudioOutput;
use crate::application::ports::{AudioTransportPort, TransportError, TransportHandle};
use crate::domain::AudioRef;

/// Rodio 传输配置
#[derive(Debug, Clone)]
pub struct RodioTransportConfig {
    /// 远程音频拉取超时（秒）
    pub fetch_timeout_secs: u64,
    /// 音量倍率
    pub volume: f32,
}

impl Default for RodioTransportConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            volume: 1.0,
        }
    }
}

/// 扬声器音频传输
///
/// 没有可用输出设备时 output 为 None，每次获取都以 OutputError 失败
pub struct RodioTransport {
    client: Client,
    output: Option<Arc<AudioOutput>>,
    config: RodioTransportConfig,
}

impl RodioTransport {
    pub fn new(output: Option<Arc<AudioOutput>>, config: RodioTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| TransportError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            output,
            config,
        })
    }
}

#[async_trait]
impl AudioTransportPort for RodioTransport {
    async fn acquire(&self, audio_ref: &AudioRef) -> Result<Arc<dyn TransportHandle>, TransportError> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| TransportError::OutputError("no audio output device".to_string()))?;

        let bytes = load_bytes(&self.client, audio_ref).await?;
        let extension = extension_of(audio_ref.as_str()).map(str::to_string);
        let size = bytes.len();

        // 解码器构造会读取文件头，放到阻塞线程池
        let (source, duration) = tokio::task::spawn_blocking(move || decode(bytes, extension.as_deref()))
            .await
            .map_err(|e| TransportError::DecodeError(format!("decode task failed: {e}")))??;

        let sink = output.paused_sink()?;
        sink.set_volume(self.config.volume);
        sink.append(source);

        tracing::debug!(
            audio_ref = %audio_ref,
            size = size,
            duration_ms = ?duration.map(|d| d.as_millis()),
            "Audio acquired"
        );

        Ok(Arc::new(RodioHandle {
            sink,
            duration,
            stopped: AtomicBool::new(false),
        }))
    }
}

/// 读取音频原始字节
pub(crate) async fn load_bytes(client: &Client, audio_ref: &AudioRef) -> Result<Vec<u8>, TransportError> {
    if let Some(path) = audio_ref.local_path() {
        return tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TransportError::NotFound(path.to_string()),
            _ => TransportError::NetworkError(format!("{}: {}", path, e)),
        });
    }

    let response = client.get(audio_ref.as_str()).send().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::NetworkError(e.to_string())
        }
    })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(TransportError::NotFound(audio_ref.to_string()));
    }
    if !status.is_success() {
        return Err(TransportError::NetworkError(format!("HTTP {}", status)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransportError::NetworkError(format!("Failed to read audio: {}", e)))?;
    Ok(bytes.to_vec())
}

fn decode(
    bytes: Vec<u8>,
    extension: Option<&str>,
) -> Result<(Decoder<Cursor<Vec<u8>>>, Option<Duration>), TransportError> {
    let probed = probe_duration(&bytes, extension);
    let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| TransportError::DecodeError(e.to_string()))?;
    let duration = decoder.total_duration().or(probed);
    Ok((decoder, duration))
}

/// 通过容器元数据估算时长（帧数 / 采样率）
pub(crate) fn probe_duration(data: &[u8], extension: Option<&str>) -> Option<Duration> {
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::probe::Hint;

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());
    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &Default::default(), &Default::default())
        .ok()?;
    let track = probed.format.default_track()?;
    let n_frames = track.codec_params.n_frames?;
    let sample_rate = track.codec_params.sample_rate?;
    if sample_rate == 0 {
        return None;
    }

    Some(Duration::from_secs_f64(n_frames as f64 / sample_rate as f64))
}

fn extension_of(locator: &str) -> Option<&str> {
    let path = locator.split(['?', '#']).next().unwrap_or(locator);
    Path::new(path).extension().and_then(|e| e.to_str())
}

struct RodioHandle {
    sink: Sink,
    duration: Option<Duration>,
    stopped: AtomicBool,
}

impl TransportHandle for RodioHandle {
    fn play(&self) {
        if !self.stopped.load(Ordering::SeqCst) {
            self.sink.play();
        }
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.sink.stop();
        }
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst) && !self.sink.is_paused() && self.sink.empty()
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// 生成单声道 16-bit PCM WAV
    fn wav_bytes(sample_rate: u32, samples: u32) -> Vec<u8> {
        let data_len = samples * 2;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.resize(44 + data_len as usize, 0);
        out
    }

    #[test]
    fn test_probe_wav_duration() {
        let bytes = wav_bytes(8000, 4000);
        let duration = probe_duration(&bytes, Some("wav")).unwrap();
        assert_eq!(duration.as_millis(), 500);
    }

    #[test]
    fn test_probe_garbage_is_none() {
        assert!(probe_duration(b"not audio at all", None).is_none());
    }

    #[test]
    fn test_decode_reports_duration() {
        let (_, duration) = decode(wav_bytes(8000, 8000), Some("wav")).unwrap();
        assert_eq!(duration.map(|d| d.as_millis()), Some(1000));
        assert!(matches!(
            decode(b"garbage".to_vec(), None),
            Err(TransportError::DecodeError(_))
        ));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("https://x.io/a/b.mp3?sig=1"), Some("mp3"));
        assert_eq!(extension_of("file:///tmp/clip.wav"), Some("wav"));
        assert_eq!(extension_of("https://x.io/stream"), None);
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(&wav_bytes(8000, 10)).unwrap();
        let locator = format!("file://{}", file.path().display());

        let client = Client::new();
        let bytes = load_bytes(&client, &AudioRef::parse(locator).unwrap()).await.unwrap();
        assert_eq!(bytes.len(), 64);
    }

    #[tokio::test]
    async fn test_acquire_without_output_fails_before_fetch() {
        let transport = RodioTransport::new(None, RodioTransportConfig::default()).unwrap();
        // 文件不存在：若先拉取会得到 NotFound
        let audio_ref = AudioRef::parse("file:///definitely/not/here.wav").unwrap();
        assert!(matches!(
            transport.acquire(&audio_ref).await,
            Err(TransportError::OutputError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_not_found() {
        let client = Client::new();
        let audio_ref = AudioRef::parse("file:///definitely/not/here.wav").unwrap();
        assert!(matches!(
            load_bytes(&client, &audio_ref).await,
            Err(TransportError::NotFound(_))
        ));
    }
}
