//! Audio Output - 独立线程持有输出设备
//!
//! `rodio::OutputStream` 在部分平台上不是 `Send`，因此由一个专用线程创建并持有，
//! 对外只暴露可跨线程使用的 `OutputStreamHandle`。
//! [`AudioOutput`] 被丢弃时线程退出并关闭设备。

use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::sync::mpsc;
use std::thread;

use crate::application::ports::TransportError;

/// 默认输出设备
pub struct AudioOutput {
    handle: OutputStreamHandle,
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioOutput {
    /// 打开默认输出设备
    pub fn open_default() -> Result<Self, TransportError> {
        let (init_tx, init_rx) = mpsc::channel::<Result<OutputStreamHandle, TransportError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("rtms-audio-output".into())
            .spawn(move || {
                let stream = match OutputStream::try_default() {
                    Ok((stream, handle)) => {
                        let _ = init_tx.send(Ok(handle));
                        stream
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(TransportError::OutputError(e.to_string())));
                        return;
                    }
                };
                // 发送端全部释放后 recv 返回 Err，线程退出
                let _ = shutdown_rx.recv();
                drop(stream);
                tracing::debug!("Audio output thread exiting");
            })
            .map_err(|e| TransportError::OutputError(format!("failed to spawn audio thread: {e}")))?;

        let handle = init_rx
            .recv()
            .map_err(|_| TransportError::OutputError("audio thread died during init".into()))??;

        tracing::info!("Audio output device opened");

        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// 创建一个新的 Sink
    pub fn sink(&self) -> Result<Sink, TransportError> {
        Sink::try_new(&self.handle).map_err(|e| TransportError::OutputError(e.to_string()))
    }

    /// 创建一个暂停状态的 Sink
    pub fn paused_sink(&self) -> Result<Sink, TransportError> {
        let sink = self.sink()?;
        sink.pause();
        Ok(sink)
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Audio output thread panicked");
            }
        }
    }
}
