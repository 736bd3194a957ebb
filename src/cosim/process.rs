//! 进程传输
//!
//! 启动外部 worker 进程，通过 stdin/stdout 逐行交换 JSON 消息。
//! 读端放在独立线程里，主线程用带超时的接收判定 worker 无响应。

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::protocol::{PlantRequest, PlantResponse};
use super::transport::{PlantTransport, TransportError};
use crate::signal::Signals;
use tracing::{debug, info, trace, warn};

const CLOSE_GRACE_POLLS: u32 = 50;
const CLOSE_GRACE_INTERVAL: Duration = Duration::from_millis(10);

struct Worker {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<std::io::Result<String>>,
    reader: Option<JoinHandle<()>>,
}

/// 外部进程传输
pub struct ProcessTransport {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
    worker: Option<Worker>,
}

impl ProcessTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            worker: None,
        }
    }

    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// 单步应答超时；`None` 表示无限等待
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn recv_line(&self, worker: &Worker) -> Result<String, TransportError> {
        let received = match self.timeout {
            Some(d) => worker.lines.recv_timeout(d).map_err(|e| match e {
                RecvTimeoutError::Timeout => TransportError::Timeout(d),
                RecvTimeoutError::Disconnected => TransportError::Closed,
            })?,
            None => worker.lines.recv().map_err(|_| TransportError::Closed)?,
        };
        Ok(received?)
    }

    /// 发一行请求并读一行应答。通道层面的失败（超时、断开、读写错误）
    /// 之后 worker 被结束，迟到的应答不会留给下一次请求。
    fn request(&mut self, req: &PlantRequest) -> Result<PlantResponse, TransportError> {
        let reply = match self.exchange_line(req) {
            Ok(reply) => reply,
            Err(e) => {
                self.kill_worker();
                return Err(e);
            }
        };
        debug!(bytes = reply.len(), "收到应答");
        serde_json::from_str(&reply).map_err(|e| TransportError::Protocol(e.to_string()))
    }

    fn exchange_line(&mut self, req: &PlantRequest) -> Result<String, TransportError> {
        let line = serde_json::to_string(req).map_err(|e| TransportError::Protocol(e.to_string()))?;
        let worker = self.worker.as_mut().ok_or(TransportError::NotOpen)?;
        trace!(bytes = line.len(), "发送请求");

        let stdin = worker.stdin.as_mut().ok_or(TransportError::Closed)?;
        let written = writeln!(stdin, "{line}").and_then(|_| stdin.flush());
        if let Err(e) = written {
            return Err(match e.kind() {
                std::io::ErrorKind::BrokenPipe => TransportError::Closed,
                _ => TransportError::Io(e),
            });
        }

        let worker = self.worker.as_ref().ok_or(TransportError::NotOpen)?;
        self.recv_line(worker)
    }

    fn kill_worker(&mut self) {
        let Some(mut worker) = self.worker.take() else {
            return;
        };
        warn!(pid = worker.child.id(), "plant worker 无应答，强制结束");
        drop(worker.stdin.take());
        let _ = worker.child.kill();
        let _ = worker.child.wait();
        if let Some(reader) = worker.reader.take() {
            let _ = reader.join();
        }
    }
}

impl PlantTransport for ProcessTransport {
    #[tracing::instrument(skip(self), fields(program = %self.program.display()))]
    fn open(&mut self) -> Result<(), TransportError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(TransportError::Spawn)?;

        let stdin = child.stdin.take().ok_or(TransportError::Closed)?;
        let stdout = child.stdout.take().ok_or(TransportError::Closed)?;

        let (tx, rx) = mpsc::channel();
        let reader = thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let stop = line.is_err();
                if tx.send(line).is_err() || stop {
                    break;
                }
            }
        });

        info!(pid = child.id(), "🔌 plant worker 已启动");
        self.worker = Some(Worker {
            child,
            stdin: Some(stdin),
            lines: rx,
            reader: Some(reader),
        });
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.worker.is_some()
    }

    fn step(&mut self, inputs: &Signals) -> Result<Signals, TransportError> {
        self.request(&PlantRequest::Step {
            inputs: inputs.clone(),
        })?
        .into_outputs()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.request(&PlantRequest::Reset)?.into_ack()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let Some(mut worker) = self.worker.take() else {
            return Ok(());
        };

        if let Some(mut stdin) = worker.stdin.take() {
            if let Ok(line) = serde_json::to_string(&PlantRequest::Close) {
                // worker 可能已经退出，忽略写失败
                let _ = writeln!(stdin, "{line}").and_then(|_| stdin.flush());
            }
        }

        let mut exited = false;
        for _ in 0..CLOSE_GRACE_POLLS {
            if worker.child.try_wait()?.is_some() {
                exited = true;
                break;
            }
            thread::sleep(CLOSE_GRACE_INTERVAL);
        }
        if !exited {
            warn!(pid = worker.child.id(), "plant worker 未退出，强制结束");
            let _ = worker.child.kill();
            worker.child.wait()?;
        }
        if let Some(reader) = worker.reader.take() {
            let _ = reader.join();
        }
        info!("plant worker 已关闭");
        Ok(())
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "关闭 plant worker 失败");
        }
    }
}
